//! The shared framebuffer the compositor writes into.
//!
//! Device glue hands over a raw pointer, a byte stride and the screen
//! dimensions once at startup. Hosts and tests use an owned buffer instead.

use core::ptr::NonNull;

use crate::error::{AnimatorError, Result};
use crate::geometry::Rect;
use crate::surface::{Pixel, PixelView, PixelViewMut};

enum Memory {
    Owned(Vec<Pixel>),
    Raw { ptr: NonNull<Pixel>, len: usize },
}

/// RGB565 framebuffer.
pub struct Framebuffer {
    memory: Memory,
    width: u32,
    height: u32,
    /// Row stride in pixels.
    stride: usize,
}

// SAFETY: the raw variant is only constructed through `from_raw_parts`,
// whose contract hands exclusive access to the memory to this value.
unsafe impl Send for Framebuffer {}

impl Framebuffer {
    /// Create a zeroed framebuffer owned by this process.
    pub fn new(width: u32, height: u32) -> Self {
        Framebuffer {
            memory: Memory::Owned(vec![0; width as usize * height as usize]),
            width,
            height,
            stride: width as usize,
        }
    }

    /// Wrap device framebuffer memory.
    ///
    /// # Safety
    ///
    /// `ptr` must point to at least `stride * (height - 1) + width * 2`
    /// writable bytes that stay valid for the lifetime of the returned value,
    /// and nothing else may access that memory while it is alive.
    pub unsafe fn from_raw_parts(
        ptr: *mut u8,
        stride: usize,
        width: u32,
        height: u32,
    ) -> Result<Self> {
        let ptr = NonNull::new(ptr).ok_or(AnimatorError::InvalidFramebuffer)?;
        if ptr.as_ptr() as usize % core::mem::align_of::<Pixel>() != 0 || stride % 2 != 0 {
            return Err(AnimatorError::InvalidFramebuffer);
        }
        if stride < width as usize * 2 {
            return Err(AnimatorError::InvalidStride { stride, width });
        }
        let stride = stride / 2;
        let len = match height {
            0 => 0,
            h => stride * (h as usize - 1) + width as usize,
        };
        log::debug!(
            "[Coverflow Framebuffer] Attached {}x{} framebuffer, stride {} px",
            width,
            height,
            stride
        );
        Ok(Framebuffer {
            memory: Memory::Raw {
                ptr: ptr.cast(),
                len,
            },
            width,
            height,
            stride,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// The whole screen.
    pub fn rect(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }

    fn pixels(&self) -> &[Pixel] {
        match &self.memory {
            Memory::Owned(pixels) => pixels,
            // SAFETY: upheld by the `from_raw_parts` contract.
            Memory::Raw { ptr, len } => unsafe { core::slice::from_raw_parts(ptr.as_ptr(), *len) },
        }
    }

    fn pixels_mut(&mut self) -> &mut [Pixel] {
        match &mut self.memory {
            Memory::Owned(pixels) => pixels,
            // SAFETY: upheld by the `from_raw_parts` contract; `&mut self`
            // guarantees this is the only live slice.
            Memory::Raw { ptr, len } => unsafe {
                core::slice::from_raw_parts_mut(ptr.as_ptr(), *len)
            },
        }
    }

    pub fn view(&self) -> PixelView<'_> {
        let (width, height, stride) = (self.width, self.height, self.stride);
        PixelView::new(self.pixels(), width, height, stride)
    }

    pub fn view_mut(&mut self) -> PixelViewMut<'_> {
        let (width, height, stride) = (self.width, self.height, self.stride);
        PixelViewMut::from_parts(self.pixels_mut(), width, height, stride)
    }
}

impl core::fmt::Debug for Framebuffer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Framebuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("stride", &self.stride)
            .field("owned", &matches!(self.memory, Memory::Owned(_)))
            .finish()
    }
}
