//! Window pixel buffers and bounds-checked 2D views.
//!
//! Clients hand over images in whatever format they render; only RGB565
//! images are turned into a [`PixelBuffer`] the compositor can blit from.
//! All pixel access goes through [`PixelView`] / [`PixelViewMut`], which
//! expose rows as slices so an out-of-range row or column panics instead of
//! touching foreign memory.

use crate::error::{AnimatorError, Result};
use crate::geometry::Rect;

/// A single RGB565 pixel.
pub type Pixel = u16;

/// Pixel formats a client may submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// 16-bit packed 5-6-5 RGB. The only compositable format.
    Rgb565,
    /// 32-bit RGB with an unused high byte.
    Xrgb8888,
    /// 32-bit RGB with alpha.
    Argb8888,
}

impl PixelFormat {
    /// Get bytes per pixel.
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            PixelFormat::Rgb565 => 2,
            PixelFormat::Xrgb8888 | PixelFormat::Argb8888 => 4,
        }
    }

    /// Whether the compositor can blit this format.
    pub fn is_compositable(&self) -> bool {
        matches!(self, PixelFormat::Rgb565)
    }
}

/// Pack 8-bit channels into RGB565.
pub const fn rgb565(r: u8, g: u8, b: u8) -> Pixel {
    ((r as u16 >> 3) << 11) | ((g as u16 >> 2) << 5) | (b as u16 >> 3)
}

/// Expand an RGB565 pixel to 8-bit channels.
pub const fn rgb888(p: Pixel) -> [u8; 3] {
    let r = ((p >> 11) & 0x1F) as u8;
    let g = ((p >> 5) & 0x3F) as u8;
    let b = (p & 0x1F) as u8;
    [(r << 3) | (r >> 2), (g << 2) | (g >> 4), (b << 3) | (b >> 2)]
}

/// An image as submitted with a window update.
#[derive(Debug, Clone)]
pub struct WindowImage {
    width: u32,
    height: u32,
    stride: usize,
    format: PixelFormat,
    data: Vec<u8>,
}

impl WindowImage {
    /// Wrap client pixel memory. `stride` is in bytes.
    pub fn new(
        width: u32,
        height: u32,
        stride: usize,
        format: PixelFormat,
        data: Vec<u8>,
    ) -> Result<Self> {
        let row_bytes = width as usize * format.bytes_per_pixel();
        if stride < row_bytes {
            return Err(AnimatorError::InvalidStride { stride, width });
        }
        let expected = match height {
            0 => 0,
            h => stride * (h as usize - 1) + row_bytes,
        };
        if data.len() < expected {
            return Err(AnimatorError::BufferSize {
                expected,
                actual: data.len(),
            });
        }
        Ok(WindowImage {
            width,
            height,
            stride,
            format,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Convert to a compositable buffer. `None` for any format but RGB565.
    pub fn into_pixel_buffer(self) -> Option<PixelBuffer> {
        if !self.format.is_compositable() {
            return None;
        }
        let width = self.width as usize;
        let mut pixels = Vec::with_capacity(width * self.height as usize);
        for y in 0..self.height as usize {
            let row = &self.data[y * self.stride..y * self.stride + width * 2];
            pixels.extend(
                row.chunks_exact(2)
                    .map(|px| Pixel::from_ne_bytes([px[0], px[1]])),
            );
        }
        Some(PixelBuffer {
            width: self.width,
            height: self.height,
            stride: width,
            pixels,
        })
    }
}

/// An owned RGB565 image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    /// Row stride in pixels.
    stride: usize,
    pixels: Vec<Pixel>,
}

impl PixelBuffer {
    /// Create a buffer filled with one color.
    pub fn filled(width: u32, height: u32, color: Pixel) -> Self {
        PixelBuffer {
            width,
            height,
            stride: width as usize,
            pixels: vec![color; width as usize * height as usize],
        }
    }

    /// Create a buffer whose pixels come from `f(x, y)`.
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> Pixel) -> Self {
        let mut pixels = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.push(f(x, y));
            }
        }
        PixelBuffer {
            width,
            height,
            stride: width as usize,
            pixels,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn rect(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }

    pub fn view(&self) -> PixelView<'_> {
        PixelView {
            pixels: &self.pixels,
            width: self.width,
            height: self.height,
            stride: self.stride,
        }
    }

    pub fn view_mut(&mut self) -> PixelViewMut<'_> {
        PixelViewMut {
            pixels: &mut self.pixels,
            width: self.width,
            height: self.height,
            stride: self.stride,
        }
    }
}

/// Read-only view over strided pixel memory.
#[derive(Debug, Clone, Copy)]
pub struct PixelView<'a> {
    pixels: &'a [Pixel],
    width: u32,
    height: u32,
    stride: usize,
}

impl<'a> PixelView<'a> {
    pub(crate) fn new(pixels: &'a [Pixel], width: u32, height: u32, stride: usize) -> Self {
        debug_assert!(height == 0 || pixels.len() >= stride * (height as usize - 1) + width as usize);
        PixelView {
            pixels,
            width,
            height,
            stride,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn rect(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }

    /// Row `y`, exactly `width` pixels long.
    pub fn row(&self, y: u32) -> &'a [Pixel] {
        assert!(y < self.height, "row {} out of bounds (height {})", y, self.height);
        let start = y as usize * self.stride;
        &self.pixels[start..start + self.width as usize]
    }

    pub fn pixel(&self, x: u32, y: u32) -> Pixel {
        self.row(y)[x as usize]
    }
}

/// Mutable view over strided pixel memory.
#[derive(Debug)]
pub struct PixelViewMut<'a> {
    pixels: &'a mut [Pixel],
    width: u32,
    height: u32,
    stride: usize,
}

impl<'a> PixelViewMut<'a> {
    /// Wrap a slice. Fails if the slice cannot hold `height` rows.
    pub fn new(pixels: &'a mut [Pixel], width: u32, height: u32, stride: usize) -> Result<Self> {
        if stride < width as usize {
            return Err(AnimatorError::InvalidStride {
                stride: stride * 2,
                width,
            });
        }
        let expected = match height {
            0 => 0,
            h => stride * (h as usize - 1) + width as usize,
        };
        if pixels.len() < expected {
            return Err(AnimatorError::BufferSize {
                expected: expected * 2,
                actual: pixels.len() * 2,
            });
        }
        Ok(PixelViewMut {
            pixels,
            width,
            height,
            stride,
        })
    }

    pub(crate) fn from_parts(pixels: &'a mut [Pixel], width: u32, height: u32, stride: usize) -> Self {
        debug_assert!(height == 0 || pixels.len() >= stride * (height as usize - 1) + width as usize);
        PixelViewMut {
            pixels,
            width,
            height,
            stride,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn rect(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }

    pub fn row(&self, y: u32) -> &[Pixel] {
        assert!(y < self.height, "row {} out of bounds (height {})", y, self.height);
        let start = y as usize * self.stride;
        &self.pixels[start..start + self.width as usize]
    }

    pub fn row_mut(&mut self, y: u32) -> &mut [Pixel] {
        assert!(y < self.height, "row {} out of bounds (height {})", y, self.height);
        let start = y as usize * self.stride;
        &mut self.pixels[start..start + self.width as usize]
    }

    /// The columns `rect.x..rect.right()` of row `y`.
    pub fn span_mut(&mut self, y: u32, rect: &Rect) -> &mut [Pixel] {
        let row = self.row_mut(y);
        &mut row[rect.x as usize..rect.right() as usize]
    }

    pub fn pixel(&self, x: u32, y: u32) -> Pixel {
        self.row(y)[x as usize]
    }

    pub fn as_view(&self) -> PixelView<'_> {
        PixelView {
            pixels: &self.pixels[..],
            width: self.width,
            height: self.height,
            stride: self.stride,
        }
    }
}
