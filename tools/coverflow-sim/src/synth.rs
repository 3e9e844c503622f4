//! Synthetic windows and frame capture.

use image::{Rgb, RgbImage};

use coverflow::scene::WindowEvent;
use coverflow::surface::{rgb565, rgb888};
use coverflow::{Animator, Framebuffer, Pixel, PixelFormat, Rect, WindowId, WindowImage};

use crate::error::Result;

/// Height of the synthetic decoration bar.
pub const DECORATION_HEIGHT: u32 = 24;

/// Base colors cycled through by the client windows.
const PALETTE: [(u8, u8, u8); 6] = [
    (220, 60, 60),
    (60, 180, 90),
    (70, 110, 230),
    (230, 180, 40),
    (170, 80, 200),
    (40, 190, 200),
];

const BORDER: u32 = 4;

/// A window the simulator feeds to the animator.
#[derive(Debug, Clone)]
pub struct SyntheticWindow {
    pub id: WindowId,
    pub rect: Rect,
    pub image: WindowImage,
    pub caption: Option<String>,
}

/// Pack pixels produced by `f(x, y)` into an RGB565 window image.
pub fn image_from_fn(
    width: u32,
    height: u32,
    f: impl Fn(u32, u32) -> Pixel,
) -> Result<WindowImage> {
    let mut data = Vec::with_capacity(width as usize * height as usize * 2);
    for y in 0..height {
        for x in 0..width {
            data.extend_from_slice(&f(x, y).to_ne_bytes());
        }
    }
    Ok(WindowImage::new(
        width,
        height,
        width as usize * 2,
        PixelFormat::Rgb565,
        data,
    )?)
}

/// A framed vertical gradient, distinct per window index.
fn client_image(index: usize, width: u32, height: u32) -> Result<WindowImage> {
    let (r, g, b) = PALETTE[index % PALETTE.len()];
    let shade = |c: u8, y: u32| (c as u32 * (height + y) / (2 * height.max(1))) as u8;
    image_from_fn(width, height, |x, y| {
        let edge = x < BORDER || y < BORDER || x + BORDER >= width || y + BORDER >= height;
        if edge {
            rgb565(255, 255, 255)
        } else {
            rgb565(shade(r, y), shade(g, y), shade(b, y))
        }
    })
}

/// `count` full-screen client windows, plus a decoration bar on top
/// captioned `decoration` when given.
pub fn window_set(
    screen: Rect,
    count: u32,
    decoration: Option<&str>,
) -> Result<Vec<SyntheticWindow>> {
    let mut windows = (0..count as usize)
        .map(|i| {
            Ok(SyntheticWindow {
                id: WindowId(i as u64 + 1),
                rect: screen,
                image: client_image(i, screen.width, screen.height)?,
                caption: Some(format!("client-{}", i + 1)),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    if let Some(caption) = decoration {
        let rect = Rect::new(screen.x, screen.y, screen.width, DECORATION_HEIGHT.min(screen.height));
        windows.push(SyntheticWindow {
            id: WindowId(count as u64 + 1),
            rect,
            image: image_from_fn(rect.width, rect.height, |_, _| rgb565(48, 48, 56))?,
            caption: Some(caption.to_string()),
        });
    }
    Ok(windows)
}

/// Register `windows` with the animator, stacked in the given order (first
/// at the back).
pub fn load(animator: &Animator, windows: Vec<SyntheticWindow>) -> Result<()> {
    let order: Vec<WindowId> = windows.iter().map(|w| w.id).collect();
    let captions: Vec<(WindowId, String)> = windows
        .iter()
        .filter_map(|w| w.caption.clone().map(|c| (w.id, c)))
        .collect();

    for window in windows {
        animator.update_window(window.id, Some(window.image), window.rect, false)?;
    }
    animator.window_event(WindowEvent::Stacking { order, captions })?;
    log::debug!("[Coverflow Sim] Loaded synthetic windows");
    Ok(())
}

/// Convert the framebuffer to an 8-bit RGB image.
pub fn capture(framebuffer: &Framebuffer) -> RgbImage {
    let view = framebuffer.view();
    RgbImage::from_fn(framebuffer.width(), framebuffer.height(), |x, y| {
        Rgb(rgb888(view.pixel(x, y)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_set_with_decoration() {
        let screen = Rect::new(0, 0, 80, 48);
        let windows = window_set(screen, 2, Some("decoration")).unwrap();

        assert_eq!(windows.len(), 3);
        assert_eq!(windows[2].rect, Rect::new(0, 0, 80, DECORATION_HEIGHT));
        assert_eq!(windows[2].caption.as_deref(), Some("decoration"));
        assert_eq!(windows[0].image.width(), 80);
    }

    #[test]
    fn test_capture_expands_rgb565() {
        let mut fb = Framebuffer::new(2, 1);
        fb.view_mut().row_mut(0).copy_from_slice(&[0xFFFF, 0xF800]);
        let img = capture(&fb);

        assert_eq!(img.get_pixel(0, 0), &Rgb([255, 255, 255]));
        assert_eq!(img.get_pixel(1, 0), &Rgb([255, 0, 0]));
    }
}
