//! Helpers shared by the integration tests.

#![allow(dead_code)]

use coverflow::scene::{Event, WindowEvent};
use coverflow::{Pixel, PixelFormat, Rect, WindowId, WindowImage};

/// A solid RGB565 image.
pub fn solid(width: u32, height: u32, color: Pixel) -> WindowImage {
    let data: Vec<u8> = std::iter::repeat(color.to_ne_bytes())
        .take(width as usize * height as usize)
        .flatten()
        .collect();
    WindowImage::new(width, height, width as usize * 2, PixelFormat::Rgb565, data)
        .expect("valid image")
}

/// Window update with a solid image matching `rect`.
pub fn window(id: u64, rect: Rect, color: Pixel) -> Event {
    Event::Window(WindowEvent::Updated {
        id: WindowId(id),
        image: Some(solid(rect.width, rect.height, color)),
        screen_rect: rect,
        reserved: false,
    })
}

/// Window update for an externally rendered window.
pub fn reserved_window(id: u64, rect: Rect) -> Event {
    Event::Window(WindowEvent::Updated {
        id: WindowId(id),
        image: None,
        screen_rect: rect,
        reserved: true,
    })
}

/// Per-pixel count of how often `rects` cover each screen pixel.
pub fn coverage(screen: Rect, rects: impl IntoIterator<Item = Rect>) -> Vec<u32> {
    let mut counts = vec![0u32; screen.area() as usize];
    for rect in rects {
        let clipped = rect.intersect(&screen).expect("painted rect lies on screen");
        assert_eq!(clipped, rect, "painted rect {:?} leaves the screen", rect);
        for y in rect.y..rect.bottom() {
            for x in rect.x..rect.right() {
                counts[(y - screen.y) as usize * screen.width as usize + (x - screen.x) as usize] += 1;
            }
        }
    }
    counts
}
