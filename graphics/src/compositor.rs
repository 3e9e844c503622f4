//! Window compositor.
//!
//! One pass paints a whole frame into the framebuffer. Every screen pixel
//! is written at most once: the pass first decides which rectangles each
//! window, each reflection and the background own, claiming them in an
//! exposure region, and only then touches pixels.
//!
//! Claim order:
//!
//! 1. Reserved rectangles (never painted).
//! 2. Window content, topmost window first.
//! 3. Reflections of the strip just above the mirror line, clipped against
//!    every window placement and everything already claimed.
//! 4. Black background for whatever is left.

use crate::blit::{fade_to_black, ScaleMap};
use crate::config::ReflectionConfig;
use crate::framebuffer::Framebuffer;
use crate::geometry::{Rect, Region};
use crate::surface::{Pixel, PixelView};
use crate::window::WindowId;

/// Background color.
pub const BLACK: Pixel = 0;

/// A window to paint this frame.
#[derive(Debug, Clone, Copy)]
pub struct DrawItem<'a> {
    pub id: WindowId,
    pub image: PixelView<'a>,
    /// Part of `image` that is shown.
    pub source: Rect,
    /// Where it is shown; may be smaller than `source`.
    pub placement: Rect,
    /// Whether the window casts a reflection.
    pub reflects: bool,
}

/// Everything one frame is composed from.
#[derive(Debug, Clone, Default)]
pub struct FrameInput<'a> {
    /// Drawable windows, topmost first.
    pub items: Vec<DrawItem<'a>>,
    /// Areas owned by other renderers: reserved regions and reserved
    /// windows.
    pub claimed: Vec<Rect>,
}

/// What a composite pass painted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// Window content rectangles.
    pub content: Vec<(WindowId, Rect)>,
    /// Mirrored rectangles below the reflection line.
    pub reflections: Vec<(WindowId, Rect)>,
    /// Rectangles cleared to black.
    pub fill: Vec<Rect>,
    /// Windows skipped because they would need upscaling.
    pub rejected: Vec<WindowId>,
}

impl FrameReport {
    /// Every rectangle written this frame.
    pub fn painted(&self) -> impl Iterator<Item = Rect> + '_ {
        self.content
            .iter()
            .map(|(_, r)| *r)
            .chain(self.reflections.iter().map(|(_, r)| *r))
            .chain(self.fill.iter().copied())
    }

    pub fn painted_area(&self) -> u64 {
        self.painted().map(|r| r.area()).sum()
    }
}

/// A mirrored rectangle and the content rectangle it reflects.
#[derive(Debug, Clone, Copy)]
struct Mirror {
    source_rect: usize,
    rect: Rect,
}

#[derive(Debug)]
struct Plan {
    item: usize,
    rects: Vec<Rect>,
    mirrors: Vec<Mirror>,
}

/// Paints frames into a framebuffer.
#[derive(Debug)]
pub struct Compositor {
    reflection: ReflectionConfig,
    /// One screen row, for content that is also reflected.
    scratch: Vec<Pixel>,
}

impl Compositor {
    pub fn new(reflection: ReflectionConfig) -> Self {
        Compositor {
            reflection,
            scratch: Vec::new(),
        }
    }

    /// Rows mirrored by the reflection band, or `None` when disabled.
    pub fn mirrored_strip(&self, screen: Rect) -> Option<Rect> {
        if self.reflection.height == 0 {
            return None;
        }
        let line = self.reflection.line;
        Rect::from_edges(screen.x, line - self.reflection.height as i32, screen.right(), line)
            .intersect(&screen)
    }

    /// Fade applied to a reflected row `distance` rows below the line.
    fn fade_at(&self, distance: i32) -> u8 {
        let base = self.reflection.base_fade as i64;
        let height = self.reflection.height.max(1) as i64;
        let distance = (distance as i64).clamp(0, height);
        (base + (255 - base) * distance / height) as u8
    }

    /// Paint one frame.
    pub fn compose(&mut self, input: &FrameInput<'_>, fb: &mut Framebuffer) -> FrameReport {
        let screen = fb.rect();
        let mut report = FrameReport::default();

        let mut exposed: Region = input.claimed.iter().copied().collect();
        let total: Region = input.items.iter().map(|item| item.placement).collect();

        let mut plans = Vec::with_capacity(input.items.len());
        for (index, item) in input.items.iter().enumerate() {
            let mut to_draw = Region::from_rect(item.placement).intersect_rect(&screen);
            to_draw.subtract_region(&exposed);
            exposed.add_region(&to_draw);
            plans.push(Plan {
                item: index,
                rects: to_draw.into_rects(),
                mirrors: Vec::new(),
            });
        }

        if let Some(strip) = self.mirrored_strip(screen) {
            let line = self.reflection.line;
            for plan in &mut plans {
                if !input.items[plan.item].reflects {
                    continue;
                }
                for (index, rect) in plan.rects.iter().enumerate() {
                    let Some(above) = rect.intersect(&strip) else {
                        continue;
                    };
                    let below = Rect::new(
                        above.x,
                        2 * line - above.bottom(),
                        above.width,
                        above.height,
                    );
                    let mut pieces = Region::from_rect(below).intersect_rect(&screen);
                    pieces.subtract_region(&total);
                    pieces.subtract_region(&exposed);
                    exposed.add_region(&pieces);
                    plan.mirrors.extend(pieces.into_rects().into_iter().map(|rect| Mirror {
                        source_rect: index,
                        rect,
                    }));
                }
            }
        }

        self.scratch.resize(screen.width as usize, BLACK);
        for plan in &plans {
            let item = &input.items[plan.item];
            match ScaleMap::new(item.source, item.placement) {
                Ok(map) => {
                    self.paint(item, &map, plan, fb);
                    report
                        .content
                        .extend(plan.rects.iter().map(|r| (item.id, *r)));
                    report
                        .reflections
                        .extend(plan.mirrors.iter().map(|m| (item.id, m.rect)));
                }
                Err(e) => {
                    log::warn!("[Coverflow Compositor] Skipping window {:?}: {}", item.id, e);
                    report.rejected.push(item.id);
                    report.fill.extend(plan.rects.iter().copied());
                    report.fill.extend(plan.mirrors.iter().map(|m| m.rect));
                    for rect in plan.rects.iter().chain(plan.mirrors.iter().map(|m| &m.rect)) {
                        fill_rect(fb, rect, BLACK);
                    }
                }
            }
        }

        let mut background = Region::from_rect(screen);
        background.subtract_region(&exposed);
        for rect in background.rects() {
            fill_rect(fb, rect, BLACK);
        }
        report.fill.extend(background.into_rects());

        log::trace!(
            "[Coverflow Compositor] Frame: {} content, {} reflection, {} fill rects",
            report.content.len(),
            report.reflections.len(),
            report.fill.len()
        );
        report
    }

    fn paint(&mut self, item: &DrawItem<'_>, map: &ScaleMap, plan: &Plan, fb: &mut Framebuffer) {
        let line = self.reflection.line;
        let fades: Vec<u8> = (0..self.reflection.height as i32)
            .map(|d| self.fade_at(d))
            .collect();
        let scratch = &mut self.scratch;
        let mut view = fb.view_mut();

        for (index, rect) in plan.rects.iter().enumerate() {
            let width = rect.width as usize;
            let mut rows = map.rows_from(rect.y);
            for y in rect.y..rect.bottom() {
                let src_row = item.image.row(rows.position() as u32);
                rows.advance();

                let mirror_y = 2 * line - 1 - y;
                let mut mirrors = plan
                    .mirrors
                    .iter()
                    .filter(|m| m.source_rect == index && m.rect.y <= mirror_y && mirror_y < m.rect.bottom())
                    .peekable();

                if mirrors.peek().is_none() {
                    map.render_span(src_row, rect.x, view.span_mut(y as u32, rect));
                    continue;
                }

                let row = &mut scratch[..width];
                map.render_span(src_row, rect.x, row);
                let fade = fades[(mirror_y - line) as usize];
                for mirror in mirrors {
                    let dst = view.span_mut(mirror_y as u32, &mirror.rect);
                    let from = (mirror.rect.x - rect.x) as usize;
                    for (px, &src) in dst.iter_mut().zip(&row[from..]) {
                        *px = fade_to_black(src, fade);
                    }
                }
                view.span_mut(y as u32, rect).copy_from_slice(row);
            }
        }
    }
}

fn fill_rect(fb: &mut Framebuffer, rect: &Rect, color: Pixel) {
    let Some(rect) = rect.intersect(&fb.rect()) else {
        return;
    };
    let mut view = fb.view_mut();
    for y in rect.y..rect.bottom() {
        view.span_mut(y as u32, &rect).fill(color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::PixelBuffer;

    const W: u32 = 64;
    const H: u32 = 48;

    fn no_reflection() -> ReflectionConfig {
        ReflectionConfig {
            line: 0,
            height: 0,
            base_fade: 0,
        }
    }

    fn item(id: u64, image: &PixelBuffer, placement: Rect) -> DrawItem<'_> {
        DrawItem {
            id: WindowId(id),
            image: image.view(),
            source: image.rect(),
            placement,
            reflects: true,
        }
    }

    #[test]
    fn test_topmost_window_wins_overlap() {
        let front = PixelBuffer::filled(20, 20, 0x1111);
        let back = PixelBuffer::filled(20, 20, 0x2222);
        let input = FrameInput {
            items: vec![
                item(1, &front, Rect::new(10, 10, 20, 20)),
                item(2, &back, Rect::new(0, 0, 20, 20)),
            ],
            claimed: Vec::new(),
        };
        let mut fb = Framebuffer::new(W, H);
        let report = Compositor::new(no_reflection()).compose(&input, &mut fb);

        assert_eq!(fb.view().pixel(15, 15), 0x1111);
        assert_eq!(fb.view().pixel(5, 5), 0x2222);
        assert_eq!(fb.view().pixel(40, 40), BLACK);
        assert_eq!(report.painted_area(), (W * H) as u64);
    }

    #[test]
    fn test_claimed_area_is_never_painted() {
        let window = PixelBuffer::filled(W, H, 0x3333);
        let input = FrameInput {
            items: vec![item(1, &window, Rect::new(0, 0, W, H))],
            claimed: vec![Rect::new(8, 8, 16, 16)],
        };
        let mut fb = Framebuffer::new(W, H);
        fill_rect(&mut fb, &Rect::new(8, 8, 16, 16), 0xAAAA);
        let report = Compositor::new(no_reflection()).compose(&input, &mut fb);

        assert_eq!(fb.view().pixel(10, 10), 0xAAAA);
        assert_eq!(fb.view().pixel(30, 30), 0x3333);
        assert!(report.painted().all(|r| !r.intersects(&Rect::new(8, 8, 16, 16))));
        assert_eq!(report.painted_area(), (W * H - 16 * 16) as u64);
    }

    #[test]
    fn test_downscale_samples_by_floor() {
        let image = PixelBuffer::from_fn(8, 8, |x, y| (y * 8 + x) as Pixel);
        let input = FrameInput {
            items: vec![item(1, &image, Rect::new(0, 0, 6, 6))],
            claimed: Vec::new(),
        };
        let mut fb = Framebuffer::new(W, H);
        Compositor::new(no_reflection()).compose(&input, &mut fb);

        // Destination column/row j maps to source j * 8 / 6.
        assert_eq!(fb.view().pixel(3, 3), (4 * 8 + 4) as Pixel);
        assert_eq!(fb.view().pixel(5, 1), (8 + 6) as Pixel);
    }

    #[test]
    fn test_upscale_is_rejected_and_cleared() {
        let image = PixelBuffer::filled(4, 4, 0x4444);
        let input = FrameInput {
            items: vec![item(9, &image, Rect::new(0, 0, 8, 8))],
            claimed: Vec::new(),
        };
        let mut fb = Framebuffer::new(W, H);
        let screen = fb.rect();
        fill_rect(&mut fb, &screen, 0xFFFF);
        let report = Compositor::new(no_reflection()).compose(&input, &mut fb);

        assert_eq!(report.rejected, vec![WindowId(9)]);
        assert!(report.content.is_empty());
        assert_eq!(fb.view().pixel(2, 2), BLACK);
        assert_eq!(report.painted_area(), (W * H) as u64);
    }

    #[test]
    fn test_reflection_mirrors_rows_above_line() {
        let reflection = ReflectionConfig {
            line: 32,
            height: 8,
            base_fade: 0,
        };
        let image = PixelBuffer::from_fn(16, 16, |_, y| if y == 15 { 0xFFFF } else { 0x0841 * y as Pixel });
        let input = FrameInput {
            items: vec![item(1, &image, Rect::new(4, 16, 16, 16))],
            claimed: Vec::new(),
        };
        let mut fb = Framebuffer::new(W, H);
        let report = Compositor::new(reflection).compose(&input, &mut fb);

        assert_eq!(report.reflections, vec![(WindowId(1), Rect::new(4, 32, 16, 8))]);
        // Row 31 (last image row) lands on row 32 unfaded.
        assert_eq!(fb.view().pixel(4, 32), 0xFFFF);
        // Outside the window columns there is no reflection.
        assert_eq!(fb.view().pixel(30, 32), BLACK);
        // Further rows fade toward black.
        assert!(fb.view().pixel(4, 39) < fb.view().pixel(4, 33));
        assert_eq!(report.painted_area(), (W * H) as u64);
    }

    #[test]
    fn test_reflection_yields_to_windows_below_line() {
        let reflection = ReflectionConfig {
            line: 32,
            height: 8,
            base_fade: 0,
        };
        let upper = PixelBuffer::filled(16, 16, 0x5555);
        let lower = PixelBuffer::filled(8, 8, 0x6666);
        let input = FrameInput {
            items: vec![
                item(1, &upper, Rect::new(0, 16, 16, 16)),
                item(2, &lower, Rect::new(0, 32, 8, 8)),
            ],
            claimed: Vec::new(),
        };
        let mut fb = Framebuffer::new(W, H);
        let report = Compositor::new(reflection).compose(&input, &mut fb);

        assert_eq!(fb.view().pixel(2, 34), 0x6666);
        assert!(report
            .reflections
            .iter()
            .all(|(_, r)| !r.intersects(&Rect::new(0, 32, 8, 8))));
        assert_eq!(report.painted_area(), (W * H) as u64);
    }
}
