//! Scanline copy, stretch and fade primitives.
//!
//! The stretch walks the source with a Bresenham-style error accumulator:
//! each destination pixel advances the source position by the integer part
//! of `src_len / dst_len`, plus one more whenever the accumulated remainder
//! crosses `dst_len`. For the downscales the compositor performs that is a
//! step of one or two source pixels. The same stepper picks source rows.

use crate::error::{AnimatorError, Result};
use crate::geometry::Rect;
use crate::surface::Pixel;

/// Fixed-point walker mapping destination indices onto source indices.
#[derive(Debug, Clone, Copy)]
pub struct Bresenham {
    pos: i64,
    err: u64,
    whole: i64,
    frac: u64,
    span: u64,
}

impl Bresenham {
    /// Walker for `dst_len` destination pixels covering `src_len` source
    /// pixels starting at `src_start`, positioned at destination offset
    /// `dst_offset`.
    pub fn new(src_start: i32, src_len: u32, dst_len: u32, dst_offset: u32) -> Self {
        let span = dst_len.max(1) as u64;
        let src_len = src_len as u64;
        let travelled = dst_offset as u64 * src_len;
        Bresenham {
            pos: src_start as i64 + (travelled / span) as i64,
            err: travelled % span,
            whole: (src_len / span) as i64,
            frac: src_len % span,
            span,
        }
    }

    /// Current source index.
    pub fn position(&self) -> usize {
        self.pos as usize
    }

    pub fn advance(&mut self) {
        self.pos += self.whole;
        self.err += self.frac;
        if self.err >= self.span {
            self.err -= self.span;
            self.pos += 1;
        }
    }
}

/// How a placement maps back onto the part of the image it shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScaleMap {
    /// Part of the source image.
    pub source: Rect,
    /// Where it lands on screen.
    pub placement: Rect,
}

impl ScaleMap {
    /// Fails for any mapping that would enlarge the source.
    pub fn new(source: Rect, placement: Rect) -> Result<Self> {
        if placement.width > source.width || placement.height > source.height {
            return Err(AnimatorError::Upscale {
                src_width: source.width,
                src_height: source.height,
                dst_width: placement.width,
                dst_height: placement.height,
            });
        }
        Ok(ScaleMap { source, placement })
    }

    pub fn is_identity(&self) -> bool {
        self.source.size() == self.placement.size()
    }

    /// Row walker starting at screen row `y`.
    pub fn rows_from(&self, y: i32) -> Bresenham {
        Bresenham::new(
            self.source.y,
            self.source.height,
            self.placement.height,
            (y - self.placement.y) as u32,
        )
    }

    /// Column walker starting at screen column `x`.
    pub fn columns_from(&self, x: i32) -> Bresenham {
        Bresenham::new(
            self.source.x,
            self.source.width,
            self.placement.width,
            (x - self.placement.x) as u32,
        )
    }

    /// Fill `out` with the pixels of one screen row segment starting at
    /// screen column `x`. `src_row` is the whole source image row.
    pub fn render_span(&self, src_row: &[Pixel], x: i32, out: &mut [Pixel]) {
        if self.is_identity() {
            let start = (self.source.x + (x - self.placement.x)) as usize;
            out.copy_from_slice(&src_row[start..start + out.len()]);
            return;
        }
        let mut columns = self.columns_from(x);
        for px in out.iter_mut() {
            *px = src_row[columns.position()];
            columns.advance();
        }
    }
}

/// Exact division by 255 for products of two 8-bit values.
#[inline(always)]
fn div255(x: u32) -> u32 {
    (x + 1 + (x >> 8)) >> 8
}

/// Blend an RGB565 pixel toward black by `fade` (0 keeps it, 255 is black).
#[inline]
pub fn fade_to_black(p: Pixel, fade: u8) -> Pixel {
    if fade == 0 {
        return p;
    }
    let keep = 255 - fade as u32;
    let r = div255(((p >> 11) & 0x1F) as u32 * keep);
    let g = div255(((p >> 5) & 0x3F) as u32 * keep);
    let b = div255((p & 0x1F) as u32 * keep);
    ((r << 11) | (g << 5) | b) as Pixel
}
