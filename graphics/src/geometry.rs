//! Rectangles and regions for exposure tracking.
//!
//! A [`Region`] is a set of pairwise-disjoint rectangles. Every operation
//! keeps that invariant, so the area of a region is the sum of the areas of
//! its rectangles and a pixel belongs to at most one of them.

/// Axis-aligned rectangle with integer coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    /// Create new rectangle
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Build a rectangle from its edges. Inverted edges yield an empty rect.
    pub fn from_edges(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        if right <= left || bottom <= top {
            return Rect::new(left, top, 0, 0);
        }
        Rect::new(left, top, (right - left) as u32, (bottom - top) as u32)
    }

    pub fn right(&self) -> i32 {
        self.x + self.width as i32
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height as i32
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Calculate area
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn contains(&self, px: i32, py: i32) -> bool {
        px >= self.x && px < self.right() && py >= self.y && py < self.bottom()
    }

    /// Check if rectangles overlap
    pub fn intersects(&self, other: &Rect) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    /// Compute intersection of two rectangles. Returns None if no overlap.
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let r = Rect::from_edges(
            self.x.max(other.x),
            self.y.max(other.y),
            self.right().min(other.right()),
            self.bottom().min(other.bottom()),
        );
        (!r.is_empty()).then_some(r)
    }

    /// Bounding box of two rectangles. Empty operands are ignored.
    pub fn union(&self, other: &Rect) -> Rect {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        Rect::from_edges(
            self.x.min(other.x),
            self.y.min(other.y),
            self.right().max(other.right()),
            self.bottom().max(other.bottom()),
        )
    }

    pub fn translate(&self, dx: i32, dy: i32) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// The parts of `self` not covered by `other`, as at most four
    /// disjoint bands (above, below, left, right).
    pub fn subtract(&self, other: &Rect) -> Vec<Rect> {
        let Some(cut) = self.intersect(other) else {
            return if self.is_empty() { Vec::new() } else { vec![*self] };
        };

        let mut pieces = Vec::with_capacity(4);
        let above = Rect::from_edges(self.x, self.y, self.right(), cut.y);
        let below = Rect::from_edges(self.x, cut.bottom(), self.right(), self.bottom());
        let left = Rect::from_edges(self.x, cut.y, cut.x, cut.bottom());
        let right = Rect::from_edges(cut.right(), cut.y, self.right(), cut.bottom());
        for piece in [above, below, left, right] {
            if !piece.is_empty() {
                pieces.push(piece);
            }
        }
        pieces
    }
}

/// A set of disjoint rectangles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Region {
    rects: Vec<Rect>,
}

impl Region {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rect(rect: Rect) -> Self {
        let mut region = Region::new();
        region.add_rect(rect);
        region
    }

    pub fn rects(&self) -> &[Rect] {
        &self.rects
    }

    pub fn into_rects(self) -> Vec<Rect> {
        self.rects
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    /// Get total covered area
    pub fn area(&self) -> u64 {
        self.rects.iter().map(Rect::area).sum()
    }

    /// Bounding box of the whole region.
    pub fn bounds(&self) -> Option<Rect> {
        let first = *self.rects.first()?;
        Some(self.rects.iter().fold(first, |acc, r| acc.union(r)))
    }

    pub fn contains(&self, px: i32, py: i32) -> bool {
        self.rects.iter().any(|r| r.contains(px, py))
    }

    pub fn intersects_rect(&self, rect: &Rect) -> bool {
        self.rects.iter().any(|r| r.intersects(rect))
    }

    /// Add a rectangle; only the part not already covered is stored.
    pub fn add_rect(&mut self, rect: Rect) {
        if rect.is_empty() {
            return;
        }
        let mut fresh = vec![rect];
        for existing in &self.rects {
            fresh = fresh.iter().flat_map(|p| p.subtract(existing)).collect();
            if fresh.is_empty() {
                return;
            }
        }
        self.rects.extend(fresh);
    }

    pub fn add_region(&mut self, other: &Region) {
        for rect in &other.rects {
            self.add_rect(*rect);
        }
    }

    pub fn subtract_rect(&mut self, rect: &Rect) {
        if rect.is_empty() {
            return;
        }
        self.rects = self.rects.iter().flat_map(|r| r.subtract(rect)).collect();
    }

    pub fn subtract_region(&mut self, other: &Region) {
        for rect in &other.rects {
            self.subtract_rect(rect);
        }
    }

    /// Clip every rectangle of the region to `rect`.
    pub fn intersect_rect(&self, rect: &Rect) -> Region {
        Region {
            rects: self.rects.iter().filter_map(|r| r.intersect(rect)).collect(),
        }
    }
}

impl FromIterator<Rect> for Region {
    fn from_iter<I: IntoIterator<Item = Rect>>(iter: I) -> Self {
        let mut region = Region::new();
        for rect in iter {
            region.add_rect(rect);
        }
        region
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_intersects() {
        let r1 = Rect::new(0, 0, 100, 100);
        let r2 = Rect::new(50, 50, 100, 100);
        let r3 = Rect::new(200, 200, 100, 100);

        assert!(r1.intersects(&r2));
        assert!(!r1.intersects(&r3));
        assert_eq!(r1.intersect(&r2), Some(Rect::new(50, 50, 50, 50)));
        assert_eq!(r1.intersect(&r3), None);
    }

    #[test]
    fn test_touching_rects_do_not_intersect() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(10, 0, 10, 10);
        assert!(!a.intersects(&b));
    }

    #[test]
    fn test_subtract_hole_leaves_four_bands() {
        let outer = Rect::new(0, 0, 30, 30);
        let hole = Rect::new(10, 10, 10, 10);
        let pieces = outer.subtract(&hole);

        assert_eq!(pieces.len(), 4);
        let area: u64 = pieces.iter().map(Rect::area).sum();
        assert_eq!(area, 900 - 100);
        assert!(pieces.iter().all(|p| !p.intersects(&hole)));
    }

    #[test]
    fn test_region_add_keeps_rects_disjoint() {
        let mut region = Region::new();
        region.add_rect(Rect::new(0, 0, 100, 100));
        region.add_rect(Rect::new(50, 50, 100, 100));

        assert_eq!(region.area(), 100 * 100 * 2 - 50 * 50);
        for (i, a) in region.rects().iter().enumerate() {
            for b in &region.rects()[i + 1..] {
                assert!(!a.intersects(b));
            }
        }
        assert_eq!(region.bounds(), Some(Rect::new(0, 0, 150, 150)));
    }

    #[test]
    fn test_region_subtract() {
        let mut region = Region::from_rect(Rect::new(0, 0, 100, 100));
        region.subtract_rect(&Rect::new(0, 0, 100, 40));

        assert_eq!(region.rects(), &[Rect::new(0, 40, 100, 60)]);

        region.subtract_rect(&Rect::new(-10, -10, 200, 200));
        assert!(region.is_empty());
    }

    #[test]
    fn test_region_intersect_rect() {
        let region: Region = [Rect::new(0, 0, 10, 10), Rect::new(20, 0, 10, 10)]
            .into_iter()
            .collect();
        let clipped = region.intersect_rect(&Rect::new(5, 0, 20, 5));

        assert_eq!(clipped.area(), 5 * 5 + 5 * 5);
        assert!(clipped.contains(5, 0));
        assert!(!clipped.contains(12, 0));
    }
}
