//! Screen areas owned by out-of-process renderers.

use std::collections::BTreeMap;

use crate::geometry::{Rect, Region};

/// Identity of a reservation, typically one per peer connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReservationId(pub u64);

/// Rectangles the compositor must never paint, keyed by owner.
#[derive(Debug, Default)]
pub struct ReservedRegionTracker {
    regions: BTreeMap<ReservationId, Rect>,
}

impl ReservedRegionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace the rectangle owned by `id`.
    pub fn add(&mut self, id: ReservationId, rect: Rect) -> Option<Rect> {
        log::debug!("[Coverflow Reserved] {:?} claims {:?}", id, rect);
        self.regions.insert(id, rect)
    }

    pub fn remove(&mut self, id: ReservationId) -> Option<Rect> {
        let removed = self.regions.remove(&id);
        if removed.is_some() {
            log::debug!("[Coverflow Reserved] {:?} released", id);
        }
        removed
    }

    pub fn get(&self, id: ReservationId) -> Option<Rect> {
        self.regions.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn rects(&self) -> impl Iterator<Item = Rect> + '_ {
        self.regions.values().copied()
    }

    /// Union of all reserved rectangles.
    pub fn region(&self) -> Region {
        self.rects().collect()
    }
}
