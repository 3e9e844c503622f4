//! Window registry.
//!
//! Tracks every client window the window system reported, its latest
//! content, its z-order and its caption. Captions only matter for the
//! decoration sentinel the layout engine special-cases.

use bitflags::bitflags;
use hashbrown::HashMap;

use crate::geometry::Rect;
use crate::surface::{PixelBuffer, WindowImage};

/// Opaque window identifier assigned by the window system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WindowId(pub u64);

bitflags! {
    /// Per-window state flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct WindowFlags: u32 {
        /// Pixels are owned by another process; never paint over them.
        const RESERVED = 1 << 0;
        /// Submitted in a format the compositor cannot blit. Always paired
        /// with `RESERVED`.
        const FOREIGN_FORMAT = 1 << 1;
    }
}

/// A client window.
#[derive(Debug, Clone)]
pub struct Window {
    id: WindowId,
    image: Option<PixelBuffer>,
    screen_rect: Rect,
    flags: WindowFlags,
}

impl Window {
    pub fn id(&self) -> WindowId {
        self.id
    }

    pub fn image(&self) -> Option<&PixelBuffer> {
        self.image.as_ref()
    }

    pub fn screen_rect(&self) -> Rect {
        self.screen_rect
    }

    pub fn flags(&self) -> WindowFlags {
        self.flags
    }

    pub fn is_reserved(&self) -> bool {
        self.flags.contains(WindowFlags::RESERVED)
    }

    /// Whether the compositor paints this window itself.
    pub fn is_drawable(&self) -> bool {
        !self.is_reserved() && self.image.is_some()
    }
}

/// Whether an update introduced a new window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Membership {
    Added,
    Updated,
}

/// The set of known windows and their stacking order.
#[derive(Debug, Default)]
pub struct WindowRegistry {
    windows: HashMap<WindowId, Window>,
    /// Back to front.
    stacking: Vec<WindowId>,
    captions: HashMap<WindowId, String>,
}

impl WindowRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    pub fn get(&self, id: WindowId) -> Option<&Window> {
        self.windows.get(&id)
    }

    pub fn contains(&self, id: WindowId) -> bool {
        self.windows.contains_key(&id)
    }

    pub fn caption(&self, id: WindowId) -> Option<&str> {
        self.captions.get(&id).map(String::as_str)
    }

    /// Stacking order, back to front, restricted to registered windows.
    pub fn stacking(&self) -> Vec<WindowId> {
        self.stacking
            .iter()
            .copied()
            .filter(|id| self.windows.contains_key(id))
            .collect()
    }

    /// Registered windows, topmost first.
    pub fn front_to_back(&self) -> impl Iterator<Item = &Window> + '_ {
        self.stacking
            .iter()
            .rev()
            .filter_map(move |id| self.windows.get(id))
    }

    /// Insert or replace a window record.
    ///
    /// An image in a format the compositor cannot blit downgrades the window
    /// to reserved: its area is kept clear of other content instead.
    pub fn upsert(
        &mut self,
        id: WindowId,
        image: Option<WindowImage>,
        screen_rect: Rect,
        reserved: bool,
    ) -> Membership {
        let mut flags = WindowFlags::empty();
        if reserved {
            flags |= WindowFlags::RESERVED;
        }

        let image = match image {
            Some(image) if !image.format().is_compositable() => {
                log::debug!(
                    "[Coverflow Window] Window {:?} uses {:?}, treating as reserved",
                    id,
                    image.format()
                );
                flags |= WindowFlags::RESERVED | WindowFlags::FOREIGN_FORMAT;
                None
            }
            Some(image) => image.into_pixel_buffer(),
            None => None,
        };
        let image = if flags.contains(WindowFlags::RESERVED) {
            None
        } else {
            image
        };

        let window = Window {
            id,
            image,
            screen_rect,
            flags,
        };

        match self.windows.insert(id, window) {
            Some(_) => Membership::Updated,
            None => {
                if !self.stacking.contains(&id) {
                    self.stacking.push(id);
                }
                log::debug!("[Coverflow Window] Added window {:?} at {:?}", id, screen_rect);
                Membership::Added
            }
        }
    }

    /// Forget a destroyed or hidden window.
    pub fn remove(&mut self, id: WindowId) -> Option<Window> {
        let removed = self.windows.remove(&id)?;
        self.stacking.retain(|&w| w != id);
        log::debug!("[Coverflow Window] Removed window {:?}", id);
        Some(removed)
    }

    /// React to a geometry change.
    ///
    /// Non-reserved windows are dropped so the next content update adds them
    /// afresh with matching pixels. Reserved windows keep their record.
    pub fn on_geometry_changed(&mut self, id: WindowId, new_rect: Rect) -> bool {
        match self.windows.get(&id) {
            Some(window) if !window.is_reserved() => {
                log::trace!(
                    "[Coverflow Window] Window {:?} moved to {:?}, awaiting new content",
                    id,
                    new_rect
                );
                self.remove(id).is_some()
            }
            _ => false,
        }
    }

    /// Replace the stacking order (back to front) and caption map with an
    /// authoritative snapshot from the window system.
    ///
    /// Registered windows the snapshot does not mention keep their relative
    /// order above everything it does.
    pub fn snapshot_order(
        &mut self,
        z_ordered: Vec<WindowId>,
        captions: impl IntoIterator<Item = (WindowId, String)>,
    ) {
        let missing: Vec<WindowId> = self
            .stacking
            .iter()
            .copied()
            .filter(|id| self.windows.contains_key(id) && !z_ordered.contains(id))
            .collect();

        let mut stacking = z_ordered;
        stacking.dedup();
        stacking.extend(missing);
        self.stacking = stacking;
        self.captions = captions.into_iter().collect();
    }

    /// Move a window to the top of the stack.
    pub fn raise_to_front(&mut self, id: WindowId) {
        if !self.windows.contains_key(&id) {
            return;
        }
        self.stacking.retain(|&w| w != id);
        self.stacking.push(id);
    }
}
