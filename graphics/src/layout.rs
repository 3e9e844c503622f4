//! Overview and focused layouts.
//!
//! A layout pass assigns every drawable window a destination rectangle and
//! records the left-to-right paging order. Windows glide toward their
//! destination through [`crate::animation::AnimationEngine`].
//!
//! # Overview paging
//!
//! ```text
//!        left extent                 right extent
//!            |                            |
//!   [ #3 ]  [ #1 ]   [ anchor #0 ]   [ #2 ]  [ #4 ]
//!   --------------------baseline--------------------
//! ```
//!
//! Windows are visited topmost first. The first becomes the centered
//! anchor; the n-th visited window (anchor = 1) is appended to the right
//! when n is even and to the left when n is odd.

use std::collections::VecDeque;

use hashbrown::HashMap;

use crate::config::AnimatorConfig;
use crate::geometry::{Rect, Region};
use crate::window::{Window, WindowId, WindowRegistry};

/// The two layout modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayoutMode {
    /// Every window at its natural placement.
    #[default]
    Focused,
    /// Shrunk, side by side, pageable.
    Overview,
}

impl LayoutMode {
    pub fn flipped(self) -> Self {
        match self {
            LayoutMode::Focused => LayoutMode::Overview,
            LayoutMode::Overview => LayoutMode::Focused,
        }
    }
}

/// Per-window animation bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationState {
    /// Part of the window image that is shown.
    pub image_rect: Rect,
    /// Current, possibly interpolated, placement.
    pub window_rect: Rect,
    pub from_rect: Rect,
    pub dest_rect: Rect,
    pub is_decoration: bool,
}

impl AnimationState {
    /// A state already at its destination.
    pub fn at_rest(image_rect: Rect, dest_rect: Rect, is_decoration: bool) -> Self {
        AnimationState {
            image_rect,
            window_rect: dest_rect,
            from_rect: dest_rect,
            dest_rect,
            is_decoration,
        }
    }
}

/// Where and what part of a window is shown this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub image_rect: Rect,
    pub window_rect: Rect,
    pub is_decoration: bool,
}

/// Left-to-right paging order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayoutOrder {
    ids: Vec<WindowId>,
    focus_index: Option<usize>,
}

impl LayoutOrder {
    pub fn ids(&self) -> &[WindowId] {
        &self.ids
    }

    pub fn focus_index(&self) -> Option<usize> {
        self.focus_index
    }

    pub fn focused(&self) -> Option<WindowId> {
        self.focus_index.and_then(|i| self.ids.get(i).copied())
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    fn remove(&mut self, id: WindowId) {
        let Some(index) = self.ids.iter().position(|&w| w == id) else {
            return;
        };
        self.ids.remove(index);
        self.focus_index = match self.focus_index {
            _ if self.ids.is_empty() => None,
            Some(f) if f > index => Some(f - 1),
            Some(f) => Some(f.min(self.ids.len() - 1)),
            None => None,
        };
    }
}

/// Fixed layout parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutParams {
    pub screen: Rect,
    pub shrink_numerator: u32,
    pub shrink_denominator: u32,
    pub spacing: u32,
    pub baseline: i32,
    pub decoration_caption: String,
}

impl LayoutParams {
    pub fn new(screen: Rect, config: &AnimatorConfig) -> Self {
        LayoutParams {
            screen,
            shrink_numerator: config.shrink_numerator,
            shrink_denominator: config.shrink_denominator,
            spacing: config.page_spacing,
            baseline: config.baseline(),
            decoration_caption: config.decoration_caption.clone(),
        }
    }

    fn shrink(&self, length: u32) -> u32 {
        (length as u64 * self.shrink_numerator as u64 / self.shrink_denominator as u64) as u32
    }
}

/// Computes destinations for the overview and focused layouts.
#[derive(Debug)]
pub struct LayoutEngine {
    params: LayoutParams,
    mode: LayoutMode,
    order: LayoutOrder,
    states: HashMap<WindowId, AnimationState>,
    /// Placements left behind by a cancelled animation.
    frozen: HashMap<WindowId, Placement>,
}

impl LayoutEngine {
    pub fn new(params: LayoutParams) -> Self {
        LayoutEngine {
            params,
            mode: LayoutMode::default(),
            order: LayoutOrder::default(),
            states: HashMap::new(),
            frozen: HashMap::new(),
        }
    }

    pub fn params(&self) -> &LayoutParams {
        &self.params
    }

    pub fn mode(&self) -> LayoutMode {
        self.mode
    }

    pub fn order(&self) -> &LayoutOrder {
        &self.order
    }

    pub fn state(&self, id: WindowId) -> Option<&AnimationState> {
        self.states.get(&id)
    }

    pub fn states(&self) -> &HashMap<WindowId, AnimationState> {
        &self.states
    }

    pub(crate) fn states_mut(&mut self) -> impl Iterator<Item = &mut AnimationState> + '_ {
        self.states.values_mut()
    }

    /// Whether a layout currently drives window placement.
    pub fn is_active(&self) -> bool {
        !self.states.is_empty()
    }

    /// Whether every window has reached its destination.
    pub fn is_settled(&self) -> bool {
        self.states.values().all(|s| s.window_rect == s.dest_rect)
    }

    /// Placement the compositor should use, if the layout overrides the
    /// window's own screen rectangle.
    pub fn placement(&self, id: WindowId) -> Option<Placement> {
        if let Some(state) = self.states.get(&id) {
            return Some(Placement {
                image_rect: state.image_rect,
                window_rect: state.window_rect,
                is_decoration: state.is_decoration,
            });
        }
        self.frozen.get(&id).copied()
    }

    /// Lay out the opposite mode and flip the mode flag.
    pub fn toggle(&mut self, registry: &WindowRegistry) {
        let target = self.mode.flipped();
        self.layout(registry, target);
        self.mode = target;
        log::debug!(
            "[Coverflow Layout] Switched to {:?}, order {:?}, focus {:?}",
            self.mode,
            self.order.ids,
            self.order.focus_index
        );
    }

    /// Lay out the current mode again after window membership changed.
    pub fn relayout(&mut self, registry: &WindowRegistry) {
        self.layout(registry, self.mode);
    }

    /// Drop all animation state; windows stay where they currently are.
    pub fn freeze(&mut self) {
        for (id, state) in self.states.drain() {
            self.frozen.insert(
                id,
                Placement {
                    image_rect: state.image_rect,
                    window_rect: state.window_rect,
                    is_decoration: state.is_decoration,
                },
            );
        }
    }

    /// Forget everything about a window that left the registry or became
    /// reserved.
    pub fn forget(&mut self, id: WindowId) {
        self.states.remove(&id);
        self.frozen.remove(&id);
        self.order.remove(id);
    }

    /// Move the paging focus one step. Every paged window's destination is
    /// shifted so the new anchor lands where the previous one was headed.
    ///
    /// Returns `false` without touching anything when the move would leave
    /// the paging order.
    pub fn shift_focus(&mut self, delta: isize) -> bool {
        let Some(current) = self.order.focus_index else {
            return false;
        };
        let Some(next) = current.checked_add_signed(delta) else {
            return false;
        };
        if next >= self.order.ids.len() {
            return false;
        }

        let (Some(old_anchor), Some(new_anchor)) = (
            self.states.get(&self.order.ids[current]).map(|s| s.dest_rect),
            self.states.get(&self.order.ids[next]).map(|s| s.dest_rect),
        ) else {
            return false;
        };
        let dx = old_anchor.x - new_anchor.x;
        let dy = old_anchor.y - new_anchor.y;

        for id in &self.order.ids {
            if let Some(state) = self.states.get_mut(id) {
                state.dest_rect = state.dest_rect.translate(dx, dy);
            }
        }
        self.order.focus_index = Some(next);
        log::debug!("[Coverflow Layout] Focus moved to index {}", next);
        true
    }

    fn layout(&mut self, registry: &WindowRegistry, target: LayoutMode) {
        let params = &self.params;
        let screen = params.screen;
        let is_decoration =
            |w: &Window| registry.caption(w.id()) == Some(params.decoration_caption.as_str());

        let (decorations, contents): (Vec<&Window>, Vec<&Window>) = registry
            .front_to_back()
            .filter(|w| w.is_drawable())
            .partition(|w| is_decoration(*w));

        let decoration_region: Region = decorations.iter().map(|w| w.screen_rect()).collect();

        let mut settled: Vec<(WindowId, Rect, Rect, bool)> = Vec::new();

        for window in &decorations {
            let Some(image) = window.image() else { continue };
            let rect = window.screen_rect();
            let dest = match target {
                LayoutMode::Focused => rect,
                LayoutMode::Overview => slide_off_screen(rect, screen),
            };
            settled.push((window.id(), image.rect(), dest, true));
        }

        let mut strip = PagingStrip::new(screen, params.spacing);
        let mut natural_order = Vec::new();
        for window in &contents {
            let Some((image_rect, usable)) = usable_source(window, screen, &decoration_region)
            else {
                continue;
            };
            let dest = match target {
                LayoutMode::Focused => {
                    natural_order.push(window.id());
                    usable
                }
                LayoutMode::Overview => {
                    let width = params.shrink(usable.width);
                    let height = params.shrink(usable.height);
                    let x = strip.place(window.id(), width);
                    Rect::new(x, params.baseline - height as i32, width, height)
                }
            };
            settled.push((window.id(), image_rect, dest, false));
        }

        self.order = match target {
            LayoutMode::Overview => strip.into_order(),
            LayoutMode::Focused => LayoutOrder {
                ids: natural_order,
                focus_index: None,
            },
        };

        let laid_out: Vec<WindowId> = settled.iter().map(|s| s.0).collect();
        self.states.retain(|id, _| laid_out.contains(id));
        self.frozen.clear();

        for (id, image_rect, dest, decoration) in settled {
            match self.states.get_mut(&id) {
                Some(state) => {
                    state.from_rect = state.window_rect;
                    state.dest_rect = dest;
                    state.image_rect = image_rect;
                    state.is_decoration = decoration;
                }
                None => {
                    self.states
                        .insert(id, AnimationState::at_rest(image_rect, dest, decoration));
                }
            }
        }
    }
}

/// Destination that moves a decoration fully off the screen edge it is
/// closest to.
fn slide_off_screen(rect: Rect, screen: Rect) -> Rect {
    let mid = screen.y + (screen.height / 2) as i32;
    if rect.y < mid {
        Rect::new(rect.x, screen.y - rect.height as i32, rect.width, rect.height)
    } else {
        Rect::new(rect.x, screen.bottom(), rect.width, rect.height)
    }
}

/// The visible part of a window and the matching part of its image.
///
/// The screen rect is clipped to the screen and reduced by the decoration
/// region; when the result no longer matches the image size the image rect
/// is cropped through the screen-to-image scale.
fn usable_source(window: &Window, screen: Rect, decorations: &Region) -> Option<(Rect, Rect)> {
    let image = window.image()?;
    let placed = window.screen_rect();
    let clipped = placed.intersect(&screen)?;

    let mut remainder = Region::from_rect(clipped);
    remainder.subtract_region(decorations);
    let usable = remainder.bounds()?;

    let (iw, ih) = (image.width(), image.height());
    if usable.size() == (iw, ih) {
        return Some((image.rect(), usable));
    }

    let to_image = |offset: i32, extent: u32, image_extent: u32| -> i32 {
        (offset as i64 * image_extent as i64 / extent.max(1) as i64) as i32
    };
    let cropped = Rect::from_edges(
        to_image(usable.x - placed.x, placed.width, iw),
        to_image(usable.y - placed.y, placed.height, ih),
        to_image(usable.right() - placed.x, placed.width, iw),
        to_image(usable.bottom() - placed.y, placed.height, ih),
    )
    .intersect(&image.rect())?;

    Some((cropped, usable))
}

/// Running extents of the overview strip.
struct PagingStrip {
    screen: Rect,
    spacing: i32,
    ids: VecDeque<WindowId>,
    anchor: usize,
    left: i32,
    right: i32,
}

impl PagingStrip {
    fn new(screen: Rect, spacing: u32) -> Self {
        PagingStrip {
            screen,
            spacing: spacing as i32,
            ids: VecDeque::new(),
            anchor: 0,
            left: 0,
            right: 0,
        }
    }

    /// Place the next window and return its left edge.
    fn place(&mut self, id: WindowId, width: u32) -> i32 {
        let count = self.ids.len() + 1;
        let width = width as i32;
        if count == 1 {
            let x = self.screen.x + (self.screen.width as i32 - width) / 2;
            self.left = x;
            self.right = x + width;
            self.ids.push_back(id);
            x
        } else if count % 2 == 0 {
            let x = self.right + self.spacing;
            self.right = x + width;
            self.ids.push_back(id);
            x
        } else {
            let x = self.left - self.spacing - width;
            self.left = x;
            self.ids.push_front(id);
            self.anchor += 1;
            x
        }
    }

    fn into_order(self) -> LayoutOrder {
        let focus_index = (!self.ids.is_empty()).then_some(self.anchor);
        LayoutOrder {
            ids: self.ids.into(),
            focus_index,
        }
    }
}
