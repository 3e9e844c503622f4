//! Scene state and the synchronous event dispatcher.
//!
//! A [`Scene`] bundles everything the render thread and the event sources
//! share: the window registry, reserved regions, layout and animation
//! state, the compositor and the framebuffer. Events are applied one at a
//! time; each marks the scene dirty so the next render pass repaints.

use crate::animation::{AnimationEngine, PanDirection};
use crate::compositor::{Compositor, DrawItem, FrameInput, FrameReport};
use crate::config::AnimatorConfig;
use crate::error::Result;
use crate::framebuffer::Framebuffer;
use crate::geometry::Rect;
use crate::layout::{LayoutEngine, LayoutMode, LayoutParams};
use crate::reserved::{ReservationId, ReservedRegionTracker};
use crate::surface::WindowImage;
use crate::window::{Membership, WindowId, WindowRegistry};

/// Navigation command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Toggle between overview and focused layout.
    Go,
    /// Page the overview one window left.
    Left,
    /// Page the overview one window right.
    Right,
    /// Anything else. Cancels a running animation.
    Other(String),
}

impl Command {
    /// Parse a command token such as `"go()"`. Surrounding whitespace is
    /// ignored; unknown tokens are kept verbatim.
    pub fn parse(token: &str) -> Command {
        match token.trim() {
            "go()" => Command::Go,
            "left()" => Command::Left,
            "right()" => Command::Right,
            other => Command::Other(other.to_string()),
        }
    }
}

impl From<&str> for Command {
    fn from(token: &str) -> Self {
        Command::parse(token)
    }
}

/// Notifications from the window system.
#[derive(Debug)]
pub enum WindowEvent {
    /// A window exists; its content follows in an `Updated` event.
    Created { id: WindowId },
    /// New content or placement for a window.
    Updated {
        id: WindowId,
        image: Option<WindowImage>,
        screen_rect: Rect,
        reserved: bool,
    },
    Destroyed { id: WindowId },
    Hidden { id: WindowId },
    GeometryChanged { id: WindowId, screen_rect: Rect },
    /// A window gained focus and moved to the top of the stack.
    Activated { id: WindowId },
    /// Authoritative stacking order (back to front) and captions.
    Stacking {
        order: Vec<WindowId>,
        captions: Vec<(WindowId, String)>,
    },
}

/// Everything that can change the scene.
#[derive(Debug)]
pub enum Event {
    Window(WindowEvent),
    Command(Command),
    Reserve { id: ReservationId, rect: Rect },
    Release { id: ReservationId },
}

impl From<WindowEvent> for Event {
    fn from(event: WindowEvent) -> Self {
        Event::Window(event)
    }
}

impl From<Command> for Event {
    fn from(command: Command) -> Self {
        Event::Command(command)
    }
}

/// All state guarded by the animator lock.
#[derive(Debug)]
pub struct Scene {
    config: AnimatorConfig,
    registry: WindowRegistry,
    reserved: ReservedRegionTracker,
    layout: LayoutEngine,
    animation: AnimationEngine,
    compositor: Compositor,
    framebuffer: Framebuffer,
    dirty: bool,
    shutdown: bool,
    frames: u64,
    last_report: Option<FrameReport>,
}

impl Scene {
    pub fn new(framebuffer: Framebuffer, config: AnimatorConfig) -> Result<Self> {
        config.validate()?;
        let layout = LayoutEngine::new(LayoutParams::new(framebuffer.rect(), &config));
        Ok(Scene {
            registry: WindowRegistry::new(),
            reserved: ReservedRegionTracker::new(),
            layout,
            animation: AnimationEngine::new(config.steps),
            compositor: Compositor::new(config.reflection),
            framebuffer,
            dirty: true,
            shutdown: false,
            frames: 0,
            last_report: None,
            config,
        })
    }

    pub fn config(&self) -> &AnimatorConfig {
        &self.config
    }

    pub fn registry(&self) -> &WindowRegistry {
        &self.registry
    }

    pub fn reserved(&self) -> &ReservedRegionTracker {
        &self.reserved
    }

    pub fn layout(&self) -> &LayoutEngine {
        &self.layout
    }

    pub fn animation(&self) -> &AnimationEngine {
        &self.animation
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    /// Report of the most recent composite, if any.
    pub fn last_report(&self) -> Option<&FrameReport> {
        self.last_report.as_ref()
    }

    /// Frames composed so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_active()
    }

    /// Whether the render loop has anything to do.
    pub fn has_work(&self) -> bool {
        self.dirty || self.shutdown || self.animation.is_active()
    }

    pub fn is_shutdown(&self) -> bool {
        self.shutdown
    }

    pub(crate) fn request_shutdown(&mut self) {
        self.shutdown = true;
    }

    /// Apply one event.
    pub fn apply(&mut self, event: Event) {
        match &event {
            Event::Command(_) | Event::Reserve { .. } | Event::Release { .. } => {
                log::debug!("[Coverflow Scene] {:?}", event)
            }
            Event::Window(_) => log::trace!("[Coverflow Scene] {:?}", event),
        }

        match event {
            Event::Window(window_event) => self.on_window_event(window_event),
            Event::Command(command) => self.on_command(command),
            Event::Reserve { id, rect } => {
                self.reserved.add(id, rect);
            }
            Event::Release { id } => {
                self.reserved.remove(id);
            }
        }
        self.dirty = true;
    }

    fn on_window_event(&mut self, event: WindowEvent) {
        match event {
            WindowEvent::Created { id } => {
                log::trace!("[Coverflow Scene] Window {:?} created, awaiting content", id);
            }
            WindowEvent::Updated {
                id,
                image,
                screen_rect,
                reserved,
            } => {
                let was_reserved = self.registry.get(id).map(|w| w.is_reserved());
                let membership = self.registry.upsert(id, image, screen_rect, reserved);
                let now_reserved = self.registry.get(id).is_some_and(|w| w.is_reserved());

                if now_reserved {
                    self.layout.forget(id);
                }
                let changed = membership == Membership::Added || was_reserved != Some(now_reserved);
                if changed {
                    self.membership_changed();
                }
            }
            WindowEvent::Destroyed { id } | WindowEvent::Hidden { id } => {
                if self.registry.remove(id).is_some() {
                    self.layout.forget(id);
                    self.membership_changed();
                }
            }
            WindowEvent::GeometryChanged { id, screen_rect } => {
                if self.registry.on_geometry_changed(id, screen_rect) {
                    self.layout.forget(id);
                    self.membership_changed();
                }
            }
            WindowEvent::Activated { id } => self.registry.raise_to_front(id),
            WindowEvent::Stacking { order, captions } => {
                self.registry.snapshot_order(order, captions);
            }
        }
    }

    /// Re-lay out the current mode if a layout drives placement, and glide
    /// displaced windows to their new slots.
    fn membership_changed(&mut self) {
        if !self.layout.is_active() {
            return;
        }
        self.layout.relayout(&self.registry);
        if !self.layout.is_settled() {
            self.animation.start();
        }
    }

    fn on_command(&mut self, command: Command) {
        match command {
            Command::Go => {
                if self.layout.mode() == LayoutMode::Overview {
                    if let Some(focused) = self.layout.order().focused() {
                        self.registry.raise_to_front(focused);
                    }
                }
                self.layout.toggle(&self.registry);
                self.animation.start();
            }
            Command::Left => {
                self.animation.pan(&mut self.layout, PanDirection::Left);
            }
            Command::Right => {
                self.animation.pan(&mut self.layout, PanDirection::Right);
            }
            Command::Other(token) => {
                log::debug!("[Coverflow Scene] Unknown command {:?}, cancelling", token);
                self.animation.cancel(&mut self.layout);
            }
        }
    }

    /// Advance the animation by one step, then composite.
    pub fn step(&mut self) -> &FrameReport {
        self.animation.advance(&mut self.layout);
        self.compose()
    }

    /// Composite the current state without advancing the animation.
    pub fn compose(&mut self) -> &FrameReport {
        let input = frame_input(
            &self.registry,
            &self.reserved,
            &self.layout,
            &self.config.decoration_caption,
        );
        let report = self.compositor.compose(&input, &mut self.framebuffer);
        self.frames += 1;
        self.dirty = false;
        self.last_report.insert(report)
    }
}

/// Collect the drawable windows, topmost first, and the claimed areas.
fn frame_input<'a>(
    registry: &'a WindowRegistry,
    reserved: &ReservedRegionTracker,
    layout: &LayoutEngine,
    decoration_caption: &str,
) -> FrameInput<'a> {
    let mut input = FrameInput {
        items: Vec::with_capacity(registry.len()),
        claimed: reserved.rects().collect(),
    };

    for window in registry.front_to_back() {
        if window.is_reserved() {
            input.claimed.push(window.screen_rect());
            continue;
        }
        let Some(image) = window.image() else {
            continue;
        };

        let (source, placement, decoration) = match layout.placement(window.id()) {
            Some(p) => (p.image_rect, p.window_rect, p.is_decoration),
            None => (
                image.rect(),
                window.screen_rect(),
                registry.caption(window.id()) == Some(decoration_caption),
            ),
        };
        // The image may have been replaced since the layout pass.
        let Some(source) = source.intersect(&image.rect()) else {
            continue;
        };

        input.items.push(DrawItem {
            id: window.id(),
            image: image.view(),
            source,
            placement,
            reflects: !decoration,
        });
    }
    input
}
