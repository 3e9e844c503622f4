//! Fixed-step window animation.
//!
//! A transition takes a fixed number of render wakes. On each wake every
//! window rectangle is interpolated linearly between its origin and its
//! destination with truncating integer arithmetic; the wake after the last
//! step snaps every window onto its destination.

use crate::geometry::Rect;
use crate::layout::{LayoutEngine, LayoutMode};

/// Direction of a paging move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanDirection {
    Left,
    Right,
}

impl PanDirection {
    fn delta(self) -> isize {
        match self {
            PanDirection::Left => -1,
            PanDirection::Right => 1,
        }
    }
}

/// Interpolate one coordinate. Truncates toward zero.
fn lerp(from: i64, dest: i64, step: u32, steps: u32) -> i64 {
    from + (dest - from) * step as i64 / steps as i64
}

/// Rectangle `step / steps` of the way from `from` to `dest`.
pub fn interpolate(from: Rect, dest: Rect, step: u32, steps: u32) -> Rect {
    if steps == 0 || step >= steps {
        return dest;
    }
    Rect::new(
        lerp(from.x as i64, dest.x as i64, step, steps) as i32,
        lerp(from.y as i64, dest.y as i64, step, steps) as i32,
        lerp(from.width as i64, dest.width as i64, step, steps) as u32,
        lerp(from.height as i64, dest.height as i64, step, steps) as u32,
    )
}

/// Step counter driving all window animations at once.
#[derive(Debug, Clone)]
pub struct AnimationEngine {
    steps: u32,
    /// Next step to apply; `None` while idle.
    counter: Option<u32>,
}

impl AnimationEngine {
    pub fn new(steps: u32) -> Self {
        AnimationEngine {
            steps: steps.max(1),
            counter: None,
        }
    }

    pub fn steps(&self) -> u32 {
        self.steps
    }

    /// Next step to apply, if an animation is running.
    pub fn counter(&self) -> Option<u32> {
        self.counter
    }

    pub fn is_active(&self) -> bool {
        self.counter.is_some()
    }

    /// Begin a transition from step 0.
    pub fn start(&mut self) {
        self.counter = Some(0);
        log::trace!("[Coverflow Animation] Started, {} steps", self.steps);
    }

    /// Abort the running transition and discard all window animation
    /// state. Windows stay at their last interpolated placement.
    pub fn cancel(&mut self, layout: &mut LayoutEngine) {
        if let Some(step) = self.counter.take() {
            log::debug!("[Coverflow Animation] Cancelled at step {}", step);
        }
        layout.freeze();
    }

    /// Apply one step. Returns whether an animation was running.
    pub fn advance(&mut self, layout: &mut LayoutEngine) -> bool {
        let Some(step) = self.counter else {
            return false;
        };

        if step < self.steps {
            for state in layout.states_mut() {
                state.window_rect = interpolate(state.from_rect, state.dest_rect, step, self.steps);
            }
            self.counter = Some(step + 1);
        } else {
            for state in layout.states_mut() {
                state.window_rect = state.dest_rect;
                state.from_rect = state.dest_rect;
            }
            self.counter = None;
            log::trace!("[Coverflow Animation] Finished");
        }
        true
    }

    /// Move the overview focus by one window and glide there.
    ///
    /// Only honoured in overview mode while no animation runs; a move past
    /// either end of the paging order is ignored. Origins are left alone so
    /// windows start from where they rest.
    pub fn pan(&mut self, layout: &mut LayoutEngine, direction: PanDirection) -> bool {
        if layout.mode() != LayoutMode::Overview || self.is_active() {
            log::trace!("[Coverflow Animation] Ignoring pan {:?}", direction);
            return false;
        }
        if !layout.shift_focus(direction.delta()) {
            return false;
        }
        self.start();
        true
    }
}

impl Default for AnimationEngine {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_STEPS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnimatorConfig;
    use crate::layout::LayoutParams;
    use crate::surface::{PixelFormat, WindowImage};
    use crate::window::{WindowId, WindowRegistry};

    const SCREEN: Rect = Rect::new(0, 0, 800, 480);

    fn registry_with(count: u64) -> WindowRegistry {
        let mut registry = WindowRegistry::new();
        for id in 1..=count {
            let data = vec![0u8; 800 * 480 * 2];
            let image = WindowImage::new(800, 480, 1600, PixelFormat::Rgb565, data).unwrap();
            registry.upsert(WindowId(id), Some(image), SCREEN, false);
        }
        registry
    }

    #[test]
    fn test_interpolate_endpoints() {
        let from = Rect::new(0, 0, 800, 480);
        let dest = Rect::new(100, 40, 600, 360);

        assert_eq!(interpolate(from, dest, 0, 40), from);
        assert_eq!(interpolate(from, dest, 40, 40), dest);
        assert_eq!(interpolate(from, dest, 20, 40), Rect::new(50, 20, 700, 420));
    }

    #[test]
    fn test_interpolate_truncates_toward_zero() {
        let from = Rect::new(0, 0, 10, 10);
        let dest = Rect::new(-7, 7, 3, 17);
        // -7 * 1 / 40 truncates to 0, 7 * 1 / 40 truncates to 0.
        assert_eq!(interpolate(from, dest, 1, 40), Rect::new(0, 0, 10, 10));
        assert_eq!(interpolate(from, dest, 39, 40), Rect::new(-6, 6, 4, 16));
    }

    #[test]
    fn test_advance_runs_steps_then_snaps() {
        let registry = registry_with(2);
        let mut layout = LayoutEngine::new(LayoutParams::new(SCREEN, &AnimatorConfig::default()));
        layout.toggle(&registry);
        layout.toggle(&registry);

        let mut engine = AnimationEngine::new(40);
        engine.start();
        let mut wakes = 0;
        while engine.advance(&mut layout) {
            wakes += 1;
            if wakes == 1 {
                let state = layout.state(WindowId(2)).unwrap();
                assert_eq!(state.window_rect, state.from_rect);
            }
        }

        assert_eq!(wakes, 41);
        assert!(!engine.is_active());
        for state in layout.states().values() {
            assert_eq!(state.window_rect, state.dest_rect);
            assert_eq!(state.from_rect, state.dest_rect);
        }
    }

    #[test]
    fn test_pan_requires_overview_and_idle() {
        let registry = registry_with(2);
        let mut layout = LayoutEngine::new(LayoutParams::new(SCREEN, &AnimatorConfig::default()));
        let mut engine = AnimationEngine::new(40);

        assert!(!engine.pan(&mut layout, PanDirection::Right));

        layout.toggle(&registry);
        engine.start();
        assert!(!engine.pan(&mut layout, PanDirection::Right));

        while engine.advance(&mut layout) {}
        assert!(engine.pan(&mut layout, PanDirection::Right));
        assert_eq!(engine.counter(), Some(0));
    }

    #[test]
    fn test_cancel_freezes_windows() {
        let registry = registry_with(1);
        let mut layout = LayoutEngine::new(LayoutParams::new(SCREEN, &AnimatorConfig::default()));
        layout.toggle(&registry);
        layout.toggle(&registry);

        let mut engine = AnimationEngine::new(40);
        engine.start();
        for _ in 0..=15 {
            engine.advance(&mut layout);
        }
        let state = *layout.state(WindowId(1)).unwrap();
        engine.cancel(&mut layout);

        assert!(!engine.is_active());
        assert!(!layout.is_active());
        assert_eq!(
            layout.placement(WindowId(1)).unwrap().window_rect,
            interpolate(state.from_rect, state.dest_rect, 15, 40)
        );
    }
}
