//! Frame coverage.
//!
//! For any set of windows, reserved windows and reserved regions, in
//! either layout and at any point of a transition, one composite paints
//! every unreserved screen pixel exactly once (content, reflection or
//! black fill) and never touches a reserved pixel. Reflections never land
//! on a window placement.

mod common;

use proptest::prelude::*;

use coverflow::config::ReflectionConfig;
use coverflow::scene::{Command, Event, Scene};
use coverflow::{AnimatorConfig, Framebuffer, Rect, ReservationId, WindowId};

use common::coverage;

const W: u32 = 64;
const H: u32 = 48;

#[derive(Debug, Clone)]
struct WindowSpec {
    rect: Rect,
    /// Image size relative to the rect; negative asks for an upscale.
    grow: (i32, i32),
    reserved: bool,
}

fn arb_window() -> impl Strategy<Value = WindowSpec> {
    (
        -16i32..64,
        -16i32..48,
        1u32..40,
        1u32..40,
        (-2i32..4, -2i32..4),
        prop::bool::weighted(0.2),
    )
        .prop_map(|(x, y, w, h, grow, reserved)| WindowSpec {
            rect: Rect::new(x, y, w, h),
            grow,
            reserved,
        })
}

fn arb_reservation() -> impl Strategy<Value = Rect> {
    (0i32..56, 0i32..40, 1u32..16, 1u32..16).prop_map(|(x, y, w, h)| Rect::new(x, y, w, h))
}

fn config() -> AnimatorConfig {
    AnimatorConfig {
        reflection: ReflectionConfig {
            line: 36,
            height: 8,
            base_fade: 64,
        },
        ..AnimatorConfig::default()
    }
}

fn build_scene(windows: &[WindowSpec], reservations: &[Rect]) -> Scene {
    let mut scene = Scene::new(Framebuffer::new(W, H), config()).unwrap();
    for (i, spec) in windows.iter().enumerate() {
        let id = i as u64 + 1;
        if spec.reserved {
            scene.apply(common::reserved_window(id, spec.rect));
            continue;
        }
        let width = (spec.rect.width as i32 + spec.grow.0).max(1) as u32;
        let height = (spec.rect.height as i32 + spec.grow.1).max(1) as u32;
        scene.apply(Event::Window(coverflow::WindowEvent::Updated {
            id: WindowId(id),
            image: Some(common::solid(width, height, 0x1234 + id as u16)),
            screen_rect: spec.rect,
            reserved: false,
        }));
    }
    for (i, rect) in reservations.iter().enumerate() {
        scene.apply(Event::Reserve {
            id: ReservationId(1000 + i as u64),
            rect: *rect,
        });
    }
    scene
}

fn claimed(windows: &[WindowSpec], reservations: &[Rect]) -> Vec<Rect> {
    windows
        .iter()
        .filter(|w| w.reserved)
        .map(|w| w.rect)
        .chain(reservations.iter().copied())
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn every_unreserved_pixel_painted_once(
        windows in prop::collection::vec(arb_window(), 0..6),
        reservations in prop::collection::vec(arb_reservation(), 0..3),
        toggle in any::<bool>(),
        steps in 0usize..45,
    ) {
        let mut scene = build_scene(&windows, &reservations);
        if toggle {
            scene.apply(Event::Command(Command::Go));
        }
        for _ in 0..steps {
            scene.step();
        }
        let report = scene.compose().clone();

        let screen = Rect::new(0, 0, W, H);
        let counts = coverage(screen, report.painted());
        let claimed = claimed(&windows, &reservations);

        for y in 0..H as i32 {
            for x in 0..W as i32 {
                let expected = if claimed.iter().any(|r| r.contains(x, y)) { 0 } else { 1 };
                prop_assert_eq!(
                    counts[y as usize * W as usize + x as usize],
                    expected,
                    "pixel ({}, {})", x, y
                );
            }
        }
    }

    #[test]
    fn reflections_avoid_windows_and_reservations(
        windows in prop::collection::vec(arb_window(), 1..6),
        reservations in prop::collection::vec(arb_reservation(), 0..3),
    ) {
        let mut scene = build_scene(&windows, &reservations);
        let report = scene.compose().clone();
        let claimed = claimed(&windows, &reservations);

        for (_, mirror) in &report.reflections {
            prop_assert!(mirror.y >= 36 && mirror.bottom() <= 44);
            for spec in windows.iter().filter(|w| !w.reserved) {
                prop_assert!(!mirror.intersects(&spec.rect));
            }
            for rect in &claimed {
                prop_assert!(!mirror.intersects(rect));
            }
            for (_, content) in &report.content {
                prop_assert!(!mirror.intersects(content));
            }
        }
    }
}
