//! Interpolation endpoints and bounds.
//!
//! For any pair of rectangles, step 0 yields the origin, the final step
//! yields the destination, and every intermediate coordinate lies between
//! the two.

use proptest::prelude::*;

use coverflow::{interpolate, Rect};

fn arb_rect() -> impl Strategy<Value = Rect> {
    (-2000i32..2000, -2000i32..2000, 0u32..2000, 0u32..2000)
        .prop_map(|(x, y, w, h)| Rect::new(x, y, w, h))
}

fn between(value: i64, a: i64, b: i64) -> bool {
    value >= a.min(b) && value <= a.max(b)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn endpoints_are_exact(from in arb_rect(), dest in arb_rect(), steps in 1u32..100) {
        prop_assert_eq!(interpolate(from, dest, 0, steps), from);
        prop_assert_eq!(interpolate(from, dest, steps, steps), dest);
    }

    #[test]
    fn intermediate_steps_stay_between(
        from in arb_rect(),
        dest in arb_rect(),
        steps in 1u32..100,
        step in 0u32..100,
    ) {
        let step = step % steps;
        let r = interpolate(from, dest, step, steps);
        prop_assert!(between(r.x as i64, from.x as i64, dest.x as i64));
        prop_assert!(between(r.y as i64, from.y as i64, dest.y as i64));
        prop_assert!(between(r.width as i64, from.width as i64, dest.width as i64));
        prop_assert!(between(r.height as i64, from.height as i64, dest.height as i64));
    }

    #[test]
    fn progress_is_monotonic(from in arb_rect(), dest in arb_rect()) {
        let mut previous = (from.x as i64 - dest.x as i64).abs();
        for step in 1..=40 {
            let distance = (interpolate(from, dest, step, 40).x as i64 - dest.x as i64).abs();
            prop_assert!(distance <= previous);
            previous = distance;
        }
    }
}

#[test]
fn forty_steps_from_full_screen_to_overview() {
    let from = Rect::new(0, 0, 800, 480);
    let dest = Rect::new(100, 40, 600, 360);
    assert_eq!(interpolate(from, dest, 0, 40), from);
    assert_eq!(interpolate(from, dest, 10, 40), Rect::new(25, 10, 750, 450));
    assert_eq!(interpolate(from, dest, 40, 40), dest);
}
