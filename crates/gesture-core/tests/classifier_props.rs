//! Property tests for direction classification.

use guster_common::config::ThresholdConfig;
use guster_gesture_core::{classify, Direction};
use proptest::prelude::*;

fn threshold_strategy() -> impl Strategy<Value = ThresholdConfig> {
    (1.0f64..200.0, 1.01f64..4.0).prop_map(|(min_magnitude, axis_dominance_ratio)| {
        ThresholdConfig {
            min_magnitude,
            axis_dominance_ratio,
        }
    })
}

proptest! {
    #[test]
    fn below_minimum_never_classifies(
        threshold in threshold_strategy(),
        fx in -0.999f64..0.999,
        fy in -0.999f64..0.999,
    ) {
        let dx = fx * threshold.min_magnitude;
        let dy = fy * threshold.min_magnitude;
        prop_assert_eq!(classify(dx, dy, &threshold), None);
    }

    #[test]
    fn exact_diagonal_never_classifies(
        threshold in threshold_strategy(),
        magnitude in 0.0f64..10_000.0,
        sx in prop::bool::ANY,
        sy in prop::bool::ANY,
    ) {
        let dx = if sx { magnitude } else { -magnitude };
        let dy = if sy { magnitude } else { -magnitude };
        prop_assert_eq!(classify(dx, dy, &threshold), None);
    }

    #[test]
    fn pure_horizontal_follows_sign(
        threshold in threshold_strategy(),
        extra in 0.0f64..1_000.0,
        negative in prop::bool::ANY,
    ) {
        let magnitude = threshold.min_magnitude + extra;
        let dx = if negative { -magnitude } else { magnitude };
        let expected = if negative { Direction::Left } else { Direction::Right };
        prop_assert_eq!(classify(dx, 0.0, &threshold), Some(expected));
    }

    #[test]
    fn classification_matches_dominant_axis(
        threshold in threshold_strategy(),
        dx in -1_000.0f64..1_000.0,
        dy in -1_000.0f64..1_000.0,
    ) {
        match classify(dx, dy, &threshold) {
            Some(Direction::Left) | Some(Direction::Right) => {
                prop_assert!(dx.abs() >= dy.abs() * threshold.axis_dominance_ratio);
                prop_assert!(dx.abs() >= threshold.min_magnitude);
            }
            Some(Direction::Up) | Some(Direction::Down) => {
                prop_assert!(dy.abs() >= dx.abs() * threshold.axis_dominance_ratio);
                prop_assert!(dy.abs() >= threshold.min_magnitude);
            }
            None => {}
        }
    }
}
