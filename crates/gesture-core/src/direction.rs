//! Direction classification for accumulated swipe displacement.

use std::fmt;
use std::str::FromStr;

use guster_common::config::ThresholdConfig;
use serde::{Deserialize, Serialize};

/// Cardinal swipe direction. Screen coordinates: positive `dy` is down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Self::Left, Self::Right, Self::Up, Self::Down];

    /// Lower-case name used in gesture keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Up => "up",
            Self::Down => "down",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| format!("unknown direction '{s}'"))
    }
}

/// Classify a displacement, or `None` if it is too small or diagonal.
///
/// The larger axis must reach `min_magnitude`, and then one axis must be at
/// least `axis_dominance_ratio` times the other. Horizontal is tested first.
/// With a ratio above 1 an exact diagonal never resolves to an axis.
pub fn classify(dx: f64, dy: f64, threshold: &ThresholdConfig) -> Option<Direction> {
    let ax = dx.abs();
    let ay = dy.abs();

    if ax.max(ay) < threshold.min_magnitude {
        return None;
    }

    if ax >= ay * threshold.axis_dominance_ratio {
        return Some(if dx > 0.0 {
            Direction::Right
        } else {
            Direction::Left
        });
    }

    if ay >= ax * threshold.axis_dominance_ratio {
        return Some(if dy > 0.0 {
            Direction::Down
        } else {
            Direction::Up
        });
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn threshold() -> ThresholdConfig {
        ThresholdConfig {
            min_magnitude: 50.0,
            axis_dominance_ratio: 1.5,
        }
    }

    #[test]
    fn test_cardinal_directions() {
        let t = threshold();
        assert_eq!(classify(100.0, 0.0, &t), Some(Direction::Right));
        assert_eq!(classify(-100.0, 0.0, &t), Some(Direction::Left));
        assert_eq!(classify(0.0, 100.0, &t), Some(Direction::Down));
        assert_eq!(classify(0.0, -100.0, &t), Some(Direction::Up));
    }

    #[test]
    fn test_below_minimum_is_none() {
        let t = threshold();
        assert_eq!(classify(49.9, 0.0, &t), None);
        assert_eq!(classify(-30.0, 40.0, &t), None);
        assert_eq!(classify(0.0, 0.0, &t), None);
    }

    #[test]
    fn test_minimum_is_inclusive() {
        assert_eq!(classify(50.0, 0.0, &threshold()), Some(Direction::Right));
    }

    #[test]
    fn test_diagonal_is_none() {
        let t = threshold();
        assert_eq!(classify(100.0, 100.0, &t), None);
        assert_eq!(classify(-80.0, 60.0, &t), None);
    }

    #[test]
    fn test_dominance_ratio_boundary() {
        let t = threshold();
        // 90 / 60 == 1.5 exactly: horizontal dominates
        assert_eq!(classify(90.0, 60.0, &t), Some(Direction::Right));
        assert_eq!(classify(89.0, 60.0, &t), None);
        assert_eq!(classify(60.0, -90.0, &t), Some(Direction::Up));
    }

    #[test]
    fn test_direction_names_roundtrip() {
        for direction in Direction::ALL {
            assert_eq!(direction.as_str().parse::<Direction>(), Ok(direction));
        }
        assert!("sideways".parse::<Direction>().is_err());
    }
}
