//! Swipe gesture events and the line parser for `libinput debug-events`.
//!
//! Two field layouts are recognized for each marker:
//!
//! ```text
//! ... GESTURE_SWIPE_BEGIN ... n_fingers 3
//! ... GESTURE_SWIPE_UPDATE ... delta -1.50 0.25
//! event7  GESTURE_SWIPE_BEGIN  +1.577s  3
//! event7  GESTURE_SWIPE_UPDATE +1.590s  3 -0.84/ 0.00 (-2.76/ 0.00 unaccelerated)
//! event7  GESTURE_SWIPE_END    +1.861s  3
//! ```
//!
//! Lines without a swipe marker, or with a marker but no recognizable
//! fields, are not events. Parsing keeps no state between lines.

use std::sync::OnceLock;

use guster_common::error::{GusterError, GusterResult};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

const SWIPE_MARKER: &str = "GESTURE_SWIPE_";

/// One parsed swipe event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GestureEvent {
    /// Fingers touched down and started a swipe.
    Begin { finger_count: u32 },

    /// Displacement since the previous update.
    Update { dx: f64, dy: f64 },

    /// Fingers lifted.
    End { finger_count: u32 },
}

fn begin_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"GESTURE_SWIPE_BEGIN(?:.*n_fingers\s*(\d+)|\s+\+?[0-9.]+s\s+(\d+))")
            .expect("begin pattern is valid")
    })
}

fn update_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"GESTURE_SWIPE_UPDATE(?:.*delta\s*([-+0-9.]+)(?:\s*/\s*|\s+)([-+0-9.]+)|\s+\+?[0-9.]+s\s+\d+\s+([-+0-9.]+)\s*/\s*([-+0-9.]+))",
        )
        .expect("update pattern is valid")
    })
}

fn end_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"GESTURE_SWIPE_END(?:.*n_fingers\s*(\d+)|\s+\+?[0-9.]+s\s+(\d+))")
            .expect("end pattern is valid")
    })
}

/// Classify one line of event output.
///
/// Returns `Ok(None)` for lines that are not swipe events. A line whose
/// fields match the expected shape but do not convert to numbers is an
/// error for that line only.
pub fn parse_line(line: &str) -> GusterResult<Option<GestureEvent>> {
    if !line.contains(SWIPE_MARKER) {
        return Ok(None);
    }

    if let Some(caps) = begin_re().captures(line) {
        let finger_count = parse_finger_count(line, first_group(&caps, 1, 2))?;
        return Ok(Some(GestureEvent::Begin { finger_count }));
    }

    if let Some(caps) = update_re().captures(line) {
        return Ok(Some(GestureEvent::Update {
            dx: parse_delta(line, first_group(&caps, 1, 3))?,
            dy: parse_delta(line, first_group(&caps, 2, 4))?,
        }));
    }

    if let Some(caps) = end_re().captures(line) {
        let finger_count = parse_finger_count(line, first_group(&caps, 1, 2))?;
        return Ok(Some(GestureEvent::End { finger_count }));
    }

    Ok(None)
}

fn first_group<'a>(caps: &Captures<'a>, primary: usize, fallback: usize) -> &'a str {
    caps.get(primary)
        .or_else(|| caps.get(fallback))
        .map(|m| m.as_str())
        .unwrap_or_default()
}

fn parse_finger_count(line: &str, field: &str) -> GusterResult<u32> {
    let count: u32 = field
        .parse()
        .map_err(|e| GusterError::parse(line, format!("finger count {field:?}: {e}")))?;
    if count == 0 {
        return Err(GusterError::parse(line, "finger count must be at least 1"));
    }
    Ok(count)
}

fn parse_delta(line: &str, field: &str) -> GusterResult<f64> {
    let value: f64 = field
        .parse()
        .map_err(|e| GusterError::parse(line, format!("delta {field:?}: {e}")))?;
    if !value.is_finite() {
        return Err(GusterError::parse(line, format!("delta {field:?} is not finite")));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labelled_begin_update_end() {
        assert_eq!(
            parse_line("event4 GESTURE_SWIPE_BEGIN +0.00s n_fingers 3").unwrap(),
            Some(GestureEvent::Begin { finger_count: 3 })
        );
        assert_eq!(
            parse_line("event4 GESTURE_SWIPE_UPDATE +0.01s delta -12.5 3.25").unwrap(),
            Some(GestureEvent::Update {
                dx: -12.5,
                dy: 3.25
            })
        );
        assert_eq!(
            parse_line("event4 GESTURE_SWIPE_END +0.20s n_fingers 4").unwrap(),
            Some(GestureEvent::End { finger_count: 4 })
        );
    }

    #[test]
    fn test_native_libinput_columns() {
        assert_eq!(
            parse_line("-event7   GESTURE_SWIPE_BEGIN     +1.577s\t3").unwrap(),
            Some(GestureEvent::Begin { finger_count: 3 })
        );
        assert_eq!(
            parse_line(
                " event7   GESTURE_SWIPE_UPDATE    +1.590s\t3 -0.84/ 0.00 (-2.76/ 0.00 unaccelerated)"
            )
            .unwrap(),
            Some(GestureEvent::Update { dx: -0.84, dy: 0.0 })
        );
        assert_eq!(
            parse_line(" event7   GESTURE_SWIPE_END       +1.861s\t4").unwrap(),
            Some(GestureEvent::End { finger_count: 4 })
        );
    }

    #[test]
    fn test_unrelated_lines_do_not_match() {
        for line in [
            "",
            "-event2   KEYBOARD_KEY      +3.012s\t*** (-1) pressed",
            " event7   POINTER_MOTION    +4.100s\t  1.23/  0.45 ( +2.00/ +0.73)",
            " event7   GESTURE_PINCH_BEGIN +5.000s\t2",
            " event7   GESTURE_HOLD_END  +5.500s\t3",
            "GESTURE_SWIPE_BEGIN with no count",
        ] {
            assert_eq!(parse_line(line).unwrap(), None, "line: {line:?}");
        }
    }

    #[test]
    fn test_malformed_numbers_are_line_errors() {
        let err = parse_line("GESTURE_SWIPE_UPDATE delta 1.2.3 4.0").unwrap_err();
        assert!(matches!(err, GusterError::Parse { .. }));

        let err = parse_line("GESTURE_SWIPE_BEGIN n_fingers 99999999999").unwrap_err();
        assert!(matches!(err, GusterError::Parse { .. }));

        let err = parse_line("GESTURE_SWIPE_END n_fingers 0").unwrap_err();
        assert!(matches!(err, GusterError::Parse { .. }));
    }

    #[test]
    fn test_explicit_plus_sign_delta() {
        assert_eq!(
            parse_line(" event7 GESTURE_SWIPE_UPDATE +2.000s\t3 +5.00/-1.50 (+9.0/-2.0 unaccelerated)")
                .unwrap(),
            Some(GestureEvent::Update { dx: 5.0, dy: -1.5 })
        );
    }

    #[test]
    fn test_event_json_shape() {
        let json = serde_json::to_value(GestureEvent::Begin { finger_count: 3 }).unwrap();
        assert_eq!(json["type"], "begin");
        assert_eq!(json["finger_count"], 3);
    }
}
