//! Per-gesture displacement accumulation.
//!
//! At most one swipe is tracked at a time. The state lives behind a single
//! mutex so the begin/update/end protocol stays serialized even if more than
//! one producer feeds it.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

/// State of the in-flight swipe.
///
/// `total_dx`/`total_dy` are only meaningful while `active` is set.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GestureSession {
    pub active: bool,
    pub finger_count: u32,
    pub total_dx: f64,
    pub total_dy: f64,
    pub last_event: Option<Instant>,
}

/// Finger count and total displacement of a finished swipe.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GestureSnapshot {
    pub finger_count: u32,
    pub dx: f64,
    pub dy: f64,
}

/// Accumulates update deltas between a begin and an end marker.
#[derive(Debug, Default)]
pub struct GestureAccumulator {
    session: Mutex<GestureSession>,
}

impl GestureAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, GestureSession> {
        // Every critical section leaves the session consistent, so a
        // poisoned lock still holds usable state.
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start a new swipe, discarding any swipe still in flight.
    pub fn begin(&self, finger_count: u32) {
        let mut session = self.lock();
        if session.active {
            tracing::debug!(
                previous_fingers = session.finger_count,
                dx = session.total_dx,
                dy = session.total_dy,
                "Swipe restarted before its end marker; discarding previous displacement"
            );
        }
        *session = GestureSession {
            active: true,
            finger_count,
            total_dx: 0.0,
            total_dy: 0.0,
            last_event: Some(Instant::now()),
        };
    }

    /// Add a delta to the in-flight swipe. Ignored when no swipe is active.
    pub fn update(&self, dx: f64, dy: f64) {
        let mut session = self.lock();
        if !session.active {
            return;
        }
        session.total_dx += dx;
        session.total_dy += dy;
        session.last_event = Some(Instant::now());
    }

    /// Finish the in-flight swipe.
    ///
    /// The snapshot carries the finger count reported with the end marker,
    /// which may differ from the one seen at begin. Returns `None` when no
    /// swipe is active.
    pub fn end(&self, finger_count: u32) -> Option<GestureSnapshot> {
        let mut session = self.lock();
        if !session.active {
            return None;
        }
        let snapshot = GestureSnapshot {
            finger_count,
            dx: session.total_dx,
            dy: session.total_dy,
        };
        *session = GestureSession::default();
        Some(snapshot)
    }

    /// Drop any in-flight swipe without producing a result.
    pub fn reset(&self) {
        *self.lock() = GestureSession::default();
    }

    /// Copy of the current state.
    pub fn session(&self) -> GestureSession {
        *self.lock()
    }

    pub fn is_active(&self) -> bool {
        self.lock().active
    }

    /// When the in-flight swipe goes stale under `timeout`, if one is active.
    pub fn idle_deadline(&self, timeout: Duration) -> Option<Instant> {
        let session = self.lock();
        match (session.active, session.last_event) {
            (true, Some(last)) => Some(last + timeout),
            _ => None,
        }
    }

    /// Discard the in-flight swipe if nothing arrived for `timeout` before `now`.
    ///
    /// Returns what was discarded. The discarded swipe is never dispatched.
    pub fn expire_idle(&self, now: Instant, timeout: Duration) -> Option<GestureSnapshot> {
        let mut session = self.lock();
        let last = session.last_event?;
        if !session.active || now.saturating_duration_since(last) < timeout {
            return None;
        }
        let discarded = GestureSnapshot {
            finger_count: session.finger_count,
            dx: session.total_dx,
            dy: session.total_dy,
        };
        *session = GestureSession::default();
        Some(discarded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_updates_sum_between_begin_and_end() {
        let acc = GestureAccumulator::new();
        acc.begin(3);
        acc.update(10.0, 0.0);
        acc.update(20.0, 0.0);
        assert_eq!(
            acc.end(3),
            Some(GestureSnapshot {
                finger_count: 3,
                dx: 30.0,
                dy: 0.0
            })
        );
        assert!(!acc.is_active());
    }

    #[test]
    fn test_stray_update_is_ignored() {
        let acc = GestureAccumulator::new();
        acc.update(5.0, 5.0);
        assert_eq!(acc.session(), GestureSession::default());

        acc.begin(4);
        let session = acc.session();
        assert!(session.active);
        assert_eq!(session.finger_count, 4);
        assert_eq!(session.total_dx, 0.0);
        assert_eq!(session.total_dy, 0.0);
    }

    #[test]
    fn test_second_begin_restarts_session() {
        let acc = GestureAccumulator::new();
        acc.begin(3);
        acc.update(40.0, -7.0);
        acc.begin(4);

        let session = acc.session();
        assert!(session.active);
        assert_eq!(session.finger_count, 4);
        assert_eq!(session.total_dx, 0.0);
        assert_eq!(session.total_dy, 0.0);
    }

    #[test]
    fn test_end_twice_yields_nothing_second_time() {
        let acc = GestureAccumulator::new();
        acc.begin(3);
        acc.update(1.0, 2.0);
        assert!(acc.end(3).is_some());
        assert_eq!(acc.end(3), None);
    }

    #[test]
    fn test_end_uses_end_finger_count() {
        let acc = GestureAccumulator::new();
        acc.begin(3);
        acc.update(-60.0, 0.0);
        assert_eq!(acc.end(4).map(|s| s.finger_count), Some(4));
    }

    #[test]
    fn test_update_after_end_is_ignored() {
        let acc = GestureAccumulator::new();
        acc.begin(3);
        acc.end(3);
        acc.update(100.0, 0.0);
        assert!(!acc.is_active());
        assert_eq!(acc.end(3), None);
    }

    #[test]
    fn test_reset_discards_session() {
        let acc = GestureAccumulator::new();
        acc.begin(3);
        acc.update(70.0, 0.0);
        acc.reset();
        assert_eq!(acc.end(3), None);
    }

    #[test]
    fn test_idle_expiry() {
        let acc = GestureAccumulator::new();
        let timeout = Duration::from_millis(500);
        assert_eq!(acc.idle_deadline(timeout), None);

        acc.begin(3);
        acc.update(25.0, 0.0);
        let last = acc.session().last_event.unwrap();
        assert_eq!(acc.idle_deadline(timeout), Some(last + timeout));

        assert_eq!(acc.expire_idle(last + Duration::from_millis(100), timeout), None);
        assert!(acc.is_active());

        let discarded = acc.expire_idle(last + timeout, timeout).unwrap();
        assert_eq!(discarded.finger_count, 3);
        assert_eq!(discarded.dx, 25.0);
        assert!(!acc.is_active());
        assert_eq!(acc.end(3), None);
    }
}
