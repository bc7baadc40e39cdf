//! Guster Gesture Core
//!
//! Turns a stream of `libinput debug-events` lines into swipe gestures and
//! dispatches them to commands:
//! - **Event parsing:** classify each line as begin/update/end or nothing
//! - **Accumulation:** sum update deltas between begin and end
//! - **Classification:** displacement to left/right/up/down via axis dominance
//! - **Dispatch:** `{fingers}_{direction}` lookup and command execution
//!
//! This crate does no process or file I/O; commands are run through the
//! [`ActionExecutor`] seam.

pub mod direction;
pub mod dispatch;
pub mod event;
pub mod session;

use std::time::{Duration, Instant};

use guster_common::config::{GestureMapping, ThresholdConfig};
use guster_common::error::GusterResult;

pub use direction::{classify, Direction};
pub use dispatch::{ActionExecutor, DispatchOutcome, GestureDispatcher, GestureKey, Launch};
pub use event::{parse_line, GestureEvent};
pub use session::{GestureAccumulator, GestureSession, GestureSnapshot};

/// Parser, accumulator, classifier, and dispatcher wired together.
pub struct GestureRecognizer<E> {
    accumulator: GestureAccumulator,
    threshold: ThresholdConfig,
    dispatcher: GestureDispatcher<E>,
}

impl<E: ActionExecutor> GestureRecognizer<E> {
    pub fn new(threshold: ThresholdConfig, mapping: GestureMapping, executor: E) -> Self {
        Self {
            accumulator: GestureAccumulator::new(),
            threshold,
            dispatcher: GestureDispatcher::new(mapping, executor),
        }
    }

    /// Parse one line and apply it.
    ///
    /// `Ok(None)` covers non-event lines as well as begin, update, and stray
    /// end events. Errors are confined to the offending line.
    pub fn handle_line(&self, line: &str) -> GusterResult<Option<DispatchOutcome>> {
        Ok(parse_line(line)?.and_then(|event| self.handle_event(event)))
    }

    /// Apply one event. Only an end that closes an active swipe dispatches.
    pub fn handle_event(&self, event: GestureEvent) -> Option<DispatchOutcome> {
        match event {
            GestureEvent::Begin { finger_count } => {
                self.accumulator.begin(finger_count);
                None
            }
            GestureEvent::Update { dx, dy } => {
                self.accumulator.update(dx, dy);
                None
            }
            GestureEvent::End { finger_count } => {
                let snapshot = self.accumulator.end(finger_count)?;
                let direction = classify(snapshot.dx, snapshot.dy, &self.threshold);
                Some(self.dispatcher.dispatch(snapshot, direction))
            }
        }
    }

    /// When the in-flight swipe goes stale under `timeout`.
    pub fn idle_deadline(&self, timeout: Duration) -> Option<Instant> {
        self.accumulator.idle_deadline(timeout)
    }

    /// Discard a swipe that received no events for `timeout`.
    pub fn expire_idle(&self, timeout: Duration) -> Option<GestureSnapshot> {
        let discarded = self.accumulator.expire_idle(Instant::now(), timeout)?;
        tracing::warn!(
            fingers = discarded.finger_count,
            dx = discarded.dx,
            dy = discarded.dy,
            timeout_ms = timeout.as_millis() as u64,
            "Swipe never ended; discarded after idle timeout"
        );
        Some(discarded)
    }

    pub fn accumulator(&self) -> &GestureAccumulator {
        &self.accumulator
    }

    pub fn threshold(&self) -> &ThresholdConfig {
        &self.threshold
    }

    pub fn dispatcher(&self) -> &GestureDispatcher<E> {
        &self.dispatcher
    }
}
