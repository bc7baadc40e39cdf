//! Guster Input Tracker
//!
//! Reads event lines from a pluggable source and feeds them to the gesture
//! recognizer:
//!
//! - **Libinput:** spawns `libinput debug-events` and reads its stdout
//! - **Line reader:** any buffered reader, e.g. a captured log for replay
//! - **Stub:** in-memory lines for tests
//!
//! Recognized gestures are executed through [`launcher::ShellLauncher`].

pub mod backends;
pub mod launcher;
pub mod permissions;

use std::future::Future;
use std::time::{Duration, Instant};

use guster_common::error::GusterResult;
use guster_gesture_core::{ActionExecutor, DispatchOutcome, GestureRecognizer};

/// Trait for event line sources.
pub trait EventSource: Send {
    /// Wait for the next line. `None` means the stream has ended.
    ///
    /// Must be cancel-safe: the run loop drops this future on shutdown and
    /// on idle timeouts.
    fn next_line(&mut self) -> impl Future<Output = GusterResult<Option<String>>> + Send;

    /// Source name for logging.
    fn name(&self) -> &str;

    /// Stop the producer behind this source, if there is one.
    fn shutdown(&mut self) -> impl Future<Output = GusterResult<()>> + Send;
}

/// Why the run loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The shutdown signal fired.
    Interrupted,
    /// The source reached end of stream.
    StreamClosed,
}

/// Tally of dispatch outcomes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutcomeCounts {
    pub launched: u64,
    pub launch_failures: u64,
    pub unmapped: u64,
    pub too_small: u64,
}

impl OutcomeCounts {
    fn record(&mut self, outcome: &DispatchOutcome) {
        match outcome {
            DispatchOutcome::Launched { .. } => self.launched += 1,
            DispatchOutcome::LaunchFailed { .. } => self.launch_failures += 1,
            DispatchOutcome::Unmapped { .. } => self.unmapped += 1,
            DispatchOutcome::TooSmall { .. } => self.too_small += 1,
        }
    }

    /// Swipes that reached the dispatcher.
    pub fn total(&self) -> u64 {
        self.launched + self.launch_failures + self.unmapped + self.too_small
    }
}

/// What a finished run saw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub reason: StopReason,
    pub lines_read: u64,
    pub parse_errors: u64,
    pub idle_expired: u64,
    pub outcomes: OutcomeCounts,
}

#[derive(Debug, Default)]
struct RunCounters {
    lines_read: u64,
    parse_errors: u64,
    idle_expired: u64,
    outcomes: OutcomeCounts,
}

/// The gesture tracker that coordinates an event source with recognition.
pub struct GestureTracker<S, E> {
    source: S,
    recognizer: GestureRecognizer<E>,
    idle_timeout: Option<Duration>,
}

impl<S: EventSource, E: ActionExecutor> GestureTracker<S, E> {
    pub fn new(source: S, recognizer: GestureRecognizer<E>) -> Self {
        Self {
            source,
            recognizer,
            idle_timeout: None,
        }
    }

    /// Discard swipes that see no events for `timeout`. `None` waits forever.
    pub fn with_idle_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Run the tracking loop until `shutdown` resolves or the stream ends.
    ///
    /// The source is shut down before returning in every case. Read errors
    /// end the loop with an error; per-line problems never do.
    pub async fn run<F>(&mut self, shutdown: F) -> GusterResult<RunSummary>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        tracing::info!(source = %self.source.name(), "Gesture tracker started");

        let mut counters = RunCounters::default();
        let result = loop {
            let idle_deadline = self
                .idle_timeout
                .and_then(|timeout| self.recognizer.idle_deadline(timeout));

            tokio::select! {
                biased;

                _ = &mut shutdown => break Ok(StopReason::Interrupted),

                _ = sleep_until_deadline(idle_deadline) => {
                    if let Some(timeout) = self.idle_timeout {
                        if self.recognizer.expire_idle(timeout).is_some() {
                            counters.idle_expired += 1;
                        }
                    }
                }

                line = self.source.next_line() => match line {
                    Ok(Some(line)) => self.process_line(&line, &mut counters),
                    Ok(None) => break Ok(StopReason::StreamClosed),
                    Err(e) => break Err(e),
                },
            }
        };

        if let Err(e) = self.source.shutdown().await {
            tracing::warn!(source = %self.source.name(), error = %e, "Event source shutdown failed");
        }

        let reason = result?;
        let summary = RunSummary {
            reason,
            lines_read: counters.lines_read,
            parse_errors: counters.parse_errors,
            idle_expired: counters.idle_expired,
            outcomes: counters.outcomes,
        };
        tracing::info!(
            ?reason,
            lines = summary.lines_read,
            gestures = summary.outcomes.total(),
            launched = summary.outcomes.launched,
            "Gesture tracker stopped"
        );
        Ok(summary)
    }

    fn process_line(&self, line: &str, counters: &mut RunCounters) {
        counters.lines_read += 1;
        tracing::trace!(line, "Event line");

        match self.recognizer.handle_line(line) {
            Ok(Some(outcome)) => counters.outcomes.record(&outcome),
            Ok(None) => {}
            Err(e) => {
                counters.parse_errors += 1;
                tracing::debug!(error = %e, "Skipping malformed event line");
            }
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn recognizer(&self) -> &GestureRecognizer<E> {
        &self.recognizer
    }
}

async fn sleep_until_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => {
            tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await;
        }
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::StubSource;
    use guster_common::config::{GestureMapping, ThresholdConfig};
    use guster_common::error::GusterError;
    use guster_gesture_core::Launch;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingExecutor {
        commands: Mutex<Vec<String>>,
    }

    impl RecordingExecutor {
        fn commands(&self) -> Vec<String> {
            self.commands.lock().unwrap().clone()
        }
    }

    impl ActionExecutor for RecordingExecutor {
        fn execute(&self, command: &str) -> GusterResult<Launch> {
            self.commands.lock().unwrap().push(command.to_string());
            Ok(Launch::Spawned { pid: None })
        }
    }

    fn recognizer() -> GestureRecognizer<RecordingExecutor> {
        let mapping: GestureMapping = [("3_left", "cmd-A")].into_iter().collect();
        GestureRecognizer::new(
            ThresholdConfig::default(),
            mapping,
            RecordingExecutor::default(),
        )
    }

    const LEFT_SWIPE: [&str; 4] = [
        "GESTURE_SWIPE_BEGIN n_fingers 3",
        "GESTURE_SWIPE_UPDATE delta -40.0 1.0",
        "GESTURE_SWIPE_UPDATE delta -40.0 -1.0",
        "GESTURE_SWIPE_END n_fingers 3",
    ];

    #[tokio::test]
    async fn test_stream_end_stops_loop_and_shuts_down_source() {
        let mut lines: Vec<&str> = LEFT_SWIPE.to_vec();
        lines.push("GESTURE_SWIPE_END n_fingers 3");
        lines.push("GESTURE_SWIPE_UPDATE delta 1..0 2.0");
        lines.push("POINTER_MOTION +1.0s 1.0/ 1.0");

        let mut tracker = GestureTracker::new(StubSource::new(lines), recognizer());
        let summary = tracker.run(std::future::pending()).await.unwrap();

        assert_eq!(summary.reason, StopReason::StreamClosed);
        assert_eq!(summary.lines_read, 7);
        assert_eq!(summary.parse_errors, 1);
        assert_eq!(summary.outcomes.launched, 1);
        assert_eq!(summary.outcomes.total(), 1);
        assert!(tracker.source().was_shut_down());
        assert_eq!(
            tracker.recognizer().dispatcher().executor().commands(),
            vec!["cmd-A".to_string()]
        );
    }

    #[tokio::test]
    async fn test_shutdown_signal_interrupts_blocked_read() {
        let source = StubSource::new(LEFT_SWIPE[..2].to_vec()).hang_when_drained();
        let mut tracker = GestureTracker::new(source, recognizer());

        let summary = tracker
            .run(tokio::time::sleep(Duration::from_millis(50)))
            .await
            .unwrap();

        assert_eq!(summary.reason, StopReason::Interrupted);
        assert_eq!(summary.lines_read, 2);
        assert!(tracker.source().was_shut_down());
        assert!(tracker.recognizer().accumulator().is_active());
    }

    #[tokio::test]
    async fn test_idle_timeout_discards_unfinished_swipe() {
        let source = StubSource::new(LEFT_SWIPE[..3].to_vec()).hang_when_drained();
        let mut tracker = GestureTracker::new(source, recognizer())
            .with_idle_timeout(Some(Duration::from_millis(20)));

        let summary = tracker
            .run(tokio::time::sleep(Duration::from_millis(200)))
            .await
            .unwrap();

        assert_eq!(summary.idle_expired, 1);
        assert_eq!(summary.outcomes.total(), 0);
        assert!(!tracker.recognizer().accumulator().is_active());
        assert!(tracker
            .recognizer()
            .dispatcher()
            .executor()
            .commands()
            .is_empty());
    }

    #[tokio::test]
    async fn test_read_error_is_fatal() {
        let source = StubSource::new(LEFT_SWIPE[..1].to_vec()).fail_when_drained("device gone");
        let mut tracker = GestureTracker::new(source, recognizer());

        let err = tracker.run(std::future::pending()).await.unwrap_err();
        assert!(matches!(err, GusterError::EventSource { .. }));
        assert!(tracker.source().was_shut_down());
    }
}
