//! Gesture-to-command dispatch.

use std::fmt;
use std::str::FromStr;

use guster_common::config::GestureMapping;
use guster_common::error::{GusterError, GusterResult};

use crate::direction::Direction;
use crate::session::GestureSnapshot;

/// Lookup key for a recognized swipe, written `{fingers}_{direction}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GestureKey {
    pub finger_count: u32,
    pub direction: Direction,
}

impl GestureKey {
    pub fn new(finger_count: u32, direction: Direction) -> Self {
        Self {
            finger_count,
            direction,
        }
    }
}

impl fmt::Display for GestureKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.finger_count, self.direction)
    }
}

impl FromStr for GestureKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (fingers, direction) = s
            .split_once('_')
            .ok_or_else(|| format!("gesture key '{s}' is not of the form <fingers>_<direction>"))?;
        let finger_count: u32 = fingers
            .parse()
            .map_err(|_| format!("gesture key '{s}' has invalid finger count '{fingers}'"))?;
        if finger_count == 0 {
            return Err(format!("gesture key '{s}' has zero fingers"));
        }
        Ok(Self::new(finger_count, direction.parse()?))
    }
}

/// What an executor did with a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Launch {
    /// The command was started and left running.
    Spawned { pid: Option<u32> },
    /// Dry-run mode: the command was only reported.
    DryRun,
}

/// Runs the command bound to a gesture.
///
/// Implementations must not wait for the command to finish. An error means
/// the command could not be started at all.
pub trait ActionExecutor: Send + Sync {
    fn execute(&self, command: &str) -> GusterResult<Launch>;
}

impl<E: ActionExecutor + ?Sized> ActionExecutor for std::sync::Arc<E> {
    fn execute(&self, command: &str) -> GusterResult<Launch> {
        (**self).execute(command)
    }
}

/// Result of dispatching one finished swipe.
#[derive(Debug)]
pub enum DispatchOutcome {
    /// Displacement was below threshold or diagonal.
    TooSmall { finger_count: u32, dx: f64, dy: f64 },
    /// No command is bound to the key.
    Unmapped { key: GestureKey },
    /// The bound command was handed to the executor.
    Launched {
        key: GestureKey,
        command: String,
        launch: Launch,
    },
    /// The executor could not start the command.
    LaunchFailed {
        key: GestureKey,
        command: String,
        error: GusterError,
    },
}

impl DispatchOutcome {
    /// Whether a command was run (or reported, in dry-run mode).
    pub fn launched(&self) -> bool {
        matches!(self, Self::Launched { .. })
    }

    /// The gesture key, when the swipe had a direction.
    pub fn key(&self) -> Option<GestureKey> {
        match self {
            Self::TooSmall { .. } => None,
            Self::Unmapped { key }
            | Self::Launched { key, .. }
            | Self::LaunchFailed { key, .. } => Some(*key),
        }
    }
}

/// Looks up finished swipes in the mapping and hands commands to an executor.
pub struct GestureDispatcher<E> {
    mapping: GestureMapping,
    executor: E,
}

impl<E: ActionExecutor> GestureDispatcher<E> {
    pub fn new(mapping: GestureMapping, executor: E) -> Self {
        for key in mapping.keys() {
            if let Err(reason) = key.parse::<GestureKey>() {
                tracing::warn!(key, %reason, "Gesture binding can never match");
            }
        }
        Self { mapping, executor }
    }

    pub fn mapping(&self) -> &GestureMapping {
        &self.mapping
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Dispatch a finished swipe. Missing bindings are an outcome, not an error.
    pub fn dispatch(
        &self,
        snapshot: GestureSnapshot,
        direction: Option<Direction>,
    ) -> DispatchOutcome {
        let GestureSnapshot {
            finger_count,
            dx,
            dy,
        } = snapshot;

        let Some(direction) = direction else {
            tracing::info!(
                fingers = finger_count,
                dx,
                dy,
                "Gesture ignored (too small)"
            );
            return DispatchOutcome::TooSmall {
                finger_count,
                dx,
                dy,
            };
        };

        let key = GestureKey::new(finger_count, direction);
        tracing::info!(fingers = finger_count, %direction, %key, "Detected gesture");

        let Some(command) = self.mapping.command_for(&key.to_string()) else {
            tracing::info!(%key, "No mapping for gesture");
            return DispatchOutcome::Unmapped { key };
        };

        match self.executor.execute(command) {
            Ok(launch) => DispatchOutcome::Launched {
                key,
                command: command.to_string(),
                launch,
            },
            Err(error) => {
                tracing::warn!(%key, command, error = %error, "Failed to execute gesture command");
                DispatchOutcome::LaunchFailed {
                    key,
                    command: command.to_string(),
                    error,
                }
            }
        }
    }
}
