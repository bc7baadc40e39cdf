//! Application configuration.
//!
//! The config file is JSON. Values present in the user's file are merged over
//! the built-in defaults: gesture bindings per key, threshold and other
//! sections per field. Anything left unspecified keeps its default.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{GusterError, GusterResult};

/// Default minimum displacement along the dominant axis.
pub const DEFAULT_MIN_MAGNITUDE: f64 = 50.0;

/// Default axis-dominance ratio.
pub const DEFAULT_AXIS_DOMINANCE_RATIO: f64 = 1.5;

/// Global application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Direction classification thresholds.
    pub threshold: ThresholdConfig,

    /// `{fingers}_{direction}` to command bindings.
    pub gestures: GestureMapping,

    /// Discard an in-flight gesture after this long without events.
    /// Absent means a gesture waits for its end marker indefinitely.
    pub idle_timeout_ms: Option<u64>,

    /// The process producing the event stream.
    pub event_source: EventSourceConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Thresholds for turning accumulated displacement into a direction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    /// Minimum absolute motion on the larger axis (libinput units).
    #[serde(rename = "px_min")]
    pub min_magnitude: f64,

    /// How many times larger the primary axis must be than the other.
    #[serde(rename = "axis_ratio")]
    pub axis_dominance_ratio: f64,
}

/// Mapping from gesture key (`3_left`, `4_up`, ...) to a shell command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GestureMapping(BTreeMap<String, String>);

/// Event producer settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSourceConfig {
    /// Executable to spawn.
    pub command: String,

    /// Arguments passed to the executable.
    pub args: Vec<String>,

    /// How long to wait for the producer to exit after SIGTERM before killing it.
    pub shutdown_timeout_ms: u64,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "guster=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            threshold: ThresholdConfig::default(),
            gestures: GestureMapping::defaults(),
            idle_timeout_ms: None,
            event_source: EventSourceConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            min_magnitude: DEFAULT_MIN_MAGNITUDE,
            axis_dominance_ratio: DEFAULT_AXIS_DOMINANCE_RATIO,
        }
    }
}

impl Default for EventSourceConfig {
    fn default() -> Self {
        Self {
            command: "libinput".to_string(),
            args: vec!["debug-events".to_string()],
            shutdown_timeout_ms: 2000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl ThresholdConfig {
    /// Check `min_magnitude > 0` and `axis_dominance_ratio > 1`.
    pub fn validate(&self) -> GusterResult<()> {
        if !self.min_magnitude.is_finite() || self.min_magnitude <= 0.0 {
            return Err(GusterError::config(format!(
                "threshold.px_min must be a positive number, got {}",
                self.min_magnitude
            )));
        }
        if !self.axis_dominance_ratio.is_finite() || self.axis_dominance_ratio <= 1.0 {
            return Err(GusterError::config(format!(
                "threshold.axis_ratio must be greater than 1, got {}",
                self.axis_dominance_ratio
            )));
        }
        Ok(())
    }
}

impl GestureMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in bindings for three- and four-finger swipes on X11.
    pub fn defaults() -> Self {
        [
            ("3_left", "xdotool key ctrl+Page_Up"),
            ("3_right", "xdotool key ctrl+Page_Down"),
            (
                "4_left",
                r#"wmctrl -s $(($(wmctrl -d | grep "\*" | cut -d" " -f1) - 1))"#,
            ),
            (
                "4_right",
                r#"wmctrl -s $(($(wmctrl -d | grep "\*" | cut -d" " -f1) + 1))"#,
            ),
            ("4_up", "xdotool key Super"),
            ("4_down", "xdotool key Super"),
        ]
        .into_iter()
        .collect()
    }

    /// Bind `key` to `command`, replacing any previous binding.
    pub fn insert(&mut self, key: impl Into<String>, command: impl Into<String>) {
        self.0.insert(key.into(), command.into());
    }

    /// Command bound to `key`. Blank commands count as unbound.
    pub fn command_for(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .map(String::as_str)
            .filter(|command| !command.trim().is_empty())
    }

    /// All configured keys, including ones bound to blank commands.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn merge(&mut self, overrides: BTreeMap<String, String>) {
        self.0.extend(overrides);
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for GestureMapping {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// A config file as written by the user; every field may be omitted.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigOverlay {
    threshold: ThresholdOverlay,
    gestures: BTreeMap<String, String>,
    idle_timeout_ms: Option<u64>,
    event_source: EventSourceOverlay,
    logging: LoggingOverlay,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ThresholdOverlay {
    px_min: Option<f64>,
    axis_ratio: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct EventSourceOverlay {
    command: Option<String>,
    args: Option<Vec<String>>,
    shutdown_timeout_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LoggingOverlay {
    level: Option<String>,
    json: Option<bool>,
}

impl AppConfig {
    /// Parse a user config and merge it over the defaults.
    ///
    /// Blank input yields the defaults.
    pub fn from_json_str(content: &str) -> GusterResult<Self> {
        let mut config = Self::default();
        if content.trim().is_empty() {
            return Ok(config);
        }

        let overlay: ConfigOverlay = serde_json::from_str(content)
            .map_err(|e| GusterError::config(format!("invalid config JSON: {e}")))?;
        config.apply(overlay);
        config.validate()?;
        Ok(config)
    }

    fn apply(&mut self, overlay: ConfigOverlay) {
        if let Some(px_min) = overlay.threshold.px_min {
            self.threshold.min_magnitude = px_min;
        }
        if let Some(ratio) = overlay.threshold.axis_ratio {
            self.threshold.axis_dominance_ratio = ratio;
        }

        self.gestures.merge(overlay.gestures);
        self.idle_timeout_ms = overlay.idle_timeout_ms;

        if let Some(command) = overlay.event_source.command {
            self.event_source.command = command;
        }
        if let Some(args) = overlay.event_source.args {
            self.event_source.args = args;
        }
        if let Some(timeout) = overlay.event_source.shutdown_timeout_ms {
            self.event_source.shutdown_timeout_ms = timeout;
        }

        if let Some(level) = overlay.logging.level {
            self.logging.level = level;
        }
        if let Some(json) = overlay.logging.json {
            self.logging.json = json;
        }
    }

    /// Reject configurations the recognizer cannot work with.
    pub fn validate(&self) -> GusterResult<()> {
        self.threshold.validate()?;
        if self.idle_timeout_ms == Some(0) {
            return Err(GusterError::config(
                "idle_timeout_ms must be positive; omit it to disable the idle timeout",
            ));
        }
        if self.event_source.command.trim().is_empty() {
            return Err(GusterError::config("event_source.command must not be empty"));
        }
        Ok(())
    }

    /// Load the config at `path`, writing the defaults there first if the
    /// file does not exist yet.
    pub fn load_or_create(path: &Path) -> GusterResult<LoadedConfig> {
        let created = if path.exists() {
            false
        } else {
            Self::default().save(path)?;
            true
        };

        let content = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&content).map_err(|e| match e {
            GusterError::Config { message } => {
                GusterError::config(format!("{}: {message}", path.display()))
            }
            other => other,
        })?;

        Ok(LoadedConfig {
            config,
            path: path.to_path_buf(),
            created,
        })
    }

    /// Write this config as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> GusterResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json + "\n")?;
        Ok(())
    }
}

/// Result of [`AppConfig::load_or_create`].
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: AppConfig,
    pub path: PathBuf,
    /// The file did not exist and was populated with defaults.
    pub created: bool,
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("guster").join("config.json")
}
