//! Error types shared across Guster crates.

use std::path::PathBuf;

/// Top-level error type for Guster operations.
#[derive(Debug, thiserror::Error)]
pub enum GusterError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Failed to parse event line {line:?}: {message}")]
    Parse { line: String, message: String },

    #[error("Event source error: {message}")]
    EventSource { message: String },

    #[error("Failed to launch '{command}': {source}")]
    Launch {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Result type alias using GusterError.
pub type GusterResult<T> = Result<T, GusterError>;

impl GusterError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn parse(line: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Parse {
            line: line.into(),
            message: msg.into(),
        }
    }

    pub fn event_source(msg: impl Into<String>) -> Self {
        Self::EventSource {
            message: msg.into(),
        }
    }

    pub fn launch(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::Launch {
            command: command.into(),
            source,
        }
    }
}
