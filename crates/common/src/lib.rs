//! Guster Common Utilities
//!
//! Shared infrastructure for all Guster crates:
//! - Error types and result aliases
//! - Configuration loading and merging over built-in defaults
//! - Tracing/logging initialization

pub mod config;
pub mod error;
pub mod logging;

pub use config::*;
pub use error::*;
