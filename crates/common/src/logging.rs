//! Logging and tracing initialization.

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` wins when set. Otherwise `verbose` raises the level to
/// `debug`, and `config.level` applies.
pub fn init_logging(config: &LoggingConfig, verbose: bool) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_directive(config, verbose)));

    let builder = fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_target(verbose);

    // A subscriber may already be installed (tests, repeated init).
    if config.json {
        tracing::subscriber::set_global_default(builder.json().finish()).ok();
    } else {
        tracing::subscriber::set_global_default(builder.finish()).ok();
    }
}

/// Filter directive used when `RUST_LOG` is unset.
fn level_directive(config: &LoggingConfig, verbose: bool) -> &str {
    let level = config.level.trim();
    if verbose {
        "debug"
    } else if level.is_empty() {
        "info"
    } else {
        level
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_directive() {
        let config = LoggingConfig {
            level: "warn".to_string(),
            json: false,
        };
        assert_eq!(level_directive(&config, false), "warn");
        assert_eq!(level_directive(&config, true), "debug");

        let blank = LoggingConfig {
            level: "  ".to_string(),
            json: true,
        };
        assert_eq!(level_directive(&blank, false), "info");
    }
}
