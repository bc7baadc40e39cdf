//! Run the gesture daemon.

use std::time::Duration;

use guster_common::config::AppConfig;
use guster_gesture_core::GestureRecognizer;
use guster_input_tracker::backends::LibinputSource;
use guster_input_tracker::launcher::ShellLauncher;
use guster_input_tracker::{GestureTracker, StopReason};
use tokio::signal::unix::{signal, SignalKind};

pub async fn run(config: AppConfig, dry_run: bool) -> anyhow::Result<()> {
    if dry_run {
        tracing::info!("Running in dry-run mode; commands will only be printed");
    }

    let idle_timeout = config.idle_timeout_ms.map(Duration::from_millis);
    if idle_timeout.is_none() {
        tracing::debug!(
            "No idle timeout: a swipe whose end marker never arrives stays open until the next begin or end"
        );
    }

    let source = LibinputSource::spawn(&config.event_source)?;
    let recognizer = GestureRecognizer::new(
        config.threshold,
        config.gestures,
        ShellLauncher::new(dry_run),
    );
    let mut tracker = GestureTracker::new(source, recognizer).with_idle_timeout(idle_timeout);

    let summary = tracker.run(shutdown_signal()).await?;

    match summary.reason {
        StopReason::Interrupted => {
            tracing::info!("Exiting (interrupted)");
            Ok(())
        }
        StopReason::StreamClosed => {
            anyhow::bail!("Event producer closed its output; is libinput able to read the devices?")
        }
    }
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let mut terminate = match signal(SignalKind::terminate()) {
        Ok(terminate) => terminate,
        Err(e) => {
            tracing::warn!(error = %e, "Cannot listen for SIGTERM; only Ctrl+C will stop the daemon");
            let _ = tokio::signal::ctrl_c().await;
            return;
        }
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = terminate.recv() => {}
    }
}
