//! Replay a captured event log through the recognizer.

use std::path::PathBuf;

use guster_common::config::AppConfig;
use guster_gesture_core::GestureRecognizer;
use guster_input_tracker::backends::LineSource;
use guster_input_tracker::launcher::ShellLauncher;
use guster_input_tracker::GestureTracker;

pub async fn run(config: AppConfig, path: PathBuf, execute: bool) -> anyhow::Result<()> {
    let source = LineSource::open(&path).await?;
    let recognizer = GestureRecognizer::new(
        config.threshold,
        config.gestures,
        ShellLauncher::new(!execute),
    );

    // Log timestamps are not replayed in real time, so no idle timeout here.
    let mut tracker = GestureTracker::new(source, recognizer);
    let summary = tracker.run(std::future::pending()).await?;
    let outcomes = summary.outcomes;

    println!();
    println!("Replayed {}", path.display());
    println!("  Lines read: {}", summary.lines_read);
    println!("  Malformed lines: {}", summary.parse_errors);
    println!("  Gestures: {}", outcomes.total());
    if execute {
        println!("    Executed: {}", outcomes.launched);
    } else {
        println!("    Would execute: {}", outcomes.launched);
    }
    println!("    Unmapped: {}", outcomes.unmapped);
    println!("    Too small or diagonal: {}", outcomes.too_small);
    if outcomes.launch_failures > 0 {
        println!("    Failed to launch: {}", outcomes.launch_failures);
    }

    Ok(())
}
