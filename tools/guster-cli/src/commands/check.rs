//! Check system capabilities and the loaded configuration.

use guster_common::config::LoadedConfig;
use guster_gesture_core::GestureKey;
use guster_input_tracker::permissions::{check_capabilities, print_capability_report};

pub fn run(loaded: &LoadedConfig) -> anyhow::Result<()> {
    let config = &loaded.config;

    println!("Guster System Check");
    println!("{}", "=".repeat(50));

    println!("[OK] Config: {}", loaded.path.display());
    println!(
        "     Threshold: px_min={} axis_ratio={}",
        config.threshold.min_magnitude, config.threshold.axis_dominance_ratio
    );
    match config.idle_timeout_ms {
        Some(ms) => println!("     Idle timeout: {ms} ms"),
        None => println!("     Idle timeout: disabled"),
    }

    println!("     Bindings: {}", config.gestures.len());
    for (key, command) in config.gestures.iter() {
        let note = match key.parse::<GestureKey>() {
            Err(reason) => format!("  [WARN] {reason}"),
            Ok(_) if command.trim().is_empty() => "  (disabled)".to_string(),
            Ok(_) => String::new(),
        };
        println!("       {key:<8} {command}{note}");
    }

    let capabilities = check_capabilities(config);
    println!();
    print_capability_report(&capabilities);

    let all_required_ok = capabilities
        .iter()
        .filter(|c| c.required)
        .all(|c| c.available);

    println!();
    if all_required_ok {
        println!("All required capabilities are available. Guster is ready.");
    } else {
        println!("Some required capabilities are missing. See above for fixes.");
    }

    Ok(())
}
