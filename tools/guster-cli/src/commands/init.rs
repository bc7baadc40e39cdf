//! Write the default configuration file.

use std::path::Path;

use guster_common::config::AppConfig;

pub fn run(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }

    let config = AppConfig::default();
    config
        .save(path)
        .map_err(|e| anyhow::anyhow!("Failed to write config: {e}"))?;

    println!("Wrote default config to {}", path.display());
    println!();
    println!(
        "Threshold: px_min={} axis_ratio={}",
        config.threshold.min_magnitude, config.threshold.axis_dominance_ratio
    );
    println!("Bindings:");
    for (key, command) in config.gestures.iter() {
        println!("  {key:<8} {command}");
    }

    Ok(())
}
