//! Segments a generated sequence of moving discs and prints a JSON summary.
//!
//! Usage: `segment_synthetic [config.yaml]`. Without a configuration file
//! the defaults are used. Set `RUST_LOG=info` to follow progress.

use anyhow::{Context, Result};
use cytoseg::synthetic::{moving_discs, SequenceConfig};
use cytoseg::{Config, FrameSequencer, SeedSource};

fn main() -> Result<()> {
    common::setup_logging("warn", None)?;

    let config = match std::env::args().nth(1) {
        Some(path) => {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config '{path}'"))?;
            Config::from_yaml_str(&text).with_context(|| format!("Invalid config '{path}'"))?
        }
        None => Config::default(),
    };

    let sequence = SequenceConfig {
        noise: 6.0,
        ..SequenceConfig::default()
    };
    let frames = moving_discs(&sequence)?;

    let result = FrameSequencer::try_new(config)?.run(&frames, &SeedSource::Automatic)?;
    let summary = serde_json::to_string_pretty(&result.summary())?;
    println!("{summary}");

    Ok(())
}
