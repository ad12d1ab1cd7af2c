//! Static site build command.

use std::path::{Path, PathBuf};

use anyhow::Result;
use demoblock_static::StaticBuilder;

use crate::config::ConfigFile;

/// Run the build command.
pub async fn run(config_path: &Path, output: Option<PathBuf>, minify: Option<bool>) -> Result<()> {
    tracing::info!("Building static site...");

    let mut config = ConfigFile::load(config_path)?.build_config();
    if let Some(output) = output {
        config.output_dir = output;
    }
    if let Some(minify) = minify {
        config.minify = minify;
    }

    let result = StaticBuilder::new(config).build().await?;

    tracing::info!(
        "Built {} pages with {} demos in {}ms",
        result.pages,
        result.demos,
        result.duration_ms
    );
    if result.failed_demos > 0 {
        tracing::warn!("{} demos rendered an error", result.failed_demos);
    }

    tracing::info!("Output: {}", result.output_dir.display());

    Ok(())
}
