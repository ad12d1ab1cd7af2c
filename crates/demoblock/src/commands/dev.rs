//! Development server command.

use std::path::Path;

use anyhow::Result;
use demoblock_server::DevServer;

use crate::config::ConfigFile;

/// Run the dev server.
pub async fn run(config_path: &Path, port: Option<u16>, open: bool) -> Result<()> {
    let mut config = ConfigFile::load(config_path)?.server_config();
    if let Some(port) = port {
        config.port = port;
    }
    config.open = open;

    tracing::info!("Starting development server on port {}", config.port);

    DevServer::new(config).start().await?;

    Ok(())
}
