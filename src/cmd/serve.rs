//! API server command (`capacity serve`).

use std::path::PathBuf;

use anyhow::Result;
use capacity::config::CapacityConfig;
use capacity::server::{ServerConfig, start_server};

pub async fn cmd_serve(
    project_dir: PathBuf,
    host: Option<String>,
    port: Option<u16>,
    static_dir: Option<PathBuf>,
    open: bool,
) -> Result<()> {
    let config = CapacityConfig::load(project_dir.clone())?;
    let mut server = ServerConfig::from_config(&config);
    if let Some(host) = host {
        server.host = host;
    }
    if let Some(port) = port {
        server.port = port;
    }
    if let Some(dir) = static_dir {
        server.static_dir = project_dir.join(dir);
    }

    // Spawn browser open before starting the server (which blocks)
    if open {
        let url = format!("http://localhost:{}", server.port);
        tokio::spawn(async move {
            tokio::time::sleep(tokio::time::Duration::from_millis(500)).await;
            if let Err(e) = open::that(&url) {
                eprintln!("Failed to open browser: {}", e);
            }
        });
    }

    start_server(server).await
}
