//! Health check command (`capacity health`).

use anyhow::{Context, Result};
use capacity::server::models::HealthStatus;
use capacity::ui::StatusPrinter;

pub async fn cmd_health(url: &str) -> Result<()> {
    let endpoint = format!("{}/api/health", url.trim_end_matches('/'));
    tracing::debug!("GET {}", endpoint);

    let response = reqwest::get(&endpoint)
        .await
        .with_context(|| format!("Failed to reach {}", endpoint))?;
    let status = response.status();
    if !status.is_success() {
        anyhow::bail!("{} returned {}", endpoint, status);
    }
    let health: HealthStatus = response
        .json()
        .await
        .context("Failed to decode health response")?;

    let ui = StatusPrinter::new();
    ui.success(&format!("{} is {}", url, health.status));
    ui.detail(&format!("environment: {}", health.environment));
    ui.detail(&format!("debug: {}", health.debug));
    Ok(())
}
