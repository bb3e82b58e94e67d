//! Databricks deployment command (`capacity deploy`).

use std::path::PathBuf;

use anyhow::{Context, Result};
use capacity::config::CapacityConfig;
use capacity::deploy::{DeployOptions, Deployer};
use capacity::process::SystemRunner;
use capacity::ui::StatusPrinter;

pub async fn cmd_deploy(
    project_dir: PathBuf,
    app_name: Option<String>,
    app_folder: Option<String>,
    hard_redeploy: bool,
) -> Result<()> {
    let config = CapacityConfig::load(project_dir)?;
    let mut options = DeployOptions::from_config(&config, app_name, app_folder, hard_redeploy);
    options
        .resolve_server_binary(std::env::current_exe)
        .context("Failed to locate the capacity binary to package")?;
    tracing::debug!(?options, "Deploy options");

    let runner = SystemRunner;
    let deployer = Deployer::new(&runner, config.databricks_cli(), options, StatusPrinter::new());
    deployer.deploy().await?;
    Ok(())
}
