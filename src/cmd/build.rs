//! Frontend build command (`capacity build`).

use std::path::PathBuf;

use anyhow::Result;
use capacity::config::CapacityConfig;
use capacity::frontend::{self, FrontendPaths};
use capacity::process::SystemRunner;
use capacity::ui::StatusPrinter;
use capacity::ui::icons::{FOLDER, HAMMER, PACKAGE, SEARCH, SPARKLE};

pub async fn cmd_build(project_dir: PathBuf) -> Result<()> {
    let config = CapacityConfig::load(project_dir)?;
    let paths = FrontendPaths::from_config(&config);
    let ui = StatusPrinter::new();

    ui.step(&HAMMER, "Building Capacity Management application");
    ui.rule();

    ui.step(&PACKAGE, "Building React frontend...");
    let outcome = frontend::build_frontend(&SystemRunner, &paths).await?;
    if outcome.installed_dependencies {
        ui.detail("Installed frontend dependencies");
    }
    ui.success("Frontend built successfully");

    ui.step(&FOLDER, "Copying static files to backend...");
    let copied = frontend::copy_static_files(&paths)?;
    ui.success(&format!(
        "Copied {} files to {}",
        copied,
        paths.static_dir.display()
    ));

    ui.step(&SEARCH, "Checking backend...");
    frontend::verify_backend(&paths)?;
    ui.success("Backend directory found");

    ui.blank();
    ui.step(&SPARKLE, "Build completed successfully!");
    ui.info("Next steps:");
    ui.detail("Run locally:  capacity serve");
    ui.detail(&format!("Open:         http://localhost:{}", config.port()));
    ui.detail("Deploy:       capacity deploy");
    Ok(())
}
