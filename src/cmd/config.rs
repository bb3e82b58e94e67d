//! Configuration view and validation commands (`capacity config`).

use anyhow::Result;

use super::super::ConfigCommands;

pub fn cmd_config(project_dir: &std::path::Path, command: Option<ConfigCommands>) -> Result<()> {
    use capacity::config::{CONFIG_FILE, CapacityConfig, CapacityToml};

    let config_path = project_dir.join(CONFIG_FILE);

    match command {
        None | Some(ConfigCommands::Show) => {
            println!();
            println!("Capacity Configuration");
            println!("======================");
            println!();

            let toml = if config_path.exists() {
                println!("Config file: {}", config_path.display());
                CapacityToml::load(&config_path)?
            } else {
                println!("No {} found at {}", CONFIG_FILE, config_path.display());
                println!("Using default configuration.");
                CapacityToml::default()
            };
            println!();

            println!("[paths]");
            println!("  frontend = \"{}\"", toml.paths.frontend.display());
            println!("  backend = \"{}\"", toml.paths.backend.display());
            println!();

            println!("[server]");
            println!("  host = \"{}\"", toml.server.host);
            println!("  port = {}", toml.server.port);
            if let Some(dir) = &toml.server.static_dir {
                println!("  static_dir = \"{}\"", dir.display());
            }
            println!("  cors_origins = {:?}", toml.server.cors_origins);
            println!();

            println!("[deploy]");
            println!("  app_name = \"{}\"", toml.deploy.app_name);
            if let Some(folder) = &toml.deploy.app_folder {
                println!("  app_folder = \"{}\"", folder);
            }
            println!("  cli = \"{}\"", toml.deploy.cli);
            println!("  deletion_timeout_secs = {}", toml.deploy.deletion_timeout_secs);
            println!("  poll_interval_secs = {}", toml.deploy.poll_interval_secs);
            println!("  command = {:?}", toml.deploy.command);
            if let Some(binary) = &toml.deploy.binary {
                println!("  binary = \"{}\"", binary.display());
            }
            println!();

            // Effective values (including .env and environment overrides)
            println!("Effective values (with env overrides):");
            let config = CapacityConfig::load(project_dir.to_path_buf())?;
            println!("  ENV = \"{}\"", config.environment());
            println!("  DEBUG = \"{}\"", config.debug());
            println!("  PORT = {}", config.port());
            println!("  databricks_cli = \"{}\"", config.databricks_cli());
            println!("  static_dir = \"{}\"", config.static_dir().display());
            println!();

            if !config_path.exists() {
                println!("Run 'capacity config init' to create a {} file.", CONFIG_FILE);
                println!();
            }
        }
        Some(ConfigCommands::Validate) => {
            println!();
            println!("Validating configuration...");
            println!();

            if !config_path.exists() {
                println!("No {} found. Using defaults (valid).", CONFIG_FILE);
                return Ok(());
            }

            let toml = CapacityToml::load(&config_path)?;
            let warnings = toml.validate();

            if warnings.is_empty() {
                println!("Configuration is valid.");
            } else {
                println!("Configuration warnings:");
                for warning in warnings {
                    println!("  - {}", warning);
                }
            }
            println!();
        }
        Some(ConfigCommands::Init) => {
            if config_path.exists() {
                println!("{} already exists at {}", CONFIG_FILE, config_path.display());
                println!("Delete it first if you want to recreate it.");
                return Ok(());
            }

            CapacityToml::default().save(&config_path)?;

            println!("Created {} at {}", CONFIG_FILE, config_path.display());
            println!();
            println!("You can now customize:");
            println!("  - [paths] frontend, backend");
            println!("  - [server] host, port, static_dir, cors_origins");
            println!("  - [deploy] app_name, app_folder, cli, command, binary");
            println!();
        }
    }

    Ok(())
}
