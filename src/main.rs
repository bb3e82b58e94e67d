use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod cmd;

#[derive(Parser)]
#[command(name = "capacity")]
#[command(version, about = "Capacity management app: API server, frontend build and Databricks deployment")]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Project root containing frontend/, backend/ and capacity.toml
    #[arg(long, global = true)]
    pub project_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the API server and serve the built frontend
    Serve {
        /// Interface to bind (overrides capacity.toml)
        #[arg(long)]
        host: Option<String>,

        /// Port to serve on (overrides PORT and capacity.toml)
        #[arg(short, long)]
        port: Option<u16>,

        /// Directory holding the built SPA
        #[arg(long)]
        static_dir: Option<PathBuf>,

        /// Open the browser once the server is up
        #[arg(long)]
        open: bool,
    },
    /// Build the React frontend and stage it in the backend's static directory
    Build,
    /// Build, package and deploy the app to Databricks Apps
    Deploy {
        /// Delete the existing app and wait for it to disappear before deploying
        #[arg(long)]
        hard_redeploy: bool,

        /// Databricks app name
        #[arg(long)]
        app_name: Option<String>,

        /// Workspace folder to import the app into
        #[arg(long)]
        app_folder: Option<String>,
    },
    /// Create or update the secret scope the deployed app reads from
    Secrets {
        /// Use this scope instead of choosing interactively
        #[arg(long)]
        scope: Option<String>,

        /// Create the scope before writing secrets
        #[arg(long, requires = "scope")]
        create: bool,
    },
    /// Query a running server's health endpoint
    Health {
        #[arg(long, default_value = "http://localhost:8000")]
        url: String,
    },
    /// View or validate configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Validate configuration and show any warnings
    Validate,
    /// Initialize a default capacity.toml file
    Init,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let project_dir = match cli.project_dir.clone() {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };

    match &cli.command {
        Commands::Serve {
            host,
            port,
            static_dir,
            open,
        } => {
            cmd::cmd_serve(
                project_dir,
                host.clone(),
                *port,
                static_dir.clone(),
                *open,
            )
            .await?;
        }
        Commands::Build => cmd::cmd_build(project_dir).await?,
        Commands::Deploy {
            hard_redeploy,
            app_name,
            app_folder,
        } => {
            cmd::cmd_deploy(project_dir, app_name.clone(), app_folder.clone(), *hard_redeploy)
                .await?;
        }
        Commands::Secrets { scope, create } => {
            cmd::cmd_secrets(project_dir, scope.clone(), *create).await?;
        }
        Commands::Health { url } => cmd::cmd_health(url).await?,
        Commands::Config { command } => cmd::cmd_config(&project_dir, command.clone())?,
    }

    Ok(())
}
