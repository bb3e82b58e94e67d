//! Layered configuration for Capacity.
//!
//! Settings are read from `capacity.toml` in the project root and merged with
//! the environment (a `.env` file is loaded first) and finally CLI flags.
//!
//! # Configuration File Format
//!
//! ```toml
//! [paths]
//! frontend = "frontend"
//! backend = "backend"
//!
//! [server]
//! host = "0.0.0.0"
//! port = 8000
//! environment = "development"
//! debug = "False"
//! cors_origins = ["http://localhost:5173", "http://127.0.0.1:5173"]
//!
//! [deploy]
//! app_name = "capacity-management"
//! cli = "databricks"
//! deletion_timeout_secs = 300
//! poll_interval_secs = 5
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the configuration file in the project root.
pub const CONFIG_FILE: &str = "capacity.toml";

/// Default app name used on the hosting platform.
pub const DEFAULT_APP_NAME: &str = "capacity-management";

/// Project directory layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// React project directory (contains package.json)
    #[serde(default = "default_frontend_dir")]
    pub frontend: PathBuf,
    /// Backend directory packaged for deployment
    #[serde(default = "default_backend_dir")]
    pub backend: PathBuf,
}

fn default_frontend_dir() -> PathBuf {
    PathBuf::from("frontend")
}

fn default_backend_dir() -> PathBuf {
    PathBuf::from("backend")
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            frontend: default_frontend_dir(),
            backend: default_backend_dir(),
        }
    }
}

/// API server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSection {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Directory holding the built SPA (defaults to `<backend>/static`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub static_dir: Option<PathBuf>,
    /// Reported by `/api/health`; `ENV` overrides
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    /// Reported by `/api/health`; `DEBUG` overrides
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug: Option<String>,
    /// Origins allowed to call the API from a browser (Vite dev server)
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_cors_origins() -> Vec<String> {
    vec![
        "http://localhost:5173".to_string(),
        "http://127.0.0.1:5173".to_string(),
    ]
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: None,
            environment: None,
            debug: None,
            cors_origins: default_cors_origins(),
        }
    }
}

/// Databricks deployment settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploySection {
    #[serde(default = "default_app_name")]
    pub app_name: String,
    /// Workspace folder; auto-detected from the current user when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_folder: Option<String>,
    /// Databricks CLI executable; `DATABRICKS_CLI` overrides
    #[serde(default = "default_cli")]
    pub cli: String,
    #[serde(default = "default_description")]
    pub description: String,
    #[serde(default = "default_deletion_timeout_secs")]
    pub deletion_timeout_secs: u64,
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// Command written into the packaged `app.yaml`
    #[serde(default = "default_app_command")]
    pub command: Vec<String>,
    /// Server executable staged into the package as the command's `./<program>`.
    /// Defaults to the running `capacity` binary when the backend lacks one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binary: Option<PathBuf>,
}

fn default_app_name() -> String {
    DEFAULT_APP_NAME.to_string()
}

fn default_cli() -> String {
    "databricks".to_string()
}

fn default_description() -> String {
    "Capacity Management application".to_string()
}

fn default_deletion_timeout_secs() -> u64 {
    300
}

fn default_poll_interval_secs() -> u64 {
    5
}

fn default_app_command() -> Vec<String> {
    ["./capacity", "serve", "--host", "0.0.0.0", "--port", "8000"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for DeploySection {
    fn default() -> Self {
        Self {
            app_name: default_app_name(),
            app_folder: None,
            cli: default_cli(),
            description: default_description(),
            deletion_timeout_secs: default_deletion_timeout_secs(),
            poll_interval_secs: default_poll_interval_secs(),
            command: default_app_command(),
            binary: None,
        }
    }
}

/// The complete capacity.toml structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CapacityToml {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub deploy: DeploySection,
}

impl CapacityToml {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse capacity.toml")
    }

    /// Load `capacity.toml` from the project root, or defaults when absent.
    pub fn load_or_default(project_dir: &Path) -> Result<Self> {
        let config_path = project_dir.join(CONFIG_FILE);
        if config_path.exists() {
            Self::load(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize capacity.toml")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Validate the configuration and return any warnings.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.server.port == 0 {
            warnings.push("server.port is 0; the OS will pick a random port".to_string());
        }
        for origin in &self.server.cors_origins {
            if !origin.starts_with("http://") && !origin.starts_with("https://") {
                warnings.push(format!(
                    "Invalid CORS origin '{}': must start with http:// or https://",
                    origin
                ));
            }
        }
        if let Err(e) = crate::deploy::validate_app_name(&self.deploy.app_name) {
            warnings.push(e.to_string());
        }
        if self.deploy.poll_interval_secs == 0 {
            warnings.push("deploy.poll_interval_secs must be at least 1".to_string());
        } else if self.deploy.poll_interval_secs > self.deploy.deletion_timeout_secs {
            warnings.push(format!(
                "deploy.poll_interval_secs ({}) exceeds deploy.deletion_timeout_secs ({})",
                self.deploy.poll_interval_secs, self.deploy.deletion_timeout_secs
            ));
        }
        if self.deploy.command.is_empty() {
            warnings.push("deploy.command is empty; app.yaml would have nothing to run".to_string());
        } else if self.deploy.binary.is_some()
            && crate::deploy::package::packaged_program(&self.deploy.command).is_none()
        {
            warnings.push(
                "deploy.binary is set but deploy.command does not start with ./<program>".to_string(),
            );
        }

        warnings
    }
}

/// Effective configuration: capacity.toml merged with the environment.
///
/// Environment lookups go through a closure so the merge can be exercised
/// without touching the process environment.
#[derive(Debug, Clone)]
pub struct CapacityConfig {
    pub project_dir: PathBuf,
    pub toml: CapacityToml,
    environment: String,
    debug: String,
    port: u16,
    databricks_cli: String,
}

impl CapacityConfig {
    /// Load `.env` and `capacity.toml` from `project_dir` and merge the process environment.
    pub fn load(project_dir: PathBuf) -> Result<Self> {
        let dotenv_path = project_dir.join(".env");
        if dotenv_path.exists() {
            dotenvy::from_path(&dotenv_path)
                .with_context(|| format!("Failed to load {}", dotenv_path.display()))?;
        }
        let toml = CapacityToml::load_or_default(&project_dir)?;
        Ok(Self::resolve(project_dir, toml, |key| std::env::var(key).ok()))
    }

    pub fn resolve(
        project_dir: PathBuf,
        toml: CapacityToml,
        env: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let environment = env("ENV")
            .or_else(|| toml.server.environment.clone())
            .unwrap_or_else(|| "development".to_string());
        let debug = env("DEBUG")
            .or_else(|| toml.server.debug.clone())
            .unwrap_or_else(|| "False".to_string());
        let port = match env("PORT").map(|p| p.parse::<u16>()) {
            Some(Ok(port)) => port,
            Some(Err(_)) => {
                tracing::warn!("Ignoring unparsable PORT, using {}", toml.server.port);
                toml.server.port
            }
            None => toml.server.port,
        };
        let databricks_cli = env("DATABRICKS_CLI").unwrap_or_else(|| toml.deploy.cli.clone());

        Self {
            project_dir,
            toml,
            environment,
            debug,
            port,
            databricks_cli,
        }
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn debug(&self) -> &str {
        &self.debug
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn databricks_cli(&self) -> &str {
        &self.databricks_cli
    }

    pub fn frontend_dir(&self) -> PathBuf {
        self.project_dir.join(&self.toml.paths.frontend)
    }

    pub fn backend_dir(&self) -> PathBuf {
        self.project_dir.join(&self.toml.paths.backend)
    }

    /// Directory the server serves the SPA from and the build copies into.
    pub fn static_dir(&self) -> PathBuf {
        match &self.toml.server.static_dir {
            Some(dir) => self.project_dir.join(dir),
            None => self.backend_dir().join("static"),
        }
    }
}
