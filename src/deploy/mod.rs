//! Databricks Apps deployment.
//!
//! ## Workflow
//!
//! ```text
//! check CLI ─> detect workspace ─> [hard redeploy: delete app, wait]
//!     ─> npm build ─> copy dist to static ─> package backend + app.yaml
//!     ─> workspace import-dir ─> apps create (if missing) ─> apps deploy
//!     ─> apps get (report) ─> cleanup (always)
//! ```
//!
//! | Module      | Responsibility                                          |
//! |-------------|---------------------------------------------------------|
//! | `cli`       | `DatabricksCli` over a `CommandRunner`                  |
//! | `package`   | Exclusion globs, `backend/build`, `app.yaml`            |
//! | `workspace` | Current user, app folder resolution, `AppInfo`          |
//! | `secrets`   | Secret scopes and the app's required secrets            |
//!
//! Every step is a single CLI call checked by exit code. The only loop is the
//! deletion poll of a hard redeploy.

pub mod cli;
pub mod package;
pub mod secrets;
pub mod workspace;

use std::path::PathBuf;
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use tokio::time::Instant;

use crate::config::{CapacityConfig, CapacityToml};
use crate::errors::DeployError;
use crate::frontend::{self, FrontendPaths};
use crate::process::CommandRunner;
use crate::ui::StatusPrinter;
use crate::ui::icons::{
    BROOM, CLOCK, FIRE, FOLDER, GLOBE, HAMMER, PACKAGE, PIN, ROCKET, SEARCH, SPARKLE, TRASH, UPLOAD,
};

pub use cli::DatabricksCli;
pub use workspace::{AppInfo, WorkspaceInfo};

static APP_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9][a-z0-9-]{0,28}[a-z0-9]$").expect("valid regex"));

/// Databricks app names: 2-30 chars of lowercase letters, digits and hyphens.
pub fn validate_app_name(name: &str) -> Result<(), DeployError> {
    if APP_NAME_RE.is_match(name) {
        Ok(())
    } else {
        Err(DeployError::InvalidAppName(name.to_string()))
    }
}

/// Whether `databricks apps list` output mentions the app as a whole word.
pub fn app_listed(list_output: &str, app_name: &str) -> bool {
    list_output
        .split(|c: char| c.is_whitespace() || c == '"' || c == ',' || c == '|')
        .any(|token| token == app_name)
}

/// Everything the deploy workflow needs, resolved from config and CLI flags.
#[derive(Debug, Clone)]
pub struct DeployOptions {
    pub app_name: String,
    pub app_folder: Option<String>,
    pub description: String,
    pub hard_redeploy: bool,
    pub deletion_timeout: Duration,
    pub poll_interval: Duration,
    pub app_command: Vec<String>,
    /// Copied into the package as the start command's `./<program>`
    pub server_binary: Option<PathBuf>,
    /// Project settings, rewritten for the package layout
    pub project_config: CapacityToml,
    pub paths: FrontendPaths,
    pub project_dir: PathBuf,
}

impl DeployOptions {
    pub fn from_config(
        config: &CapacityConfig,
        app_name: Option<String>,
        app_folder: Option<String>,
        hard_redeploy: bool,
    ) -> Self {
        let deploy = &config.toml.deploy;
        Self {
            app_name: app_name.unwrap_or_else(|| deploy.app_name.clone()),
            app_folder: app_folder.or_else(|| deploy.app_folder.clone()),
            description: deploy.description.clone(),
            hard_redeploy,
            deletion_timeout: Duration::from_secs(deploy.deletion_timeout_secs),
            poll_interval: Duration::from_secs(deploy.poll_interval_secs.max(1)),
            app_command: deploy.command.clone(),
            server_binary: deploy.binary.as_ref().map(|b| config.project_dir.join(b)),
            project_config: config.toml.clone(),
            paths: FrontendPaths::from_config(config),
            project_dir: config.project_dir.clone(),
        }
    }

    /// Use `fallback` as the server binary when none is configured and the
    /// backend directory does not already ship the start command's program.
    pub fn resolve_server_binary(
        &mut self,
        fallback: impl FnOnce() -> std::io::Result<PathBuf>,
    ) -> std::io::Result<()> {
        if self.server_binary.is_some() {
            return Ok(());
        }
        if let Some(program) = package::packaged_program(&self.app_command)
            && !self.paths.backend_dir.join(program).is_file()
        {
            self.server_binary = Some(fallback()?);
        }
        Ok(())
    }
}

/// Outcome of a successful deployment.
#[derive(Debug)]
pub struct DeployReport {
    pub app_folder: String,
    pub created: bool,
    pub deleted_existing: bool,
    pub app_info: Option<AppInfo>,
}

pub struct Deployer<'a> {
    cli: DatabricksCli<'a>,
    runner: &'a dyn CommandRunner,
    options: DeployOptions,
    ui: StatusPrinter,
}

impl<'a> Deployer<'a> {
    pub fn new(
        runner: &'a dyn CommandRunner,
        cli_program: &str,
        options: DeployOptions,
        ui: StatusPrinter,
    ) -> Self {
        Self {
            cli: DatabricksCli::new(runner, cli_program),
            runner,
            options,
            ui,
        }
    }

    /// Run the full workflow. Temporary files are removed whatever the outcome.
    ///
    /// Errors are returned unprinted; the caller reports them once.
    pub async fn deploy(&self) -> Result<DeployReport, DeployError> {
        self.ui.step(&ROCKET, "Starting Databricks deployment");
        self.ui.rule();

        let result = self.run_workflow().await;
        self.cleanup();
        result
    }

    async fn run_workflow(&self) -> Result<DeployReport, DeployError> {
        validate_app_name(&self.options.app_name)?;

        self.ui.step(&SEARCH, "Checking Databricks CLI...");
        self.cli.ensure_ready().await?;
        self.ui.success("Databricks CLI is ready");

        let workspace = self.cli.detect_workspace().await;
        let app_folder = workspace::resolve_app_folder(
            self.options.app_folder.as_deref(),
            workspace.user_email.as_deref(),
            &self.options.app_name,
        );
        self.ui
            .step(&PIN, &format!("App will be deployed to: {}", app_folder));

        let deleted_existing = if self.options.hard_redeploy {
            self.ui.step(
                &FIRE,
                &format!("HARD REDEPLOY for app: {}", self.options.app_name),
            );
            self.remove_existing_app().await?
        } else {
            false
        };

        self.build_and_package().await?;
        self.import_to_workspace(&app_folder).await?;
        let created = self.deploy_app(&app_folder).await?;

        let app_info = match self.cli.app_info(&self.options.app_name).await {
            Ok(info) => {
                self.show_app_info(&info);
                Some(info)
            }
            Err(e) => {
                tracing::warn!("Could not fetch app info: {}", e);
                self.ui.failure(&format!("Failed to get app info: {}", e));
                None
            }
        };

        self.ui.step(&SPARKLE, "Deployment completed successfully!");
        Ok(DeployReport {
            app_folder,
            created,
            deleted_existing,
            app_info,
        })
    }

    /// Delete the app when listed and wait until it disappears. Returns whether it existed.
    async fn remove_existing_app(&self) -> Result<bool, DeployError> {
        let name = &self.options.app_name;
        self.ui.step(&SEARCH, "Checking if app exists...");
        let listing = self.cli.list_apps().await?;
        if !app_listed(&listing, name) {
            self.ui.info(&format!(
                "App '{}' does not exist. Proceeding with fresh deployment.",
                name
            ));
            return Ok(false);
        }

        self.ui.step(&TRASH, &format!("Deleting app: {}", name));
        self.cli.checked("Delete app", &["apps", "delete", name]).await?;
        self.ui.success(&format!("Deleted app: {}", name));

        self.wait_for_deletion().await?;
        Ok(true)
    }

    async fn wait_for_deletion(&self) -> Result<(), DeployError> {
        let name = &self.options.app_name;
        let spinner = self
            .ui
            .spinner(&format!("{}Waiting for app '{}' to be deleted", CLOCK, name));
        let started = Instant::now();

        loop {
            let listing = match self.cli.list_apps().await {
                Ok(listing) => listing,
                Err(e) => {
                    spinner.finish_and_clear();
                    return Err(e);
                }
            };
            if !app_listed(&listing, name) {
                spinner.finish_and_clear();
                self.ui
                    .success(&format!("App '{}' has been successfully deleted", name));
                return Ok(());
            }

            let elapsed = started.elapsed();
            if elapsed >= self.options.deletion_timeout {
                spinner.finish_and_clear();
                return Err(DeployError::DeletionTimeout {
                    app: name.clone(),
                    seconds: self.options.deletion_timeout.as_secs(),
                });
            }
            tracing::debug!(elapsed_secs = elapsed.as_secs(), "App still being deleted");
            tokio::time::sleep(self.options.poll_interval).await;
        }
    }

    async fn build_and_package(&self) -> Result<(), DeployError> {
        let paths = &self.options.paths;

        self.ui.step(&HAMMER, "Building React frontend...");
        let outcome = frontend::build_frontend(self.runner, paths).await?;
        if outcome.installed_dependencies {
            self.ui.detail("Installed frontend dependencies");
        }
        self.ui.success("Frontend built successfully");

        self.ui.step(&FOLDER, "Copying static files...");
        frontend::copy_static_files(paths)?;
        self.ui.success("Static files copied successfully");

        self.ui.step(&PACKAGE, "Packaging backend...");
        let report = package::package_backend(
            &paths.backend_dir,
            &self.options.app_command,
            self.options.server_binary.as_deref(),
            &self.options.project_config,
        )?;
        self.ui.detail(&format!("Included: {}", report.included.join(", ")));
        self.ui.success("Backend packaged successfully");
        Ok(())
    }

    async fn import_to_workspace(&self, app_folder: &str) -> Result<(), DeployError> {
        self.ui.step(&UPLOAD, "Importing to Databricks workspace...");
        let build_dir = self.build_dir().to_string_lossy().to_string();
        self.cli
            .streamed(
                "Import to workspace",
                &["workspace", "import-dir", &build_dir, app_folder, "--overwrite"],
            )
            .await?;
        self.ui.success("Imported to workspace successfully");
        Ok(())
    }

    /// Create the app when missing, then deploy from the workspace folder. Returns whether it was created.
    async fn deploy_app(&self, app_folder: &str) -> Result<bool, DeployError> {
        let name = &self.options.app_name;
        self.ui.step(&ROCKET, "Deploying app to Databricks...");

        let created = if self.cli.app_exists(name).await {
            false
        } else {
            self.ui.step(&ROCKET, &format!("Creating app '{}'...", name));
            self.cli
                .streamed(
                    "Create app",
                    &["apps", "create", name, "--description", &self.options.description],
                )
                .await?;
            self.ui.success("App created successfully");
            true
        };

        self.ui
            .step(&UPLOAD, &format!("Deploying code to app '{}'...", name));
        self.cli
            .streamed(
                "Deploy app",
                &["apps", "deploy", name, "--source-code-path", app_folder],
            )
            .await?;
        self.ui.success("App deployed successfully!");
        Ok(created)
    }

    fn show_app_info(&self, info: &AppInfo) {
        self.ui.blank();
        self.ui.info("App Information:");
        for (label, value) in info.summary() {
            self.ui.detail(&format!("{}: {}", label, value));
        }
        match info.url() {
            Some(url) => self
                .ui
                .step(&GLOBE, &format!("App URL: {}", url)),
            None => self.ui.step(
                &GLOBE,
                &format!("App URL: {} (URL not available)", self.options.app_name),
            ),
        }
    }

    fn build_dir(&self) -> PathBuf {
        self.options.paths.backend_dir.join(package::BUILD_DIR)
    }

    /// Remove `backend/build` and `app_env.json`; failures are only logged.
    fn cleanup(&self) {
        self.ui.step(&BROOM, "Cleaning up...");
        let build_dir = self.build_dir();
        if let Err(e) = crate::util::remove_dir_if_exists(&build_dir) {
            tracing::warn!("Failed to remove {}: {}", build_dir.display(), e);
        }
        let env_file = self.options.project_dir.join("app_env.json");
        if env_file.exists()
            && let Err(e) = std::fs::remove_file(&env_file)
        {
            tracing::warn!("Failed to remove {}: {}", env_file.display(), e);
        }
    }
}
