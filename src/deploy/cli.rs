//! Thin wrapper over the `databricks` command-line tool.

use crate::errors::DeployError;
use crate::process::{CommandOutput, CommandRunner, Invocation};

use super::workspace::{AppInfo, WorkspaceInfo, parse_user_email};

pub struct DatabricksCli<'a> {
    runner: &'a dyn CommandRunner,
    program: String,
}

impl<'a> DatabricksCli<'a> {
    pub fn new(runner: &'a dyn CommandRunner, program: impl Into<String>) -> Self {
        Self {
            runner,
            program: program.into(),
        }
    }

    fn invocation(&self, args: &[&str]) -> Invocation {
        Invocation::new(self.program.clone(), args.iter().copied())
    }

    /// Run with captured output.
    pub async fn run(&self, args: &[&str]) -> std::io::Result<CommandOutput> {
        self.runner.run(&self.invocation(args)).await
    }

    /// Run with captured output; spawn failures and non-zero exits become `StepFailed`.
    pub async fn checked(&self, step: &'static str, args: &[&str]) -> Result<CommandOutput, DeployError> {
        let out = self
            .run(args)
            .await
            .map_err(|e| DeployError::step(step, e.to_string()))?;
        if out.success() {
            Ok(out)
        } else {
            Err(failure(step, &out))
        }
    }

    /// Run with output streamed to the terminal; non-zero exits become `StepFailed`.
    pub async fn streamed(&self, step: &'static str, args: &[&str]) -> Result<(), DeployError> {
        let out = self
            .runner
            .run(&self.invocation(args).streaming())
            .await
            .map_err(|e| DeployError::step(step, e.to_string()))?;
        if out.success() {
            Ok(())
        } else {
            Err(failure(step, &out))
        }
    }

    /// `databricks --version` then `databricks workspace list /`.
    pub async fn ensure_ready(&self) -> Result<(), DeployError> {
        match self.run(&["--version"]).await {
            Ok(out) if out.success() => {}
            _ => return Err(DeployError::CliNotFound),
        }
        match self.run(&["workspace", "list", "/"]).await {
            Ok(out) if out.success() => Ok(()),
            _ => Err(DeployError::CliNotConfigured),
        }
    }

    /// Best-effort detection of the workspace host and current user.
    pub async fn detect_workspace(&self) -> WorkspaceInfo {
        let host = match self.run(&["config", "get", "host"]).await {
            Ok(out) if out.success() => Some(out.stdout.trim().to_string()).filter(|h| !h.is_empty()),
            _ => None,
        };
        let user_email = match self.run(&["current-user", "me", "--output", "json"]).await {
            Ok(out) if out.success() => parse_user_email(&out.stdout),
            _ => None,
        };
        tracing::debug!(?host, ?user_email, "Detected workspace");
        WorkspaceInfo { host, user_email }
    }

    /// Whether `databricks apps get <name>` succeeds.
    pub async fn app_exists(&self, name: &str) -> bool {
        matches!(self.run(&["apps", "get", name]).await, Ok(out) if out.success())
    }

    pub async fn app_info(&self, name: &str) -> Result<AppInfo, DeployError> {
        let out = self.checked("Get app info", &["apps", "get", name]).await?;
        AppInfo::parse(&out.stdout)
            .ok_or_else(|| DeployError::step("Parse app info", out.stdout.clone()))
    }

    /// Raw `databricks apps list` output.
    pub async fn list_apps(&self) -> Result<String, DeployError> {
        Ok(self.checked("List apps", &["apps", "list"]).await?.stdout)
    }
}

fn failure(step: &'static str, out: &CommandOutput) -> DeployError {
    if out.stderr.trim().is_empty() {
        DeployError::step(step, format!("exited with code {}", out.exit_code))
    } else {
        DeployError::step(step, out.stderr.clone())
    }
}
