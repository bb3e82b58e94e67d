//! Typed error hierarchy for Capacity.
//!
//! Three top-level enums cover the three subsystems:
//! - `ServerError`: API server startup failures
//! - `BuildError`: frontend build and static copy failures
//! - `DeployError`: Databricks CLI workflow failures

use std::path::PathBuf;

use thiserror::Error;

/// Errors from starting or running the API server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Failed to bind to {addr}: {source}")]
    BindFailed {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Errors from building the frontend and staging its output.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Failed to spawn `{program}`: {source}")]
    SpawnFailed {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` exited with code {exit_code}")]
    CommandFailed { command: String, exit_code: i32 },

    #[error("Build output directory not found: {0}")]
    DistMissing(PathBuf),

    #[error("Backend directory not found: {0}")]
    BackendMissing(PathBuf),

    #[error("Failed to copy {from} to {to}: {source}")]
    CopyFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors from the Databricks deployment workflow.
#[derive(Debug, Error)]
pub enum DeployError {
    #[error("Databricks CLI not found. Install it first: pip install databricks-cli")]
    CliNotFound,

    #[error("Databricks CLI not configured. Run: databricks configure --token")]
    CliNotConfigured,

    #[error("{step} failed: {stderr}")]
    StepFailed { step: &'static str, stderr: String },

    #[error("Timed out after {seconds}s waiting for app '{app}' to be deleted")]
    DeletionTimeout { app: String, seconds: u64 },

    #[error("Invalid app name '{0}': use 2-30 lowercase letters, digits or hyphens")]
    InvalidAppName(String),

    #[error("{0} cannot be empty")]
    EmptySecret(String),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DeployError {
    pub fn step(step: &'static str, stderr: impl Into<String>) -> Self {
        DeployError::StepFailed {
            step,
            stderr: stderr.into().trim().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_error_bind_failed_carries_addr() {
        let io_err = std::io::Error::new(std::io::ErrorKind::AddrInUse, "in use");
        let err = ServerError::BindFailed {
            addr: "0.0.0.0:8000".to_string(),
            source: io_err,
        };
        assert!(err.to_string().contains("0.0.0.0:8000"));
    }

    #[test]
    fn build_error_command_failed_reports_exit_code() {
        let err = BuildError::CommandFailed {
            command: "npm run build".to_string(),
            exit_code: 2,
        };
        assert_eq!(err.to_string(), "`npm run build` exited with code 2");
    }

    #[test]
    fn deploy_error_step_trims_stderr() {
        let err = DeployError::step("Import to workspace", "  permission denied\n");
        match &err {
            DeployError::StepFailed { step, stderr } => {
                assert_eq!(*step, "Import to workspace");
                assert_eq!(stderr, "permission denied");
            }
            _ => panic!("Expected StepFailed"),
        }
        assert_eq!(err.to_string(), "Import to workspace failed: permission denied");
    }

    #[test]
    fn deploy_error_converts_from_build_error() {
        let inner = BuildError::DistMissing(PathBuf::from("frontend/dist"));
        let err: DeployError = inner.into();
        assert!(matches!(err, DeployError::Build(BuildError::DistMissing(_))));
        assert!(err.to_string().contains("frontend/dist"));
    }

    #[test]
    fn deploy_error_cli_hints_are_actionable() {
        assert!(DeployError::CliNotFound.to_string().contains("pip install"));
        assert!(
            DeployError::CliNotConfigured
                .to_string()
                .contains("databricks configure --token")
        );
    }

    #[test]
    fn all_error_types_implement_std_error_trait() {
        fn assert_std_error<E: std::error::Error>(_: &E) {}
        assert_std_error(&ServerError::Serve(std::io::Error::other("x")));
        assert_std_error(&BuildError::BackendMissing(PathBuf::from("backend")));
        assert_std_error(&DeployError::CliNotFound);
    }
}
