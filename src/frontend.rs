//! Frontend build: install npm dependencies, build the React app and stage
//! its output in the backend's static directory.

use std::path::{Path, PathBuf};

use crate::errors::BuildError;
use crate::process::{CommandRunner, Invocation};
use crate::util::{copy_dir_all, remove_dir_if_exists};

const NPM: &str = "npm";

/// Paths involved in building and staging the frontend.
#[derive(Debug, Clone)]
pub struct FrontendPaths {
    pub frontend_dir: PathBuf,
    pub static_dir: PathBuf,
    pub backend_dir: PathBuf,
}

impl FrontendPaths {
    pub fn from_config(config: &crate::config::CapacityConfig) -> Self {
        Self {
            frontend_dir: config.frontend_dir(),
            static_dir: config.static_dir(),
            backend_dir: config.backend_dir(),
        }
    }

    pub fn dist_dir(&self) -> PathBuf {
        self.frontend_dir.join("dist")
    }

    pub fn node_modules(&self) -> PathBuf {
        self.frontend_dir.join("node_modules")
    }
}

/// What `build_frontend` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildOutcome {
    pub installed_dependencies: bool,
}

async fn run_npm(runner: &dyn CommandRunner, frontend_dir: &Path, args: &[&str]) -> Result<(), BuildError> {
    let prefix = frontend_dir.to_string_lossy().to_string();
    let mut full_args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
    full_args.push("--prefix".to_string());
    full_args.push(prefix);
    let invocation = Invocation::new(NPM, full_args).streaming();

    let output = runner
        .run(&invocation)
        .await
        .map_err(|source| BuildError::SpawnFailed {
            program: NPM.to_string(),
            source,
        })?;

    if !output.success() {
        return Err(BuildError::CommandFailed {
            command: invocation.command_line(),
            exit_code: output.exit_code,
        });
    }
    Ok(())
}

/// Run `npm install` when `node_modules` is missing, then `npm run build`.
pub async fn build_frontend(
    runner: &dyn CommandRunner,
    paths: &FrontendPaths,
) -> Result<BuildOutcome, BuildError> {
    let installed_dependencies = if paths.node_modules().exists() {
        tracing::debug!("Frontend dependencies already installed");
        false
    } else {
        tracing::info!("Installing frontend dependencies");
        run_npm(runner, &paths.frontend_dir, &["install"]).await?;
        true
    };

    tracing::info!("Building React application");
    run_npm(runner, &paths.frontend_dir, &["run", "build"]).await?;

    Ok(BuildOutcome {
        installed_dependencies,
    })
}

/// Replace the static directory with a fresh copy of `frontend/dist`.
pub fn copy_static_files(paths: &FrontendPaths) -> Result<usize, BuildError> {
    let dist = paths.dist_dir();
    if !dist.is_dir() {
        return Err(BuildError::DistMissing(dist));
    }

    let copy_err = |source| BuildError::CopyFailed {
        from: dist.clone(),
        to: paths.static_dir.clone(),
        source,
    };
    remove_dir_if_exists(&paths.static_dir).map_err(copy_err)?;
    let copied = copy_dir_all(&dist, &paths.static_dir).map_err(copy_err)?;
    tracing::info!(
        "Copied {} files from {} to {}",
        copied,
        dist.display(),
        paths.static_dir.display()
    );
    Ok(copied)
}

pub fn verify_backend(paths: &FrontendPaths) -> Result<(), BuildError> {
    if paths.backend_dir.is_dir() {
        Ok(())
    } else {
        Err(BuildError::BackendMissing(paths.backend_dir.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::CommandOutput;
    use crate::process::testing::ScriptedRunner;
    use tempfile::{TempDir, tempdir};

    fn project() -> (TempDir, FrontendPaths) {
        let dir = tempdir().unwrap();
        let paths = FrontendPaths {
            frontend_dir: dir.path().join("frontend"),
            static_dir: dir.path().join("backend/static"),
            backend_dir: dir.path().join("backend"),
        };
        std::fs::create_dir_all(&paths.frontend_dir).unwrap();
        std::fs::create_dir_all(&paths.backend_dir).unwrap();
        (dir, paths)
    }

    #[tokio::test]
    async fn test_build_installs_when_node_modules_missing() {
        let (_dir, paths) = project();
        let runner = ScriptedRunner::new();

        let outcome = build_frontend(&runner, &paths).await.unwrap();

        assert!(outcome.installed_dependencies);
        let calls = runner.calls();
        assert_eq!(calls.len(), 2);
        assert!(calls[0].starts_with("npm install --prefix"));
        assert!(calls[1].starts_with("npm run build --prefix"));
        assert!(runner.invocations().iter().all(|i| i.stream));
    }

    #[tokio::test]
    async fn test_build_skips_install_when_node_modules_present() {
        let (_dir, paths) = project();
        std::fs::create_dir_all(paths.node_modules()).unwrap();
        let runner = ScriptedRunner::new();

        let outcome = build_frontend(&runner, &paths).await.unwrap();

        assert!(!outcome.installed_dependencies);
        assert_eq!(runner.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_build_failure_reports_exit_code() {
        let (_dir, paths) = project();
        std::fs::create_dir_all(paths.node_modules()).unwrap();
        let runner = ScriptedRunner::new().respond("npm run build", CommandOutput::failed(2, ""));

        let err = build_frontend(&runner, &paths).await.unwrap_err();
        assert!(matches!(err, BuildError::CommandFailed { exit_code: 2, .. }));
    }

    #[tokio::test]
    async fn test_build_spawn_failure() {
        let (_dir, paths) = project();
        let runner = ScriptedRunner::new().spawn_error("npm");

        let err = build_frontend(&runner, &paths).await.unwrap_err();
        assert!(matches!(err, BuildError::SpawnFailed { .. }));
    }

    #[test]
    fn test_copy_static_files_replaces_existing() {
        let (_dir, paths) = project();
        std::fs::create_dir_all(paths.dist_dir().join("assets")).unwrap();
        std::fs::write(paths.dist_dir().join("index.html"), "new").unwrap();
        std::fs::write(paths.dist_dir().join("assets/app.js"), "js").unwrap();
        std::fs::create_dir_all(&paths.static_dir).unwrap();
        std::fs::write(paths.static_dir.join("stale.js"), "old").unwrap();

        let copied = copy_static_files(&paths).unwrap();

        assert_eq!(copied, 2);
        assert!(!paths.static_dir.join("stale.js").exists());
        assert_eq!(
            std::fs::read_to_string(paths.static_dir.join("index.html")).unwrap(),
            "new"
        );
    }

    #[test]
    fn test_copy_static_files_requires_dist() {
        let (_dir, paths) = project();
        let err = copy_static_files(&paths).unwrap_err();
        assert!(matches!(err, BuildError::DistMissing(_)));
    }

    #[test]
    fn test_verify_backend() {
        let (_dir, paths) = project();
        assert!(verify_backend(&paths).is_ok());
        std::fs::remove_dir_all(&paths.backend_dir).unwrap();
        assert!(matches!(
            verify_backend(&paths),
            Err(BuildError::BackendMissing(_))
        ));
    }
}
