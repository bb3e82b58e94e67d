//! Backend packaging: copy the deployable part of `backend/` into
//! `backend/build` and write the `app.yaml` the hosting platform runs.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use glob::Pattern;
use serde::Serialize;

use crate::config::{CONFIG_FILE, CapacityToml};
use crate::util::{copy_dir_all, remove_dir_if_exists};

/// Top-level entry names never shipped with the app.
pub const EXCLUDE_PATTERNS: &[&str] = &[
    // Virtual environments
    "venv", "venv.*", ".venv", "env", ".env",
    // Python cache
    "__pycache__", "*.pyc", "*.pyo", "*.pyd",
    // Tests and logs
    ".pytest_cache", "test_*.py", "tests", "test_*.log", "test_*.txt", "*.log",
    // Local data
    "data.json", "cookies.txt",
    // Build files and artifacts
    ".env_template", "Makefile", "build", "dist", "*.egg-info", "target",
    // ML/backup files
    "mlruns", "databricks_backup", "*.backup", "*.dbd_secrets",
    // Dev and OS files
    "node_modules", ".git", ".gitignore", ".DS_Store", "Thumbs.db",
];

/// Name of the staging directory inside the backend dir.
pub const BUILD_DIR: &str = "build";

fn compiled_patterns() -> Vec<Pattern> {
    EXCLUDE_PATTERNS
        .iter()
        .filter_map(|p| Pattern::new(p).ok())
        .collect()
}

/// Whether a top-level backend entry is left out of the package.
pub fn should_exclude(name: &str) -> bool {
    name.starts_with('.') || compiled_patterns().iter().any(|p| p.matches(name))
}

#[derive(Debug, Serialize)]
struct EnvVar {
    name: String,
    value: String,
}

#[derive(Debug, Serialize)]
struct AppYaml {
    command: Vec<String>,
    env: Vec<EnvVar>,
}

/// Render the `app.yaml` manifest for the given start command.
pub fn render_app_yaml(command: &[String]) -> Result<String> {
    let env = [("ENV", "production"), ("PORT", "8000"), ("DEBUG", "False")]
        .into_iter()
        .map(|(name, value)| EnvVar {
            name: name.to_string(),
            value: value.to_string(),
        })
        .collect();
    let manifest = AppYaml {
        command: command.to_vec(),
        env,
    };
    serde_yaml::to_string(&manifest).context("Failed to serialize app.yaml")
}

/// Static directory name inside the package.
pub const PACKAGED_STATIC_DIR: &str = "static";

/// The executable a `./<name>` start command expects inside the package.
pub fn packaged_program(command: &[String]) -> Option<&str> {
    command
        .first()?
        .strip_prefix("./")
        .filter(|name| !name.is_empty())
}

/// The project config rewritten for the package layout, where the build dir
/// itself is the backend and the SPA sits in `static/`.
pub fn packaged_config(project: &CapacityToml) -> CapacityToml {
    let mut toml = project.clone();
    toml.paths.backend = PathBuf::from(".");
    toml.server.static_dir = Some(PathBuf::from(PACKAGED_STATIC_DIR));
    toml
}

/// Summary of a packaging run.
#[derive(Debug)]
pub struct PackageReport {
    pub build_dir: PathBuf,
    pub included: Vec<String>,
    pub excluded: Vec<String>,
}

/// Recreate `<backend>/build` with the deployable backend entries, the server
/// binary, `capacity.toml` and `app.yaml`.
///
/// Fails when the start command names a `./<program>` that ends up missing
/// from the package.
pub fn package_backend(
    backend_dir: &Path,
    command: &[String],
    server_binary: Option<&Path>,
    project_config: &CapacityToml,
) -> Result<PackageReport> {
    let build_dir = backend_dir.join(BUILD_DIR);
    remove_dir_if_exists(&build_dir)
        .with_context(|| format!("Failed to remove {}", build_dir.display()))?;
    std::fs::create_dir_all(&build_dir)
        .with_context(|| format!("Failed to create {}", build_dir.display()))?;

    let mut entries: Vec<_> = std::fs::read_dir(backend_dir)
        .with_context(|| format!("Failed to read {}", backend_dir.display()))?
        .collect::<std::io::Result<_>>()
        .context("Failed to list backend directory")?;
    entries.sort_by_key(|e| e.file_name());

    let mut included = Vec::new();
    let mut excluded = Vec::new();
    for entry in entries {
        let name = entry.file_name().to_string_lossy().to_string();
        if should_exclude(&name) {
            excluded.push(name);
            continue;
        }

        let src = entry.path();
        let dst = build_dir.join(&name);
        if src.is_dir() {
            copy_dir_all(&src, &dst)
                .with_context(|| format!("Failed to copy {}", src.display()))?;
        } else {
            std::fs::copy(&src, &dst)
                .with_context(|| format!("Failed to copy {}", src.display()))?;
        }
        included.push(name);
    }

    let program = packaged_program(command);
    if let Some(binary) = server_binary {
        let name = program.context(
            "deploy.binary is set but deploy.command does not start with ./<program>",
        )?;
        std::fs::copy(binary, build_dir.join(name))
            .with_context(|| format!("Failed to copy server binary {}", binary.display()))?;
        if !included.iter().any(|n| n == name) {
            included.push(name.to_string());
        }
    }
    if let Some(name) = program
        && !build_dir.join(name).is_file()
    {
        anyhow::bail!(
            "Server binary '{}' is missing from the package: set deploy.binary or place it in {}",
            name,
            backend_dir.display()
        );
    }

    packaged_config(project_config).save(&build_dir.join(CONFIG_FILE))?;
    let manifest = render_app_yaml(command)?;
    std::fs::write(build_dir.join("app.yaml"), manifest).context("Failed to write app.yaml")?;
    tracing::debug!(?included, ?excluded, "Packaged backend");

    Ok(PackageReport {
        build_dir,
        included,
        excluded,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_should_exclude_known_patterns() {
        for name in [
            "venv",
            "venv.old",
            "__pycache__",
            "module.pyc",
            "test_api.py",
            "server.log",
            "pkg.egg-info",
            "node_modules",
            "build",
            "Thumbs.db",
            "backup.dbd_secrets",
        ] {
            assert!(should_exclude(name), "expected {} to be excluded", name);
        }
    }

    #[test]
    fn test_should_exclude_dotfiles() {
        assert!(should_exclude(".secret"));
        assert!(should_exclude(".env"));
    }

    #[test]
    fn test_should_keep_app_files() {
        for name in ["app.py", "capacity", "static", "requirements.txt", "testing.md"] {
            assert!(!should_exclude(name), "expected {} to be kept", name);
        }
    }

    #[test]
    fn test_render_app_yaml() {
        let command: Vec<String> = ["./capacity", "serve"].iter().map(|s| s.to_string()).collect();
        let yaml = render_app_yaml(&command).unwrap();
        let parsed: serde_yaml::Value = serde_yaml::from_str(&yaml).unwrap();

        assert_eq!(parsed["command"][0], "./capacity");
        assert_eq!(parsed["command"][1], "serve");
        assert_eq!(parsed["env"][0]["name"], "ENV");
        assert_eq!(parsed["env"][0]["value"], "production");
        assert_eq!(parsed["env"][1]["value"], "8000");
        assert_eq!(parsed["env"][2]["value"], "False");
    }

    #[test]
    fn test_package_backend_filters_and_writes_manifest() {
        let dir = tempdir().unwrap();
        let backend = dir.path().join("backend");
        std::fs::create_dir_all(backend.join("static/assets")).unwrap();
        std::fs::create_dir_all(backend.join("__pycache__")).unwrap();
        std::fs::create_dir_all(backend.join("build/stale")).unwrap();
        std::fs::write(backend.join("capacity"), "binary").unwrap();
        std::fs::write(backend.join("static/index.html"), "<html/>").unwrap();
        std::fs::write(backend.join("static/assets/app.js"), "js").unwrap();
        std::fs::write(backend.join("debug.log"), "noise").unwrap();
        std::fs::write(backend.join(".env"), "SECRET=1").unwrap();

        let report = package_backend(
            &backend,
            &["./capacity".to_string()],
            None,
            &CapacityToml::default(),
        )
        .unwrap();

        assert_eq!(report.included, vec!["capacity", "static"]);
        assert!(report.excluded.contains(&"__pycache__".to_string()));
        assert!(report.excluded.contains(&"build".to_string()));
        assert!(report.excluded.contains(&".env".to_string()));

        let build = backend.join("build");
        assert!(build.join("capacity").is_file());
        assert!(build.join("static/assets/app.js").is_file());
        assert!(build.join("app.yaml").is_file());
        assert!(!build.join("stale").exists());
        assert!(!build.join("debug.log").exists());
        assert!(!build.join(".env").exists());
        assert!(build.join("capacity.toml").is_file());
    }

    #[test]
    fn test_packaged_program() {
        let cmd = |parts: &[&str]| parts.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        assert_eq!(packaged_program(&cmd(&["./capacity", "serve"])), Some("capacity"));
        assert_eq!(packaged_program(&cmd(&["python", "app.py"])), None);
        assert_eq!(packaged_program(&cmd(&["./"])), None);
        assert_eq!(packaged_program(&[]), None);
    }

    #[test]
    fn test_package_stages_server_binary() {
        let dir = tempdir().unwrap();
        let backend = dir.path().join("backend");
        std::fs::create_dir_all(&backend).unwrap();
        let binary = dir.path().join("target-capacity");
        std::fs::write(&binary, "elf").unwrap();

        let report = package_backend(
            &backend,
            &["./capacity".to_string(), "serve".to_string()],
            Some(&binary),
            &CapacityToml::default(),
        )
        .unwrap();

        assert_eq!(report.included, vec!["capacity"]);
        assert_eq!(
            std::fs::read_to_string(report.build_dir.join("capacity")).unwrap(),
            "elf"
        );
    }

    #[test]
    fn test_package_fails_without_server_binary() {
        let dir = tempdir().unwrap();
        let backend = dir.path().join("backend");
        std::fs::create_dir_all(backend.join("static")).unwrap();

        let err = package_backend(
            &backend,
            &["./capacity".to_string()],
            None,
            &CapacityToml::default(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("Server binary 'capacity'"));
    }

    #[tokio::test]
    async fn test_packaged_app_serves_its_frontend() {
        use crate::config::CapacityConfig;
        use crate::server::{ServerConfig, build_app};
        use axum::body::Body;
        use axum::http::{Request, StatusCode};
        use http_body_util::BodyExt;
        use tower::ServiceExt;

        let dir = tempdir().unwrap();
        let backend = dir.path().join("backend");
        std::fs::create_dir_all(backend.join("static/assets")).unwrap();
        std::fs::write(backend.join("static/index.html"), "<html>deployed</html>").unwrap();
        std::fs::write(backend.join("static/assets/app.js"), "js").unwrap();
        let binary = dir.path().join("capacity-bin");
        std::fs::write(&binary, "elf").unwrap();

        let report = package_backend(
            &backend,
            &["./capacity".to_string(), "serve".to_string()],
            Some(&binary),
            &CapacityToml::default(),
        )
        .unwrap();
        let build = report.build_dir;
        assert!(build.join("capacity").is_file());

        // The deployed server runs from the package root with no flags.
        let toml = CapacityToml::load_or_default(&build).unwrap();
        let config = CapacityConfig::resolve(build.clone(), toml, |_| None);
        let server = ServerConfig::from_config(&config);
        assert_eq!(server.static_dir, build.join("static"));

        for (uri, body) in [("/", "<html>deployed</html>"), ("/assets/app.js", "js")] {
            let app = build_app(&server).unwrap();
            let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
            let resp = app.oneshot(req).await.unwrap();
            assert_eq!(resp.status(), StatusCode::OK, "{}", uri);
            let bytes = resp.into_body().collect().await.unwrap().to_bytes();
            assert_eq!(&bytes[..], body.as_bytes());
        }
    }
}
