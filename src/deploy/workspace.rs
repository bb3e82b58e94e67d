//! Workspace identity and app metadata as reported by the Databricks CLI.

use chrono::DateTime;
use serde::Deserialize;

use crate::util::extract_json_object;

/// Placeholder user used when the current user cannot be detected.
pub const PLACEHOLDER_USER: &str = "YOUR_USER@example.com";

/// What the CLI could tell us about the configured workspace.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkspaceInfo {
    pub host: Option<String>,
    pub user_email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CurrentUser {
    #[serde(rename = "userName", alias = "user_name")]
    user_name: Option<String>,
}

/// Parse `databricks current-user me --output json`.
pub fn parse_user_email(stdout: &str) -> Option<String> {
    let json = extract_json_object(stdout)?;
    serde_json::from_str::<CurrentUser>(json)
        .ok()?
        .user_name
        .filter(|name| !name.is_empty())
}

/// Workspace folder the app is imported into and deployed from.
///
/// An explicit folder wins, then the detected user's home, then a placeholder.
pub fn resolve_app_folder(explicit: Option<&str>, user_email: Option<&str>, app_name: &str) -> String {
    if let Some(folder) = explicit {
        return folder.to_string();
    }
    let user = user_email.unwrap_or(PLACEHOLDER_USER);
    format!("/Workspace/Users/{}/{}", user, app_name)
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppStatus {
    pub state: Option<String>,
    pub message: Option<String>,
}

/// Subset of `databricks apps get` output.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppInfo {
    pub name: Option<String>,
    #[serde(default)]
    pub app_status: Option<AppStatus>,
    pub create_time: Option<String>,
    pub update_time: Option<String>,
    pub url: Option<String>,
}

impl AppInfo {
    pub fn parse(stdout: &str) -> Option<Self> {
        let json = extract_json_object(stdout)?;
        serde_json::from_str(json).ok()
    }

    pub fn state(&self) -> &str {
        self.app_status
            .as_ref()
            .and_then(|s| s.state.as_deref())
            .unwrap_or("N/A")
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref().filter(|u| !u.is_empty() && *u != "N/A")
    }

    /// `name`, `status`, `created`, `updated` rows for display.
    pub fn summary(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Name", self.name.clone().unwrap_or_else(|| "N/A".to_string())),
            ("Status", self.state().to_string()),
            ("Created", format_timestamp(self.create_time.as_deref())),
            ("Updated", format_timestamp(self.update_time.as_deref())),
        ]
    }
}

/// Render an RFC 3339 timestamp as UTC; anything else is shown verbatim.
pub fn format_timestamp(raw: Option<&str>) -> String {
    match raw {
        None => "N/A".to_string(),
        Some(raw) => DateTime::parse_from_rfc3339(raw)
            .map(|t| t.to_utc().format("%Y-%m-%d %H:%M:%S UTC").to_string())
            .unwrap_or_else(|_| raw.to_string()),
    }
}
