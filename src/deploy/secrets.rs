//! Secret scope management for the deployed app.

use uuid::Uuid;

use super::cli::DatabricksCli;
use crate::errors::DeployError;

/// A Databricks secret scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeInfo {
    pub name: String,
    pub owner: String,
    pub created_at: String,
    pub secret_count: usize,
}

/// Where a secret's value comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretSource {
    /// Typed by the user, hidden
    Prompt,
    /// Defaults to the detected workspace host
    WorkspaceUrl,
    /// Generated locally
    Generated,
}

/// A secret the app expects to find in its scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequiredSecret {
    pub key: &'static str,
    pub description: &'static str,
    pub source: SecretSource,
}

pub fn required_secrets() -> Vec<RequiredSecret> {
    vec![
        RequiredSecret {
            key: "databricks-token",
            description: "Databricks personal access token",
            source: SecretSource::Prompt,
        },
        RequiredSecret {
            key: "databricks-api-url",
            description: "Databricks workspace URL",
            source: SecretSource::WorkspaceUrl,
        },
        RequiredSecret {
            key: "openai-api-key",
            description: "OpenAI API key",
            source: SecretSource::Prompt,
        },
        RequiredSecret {
            key: "anthropic-api-key",
            description: "Anthropic API key",
            source: SecretSource::Prompt,
        },
        RequiredSecret {
            key: "session-secret",
            description: "Session secret for the API server",
            source: SecretSource::Generated,
        },
    ]
}

/// 64 hex characters of v4 UUID randomness.
pub fn generate_session_secret() -> String {
    format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
}

/// Parse `databricks secrets list-scopes` output, skipping the header row.
///
/// Rows with fewer than three columns are ignored. Secret counts start at zero.
pub fn parse_scopes(stdout: &str) -> Vec<ScopeInfo> {
    stdout
        .lines()
        .skip(1)
        .filter_map(|line| {
            let mut cols = line.split_whitespace();
            let name = cols.next()?;
            let owner = cols.next()?;
            let created_at = cols.next()?;
            Some(ScopeInfo {
                name: name.to_string(),
                owner: owner.to_string(),
                created_at: created_at.to_string(),
                secret_count: 0,
            })
        })
        .collect()
}

/// Count secrets in `databricks secrets list --scope` output (rows minus header).
pub fn count_secrets(stdout: &str) -> usize {
    stdout
        .lines()
        .filter(|l| !l.trim().is_empty())
        .count()
        .saturating_sub(1)
}

/// Resolve a user's choice against the displayed scopes.
///
/// A number picks from the displayed list (1-based); anything else must be an
/// exact scope name from the full list.
pub fn match_scope_choice<'a>(
    choice: &str,
    displayed: &'a [ScopeInfo],
    all: &'a [ScopeInfo],
) -> Option<&'a ScopeInfo> {
    let choice = choice.trim();
    if let Ok(n) = choice.parse::<usize>() {
        return n.checked_sub(1).and_then(|i| displayed.get(i));
    }
    all.iter().find(|s| s.name == choice)
}

impl DatabricksCli<'_> {
    /// List scopes with their secret counts.
    pub async fn list_scopes(&self) -> Result<Vec<ScopeInfo>, DeployError> {
        let out = self
            .checked("List secret scopes", &["secrets", "list-scopes"])
            .await?;
        let mut scopes = parse_scopes(&out.stdout);
        for scope in &mut scopes {
            let listed = self
                .run(&["secrets", "list", "--scope", &scope.name])
                .await;
            if let Ok(out) = listed
                && out.success()
            {
                scope.secret_count = count_secrets(&out.stdout);
            }
        }
        Ok(scopes)
    }

    pub async fn create_scope(&self, name: &str) -> Result<(), DeployError> {
        if name.trim().is_empty() {
            return Err(DeployError::EmptySecret("Scope name".to_string()));
        }
        self.checked("Create secret scope", &["secrets", "create-scope", "--scope", name])
            .await?;
        Ok(())
    }

    /// Write secrets in order, stopping at the first failure.
    pub async fn put_secrets(&self, scope: &str, secrets: &[(String, String)]) -> Result<(), DeployError> {
        for (key, value) in secrets {
            if value.is_empty() {
                return Err(DeployError::EmptySecret(key.clone()));
            }
            tracing::info!("Adding secret {} to scope {}", key, scope);
            self.checked(
                "Add secret",
                &["secrets", "put", "--scope", scope, "--key", key, "--string-value", value],
            )
            .await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::CommandOutput;
    use crate::process::testing::ScriptedRunner;

    const SCOPES: &str = "Scope              Backend     Created\n\
                          capacity-prod      DATABRICKS  2024-01-01\n\
                          \n\
                          shared             DATABRICKS  2023-06-30\n";

    #[test]
    fn test_parse_scopes_skips_header_and_blank_lines() {
        let scopes = parse_scopes(SCOPES);
        assert_eq!(scopes.len(), 2);
        assert_eq!(scopes[0].name, "capacity-prod");
        assert_eq!(scopes[0].owner, "DATABRICKS");
        assert_eq!(scopes[1].created_at, "2023-06-30");
    }

    #[test]
    fn test_count_secrets() {
        assert_eq!(count_secrets("Key  Last updated\na  1\nb  2\n"), 2);
        assert_eq!(count_secrets("Key  Last updated\n"), 0);
        assert_eq!(count_secrets(""), 0);
    }

    #[test]
    fn test_match_scope_choice() {
        let all = parse_scopes(SCOPES);
        let displayed = &all[..1];
        assert_eq!(match_scope_choice("1", displayed, &all).unwrap().name, "capacity-prod");
        assert!(match_scope_choice("2", displayed, &all).is_none());
        assert!(match_scope_choice("0", displayed, &all).is_none());
        assert_eq!(match_scope_choice(" shared ", displayed, &all).unwrap().name, "shared");
        assert!(match_scope_choice("missing", displayed, &all).is_none());
    }

    #[test]
    fn test_session_secret_shape() {
        let a = generate_session_secret();
        let b = generate_session_secret();
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn test_required_secrets_keys() {
        let keys: Vec<&str> = required_secrets().iter().map(|s| s.key).collect();
        assert_eq!(
            keys,
            vec![
                "databricks-token",
                "databricks-api-url",
                "openai-api-key",
                "anthropic-api-key",
                "session-secret"
            ]
        );
    }

    #[tokio::test]
    async fn test_list_scopes_counts_secrets() {
        let runner = ScriptedRunner::new()
            .respond("databricks secrets list-scopes", CommandOutput::ok(SCOPES))
            .respond(
                "databricks secrets list --scope capacity-prod",
                CommandOutput::ok("Key Updated\ntoken 1\nurl 2\n"),
            )
            .respond(
                "databricks secrets list --scope shared",
                CommandOutput::failed(1, "denied"),
            );
        let cli = DatabricksCli::new(&runner, "databricks");

        let scopes = cli.list_scopes().await.unwrap();
        assert_eq!(scopes[0].secret_count, 2);
        assert_eq!(scopes[1].secret_count, 0);
    }

    #[tokio::test]
    async fn test_list_scopes_failure() {
        let runner = ScriptedRunner::new()
            .respond("databricks secrets list-scopes", CommandOutput::failed(1, "no auth"));
        let cli = DatabricksCli::new(&runner, "databricks");
        let err = cli.list_scopes().await.unwrap_err();
        assert!(err.to_string().contains("no auth"));
    }

    #[tokio::test]
    async fn test_create_scope_rejects_empty_name() {
        let runner = ScriptedRunner::new();
        let cli = DatabricksCli::new(&runner, "databricks");
        assert!(cli.create_scope("  ").await.is_err());
        assert!(runner.calls().is_empty());
        cli.create_scope("capacity").await.unwrap();
        assert_eq!(
            runner.calls(),
            vec!["databricks secrets create-scope --scope capacity"]
        );
    }

    #[tokio::test]
    async fn test_put_secrets_stops_at_first_failure() {
        let runner = ScriptedRunner::new().respond(
            "databricks secrets put --scope cap --key b",
            CommandOutput::failed(1, "quota"),
        );
        let cli = DatabricksCli::new(&runner, "databricks");
        let secrets = vec![
            ("a".to_string(), "1".to_string()),
            ("b".to_string(), "2".to_string()),
            ("c".to_string(), "3".to_string()),
        ];

        let err = cli.put_secrets("cap", &secrets).await.unwrap_err();
        assert!(err.to_string().contains("quota"));
        assert_eq!(runner.calls().len(), 2);
    }
}
