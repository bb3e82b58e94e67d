//! Secret scope setup command (`capacity secrets`).

use std::path::PathBuf;

use anyhow::{Context, Result};
use capacity::config::CapacityConfig;
use capacity::deploy::DatabricksCli;
use capacity::deploy::secrets::{
    ScopeInfo, SecretSource, generate_session_secret, match_scope_choice, required_secrets,
};
use capacity::errors::DeployError;
use capacity::process::SystemRunner;
use capacity::ui::StatusPrinter;
use capacity::ui::icons::{LOCK, SEARCH, SPARKLE};
use console::style;
use dialoguer::{Confirm, Input, Password, Select, theme::ColorfulTheme};

const MAX_DISPLAYED_SCOPES: usize = 20;

pub async fn cmd_secrets(project_dir: PathBuf, scope: Option<String>, create: bool) -> Result<()> {
    let config = CapacityConfig::load(project_dir)?;
    let runner = SystemRunner;
    let cli = DatabricksCli::new(&runner, config.databricks_cli());
    let ui = StatusPrinter::new();

    ui.step(&LOCK, "Databricks secrets setup");
    ui.rule();

    ui.step(&SEARCH, "Checking Databricks CLI...");
    cli.ensure_ready().await?;
    let workspace = cli.detect_workspace().await;
    if let Some(host) = &workspace.host {
        ui.detail(&format!("Workspace: {}", host));
    }

    let scope = match scope {
        Some(name) if create => {
            cli.create_scope(&name).await?;
            ui.success(&format!("Created scope '{}'", name));
            name
        }
        Some(name) => name,
        None => choose_scope(&cli, &ui).await?,
    };

    let theme = ColorfulTheme::default();
    let mut values = Vec::new();
    for secret in required_secrets() {
        let value = match secret.source {
            SecretSource::Prompt => Password::with_theme(&theme)
                .with_prompt(format!("{} ({})", secret.description, secret.key))
                .interact()
                .context("Failed to read secret")?,
            SecretSource::WorkspaceUrl => {
                let mut input = Input::<String>::with_theme(&theme)
                    .with_prompt(format!("{} ({})", secret.description, secret.key));
                if let Some(host) = &workspace.host {
                    input = input.default(host.clone());
                }
                input.interact_text().context("Failed to read workspace URL")?
            }
            SecretSource::Generated => {
                ui.detail(&format!("Generated {}", secret.key));
                generate_session_secret()
            }
        };
        let value = value.trim().to_string();
        if value.is_empty() {
            return Err(DeployError::EmptySecret(secret.key.to_string()).into());
        }
        values.push((secret.key.to_string(), value));
    }

    let proceed = Confirm::with_theme(&theme)
        .with_prompt(format!("Write {} secrets to scope '{}'?", values.len(), scope))
        .default(true)
        .interact()
        .context("Failed to read confirmation")?;
    if !proceed {
        ui.info("Aborted; no secrets were written.");
        return Ok(());
    }

    cli.put_secrets(&scope, &values).await?;
    ui.step(&SPARKLE, &format!("Secrets written to scope '{}'", scope));
    ui.info("Reference them from app.yaml, for example:");
    for (key, _) in &values {
        ui.detail(&format!("{{{{secrets/{}/{}}}}}", scope, key));
    }
    Ok(())
}

async fn choose_scope(cli: &DatabricksCli<'_>, ui: &StatusPrinter) -> Result<String> {
    let scopes = cli.list_scopes().await?;
    let displayed = &scopes[..scopes.len().min(MAX_DISPLAYED_SCOPES)];

    if displayed.is_empty() {
        ui.info("No secret scopes found.");
    } else {
        print_scopes(displayed);
        if scopes.len() > displayed.len() {
            ui.detail(&format!(
                "... and {} more (type a name to use one)",
                scopes.len() - displayed.len()
            ));
        }
    }

    let theme = ColorfulTheme::default();
    let options = ["Use an existing scope", "Create a new scope"];
    let selection = Select::with_theme(&theme)
        .with_prompt("Secret scope")
        .items(&options)
        .default(if displayed.is_empty() { 1 } else { 0 })
        .interact()
        .context("Failed to read selection")?;

    if selection == 1 {
        let name: String = Input::with_theme(&theme)
            .with_prompt("New scope name")
            .interact_text()
            .context("Failed to read scope name")?;
        cli.create_scope(name.trim()).await?;
        ui.success(&format!("Created scope '{}'", name.trim()));
        return Ok(name.trim().to_string());
    }

    let choice: String = Input::with_theme(&theme)
        .with_prompt("Scope number or name")
        .interact_text()
        .context("Failed to read scope choice")?;
    match match_scope_choice(&choice, displayed, &scopes) {
        Some(scope) => Ok(scope.name.clone()),
        None => anyhow::bail!("No scope matches '{}'", choice.trim()),
    }
}

fn print_scopes(scopes: &[ScopeInfo]) {
    println!(
        "{:>3}  {:<30} {:<20} {:<12} {:>7}",
        "#",
        style("Scope").bold(),
        style("Owner").bold(),
        style("Created").bold(),
        style("Secrets").bold()
    );
    for (i, scope) in scopes.iter().enumerate() {
        println!(
            "{:>3}  {:<30} {:<20} {:<12} {:>7}",
            i + 1,
            scope.name,
            scope.owner,
            scope.created_at,
            scope.secret_count
        );
    }
}
