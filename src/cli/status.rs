//! Status command implementation

use chrono::Utc;
use colored::Colorize;
use serde::Serialize;

use crate::cli::args::GlobalOptions;
use crate::cli::{CommandContext, OutputFormat};
use crate::client::jwt::token_expiry;
use crate::config::Config;
use crate::error::Result;
use crate::output::formatters::format_remaining;
use crate::output::json;
use crate::session::{ClearReason, SessionPhase};

/// Machine-readable status for `--format json`
#[derive(Debug, Serialize)]
struct StatusReport {
    config_file: String,
    api_url: String,
    phase: SessionPhase,
    #[serde(skip_serializing_if = "Option::is_none")]
    user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    token_expires_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cleared_by: Option<ClearReason>,
}

/// Run the status command to display session and configuration status
pub async fn run(opts: &GlobalOptions) -> Result<()> {
    let config_path = Config::resolve_path(opts.config_ref())?;
    let ctx = CommandContext::new(opts).await?;
    let snapshot = ctx.session.snapshot();

    let expires_at = snapshot
        .token
        .as_deref()
        .and_then(|token| token_expiry(token).ok());

    if ctx.format == OutputFormat::Json {
        let report = StatusReport {
            config_file: config_path.display().to_string(),
            api_url: ctx.config.api_base_url.clone(),
            phase: snapshot.phase,
            user: snapshot.user.as_ref().map(|u| u.display_name().to_string()),
            token_expires_at: expires_at.map(|t| t.to_rfc3339()),
            cleared_by: snapshot.cleared_by,
        };
        println!("{}", json::format_json(&report)?);
        return Ok(());
    }

    println!("{}\n", "OpenStock Status".bold());

    if config_path.exists() {
        println!("Config file: {}", config_path.display().to_string().cyan());
    } else {
        println!("Config file: {} {}", config_path.display(), "(defaults)".dimmed());
    }
    println!("API: {}", ctx.config.api_base_url.cyan());
    println!();

    match snapshot.user.as_ref() {
        Some(user) if snapshot.is_authenticated() => {
            println!("{} Signed in as {}", "✓".green(), user.display_name().bold());
            if let Some(email) = user.email.as_deref() {
                println!("  Email: {}", email);
            }
            match expires_at {
                Some(at) => println!(
                    "{} Token valid (expires in {})",
                    "✓".green(),
                    format_remaining(at, Utc::now())
                ),
                None => println!("{} Token expiry unknown", "○".dimmed()),
            }
        }
        _ => {
            match snapshot.cleared_by {
                Some(ClearReason::Unauthorized) => {
                    println!("{} Stored session was rejected by the server", "⚠".yellow())
                }
                Some(ClearReason::RestoreFailed) => {
                    println!("{} Stored session could not be verified", "⚠".yellow())
                }
                _ => {}
            }
            println!("{} Not signed in", "✗".red());
            println!("  → Run 'openstock signin' to sign in");
        }
    }

    println!();
    Ok(())
}
