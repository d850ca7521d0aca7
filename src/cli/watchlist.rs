//! Watchlist commands

use colored::Colorize;
use log::debug;

use crate::cli::args::GlobalOptions;
use crate::cli::{CommandContext, OutputFormat};
use crate::client::{MarketApi, WatchlistApi};
use crate::error::Result;
use crate::guard::GuardKind;
use crate::models::WatchlistDisplay;
use crate::output::{self, json};

async fn context(opts: &GlobalOptions) -> Result<Option<CommandContext>> {
    let ctx = CommandContext::new(opts).await?;
    if ctx.guard(GuardKind::RequireAuth).await {
        Ok(Some(ctx))
    } else {
        Ok(None)
    }
}

/// Run the watchlist list command
pub async fn list(opts: &GlobalOptions) -> Result<()> {
    let Some(ctx) = context(opts).await? else {
        return Ok(());
    };
    let Some(items) = ctx.authorized(ctx.client().watchlist().await).await? else {
        return Ok(());
    };

    let rows: Vec<WatchlistDisplay> = items.into_iter().map(WatchlistDisplay::from).collect();
    if ctx.format == OutputFormat::Pretty && rows.is_empty() {
        println!("Your watchlist is empty. Add one with 'openstock watchlist add <SYMBOL>'");
        return Ok(());
    }
    output::print(&rows, ctx.format)
}

/// Run the watchlist add command
pub async fn add(opts: &GlobalOptions, symbol: &str, company: Option<&str>) -> Result<()> {
    let Some(ctx) = context(opts).await? else {
        return Ok(());
    };
    let symbol = symbol.to_uppercase();

    let company = match company {
        Some(company) => company.to_string(),
        None => {
            let Some(quote) = ctx.authorized(ctx.client().stock_price(&symbol).await).await? else {
                return Ok(());
            };
            debug!("Resolved {} to {:?}", symbol, quote.name);
            if quote.name.is_empty() { symbol.clone() } else { quote.name }
        }
    };

    let added = ctx
        .authorized(ctx.client().add_to_watchlist(&symbol, &company).await)
        .await?;
    if added.is_some() {
        println!("{} Added {} ({}) to watchlist", "✓".green(), symbol.bold(), company);
    }
    Ok(())
}

/// Run the watchlist remove command
pub async fn remove(opts: &GlobalOptions, symbol: &str) -> Result<()> {
    let Some(ctx) = context(opts).await? else {
        return Ok(());
    };
    let symbol = symbol.to_uppercase();

    let removed = ctx
        .authorized(ctx.client().remove_from_watchlist(&symbol).await)
        .await?;
    if removed.is_some() {
        println!("{} Removed {} from watchlist", "✓".green(), symbol.bold());
    }
    Ok(())
}

/// Run the watchlist check command
pub async fn check(opts: &GlobalOptions, symbol: &str) -> Result<()> {
    let Some(ctx) = context(opts).await? else {
        return Ok(());
    };
    let symbol = symbol.to_uppercase();

    let Some(watched) = ctx
        .authorized(ctx.client().is_in_watchlist(&symbol).await)
        .await?
    else {
        return Ok(());
    };

    match ctx.format {
        OutputFormat::Json => {
            let body = serde_json::json!({ "symbol": symbol, "inWatchlist": watched });
            println!("{}", json::format_json(&body)?);
        }
        _ if watched => println!("{} {} is on your watchlist", "✓".green(), symbol.bold()),
        _ => println!("{} {} is not on your watchlist", "○".dimmed(), symbol.bold()),
    }
    Ok(())
}
