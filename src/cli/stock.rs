//! Stock search, quote and news commands

use colored::Colorize;

use crate::cli::args::GlobalOptions;
use crate::cli::{CommandContext, OutputFormat};
use crate::client::MarketApi;
use crate::error::Result;
use crate::guard::GuardKind;
use crate::models::{NewsDisplay, QuoteDisplay, StockDisplay};
use crate::output::{self, formatters::colorize_change, json};

/// Run the stock search command
pub async fn search(opts: &GlobalOptions, query: Option<&str>) -> Result<()> {
    let ctx = CommandContext::new(opts).await?;
    if !ctx.guard(GuardKind::RequireAuth).await {
        return Ok(());
    }

    let query = query.map(str::trim).filter(|q| !q.is_empty());
    let Some(stocks) = ctx.authorized(ctx.client().search_stocks(query).await).await? else {
        return Ok(());
    };
    log::debug!("Search returned {} stocks", stocks.len());

    let rows: Vec<StockDisplay> = stocks.into_iter().map(StockDisplay::from).collect();
    output::print(&rows, ctx.format)
}

/// Run the stock price command
pub async fn price(opts: &GlobalOptions, symbol: &str) -> Result<()> {
    let ctx = CommandContext::new(opts).await?;
    if !ctx.guard(GuardKind::RequireAuth).await {
        return Ok(());
    }

    let symbol = symbol.to_uppercase();
    let Some(quote) = ctx.authorized(ctx.client().stock_price(&symbol).await).await? else {
        return Ok(());
    };

    match ctx.format {
        OutputFormat::Json => println!("{}", json::format_json(&quote)?),
        OutputFormat::Table => output::print(&vec![QuoteDisplay::from(&quote)], ctx.format)?,
        OutputFormat::Pretty => {
            let display = QuoteDisplay::from(&quote);
            let change = format!("{} ({})", display.change, display.change_percent);
            println!("{}  {}", display.symbol.bold(), display.name.dimmed());
            println!(
                "{}  {}",
                display.price.bold(),
                colorize_change(&change, display.direction)
            );
            println!(
                "Open {:.2}  High {:.2}  Low {:.2}  Prev close {:.2}",
                quote.open_price, quote.high_price, quote.low_price, quote.previous_close
            );
            println!("Volume {}", display.volume);
        }
    }
    Ok(())
}

/// Run the news command
pub async fn news(opts: &GlobalOptions, symbols: &[String]) -> Result<()> {
    let ctx = CommandContext::new(opts).await?;
    if !ctx.guard(GuardKind::RequireAuth).await {
        return Ok(());
    }

    let symbols: Vec<String> = symbols.iter().map(|s| s.to_uppercase()).collect();
    let Some(articles) = ctx.authorized(ctx.client().news(&symbols).await).await? else {
        return Ok(());
    };

    let rows: Vec<NewsDisplay> = articles.into_iter().map(NewsDisplay::from).collect();
    match ctx.format {
        OutputFormat::Pretty if !rows.is_empty() => {
            for article in &rows {
                println!("{}", article.headline.bold());
                println!(
                    "  {} · {}  {}",
                    article.source,
                    article.published,
                    article.url.dimmed()
                );
            }
            Ok(())
        }
        format => output::print(&rows, format),
    }
}
