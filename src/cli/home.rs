//! Home dashboard: quotes for the configured symbols

use colored::Colorize;
use futures::future::join_all;
use log::warn;

use crate::cli::args::GlobalOptions;
use crate::cli::{CommandContext, OutputFormat};
use crate::client::MarketApi;
use crate::error::Result;
use crate::guard::GuardKind;
use crate::models::QuoteDisplay;
use crate::output::{self, formatters::colorize_change};

/// Run the home command
pub async fn run(opts: &GlobalOptions) -> Result<()> {
    let ctx = CommandContext::new(opts).await?;
    if !ctx.guard(GuardKind::RequireAuth).await {
        return Ok(());
    }

    let client = ctx.client();
    let results = join_all(
        ctx.config
            .default_symbols
            .iter()
            .map(|symbol| client.stock_price(symbol)),
    )
    .await;

    let mut quotes = Vec::new();
    for (symbol, result) in ctx.config.default_symbols.iter().zip(results) {
        match result {
            Ok(quote) => quotes.push(QuoteDisplay::from(quote)),
            // A rejected token ends the session for every symbol alike
            Err(e) if e.is_unauthorized() => {
                ctx.authorized::<()>(Err(e)).await?;
                return Ok(());
            }
            Err(e) => warn!("Failed to fetch data for {}: {}", symbol, e),
        }
    }

    if quotes.is_empty() && !ctx.config.default_symbols.is_empty() {
        return Err(crate::error::Error::Other(
            "Failed to load market data".to_string(),
        ));
    }

    match ctx.format {
        OutputFormat::Pretty => print_pretty(&quotes),
        format => output::print(&quotes, format)?,
    }
    Ok(())
}

/// Print quote lines coloured by direction
pub fn print_pretty(quotes: &[QuoteDisplay]) {
    println!("{}\n", "Market Overview".bold());
    for quote in quotes {
        let change = format!("{} ({})", quote.change, quote.change_percent);
        println!(
            "  {:<6} {:>12}  {:<20}  {}",
            quote.symbol.bold(),
            quote.price,
            colorize_change(&change, quote.direction),
            format!("vol {}", quote.volume).dimmed(),
        );
    }
}
