//! OpenStock CLI - market dashboard in your terminal

use clap::{CommandFactory, Parser};

mod cli;
mod client;
mod config;
mod error;
mod guard;
mod models;
mod notify;
mod output;
mod session;
mod storage;

use cli::args::GlobalOptions;
use cli::{Cli, Commands, StockCommands, WatchlistCommands};
use error::Result;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

fn init_logging(debug: bool) {
    let env = env_logger::Env::default().default_filter_or("warn");
    let mut builder = env_logger::Builder::from_env(env);
    if debug {
        builder.filter_module("openstock", log::LevelFilter::Debug);
    }
    builder.format_timestamp(None).init();
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug);

    let opts = GlobalOptions::from_cli(&cli);

    match cli.command {
        Commands::Signin { email, password } => cli::auth::signin(&opts, email, password).await,
        Commands::Signup => cli::auth::signup(&opts).await,
        Commands::Signout => cli::auth::signout(&opts).await,
        Commands::Status => cli::status::run(&opts).await,
        Commands::Home => cli::home::run(&opts).await,
        Commands::Stock(stock_cmd) => match stock_cmd {
            StockCommands::Search { query } => cli::stock::search(&opts, query.as_deref()).await,
            StockCommands::Price { symbol } => cli::stock::price(&opts, &symbol).await,
        },
        Commands::News { symbol } => cli::stock::news(&opts, &symbol).await,
        Commands::Watchlist(watchlist_cmd) => match watchlist_cmd {
            WatchlistCommands::List => cli::watchlist::list(&opts).await,
            WatchlistCommands::Add { symbol, company } => {
                cli::watchlist::add(&opts, &symbol, company.as_deref()).await
            }
            WatchlistCommands::Remove { symbol } => cli::watchlist::remove(&opts, &symbol).await,
            WatchlistCommands::Check { symbol } => cli::watchlist::check(&opts, &symbol).await,
        },
        Commands::Watch => cli::watch::run(&opts).await,
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "openstock", &mut std::io::stdout());
            Ok(())
        }
        Commands::Version => {
            println!("openstock version {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
