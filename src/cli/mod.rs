//! CLI command definitions and handlers

use clap::{Parser, Subcommand};
pub use clap_complete::Shell;

pub mod args;
pub mod auth;
pub mod context;
pub mod home;
pub mod status;
pub mod stock;
pub mod watch;
pub mod watchlist;

pub use args::OutputFormat;
pub use context::CommandContext;

/// OpenStock CLI - market dashboard in your terminal
#[derive(Parser, Debug)]
#[command(name = "openstock")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (pretty, table, json)
    #[arg(
        long,
        global = true,
        env = "OPENSTOCK_FORMAT",
        default_value = "pretty",
        hide_env = true,
        hide_possible_values = true
    )]
    pub format: OutputFormat,

    /// Override config file location
    #[arg(long, global = true, env = "OPENSTOCK_CONFIG", hide_env = true)]
    pub config: Option<String>,

    /// Backend base URL
    #[arg(long, global = true, env = "OPENSTOCK_API_URL", hide_env = true)]
    pub api_url: Option<String>,

    /// Enable debug logging
    #[arg(long, global = true, env = "OPENSTOCK_DEBUG", hide_env = true)]
    pub debug: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sign in with email and password
    #[command(after_help = "EXAMPLES:\n  \
            openstock signin                          # Prompt for credentials\n  \
            openstock signin --email a@b.com          # Prompt for password only")]
    Signin {
        /// Account email
        #[arg(long, short = 'e')]
        email: Option<String>,

        /// Account password (prompted when omitted)
        #[arg(long, env = "OPENSTOCK_PASSWORD", hide_env = true)]
        password: Option<String>,
    },

    /// Create an account and sign in
    Signup,

    /// Sign out and forget the stored session
    Signout,

    /// Show session and configuration status
    Status,

    /// Quotes for the configured dashboard symbols
    Home,

    /// Search stocks and fetch quotes
    #[command(subcommand)]
    Stock(StockCommands),

    /// Market news, optionally for specific symbols
    News {
        /// Restrict to these symbols, comma-separated or repeated
        #[arg(long, short = 's', value_delimiter = ',')]
        symbol: Vec<String>,
    },

    /// Manage your watchlist
    #[command(subcommand)]
    Watchlist(WatchlistCommands),

    /// Keep the session alive and warn before it expires
    Watch,

    /// Generate shell completions
    #[command(after_help = "\
  bash:   openstock completion bash > /etc/bash_completion.d/openstock
  zsh:    openstock completion zsh > \"${fpath[1]}/_openstock\"
  fish:   openstock completion fish > ~/.config/fish/completions/openstock.fish")]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Display version information
    Version,
}

/// Stock subcommands
#[derive(Subcommand, Debug)]
pub enum StockCommands {
    /// Search by symbol or company name
    #[command(visible_alias = "s")]
    Search {
        /// Search text; popular stocks are listed when omitted
        query: Option<String>,
    },

    /// Latest quote for a symbol
    #[command(visible_alias = "p")]
    Price {
        /// Ticker symbol, e.g. AAPL
        symbol: String,
    },
}

/// Watchlist subcommands
#[derive(Subcommand, Debug)]
pub enum WatchlistCommands {
    /// List watched symbols
    #[command(visible_alias = "ls")]
    List,

    /// Watch a symbol
    Add {
        /// Ticker symbol
        symbol: String,

        /// Company name (looked up when omitted)
        #[arg(long, short = 'c')]
        company: Option<String>,
    },

    /// Stop watching a symbol
    #[command(visible_alias = "rm")]
    Remove {
        /// Ticker symbol
        symbol: String,
    },

    /// Check whether a symbol is watched
    Check {
        /// Ticker symbol
        symbol: String,
    },
}
