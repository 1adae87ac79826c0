use clap::{Parser, Subcommand};

pub mod formatters;

#[derive(Parser)]
#[command(name = "etfdash")]
#[command(
    version,
    about = "JPX-listed MSCI ETF performance dashboard"
)]
#[command(
    long_about = "Track JPX-listed MSCI index ETFs with multi-window return analytics (1D to 5Yr plus MTD/QTD/YTD), rebased comparison charts, and fund fundamentals (NAV premium, AUM, P/E, P/B, yield)."
)]
pub struct Cli {
    /// Disable colorized/ANSI output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Output results in JSON format
    #[arg(long = "json", global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the returns dashboard for the tracked universe
    Dashboard {
        /// Filter by category (japan | foreign | enhanced)
        #[arg(short, long)]
        category: Option<String>,

        /// Row order (category | ytd)
        #[arg(short, long, default_value = "category")]
        sort: String,
    },

    /// Show a rebased comparison of instruments over a timeframe
    Chart {
        /// Timeframe (1D | 1W | 1M | 3M | 1Y | 3Y | MTD | QTD | YTD | MAX)
        #[arg(short, long, default_value = "1Y")]
        timeframe: String,

        /// Tickers to compare (defaults to the whole universe)
        tickers: Vec<String>,

        /// Write the rebased series to a CSV file instead of the terminal
        #[arg(long)]
        csv: Option<String>,
    },

    /// Price history management
    Prices {
        #[command(subcommand)]
        action: PricesCommands,
    },

    /// Fundamentals snapshot management
    Snapshot {
        #[command(subcommand)]
        action: SnapshotCommands,
    },

    /// List the tracked ETF universe
    Catalog {
        /// Filter by category (japan | foreign | enhanced)
        #[arg(short, long)]
        category: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum PricesCommands {
    /// Fetch price history for the universe (respects the cache TTL)
    Update {
        /// Refetch even when the cached snapshot is fresh
        #[arg(short, long)]
        force: bool,
    },

    /// Show the cached price series for one ticker
    Show {
        /// Ticker, e.g. 2559.T
        ticker: String,
    },
}

#[derive(Subcommand)]
pub enum SnapshotCommands {
    /// Fetch fundamentals (NAV, AUM, P/E, P/B, yield) for the universe
    Refresh {
        /// Refetch even when the snapshot is fresh
        #[arg(short, long)]
        force: bool,
    },

    /// Show snapshot age and coverage
    Status,
}
