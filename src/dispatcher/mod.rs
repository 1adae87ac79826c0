//! Command dispatcher that routes parsed CLI commands to their handlers.
//!
//! Handlers own terminal side effects (tables, progress bars, CSV files);
//! everything below this layer returns data and stays silent apart from
//! tracing.

mod catalog;
mod chart;
mod dashboard;
mod prices;
mod snapshot;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use crate::cli::Commands;
use crate::pricing::ProgressEvent;

/// Route a parsed command to its handler.
pub async fn dispatch_command(command: Commands, json_output: bool) -> Result<()> {
    match command {
        Commands::Dashboard { category, sort } => {
            dashboard::dispatch_dashboard(category.as_deref(), &sort, json_output).await
        }
        Commands::Chart {
            timeframe,
            tickers,
            csv,
        } => chart::dispatch_chart(&timeframe, &tickers, csv.as_deref(), json_output).await,
        Commands::Prices { action } => prices::dispatch_prices(action, json_output).await,
        Commands::Snapshot { action } => snapshot::dispatch_snapshot(action, json_output).await,
        Commands::Catalog { category } => {
            catalog::dispatch_catalog(category.as_deref(), json_output)
        }
    }
}

/// Spinner that mirrors fetch progress events onto the terminal.
///
/// Suppressed for JSON output so stdout stays machine-readable.
pub(crate) fn fetch_spinner(json_output: bool) -> ProgressBar {
    if json_output {
        return ProgressBar::hidden();
    }
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

pub(crate) fn spinner_progress(spinner: &ProgressBar) -> impl FnMut(&ProgressEvent) + '_ {
    move |event: &ProgressEvent| {
        spinner.set_message(event.message.clone());
    }
}
