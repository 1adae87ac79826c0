use anyhow::Result;
use colored::Colorize;
use tracing::warn;

use crate::catalog::Category;
use crate::cli::formatters;
use crate::pricing::{self, snapshot};
use crate::reports::dashboard::{self as report, SortKey};
use crate::returns;

pub async fn dispatch_dashboard(
    category: Option<&str>,
    sort: &str,
    json_output: bool,
) -> Result<()> {
    let category = match category {
        Some(input) => Some(
            Category::parse(input)
                .ok_or_else(|| anyhow::anyhow!("unknown category '{}'. Use: japan, foreign, or enhanced", input))?,
        ),
        None => None,
    };
    let sort = SortKey::parse(sort)
        .ok_or_else(|| anyhow::anyhow!("unknown sort key '{}'. Use: category or ytd", sort))?;

    let spinner = super::fetch_spinner(json_output);
    let table = {
        let mut progress = super::spinner_progress(&spinner);
        pricing::load_price_table(&mut progress).await?
    };
    spinner.finish_and_clear();

    let rows = returns::compute(&table);

    // A missing snapshot is not an error: the dashboard degrades to
    // performance columns only.
    let fundamentals = match snapshot::load(None) {
        Ok(s) => s,
        Err(e) => {
            warn!("Failed to load fundamentals snapshot: {}", e);
            None
        }
    };

    let dashboard = report::build(&rows, fundamentals.as_ref(), category, sort);

    if json_output {
        println!("{}", formatters::format_dashboard_json(&dashboard));
    } else {
        println!("{}", formatters::format_dashboard_table(&dashboard));
        if let Some(s) = &fundamentals {
            if s.is_stale() {
                println!(
                    "{} Fundamentals snapshot is stale; run `etfdash snapshot refresh`",
                    "⚠".yellow()
                );
            }
        }
    }

    Ok(())
}
