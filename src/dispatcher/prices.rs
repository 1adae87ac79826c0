use anyhow::Result;
use colored::Colorize;
use serde::Serialize;

use crate::catalog;
use crate::cli::PricesCommands;
use crate::error::DashError;
use crate::pricing;
use crate::utils::format_price;

pub async fn dispatch_prices(action: PricesCommands, json_output: bool) -> Result<()> {
    match action {
        PricesCommands::Update { force } => {
            let spinner = super::fetch_spinner(json_output);
            let table = {
                let mut progress = super::spinner_progress(&spinner);
                pricing::refresh_price_table(force, &mut progress).await?
            };
            spinner.finish_and_clear();

            if json_output {
                #[derive(Serialize)]
                struct UpdateSummary {
                    instruments: usize,
                    last_date: Option<chrono::NaiveDate>,
                }
                let summary = UpdateSummary {
                    instruments: table.len(),
                    last_date: table.last_date(),
                };
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!(
                    "{} Updated {} of {} instruments (latest close {})",
                    "✓".green(),
                    table.len(),
                    catalog::UNIVERSE.len(),
                    table
                        .last_date()
                        .map(|d| d.to_string())
                        .unwrap_or_else(|| "-".to_string())
                );
            }
            Ok(())
        }

        PricesCommands::Show { ticker } => {
            catalog::lookup(&ticker).ok_or_else(|| DashError::UnknownTicker(ticker.clone()))?;

            let table = pricing::load_cached_table(None)?
                .ok_or_else(|| anyhow::anyhow!("no cached prices; run `etfdash prices update` first"))?;
            let series = table
                .get(&ticker)
                .ok_or_else(|| anyhow::anyhow!("no cached series for {}", ticker))?;

            if json_output {
                println!("{}", serde_json::to_string_pretty(series)?);
                return Ok(());
            }

            println!("\n{} {} close history\n", "📜".cyan().bold(), ticker);
            for point in series.points() {
                println!("{}  {:>10}", point.date, format_price(point.close));
            }
            println!("\n{} observations", series.len());
            Ok(())
        }
    }
}
