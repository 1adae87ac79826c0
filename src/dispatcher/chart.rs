use anyhow::{Context, Result};
use colored::Colorize;
use itertools::Itertools;

use crate::catalog;
use crate::cli::formatters;
use crate::pricing;
use crate::returns::rebase;
use crate::series::{TableSlice, Timeframe};

pub async fn dispatch_chart(
    timeframe: &str,
    tickers: &[String],
    csv_path: Option<&str>,
    json_output: bool,
) -> Result<()> {
    let timeframe = Timeframe::parse(timeframe)?;

    for ticker in tickers {
        if catalog::lookup(ticker).is_none() {
            return Err(crate::error::DashError::UnknownTicker(ticker.clone()).into());
        }
    }

    let spinner = super::fetch_spinner(json_output);
    let mut table = {
        let mut progress = super::spinner_progress(&spinner);
        pricing::load_price_table(&mut progress).await?
    };
    spinner.finish_and_clear();

    if !tickers.is_empty() {
        table.retain_tickers(|t| tickers.iter().any(|wanted| wanted == t));
    }

    let slice = table.slice_timeframe(timeframe);
    let rebased = rebase::rebase(&slice);

    if let Some(path) = csv_path {
        write_rebased_csv(&rebased, path)?;
        if !json_output {
            println!(
                "{} Wrote {} rows × {} instruments to {}",
                "✓".green(),
                rebased.dates.len(),
                rebased.columns.len(),
                path
            );
        }
        return Ok(());
    }

    if json_output {
        println!("{}", formatters::format_rebased_json(&rebased));
    } else {
        tracing::debug!(
            "chart {} over {}",
            timeframe.label(),
            rebased.columns.keys().join(", ")
        );
        println!(
            "{}",
            formatters::format_rebased_table(&rebased, timeframe.label())
        );
    }

    Ok(())
}

/// Write the rebased slice as CSV: a Date column plus one column per
/// instrument. Absent cells stay empty.
fn write_rebased_csv(slice: &TableSlice, path: &str) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create CSV file {}", path))?;

    let tickers: Vec<&String> = slice.columns.keys().collect();
    let mut header = vec!["Date".to_string()];
    header.extend(tickers.iter().map(|t| t.to_string()));
    writer.write_record(&header)?;

    for (i, date) in slice.dates.iter().enumerate() {
        let mut record = vec![date.to_string()];
        for ticker in &tickers {
            record.push(
                slice.columns[*ticker][i]
                    .map(|v| v.to_string())
                    .unwrap_or_default(),
            );
        }
        writer.write_record(&record)?;
    }

    writer.flush().context("Failed to flush CSV file")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    #[test]
    fn test_write_rebased_csv() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("chart.csv");

        let mut columns = BTreeMap::new();
        columns.insert(
            "2559.T".to_string(),
            vec![Some(dec!(0)), None, Some(dec!(5))],
        );
        let slice = TableSlice {
            dates: vec![
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
                NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
            ],
            columns,
        };

        write_rebased_csv(&slice, path.to_str().unwrap()).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines[0], "Date,2559.T");
        assert_eq!(lines[1], "2024-01-01,0");
        assert_eq!(lines[2], "2024-01-02,");
        assert_eq!(lines[3], "2024-01-03,5");
    }
}
