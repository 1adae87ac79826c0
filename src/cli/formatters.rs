//! Output formatting module for CLI display
//!
//! This module handles all terminal output formatting, separating the
//! concerns of data calculation from presentation. Absent values render as
//! empty cells throughout; a blank is information here (no qualifying data),
//! so it must never be dressed up as a number.

use colored::Colorize;
use rust_decimal::Decimal;
use tabled::{
    settings::{object::Columns, Alignment, Style},
    Table, Tabled,
};
use unicode_width::UnicodeWidthStr;

use crate::catalog::EtfMeta;
use crate::reports::dashboard::Dashboard;
use crate::returns::Window;
use crate::series::TableSlice;
use crate::utils::{format_assets, format_pct, format_price_opt};

/// Truncate to a terminal display width, appending an ellipsis.
///
/// Fund names are Japanese; `char` counts would cut double-width strings at
/// twice the intended column width.
pub fn truncate_display(input: &str, max_width: usize) -> String {
    if input.width() <= max_width {
        return input.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in input.chars() {
        let w = c.to_string().width();
        if used + w > max_width.saturating_sub(1) {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}

fn colorize_pct(value: Option<Decimal>) -> String {
    let text = format_pct(value);
    match value {
        Some(v) if v >= Decimal::ZERO => text.green().to_string(),
        Some(_) => text.red().to_string(),
        None => text,
    }
}

/// Format the dashboard for terminal table output.
pub fn format_dashboard_table(dashboard: &Dashboard) -> String {
    let mut output = String::new();

    output.push_str(&format!("\n{} MSCI ETF Dashboard\n\n", "📊".cyan().bold()));

    #[derive(Tabled)]
    struct DashRow {
        #[tabled(rename = "Ticker")]
        ticker: String,
        #[tabled(rename = "Index")]
        index: String,
        #[tabled(rename = "Date")]
        date: String,
        #[tabled(rename = "Close")]
        close: String,
        #[tabled(rename = "1D")]
        one_day: String,
        #[tabled(rename = "1W")]
        one_week: String,
        #[tabled(rename = "1M")]
        one_month: String,
        #[tabled(rename = "3M")]
        three_months: String,
        #[tabled(rename = "MTD")]
        mtd: String,
        #[tabled(rename = "QTD")]
        qtd: String,
        #[tabled(rename = "YTD")]
        ytd: String,
        #[tabled(rename = "1Yr")]
        one_year: String,
        #[tabled(rename = "3Yr")]
        three_years: String,
        #[tabled(rename = "5Yr")]
        five_years: String,
    }

    let rows: Vec<DashRow> = dashboard
        .rows
        .iter()
        .map(|r| DashRow {
            ticker: r.ticker.to_string(),
            index: truncate_display(r.index_name, 28),
            date: r
                .last_date
                .map(|d| d.format("%m-%d").to_string())
                .unwrap_or_default(),
            close: format_price_opt(r.last_price),
            one_day: colorize_pct(r.window(Window::OneDay)),
            one_week: colorize_pct(r.window(Window::OneWeek)),
            one_month: colorize_pct(r.window(Window::OneMonth)),
            three_months: colorize_pct(r.window(Window::ThreeMonths)),
            mtd: colorize_pct(r.window(Window::Mtd)),
            qtd: colorize_pct(r.window(Window::Qtd)),
            ytd: colorize_pct(r.window(Window::Ytd)),
            one_year: colorize_pct(r.window(Window::OneYear)),
            three_years: colorize_pct(r.window(Window::ThreeYears)),
            five_years: colorize_pct(r.window(Window::FiveYears)),
        })
        .collect();

    let mut table = Table::new(&rows);
    table.with(Style::modern());
    table.modify(Columns::new(2..), Alignment::right());
    output.push_str(&table.to_string());

    if dashboard.has_fundamentals() {
        output.push('\n');
        output.push_str(&format_fundamentals_table(dashboard));
    } else {
        output.push_str(&format!(
            "\n\n{} No fundamentals snapshot; run `etfdash snapshot refresh` for NAV/AUM columns",
            "⚠".yellow()
        ));
    }

    output.push('\n');
    output
}

/// The fundamentals companion table, shown when a snapshot is attached.
fn format_fundamentals_table(dashboard: &Dashboard) -> String {
    #[derive(Tabled)]
    struct FundRow {
        #[tabled(rename = "Ticker")]
        ticker: String,
        #[tabled(rename = "Fund")]
        fund: String,
        #[tabled(rename = "NAV")]
        nav: String,
        #[tabled(rename = "Premium")]
        premium: String,
        #[tabled(rename = "AUM")]
        aum: String,
        #[tabled(rename = "P/E")]
        pe: String,
        #[tabled(rename = "P/B")]
        pb: String,
        #[tabled(rename = "Yield")]
        dividend_yield: String,
    }

    let rows: Vec<FundRow> = dashboard
        .rows
        .iter()
        .map(|r| {
            let f = r.fundamentals.as_ref();
            FundRow {
                ticker: r.ticker.to_string(),
                fund: truncate_display(r.fund_name, 32),
                nav: format_price_opt(f.and_then(|f| f.nav)),
                premium: format_pct(f.and_then(|f| f.premium_pct)),
                aum: format_assets(f.and_then(|f| f.total_assets)),
                pe: f
                    .and_then(|f| f.trailing_pe)
                    .map(|v| format!("{:.1}", v))
                    .unwrap_or_default(),
                pb: f
                    .and_then(|f| f.price_to_book)
                    .map(|v| format!("{:.2}", v))
                    .unwrap_or_default(),
                dividend_yield: format_pct(f.and_then(|f| f.dividend_yield_pct)),
            }
        })
        .collect();

    let mut table = Table::new(&rows);
    table.with(Style::modern());
    table.modify(Columns::new(2..), Alignment::right());

    let mut output = String::new();
    output.push_str(&format!("\n{} Fundamentals\n\n", "🏦".cyan().bold()));
    output.push_str(&table.to_string());
    if let Some(fetched_at) = dashboard.snapshot_fetched_at {
        output.push_str(&format!(
            "\n{}",
            format!("snapshot fetched {}", fetched_at.format("%Y-%m-%d %H:%M UTC"))
                .bright_black()
        ));
    }
    output
}

/// Format the dashboard for JSON output.
pub fn format_dashboard_json(dashboard: &Dashboard) -> String {
    serde_json::to_string_pretty(dashboard)
        .unwrap_or_else(|e| format!(r#"{{"error": "JSON serialization failed: {}"}}"#, e))
}

/// Format a rebased slice as a terminal table: last row first, one column
/// per instrument, values in percent relative to each instrument's first
/// visible observation.
pub fn format_rebased_table(slice: &TableSlice, timeframe_label: &str) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "\n{} Rebased performance ({})\n\n",
        "📈".cyan().bold(),
        timeframe_label
    ));

    if slice.dates.is_empty() {
        output.push_str("No data in this timeframe\n");
        return output;
    }

    let tickers: Vec<&String> = slice.columns.keys().collect();
    let mut builder = tabled::builder::Builder::default();

    let mut header = vec!["Date".to_string()];
    header.extend(tickers.iter().map(|t| t.to_string()));
    builder.push_record(header);

    // Newest first; terminals show the top of the output last in scrollback.
    for (i, date) in slice.dates.iter().enumerate().rev() {
        let mut record = vec![date.to_string()];
        for ticker in &tickers {
            record.push(format_pct(slice.columns[*ticker][i]));
        }
        builder.push_record(record);
    }

    let mut table = builder.build();
    table.with(Style::modern());
    table.modify(Columns::new(1..), Alignment::right());
    output.push_str(&table.to_string());
    output.push('\n');
    output
}

/// Format the rebased slice for JSON output.
pub fn format_rebased_json(slice: &TableSlice) -> String {
    serde_json::to_string_pretty(slice)
        .unwrap_or_else(|e| format!(r#"{{"error": "JSON serialization failed: {}"}}"#, e))
}

/// Format the catalog listing, grouped by category.
pub fn format_catalog_table(entries: &[&'static EtfMeta]) -> String {
    #[derive(Tabled)]
    struct CatalogRow {
        #[tabled(rename = "Ticker")]
        ticker: String,
        #[tabled(rename = "Category")]
        category: String,
        #[tabled(rename = "Index")]
        index: String,
        #[tabled(rename = "Fund")]
        fund: String,
    }

    let rows: Vec<CatalogRow> = entries
        .iter()
        .map(|m| CatalogRow {
            ticker: m.ticker.to_string(),
            category: m.category.as_str().to_string(),
            index: m.index_name.to_string(),
            fund: truncate_display(m.fund_name, 40),
        })
        .collect();

    let mut table = Table::new(&rows);
    table.with(Style::modern());
    format!(
        "\n{} Tracked universe ({} ETFs)\n\n{}\n",
        "🗂".cyan().bold(),
        entries.len(),
        table
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_display_ascii_untouched() {
        assert_eq!(truncate_display("MSCI Japan", 28), "MSCI Japan");
    }

    #[test]
    fn test_truncate_display_wide_chars() {
        // Each CJK char is display width 2; 12 chars = width 24.
        let name = "ＭＡＸＩＳカーボン・エフィシェント";
        let truncated = truncate_display(name, 10);
        assert!(truncated.ends_with('…'));
        assert!(truncated.width() <= 10);
    }

    #[test]
    fn test_truncate_display_exact_fit() {
        assert_eq!(truncate_display("日本株", 6), "日本株");
    }
}
