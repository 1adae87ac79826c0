//! Formatting utilities for dashboard output
//!
//! Centralized formatting so table cells, CSV and log lines agree on how a
//! price, a percentage or an absent value looks. Absent values always render
//! as an empty cell, never as "NaN" or a placeholder number.

use rust_decimal::Decimal;

/// Format a JPY price: no decimal places, comma thousands separators.
///
/// # Examples
/// ```
/// use etfdash::utils::format_price;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(format_price(dec!(21500)), "21,500");
/// assert_eq!(format_price(dec!(987.4)), "987");
/// assert_eq!(format_price(dec!(1234567)), "1,234,567");
/// ```
pub fn format_price(value: Decimal) -> String {
    let is_negative = value < Decimal::ZERO;
    let formatted = format!("{:.0}", value.abs());

    let with_separators: String = formatted
        .chars()
        .rev()
        .enumerate()
        .flat_map(|(i, c)| {
            if i > 0 && i % 3 == 0 {
                vec![',', c]
            } else {
                vec![c]
            }
        })
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();

    let sign = if is_negative { "-" } else { "" };
    format!("{}{}", sign, with_separators)
}

/// Format an optional price, blank when absent.
pub fn format_price_opt(value: Option<Decimal>) -> String {
    value.map(format_price).unwrap_or_default()
}

/// Format a percentage with explicit sign and one decimal place.
///
/// # Examples
/// ```
/// use etfdash::utils::format_signed_pct;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(format_signed_pct(dec!(1.26)), "+1.3%");
/// assert_eq!(format_signed_pct(dec!(-0.5)), "-0.5%");
/// assert_eq!(format_signed_pct(dec!(0)), "+0.0%");
/// ```
pub fn format_signed_pct(value: Decimal) -> String {
    let sign = if value < Decimal::ZERO { "-" } else { "+" };
    format!("{}{:.1}%", sign, value.abs())
}

/// Format an optional percentage, blank when the value is absent.
///
/// # Examples
/// ```
/// use etfdash::utils::format_pct;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(format_pct(Some(dec!(10))), "+10.0%");
/// assert_eq!(format_pct(None), "");
/// ```
pub fn format_pct(value: Option<Decimal>) -> String {
    value.map(format_signed_pct).unwrap_or_default()
}

/// Format fund assets in 億円 (hundreds of millions of yen), one decimal
/// place, blank when absent.
///
/// # Examples
/// ```
/// use etfdash::utils::format_assets;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(format_assets(Some(dec!(250000000000))), "2,500.0億円");
/// assert_eq!(format_assets(None), "");
/// ```
pub fn format_assets(value: Option<Decimal>) -> String {
    let Some(value) = value else {
        return String::new();
    };
    let oku = value / Decimal::from(100_000_000);
    let is_negative = oku < Decimal::ZERO;
    let formatted = format!("{:.1}", oku.abs());
    let (integer_part, decimal_part) = formatted.split_once('.').unwrap_or((&formatted, "0"));

    let with_separators: String = integer_part
        .chars()
        .rev()
        .enumerate()
        .flat_map(|(i, c)| {
            if i > 0 && i % 3 == 0 {
                vec![',', c]
            } else {
                vec![c]
            }
        })
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();

    let sign = if is_negative { "-" } else { "" };
    format!("{}{}.{}億円", sign, with_separators, decimal_part)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_format_price_separators() {
        assert_eq!(format_price(dec!(0)), "0");
        assert_eq!(format_price(dec!(999)), "999");
        assert_eq!(format_price(dec!(1000)), "1,000");
        assert_eq!(format_price(dec!(21500)), "21,500");
        assert_eq!(format_price(dec!(1234567)), "1,234,567");
    }

    #[test]
    fn test_format_price_negative() {
        assert_eq!(format_price(dec!(-1500)), "-1,500");
    }

    #[test]
    fn test_format_price_opt_blank_when_absent() {
        assert_eq!(format_price_opt(None), "");
        assert_eq!(format_price_opt(Some(dec!(100))), "100");
    }

    #[test]
    fn test_format_signed_pct() {
        assert_eq!(format_signed_pct(dec!(2.5)), "+2.5%");
        assert_eq!(format_signed_pct(dec!(-12.34)), "-12.3%");
        assert_eq!(format_signed_pct(dec!(0)), "+0.0%");
    }

    #[test]
    fn test_format_pct_blank_when_absent() {
        assert_eq!(format_pct(None), "");
        assert_eq!(format_pct(Some(dec!(-3))), "-3.0%");
    }

    #[test]
    fn test_format_assets() {
        assert_eq!(format_assets(Some(dec!(100000000))), "1.0億円");
        assert_eq!(format_assets(Some(dec!(250000000000))), "2,500.0億円");
        assert_eq!(format_assets(None), "");
    }
}
