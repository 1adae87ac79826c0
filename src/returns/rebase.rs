//! Rebase a windowed table slice to a 0% baseline for charting
//!
//! Each column's first non-absent value becomes 0% and every later value is
//! the percentage change from it. Instruments that start trading inside the
//! slice rebase from their own first valid observation, not from row zero.

use rust_decimal::Decimal;
use std::collections::BTreeMap;

use crate::series::TableSlice;

/// Rescale every column of `slice` so its first valid value maps to 0%.
///
/// Pure: the input is untouched. Columns that are entirely absent within the
/// slice, or whose first valid value is not a usable base price, stay
/// entirely absent.
pub fn rebase(slice: &TableSlice) -> TableSlice {
    let mut columns = BTreeMap::new();

    for (ticker, values) in &slice.columns {
        let base = values.iter().flatten().next().copied();
        let rebased = match base {
            Some(first) if first > Decimal::ZERO => values
                .iter()
                .map(|v| v.map(|p| (p / first - Decimal::ONE) * Decimal::from(100)))
                .collect(),
            // No usable baseline: the whole column is absent, not zero.
            _ => vec![None; values.len()],
        };
        columns.insert(ticker.clone(), rebased);
    }

    TableSlice {
        dates: slice.dates.clone(),
        columns,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn slice_of(columns: &[(&str, Vec<Option<Decimal>>)]) -> TableSlice {
        let len = columns.first().map(|(_, v)| v.len()).unwrap_or(0);
        TableSlice {
            dates: (1..=len as u32).map(date).collect(),
            columns: columns
                .iter()
                .map(|(t, v)| (t.to_string(), v.clone()))
                .collect(),
        }
    }

    #[test]
    fn test_first_valid_value_becomes_zero() {
        let slice = slice_of(&[(
            "1478.T",
            vec![Some(dec!(100)), Some(dec!(110)), Some(dec!(95))],
        )]);

        let out = rebase(&slice);
        assert_eq!(
            out.columns["1478.T"],
            vec![Some(dec!(0)), Some(dec!(10)), Some(dec!(-5))]
        );
    }

    #[test]
    fn test_late_start_rebases_from_first_valid_not_row_zero() {
        let slice = slice_of(&[(
            "273A.T",
            vec![None, None, Some(dec!(50)), Some(dec!(55))],
        )]);

        let out = rebase(&slice);
        assert_eq!(
            out.columns["273A.T"],
            vec![None, None, Some(dec!(0)), Some(dec!(10))]
        );
    }

    #[test]
    fn test_entirely_absent_column_stays_absent() {
        let slice = slice_of(&[("GONE.T", vec![None, None, None])]);

        let out = rebase(&slice);
        assert_eq!(out.columns["GONE.T"], vec![None, None, None]);
    }

    #[test]
    fn test_zero_base_column_goes_absent_not_infinite() {
        let slice = slice_of(&[("BAD.T", vec![Some(dec!(0)), Some(dec!(10))])]);

        let out = rebase(&slice);
        assert_eq!(out.columns["BAD.T"], vec![None, None]);
    }

    #[test]
    fn test_interior_gap_stays_a_gap() {
        let slice = slice_of(&[(
            "1550.T",
            vec![Some(dec!(200)), None, Some(dec!(220))],
        )]);

        let out = rebase(&slice);
        assert_eq!(
            out.columns["1550.T"],
            vec![Some(dec!(0)), None, Some(dec!(10))]
        );
    }

    #[test]
    fn test_input_slice_untouched() {
        let slice = slice_of(&[("1478.T", vec![Some(dec!(100)), Some(dec!(110))])]);
        let before = slice.clone();
        let _ = rebase(&slice);
        assert_eq!(slice, before);
    }

    #[test]
    fn test_mixed_columns_independent_baselines() {
        let slice = slice_of(&[
            ("AAAA.T", vec![Some(dec!(100)), Some(dec!(110))]),
            ("BBBB.T", vec![None, Some(dec!(50))]),
        ]);

        let out = rebase(&slice);
        assert_eq!(out.columns["AAAA.T"][1], Some(dec!(10)));
        assert_eq!(out.columns["BBBB.T"][1], Some(dec!(0)));
    }
}
