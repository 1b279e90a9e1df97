use std::collections::HashSet;

use super::model::{CellValue, Table};

/// Distinct values of `category_column`, in first-seen order.
///
/// A missing column or an empty table yields no options.
pub fn category_options(table: &Table, category_column: &str) -> Vec<CellValue> {
    let Some(column) = table.column(category_column) else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    column
        .values
        .iter()
        .filter(|v| seen.insert(*v))
        .cloned()
        .collect()
}

/// Metric choices for the y axis: the Numerical columns, order preserved.
pub fn metric_options(numerical_columns: &[String]) -> Vec<String> {
    numerical_columns.to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::decoder::decode;

    #[test]
    fn collapses_duplicates_in_first_seen_order() {
        let table = decode(b"Stock\nA\nB\nA\nC\n", "s.csv").unwrap();
        let options = category_options(&table, "Stock");
        let expected: Vec<CellValue> = vec!["A".into(), "B".into(), "C".into()];
        assert_eq!(options, expected);
    }

    #[test]
    fn nan_cells_collapse_to_one_option() {
        let table = decode(b"Stock\nNaN\nNaN\nA\nnan\n", "s.csv").unwrap();
        let options = category_options(&table, "Stock");
        assert_eq!(options.len(), 2);
        assert!(matches!(options[0], CellValue::Float(f) if f.is_nan()));
        assert_eq!(options[1], CellValue::from("A"));
    }

    #[test]
    fn signed_zeros_stay_distinct() {
        let table = decode(b"Stock\n0.0\n-0.0\n0.0\n", "s.csv").unwrap();
        assert_eq!(category_options(&table, "Stock").len(), 2);
    }

    #[test]
    fn missing_or_empty_column_offers_nothing() {
        let table = decode(b"Stock\n", "s.csv").unwrap();
        assert!(category_options(&table, "Stock").is_empty());
        assert!(category_options(&table, "Ticker").is_empty());
        assert!(metric_options(&[]).is_empty());
    }

    #[test]
    fn metrics_pass_through() {
        let cols = vec!["Close".to_string(), "Open".to_string()];
        assert_eq!(metric_options(&cols), cols);
    }
}
