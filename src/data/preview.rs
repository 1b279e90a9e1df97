use super::classify::{ColumnClassification, ColumnType};
use super::error::PipelineError;
use super::model::Table;

/// The table restricted to the retained columns, plus the lists the plot
/// selector needs.
#[derive(Debug, Clone, PartialEq)]
pub struct Preview {
    pub table: Table,
    /// Retained column names, in source table order.
    pub columns: Vec<String>,
    /// Retained columns tagged Numerical, in source table order.
    pub numerical_columns: Vec<String>,
    /// The grouping column for chart series.
    pub category_column: String,
}

/// Restrict `table` to the columns kept in `classification`.
///
/// Column order follows `table`, not the classification. The classification
/// must be complete and must retain `category_column`.
pub fn build_preview(
    table: &Table,
    classification: &ColumnClassification,
    category_column: &str,
) -> Result<Preview, PipelineError> {
    if !classification.is_complete() {
        return Err(PipelineError::InvalidSelection);
    }

    let filtered = table.select_columns(|name| classification.contains(name));
    let columns = filtered.column_names();

    if !columns.iter().any(|c| c == category_column) {
        return Err(PipelineError::MissingCategoryColumn(category_column.to_string()));
    }

    let numerical_columns = columns
        .iter()
        .filter(|c| classification.get(c) == Some(Some(ColumnType::Numerical)))
        .cloned()
        .collect();

    log::debug!("Preview retains columns {columns:?}");
    Ok(Preview {
        table: filtered,
        columns,
        numerical_columns,
        category_column: category_column.to_string(),
    })
}
