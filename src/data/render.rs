use std::collections::BTreeSet;

use serde::Serialize;

use super::error::PipelineError;
use super::model::{CellValue, Table};
use super::preview::Preview;

// ---------------------------------------------------------------------------
// Selection: what the user picked to plot
// ---------------------------------------------------------------------------

/// Category values and the metric chosen in the plot selector.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Selection {
    pub categories: BTreeSet<CellValue>,
    pub metric: Option<String>,
}

impl Selection {
    /// Both a category and a metric have been chosen.
    pub fn is_ready(&self) -> bool {
        !self.categories.is_empty() && self.metric.is_some()
    }
}

// ---------------------------------------------------------------------------
// ChartSpec: what the charting widget draws
// ---------------------------------------------------------------------------

/// One line of the chart: the points of a single category value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub name: CellValue,
    /// `(x, y)` pairs in row order; `y` is `None` where the metric cell is
    /// not a number.
    pub points: Vec<(CellValue, Option<f64>)>,
}

/// A line chart plus the rows it was drawn from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub x_label: String,
    pub y_label: String,
    /// The x value of every retained row, in row order.
    pub x: Vec<CellValue>,
    /// One series per selected category, ordered by first appearance.
    pub series: Vec<Series>,
    #[serde(skip)]
    pub table: Table,
}

impl ChartSpec {
    /// Chart title shown above the plot.
    pub fn title(&self) -> String {
        format!("Graph of {} vs. {}", self.x_label, self.y_label)
    }

    /// The chart as JSON for an external charting collaborator.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

// ---------------------------------------------------------------------------
// Row filter
// ---------------------------------------------------------------------------

/// Return indices of rows whose `category_column` value is in `categories`.
pub fn filtered_indices(
    table: &Table,
    category_column: &str,
    categories: &BTreeSet<CellValue>,
) -> Vec<usize> {
    let Some(column) = table.column(category_column) else {
        return Vec::new();
    };
    column
        .values
        .iter()
        .enumerate()
        .filter(|(_, v)| categories.contains(*v))
        .map(|(i, _)| i)
        .collect()
}

/// Filter `table` to the selected categories and build one series per
/// category: x from `x_column`, y from the selected metric.
///
/// The selection must name at least one category and a metric that the
/// preview lists as numerical.
pub fn render(
    table: &Table,
    preview: &Preview,
    selection: &Selection,
    x_column: &str,
) -> Result<ChartSpec, PipelineError> {
    let metric = match &selection.metric {
        Some(m) if !selection.categories.is_empty() && preview.numerical_columns.contains(m) => m,
        _ => return Err(PipelineError::EmptySelection),
    };

    let category = table
        .column(&preview.category_column)
        .ok_or_else(|| PipelineError::MissingCategoryColumn(preview.category_column.clone()))?;
    let x_values = &table
        .column(x_column)
        .ok_or_else(|| PipelineError::MissingColumn(x_column.to_string()))?
        .values;
    let y_values = &table
        .column(metric)
        .ok_or_else(|| PipelineError::MissingColumn(metric.clone()))?
        .values;

    let rows = filtered_indices(table, &preview.category_column, &selection.categories);

    let mut series: Vec<Series> = Vec::new();
    for &row in &rows {
        let key = &category.values[row];
        let point = (x_values[row].clone(), y_values[row].as_f64());
        match series.iter_mut().find(|s| &s.name == key) {
            Some(s) => s.points.push(point),
            None => series.push(Series {
                name: key.clone(),
                points: vec![point],
            }),
        }
    }

    log::info!(
        "Rendered {} rows into {} series of {metric}",
        rows.len(),
        series.len()
    );

    Ok(ChartSpec {
        x_label: x_column.to_string(),
        y_label: metric.clone(),
        x: rows.iter().map(|&r| x_values[r].clone()).collect(),
        series,
        table: preview.table.take_rows(&rows),
    })
}
