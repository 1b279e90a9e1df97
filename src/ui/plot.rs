use std::collections::BTreeSet;
use std::ops::RangeInclusive;
use std::path::Path;

use anyhow::{Context, Result};
use eframe::egui::{Color32, RichText, Ui};
use egui_plot::{GridMark, Legend, Line, Plot, PlotPoints};

use stock_grapher::data::model::{CellValue, Table};
use stock_grapher::data::render::ChartSpec;
use stock_grapher::state::Session;

use crate::color::ColorMap;
use crate::ui::panels::step_frame;
use crate::ui::table::data_table;

// ---------------------------------------------------------------------------
// Step 4: filtered table and line chart
// ---------------------------------------------------------------------------

pub fn graph_step(ui: &mut Ui, session: &Session, colors: &ColorMap, status: &mut Option<String>) {
    if let Some(err) = session.chart_error() {
        step_frame(ui, |ui| {
            ui.label(RichText::new(err.to_string()).color(Color32::RED));
        });
        return;
    }
    let Some(chart) = session.chart() else {
        return;
    };

    step_frame(ui, |ui| {
        ui.heading("Filtered Data & Graph Plot:");
        data_table(ui, "filtered_table", &chart.table);

        ui.horizontal(|ui: &mut Ui| {
            if ui.button("Save table as CSV…").clicked() {
                if let Err(e) = save_table_dialog(&chart.table) {
                    log::error!("Failed to save table: {e:#}");
                    *status = Some(format!("Error: {e:#}"));
                }
            }
            if ui.button("Copy chart as JSON").clicked() {
                match chart.to_json() {
                    Ok(json) => ui.ctx().copy_text(json),
                    Err(e) => *status = Some(format!("Error: {e}")),
                }
            }
        });

        ui.add_space(8.0);
        ui.heading(chart.title());
        chart_plot(ui, chart, colors);
    });
}

/// Draw one line per series. X values are placed on an ordinal axis in
/// sorted order, which puts ISO dates in time order.
fn chart_plot(ui: &mut Ui, chart: &ChartSpec, colors: &ColorMap) {
    let ticks = x_ticks(&chart.x);
    let labels: Vec<String> = ticks.iter().map(|x| x.to_string()).collect();

    Plot::new("chart_plot")
        .legend(Legend::default())
        .height(360.0)
        .x_axis_label(chart.x_label.clone())
        .y_axis_label(chart.y_label.clone())
        .x_axis_formatter(move |mark: GridMark, _range: &RangeInclusive<f64>| {
            tick_label(&labels, mark.value)
        })
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for series in &chart.series {
                let points: PlotPoints = series
                    .points
                    .iter()
                    .filter_map(|(x, y)| Some([x_position(&ticks, x), (*y)?]))
                    .collect();

                let line = Line::new(points)
                    .name(series.name.to_string())
                    .color(colors.color_for(&series.name))
                    .width(1.5);

                plot_ui.line(line);
            }
        });
}

/// Distinct x values in sorted order.
fn x_ticks(x: &[CellValue]) -> Vec<CellValue> {
    x.iter().cloned().collect::<BTreeSet<_>>().into_iter().collect()
}

fn x_position(ticks: &[CellValue], x: &CellValue) -> f64 {
    ticks.binary_search(x).unwrap_or_else(|i| i) as f64
}

/// Label for a grid mark; only whole positions carry a value.
fn tick_label(labels: &[String], value: f64) -> String {
    if value < 0.0 || value.fract() != 0.0 {
        return String::new();
    }
    labels.get(value as usize).cloned().unwrap_or_default()
}

fn save_table_dialog(table: &Table) -> Result<()> {
    let Some(path) = rfd::FileDialog::new()
        .set_title("Save filtered data")
        .add_filter("CSV", &["csv"])
        .set_file_name("filtered.csv")
        .save_file()
    else {
        return Ok(());
    };
    save_table(&path, table)
}

fn save_table(path: &Path, table: &Table) -> Result<()> {
    let text = table.to_csv().context("encoding table as CSV")?;
    std::fs::write(path, text).with_context(|| format!("writing {}", path.display()))?;
    log::info!("Saved {} rows to {}", table.row_count(), path.display());
    Ok(())
}
