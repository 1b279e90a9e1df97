use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{Context, Result};
use eframe::egui::{self, Color32, RichText, Ui};

use stock_grapher::data::classify::{ColumnType, Edit};
use stock_grapher::data::model::CellValue;
use stock_grapher::state::{Event, Session, Stage};

use crate::color::ColorMap;
use crate::ui::table::data_table;

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(
    ui: &mut Ui,
    session: &Session,
    status: &mut Option<String>,
    events: &mut Vec<Event>,
) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                if let Some(event) = open_file_dialog(status) {
                    events.push(event);
                }
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(upload) = session.upload() {
            ui.label(format!(
                "{}: {} rows × {} columns",
                upload.filename,
                upload.table.row_count(),
                upload.table.column_count()
            ));
        }

        if let Some(msg) = status.as_ref() {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Step 1: upload
// ---------------------------------------------------------------------------

pub fn upload_step(
    ui: &mut Ui,
    session: &Session,
    status: &mut Option<String>,
    events: &mut Vec<Event>,
) {
    step_frame(ui, |ui| {
        ui.heading("Step 1: Upload your data");
        ui.vertical_centered(|ui: &mut Ui| {
            if ui
                .button("Drag and drop or choose a file (.csv, .xls, .xlsx, .txt, .tsv)")
                .clicked()
            {
                if let Some(event) = open_file_dialog(status) {
                    events.push(event);
                }
            }

            if session.upload().is_some() {
                ui.add_space(6.0);
                ui.label("Thank you. Your file was successfully uploaded");
                if ui.button("Parse Data").clicked() {
                    events.push(Event::Proceed);
                }
            }
        });
    });
}

// ---------------------------------------------------------------------------
// Step 2: classify columns
// ---------------------------------------------------------------------------

pub fn classify_step(ui: &mut Ui, session: &Session, events: &mut Vec<Event>) {
    if session.stage() != Stage::Classifying {
        return;
    }

    step_frame(ui, |ui| {
        ui.heading("Step 2: Describe your data");
        ui.label("Columns must be assigned a data type or deleted.");
        ui.add_space(4.0);

        let classification = session.classification();
        egui::Grid::new("classification")
            .striped(true)
            .num_columns(3)
            .show(ui, |ui: &mut Ui| {
                ui.strong("Column Name");
                ui.strong("Data Type");
                ui.label("");
                ui.end_row();

                for (name, tag) in classification.entries() {
                    ui.label(name);

                    let mut selected = *tag;
                    egui::ComboBox::from_id_salt(("column_type", name))
                        .selected_text(tag.map_or("None", ColumnType::label))
                        .show_ui(ui, |ui: &mut Ui| {
                            for option in ColumnType::ALL {
                                ui.selectable_value(&mut selected, Some(option), option.label());
                            }
                        });
                    if selected != *tag {
                        events.push(Event::Edit(vec![Edit::SetType {
                            column: name.clone(),
                            tag: selected,
                        }]));
                    }

                    if ui
                        .small_button("✖")
                        .on_hover_text("Delete this column")
                        .clicked()
                    {
                        events.push(Event::Edit(vec![Edit::delete(name.clone())]));
                    }
                    ui.end_row();
                }
            });

        let unset = classification.unset_columns();
        if !unset.is_empty() {
            ui.add_space(4.0);
            ui.label(format!("Still to describe: {}", unset.join(", ")));
        }
    });
}

// ---------------------------------------------------------------------------
// Step 3: preview and pick what to plot
// ---------------------------------------------------------------------------

pub fn preview_step(ui: &mut Ui, session: &Session, colors: &ColorMap, events: &mut Vec<Event>) {
    if let Some(err) = session.preview_error() {
        step_frame(ui, |ui| {
            ui.label(RichText::new(err.to_string()).color(Color32::RED));
        });
        return;
    }
    let Some(preview) = session.preview() else {
        return;
    };

    step_frame(ui, |ui| {
        ui.heading("Step 3: Preview your data");
        data_table(ui, "preview_table", &preview.table);
        ui.add_space(8.0);

        // ---- Category picker ----
        ui.strong(format!(
            "Please select which {} values you would like to plot",
            preview.category_column
        ));
        let options = session.category_options();
        let selected = &session.selection().categories;
        ui.horizontal(|ui: &mut Ui| {
            if ui.small_button("All").clicked() {
                events.push(Event::SelectCategories(options.clone()));
            }
            if ui.small_button("None").clicked() {
                events.push(Event::SelectCategories(Vec::new()));
            }
        });
        ui.horizontal_wrapped(|ui: &mut Ui| {
            for value in &options {
                let mut checked = selected.contains(value);
                let text = RichText::new(value.to_string()).color(colors.color_for(value));
                if ui.checkbox(&mut checked, text).changed() {
                    events.push(Event::SelectCategories(toggled(&options, selected, value)));
                }
            }
        });
        ui.add_space(8.0);

        // ---- Metric picker ----
        ui.strong("Please select which data you want to plot:");
        let current = session.selection().metric.clone();
        let mut chosen = current.clone();
        egui::ComboBox::from_id_salt("metric")
            .selected_text(current.as_deref().unwrap_or("Select the value"))
            .show_ui(ui, |ui: &mut Ui| {
                for metric in session.metric_options() {
                    let label = metric.clone();
                    ui.selectable_value(&mut chosen, Some(metric), label);
                }
            });
        if chosen != current {
            events.push(Event::SelectMetric(chosen));
        }
    });
}

/// The option list with `value` flipped, in option order.
fn toggled(
    options: &[CellValue],
    selected: &BTreeSet<CellValue>,
    value: &CellValue,
) -> Vec<CellValue> {
    options
        .iter()
        .filter(|v| (*v == value) != selected.contains(*v))
        .cloned()
        .collect()
}

// ---------------------------------------------------------------------------
// File input
// ---------------------------------------------------------------------------

pub fn open_file_dialog(status: &mut Option<String>) -> Option<Event> {
    let path = rfd::FileDialog::new()
        .set_title("Open tabular data")
        .add_filter("Supported files", &["csv", "xls", "xlsx", "txt", "tsv"])
        .add_filter("CSV", &["csv"])
        .add_filter("Excel", &["xls", "xlsx"])
        .add_filter("Text", &["txt", "tsv"])
        .pick_file()?;

    match read_upload(&path) {
        Ok(event) => Some(event),
        Err(e) => {
            log::error!("Failed to read file: {e:#}");
            *status = Some(format!("Error: {e:#}"));
            None
        }
    }
}

/// The first file dropped onto the window this frame, if any.
pub fn dropped_file(ctx: &egui::Context, status: &mut Option<String>) -> Option<Event> {
    let file = ctx.input(|i| i.raw.dropped_files.first().cloned())?;

    if let Some(bytes) = file.bytes {
        return Some(Event::Upload {
            filename: file.name,
            bytes: bytes.to_vec(),
        });
    }

    let path = file.path?;
    match read_upload(&path) {
        Ok(event) => Some(event),
        Err(e) => {
            log::error!("Failed to read dropped file: {e:#}");
            *status = Some(format!("Error: {e:#}"));
            None
        }
    }
}

fn read_upload(path: &Path) -> Result<Event> {
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .context("path has no file name")?;
    log::info!("Read {} bytes from {}", bytes.len(), path.display());
    Ok(Event::Upload { filename, bytes })
}

// ---------------------------------------------------------------------------
// Layout helpers
// ---------------------------------------------------------------------------

pub fn step_frame(ui: &mut Ui, add_contents: impl FnOnce(&mut Ui)) {
    egui::Frame::group(ui.style())
        .stroke(egui::Stroke::new(1.0, Color32::from_rgb(0xA2, 0xA3, 0xAA)))
        .inner_margin(8.0)
        .show(ui, |ui: &mut Ui| {
            ui.set_width(ui.available_width());
            add_contents(ui);
        });
    ui.add_space(12.0);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggling_keeps_option_order() {
        let options: Vec<CellValue> = vec!["A".into(), "B".into(), "C".into()];
        let selected: BTreeSet<CellValue> = ["C".into()].into_iter().collect();
        assert_eq!(
            toggled(&options, &selected, &"A".into()),
            vec![CellValue::from("A"), CellValue::from("C")]
        );
        assert_eq!(toggled(&options, &selected, &"C".into()), Vec::<CellValue>::new());
    }
}
