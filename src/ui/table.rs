use eframe::egui::Ui;
use egui_extras::{Column, TableBuilder};

use stock_grapher::data::model::Table;

/// Render `table` as a striped, scrollable grid with a header row.
pub fn data_table(ui: &mut Ui, id: &str, table: &Table) {
    if table.column_count() == 0 {
        ui.label("No columns to show.");
        return;
    }

    ui.push_id(id, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .max_scroll_height(260.0)
            .columns(Column::auto().at_least(60.0), table.column_count())
            .header(20.0, |mut header| {
                for column in table.columns() {
                    header.col(|ui| {
                        ui.strong(&column.name);
                    });
                }
            })
            .body(|body| {
                body.rows(18.0, table.row_count(), |mut row| {
                    let index = row.index();
                    for column in table.columns() {
                        row.col(|ui| {
                            ui.label(column.values[index].to_string());
                        });
                    }
                });
            });
    });
}
