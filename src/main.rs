mod app;
mod color;
mod ui;

use app::StockGrapherApp;
use eframe::egui;
use stock_grapher::config::PipelineConfig;

fn main() -> eframe::Result {
    env_logger::init();

    let config = PipelineConfig::from_env();
    log::info!(
        "Grouping series by '{}', x axis '{}'",
        config.category_column,
        config.x_column
    );

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 900.0])
            .with_min_inner_size([600.0, 400.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        "Stock Grapher",
        options,
        Box::new(|_cc| Ok(Box::new(StockGrapherApp::new(config)))),
    )
}
