use eframe::egui;

use stock_grapher::config::PipelineConfig;
use stock_grapher::state::{Event, Session};

use crate::color::ColorMap;
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct StockGrapherApp {
    pub session: Session,
    /// Last error shown in the top bar; cleared by the next successful event.
    pub status_message: Option<String>,
    colors: ColorMap,
    colors_revision: Option<u64>,
}

impl StockGrapherApp {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            session: Session::new(config),
            status_message: None,
            colors: ColorMap::default(),
            colors_revision: None,
        }
    }

    /// Swap in the next session revision, or keep the current one on error.
    pub fn dispatch(&mut self, event: Event) {
        match self.session.apply(event) {
            Ok(next) => {
                log::debug!("Session revision {}", next.revision());
                self.session = next;
                self.status_message = None;
            }
            Err(e) => {
                log::error!("{e}");
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    fn refresh_colors(&mut self) {
        if self.colors_revision != Some(self.session.revision()) {
            self.colors = ColorMap::new(&self.session.category_options());
            self.colors_revision = Some(self.session.revision());
        }
    }
}

impl eframe::App for StockGrapherApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let mut events: Vec<Event> = Vec::new();

        if let Some(event) = panels::dropped_file(ctx, &mut self.status_message) {
            events.push(event);
        }

        self.refresh_colors();

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &self.session, &mut self.status_message, &mut events);
        });

        // ---- Central panel: the four steps ----
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    panels::upload_step(ui, &self.session, &mut self.status_message, &mut events);
                    panels::classify_step(ui, &self.session, &mut events);
                    panels::preview_step(ui, &self.session, &self.colors, &mut events);
                    plot::graph_step(ui, &self.session, &self.colors, &mut self.status_message);
                });
        });

        for event in events {
            self.dispatch(event);
        }
    }
}
