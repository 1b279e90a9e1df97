use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use stock_grapher::data::model::CellValue;

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Color mapping: stock → Color32
// ---------------------------------------------------------------------------

/// Maps every stock offered in the picker to a stable colour, so a series
/// keeps its colour while other stocks are toggled.
#[derive(Debug, Clone, Default)]
pub struct ColorMap {
    mapping: BTreeMap<CellValue, Color32>,
}

impl ColorMap {
    pub fn new(options: &[CellValue]) -> Self {
        let mapping = options
            .iter()
            .cloned()
            .zip(generate_palette(options.len()))
            .collect();
        ColorMap { mapping }
    }

    /// Look up the colour for a given stock.
    pub fn color_for(&self, value: &CellValue) -> Color32 {
        self.mapping.get(value).copied().unwrap_or(Color32::GRAY)
    }
}
