//! Write a deterministic sample price file to try the app with.
//!
//! Usage: `generate_sample [OUTPUT]` (default `sample_stocks.csv`).

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate};

/// SplitMix64 stream with normal draws from the Marsaglia polar method.
struct PriceNoise {
    state: u64,
    spare: Option<f64>,
}

impl PriceNoise {
    fn seeded(seed: u64) -> Self {
        PriceNoise { state: seed, spare: None }
    }

    fn next_bits(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform in `[0, 1)`.
    fn uniform(&mut self) -> f64 {
        (self.next_bits() >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Standard normal; draws come in pairs, the second is kept for the next call.
    fn standard_normal(&mut self) -> f64 {
        if let Some(z) = self.spare.take() {
            return z;
        }
        loop {
            let u = 2.0 * self.uniform() - 1.0;
            let v = 2.0 * self.uniform() - 1.0;
            let s = u * u + v * v;
            if s > 0.0 && s < 1.0 {
                let scale = (-2.0 * s.ln() / s).sqrt();
                self.spare = Some(v * scale);
                return u * scale;
            }
        }
    }

    /// Multiplicative daily return with the given volatility.
    fn daily_return(&mut self, volatility: f64) -> f64 {
        1.0 + volatility * self.standard_normal()
    }
}

fn main() -> Result<()> {
    let output_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "sample_stocks.csv".to_string());

    let mut noise = PriceNoise::seeded(42);
    let start = NaiveDate::from_ymd_opt(2020, 1, 1).context("invalid start date")?;
    let days = 60;

    // (ticker, opening price, daily volatility)
    let stocks = [("AAPL", 75.0, 0.02), ("MSFT", 160.0, 0.015), ("TSLA", 86.0, 0.04)];
    let mut prices: Vec<f64> = stocks.iter().map(|&(_, p, _)| p).collect();

    let mut writer = csv::Writer::from_path(&output_path)
        .with_context(|| format!("creating {output_path}"))?;
    writer.write_record(["Date", "Stock", "Open", "Close", "Volume"])?;

    let mut rows = 0;
    for day in 0..days {
        let date = start + Duration::days(day);
        for (i, &(ticker, _, volatility)) in stocks.iter().enumerate() {
            let open = prices[i];
            let close = (open * noise.daily_return(volatility)).max(1.0);
            let volume = (1_000_000.0 * (1.0 + noise.uniform())) as u64;
            prices[i] = close;

            writer.write_record([
                date.format("%Y-%m-%d").to_string(),
                ticker.to_string(),
                format!("{open:.2}"),
                format!("{close:.2}"),
                volume.to_string(),
            ])?;
            rows += 1;
        }
    }
    writer.flush().with_context(|| format!("writing {output_path}"))?;

    println!("Wrote {rows} rows for {} stocks to {output_path}", stocks.len());
    Ok(())
}
