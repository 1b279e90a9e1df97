/// Environment variable overriding [`PipelineConfig::category_column`].
pub const CATEGORY_COLUMN_ENV: &str = "STOCK_GRAPHER_CATEGORY_COLUMN";
/// Environment variable overriding [`PipelineConfig::x_column`].
pub const X_COLUMN_ENV: &str = "STOCK_GRAPHER_X_COLUMN";

/// Fixed schema names the pipeline relies on.
///
/// These are not user-selectable in the UI: the uploaded data is expected to
/// carry a `Stock` column to group series by and a `Date` column for the x axis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub category_column: String,
    pub x_column: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            category_column: "Stock".to_string(),
            x_column: "Date".to_string(),
        }
    }
}

impl PipelineConfig {
    /// Defaults, overridden by any non-empty environment variable.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(v) = lookup(CATEGORY_COLUMN_ENV).filter(|v| !v.trim().is_empty()) {
            config.category_column = v.trim().to_string();
        }
        if let Some(v) = lookup(X_COLUMN_ENV).filter(|v| !v.trim().is_empty()) {
            config.x_column = v.trim().to_string();
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_stock_and_date() {
        let config = PipelineConfig::from_lookup(|_| None);
        assert_eq!(config.category_column, "Stock");
        assert_eq!(config.x_column, "Date");
    }

    #[test]
    fn lookup_overrides_non_empty_values() {
        let config = PipelineConfig::from_lookup(|key| match key {
            CATEGORY_COLUMN_ENV => Some(" Ticker ".to_string()),
            X_COLUMN_ENV => Some("".to_string()),
            _ => None,
        });
        assert_eq!(config.category_column, "Ticker");
        assert_eq!(config.x_column, "Date");
    }
}
