//! Session Configuration Module
//! Explicit settings passed from the entry point into the session and window.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::stats::DEFAULT_HISTOGRAM_BINS;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Settings for one dashboard session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub orders_path: PathBuf,
    pub reviews_path: PathBuf,
    /// Initial state of the "show data" toggle.
    pub show_raw_data: bool,
    pub preview_rows: usize,
    pub histogram_bins: usize,
    /// Static chart export size in pixels.
    pub chart_width: u32,
    pub chart_height: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            orders_path: PathBuf::from("data/olist_orders_dataset.csv"),
            reviews_path: PathBuf::from("data/olist_order_reviews_dataset.csv"),
            show_raw_data: false,
            preview_rows: 5,
            histogram_bins: DEFAULT_HISTOGRAM_BINS,
            chart_width: 1000,
            chart_height: 600,
        }
    }
}

impl SessionConfig {
    /// Load a JSON config file; missing keys take their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: SessionConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Replace the input paths when given on the command line.
    pub fn with_paths(mut self, orders: Option<PathBuf>, reviews: Option<PathBuf>) -> Self {
        if let Some(orders) = orders {
            self.orders_path = orders;
        }
        if let Some(reviews) = reviews {
            self.reviews_path = reviews;
        }
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.histogram_bins == 0 {
            return Err(ConfigError::Invalid("histogram_bins must be at least 1".into()));
        }
        if self.preview_rows == 0 {
            return Err(ConfigError::Invalid("preview_rows must be at least 1".into()));
        }
        if self.chart_width == 0 || self.chart_height == 0 {
            return Err(ConfigError::Invalid("chart size must be non-zero".into()));
        }
        Ok(())
    }
}
