//! Dashboard Session
//! Runs loader and pipeline once and keeps every output for the presentation layer.

use crate::config::SessionConfig;
use crate::data::{
    DataLoader, DataProcessor, DeliveredOrder, ProcessorError, RawOrder, Review, ReviewOrder,
    DELIVERY_TIME_BOUNDARIES, DELIVERY_TIME_LABELS,
};
use crate::stats::{
    CategorySummary, DescriptiveStats, HistogramBin, ScoreSummary, StatsCalculator, StatusCount,
};
use anyhow::{Context, Result};
use log::info;
use std::path::Path;

/// Fully materialized pipeline outputs for one session.
#[derive(Debug, Clone)]
pub struct Session {
    pub config: SessionConfig,
    pub raw_order_count: usize,
    /// Review rows in the input file, before rows without an order id are skipped.
    pub raw_review_count: usize,
    pub review_count: usize,
    pub orders: Vec<DeliveredOrder>,
    pub joined: Vec<ReviewOrder>,
    pub status_counts: Vec<StatusCount>,
    pub categories: Vec<CategorySummary>,
    pub scores: Vec<ScoreSummary>,
    pub delivery_stats: DescriptiveStats,
    pub histogram: Vec<HistogramBin>,
    pub correlation_matrix: [[f64; 2]; 2],
}

impl Session {
    /// Load both CSV files named by the config and run the pipeline.
    pub fn load(config: SessionConfig) -> Result<Self> {
        let mut loader = DataLoader::new();
        loader
            .load_orders(&config.orders_path)
            .with_context(|| format!("Loading orders from {:?}", config.orders_path))?;
        loader
            .load_reviews(&config.reviews_path)
            .with_context(|| format!("Loading reviews from {:?}", config.reviews_path))?;

        let orders = loader.get_orders().context("Reading order rows")?;
        let reviews = loader.get_reviews().context("Reading review rows")?;

        let mut session = Self::from_records(config, &orders, reviews)
            .context("Building dashboard aggregates")?;
        session.raw_review_count = loader.get_review_count();
        Ok(session)
    }

    /// Run the transform/aggregate pipeline over already loaded records.
    pub fn from_records(
        config: SessionConfig,
        raw_orders: &[RawOrder],
        reviews: Vec<Review>,
    ) -> Result<Self, ProcessorError> {
        let delivered = DataProcessor::filter_delivered(raw_orders);
        let orders = DataProcessor::parse_dates(&delivered);

        let joined = DataProcessor::join_reviews(&orders, &reviews)?;
        let joined =
            DataProcessor::bucketize(joined, &DELIVERY_TIME_BOUNDARIES, &DELIVERY_TIME_LABELS)?;

        let status_counts = StatsCalculator::aggregate_by_status(&orders)?;
        let categories = StatsCalculator::aggregate_by_category(&joined)?;
        let scores = StatsCalculator::aggregate_by_score(&joined)?;

        let days = StatsCalculator::delivery_days(&orders);
        let delivery_stats = StatsCalculator::describe(&days);
        let histogram = StatsCalculator::histogram(&days, config.histogram_bins);
        let correlation_matrix = StatsCalculator::correlation_matrix(&joined);

        info!(
            "Session ready: {} delivered orders, {} joined rows, correlation {:.3}",
            orders.len(),
            joined.len(),
            correlation_matrix[0][1]
        );

        Ok(Self {
            config,
            raw_order_count: raw_orders.len(),
            raw_review_count: reviews.len(),
            review_count: reviews.len(),
            orders,
            joined,
            status_counts,
            categories,
            scores,
            delivery_stats,
            histogram,
            correlation_matrix,
        })
    }

    /// Correlation between delivery days and review score.
    pub fn correlation(&self) -> f64 {
        self.correlation_matrix[0][1]
    }

    /// Count for one status, zero when absent.
    pub fn status_total(&self, status: crate::data::DeliveryStatus) -> usize {
        self.status_counts
            .iter()
            .find(|c| c.status == status)
            .map(|c| c.orders)
            .unwrap_or(0)
    }

    /// Sample of joined rows for the data preview.
    pub fn preview(&self) -> Vec<ReviewOrder> {
        DataProcessor::preview(&self.joined, self.config.preview_rows)
    }

    /// Write the joined dataset to CSV.
    pub fn export_data(&self, path: &Path) -> Result<()> {
        let mut frame = DataProcessor::joined_to_frame(&self.joined)?;
        DataLoader::write_csv(&mut frame, path)
            .with_context(|| format!("Writing joined data to {:?}", path))?;
        Ok(())
    }
}
