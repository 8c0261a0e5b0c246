//! Stats module - Aggregates and descriptive statistics

mod calculator;

pub use calculator::{
    CategorySummary, DescriptiveStats, HistogramBin, ScoreSummary, StatsCalculator, StatusCount,
    DEFAULT_HISTOGRAM_BINS,
};
