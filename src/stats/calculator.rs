//! Statistics Calculator Module
//! Handles the dashboard aggregates: status counts, bucket and score summaries,
//! descriptive statistics, histogram bins and Pearson correlation.

use crate::data::{DataProcessor, DeliveredOrder, DeliveryBucket, DeliveryStatus, ProcessorError, ReviewOrder};
use polars::prelude::*;
use statrs::statistics::Statistics;

/// Default number of histogram bins for the delivery-time distribution.
pub const DEFAULT_HISTOGRAM_BINS: usize = 30;

/// Distinct order count for one delivery status.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusCount {
    pub status: DeliveryStatus,
    pub orders: usize,
}

/// Mean review score and row count for one delivery-time bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct CategorySummary {
    pub bucket: DeliveryBucket,
    pub mean_review_score: f64,
    pub count: usize,
}

/// Mean delivery time for one review score.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreSummary {
    pub review_score: f64,
    pub mean_delivery_days: f64,
    pub count: usize,
}

/// One equal-width histogram bin, `[start, end)` except the last which is closed.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

impl HistogramBin {
    pub fn center(&self) -> f64 {
        (self.start + self.end) / 2.0
    }

    pub fn width(&self) -> f64 {
        self.end - self.start
    }
}

/// Descriptive statistics of a numeric column.
#[derive(Debug, Clone)]
pub struct DescriptiveStats {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub p25: f64,
    pub median: f64,
    pub p75: f64,
    pub max: f64,
}

impl Default for DescriptiveStats {
    fn default() -> Self {
        Self {
            count: 0,
            mean: f64::NAN,
            std: f64::NAN,
            min: f64::NAN,
            p25: f64::NAN,
            median: f64::NAN,
            p75: f64::NAN,
            max: f64::NAN,
        }
    }
}

impl DescriptiveStats {
    /// Rows in display order: (label, value).
    pub fn rows(&self) -> [(&'static str, f64); 8] {
        [
            ("count", self.count as f64),
            ("mean", self.mean),
            ("std", self.std),
            ("min", self.min),
            ("25%", self.p25),
            ("50%", self.median),
            ("75%", self.p75),
            ("max", self.max),
        ]
    }
}

/// Handles the dashboard's statistical calculations.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Compute descriptive statistics for an array of values.
    pub fn describe(values: &[f64]) -> DescriptiveStats {
        let n = values.len();
        if n == 0 {
            return DescriptiveStats::default();
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        DescriptiveStats {
            count: n,
            mean: Statistics::mean(values.iter()),
            // Sample standard deviation, NaN for a single value
            std: Statistics::std_dev(values.iter()),
            min: sorted[0],
            p25: Self::percentile(&sorted, 25.0),
            median: Self::percentile(&sorted, 50.0),
            p75: Self::percentile(&sorted, 75.0),
            max: sorted[n - 1],
        }
    }

    /// Calculate percentile using linear interpolation (NumPy compatible).
    fn percentile(sorted_values: &[f64], p: f64) -> f64 {
        let n = sorted_values.len();
        if n == 0 {
            return f64::NAN;
        }
        if n == 1 {
            return sorted_values[0];
        }

        let rank = (p / 100.0) * (n - 1) as f64;
        let lower = rank.floor() as usize;
        let upper = (rank.ceil() as usize).min(n - 1);
        let frac = rank - lower as f64;

        if lower == upper {
            sorted_values[lower]
        } else {
            sorted_values[lower] * (1.0 - frac) + sorted_values[upper] * frac
        }
    }

    /// Delivery days of every order that has one.
    pub fn delivery_days(orders: &[DeliveredOrder]) -> Vec<f64> {
        orders
            .iter()
            .filter_map(|o| o.delivery_time_days)
            .map(|d| d as f64)
            .collect()
    }

    /// Distinct order count per status, largest first.
    pub fn aggregate_by_status(orders: &[DeliveredOrder]) -> Result<Vec<StatusCount>, ProcessorError> {
        let frame = DataProcessor::orders_to_frame(orders)?;

        let counts = frame
            .lazy()
            .filter(col("status").is_not_null())
            .group_by([col("status")])
            .agg([col("order_id").n_unique().alias("orders")])
            .sort_by_exprs(
                [col("orders"), col("status")],
                SortMultipleOptions {
                    descending: vec![true, false],
                    ..Default::default()
                },
            )
            .collect()?;

        let statuses = counts.column("status")?.str()?;
        let totals = counts.column("orders")?.cast(&DataType::UInt64)?;
        let totals = totals.u64()?;

        let result = statuses
            .into_iter()
            .zip(totals.into_iter())
            .filter_map(|(status, total)| {
                Some(StatusCount {
                    status: DeliveryStatus::from_label(status?)?,
                    orders: total? as usize,
                })
            })
            .collect();
        Ok(result)
    }

    /// Mean review score and row count per delivery bucket, in bucket order.
    ///
    /// Only buckets that hold at least one row are reported; a bucket whose
    /// rows carry no score reports a NaN mean.
    pub fn aggregate_by_category(joined: &[ReviewOrder]) -> Result<Vec<CategorySummary>, ProcessorError> {
        let table = Self::joined_metrics(joined)?
            .lazy()
            .filter(col("bucket_index").is_not_null())
            .group_by([col("bucket_index"), col("delivery_time_category")])
            .agg([
                col("review_score").mean().alias("mean_review_score"),
                len().alias("count"),
            ])
            .sort_by_exprs([col("bucket_index")], SortMultipleOptions::default())
            .collect()?;

        let indices = table.column("bucket_index")?.u32()?;
        let labels = table.column("delivery_time_category")?.str()?;
        let means = float_values(&table, "mean_review_score")?;
        let counts = count_values(&table, "count")?;

        let result = indices
            .into_iter()
            .zip(labels.into_iter())
            .zip(means.into_iter().zip(counts))
            .filter_map(|((index, label), (mean, count))| {
                Some(CategorySummary {
                    bucket: DeliveryBucket {
                        index: index? as usize,
                        label: label?.to_string(),
                    },
                    mean_review_score: mean.unwrap_or(f64::NAN),
                    count,
                })
            })
            .collect();
        Ok(result)
    }

    /// Mean delivery days per review score, ascending by score.
    pub fn aggregate_by_score(joined: &[ReviewOrder]) -> Result<Vec<ScoreSummary>, ProcessorError> {
        let table = Self::joined_metrics(joined)?
            .lazy()
            .filter(
                col("review_score")
                    .is_not_null()
                    .and(col("delivery_time_days").is_not_null()),
            )
            .group_by([col("review_score")])
            .agg([
                col("delivery_time_days").mean().alias("mean_delivery_days"),
                len().alias("count"),
            ])
            .sort_by_exprs([col("review_score")], SortMultipleOptions::default())
            .collect()?;

        let scores = float_values(&table, "review_score")?;
        let means = float_values(&table, "mean_delivery_days")?;
        let counts = count_values(&table, "count")?;

        let result = scores
            .into_iter()
            .zip(means)
            .zip(counts)
            .filter_map(|((score, mean), count)| {
                Some(ScoreSummary {
                    review_score: score?,
                    mean_delivery_days: mean?,
                    count,
                })
            })
            .collect();
        Ok(result)
    }

    /// Bucket, delivery days and review score of every joined row.
    fn joined_metrics(joined: &[ReviewOrder]) -> Result<DataFrame, ProcessorError> {
        let bucket_index: Vec<Option<u32>> = joined
            .iter()
            .map(|r| r.delivery_time_category.as_ref().map(|b| b.index as u32))
            .collect();
        let bucket_label: Vec<Option<&str>> = joined
            .iter()
            .map(|r| r.delivery_time_category.as_ref().map(|b| b.label.as_str()))
            .collect();
        let days: Vec<Option<i64>> = joined.iter().map(|r| r.order.delivery_time_days).collect();
        let scores: Vec<Option<f64>> = joined.iter().map(ReviewOrder::review_score).collect();

        let df = DataFrame::new(vec![
            Column::new("bucket_index".into(), bucket_index),
            Column::new("delivery_time_category".into(), bucket_label),
            Column::new("delivery_time_days".into(), days),
            Column::new("review_score".into(), scores),
        ])?;
        Ok(df)
    }

    /// Pearson correlation between delivery days and review score.
    pub fn correlation(joined: &[ReviewOrder]) -> f64 {
        let (days, scores) = Self::paired_columns(joined);
        Self::pearson(&days, &scores)
    }

    /// 2x2 correlation matrix over (delivery_time_days, review_score).
    pub fn correlation_matrix(joined: &[ReviewOrder]) -> [[f64; 2]; 2] {
        let (days, scores) = Self::paired_columns(joined);
        let r = Self::pearson(&days, &scores);
        [
            [Self::pearson(&days, &days), r],
            [r, Self::pearson(&scores, &scores)],
        ]
    }

    fn paired_columns(joined: &[ReviewOrder]) -> (Vec<f64>, Vec<f64>) {
        joined
            .iter()
            .filter_map(|row| Some((row.order.delivery_time_days? as f64, row.review_score()?)))
            .unzip()
    }

    /// Pearson correlation coefficient.
    ///
    /// NaN when fewer than two pairs are given or either side has zero variance.
    pub fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
        let n = xs.len().min(ys.len());
        if n < 2 {
            return f64::NAN;
        }
        let (xs, ys) = (&xs[..n], &ys[..n]);

        let mean_x = Statistics::mean(xs.iter());
        let mean_y = Statistics::mean(ys.iter());

        let mut cov = 0.0;
        let mut var_x = 0.0;
        let mut var_y = 0.0;
        for (x, y) in xs.iter().zip(ys) {
            let dx = x - mean_x;
            let dy = y - mean_y;
            cov += dx * dy;
            var_x += dx * dx;
            var_y += dy * dy;
        }

        if var_x == 0.0 || var_y == 0.0 {
            return f64::NAN;
        }
        (cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0)
    }

    /// Equal-width histogram over the value range.
    pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
        let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if finite.is_empty() || bins == 0 {
            return Vec::new();
        }

        let mut min = finite.iter().copied().fold(f64::INFINITY, f64::min);
        let mut max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if min == max {
            min -= 0.5;
            max += 0.5;
        }
        let width = (max - min) / bins as f64;

        let mut counts = vec![0usize; bins];
        for v in &finite {
            let idx = (((v - min) / width).floor() as usize).min(bins - 1);
            counts[idx] += 1;
        }

        counts
            .into_iter()
            .enumerate()
            .map(|(i, count)| HistogramBin {
                start: min + i as f64 * width,
                end: min + (i + 1) as f64 * width,
                count,
            })
            .collect()
    }

    /// Plain-language strength of a correlation coefficient.
    pub fn correlation_strength(r: f64) -> String {
        if r.is_nan() {
            return "undefined".to_string();
        }

        let magnitude = match r.abs() {
            a if a < 0.1 => return "negligible".to_string(),
            a if a < 0.3 => "weak",
            a if a < 0.5 => "moderate",
            a if a < 0.7 => "strong",
            _ => "very strong",
        };
        let direction = if r < 0.0 { "negative" } else { "positive" };
        format!("{} {}", magnitude, direction)
    }
}

fn float_values(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>, ProcessorError> {
    let values = df.column(name)?.cast(&DataType::Float64)?;
    let values = values.f64()?.into_iter().collect();
    Ok(values)
}

fn count_values(df: &DataFrame, name: &str) -> Result<Vec<usize>, ProcessorError> {
    let values = df.column(name)?.cast(&DataType::UInt64)?;
    let values = values
        .u64()?
        .into_iter()
        .map(|v| v.unwrap_or(0) as usize)
        .collect();
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Review, DELIVERY_TIME_BOUNDARIES, DELIVERY_TIME_LABELS};

    fn order(id: &str, status: Option<DeliveryStatus>, days: Option<i64>) -> DeliveredOrder {
        DeliveredOrder {
            order_id: id.to_string(),
            purchase_timestamp: None,
            approved_at: None,
            delivered_carrier_date: None,
            delivered_customer_date: None,
            estimated_delivery_date: None,
            status,
            delivery_time_days: days,
        }
    }

    fn joined_row(days: Option<i64>, score: Option<f64>) -> ReviewOrder {
        let order = order("o", Some(DeliveryStatus::Early), days);
        let review = score.map(|s| Review::new("r".into(), "o".into(), Some(s), None, None));
        let bucket = days.and_then(|d| {
            DataProcessor::bucket_for(d, &DELIVERY_TIME_BOUNDARIES, &DELIVERY_TIME_LABELS)
        });
        ReviewOrder {
            order,
            review,
            delivery_time_category: bucket,
        }
    }

    #[test]
    fn describe_matches_pandas_quartiles() {
        let stats = StatsCalculator::describe(&[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(stats.count, 4);
        assert!((stats.mean - 2.5).abs() < 1e-12);
        assert!((stats.p25 - 1.75).abs() < 1e-12);
        assert!((stats.median - 2.5).abs() < 1e-12);
        assert!((stats.p75 - 3.25).abs() < 1e-12);
        assert!((stats.std - 1.2909944487358056).abs() < 1e-9);
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 4.0);
    }

    #[test]
    fn describe_empty_is_all_nan() {
        let stats = StatsCalculator::describe(&[]);
        assert_eq!(stats.count, 0);
        assert!(stats.mean.is_nan() && stats.median.is_nan() && stats.max.is_nan());
    }

    #[test]
    fn status_counts_are_distinct_and_descending() {
        let orders = vec![
            order("a", Some(DeliveryStatus::Early), Some(3)),
            order("b", Some(DeliveryStatus::Early), Some(4)),
            order("b", Some(DeliveryStatus::Early), Some(4)),
            order("c", Some(DeliveryStatus::Late), Some(30)),
            order("d", Some(DeliveryStatus::Late), Some(31)),
            order("e", Some(DeliveryStatus::Late), Some(32)),
            order("f", Some(DeliveryStatus::OnTime), Some(10)),
            order("g", None, None),
        ];

        let counts = StatsCalculator::aggregate_by_status(&orders).unwrap();
        assert_eq!(
            counts,
            vec![
                StatusCount { status: DeliveryStatus::Late, orders: 3 },
                StatusCount { status: DeliveryStatus::Early, orders: 2 },
                StatusCount { status: DeliveryStatus::OnTime, orders: 1 },
            ]
        );
    }

    #[test]
    fn empty_inputs_give_empty_aggregates() {
        assert!(StatsCalculator::aggregate_by_status(&[]).unwrap().is_empty());
        assert!(StatsCalculator::aggregate_by_category(&[]).unwrap().is_empty());
        assert!(StatsCalculator::aggregate_by_score(&[]).unwrap().is_empty());
        assert!(StatsCalculator::histogram(&[], 30).is_empty());
        assert!(StatsCalculator::correlation(&[]).is_nan());
    }

    #[test]
    fn category_summary_follows_bucket_order() {
        let rows = vec![
            joined_row(Some(25), Some(2.0)),
            joined_row(Some(3), Some(5.0)),
            joined_row(Some(4), Some(4.0)),
            joined_row(Some(4), None),
            joined_row(Some(150), Some(1.0)),
        ];

        let table = StatsCalculator::aggregate_by_category(&rows).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table[0].bucket.label, "0-5");
        assert_eq!(table[0].count, 3);
        assert!((table[0].mean_review_score - 4.5).abs() < 1e-12);
        assert_eq!(table[1].bucket.label, "21-30");
        assert_eq!(table[1].count, 1);
    }

    #[test]
    fn score_summary_averages_delivery_days() {
        let rows = vec![
            joined_row(Some(10), Some(1.0)),
            joined_row(Some(20), Some(1.0)),
            joined_row(Some(4), Some(5.0)),
            joined_row(None, Some(5.0)),
        ];

        let table = StatsCalculator::aggregate_by_score(&rows).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table[0].review_score, 1.0);
        assert!((table[0].mean_delivery_days - 15.0).abs() < 1e-12);
        assert_eq!(table[1].count, 1);
    }

    #[test]
    fn correlation_of_perfect_inverse_is_minus_one() {
        let rows: Vec<ReviewOrder> = (1..=5)
            .map(|i| joined_row(Some(i * 5), Some(6.0 - i as f64)))
            .collect();
        assert!((StatsCalculator::correlation(&rows) + 1.0).abs() < 1e-12);

        let matrix = StatsCalculator::correlation_matrix(&rows);
        assert!((matrix[0][0] - 1.0).abs() < 1e-12);
        assert_eq!(matrix[0][1], matrix[1][0]);
    }

    #[test]
    fn zero_variance_correlation_is_nan() {
        assert!(StatsCalculator::pearson(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]).is_nan());
        assert!(StatsCalculator::pearson(&[1.0], &[2.0]).is_nan());
    }

    #[test]
    fn histogram_covers_every_value() {
        let values: Vec<f64> = (0..=209).map(|v| v as f64).collect();
        let bins = StatsCalculator::histogram(&values, 30);
        assert_eq!(bins.len(), 30);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), values.len());
        assert_eq!(bins[0].start, 0.0);
        assert!((bins[29].end - 209.0).abs() < 1e-9);

        let single = StatsCalculator::histogram(&[7.0, 7.0], 4);
        assert_eq!(single.iter().map(|b| b.count).sum::<usize>(), 2);
    }

    #[test]
    fn correlation_wording() {
        assert_eq!(StatsCalculator::correlation_strength(-0.33), "moderate negative");
        assert_eq!(StatsCalculator::correlation_strength(0.8), "very strong positive");
        assert_eq!(StatsCalculator::correlation_strength(0.05), "negligible");
        assert_eq!(StatsCalculator::correlation_strength(f64::NAN), "undefined");
    }
}
