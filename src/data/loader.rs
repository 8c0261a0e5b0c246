//! CSV Data Loader Module
//! Handles orders/reviews CSV loading and typed record extraction using Polars.

use crate::data::records::{RawOrder, Review};
use log::{debug, info};
use polars::prelude::*;
use std::fs::File;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Header names of the orders dataset.
pub const ORDER_COLUMNS: [&str; 7] = [
    "order_id",
    "order_status",
    "order_purchase_timestamp",
    "order_approved_at",
    "order_delivered_carrier_date",
    "order_delivered_customer_date",
    "order_estimated_delivery_date",
];

/// Header names of the reviews dataset that the pipeline reads.
pub const REVIEW_COLUMNS: [&str; 5] = [
    "review_id",
    "order_id",
    "review_score",
    "review_comment_title",
    "review_comment_message",
];

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),
    #[error("Failed to load CSV: {0}")]
    Csv(#[from] PolarsError),
    #[error("Missing column: {0}")]
    MissingColumn(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("No data loaded")]
    NoData,
}

/// Handles CSV file loading with Polars for both input datasets.
pub struct DataLoader {
    orders: Option<DataFrame>,
    reviews: Option<DataFrame>,
    orders_path: Option<PathBuf>,
    reviews_path: Option<PathBuf>,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DataLoader {
    pub fn new() -> Self {
        Self {
            orders: None,
            reviews: None,
            orders_path: None,
            reviews_path: None,
        }
    }

    /// Load the orders CSV and check its header.
    pub fn load_orders(&mut self, file_path: &Path) -> Result<&DataFrame, LoaderError> {
        let df = Self::read_csv(file_path)?;
        Self::require_columns(&df, &ORDER_COLUMNS)?;
        info!("Loaded {} order rows from {}", df.height(), file_path.display());

        self.orders_path = Some(file_path.to_path_buf());
        self.orders = Some(df);
        self.orders.as_ref().ok_or(LoaderError::NoData)
    }

    /// Load the reviews CSV and check its header.
    pub fn load_reviews(&mut self, file_path: &Path) -> Result<&DataFrame, LoaderError> {
        let df = Self::read_csv(file_path)?;
        Self::require_columns(&df, &REVIEW_COLUMNS)?;
        info!("Loaded {} review rows from {}", df.height(), file_path.display());

        self.reviews_path = Some(file_path.to_path_buf());
        self.reviews = Some(df);
        self.reviews.as_ref().ok_or(LoaderError::NoData)
    }

    fn read_csv(file_path: &Path) -> Result<DataFrame, LoaderError> {
        if !file_path.is_file() {
            return Err(LoaderError::FileNotFound(file_path.to_path_buf()));
        }

        // Dates stay as text here; the pipeline parses them leniently
        let df = LazyCsvReader::new(file_path)
            .with_has_header(true)
            .with_infer_schema_length(Some(10000))
            .finish()?
            .collect()?;
        Ok(df)
    }

    fn require_columns(df: &DataFrame, required: &[&str]) -> Result<(), LoaderError> {
        let present: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        match required.iter().find(|name| !present.iter().any(|p| p == *name)) {
            Some(missing) => Err(LoaderError::MissingColumn(missing.to_string())),
            None => Ok(()),
        }
    }

    /// Extract typed order rows from the loaded orders frame.
    pub fn get_orders(&self) -> Result<Vec<RawOrder>, LoaderError> {
        let df = self.orders.as_ref().ok_or(LoaderError::NoData)?;
        orders_from_frame(df)
    }

    /// Extract typed review rows from the loaded reviews frame.
    pub fn get_reviews(&self) -> Result<Vec<Review>, LoaderError> {
        let df = self.reviews.as_ref().ok_or(LoaderError::NoData)?;
        reviews_from_frame(df)
    }

    /// Get the number of order rows.
    pub fn get_order_count(&self) -> usize {
        self.orders.as_ref().map(|df| df.height()).unwrap_or(0)
    }

    /// Get the number of review rows.
    pub fn get_review_count(&self) -> usize {
        self.reviews.as_ref().map(|df| df.height()).unwrap_or(0)
    }

    pub fn get_orders_path(&self) -> Option<&PathBuf> {
        self.orders_path.as_ref()
    }

    pub fn get_reviews_path(&self) -> Option<&PathBuf> {
        self.reviews_path.as_ref()
    }

    /// Write a frame to CSV with a header row.
    pub fn write_csv(df: &mut DataFrame, file_path: &Path) -> Result<(), LoaderError> {
        let mut file = File::create(file_path)?;
        CsvWriter::new(&mut file).include_header(true).finish(df)?;
        info!("Wrote {} rows to {}", df.height(), file_path.display());
        Ok(())
    }
}

/// Build raw order records from a frame carrying the orders header.
pub fn orders_from_frame(df: &DataFrame) -> Result<Vec<RawOrder>, LoaderError> {
    let [ids, statuses, purchased, approved, carrier, customer, estimated] =
        ORDER_COLUMNS.map(|name| string_column(df, name));
    let (ids, statuses, purchased) = (ids?, statuses?, purchased?);
    let (approved, carrier, customer, estimated) = (approved?, carrier?, customer?, estimated?);

    let orders = (0..df.height())
        .map(|i| RawOrder {
            order_id: ids[i].clone(),
            order_status: statuses[i].clone(),
            purchase_timestamp: purchased[i].clone(),
            approved_at: approved[i].clone(),
            delivered_carrier_date: carrier[i].clone(),
            delivered_customer_date: customer[i].clone(),
            estimated_delivery_date: estimated[i].clone(),
        })
        .collect();
    Ok(orders)
}

/// Build review records from a frame carrying the reviews header.
///
/// Rows without an order id cannot take part in the join and are skipped; a
/// missing review id becomes an empty string.
pub fn reviews_from_frame(df: &DataFrame) -> Result<Vec<Review>, LoaderError> {
    let ids = string_column(df, "review_id")?;
    let order_ids = string_column(df, "order_id")?;
    let scores = float_column(df, "review_score")?;
    let titles = string_column(df, "review_comment_title")?;
    let messages = string_column(df, "review_comment_message")?;

    let total = ids.len();
    let reviews: Vec<Review> = ids
        .into_iter()
        .zip(order_ids)
        .zip(scores)
        .zip(titles)
        .zip(messages)
        .filter_map(|((((id, order_id), score), title), message)| {
            Some(Review::new(id.unwrap_or_default(), order_id?, score, title, message))
        })
        .collect();

    if reviews.len() < total {
        debug!("Skipped {} review rows without an order id", total - reviews.len());
    }
    Ok(reviews)
}

fn string_column(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>, LoaderError> {
    let column = df
        .column(name)
        .map_err(|_| LoaderError::MissingColumn(name.to_string()))?;
    let casted = column.cast(&DataType::String)?;
    let values = casted
        .str()?
        .into_iter()
        .map(|v| v.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string))
        .collect();
    Ok(values)
}

fn float_column(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>, LoaderError> {
    let column = df
        .column(name)
        .map_err(|_| LoaderError::MissingColumn(name.to_string()))?;
    let casted = column.cast(&DataType::Float64)?;
    let values = casted
        .f64()?
        .into_iter()
        .map(|v| v.filter(|v| !v.is_nan()))
        .collect();
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn orders_frame() -> DataFrame {
        DataFrame::new(vec![
            Column::new("order_id".into(), ["a", "b"]),
            Column::new("order_status".into(), ["delivered", "shipped"]),
            Column::new(
                "order_purchase_timestamp".into(),
                [Some("2024-01-01 00:00:00"), None],
            ),
            Column::new("order_approved_at".into(), ["2024-01-01 01:00:00", ""]),
            Column::new("order_delivered_carrier_date".into(), ["2024-01-02", "x"]),
            Column::new("order_delivered_customer_date".into(), ["2024-01-06", "y"]),
            Column::new("order_estimated_delivery_date".into(), ["2024-01-10", "z"]),
        ])
        .unwrap()
    }

    #[test]
    fn extracts_orders_with_blank_cells_as_none() {
        let orders = orders_from_frame(&orders_frame()).unwrap();
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].order_id.as_deref(), Some("a"));
        assert!(orders[0].is_complete());
        assert_eq!(orders[1].purchase_timestamp, None);
        assert_eq!(orders[1].approved_at, None);
        assert!(!orders[1].is_complete());
    }

    #[test]
    fn extracts_reviews_keeping_rows_without_review_id() {
        let df = DataFrame::new(vec![
            Column::new("review_id".into(), [Some("r1"), Some("r2"), None, Some("r4")]),
            Column::new("order_id".into(), [Some("a"), Some("b"), Some("c"), None]),
            Column::new("review_score".into(), [5i64, 1, 3, 2]),
            Column::new("review_comment_title".into(), [None, Some("bad"), None, None::<&str>]),
            Column::new("review_comment_message".into(), [None::<&str>, None, None, None]),
        ])
        .unwrap();

        let reviews = reviews_from_frame(&df).unwrap();
        assert_eq!(reviews.len(), 3);
        assert_eq!(reviews[0].review_score, Some(5.0));
        assert_eq!(reviews[0].comment_title, "No Title");
        assert_eq!(reviews[1].comment_title, "bad");
        assert_eq!(reviews[2].review_id, "");
        assert_eq!(reviews[2].order_id, "c");
        assert_eq!(reviews[2].review_score, Some(3.0));
    }

    #[test]
    fn missing_header_is_reported_by_name() {
        let df = DataFrame::new(vec![Column::new("order_id".into(), ["a"])]).unwrap();
        match DataLoader::require_columns(&df, &ORDER_COLUMNS) {
            Err(LoaderError::MissingColumn(name)) => assert_eq!(name, "order_status"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn missing_file_is_file_not_found() {
        let mut loader = DataLoader::new();
        let err = loader
            .load_orders(Path::new("definitely/not/here.csv"))
            .unwrap_err();
        assert!(matches!(err, LoaderError::FileNotFound(_)));
        assert_eq!(loader.get_order_count(), 0);
    }
}
