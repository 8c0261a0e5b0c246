//! Data Processor Module
//! Cleans delivered orders, derives delivery status/time and joins reviews.

use crate::data::records::{
    parse_timestamp, DeliveredOrder, DeliveryBucket, DeliveryStatus, RawOrder, Review,
    ReviewOrder,
};
use chrono::NaiveDateTime;
use log::debug;
use polars::prelude::*;
use std::cmp::Ordering;
use thiserror::Error;

/// Raw status value kept by [`DataProcessor::filter_delivered`].
pub const DELIVERED_STATUS: &str = "delivered";

/// Delivery-time bucket edges in days.
pub const DELIVERY_TIME_BOUNDARIES: [i64; 8] = [0, 5, 10, 15, 20, 30, 40, 100];

/// One label per interval between consecutive boundaries.
pub const DELIVERY_TIME_LABELS: [&str; 7] = ["0-5", "6-10", "11-15", "16-20", "21-30", "31-40", "40+"];

const TIMESTAMP_OUT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// Positional keys carried through the join
const ORDER_ROW: &str = "order_row";
const REVIEW_ROW: &str = "review_row";

#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("{labels} labels given for {boundaries} boundaries, expected one label per interval")]
    BucketLabels { boundaries: usize, labels: usize },
    #[error("Bucket boundaries must be strictly increasing")]
    UnsortedBoundaries,
}

/// Row-level transformations of the orders and reviews datasets.
pub struct DataProcessor;

impl DataProcessor {
    /// Keep delivered orders, then drop rows with any missing field.
    pub fn filter_delivered(orders: &[RawOrder]) -> Vec<RawOrder> {
        let delivered: Vec<RawOrder> = orders
            .iter()
            .filter(|o| o.order_status.as_deref() == Some(DELIVERED_STATUS))
            .cloned()
            .collect();
        let before = delivered.len();

        let complete: Vec<RawOrder> = delivered.into_iter().filter(RawOrder::is_complete).collect();
        debug!(
            "Kept {} of {} orders as delivered ({} dropped for missing fields)",
            complete.len(),
            orders.len(),
            before - complete.len()
        );
        complete
    }

    /// Parse the five date columns and derive status and delivery days.
    ///
    /// Unparsable timestamps become `None`; such orders stay in the output but
    /// carry no status or delivery time.
    pub fn parse_dates(orders: &[RawOrder]) -> Vec<DeliveredOrder> {
        let parse = |raw: &Option<String>| raw.as_deref().and_then(parse_timestamp);

        let parsed: Vec<DeliveredOrder> = orders
            .iter()
            .filter_map(|raw| {
                let mut order = DeliveredOrder {
                    order_id: raw.order_id.clone()?,
                    purchase_timestamp: parse(&raw.purchase_timestamp),
                    approved_at: parse(&raw.approved_at),
                    delivered_carrier_date: parse(&raw.delivered_carrier_date),
                    delivered_customer_date: parse(&raw.delivered_customer_date),
                    estimated_delivery_date: parse(&raw.estimated_delivery_date),
                    status: None,
                    delivery_time_days: None,
                };
                order.status = Self::compute_status(&order);
                order.delivery_time_days = Self::compute_delivery_days(&order);
                Some(order)
            })
            .collect();

        let unclassified = parsed.iter().filter(|o| o.status.is_none()).count();
        if unclassified > 0 {
            debug!("{} orders have unparsable delivery or estimated dates", unclassified);
        }
        parsed
    }

    /// Compare calendar dates of actual and estimated delivery.
    pub fn compute_status(order: &DeliveredOrder) -> Option<DeliveryStatus> {
        let delivered = order.delivered_customer_date?.date();
        let estimated = order.estimated_delivery_date?.date();

        let status = match delivered.cmp(&estimated) {
            Ordering::Less => DeliveryStatus::Early,
            Ordering::Equal => DeliveryStatus::OnTime,
            Ordering::Greater => DeliveryStatus::Late,
        };
        Some(status)
    }

    /// Whole days from purchase to customer delivery, truncated and clamped at zero.
    pub fn compute_delivery_days(order: &DeliveredOrder) -> Option<i64> {
        let delivered = order.delivered_customer_date?;
        let purchased = order.purchase_timestamp?;
        Some((delivered - purchased).num_days().max(0))
    }

    /// Left join of orders with reviews on order id.
    ///
    /// Each order yields one row per matching review, or one row without a
    /// review. Order rows keep their input order, matching reviews keep theirs.
    pub fn join_reviews(
        orders: &[DeliveredOrder],
        reviews: &[Review],
    ) -> Result<Vec<ReviewOrder>, ProcessorError> {
        let order_ids: Vec<&str> = orders.iter().map(|o| o.order_id.as_str()).collect();
        let review_order_ids: Vec<&str> = reviews.iter().map(|r| r.order_id.as_str()).collect();

        let left = DataFrame::new(vec![
            Column::new(ORDER_ROW.into(), (0..orders.len() as u32).collect::<Vec<u32>>()),
            Column::new("order_id".into(), order_ids),
        ])?;
        let right = DataFrame::new(vec![
            Column::new(REVIEW_ROW.into(), (0..reviews.len() as u32).collect::<Vec<u32>>()),
            Column::new("order_id".into(), review_order_ids),
        ])?;

        let pairs = left
            .lazy()
            .join(
                right.lazy(),
                [col("order_id")],
                [col("order_id")],
                JoinArgs::new(JoinType::Left),
            )
            .sort_by_exprs(
                [col(ORDER_ROW), col(REVIEW_ROW)],
                SortMultipleOptions::default().with_maintain_order(true),
            )
            .collect()?;

        let order_rows = pairs.column(ORDER_ROW)?.u32()?;
        let review_rows = pairs.column(REVIEW_ROW)?.u32()?;

        let joined: Vec<ReviewOrder> = order_rows
            .into_iter()
            .zip(review_rows.into_iter())
            .filter_map(|(order_row, review_row)| {
                Some(ReviewOrder {
                    order: orders.get(order_row? as usize)?.clone(),
                    review: review_row.and_then(|i| reviews.get(i as usize)).cloned(),
                    delivery_time_category: None,
                })
            })
            .collect();

        debug!(
            "Joined {} orders with {} reviews into {} rows",
            orders.len(),
            reviews.len(),
            joined.len()
        );
        Ok(joined)
    }

    /// Assign each row its delivery-time bucket.
    pub fn bucketize(
        mut joined: Vec<ReviewOrder>,
        boundaries: &[i64],
        labels: &[&str],
    ) -> Result<Vec<ReviewOrder>, ProcessorError> {
        Self::check_buckets(boundaries, labels)?;

        for row in &mut joined {
            row.delivery_time_category = row
                .order
                .delivery_time_days
                .and_then(|days| Self::bucket_for(days, boundaries, labels));
        }
        Ok(joined)
    }

    fn check_buckets(boundaries: &[i64], labels: &[&str]) -> Result<(), ProcessorError> {
        if boundaries.len() < 2 || labels.len() != boundaries.len() - 1 {
            return Err(ProcessorError::BucketLabels {
                boundaries: boundaries.len(),
                labels: labels.len(),
            });
        }
        if boundaries.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ProcessorError::UnsortedBoundaries);
        }
        Ok(())
    }

    /// Find the interval `(b[i], b[i+1]]` holding `days`.
    ///
    /// The lowest boundary itself belongs to the first interval.
    pub fn bucket_for(days: i64, boundaries: &[i64], labels: &[&str]) -> Option<DeliveryBucket> {
        let first = *boundaries.first()?;
        if days == first {
            return labels.first().map(|label| DeliveryBucket {
                index: 0,
                label: label.to_string(),
            });
        }

        boundaries
            .windows(2)
            .zip(labels)
            .enumerate()
            .find(|(_, (edge, _))| days > edge[0] && days <= edge[1])
            .map(|(index, (_, label))| DeliveryBucket {
                index,
                label: label.to_string(),
            })
    }

    /// Evenly spaced sample of at most `n` rows.
    pub fn preview<T: Clone>(rows: &[T], n: usize) -> Vec<T> {
        if n == 0 || rows.is_empty() {
            return Vec::new();
        }
        if rows.len() <= n {
            return rows.to_vec();
        }

        let step = rows.len() as f64 / n as f64;
        (0..n)
            .map(|i| rows[((i as f64 * step) as usize).min(rows.len() - 1)].clone())
            .collect()
    }

    /// Build the per-order frame used for status aggregation.
    pub fn orders_to_frame(orders: &[DeliveredOrder]) -> Result<DataFrame, ProcessorError> {
        let ids: Vec<&str> = orders.iter().map(|o| o.order_id.as_str()).collect();
        let statuses: Vec<Option<&str>> = orders
            .iter()
            .map(|o| o.status.map(|s| s.label()))
            .collect();
        let days: Vec<Option<i64>> = orders.iter().map(|o| o.delivery_time_days).collect();

        let df = DataFrame::new(vec![
            Column::new("order_id".into(), ids),
            Column::new("status".into(), statuses),
            Column::new("delivery_time_days".into(), days),
        ])?;
        Ok(df)
    }

    /// Flatten joined rows into a frame with one column per field.
    pub fn joined_to_frame(rows: &[ReviewOrder]) -> Result<DataFrame, ProcessorError> {
        let fmt = |ts: Option<NaiveDateTime>| ts.map(|t| t.format(TIMESTAMP_OUT_FORMAT).to_string());

        let mut order_id = Vec::with_capacity(rows.len());
        let mut purchase = Vec::with_capacity(rows.len());
        let mut approved = Vec::with_capacity(rows.len());
        let mut carrier = Vec::with_capacity(rows.len());
        let mut customer = Vec::with_capacity(rows.len());
        let mut estimated = Vec::with_capacity(rows.len());
        let mut status = Vec::with_capacity(rows.len());
        let mut days = Vec::with_capacity(rows.len());
        let mut review_id = Vec::with_capacity(rows.len());
        let mut score = Vec::with_capacity(rows.len());
        let mut title = Vec::with_capacity(rows.len());
        let mut message = Vec::with_capacity(rows.len());
        let mut category = Vec::with_capacity(rows.len());

        for row in rows {
            let order = &row.order;
            order_id.push(order.order_id.clone());
            purchase.push(fmt(order.purchase_timestamp));
            approved.push(fmt(order.approved_at));
            carrier.push(fmt(order.delivered_carrier_date));
            customer.push(fmt(order.delivered_customer_date));
            estimated.push(fmt(order.estimated_delivery_date));
            status.push(order.status.map(|s| s.label().to_string()));
            days.push(order.delivery_time_days);
            review_id.push(row.review.as_ref().map(|r| r.review_id.clone()));
            score.push(row.review_score());
            title.push(row.review.as_ref().map(|r| r.comment_title.clone()));
            message.push(row.review.as_ref().map(|r| r.comment_message.clone()));
            category.push(row.delivery_time_category.as_ref().map(|b| b.label.clone()));
        }

        let df = DataFrame::new(vec![
            Column::new("order_id".into(), order_id),
            Column::new("order_purchase_timestamp".into(), purchase),
            Column::new("order_approved_at".into(), approved),
            Column::new("order_delivered_carrier_date".into(), carrier),
            Column::new("order_delivered_customer_date".into(), customer),
            Column::new("order_estimated_delivery_date".into(), estimated),
            Column::new("status".into(), status),
            Column::new("delivery_time_days".into(), days),
            Column::new("review_id".into(), review_id),
            Column::new("review_score".into(), score),
            Column::new("review_comment_title".into(), title),
            Column::new("review_comment_message".into(), message),
            Column::new("delivery_time_category".into(), category),
        ])?;
        Ok(df)
    }
}
