//! Record Types Module
//! Typed order, review and joined rows produced by the loader and pipeline.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::fmt;

/// Placeholder used when a review has no comment title.
pub const NO_TITLE: &str = "No Title";
/// Placeholder used when a review has no comment message.
pub const NO_MESSAGE: &str = "No Message";

/// Timestamp layouts accepted by the date parser, tried in order.
const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a timestamp cell. Unparsable or empty values yield `None`.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, DATE_FORMAT)
                .ok()
                .map(|date| date.and_time(NaiveTime::MIN))
        })
}

/// Order row as read from the orders CSV, before any cleaning.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawOrder {
    pub order_id: Option<String>,
    pub order_status: Option<String>,
    pub purchase_timestamp: Option<String>,
    pub approved_at: Option<String>,
    pub delivered_carrier_date: Option<String>,
    pub delivered_customer_date: Option<String>,
    pub estimated_delivery_date: Option<String>,
}

impl RawOrder {
    /// True when every field carries a value.
    pub fn is_complete(&self) -> bool {
        self.order_id.is_some()
            && self.order_status.is_some()
            && self.purchase_timestamp.is_some()
            && self.approved_at.is_some()
            && self.delivered_carrier_date.is_some()
            && self.delivered_customer_date.is_some()
            && self.estimated_delivery_date.is_some()
    }
}

/// Delivery classification against the estimated delivery date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DeliveryStatus {
    Early,
    OnTime,
    Late,
}

impl DeliveryStatus {
    /// Display order used by the status table and bar chart.
    pub const ALL: [DeliveryStatus; 3] = [
        DeliveryStatus::Early,
        DeliveryStatus::OnTime,
        DeliveryStatus::Late,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            DeliveryStatus::Early => "Early",
            DeliveryStatus::OnTime => "On Time",
            DeliveryStatus::Late => "Late",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.label() == label)
    }
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A delivered order with parsed timestamps and derived delivery fields.
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveredOrder {
    pub order_id: String,
    pub purchase_timestamp: Option<NaiveDateTime>,
    pub approved_at: Option<NaiveDateTime>,
    pub delivered_carrier_date: Option<NaiveDateTime>,
    pub delivered_customer_date: Option<NaiveDateTime>,
    pub estimated_delivery_date: Option<NaiveDateTime>,
    pub status: Option<DeliveryStatus>,
    pub delivery_time_days: Option<i64>,
}

/// Review row with comment placeholders already applied.
#[derive(Debug, Clone, PartialEq)]
pub struct Review {
    pub review_id: String,
    pub order_id: String,
    pub review_score: Option<f64>,
    pub comment_title: String,
    pub comment_message: String,
}

impl Review {
    pub fn new(
        review_id: String,
        order_id: String,
        review_score: Option<f64>,
        comment_title: Option<String>,
        comment_message: Option<String>,
    ) -> Self {
        Self {
            review_id,
            order_id,
            review_score,
            comment_title: comment_title.unwrap_or_else(|| NO_TITLE.to_string()),
            comment_message: comment_message.unwrap_or_else(|| NO_MESSAGE.to_string()),
        }
    }
}

/// Named delivery-time interval, ordered from fastest to slowest.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeliveryBucket {
    pub index: usize,
    pub label: String,
}

impl fmt::Display for DeliveryBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

/// One row of the delivered-orders/reviews left join.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewOrder {
    pub order: DeliveredOrder,
    pub review: Option<Review>,
    pub delivery_time_category: Option<DeliveryBucket>,
}

impl ReviewOrder {
    pub fn review_score(&self) -> Option<f64> {
        self.review.as_ref().and_then(|r| r.review_score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_supported_layouts() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 6)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap();
        assert_eq!(parse_timestamp("2024-01-06 10:30:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-06T10:30:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-06 10:30"), Some(expected));
        assert_eq!(parse_timestamp(" 2024-01-06T10:30 "), Some(expected));

        let midnight = NaiveDate::from_ymd_opt(2024, 1, 10)
            .unwrap()
            .and_time(NaiveTime::MIN);
        assert_eq!(parse_timestamp("2024-01-10"), Some(midnight));
    }

    #[test]
    fn unparsable_timestamps_become_none() {
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("not a date"), None);
        assert_eq!(parse_timestamp("2024-13-40"), None);
    }

    #[test]
    fn review_placeholders_fill_missing_comments() {
        let review = Review::new("r1".into(), "o1".into(), Some(4.0), None, Some("ok".into()));
        assert_eq!(review.comment_title, NO_TITLE);
        assert_eq!(review.comment_message, "ok");
    }

    #[test]
    fn status_labels_round_trip() {
        for status in DeliveryStatus::ALL {
            assert_eq!(DeliveryStatus::from_label(status.label()), Some(status));
        }
        assert_eq!(DeliveryStatus::from_label("OnTime"), None);
    }
}
