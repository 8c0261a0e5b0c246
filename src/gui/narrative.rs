//! Narrative Text
//! Sentences for the dashboard sections, built from the session aggregates.

use crate::data::DeliveryStatus;
use crate::session::Session;
use crate::stats::{DescriptiveStats, StatsCalculator};

/// Sentence describing how orders split across delivery statuses.
pub fn status_summary(session: &Session) -> String {
    if session.status_counts.is_empty() {
        return "No delivered orders with both delivery and estimated dates were found.".into();
    }

    format!(
        "{} orders arrived earlier than estimated, {} arrived late and {} arrived on the estimated date.",
        session.status_total(DeliveryStatus::Early),
        session.status_total(DeliveryStatus::Late),
        session.status_total(DeliveryStatus::OnTime),
    )
}

/// Sentence summarising the delivery-time distribution.
pub fn delivery_summary(stats: &DescriptiveStats) -> String {
    if stats.count == 0 {
        return "No orders have both a purchase and a customer delivery timestamp.".into();
    }

    format!(
        "Across {} orders the average delivery takes {:.0} days; the fastest arrived after {} days and the slowest after {} days.",
        stats.count, stats.mean, stats.min as i64, stats.max as i64
    )
}

/// Sentence interpreting the delivery-time/review-score correlation.
pub fn correlation_summary(r: f64) -> String {
    if r.is_nan() {
        return "The correlation is undefined: too few reviewed orders or no variation in one of the columns.".into();
    }

    let strength = StatsCalculator::correlation_strength(r);
    let trend = if r < 0.0 {
        "longer deliveries tend to come with lower review scores"
    } else {
        "longer deliveries tend to come with higher review scores"
    };
    format!("Delivery time has a {} correlation ({:.3}) with review score: {}.", strength, r, trend)
}

/// Closing bullet points answering the dashboard's three questions.
pub fn conclusions(session: &Session) -> Vec<String> {
    let leading = session
        .status_counts
        .first()
        .map(|c| match c.status {
            DeliveryStatus::Early => "most orders arrive earlier than the estimated date",
            DeliveryStatus::OnTime => "most orders arrive exactly on the estimated date",
            DeliveryStatus::Late => "most orders arrive after the estimated date",
        })
        .unwrap_or("no orders could be classified");

    let average = if session.delivery_stats.count > 0 {
        format!("the average delivery time is {:.0} days", session.delivery_stats.mean)
    } else {
        "no delivery times are available".to_string()
    };

    vec![
        format!("Do orders arrive as predicted? On average {}.", leading),
        format!("How long does delivery take? {}.", capitalize(&average)),
        format!(
            "Is delivery speed related to satisfaction? The relationship is {}.",
            StatsCalculator::correlation_strength(session.correlation())
        ),
    ]
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
