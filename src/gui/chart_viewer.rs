//! Chart Viewer Widget
//! Central scrollable report: data preview, status, delivery time and
//! satisfaction sections followed by the conclusions.

use crate::charts::{format_score, format_value, ChartPlotter};
use crate::data::ReviewOrder;
use crate::gui::narrative;
use crate::session::Session;
use chrono::NaiveDateTime;
use egui::{RichText, ScrollArea};

const SECTION_SPACING: f32 = 20.0;

const PREVIEW_HEADERS: [&str; 8] = [
    "order_id",
    "purchased",
    "delivered",
    "estimated",
    "status",
    "delivery_time_days",
    "review_score",
    "delivery_time_category",
];

/// Scrollable dashboard body.
pub struct ChartViewer {
    /// Preview rows are sampled once per session.
    preview: Vec<Vec<String>>,
}

impl ChartViewer {
    pub fn new(session: &Session) -> Self {
        Self {
            preview: session.preview().iter().map(preview_row).collect(),
        }
    }

    pub fn show(&self, ui: &mut egui::Ui, session: &Session, show_raw_data: bool) {
        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.heading(RichText::new("Delivery and Customer Satisfaction Analysis ✨").size(26.0));
                ui.label(RichText::new("E-commerce order deliveries and reviews").italics());
                ui.add_space(SECTION_SPACING);

                if show_raw_data {
                    ChartPlotter::draw_table(ui, "preview_table", &PREVIEW_HEADERS, &self.preview);
                    ui.add_space(SECTION_SPACING);
                }

                Self::status_section(ui, session);
                ui.add_space(SECTION_SPACING);
                Self::delivery_section(ui, session);
                ui.add_space(SECTION_SPACING);
                Self::satisfaction_section(ui, session);
                ui.add_space(SECTION_SPACING);
                Self::conclusion_section(ui, session);
            });
    }

    fn status_section(ui: &mut egui::Ui, session: &Session) {
        ui.heading("Order Status");
        ui.label(narrative::status_summary(session));
        ui.add_space(8.0);

        let rows: Vec<Vec<String>> = session
            .status_counts
            .iter()
            .map(|c| vec![c.status.label().to_string(), c.orders.to_string()])
            .collect();
        ChartPlotter::draw_table(ui, "status_table", &["status", "order_id"], &rows);
        ui.add_space(8.0);
        ChartPlotter::draw_status_chart(ui, &session.status_counts);
    }

    fn delivery_section(ui: &mut egui::Ui, session: &Session) {
        ui.heading("Delivery Time");
        ui.label(
            "Delivery time is the number of whole days between order_purchase_timestamp \
             and order_delivered_customer_date, stored as delivery_time_days.",
        );
        ui.add_space(8.0);

        let rows: Vec<Vec<String>> = session
            .delivery_stats
            .rows()
            .iter()
            .map(|(label, value)| vec![label.to_string(), format_value(*value)])
            .collect();
        ChartPlotter::draw_table(ui, "delivery_describe", &["", "delivery_time_days"], &rows);
        ui.add_space(8.0);
        ui.label(narrative::delivery_summary(&session.delivery_stats));
        ui.add_space(8.0);
        ChartPlotter::draw_histogram(ui, &session.histogram, &session.delivery_stats);
    }

    fn satisfaction_section(ui: &mut egui::Ui, session: &Session) {
        ui.heading("Delivery Time vs Customer Satisfaction");
        ui.label(
            "Correlation between delivery_time_days and review_score over reviewed orders:",
        );
        ui.add_space(8.0);

        let m = session.correlation_matrix;
        let matrix = vec![
            vec!["delivery_time_days".to_string(), format_value(m[0][0]), format_value(m[0][1])],
            vec!["review_score".to_string(), format_value(m[1][0]), format_value(m[1][1])],
        ];
        ChartPlotter::draw_table(
            ui,
            "correlation_matrix",
            &["", "delivery_time_days", "review_score"],
            &matrix,
        );
        ui.add_space(8.0);
        ui.label(narrative::correlation_summary(session.correlation()));
        ui.add_space(8.0);

        let categories: Vec<Vec<String>> = session
            .categories
            .iter()
            .map(|c| {
                vec![
                    c.bucket.label.clone(),
                    format_value(c.mean_review_score),
                    c.count.to_string(),
                ]
            })
            .collect();
        ChartPlotter::draw_table(
            ui,
            "category_table",
            &["delivery_time_category", "review_score", "order_id"],
            &categories,
        );
        ui.add_space(8.0);

        ui.label(RichText::new("Mean Delivery Time by Review Score").strong());
        ChartPlotter::draw_score_chart(ui, &session.scores);
    }

    fn conclusion_section(ui: &mut egui::Ui, session: &Session) {
        ui.heading("Conclusions");
        for bullet in narrative::conclusions(session) {
            ui.label(format!("• {}", bullet));
        }
    }
}

fn preview_row(row: &ReviewOrder) -> Vec<String> {
    let fmt = |ts: Option<NaiveDateTime>| {
        ts.map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string())
    };
    let order = &row.order;
    vec![
        order.order_id.clone(),
        fmt(order.purchase_timestamp),
        fmt(order.delivered_customer_date),
        fmt(order.estimated_delivery_date),
        order.status.map(|s| s.label().to_string()).unwrap_or_else(|| "-".into()),
        order.delivery_time_days.map(|d| d.to_string()).unwrap_or_else(|| "-".into()),
        row.review_score().map(format_score).unwrap_or_else(|| "-".into()),
        row.delivery_time_category
            .as_ref()
            .map(|b| b.label.clone())
            .unwrap_or_else(|| "-".into()),
    ]
}
