//! Control Panel Widget
//! Left side panel with session inputs, display toggles and export.

use crate::session::Session;
use egui::{Color32, RichText};
use std::path::Path;

/// Left side control panel with session summary and actions.
pub struct ControlPanel {
    pub show_raw_data: bool,
    pub status: String,
    orders_file: String,
    reviews_file: String,
    summary: Vec<(&'static str, usize)>,
}

impl ControlPanel {
    pub fn new(session: &Session) -> Self {
        Self {
            show_raw_data: session.config.show_raw_data,
            status: "Ready".to_string(),
            orders_file: file_label(&session.config.orders_path),
            reviews_file: file_label(&session.config.reviews_path),
            summary: vec![
                ("Order rows", session.raw_order_count),
                ("Delivered orders", session.orders.len()),
                ("Review rows", session.raw_review_count),
                ("Joinable reviews", session.review_count),
                ("Joined rows", session.joined.len()),
            ],
        }
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("📦 Delivery Insight")
                    .size(22.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Data Source Section =====
        ui.label(RichText::new("📁 Data Source").size(14.0).strong());
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.label(RichText::new(format!("Orders: {}", self.orders_file)).size(12.0));
                ui.label(RichText::new(format!("Reviews: {}", self.reviews_file)).size(12.0));
                ui.add_space(5.0);
                egui::Grid::new("session_summary")
                    .num_columns(2)
                    .spacing([12.0, 2.0])
                    .show(ui, |ui| {
                        for (label, value) in &self.summary {
                            ui.label(RichText::new(*label).size(11.0).color(Color32::GRAY));
                            ui.label(RichText::new(value.to_string()).size(11.0));
                            ui.end_row();
                        }
                    });
            });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Display Section =====
        ui.label(RichText::new("⚙️ Display").size(14.0).strong());
        ui.add_space(5.0);
        ui.checkbox(&mut self.show_raw_data, "Show data");

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Export =====
        ui.vertical_centered(|ui| {
            let button = egui::Button::new(RichText::new("🖼 Export Charts").size(14.0))
                .min_size(egui::vec2(180.0, 30.0));
            if ui.add(button).clicked() {
                action = ControlPanelAction::ExportCharts;
            }
        });

        ui.add_space(10.0);

        let status_color = if self.status.starts_with("Error") {
            Color32::from_rgb(220, 53, 69)
        } else if self.status.starts_with("Exported") {
            Color32::from_rgb(40, 167, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        action
    }

    pub fn set_status(&mut self, status: &str) {
        self.status = status.to_string();
    }
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    ExportCharts,
}
