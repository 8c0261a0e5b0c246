//! Delivery Insight Main Application
//! Main window with control panel and dashboard report.

use crate::charts::StaticChartRenderer;
use crate::gui::{ChartViewer, ControlPanel, ControlPanelAction};
use crate::session::Session;
use egui::SidePanel;
use log::{info, warn};

/// File name of the joined dataset written next to exported charts.
pub const EXPORTED_DATA_FILE: &str = "all_data.csv";

/// Main application window.
pub struct DashboardApp {
    session: Session,
    control_panel: ControlPanel,
    chart_viewer: ChartViewer,
}

impl DashboardApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, session: Session) -> Self {
        Self {
            control_panel: ControlPanel::new(&session),
            chart_viewer: ChartViewer::new(&session),
            session,
        }
    }

    /// Render charts and the joined dataset into a user-chosen folder.
    fn handle_export_charts(&mut self) {
        let Some(dir) = rfd::FileDialog::new().pick_folder() else {
            return; // User cancelled
        };

        let charts = match StaticChartRenderer::export_all(&self.session, &dir) {
            Ok(paths) => paths,
            Err(e) => {
                warn!("Chart export failed: {}", e);
                self.control_panel.set_status(&format!("Error: {}", e));
                return;
            }
        };

        if let Err(e) = self.session.export_data(&dir.join(EXPORTED_DATA_FILE)) {
            warn!("Data export failed: {:#}", e);
            self.control_panel.set_status(&format!("Error: {:#}", e));
            return;
        }

        info!("Exported {} charts to {}", charts.len(), dir.display());
        self.control_panel
            .set_status(&format!("Exported {} charts and data", charts.len()));

        if let Err(e) = open::that(&dir) {
            warn!("Could not open {}: {}", dir.display(), e);
        }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Left panel - Control Panel
        SidePanel::left("control_panel")
            .min_width(260.0)
            .max_width(320.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    match self.control_panel.show(ui) {
                        ControlPanelAction::ExportCharts => self.handle_export_charts(),
                        ControlPanelAction::None => {}
                    }
                });
            });

        // Central panel - Dashboard report
        egui::CentralPanel::default().show(ctx, |ui| {
            self.chart_viewer
                .show(ui, &self.session, self.control_panel.show_raw_data);
        });
    }
}
