//! Chart Plotter Module
//! Creates the interactive dashboard charts and tables using egui_plot.

use crate::data::DeliveryStatus;
use crate::stats::{DescriptiveStats, HistogramBin, ScoreSummary, StatusCount};
use egui::{Color32, RichText};
use egui_plot::{Bar, BarChart, Legend, LineStyle, Plot, PlotPoint, Text, VLine};

/// Bar colors for Early, On Time and Late.
pub const STATUS_COLORS: [Color32; 3] = [
    Color32::from_rgb(0x0d, 0x62, 0xff),
    Color32::from_rgb(0x57, 0x92, 0xff),
    Color32::from_rgb(0x8a, 0xb3, 0xff),
];

pub const BAR_COLOR: Color32 = Color32::from_rgb(0x57, 0x92, 0xff);
pub const MEAN_COLOR: Color32 = Color32::from_rgb(220, 53, 69); // Red
pub const MEDIAN_COLOR: Color32 = Color32::from_rgb(40, 167, 69); // Green

const CHART_HEIGHT: f32 = 320.0;

/// Creates the dashboard's interactive charts using egui_plot.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Counts in Early, On Time, Late order with missing statuses as zero.
    pub fn status_series(counts: &[StatusCount]) -> Vec<(DeliveryStatus, usize)> {
        DeliveryStatus::ALL
            .iter()
            .map(|status| {
                let total = counts
                    .iter()
                    .find(|c| c.status == *status)
                    .map(|c| c.orders)
                    .unwrap_or(0);
                (*status, total)
            })
            .collect()
    }

    /// Map an axis position back to a category label.
    fn category_label(labels: &[String], value: f64) -> String {
        let idx = value.round();
        if (value - idx).abs() > 1e-6 || idx < 0.0 {
            return String::new();
        }
        labels.get(idx as usize).cloned().unwrap_or_default()
    }

    /// Bar chart of distinct orders per delivery status, value printed on each bar.
    pub fn draw_status_chart(ui: &mut egui::Ui, counts: &[StatusCount]) {
        let series = Self::status_series(counts);
        let labels: Vec<String> = series.iter().map(|(s, _)| s.label().to_string()).collect();

        let bars: Vec<Bar> = series
            .iter()
            .enumerate()
            .map(|(i, (status, total))| {
                Bar::new(i as f64, *total as f64)
                    .name(status.label())
                    .fill(STATUS_COLORS[i % STATUS_COLORS.len()])
                    .width(0.6)
            })
            .collect();

        Plot::new("status_chart")
            .height(CHART_HEIGHT)
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .include_y(0.0)
            .y_axis_label("Orders")
            .x_axis_formatter(move |mark, _range| Self::category_label(&labels, mark.value))
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(bars));
                for (i, (_, total)) in series.iter().enumerate() {
                    plot_ui.text(
                        Text::new(PlotPoint::new(i as f64, *total as f64), total.to_string())
                            .anchor(egui::Align2::CENTER_BOTTOM),
                    );
                }
            });
    }

    /// Delivery-time histogram with dashed mean and median markers.
    pub fn draw_histogram(ui: &mut egui::Ui, bins: &[HistogramBin], stats: &DescriptiveStats) {
        let bars: Vec<Bar> = bins
            .iter()
            .map(|bin| {
                Bar::new(bin.center(), bin.count as f64)
                    .width(bin.width())
                    .fill(BAR_COLOR.gamma_multiply(0.6))
                    .stroke(egui::Stroke::new(1.0, Color32::BLACK))
            })
            .collect();

        Plot::new("delivery_histogram")
            .height(CHART_HEIGHT)
            .allow_scroll(false)
            .include_y(0.0)
            .x_axis_label("Delivery Time (Days)")
            .y_axis_label("Frequency")
            .legend(Legend::default())
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(bars).name("Orders"));
                if stats.count > 0 {
                    plot_ui.vline(
                        VLine::new(stats.mean)
                            .color(MEAN_COLOR)
                            .style(LineStyle::dashed_loose())
                            .name(format!("Mean ({:.1})", stats.mean)),
                    );
                    plot_ui.vline(
                        VLine::new(stats.median)
                            .color(MEDIAN_COLOR)
                            .style(LineStyle::dashed_loose())
                            .name(format!("Median ({:.1})", stats.median)),
                    );
                }
            });
    }

    /// Mean delivery days for each review score.
    pub fn draw_score_chart(ui: &mut egui::Ui, scores: &[ScoreSummary]) {
        let labels: Vec<String> = scores.iter().map(|s| format_score(s.review_score)).collect();
        let bars: Vec<Bar> = scores
            .iter()
            .enumerate()
            .map(|(i, s)| {
                Bar::new(i as f64, s.mean_delivery_days)
                    .name(format!("Score {}", format_score(s.review_score)))
                    .fill(BAR_COLOR)
                    .width(0.6)
            })
            .collect();

        Plot::new("score_chart")
            .height(CHART_HEIGHT)
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .include_y(0.0)
            .x_axis_label("Review Score")
            .y_axis_label("Mean (Days)")
            .x_axis_formatter(move |mark, _range| Self::category_label(&labels, mark.value))
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(bars));
            });
    }

    /// Draw a striped table with a header row.
    pub fn draw_table(ui: &mut egui::Ui, id: &str, headers: &[&str], rows: &[Vec<String>]) {
        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                egui::Grid::new(ui.make_persistent_id(id))
                    .striped(true)
                    .min_col_width(55.0)
                    .spacing([12.0, 4.0])
                    .show(ui, |ui| {
                        for header in headers {
                            ui.label(RichText::new(*header).strong().size(12.0));
                        }
                        ui.end_row();

                        for row in rows {
                            for cell in row {
                                ui.label(RichText::new(cell).size(12.0));
                            }
                            ui.end_row();
                        }
                    });
            });
    }
}

/// Review scores are whole numbers in practice; keep decimals only when present.
pub fn format_score(score: f64) -> String {
    if score.fract() == 0.0 {
        format!("{}", score as i64)
    } else {
        format!("{:.1}", score)
    }
}

/// Fixed-precision number, "NaN" for undefined values.
pub fn format_value(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else {
        format!("{:.3}", value)
    }
}
