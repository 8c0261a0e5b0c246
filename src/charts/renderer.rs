//! Static Chart Renderer
//! Renders the dashboard charts to PNG files for export.
//!
//! Charts:
//! 1. Order status bar chart with the count above each bar
//! 2. Delivery-time histogram with dashed mean and median lines
//! 3. Mean delivery time per review score

use crate::charts::{format_score, ChartPlotter};
use crate::session::Session;
use crate::stats::{DescriptiveStats, HistogramBin, ScoreSummary, StatusCount};
use image::RgbImage;
use log::info;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

// Colors
const STATUS_COLORS: [RGBColor; 3] = [
    RGBColor(0x0d, 0x62, 0xff),
    RGBColor(0x57, 0x92, 0xff),
    RGBColor(0x8a, 0xb3, 0xff),
];
const BAR_COLOR: RGBColor = RGBColor(0x57, 0x92, 0xff);
const MEAN_COLOR: RGBColor = RGBColor(220, 53, 69);
const MEDIAN_COLOR: RGBColor = RGBColor(40, 167, 69);

const FONT: &str = "sans-serif";

/// Output file names, one per chart.
pub const STATUS_CHART_FILE: &str = "status_counts.png";
pub const HISTOGRAM_FILE: &str = "delivery_time_distribution.png";
pub const SCORE_CHART_FILE: &str = "delivery_time_by_review_score.png";

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Drawing error: {0}")]
    Drawing(String),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Chart buffer does not match {0}x{1}")]
    Buffer(u32, u32),
}

fn drawing<E: std::error::Error + Send + Sync>(err: DrawingAreaErrorKind<E>) -> RenderError {
    RenderError::Drawing(err.to_string())
}

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Render all three charts into `dir` and return the written paths.
    pub fn export_all(session: &Session, dir: &Path) -> Result<Vec<PathBuf>, RenderError> {
        fs::create_dir_all(dir)?;
        let (width, height) = (session.config.chart_width, session.config.chart_height);

        let charts = [
            (
                STATUS_CHART_FILE,
                Self::render_status_chart(&session.status_counts, width, height)?,
            ),
            (
                HISTOGRAM_FILE,
                Self::render_histogram(&session.histogram, &session.delivery_stats, width, height)?,
            ),
            (
                SCORE_CHART_FILE,
                Self::render_score_chart(&session.scores, width, height)?,
            ),
        ];

        let mut written = Vec::with_capacity(charts.len());
        for (name, img) in charts {
            let path = dir.join(name);
            img.save(&path)?;
            info!("Wrote chart {}", path.display());
            written.push(path);
        }
        Ok(written)
    }

    /// Draw into an in-memory RGB buffer and wrap it as an image.
    fn render_with<F>(width: u32, height: u32, draw: F) -> Result<RgbImage, RenderError>
    where
        F: FnOnce(&DrawingArea<BitMapBackend, Shift>) -> Result<(), RenderError>,
    {
        let mut buffer = vec![0u8; (width as usize) * (height as usize) * 3];
        {
            let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
            root.fill(&WHITE).map_err(drawing)?;
            draw(&root)?;
            root.present().map_err(drawing)?;
        }
        RgbImage::from_raw(width, height, buffer).ok_or(RenderError::Buffer(width, height))
    }

    /// Label for a tick at the center of category `i` (positions `i + 0.5`).
    fn center_label(labels: &[String], x: f64) -> String {
        let shifted = x - 0.5;
        let idx = shifted.round();
        if (shifted - idx).abs() > 1e-6 || idx < 0.0 {
            return String::new();
        }
        labels.get(idx as usize).cloned().unwrap_or_default()
    }

    fn upper_bound(max: f64) -> f64 {
        if max > 0.0 {
            max * 1.15
        } else {
            1.0
        }
    }

    pub fn render_status_chart(
        counts: &[StatusCount],
        width: u32,
        height: u32,
    ) -> Result<RgbImage, RenderError> {
        let series = ChartPlotter::status_series(counts);
        let labels: Vec<String> = series.iter().map(|(s, _)| s.label().to_string()).collect();
        let max = series.iter().map(|(_, n)| *n).max().unwrap_or(0) as f64;

        Self::render_with(width, height, |root| {
            let n = series.len() as f64;
            let mut chart = ChartBuilder::on(root)
                .caption("Order Status", (FONT, 28))
                .margin(20)
                .x_label_area_size(40)
                .y_label_area_size(70)
                .build_cartesian_2d(0f64..n, 0f64..Self::upper_bound(max))
                .map_err(drawing)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .x_labels(series.len() * 2 + 1)
                .x_label_formatter(&|x| Self::center_label(&labels, *x))
                .y_desc("Orders")
                .draw()
                .map_err(drawing)?;

            chart
                .draw_series(series.iter().enumerate().map(|(i, (_, total))| {
                    let x = i as f64;
                    Rectangle::new(
                        [(x + 0.2, 0.0), (x + 0.8, *total as f64)],
                        STATUS_COLORS[i % STATUS_COLORS.len()].filled(),
                    )
                }))
                .map_err(drawing)?;

            let value_style = TextStyle::from((FONT, 16).into_font())
                .pos(Pos::new(HPos::Center, VPos::Bottom));
            chart
                .draw_series(series.iter().enumerate().map(|(i, (_, total))| {
                    Text::new(
                        total.to_string(),
                        (i as f64 + 0.5, *total as f64),
                        value_style.clone(),
                    )
                }))
                .map_err(drawing)?;
            Ok(())
        })
    }

    pub fn render_histogram(
        bins: &[HistogramBin],
        stats: &DescriptiveStats,
        width: u32,
        height: u32,
    ) -> Result<RgbImage, RenderError> {
        let (x_min, x_max) = match (bins.first(), bins.last()) {
            (Some(first), Some(last)) => (first.start, last.end),
            _ => (0.0, 1.0),
        };
        let max = bins.iter().map(|b| b.count).max().unwrap_or(0) as f64;

        Self::render_with(width, height, |root| {
            let y_max = Self::upper_bound(max);
            let mut chart = ChartBuilder::on(root)
                .caption("Delivery Time Distribution", (FONT, 28))
                .margin(20)
                .x_label_area_size(45)
                .y_label_area_size(70)
                .build_cartesian_2d(x_min..x_max, 0f64..y_max)
                .map_err(drawing)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .x_desc("Delivery Time (Days)")
                .y_desc("Frequency")
                .draw()
                .map_err(drawing)?;

            chart
                .draw_series(bins.iter().map(|bin| {
                    Rectangle::new(
                        [(bin.start, 0.0), (bin.end, bin.count as f64)],
                        BAR_COLOR.mix(0.6).filled(),
                    )
                }))
                .map_err(drawing)?;
            chart
                .draw_series(bins.iter().map(|bin| {
                    Rectangle::new([(bin.start, 0.0), (bin.end, bin.count as f64)], BLACK.stroke_width(1))
                }))
                .map_err(drawing)?;

            if stats.count > 0 {
                for (value, color, name) in [
                    (stats.mean, MEAN_COLOR, "Mean"),
                    (stats.median, MEDIAN_COLOR, "Median"),
                ] {
                    chart
                        .draw_series(DashedLineSeries::new(
                            vec![(value, 0.0), (value, y_max)],
                            8,
                            5,
                            color.stroke_width(2),
                        ))
                        .map_err(drawing)?
                        .label(format!("{} ({:.1})", name, value))
                        .legend(move |(x, y)| {
                            PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
                        });
                }

                chart
                    .configure_series_labels()
                    .background_style(&WHITE.mix(0.8))
                    .border_style(&BLACK)
                    .draw()
                    .map_err(drawing)?;
            }
            Ok(())
        })
    }

    pub fn render_score_chart(
        scores: &[ScoreSummary],
        width: u32,
        height: u32,
    ) -> Result<RgbImage, RenderError> {
        let labels: Vec<String> = scores.iter().map(|s| format_score(s.review_score)).collect();
        let max = scores
            .iter()
            .map(|s| s.mean_delivery_days)
            .filter(|v| v.is_finite())
            .fold(0.0, f64::max);

        Self::render_with(width, height, |root| {
            let n = scores.len().max(1) as f64;
            let mut chart = ChartBuilder::on(root)
                .caption("Mean Delivery Time by Review Score", (FONT, 28))
                .margin(20)
                .x_label_area_size(45)
                .y_label_area_size(70)
                .build_cartesian_2d(0f64..n, 0f64..Self::upper_bound(max))
                .map_err(drawing)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .x_labels(scores.len() * 2 + 1)
                .x_label_formatter(&|x| Self::center_label(&labels, *x))
                .x_desc("Review Score")
                .y_desc("Mean (Days)")
                .draw()
                .map_err(drawing)?;

            chart
                .draw_series(scores.iter().enumerate().map(|(i, s)| {
                    let x = i as f64;
                    Rectangle::new([(x + 0.2, 0.0), (x + 0.8, s.mean_delivery_days)], BAR_COLOR.filled())
                }))
                .map_err(drawing)?;
            Ok(())
        })
    }
}
