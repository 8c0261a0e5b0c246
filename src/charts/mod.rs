//! Charts module - Interactive and static chart rendering

mod plotter;
mod renderer;

pub use plotter::{format_score, format_value, ChartPlotter};
pub use renderer::{
    RenderError, StaticChartRenderer, HISTOGRAM_FILE, SCORE_CHART_FILE, STATUS_CHART_FILE,
};
