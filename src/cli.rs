//! Command Line Interface
//! Input paths, config file and headless export flags.

use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Order delivery and customer satisfaction dashboard"
)]
pub struct Cli {
    /// Orders CSV (overrides the config file)
    #[arg(long)]
    pub orders: Option<PathBuf>,
    /// Order reviews CSV (overrides the config file)
    #[arg(long)]
    pub reviews: Option<PathBuf>,
    /// JSON session configuration
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Render the charts as PNG files into this directory and exit
    #[arg(long, value_name = "DIR")]
    pub export_charts: Option<PathBuf>,
    /// Write the joined orders/reviews dataset to this CSV and exit
    #[arg(long, value_name = "CSV")]
    pub export_data: Option<PathBuf>,
}

impl Cli {
    /// True when any export flag asks for a run without the window.
    pub fn is_headless(&self) -> bool {
        self.export_charts.is_some() || self.export_data.is_some()
    }
}
