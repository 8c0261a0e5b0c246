//! Delivery Insight - Order Delivery & Customer Satisfaction Dashboard
//!
//! Loads an orders dataset and its reviews, derives delivery status and
//! delivery time per order, and shows the aggregates in an interactive window.

pub mod charts;
pub mod cli;
pub mod config;
pub mod data;
pub mod gui;
pub mod session;
pub mod stats;

use std::{env, sync::OnceLock};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use eframe::egui;
use log::{info, LevelFilter};

use crate::charts::StaticChartRenderer;
use crate::cli::Cli;
use crate::config::SessionConfig;
use crate::gui::DashboardApp;
use crate::session::Session;

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("delivery_insight", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => SessionConfig::load(path)
            .with_context(|| format!("Loading session config from {path:?}"))?,
        None => SessionConfig::default(),
    }
    .with_paths(cli.orders.clone(), cli.reviews.clone());

    let session = Session::load(config)?;

    if cli.is_headless() {
        return export(&cli, &session);
    }
    show_dashboard(session)
}

fn export(cli: &Cli, session: &Session) -> Result<()> {
    if let Some(dir) = &cli.export_charts {
        let written = StaticChartRenderer::export_all(session, dir)
            .with_context(|| format!("Rendering charts into {dir:?}"))?;
        info!("Rendered {} charts into {:?}", written.len(), dir);
    }
    if let Some(path) = &cli.export_data {
        session.export_data(path)?;
    }
    Ok(())
}

fn show_dashboard(session: Session) -> Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([1000.0, 700.0])
            .with_title("Delivery Insight"),
        ..Default::default()
    };

    eframe::run_native(
        "Delivery Insight",
        options,
        Box::new(move |cc| Ok(Box::new(DashboardApp::new(cc, session)))),
    )
    .map_err(|e| anyhow!("Dashboard window failed: {e}"))
}
