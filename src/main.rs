//! India Air Quality Data Dashboard
//!
//! Loads the air quality CSV once at startup and explores it through
//! interactive selectors, pie charts and an SO2/NO2 line chart.

mod charts;
mod config;
mod data;
mod gui;
mod view;

use anyhow::{anyhow, Context};
use config::{DashboardConfig, CONFIG_FILE};
use data::DatasetLoader;
use eframe::egui;
use gui::DashboardApp;
use std::path::Path;
use view::{Dashboard, DASHBOARD_TITLE};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = DashboardConfig::load_or_default(Path::new(CONFIG_FILE))
        .with_context(|| format!("Failed to load {CONFIG_FILE}"))?;

    let mut loader = DatasetLoader::new(config.data_path.clone());
    let table = match loader.load() {
        Ok(table) => table,
        Err(e) => {
            log::error!("{e}");
            return Err(e).with_context(|| {
                format!("Could not load {}", loader.get_file_path().display())
            });
        }
    };

    if table.is_empty() {
        log::warn!("No readings with a valid date in {}", config.data_path.display());
    }

    let dashboard = Dashboard::new(table, &config);

    // Configure native options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([900.0, 600.0])
            .with_title(DASHBOARD_TITLE),
        ..Default::default()
    };

    eframe::run_native(
        DASHBOARD_TITLE,
        options,
        Box::new(|cc| Ok(Box::new(DashboardApp::new(cc, dashboard)))),
    )
    .map_err(|e| anyhow!("{e}"))
}
