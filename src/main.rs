use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use eframe::egui;
use itu_web_archive::app::TimetableApp;
use itu_web_archive::config::AppConfig;
use itu_web_archive::data::fetch::HttpFetcher;

fn main() -> Result<()> {
    env_logger::init();

    let config = AppConfig::load().context("loading configuration")?;
    log::info!("Using archive at {}", config.base_url);
    let fetcher = Arc::new(HttpFetcher::new(config.request_timeout())?);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([720.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "ITU Web Archive",
        options,
        Box::new(move |cc| Ok(Box::new(TimetableApp::new(cc, config, fetcher)))),
    )
    .map_err(|e| anyhow!("running UI: {e}"))
}
