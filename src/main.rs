mod app;
mod checkins;
mod config;
mod cron;
mod error;
mod form;
mod logging;
mod model;
mod services;
mod theme;
mod ui;
mod widgets;

use anyhow::Result;

fn main() -> Result<()> {
    let cfg = config::load_config()?;
    if let Some(dir) = &cfg.log_dir {
        logging::init_logging(dir);
    }
    tracing::info!(
        "monitor-tui {} against {}",
        env!("CARGO_PKG_VERSION"),
        cfg.api.base_url
    );
    ui::run(cfg)
}
