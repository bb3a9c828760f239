//! Binary entry point: resolve configuration, start file logging, move the
//! HTTP backend onto its worker thread, and drive the Ratatui event loop
//! until the user exits.
use anyhow::Context;
use clap::Parser;
use tracing::info;

use onimix_dashboard::logging::init_tracing;
use onimix_dashboard::worker::Worker;
use onimix_dashboard::{run_app, App, Cli, Config, HttpBackend};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load(&cli).context("failed to load configuration")?;
    init_tracing(&config.log_file)?;
    info!(
        backend = %config.backend_url,
        config_file = ?config.source,
        "starting onimix-dashboard"
    );

    let backend = HttpBackend::new(&config.backend_url, config.timeout)
        .context("failed to set up backend client")?;
    let worker = Worker::spawn(backend)?;

    let mut app = App::new(worker, config.export_dir.clone());
    let result = run_app(&mut app);
    info!("onimix-dashboard exiting");
    result
}
