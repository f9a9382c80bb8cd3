mod cli;
mod config;
mod error;
mod exporter;
mod mindergas;
mod p1;

use clap::Parser;
use tracing::{error, info};

use cli::{Cli, Command};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::SyncMindergas => sync_mindergas(cli.config.as_deref()).await,
    }
}

/// Connect to the P1 meter and export the gas reading once a day.
async fn sync_mindergas(config_file: Option<&std::path::Path>) {
    let config = match config::Config::from_env(config_file) {
        Ok(c) => c,
        Err(e) => {
            error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let http = match reqwest::Client::builder().build() {
        Ok(c) => c,
        Err(e) => {
            error!("Could not create HTTP client: {}", e);
            std::process::exit(1);
        }
    };

    let exporter = exporter::Exporter::new(&config, http);

    // The meter must be reachable before we start waiting for the window
    let info = match exporter.p1().basic_information().await {
        Ok(info) => info,
        Err(e) => {
            error!("Could not retrieve data from the P1 meter: {}", e);
            std::process::exit(1);
        }
    };
    info!(
        "Successfully connected (ip={}, product={} [{}], serial={}, firmware={}, api={})",
        config.p1.ip,
        info.product_name,
        info.product_type,
        info.serial,
        info.firmware_version,
        info.api_version,
    );

    info!(
        "Exporting gas readings daily at {:02}:{:02} (poll every {}s, jitter {}-{} min)",
        config.export.hour,
        config.export.minute,
        config.export.poll_interval_secs,
        config.export.jitter_min_minutes,
        config.export.jitter_max_minutes,
    );

    tokio::select! {
        _ = exporter.run() => {}
        _ = tokio::signal::ctrl_c() => {
            info!("Received SIGINT, shutting down");
        }
        _ = async {
            let mut sigterm = tokio::signal::unix::signal(
                tokio::signal::unix::SignalKind::terminate()
            ).expect("Failed to register SIGTERM handler");
            sigterm.recv().await;
        } => {
            info!("Received SIGTERM, shutting down");
        }
    }
}
