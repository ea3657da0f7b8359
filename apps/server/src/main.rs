//! Gas Monitor
//!
//! Polls the Etherscan gas oracle and emails an alert when the safe gas price
//! drops to the configured threshold.

mod config;
mod monitor;

use config::MonitorConfig;
use gas_alerts::SendGridMailer;
use gas_feeds::EtherscanClient;
use monitor::GasMonitor;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");
}

/// Log a fatal startup error and exit.
fn fatal(message: &str, error: &dyn std::error::Error) -> ! {
    error!(error = %error, "{}", message);
    std::process::exit(1);
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Load .env file if present
    let dotenv = dotenvy::dotenv();

    init_logging();

    match dotenv {
        Ok(path) => debug!(path = %path.display(), "Loaded .env file"),
        Err(e) if e.not_found() => debug!("No .env file, using process environment"),
        Err(e) => fatal("Error loading .env file", &e),
    }

    let config = match MonitorConfig::from_env() {
        Ok(config) => config,
        Err(e) => fatal("Invalid configuration", &e),
    };

    let oracle = match EtherscanClient::new(config.oracle.clone()) {
        Ok(client) => client,
        Err(e) => fatal("Failed to build gas oracle client", &e),
    };
    let mailer = match SendGridMailer::new(config.email.clone()) {
        Ok(mailer) => mailer,
        Err(e) => fatal("Failed to build email client", &e),
    };

    info!("⛽ Gas Monitor starting...");
    info!("  Threshold: {}", config.monitor.threshold);
    info!("  Alert recipient: {}", config.email.to_email);

    let monitor = GasMonitor::new(Arc::new(oracle), Arc::new(mailer), config.monitor);

    tokio::select! {
        _ = monitor.run() => {}
        _ = shutdown_signal() => warn!("Shutdown signal received"),
    }

    info!("👋 Gas Monitor stopped");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
}
