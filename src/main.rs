mod config;
mod error;
mod monitor;
mod report;
mod status;

#[cfg(test)]
mod mock_collector;

use anyhow::{Context, Result};
use clap::Parser;
use monitor::Monitor;
use report::UsageReporter;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "bwguard")]
#[command(about = "Bandwidth usage reporting for OpenVPN servers", long_about = None)]
struct Args {
    /// Config file path
    #[arg(short, long, default_value = "bwguard.toml")]
    config: String,

    /// Collector endpoint URL
    #[arg(long, env = "BWGUARD_API_ENDPOINT")]
    api_endpoint: Option<String>,

    /// Collector API key
    #[arg(long, env = "BWGUARD_API_KEY")]
    api_key: Option<String>,

    /// Poll period in seconds
    #[arg(long, env = "BWGUARD_PERIOD")]
    period: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let mut cfg = config::Config::load(&args.config)?;

    // Override with command line arguments
    if let Some(api_endpoint) = args.api_endpoint {
        cfg.api_endpoint = api_endpoint;
    }
    if let Some(api_key) = args.api_key {
        cfg.api_key = api_key;
    }
    if let Some(period) = args.period {
        cfg.period_secs = period;
    }

    // Initialize tracing once configuration is available
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(format!("bwguard={}", cfg.log_level))),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting bwguard, reporting to: {}", cfg.api_endpoint);

    let period = Duration::from_secs(cfg.period_secs);
    let timeout = Duration::from_secs(cfg.report_timeout_secs);

    // One monitor per status file, each owning its own reporter and state
    let tcp_monitor = {
        let reporter = UsageReporter::new(cfg.api_endpoint.clone(), cfg.api_key.clone(), timeout)
            .context("Cannot build reporter for the TCP monitor")?;
        let monitor = Monitor::new("tcp", cfg.tcp_status_file.clone(), period, reporter);
        tokio::spawn(monitor.run())
    };

    let udp_monitor = {
        let reporter = UsageReporter::new(cfg.api_endpoint.clone(), cfg.api_key.clone(), timeout)
            .context("Cannot build reporter for the UDP monitor")?;
        let monitor = Monitor::new("udp", cfg.udp_status_file.clone(), period, reporter);
        tokio::spawn(monitor.run())
    };

    info!("Bandwidth monitors started");

    // Wait for both monitors or shutdown signal
    tokio::select! {
        _ = tcp_monitor => {
            error!("TCP status monitor stopped");
        }
        _ = udp_monitor => {
            error!("UDP status monitor stopped");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal");
        }
    }

    info!("Shutting down bwguard");
    Ok(())
}
