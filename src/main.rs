use clap::{Args, Parser};
use std::path::PathBuf;
use tracing::{error, info};

use fleet_monitor::{logging::setup_logging, monitor::run_until, FleetMonitor, MonitorConfig};

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Args)]
struct CommonArgs {
    /// Path to the config file; layered config/ directory loading when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Device roster file, overrides stats.roster_path
    #[arg(short, long)]
    roster: Option<PathBuf>,

    /// Dump default config and exit
    #[arg(long = "dump-default-config")]
    dump_default: bool,
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.common.dump_default {
        let config = MonitorConfig::default();
        println!("{}", serde_yaml::to_string(&config)?);
        return Ok(());
    }

    let mut config = match cli.common.config {
        Some(path) => MonitorConfig::from_file(path)?,
        None => MonitorConfig::new()?,
    };

    if let Some(roster) = cli.common.roster {
        config.stats.roster_path = roster;
    }

    let _log_guard = setup_logging(&config.logging)?;

    info!("Starting fleet-monitor {}", env!("CARGO_PKG_VERSION"));

    let monitor = FleetMonitor::new(config).await?;
    run_until(&monitor, shutdown_signal()).await?;

    Ok(())
}
