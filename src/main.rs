//! Deposit monitor entry point.
//!
//! Loads the configuration directory, wires the services and runs the scan
//! scheduler until Ctrl+C. With `--once` a single scan tick runs and the process
//! exits.
//!
//! # Flow
//! 1. Apply CLI flags to unset environment variables, then set up logging
//! 2. Load chains, deposit addresses, scanner settings and persisted state
//! 3. Optionally start the metrics server
//! 4. Start the cron-driven scan scheduler
//! 5. On shutdown, stop the scheduler and let running scans finish

use deposit_monitor::{
	bootstrap::{initialize_services, Result},
	services::scheduler::ChainScanOutcome,
	utils::{logging::setup_logging, metrics::server::create_metrics_server},
};

use clap::{Arg, Command};
use dotenvy::dotenv;
use std::{
	env::{set_var, var},
	path::PathBuf,
};
use tracing::{error, info};

const DEFAULT_METRICS_ADDRESS: &str = "127.0.0.1:8081";

fn cli() -> Command {
	Command::new("deposit-monitor")
		.version(env!("CARGO_PKG_VERSION"))
		.about(
			"Watches configured chains for USDC deposits to user addresses and drives them \
			 through confirmation, crediting and ledger mirroring.",
		)
		.arg(
			Arg::new("log-file")
				.long("log-file")
				.help("Write logs to file instead of stdout")
				.action(clap::ArgAction::SetTrue),
		)
		.arg(
			Arg::new("log-level")
				.long("log-level")
				.help("Set log level (trace, debug, info, warn, error)")
				.value_name("LEVEL"),
		)
		.arg(
			Arg::new("log-path")
				.long("log-path")
				.help("Path to store log files (default: logs/)")
				.value_name("PATH"),
		)
		.arg(
			Arg::new("metrics")
				.long("metrics")
				.help("Enable metrics server")
				.action(clap::ArgAction::SetTrue),
		)
		.arg(
			Arg::new("metrics-address")
				.long("metrics-address")
				.help("Address to start the metrics server on (default: 127.0.0.1:8081)")
				.value_name("HOST:PORT"),
		)
		.arg(
			Arg::new("config-dir")
				.long("config-dir")
				.help("Configuration directory (default: config/)")
				.value_name("PATH")
				.default_value("config"),
		)
		.arg(
			Arg::new("once")
				.long("once")
				.help("Run a single scan of every active chain and exit")
				.action(clap::ArgAction::SetTrue),
		)
}

/// Copies a CLI value into an environment variable unless it is already set
fn set_env_if_unset(key: &str, value: &str) {
	if var(key).is_err() {
		set_var(key, value);
	}
}

fn log_outcomes(outcomes: &[(u64, ChainScanOutcome)]) {
	for (chain_id, outcome) in outcomes {
		match outcome {
			ChainScanOutcome::Ran { scan, .. } => match scan {
				Ok(report) => info!(
					"Chain {}: range {:?}, {} deposits created, {} confirmed",
					chain_id, report.range, report.deposits_created, report.deposits_confirmed
				),
				Err(e) => error!("Chain {}: scan failed: {}", chain_id, e),
			},
			ChainScanOutcome::Skipped => info!("Chain {}: skipped", chain_id),
			ChainScanOutcome::Aborted(e) => error!("Chain {}: aborted: {}", chain_id, e),
		}
	}
}

#[tokio::main]
async fn main() -> Result<()> {
	let matches = cli().get_matches();

	dotenv().ok();

	// CLI options only fill environment variables that are not already set
	if matches.get_flag("log-file") {
		set_env_if_unset("LOG_MODE", "file");
	}
	if let Some(level) = matches.get_one::<String>("log-level") {
		set_env_if_unset("LOG_LEVEL", level);
	}
	if let Some(path) = matches.get_one::<String>("log-path") {
		set_env_if_unset("LOG_DATA_DIR", path);
	}

	setup_logging().unwrap_or_else(|e| {
		eprintln!("Failed to setup logging: {}", e);
	});

	let config_dir = matches
		.get_one::<String>("config-dir")
		.map(PathBuf::from)
		.unwrap_or_else(|| PathBuf::from("config"));

	let services = initialize_services(&config_dir).await.map_err(|e| {
		error!(
			"Failed to initialize services from {}: {}",
			config_dir.display(),
			e
		);
		e
	})?;

	if matches.get_flag("once") {
		let outcomes = services.scheduler.tick().await;
		log_outcomes(&outcomes);
		return Ok(());
	}

	let metrics_enabled =
		matches.get_flag("metrics") || var("METRICS_ENABLED").map(|v| v == "true").unwrap_or(false);
	let metrics_address = matches
		.get_one::<String>("metrics-address")
		.cloned()
		.or_else(|| var("METRICS_ADDRESS").ok())
		.unwrap_or_else(|| DEFAULT_METRICS_ADDRESS.to_string());

	let metrics_server = if metrics_enabled {
		match create_metrics_server(metrics_address, services.deposits.clone()) {
			Ok(server) => Some(server),
			Err(e) => {
				error!("Failed to create metrics server: {}", e);
				None
			}
		}
	} else {
		info!("Metrics server disabled. Use --metrics flag or METRICS_ENABLED=true to enable");
		None
	};

	services.scheduler.start().await?;
	info!("Service started. Press Ctrl+C to shutdown");

	let ctrl_c = tokio::signal::ctrl_c();
	if let Some(metrics_future) = metrics_server {
		tokio::select! {
			result = ctrl_c => {
				if let Err(e) = result {
					error!("Error waiting for Ctrl+C: {}", e);
				}
				info!("Shutdown signal received, stopping services...");
			}
			result = metrics_future => {
				if let Err(e) = result {
					error!("Metrics server error: {}", e);
				}
				info!("Metrics server stopped, shutting down services...");
			}
		}
	} else {
		if let Err(e) = ctrl_c.await {
			error!("Error waiting for Ctrl+C: {}", e);
		}
		info!("Shutdown signal received, stopping services...");
	}

	services.scheduler.stop().await?;
	info!("Shutdown complete");
	Ok(())
}
