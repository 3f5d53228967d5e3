//! Metrics module for the application.
//!
//! - This module contains the global Prometheus registry.
//! - Defines specific metrics for the application.

pub mod server;
use lazy_static::lazy_static;
use prometheus::{
	Encoder, GaugeVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};

use crate::models::{Deposit, ProcessingStatus};

lazy_static! {
	// Global Prometheus registry.
	pub static ref REGISTRY: Registry = Registry::new();

	// Counter of deposits created by the scanner, per chain
	pub static ref DEPOSITS_DETECTED: IntCounterVec = {
		let counter = IntCounterVec::new(
			Opts::new("deposits_detected_total", "Number of deposits detected on chain"),
			&["chain"]
		).unwrap();
		REGISTRY.register(Box::new(counter.clone())).unwrap();
		counter
	};

	// Counter of failed scan passes, per chain
	pub static ref DEPOSIT_SCAN_ERRORS: IntCounterVec = {
		let counter = IntCounterVec::new(
			Opts::new("deposit_scan_errors_total", "Number of failed chain scans"),
			&["chain"]
		).unwrap();
		REGISTRY.register(Box::new(counter.clone())).unwrap();
		counter
	};

	// Counter of deposits credited to user balances
	pub static ref DEPOSITS_CREDITED: IntCounter = {
		let counter = IntCounter::new("deposits_credited_total", "Number of deposits credited").unwrap();
		REGISTRY.register(Box::new(counter.clone())).unwrap();
		counter
	};

	// Counter of deposits moved to FAILED
	pub static ref DEPOSITS_FAILED: IntCounter = {
		let counter = IntCounter::new("deposits_failed_total", "Number of deposits that failed").unwrap();
		REGISTRY.register(Box::new(counter.clone())).unwrap();
		counter
	};

	// Gauge of the scan cursor, per chain
	pub static ref CHAIN_LAST_SCANNED_BLOCK: GaugeVec = {
		let gauge = GaugeVec::new(
			Opts::new("chain_last_scanned_block", "Highest block fully scanned"),
			&["chain"]
		).unwrap();
		REGISTRY.register(Box::new(gauge.clone())).unwrap();
		gauge
	};

	// Gauge of stored deposits, per processing status
	pub static ref DEPOSITS_BY_STATUS: GaugeVec = {
		let gauge = GaugeVec::new(
			Opts::new("deposits_by_status", "Number of stored deposits per processing status"),
			&["status"]
		).unwrap();
		REGISTRY.register(Box::new(gauge.clone())).unwrap();
		gauge
	};
}

/// Gather all metrics and encode into the provided format.
pub fn gather_metrics() -> Result<Vec<u8>, Box<dyn std::error::Error>> {
	let encoder = TextEncoder::new();
	let metric_families = REGISTRY.gather();
	let mut buffer = Vec::new();
	encoder.encode(&metric_families, &mut buffer)?;
	Ok(buffer)
}

/// Recomputes the per-status deposit gauge
pub fn update_deposit_metrics(deposits: &[Deposit]) {
	DEPOSITS_BY_STATUS.reset();

	for status in [
		ProcessingStatus::Detected,
		ProcessingStatus::Confirming,
		ProcessingStatus::Confirmed,
		ProcessingStatus::Processing,
		ProcessingStatus::Credited,
		ProcessingStatus::Completed,
		ProcessingStatus::Failed,
	] {
		let count = deposits
			.iter()
			.filter(|d| d.processing_status == status)
			.count();
		DEPOSITS_BY_STATUS
			.with_label_values(&[status.to_string().as_str()])
			.set(count as f64);
	}
}
