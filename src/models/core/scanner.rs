use serde::{Deserialize, Serialize};

/// Default cron schedule: every 30 seconds
pub const DEFAULT_CRON_SCHEDULE: &str = "*/30 * * * * *";

/// Default upper bound on the number of blocks read in one scan pass
pub const DEFAULT_MAX_BLOCKS_PER_SCAN: u64 = 100;

/// HTTP endpoint of a downstream collaborator
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CollaboratorEndpoint {
	pub url: String,
	/// Shared secret used to sign requests with HMAC-SHA256
	#[serde(default)]
	pub secret: Option<String>,
	/// Ledger the mirrored transactions are recorded in
	#[serde(default)]
	pub ledger_id: Option<String>,
}

/// Runtime settings for deposit scanning and processing
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ScannerConfig {
	/// Cron expression (with seconds) driving the scan scheduler
	#[serde(default = "default_cron_schedule")]
	pub cron_schedule: String,
	/// Blocks behind the head that are never scanned
	#[serde(default)]
	pub confirmation_safety_margin: u64,
	/// Maximum number of blocks read per scan pass
	#[serde(default = "default_max_blocks_per_scan")]
	pub max_blocks_per_scan: u64,
	/// Transfers below this raw amount are ignored
	#[serde(default)]
	pub min_deposit_raw_amount: Option<u128>,
	/// Currency recorded on detected deposits
	#[serde(default = "default_currency")]
	pub currency: String,
	/// Directory for scan cursors and the deposit snapshot
	#[serde(default = "default_data_dir")]
	pub data_dir: String,
	#[serde(default)]
	pub crediting: Option<CollaboratorEndpoint>,
	#[serde(default)]
	pub mirroring: Option<CollaboratorEndpoint>,
}

fn default_cron_schedule() -> String {
	DEFAULT_CRON_SCHEDULE.to_string()
}

fn default_max_blocks_per_scan() -> u64 {
	DEFAULT_MAX_BLOCKS_PER_SCAN
}

fn default_currency() -> String {
	crate::models::USDC_CURRENCY.to_string()
}

fn default_data_dir() -> String {
	"data".to_string()
}

impl Default for ScannerConfig {
	fn default() -> Self {
		Self {
			cron_schedule: default_cron_schedule(),
			confirmation_safety_margin: 0,
			max_blocks_per_scan: default_max_blocks_per_scan(),
			min_deposit_raw_amount: None,
			currency: default_currency(),
			data_dir: default_data_dir(),
			crediting: None,
			mirroring: None,
		}
	}
}
