use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default number of decimals for USDC on EVM chains
pub const DEFAULT_USDC_DECIMALS: u32 = 6;

/// Default number of confirmations before a deposit is considered final
pub const DEFAULT_REQUIRED_CONFIRMATIONS: u64 = 12;

/// RPC endpoint configuration for a chain
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RpcUrl {
	/// Endpoint type, currently only "rpc" is supported
	pub type_: String,
	/// Endpoint URL
	pub url: String,
	/// Priority of the endpoint (0-100, higher is preferred)
	pub weight: u32,
}

/// Configuration and scan state of a monitored chain
///
/// Chains are owned by configuration. The only field mutated at runtime is
/// `last_scanned_block`, which is advanced by the deposit scanner and never moves
/// backwards.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Chain {
	/// Numeric chain id (e.g. 1 for Ethereum mainnet, 137 for Polygon)
	pub chain_id: u64,
	/// Unique slug used in file names and metric labels
	pub name: String,
	/// RPC endpoints for reading chain state
	pub rpc_urls: Vec<RpcUrl>,
	/// Address of the USDC token contract on this chain
	pub usdc_token_address: String,
	/// Decimal precision of the token
	#[serde(default = "default_usdc_decimals")]
	pub usdc_decimals: u32,
	/// Confirmations required before a deposit is credited
	#[serde(default = "default_required_confirmations")]
	pub required_confirmations: u64,
	/// Whether the chain is scanned
	#[serde(default = "default_is_active")]
	pub is_active: bool,
	/// Highest block fully processed by the scanner
	#[serde(default)]
	pub last_scanned_block: u64,
	#[serde(default = "Utc::now")]
	pub created_at: DateTime<Utc>,
}

fn default_usdc_decimals() -> u32 {
	DEFAULT_USDC_DECIMALS
}

fn default_required_confirmations() -> u64 {
	DEFAULT_REQUIRED_CONFIRMATIONS
}

fn default_is_active() -> bool {
	true
}

impl Chain {
	/// Token contract address normalized to lowercase for comparisons
	pub fn token_address(&self) -> String {
		self.usdc_token_address.to_lowercase()
	}
}
