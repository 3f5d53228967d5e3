use alloy::primitives::U256;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A token transfer observed on chain
///
/// Addresses and hashes are lowercase. Transfers returned by a chain reader are
/// ordered by `(block_number, log_index)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenTransfer {
	pub tx_hash: String,
	pub from_address: String,
	pub to_address: String,
	pub token_address: String,
	/// Amount in the token's smallest unit
	pub raw_amount: U256,
	pub block_number: u64,
	pub block_hash: Option<String>,
	pub block_timestamp: Option<DateTime<Utc>>,
	/// Position of the log within its block
	pub log_index: u64,
}

impl TokenTransfer {
	/// Ordering key used for deterministic replay
	pub fn position(&self) -> (u64, u64) {
		(self.block_number, self.log_index)
	}
}
