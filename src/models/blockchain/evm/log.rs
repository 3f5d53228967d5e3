//! EVM log data structures.

use alloy::primitives::U256;
use serde::{Deserialize, Serialize};

use crate::{
	models::TokenTransfer,
	utils::parsing::{parse_hex_u64, topic_to_address},
};

/// Keccak-256 of `Transfer(address,address,uint256)`
pub const TRANSFER_EVENT_TOPIC: &str =
	"0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef";

/// A log entry as returned by `eth_getLogs`
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Log {
	pub address: String,
	pub topics: Vec<String>,
	pub data: String,
	pub block_number: Option<String>,
	pub block_hash: Option<String>,
	/// Not a standard JSON-RPC field, but returned by several node implementations
	pub block_timestamp: Option<String>,
	pub transaction_hash: Option<String>,
	pub transaction_index: Option<String>,
	pub log_index: Option<String>,
	#[serde(default)]
	pub removed: bool,
}

impl Log {
	pub fn block_number(&self) -> Option<u64> {
		self.block_number
			.as_deref()
			.and_then(|n| parse_hex_u64(n).ok())
	}

	pub fn log_index(&self) -> Option<u64> {
		self.log_index.as_deref().and_then(|n| parse_hex_u64(n).ok())
	}

	/// Returns true if this log is an ERC-20 `Transfer` event
	pub fn is_transfer(&self) -> bool {
		self.topics
			.first()
			.is_some_and(|topic| topic.eq_ignore_ascii_case(TRANSFER_EVENT_TOPIC))
	}

	/// Decodes an ERC-20 `Transfer` log into a [`TokenTransfer`]
	///
	/// The block timestamp is taken from the log when the node provides it and left
	/// empty otherwise; callers fill it in from the block header.
	pub fn to_token_transfer(&self) -> Result<TokenTransfer, String> {
		if !self.is_transfer() {
			return Err("Log is not a Transfer event".to_string());
		}
		if self.topics.len() < 3 {
			return Err(format!(
				"Transfer log has {} topics, expected 3",
				self.topics.len()
			));
		}

		let tx_hash = self
			.transaction_hash
			.clone()
			.ok_or_else(|| "Transfer log is missing transactionHash".to_string())?;
		let block_number = self
			.block_number()
			.ok_or_else(|| format!("Transfer log {} is missing blockNumber", tx_hash))?;

		let data = self.data.trim_start_matches("0x");
		if data.is_empty() {
			return Err(format!("Transfer log {} has empty data", tx_hash));
		}
		let raw_amount = U256::from_str_radix(data, 16)
			.map_err(|e| format!("Invalid transfer amount in {}: {}", tx_hash, e))?;

		let block_timestamp = self
			.block_timestamp
			.as_deref()
			.and_then(|ts| parse_hex_u64(ts).ok())
			.and_then(|secs| chrono::DateTime::from_timestamp(secs as i64, 0));

		Ok(TokenTransfer {
			tx_hash: tx_hash.to_lowercase(),
			from_address: topic_to_address(&self.topics[1])?,
			to_address: topic_to_address(&self.topics[2])?,
			token_address: self.address.to_lowercase(),
			raw_amount,
			block_number,
			block_hash: self.block_hash.as_ref().map(|h| h.to_lowercase()),
			block_timestamp,
			log_index: self.log_index().unwrap_or(0),
		})
	}
}
