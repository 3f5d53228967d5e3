//! EVM block data structures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::parsing::parse_hex_u64;

/// Subset of an `eth_getBlockByNumber` response needed for deposit bookkeeping
///
/// Quantities are kept in their hex wire form and decoded on access.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BlockHeader {
	pub number: Option<String>,
	pub hash: Option<String>,
	pub timestamp: String,
}

impl BlockHeader {
	/// Get the block number
	pub fn number(&self) -> Option<u64> {
		self.number.as_deref().and_then(|n| parse_hex_u64(n).ok())
	}

	/// Get the block timestamp as a UTC datetime
	pub fn timestamp(&self) -> Option<DateTime<Utc>> {
		parse_hex_u64(&self.timestamp)
			.ok()
			.and_then(|secs| DateTime::from_timestamp(secs as i64, 0))
	}
}
