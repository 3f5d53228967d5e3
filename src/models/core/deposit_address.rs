use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A blockchain address assigned to one user for receiving deposits
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DepositAddress {
	#[serde(default = "Uuid::new_v4")]
	pub id: Uuid,
	pub user_id: Uuid,
	pub chain_id: u64,
	pub deposit_address: String,
	#[serde(default)]
	pub is_primary: bool,
	#[serde(default = "default_is_active")]
	pub is_active: bool,
	#[serde(default = "Utc::now")]
	pub created_at: DateTime<Utc>,
}

fn default_is_active() -> bool {
	true
}

impl DepositAddress {
	/// Address normalized to lowercase; EVM addresses compare case-insensitively
	pub fn normalized_address(&self) -> String {
		self.deposit_address.to_lowercase()
	}
}
