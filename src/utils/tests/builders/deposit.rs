//! Test helper utilities for deposits
//!
//! - `DepositBuilder`: Builder for creating test Deposit instances

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::{Deposit, DepositMethod, ProcessingStatus, USDC_CURRENCY};

/// Builder for creating test Deposit instances
///
/// Defaults to a 100 USDC crypto deposit on chain 1 in block 85, Detected.
pub struct DepositBuilder {
	user_id: Uuid,
	amount: Decimal,
	chain_id: u64,
	tx_hash: String,
	to_address: String,
	block_number: u64,
	block_hash: Option<String>,
	confirmations: u64,
	required_confirmations: u64,
	processing_status: ProcessingStatus,
	credited_to_magic: bool,
	blnk_mirrored: bool,
}

impl Default for DepositBuilder {
	fn default() -> Self {
		Self {
			user_id: Uuid::new_v4(),
			amount: Decimal::new(100_000_000, 6),
			chain_id: 1,
			tx_hash: "0x0000000000000000000000000000000000000000000000000000000000000001"
				.to_string(),
			to_address: "0x2222222222222222222222222222222222222222".to_string(),
			block_number: 85,
			block_hash: Some(format!("0x{:064x}", 85)),
			confirmations: 0,
			required_confirmations: 12,
			processing_status: ProcessingStatus::Detected,
			credited_to_magic: false,
			blnk_mirrored: false,
		}
	}
}

impl DepositBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn user_id(mut self, user_id: Uuid) -> Self {
		self.user_id = user_id;
		self
	}

	pub fn amount(mut self, amount: Decimal) -> Self {
		self.amount = amount;
		self
	}

	pub fn chain_id(mut self, chain_id: u64) -> Self {
		self.chain_id = chain_id;
		self
	}

	pub fn tx_hash(mut self, tx_hash: &str) -> Self {
		self.tx_hash = tx_hash.to_string();
		self
	}

	pub fn to_address(mut self, address: &str) -> Self {
		self.to_address = address.to_string();
		self
	}

	/// Sets the block number and the matching default block hash
	pub fn block_number(mut self, block_number: u64) -> Self {
		self.block_number = block_number;
		self.block_hash = Some(format!("0x{:064x}", block_number));
		self
	}

	pub fn block_hash(mut self, hash: Option<&str>) -> Self {
		self.block_hash = hash.map(str::to_string);
		self
	}

	pub fn confirmations(mut self, confirmations: u64) -> Self {
		self.confirmations = confirmations;
		self
	}

	pub fn required_confirmations(mut self, required: u64) -> Self {
		self.required_confirmations = required;
		self
	}

	pub fn processing_status(mut self, status: ProcessingStatus) -> Self {
		self.processing_status = status;
		self
	}

	pub fn credited(mut self, credited: bool) -> Self {
		self.credited_to_magic = credited;
		self
	}

	pub fn mirrored(mut self, mirrored: bool) -> Self {
		self.blnk_mirrored = mirrored;
		self
	}

	pub fn build(self) -> Deposit {
		let now = chrono::Utc::now();
		Deposit {
			id: Uuid::new_v4(),
			user_id: self.user_id,
			amount: self.amount,
			currency: USDC_CURRENCY.to_string(),
			method: DepositMethod::Crypto,
			status: self.processing_status.deposit_status(),
			processing_status: self.processing_status,
			tx_hash: Some(self.tx_hash),
			chain_id: Some(self.chain_id),
			from_address: Some("0x1111111111111111111111111111111111111111".to_string()),
			to_address: Some(self.to_address),
			token_address: Some("0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48".to_string()),
			raw_amount: Some(self.amount.mantissa().to_string()),
			block_number: Some(self.block_number),
			block_hash: self.block_hash,
			block_timestamp: Some(now),
			log_index: Some(0),
			confirmations: self.confirmations,
			required_confirmations: self.required_confirmations,
			credited_to_magic: self.credited_to_magic,
			blnk_mirrored: self.blnk_mirrored,
			failure_reason: None,
			created_at: now,
			updated_at: now,
		}
	}
}
