//! Deposit record and its status enums.
//!
//! A deposit carries two statuses: the coarse [`DepositStatus`] exposed to account
//! history queries and the fine-grained [`ProcessingStatus`] driven by the lifecycle
//! state machine. The coarse status is always derived from the processing status.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Chain, TokenTransfer};

/// Currency recorded for on-chain USDC deposits
pub const USDC_CURRENCY: &str = "USDC";

/// Rail the deposit arrived through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DepositMethod {
	Crypto,
	Mpesa,
	AirtelMoney,
}

/// Coarse deposit status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DepositStatus {
	Pending,
	Confirmed,
	Completed,
	Failed,
}

/// Fine-grained processing status
///
/// Statuses are ordered; a deposit only moves forward through the sequence and may
/// drop to [`ProcessingStatus::Failed`] from any non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProcessingStatus {
	Detected,
	Confirming,
	Confirmed,
	Processing,
	Credited,
	Completed,
	Failed,
}

impl ProcessingStatus {
	fn rank(&self) -> u8 {
		match self {
			Self::Detected => 0,
			Self::Confirming => 1,
			Self::Confirmed => 2,
			Self::Processing => 3,
			Self::Credited => 4,
			Self::Completed => 5,
			Self::Failed => u8::MAX,
		}
	}

	/// Completed and Failed accept no further transitions
	pub fn is_terminal(&self) -> bool {
		matches!(self, Self::Completed | Self::Failed)
	}

	/// Statuses below the confirmation threshold
	pub fn is_awaiting_confirmations(&self) -> bool {
		matches!(self, Self::Detected | Self::Confirming)
	}

	/// Statuses the reconciliation pass is responsible for
	pub fn needs_reconciliation(&self) -> bool {
		matches!(self, Self::Confirmed | Self::Processing | Self::Credited)
	}

	/// Returns true if moving from `self` to `next` keeps the sequence monotonic
	pub fn can_transition_to(&self, next: ProcessingStatus) -> bool {
		if self.is_terminal() {
			return false;
		}
		if next == Self::Failed {
			return true;
		}
		next.rank() > self.rank()
	}

	/// Status a deposit should hold for the given confirmation count
	///
	/// Only meaningful for deposits that have not reached Confirmed yet.
	pub fn for_confirmations(confirmations: u64, required: u64) -> Self {
		if confirmations >= required {
			Self::Confirmed
		} else if confirmations > 0 {
			Self::Confirming
		} else {
			Self::Detected
		}
	}

	/// Coarse status implied by this processing status
	pub fn deposit_status(&self) -> DepositStatus {
		match self {
			Self::Detected | Self::Confirming => DepositStatus::Pending,
			Self::Confirmed | Self::Processing | Self::Credited => DepositStatus::Confirmed,
			Self::Completed => DepositStatus::Completed,
			Self::Failed => DepositStatus::Failed,
		}
	}
}

impl std::fmt::Display for ProcessingStatus {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let name = match self {
			Self::Detected => "DETECTED",
			Self::Confirming => "CONFIRMING",
			Self::Confirmed => "CONFIRMED",
			Self::Processing => "PROCESSING",
			Self::Credited => "CREDITED",
			Self::Completed => "COMPLETED",
			Self::Failed => "FAILED",
		};
		write!(f, "{}", name)
	}
}

/// A deposit observed on chain (or received through another rail)
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Deposit {
	pub id: Uuid,
	pub user_id: Uuid,
	pub amount: Decimal,
	pub currency: String,
	pub method: DepositMethod,
	pub status: DepositStatus,
	pub processing_status: ProcessingStatus,

	// On-chain fields, only set for crypto deposits
	pub tx_hash: Option<String>,
	pub chain_id: Option<u64>,
	pub from_address: Option<String>,
	pub to_address: Option<String>,
	pub token_address: Option<String>,
	/// Token amount in the smallest unit, before decimal scaling
	pub raw_amount: Option<String>,
	pub block_number: Option<u64>,
	pub block_hash: Option<String>,
	pub block_timestamp: Option<DateTime<Utc>>,
	pub log_index: Option<u64>,

	pub confirmations: u64,
	/// Threshold copied from the chain configuration at detection time
	pub required_confirmations: u64,

	pub credited_to_magic: bool,
	pub blnk_mirrored: bool,
	pub failure_reason: Option<String>,

	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

impl Deposit {
	/// Creates a crypto deposit for a transfer observed at chain head `head`
	///
	/// The amount is the raw token amount scaled by the chain's token decimals. The
	/// initial status is Detected below the confirmation threshold and Confirmed at or
	/// above it. Fails if the raw amount does not fit a decimal.
	pub fn from_transfer(
		chain: &Chain,
		transfer: &TokenTransfer,
		user_id: Uuid,
		currency: &str,
		head: u64,
	) -> Result<Self, String> {
		let raw: i128 = transfer.raw_amount.try_into().map_err(|_| {
			format!(
				"Transfer amount {} in {} is out of range",
				transfer.raw_amount, transfer.tx_hash
			)
		})?;
		let amount = Decimal::try_from_i128_with_scale(raw, chain.usdc_decimals).map_err(|e| {
			format!(
				"Transfer amount {} in {} is out of range: {}",
				transfer.raw_amount, transfer.tx_hash, e
			)
		})?;

		let confirmations = head.saturating_sub(transfer.block_number);
		let processing_status = if confirmations >= chain.required_confirmations {
			ProcessingStatus::Confirmed
		} else {
			ProcessingStatus::Detected
		};
		let now = Utc::now();

		Ok(Self {
			id: Uuid::new_v4(),
			user_id,
			amount,
			currency: currency.to_string(),
			method: DepositMethod::Crypto,
			status: processing_status.deposit_status(),
			processing_status,
			tx_hash: Some(transfer.tx_hash.clone()),
			chain_id: Some(chain.chain_id),
			from_address: Some(transfer.from_address.clone()),
			to_address: Some(transfer.to_address.clone()),
			token_address: Some(transfer.token_address.clone()),
			raw_amount: Some(transfer.raw_amount.to_string()),
			block_number: Some(transfer.block_number),
			block_hash: transfer.block_hash.clone(),
			block_timestamp: transfer.block_timestamp,
			log_index: Some(transfer.log_index),
			confirmations,
			required_confirmations: chain.required_confirmations,
			credited_to_magic: false,
			blnk_mirrored: false,
			failure_reason: None,
			created_at: now,
			updated_at: now,
		})
	}

	/// Confirmation count implied by the given chain head
	pub fn confirmations_at(&self, head: u64) -> u64 {
		self.block_number
			.map(|block| head.saturating_sub(block))
			.unwrap_or(self.confirmations)
	}

	/// Updates the processing status and keeps the coarse status in sync
	pub fn set_processing_status(&mut self, status: ProcessingStatus) {
		self.processing_status = status;
		self.status = status.deposit_status();
		self.updated_at = Utc::now();
	}
}
