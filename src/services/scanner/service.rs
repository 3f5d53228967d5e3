//! Per-chain deposit scan.
//!
//! One scan pass over a chain:
//!
//! 1. Pick the range `[cursor + 1, min(head - margin, cursor + max_blocks)]`.
//! 2. Read token transfers in the range and record a deposit for every transfer to a
//!    registered address, at most once per `(chain, tx hash)`.
//! 3. Re-check every open deposit against the new head: drop reorged deposits,
//!    record confirmations and advance the confirmation state machine.
//! 4. Hand deposits that just reached Confirmed to the lifecycle driver.
//! 5. Advance the cursor to the end of the range.
//!
//! Any chain read failure aborts the pass before the cursor moves, so the next pass
//! re-reads the same range. Re-reading is harmless since inserts are idempotent.

use alloy::primitives::U256;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
	models::{Chain, Deposit, ProcessingStatus, ScannerConfig, TokenTransfer},
	repositories::{ChainRegistry, DepositAddressRepositoryTrait, DepositRepositoryTrait},
	services::{
		blockchain::ChainReader, lifecycle::DepositLifecycleDriver, scanner::ScannerError,
	},
	utils::metrics::DEPOSITS_DETECTED,
};

/// Summary of one scan pass over a chain
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
	pub chain_id: u64,
	pub chain_name: String,
	pub head: u64,
	/// Inclusive block range read, `None` when the chain had no new blocks
	pub range: Option<(u64, u64)>,
	/// Transfers to registered deposit addresses
	pub transfers_seen: usize,
	pub deposits_created: usize,
	pub duplicates_skipped: usize,
	pub below_minimum: usize,
	pub integrity_violations: usize,
	pub confirmations_updated: usize,
	pub deposits_confirmed: usize,
	pub reorged: usize,
}

pub struct DepositScanner {
	registry: Arc<dyn ChainRegistry>,
	reader: Arc<dyn ChainReader>,
	deposits: Arc<dyn DepositRepositoryTrait>,
	addresses: Arc<dyn DepositAddressRepositoryTrait>,
	driver: Arc<DepositLifecycleDriver>,
	config: ScannerConfig,
}

impl DepositScanner {
	pub fn new(
		registry: Arc<dyn ChainRegistry>,
		reader: Arc<dyn ChainReader>,
		deposits: Arc<dyn DepositRepositoryTrait>,
		addresses: Arc<dyn DepositAddressRepositoryTrait>,
		driver: Arc<DepositLifecycleDriver>,
		config: ScannerConfig,
	) -> Self {
		Self {
			registry,
			reader,
			deposits,
			addresses,
			driver,
			config,
		}
	}

	/// Block range the next pass should read, `None` if there is nothing new
	pub fn scan_range(&self, last_scanned_block: u64, head: u64) -> Option<(u64, u64)> {
		let from_block = last_scanned_block.saturating_add(1);
		let max_blocks = self.config.max_blocks_per_scan.max(1);
		let to_block = head
			.saturating_sub(self.config.confirmation_safety_margin)
			.min(from_block.saturating_add(max_blocks - 1));
		(to_block >= from_block).then_some((from_block, to_block))
	}

	/// Runs one scan pass over the chain
	///
	/// The chain is read from the registry so the pass always starts from the latest
	/// committed cursor.
	pub async fn scan(&self, chain_id: u64) -> Result<ScanReport, ScannerError> {
		let chain = self
			.registry
			.get(chain_id)
			.await
			.ok_or_else(|| ScannerError::unknown_chain(chain_id))?;

		let head = self.reader.current_height(&chain).await.map_err(|e| {
			ScannerError::chain_unavailable(format!(
				"Failed to get head of chain {}: {}",
				chain.name, e
			))
		})?;

		let mut report = ScanReport {
			chain_id,
			chain_name: chain.name.clone(),
			head,
			range: self.scan_range(chain.last_scanned_block, head),
			..Default::default()
		};
		let mut newly_confirmed = Vec::new();

		if let Some((from_block, to_block)) = report.range {
			tracing::debug!(
				"Scanning chain {} blocks {}..={} (head {})",
				chain.name,
				from_block,
				to_block,
				head
			);
			let transfers = self
				.reader
				.transfers_to(&chain, from_block, to_block, &chain.token_address())
				.await
				.map_err(|e| {
					ScannerError::chain_unavailable(format!(
						"Failed to read transfers of chain {} in {}..={}: {}",
						chain.name, from_block, to_block, e
					))
				})?;

			for transfer in &transfers {
				if let Some(id) = self.record_transfer(&chain, transfer, head, &mut report).await? {
					newly_confirmed.push(id);
				}
			}
		}

		self.refresh_open_deposits(&chain, head, &mut report, &mut newly_confirmed)
			.await?;

		for id in newly_confirmed {
			if let Err(e) = self.driver.process(id).await {
				tracing::error!("Processing of confirmed deposit {} failed: {}", id, e);
			}
		}

		if let Some((_, to_block)) = report.range {
			self.registry
				.advance_scan_cursor(chain_id, to_block)
				.await?;
		}

		if report.deposits_created > 0 || report.deposits_confirmed > 0 || report.reorged > 0 {
			tracing::info!(
				"Chain {}: {} new deposits, {} confirmed, {} reorged (head {})",
				chain.name,
				report.deposits_created,
				report.deposits_confirmed,
				report.reorged,
				head
			);
		}
		Ok(report)
	}

	/// Records a deposit for the transfer if it pays a registered address
	///
	/// Returns the deposit id when the new deposit is already Confirmed.
	async fn record_transfer(
		&self,
		chain: &Chain,
		transfer: &TokenTransfer,
		head: u64,
		report: &mut ScanReport,
	) -> Result<Option<Uuid>, ScannerError> {
		let owners = self
			.addresses
			.find_owners(chain.chain_id, &transfer.to_address);
		let user_id = match owners.as_slice() {
			[] => return Ok(None),
			[user_id] => *user_id,
			_ => {
				report.transfers_seen += 1;
				report.integrity_violations += 1;
				tracing::error!(
					"Data integrity violation: address {} on chain {} belongs to {} users, skipping {}",
					transfer.to_address,
					chain.name,
					owners.len(),
					transfer.tx_hash
				);
				return Ok(None);
			}
		};
		report.transfers_seen += 1;

		if let Some(minimum) = self.config.min_deposit_raw_amount {
			if transfer.raw_amount < U256::from(minimum) {
				report.below_minimum += 1;
				tracing::debug!(
					"Ignoring transfer {} of {} below minimum {}",
					transfer.tx_hash,
					transfer.raw_amount,
					minimum
				);
				return Ok(None);
			}
		}

		if self
			.deposits
			.find_by_tx(chain.chain_id, &transfer.tx_hash)
			.await?
			.is_some()
		{
			report.duplicates_skipped += 1;
			return Ok(None);
		}

		let deposit =
			match Deposit::from_transfer(chain, transfer, user_id, &self.config.currency, head) {
				Ok(deposit) => deposit,
				Err(reason) => {
					report.integrity_violations += 1;
					tracing::error!("Data integrity violation on chain {}: {}", chain.name, reason);
					return Ok(None);
				}
			};
		let id = deposit.id;
		let status = deposit.processing_status;

		if !self.deposits.insert_if_absent(deposit).await? {
			report.duplicates_skipped += 1;
			return Ok(None);
		}

		report.deposits_created += 1;
		DEPOSITS_DETECTED
			.with_label_values(&[chain.name.as_str()])
			.inc();
		tracing::info!(
			"Detected deposit {} of {} on chain {} in block {} for user {} ({})",
			id,
			transfer.raw_amount,
			chain.name,
			transfer.block_number,
			user_id,
			status
		);

		if status == ProcessingStatus::Confirmed {
			report.deposits_confirmed += 1;
			return Ok(Some(id));
		}
		Ok(None)
	}

	async fn refresh_open_deposits(
		&self,
		chain: &Chain,
		head: u64,
		report: &mut ScanReport,
		newly_confirmed: &mut Vec<Uuid>,
	) -> Result<(), ScannerError> {
		for deposit in self.deposits.list_non_terminal(chain.chain_id).await? {
			let status = deposit.processing_status;

			if status.is_awaiting_confirmations() && self.is_reorged(chain, &deposit).await? {
				let block = deposit.block_number.unwrap_or_default();
				if self
					.driver
					.fail(
						deposit.id,
						status,
						format!("reorg: block {} hash changed", block),
					)
					.await?
				{
					report.reorged += 1;
				}
				continue;
			}

			let update = self.driver.apply_confirmations(&deposit, head).await?;
			if update.confirmations_updated {
				report.confirmations_updated += 1;
			}
			if update.new_status == Some(ProcessingStatus::Confirmed) {
				report.deposits_confirmed += 1;
				newly_confirmed.push(deposit.id);
			}
		}
		Ok(())
	}

	/// A deposit is reorged when the canonical hash at its block differs from the
	/// recorded one, or the block is gone. Deposits without a recorded hash are
	/// never treated as reorged.
	///
	/// A fallback RPC endpoint lagging behind the one that reported the transfer also
	/// answers `None` here, which fails the deposit as reorged.
	async fn is_reorged(&self, chain: &Chain, deposit: &Deposit) -> Result<bool, ScannerError> {
		let (Some(block), Some(recorded)) = (deposit.block_number, deposit.block_hash.as_ref())
		else {
			return Ok(false);
		};

		let canonical = self.reader.block_hash(chain, block).await.map_err(|e| {
			ScannerError::chain_unavailable(format!(
				"Failed to get hash of block {} on chain {}: {}",
				block, chain.name, e
			))
		})?;

		Ok(match canonical {
			Some(hash) => !hash.eq_ignore_ascii_case(recorded),
			None => true,
		})
	}
}
