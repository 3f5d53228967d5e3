//! Deposit lifecycle state machine.
//!
//! Confirmation counts move a deposit from Detected through Confirming to Confirmed.
//! From there the driver runs the downstream steps:
//!
//! ```text
//! Confirmed --CAS--> Processing --credit ok--> Credited --mirror ok--> Completed
//!                        |                         |
//!                        +--rejected--> Failed <---+--rejected
//! ```
//!
//! Every transition is a compare-and-set on the stored status, written before the
//! collaborator is called. A pending outcome leaves the deposit where it is; the
//! reconciliation pass retries it later, and the collaborators deduplicate by
//! deposit id.

use std::sync::Arc;
use uuid::Uuid;

use crate::{
	models::{Deposit, ProcessingStatus},
	repositories::DepositRepositoryTrait,
	services::{
		downstream::{CreditRequest, CreditingService, MirrorRequest, MirroringService, OpResult},
		lifecycle::LifecycleError,
	},
	utils::metrics::{DEPOSITS_CREDITED, DEPOSITS_FAILED},
};

/// Result of applying a new chain head to a deposit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfirmationUpdate {
	/// The stored confirmation count increased
	pub confirmations_updated: bool,
	/// Status the deposit moved to, if it moved
	pub new_status: Option<ProcessingStatus>,
}

/// Counts of a reconciliation pass, by the status each deposit ended in
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
	pub chain_id: u64,
	pub examined: usize,
	pub completed: usize,
	pub failed: usize,
	/// Deposits still waiting on a collaborator
	pub pending: usize,
	/// Deposits whose processing returned an error
	pub errors: usize,
}

pub struct DepositLifecycleDriver {
	deposits: Arc<dyn DepositRepositoryTrait>,
	crediting: Arc<dyn CreditingService>,
	mirroring: Arc<dyn MirroringService>,
}

impl DepositLifecycleDriver {
	pub fn new(
		deposits: Arc<dyn DepositRepositoryTrait>,
		crediting: Arc<dyn CreditingService>,
		mirroring: Arc<dyn MirroringService>,
	) -> Self {
		Self {
			deposits,
			crediting,
			mirroring,
		}
	}

	/// Records the confirmations implied by `head` and advances the status
	///
	/// Only Detected and Confirming deposits change status here. Confirmations of
	/// deposits past the threshold are still recorded while they are not terminal.
	pub async fn apply_confirmations(
		&self,
		deposit: &Deposit,
		head: u64,
	) -> Result<ConfirmationUpdate, LifecycleError> {
		let mut update = ConfirmationUpdate::default();
		if deposit.processing_status.is_terminal() {
			return Ok(update);
		}

		let confirmations = deposit.confirmations_at(head).max(deposit.confirmations);
		if confirmations > deposit.confirmations {
			update.confirmations_updated = self
				.deposits
				.update_confirmations(deposit.id, confirmations)
				.await?;
		}

		let current = deposit.processing_status;
		if !current.is_awaiting_confirmations() {
			return Ok(update);
		}

		let target =
			ProcessingStatus::for_confirmations(confirmations, deposit.required_confirmations);
		if target != current
			&& current.can_transition_to(target)
			&& self
				.deposits
				.update_status_if(deposit.id, current, target, None)
				.await?
		{
			tracing::info!(
				"Deposit {} moved {} -> {} ({}/{} confirmations)",
				deposit.id,
				current,
				target,
				confirmations,
				deposit.required_confirmations
			);
			update.new_status = Some(target);
		}

		Ok(update)
	}

	/// Moves a non-terminal deposit to Failed
	///
	/// Returns `false` if the deposit left `expected` in the meantime.
	pub async fn fail(
		&self,
		id: Uuid,
		expected: ProcessingStatus,
		reason: impl Into<String>,
	) -> Result<bool, LifecycleError> {
		let reason = reason.into();
		let failed = self
			.deposits
			.update_status_if(id, expected, ProcessingStatus::Failed, Some(reason.clone()))
			.await?;
		if failed {
			DEPOSITS_FAILED.inc();
			tracing::warn!("Deposit {} failed from {}: {}", id, expected, reason);
		}
		Ok(failed)
	}

	/// Drives a deposit as far as its collaborators allow
	///
	/// Returns the status the deposit is left in. Deposits below the confirmation
	/// threshold or already terminal are returned untouched.
	pub async fn process(&self, id: Uuid) -> Result<ProcessingStatus, LifecycleError> {
		let deposit = self.load(id).await?;

		match deposit.processing_status {
			ProcessingStatus::Confirmed => {
				if !self
					.deposits
					.update_status_if(
						id,
						ProcessingStatus::Confirmed,
						ProcessingStatus::Processing,
						None,
					)
					.await?
				{
					// Someone else moved it first
					return Ok(self.load(id).await?.processing_status);
				}
				self.credit(&deposit).await
			}
			ProcessingStatus::Processing => self.credit(&deposit).await,
			ProcessingStatus::Credited => self.mirror(&deposit).await,
			status => Ok(status),
		}
	}

	async fn credit(&self, deposit: &Deposit) -> Result<ProcessingStatus, LifecycleError> {
		match self.crediting.credit(&CreditRequest::from(deposit)).await {
			OpResult::Success => {
				if self.deposits.mark_credited(deposit.id).await? {
					DEPOSITS_CREDITED.inc();
					tracing::info!(
						"Deposit {} credited: {} {} to user {}",
						deposit.id,
						deposit.amount,
						deposit.currency,
						deposit.user_id
					);
					self.mirror(deposit).await
				} else {
					Ok(self.load(deposit.id).await?.processing_status)
				}
			}
			OpResult::Failed(reason) => {
				self.fail(
					deposit.id,
					ProcessingStatus::Processing,
					format!("crediting rejected: {}", reason),
				)
				.await?;
				Ok(self.load(deposit.id).await?.processing_status)
			}
			OpResult::Pending(reason) => {
				tracing::warn!("Crediting of deposit {} pending: {}", deposit.id, reason);
				Ok(ProcessingStatus::Processing)
			}
		}
	}

	async fn mirror(&self, deposit: &Deposit) -> Result<ProcessingStatus, LifecycleError> {
		let request = MirrorRequest::for_deposit(deposit, self.mirroring.ledger_id());
		match self.mirroring.mirror(&request).await {
			OpResult::Success => {
				if self.deposits.mark_completed(deposit.id).await? {
					tracing::info!("Deposit {} completed", deposit.id);
					Ok(ProcessingStatus::Completed)
				} else {
					Ok(self.load(deposit.id).await?.processing_status)
				}
			}
			OpResult::Failed(reason) => {
				self.fail(
					deposit.id,
					ProcessingStatus::Credited,
					format!("mirroring rejected: {}", reason),
				)
				.await?;
				Ok(self.load(deposit.id).await?.processing_status)
			}
			OpResult::Pending(reason) => {
				tracing::warn!("Mirroring of deposit {} pending: {}", deposit.id, reason);
				Ok(ProcessingStatus::Credited)
			}
		}
	}

	/// Drives every Confirmed, Processing and Credited deposit of a chain
	///
	/// Each deposit is processed independently; an error on one is logged and
	/// counted without stopping the others.
	pub async fn reconcile(&self, chain_id: u64) -> Result<ReconcileReport, LifecycleError> {
		let stuck = self.deposits.list_needing_reconciliation(chain_id).await?;
		let mut report = ReconcileReport {
			chain_id,
			examined: stuck.len(),
			..Default::default()
		};

		for deposit in stuck {
			match self.process(deposit.id).await {
				Ok(ProcessingStatus::Completed) => report.completed += 1,
				Ok(ProcessingStatus::Failed) => report.failed += 1,
				Ok(_) => report.pending += 1,
				Err(e) => {
					tracing::error!("Reconciliation of deposit {} failed: {}", deposit.id, e);
					report.errors += 1;
				}
			}
		}

		if report.examined > 0 {
			tracing::info!(
				"Reconciled chain {}: {} examined, {} completed, {} failed, {} pending, {} errors",
				chain_id,
				report.examined,
				report.completed,
				report.failed,
				report.pending,
				report.errors
			);
		}
		Ok(report)
	}

	async fn load(&self, id: Uuid) -> Result<Deposit, LifecycleError> {
		self.deposits
			.get(id)
			.await?
			.ok_or_else(|| LifecycleError::not_found(id.to_string()))
	}
}
