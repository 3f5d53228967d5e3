//! Deposit ledger.
//!
//! Deposits are unique per `(chain id, tx hash)`. Every mutation is a guarded update
//! applied under a single write lock: inserts only happen if the key is absent,
//! confirmation counts only grow, and status changes are compare-and-set on the stored
//! processing status.
//!
//! The in-memory [`DepositRepository`] can snapshot its contents to a JSON file after
//! every mutation and reload it on startup.

use async_trait::async_trait;
use std::{
	collections::HashMap,
	path::{Path, PathBuf},
};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
	models::{Deposit, ProcessingStatus},
	repositories::error::RepositoryError,
};

/// Durable store of deposits
#[async_trait]
pub trait DepositRepositoryTrait: Send + Sync {
	/// Inserts the deposit unless one with the same `(chain id, tx hash)` exists
	///
	/// Returns `true` if the deposit was inserted.
	async fn insert_if_absent(&self, deposit: Deposit) -> Result<bool, RepositoryError>;

	async fn get(&self, id: Uuid) -> Result<Option<Deposit>, RepositoryError>;

	async fn find_by_tx(
		&self,
		chain_id: u64,
		tx_hash: &str,
	) -> Result<Option<Deposit>, RepositoryError>;

	/// Deposits of a chain that are neither Completed nor Failed
	async fn list_non_terminal(&self, chain_id: u64) -> Result<Vec<Deposit>, RepositoryError>;

	/// Deposits of a chain in Confirmed, Processing or Credited
	async fn list_needing_reconciliation(
		&self,
		chain_id: u64,
	) -> Result<Vec<Deposit>, RepositoryError>;

	async fn get_all(&self) -> Result<Vec<Deposit>, RepositoryError>;

	/// Raises the confirmation count
	///
	/// Returns `false` if the count would not increase or the deposit is terminal.
	async fn update_confirmations(
		&self,
		id: Uuid,
		confirmations: u64,
	) -> Result<bool, RepositoryError>;

	/// Moves the deposit from `expected` to `next` if it is still in `expected`
	///
	/// Returns `false` if the stored status differs or the move would go backwards.
	/// `reason` is recorded as the failure reason when `next` is Failed.
	async fn update_status_if(
		&self,
		id: Uuid,
		expected: ProcessingStatus,
		next: ProcessingStatus,
		reason: Option<String>,
	) -> Result<bool, RepositoryError>;

	/// Processing → Credited, setting `credited_to_magic` in the same update
	///
	/// Returns `false` if the deposit is not Processing or was already credited.
	async fn mark_credited(&self, id: Uuid) -> Result<bool, RepositoryError>;

	/// Credited → Completed, setting `blnk_mirrored` in the same update
	async fn mark_completed(&self, id: Uuid) -> Result<bool, RepositoryError>;
}

#[derive(Default)]
struct DepositStore {
	deposits: HashMap<Uuid, Deposit>,
	tx_index: HashMap<(u64, String), Uuid>,
}

impl DepositStore {
	fn can_insert(&self, deposit: &Deposit) -> bool {
		if self.deposits.contains_key(&deposit.id) {
			return false;
		}
		tx_key(deposit).is_none_or(|key| !self.tx_index.contains_key(&key))
	}

	fn insert(&mut self, deposit: Deposit) -> bool {
		if !self.can_insert(&deposit) {
			return false;
		}
		if let Some(key) = tx_key(&deposit) {
			self.tx_index.insert(key, deposit.id);
		}
		self.deposits.insert(deposit.id, deposit);
		true
	}
}

fn tx_key(deposit: &Deposit) -> Option<(u64, String)> {
	match (deposit.chain_id, deposit.tx_hash.as_ref()) {
		(Some(chain_id), Some(tx_hash)) => Some((chain_id, tx_hash.to_lowercase())),
		_ => None,
	}
}

/// In-memory deposit ledger with an optional JSON snapshot
pub struct DepositRepository {
	store: RwLock<DepositStore>,
	snapshot_path: Option<PathBuf>,
}

impl DepositRepository {
	/// Creates an empty ledger that is never persisted
	pub fn new() -> Self {
		Self {
			store: RwLock::new(DepositStore::default()),
			snapshot_path: None,
		}
	}

	/// Creates a ledger persisted to `path`, loading existing deposits from it
	pub async fn with_snapshot(path: impl AsRef<Path>) -> Result<Self, RepositoryError> {
		let path = path.as_ref().to_path_buf();
		let mut store = DepositStore::default();

		if path.exists() {
			let content = tokio::fs::read(&path).await?;
			let deposits: Vec<Deposit> = serde_json::from_slice(&content).map_err(|e| {
				RepositoryError::load_error(format!(
					"Failed to load deposit snapshot {}: {}",
					path.display(),
					e
				))
			})?;
			for deposit in deposits {
				if !store.insert(deposit) {
					tracing::warn!("Duplicate deposit in snapshot {}", path.display());
				}
			}
			tracing::info!(
				"Loaded {} deposits from {}",
				store.deposits.len(),
				path.display()
			);
		}

		Ok(Self {
			store: RwLock::new(store),
			snapshot_path: Some(path),
		})
	}

	/// Writes the snapshot; called with the write lock held so snapshots stay ordered
	///
	/// Callers pass the state they are about to commit and only apply it to the store
	/// once this returns `Ok`, so memory never holds a change the snapshot lacks.
	async fn persist(&self, mut deposits: Vec<&Deposit>) -> Result<(), RepositoryError> {
		let Some(path) = &self.snapshot_path else {
			return Ok(());
		};

		deposits.sort_by_key(|d| d.created_at);
		let json = serde_json::to_vec_pretty(&deposits)
			.map_err(|e| RepositoryError::storage_error(e.to_string()))?;

		if let Some(parent) = path.parent() {
			tokio::fs::create_dir_all(parent).await?;
		}
		let tmp_path = path.with_extension("json.tmp");
		tokio::fs::write(&tmp_path, json).await?;
		tokio::fs::rename(&tmp_path, path).await?;
		Ok(())
	}

	/// Applies `update` to a deposit under the write lock, persisting when it returns true
	async fn update_with<F>(&self, id: Uuid, update: F) -> Result<bool, RepositoryError>
	where
		F: FnOnce(&mut Deposit) -> bool + Send,
	{
		let mut store = self.store.write().await;
		let mut updated = store
			.deposits
			.get(&id)
			.cloned()
			.ok_or_else(|| RepositoryError::not_found(format!("deposit {}", id)))?;

		if !update(&mut updated) {
			return Ok(false);
		}

		let candidate: Vec<&Deposit> = store
			.deposits
			.values()
			.map(|d| if d.id == id { &updated } else { d })
			.collect();
		self.persist(candidate).await?;
		store.deposits.insert(id, updated);
		Ok(true)
	}

	async fn list_where<F>(&self, chain_id: u64, predicate: F) -> Vec<Deposit>
	where
		F: Fn(&Deposit) -> bool + Send,
	{
		let store = self.store.read().await;
		let mut deposits: Vec<Deposit> = store
			.deposits
			.values()
			.filter(|d| d.chain_id == Some(chain_id) && predicate(d))
			.cloned()
			.collect();
		deposits.sort_by_key(|d| (d.block_number, d.log_index));
		deposits
	}
}

impl Default for DepositRepository {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl DepositRepositoryTrait for DepositRepository {
	async fn insert_if_absent(&self, deposit: Deposit) -> Result<bool, RepositoryError> {
		let mut store = self.store.write().await;
		if !store.can_insert(&deposit) {
			return Ok(false);
		}
		let candidate: Vec<&Deposit> = store.deposits.values().chain([&deposit]).collect();
		self.persist(candidate).await?;
		Ok(store.insert(deposit))
	}

	async fn get(&self, id: Uuid) -> Result<Option<Deposit>, RepositoryError> {
		Ok(self.store.read().await.deposits.get(&id).cloned())
	}

	async fn find_by_tx(
		&self,
		chain_id: u64,
		tx_hash: &str,
	) -> Result<Option<Deposit>, RepositoryError> {
		let store = self.store.read().await;
		Ok(store
			.tx_index
			.get(&(chain_id, tx_hash.to_lowercase()))
			.and_then(|id| store.deposits.get(id))
			.cloned())
	}

	async fn list_non_terminal(&self, chain_id: u64) -> Result<Vec<Deposit>, RepositoryError> {
		Ok(self
			.list_where(chain_id, |d| !d.processing_status.is_terminal())
			.await)
	}

	async fn list_needing_reconciliation(
		&self,
		chain_id: u64,
	) -> Result<Vec<Deposit>, RepositoryError> {
		Ok(self
			.list_where(chain_id, |d| d.processing_status.needs_reconciliation())
			.await)
	}

	async fn get_all(&self) -> Result<Vec<Deposit>, RepositoryError> {
		Ok(self.store.read().await.deposits.values().cloned().collect())
	}

	async fn update_confirmations(
		&self,
		id: Uuid,
		confirmations: u64,
	) -> Result<bool, RepositoryError> {
		self.update_with(id, |deposit| {
			if deposit.processing_status.is_terminal() || confirmations <= deposit.confirmations {
				return false;
			}
			deposit.confirmations = confirmations;
			deposit.updated_at = chrono::Utc::now();
			true
		})
		.await
	}

	async fn update_status_if(
		&self,
		id: Uuid,
		expected: ProcessingStatus,
		next: ProcessingStatus,
		reason: Option<String>,
	) -> Result<bool, RepositoryError> {
		self.update_with(id, |deposit| {
			if deposit.processing_status != expected || !expected.can_transition_to(next) {
				return false;
			}
			deposit.set_processing_status(next);
			if next == ProcessingStatus::Failed {
				deposit.failure_reason = reason;
			}
			true
		})
		.await
	}

	async fn mark_credited(&self, id: Uuid) -> Result<bool, RepositoryError> {
		self.update_with(id, |deposit| {
			if deposit.processing_status != ProcessingStatus::Processing || deposit.credited_to_magic
			{
				return false;
			}
			deposit.credited_to_magic = true;
			deposit.set_processing_status(ProcessingStatus::Credited);
			true
		})
		.await
	}

	async fn mark_completed(&self, id: Uuid) -> Result<bool, RepositoryError> {
		self.update_with(id, |deposit| {
			if deposit.processing_status != ProcessingStatus::Credited {
				return false;
			}
			deposit.blnk_mirrored = true;
			deposit.set_processing_status(ProcessingStatus::Completed);
			true
		})
		.await
	}
}
