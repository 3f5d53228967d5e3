//! Chain configuration repository and the chain registry.
//!
//! [`ChainRepository`] loads chain configurations from disk. [`ChainService`] is the
//! runtime registry built on top of it: it owns the mutable scan cursor of every chain
//! and persists cursor advances through a [`ScanCursorStorage`].

use async_trait::async_trait;
use std::{
	collections::HashMap,
	path::{Path, PathBuf},
	sync::Arc,
};
use tokio::sync::RwLock;

use crate::{
	models::{Chain, ConfigLoader},
	repositories::error::RepositoryError,
	utils::metrics::CHAIN_LAST_SCANNED_BLOCK,
};

/// Durable storage of per-chain scan cursors
#[async_trait]
pub trait ScanCursorStorage: Send + Sync {
	/// Returns the stored cursor of a chain, `None` if nothing was stored yet
	async fn get_last_scanned_block(&self, chain_name: &str)
		-> Result<Option<u64>, RepositoryError>;

	async fn save_last_scanned_block(
		&self,
		chain_name: &str,
		block: u64,
	) -> Result<(), RepositoryError>;
}

/// Stores each cursor in `<dir>/<chain>_last_scanned_block.txt`
pub struct FileScanCursorStorage {
	storage_path: PathBuf,
}

impl FileScanCursorStorage {
	pub fn new(storage_path: impl Into<PathBuf>) -> Self {
		FileScanCursorStorage {
			storage_path: storage_path.into(),
		}
	}

	fn cursor_path(&self, chain_name: &str) -> PathBuf {
		self.storage_path
			.join(format!("{}_last_scanned_block.txt", chain_name))
	}
}

impl Default for FileScanCursorStorage {
	fn default() -> Self {
		Self::new("data")
	}
}

#[async_trait]
impl ScanCursorStorage for FileScanCursorStorage {
	async fn get_last_scanned_block(
		&self,
		chain_name: &str,
	) -> Result<Option<u64>, RepositoryError> {
		let file_path = self.cursor_path(chain_name);

		if !file_path.exists() {
			return Ok(None);
		}

		let content = tokio::fs::read_to_string(&file_path).await?;
		let block_number = content.trim().parse().map_err(|e| {
			RepositoryError::load_error(format!(
				"Invalid cursor in {}: {}",
				file_path.display(),
				e
			))
		})?;
		Ok(Some(block_number))
	}

	async fn save_last_scanned_block(
		&self,
		chain_name: &str,
		block: u64,
	) -> Result<(), RepositoryError> {
		tokio::fs::create_dir_all(&self.storage_path).await?;
		let file_path = self.cursor_path(chain_name);
		let tmp_path = file_path.with_extension("txt.tmp");
		tokio::fs::write(&tmp_path, block.to_string()).await?;
		tokio::fs::rename(&tmp_path, &file_path).await?;
		Ok(())
	}
}

/// Chain configurations loaded from disk, keyed by chain name
pub struct ChainRepository {
	pub chains: HashMap<String, Chain>,
}

impl ChainRepository {
	pub fn new(path: Option<&Path>) -> Result<Self, RepositoryError> {
		let chains = Chain::load_all(path)
			.map_err(|e| RepositoryError::load_error(format!("Failed to load chains: {}", e)))?;
		Ok(ChainRepository { chains })
	}

	pub fn new_with_chains(chains: Vec<Chain>) -> Self {
		ChainRepository {
			chains: chains.into_iter().map(|c| (c.name.clone(), c)).collect(),
		}
	}
}

/// Source of configured chains for [`ChainService`]
pub trait ChainRepositoryTrait: Send + Sync {
	fn get_all(&self) -> HashMap<String, Chain>;
}

impl ChainRepositoryTrait for ChainRepository {
	fn get_all(&self) -> HashMap<String, Chain> {
		self.chains.clone()
	}
}

/// Registry of monitored chains and their scan cursors
#[async_trait]
pub trait ChainRegistry: Send + Sync {
	/// Active chains ordered by chain id
	async fn list_active(&self) -> Vec<Chain>;

	async fn get(&self, chain_id: u64) -> Option<Chain>;

	/// Moves the cursor of a chain forward
	///
	/// Returns `Ok(false)` without touching anything when `new_height` is not above
	/// the current cursor.
	async fn advance_scan_cursor(
		&self,
		chain_id: u64,
		new_height: u64,
	) -> Result<bool, RepositoryError>;
}

/// [`ChainRegistry`] over a chain repository and a cursor storage
pub struct ChainService<S: ScanCursorStorage> {
	chains: RwLock<HashMap<u64, Chain>>,
	storage: Arc<S>,
}

impl<S: ScanCursorStorage> ChainService<S> {
	/// Builds the registry, restoring persisted cursors
	///
	/// A stored cursor replaces the configured `last_scanned_block` only when it is
	/// higher. Two configured chains sharing a chain id are rejected.
	pub async fn new_with_repository<T: ChainRepositoryTrait>(
		repository: &T,
		storage: Arc<S>,
	) -> Result<Self, RepositoryError> {
		let mut chains = HashMap::new();

		for (_, mut chain) in repository.get_all() {
			if let Some(stored) = storage.get_last_scanned_block(&chain.name).await? {
				if stored > chain.last_scanned_block {
					tracing::info!(
						"Restoring scan cursor of chain {} at block {}",
						chain.name,
						stored
					);
					chain.last_scanned_block = stored;
				}
			}
			CHAIN_LAST_SCANNED_BLOCK
				.with_label_values(&[chain.name.as_str()])
				.set(chain.last_scanned_block as f64);

			if let Some(existing) = chains.insert(chain.chain_id, chain) {
				return Err(RepositoryError::validation_error(format!(
					"Duplicate chain id {} (chain {})",
					existing.chain_id, existing.name
				)));
			}
		}

		Ok(Self {
			chains: RwLock::new(chains),
			storage,
		})
	}

	pub async fn get_all(&self) -> Vec<Chain> {
		let mut chains: Vec<Chain> = self.chains.read().await.values().cloned().collect();
		chains.sort_by_key(|c| c.chain_id);
		chains
	}
}

#[async_trait]
impl<S: ScanCursorStorage> ChainRegistry for ChainService<S> {
	async fn list_active(&self) -> Vec<Chain> {
		let mut chains: Vec<Chain> = self
			.chains
			.read()
			.await
			.values()
			.filter(|c| c.is_active)
			.cloned()
			.collect();
		chains.sort_by_key(|c| c.chain_id);
		chains
	}

	async fn get(&self, chain_id: u64) -> Option<Chain> {
		self.chains.read().await.get(&chain_id).cloned()
	}

	async fn advance_scan_cursor(
		&self,
		chain_id: u64,
		new_height: u64,
	) -> Result<bool, RepositoryError> {
		let mut chains = self.chains.write().await;
		let chain = chains
			.get_mut(&chain_id)
			.ok_or_else(|| RepositoryError::not_found(format!("chain {}", chain_id)))?;

		if new_height <= chain.last_scanned_block {
			return Ok(false);
		}

		// Persist first; the in-memory cursor never runs ahead of the stored one
		self.storage
			.save_last_scanned_block(&chain.name, new_height)
			.await?;
		chain.last_scanned_block = new_height;
		CHAIN_LAST_SCANNED_BLOCK
			.with_label_values(&[chain.name.as_str()])
			.set(new_height as f64);
		Ok(true)
	}
}
