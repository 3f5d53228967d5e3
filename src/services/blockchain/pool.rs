//! Client pool for managing chain clients.
//!
//! Clients are created lazily on first use and cached by chain id, so every scan of a
//! chain reuses the same transport and its endpoint rotation state.

use async_trait::async_trait;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;

use crate::{
	models::Chain,
	services::blockchain::{
		transports::HttpTransportClient, BlockChainError, EvmClient, EvmClientTrait,
	},
};

/// Trait for the client pool.
#[async_trait]
pub trait ClientPoolTrait: Send + Sync {
	type EvmClient: EvmClientTrait + 'static;

	async fn get_evm_client(&self, chain: &Chain) -> Result<Arc<Self::EvmClient>, BlockChainError>;
}

/// Thread-safe storage of clients keyed by chain id
pub struct ClientStorage<T> {
	clients: Arc<RwLock<HashMap<u64, Arc<T>>>>,
}

impl<T> ClientStorage<T> {
	pub fn new() -> Self {
		Self {
			clients: Arc::new(RwLock::new(HashMap::new())),
		}
	}
}

impl<T> Default for ClientStorage<T> {
	fn default() -> Self {
		Self::new()
	}
}

/// Pool of EVM clients backed by HTTP transports
pub struct ClientPool {
	evm_clients: ClientStorage<EvmClient<HttpTransportClient>>,
}

impl ClientPool {
	pub fn new() -> Self {
		Self {
			evm_clients: ClientStorage::new(),
		}
	}

	/// Get the number of cached clients
	pub async fn get_client_count(&self) -> usize {
		self.evm_clients.clients.read().await.len()
	}
}

#[async_trait]
impl ClientPoolTrait for ClientPool {
	type EvmClient = EvmClient<HttpTransportClient>;

	/// Gets or creates an EVM client for the given chain.
	///
	/// Uses double-checked locking: a read lock for the common case, and a write lock
	/// with a second lookup when the client has to be created.
	async fn get_evm_client(&self, chain: &Chain) -> Result<Arc<Self::EvmClient>, BlockChainError> {
		if let Some(client) = self.evm_clients.clients.read().await.get(&chain.chain_id) {
			return Ok(client.clone());
		}

		let mut clients = self.evm_clients.clients.write().await;
		if let Some(client) = clients.get(&chain.chain_id) {
			return Ok(client.clone());
		}

		let transport = HttpTransportClient::new(chain).await?;
		let client = Arc::new(EvmClient::new_with_transport(transport));
		clients.insert(chain.chain_id, client.clone());
		Ok(client)
	}
}

impl Default for ClientPool {
	fn default() -> Self {
		Self::new()
	}
}
