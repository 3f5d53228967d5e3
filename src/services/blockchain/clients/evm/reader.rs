//! [`ChainReader`] implementation for EVM chains.

use async_trait::async_trait;
use std::{collections::HashMap, sync::Arc};

use crate::{
	models::{Chain, TokenTransfer},
	services::blockchain::{BlockChainError, ChainReader, ClientPoolTrait, EvmClientTrait},
};

/// Reads USDC transfers from EVM chains through pooled clients
pub struct EvmChainReader<P: ClientPoolTrait> {
	pool: Arc<P>,
}

impl<P: ClientPoolTrait> EvmChainReader<P> {
	pub fn new(pool: Arc<P>) -> Self {
		Self { pool }
	}
}

#[async_trait]
impl<P: ClientPoolTrait> ChainReader for EvmChainReader<P> {
	async fn current_height(&self, chain: &Chain) -> Result<u64, BlockChainError> {
		let client = self.pool.get_evm_client(chain).await?;
		client.get_latest_block_number().await
	}

	async fn transfers_to(
		&self,
		chain: &Chain,
		from_block: u64,
		to_block: u64,
		token_address: &str,
	) -> Result<Vec<TokenTransfer>, BlockChainError> {
		if from_block > to_block {
			return Ok(Vec::new());
		}

		let client = self.pool.get_evm_client(chain).await?;
		let token_address = token_address.to_lowercase();
		let logs = client
			.get_transfer_logs(from_block, to_block, &token_address)
			.await?;

		let mut transfers = Vec::with_capacity(logs.len());
		for log in logs {
			if log.removed {
				tracing::debug!(
					"Dropping removed log {:?} on chain {}",
					log.transaction_hash,
					chain.name
				);
				continue;
			}
			if !log.address.eq_ignore_ascii_case(&token_address) {
				continue;
			}
			match log.to_token_transfer() {
				Ok(transfer) => transfers.push(transfer),
				Err(e) => tracing::warn!("Skipping malformed log on chain {}: {}", chain.name, e),
			}
		}

		// Nodes rarely include timestamps in logs; fill them from block headers
		let mut headers = HashMap::new();
		for transfer in transfers.iter_mut() {
			if transfer.block_timestamp.is_some() && transfer.block_hash.is_some() {
				continue;
			}
			if !headers.contains_key(&transfer.block_number) {
				let header = client.get_block_header(transfer.block_number).await?;
				headers.insert(transfer.block_number, header);
			}
			if let Some(Some(header)) = headers.get(&transfer.block_number) {
				if transfer.block_timestamp.is_none() {
					transfer.block_timestamp = header.timestamp();
				}
				if transfer.block_hash.is_none() {
					transfer.block_hash = header.hash.as_ref().map(|h| h.to_lowercase());
				}
			}
		}

		transfers.sort_by_key(|transfer| transfer.position());
		Ok(transfers)
	}

	async fn block_hash(
		&self,
		chain: &Chain,
		block_number: u64,
	) -> Result<Option<String>, BlockChainError> {
		let client = self.pool.get_evm_client(chain).await?;
		let header = client.get_block_header(block_number).await?;
		Ok(header.and_then(|h| h.hash).map(|h| h.to_lowercase()))
	}
}
