//! Core chain reader interface.
//!
//! The scanner only ever observes chain state through [`ChainReader`]; it never
//! writes to a chain.

use async_trait::async_trait;

use crate::{
	models::{Chain, TokenTransfer},
	services::blockchain::BlockChainError,
};

/// Read-only access to the state of a monitored chain
#[async_trait]
pub trait ChainReader: Send + Sync {
	/// Retrieves the latest block number of the chain
	async fn current_height(&self, chain: &Chain) -> Result<u64, BlockChainError>;

	/// Retrieves transfers of `token_address` mined in `[from_block, to_block]`
	///
	/// Transfers are ordered by `(block_number, log_index)`. An empty or inverted
	/// range yields no transfers.
	async fn transfers_to(
		&self,
		chain: &Chain,
		from_block: u64,
		to_block: u64,
		token_address: &str,
	) -> Result<Vec<TokenTransfer>, BlockChainError>;

	/// Retrieves the canonical block hash at a height, `None` if the block does not exist
	async fn block_hash(
		&self,
		chain: &Chain,
		block_number: u64,
	) -> Result<Option<String>, BlockChainError>;
}
