use async_trait::async_trait;
use deposit_monitor::{
	models::{Chain, TokenTransfer},
	services::blockchain::{BlockChainError, ChainReader},
};
use mockall::mock;
use std::{
	collections::{HashMap, HashSet},
	sync::{Arc, Mutex},
};

mock! {
	pub ChainReader {}

	#[async_trait]
	impl ChainReader for ChainReader {
		async fn current_height(&self, chain: &Chain) -> Result<u64, BlockChainError>;
		async fn transfers_to(
			&self,
			chain: &Chain,
			from_block: u64,
			to_block: u64,
			token_address: &str,
		) -> Result<Vec<TokenTransfer>, BlockChainError>;
		async fn block_hash(
			&self,
			chain: &Chain,
			block_number: u64,
		) -> Result<Option<String>, BlockChainError>;
	}
}

#[derive(Default)]
struct ChainState {
	head: u64,
	transfers: Vec<TokenTransfer>,
	hash_overrides: HashMap<u64, Option<String>>,
}

/// Mutable state of several fake chains keyed by chain id
#[derive(Clone, Default)]
pub struct ScriptedChains {
	chains: Arc<Mutex<HashMap<u64, ChainState>>>,
	unavailable: Arc<Mutex<HashSet<u64>>>,
	reads: Arc<Mutex<Vec<(u64, u64, u64)>>>,
}

impl ScriptedChains {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn set_head(&self, chain_id: u64, head: u64) {
		self.chains.lock().unwrap().entry(chain_id).or_default().head = head;
	}

	pub fn add_transfer(&self, chain_id: u64, transfer: TokenTransfer) {
		self.chains
			.lock()
			.unwrap()
			.entry(chain_id)
			.or_default()
			.transfers
			.push(transfer);
	}

	/// Replaces the canonical hash of a block; `None` makes the block disappear
	pub fn set_block_hash(&self, chain_id: u64, block: u64, hash: Option<&str>) {
		self.chains
			.lock()
			.unwrap()
			.entry(chain_id)
			.or_default()
			.hash_overrides
			.insert(block, hash.map(str::to_string));
	}

	pub fn set_unavailable(&self, chain_id: u64, unavailable: bool) {
		let mut set = self.unavailable.lock().unwrap();
		if unavailable {
			set.insert(chain_id);
		} else {
			set.remove(&chain_id);
		}
	}

	/// Every `(chain id, from, to)` range read so far
	pub fn reads(&self) -> Vec<(u64, u64, u64)> {
		self.reads.lock().unwrap().clone()
	}

	fn check(&self, chain_id: u64) -> Result<(), BlockChainError> {
		if self.unavailable.lock().unwrap().contains(&chain_id) {
			return Err(BlockChainError::chain_unavailable(format!(
				"chain {} is down",
				chain_id
			)));
		}
		Ok(())
	}

	/// A mock reader answering from this state
	pub fn reader(&self) -> MockChainReader {
		let mut reader = MockChainReader::new();

		let state = self.clone();
		reader.expect_current_height().returning(move |chain| {
			state.check(chain.chain_id)?;
			Ok(state
				.chains
				.lock()
				.unwrap()
				.get(&chain.chain_id)
				.map(|c| c.head)
				.unwrap_or_default())
		});

		let state = self.clone();
		reader
			.expect_transfers_to()
			.returning(move |chain, from, to, _token| {
				state.check(chain.chain_id)?;
				state.reads.lock().unwrap().push((chain.chain_id, from, to));
				let chains = state.chains.lock().unwrap();
				let mut transfers: Vec<TokenTransfer> = chains
					.get(&chain.chain_id)
					.map(|c| {
						c.transfers
							.iter()
							.filter(|t| t.block_number >= from && t.block_number <= to)
							.cloned()
							.collect()
					})
					.unwrap_or_default();
				transfers.sort_by_key(|t| t.position());
				Ok(transfers)
			});

		let state = self.clone();
		reader.expect_block_hash().returning(move |chain, block| {
			state.check(chain.chain_id)?;
			let chains = state.chains.lock().unwrap();
			let overridden = chains
				.get(&chain.chain_id)
				.and_then(|c| c.hash_overrides.get(&block).cloned());
			Ok(overridden.unwrap_or_else(|| Some(format!("0x{:064x}", block))))
		});

		reader
	}
}
