//! EVM-compatible chain client implementation.
//!
//! Wraps a JSON-RPC transport with the three calls deposit scanning needs: the head
//! height, ERC-20 `Transfer` logs of one token, and block headers.

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::{
	models::{EVMBlockHeader, EVMLog, TRANSFER_EVENT_TOPIC},
	services::blockchain::{transports::BlockchainTransport, BlockChainError},
	utils::parsing::{parse_hex_u64, to_hex_quantity},
};

/// Client implementation for Ethereum Virtual Machine (EVM) compatible chains
#[derive(Clone)]
pub struct EvmClient<T: BlockchainTransport + Clone> {
	/// The underlying transport client for RPC communication
	transport: T,
}

impl<T: BlockchainTransport + Clone> EvmClient<T> {
	/// Creates a new EVM client instance with a specific transport client
	pub fn new_with_transport(transport: T) -> Self {
		Self { transport }
	}

	/// Sends a request and unwraps the JSON-RPC `result` member
	async fn call(&self, method: &str, params: Value) -> Result<Value, BlockChainError> {
		let response = self.transport.send_raw_request(method, params).await?;

		if let Some(error) = response.get("error") {
			let message = error
				.get("message")
				.and_then(Value::as_str)
				.unwrap_or("unknown error");
			return Err(BlockChainError::request_error(format!(
				"{} failed: {}",
				method, message
			)));
		}

		response.get("result").cloned().ok_or_else(|| {
			BlockChainError::malformed_response(format!("{} response has no result", method))
		})
	}
}

/// Calls against an EVM node used by the deposit scanner
#[async_trait]
pub trait EvmClientTrait: Send + Sync {
	/// Retrieves the latest block number
	async fn get_latest_block_number(&self) -> Result<u64, BlockChainError>;

	/// Retrieves `Transfer` logs emitted by `token_address` in `[from_block, to_block]`
	async fn get_transfer_logs(
		&self,
		from_block: u64,
		to_block: u64,
		token_address: &str,
	) -> Result<Vec<EVMLog>, BlockChainError>;

	/// Retrieves the header of a block, `None` if the node does not know it
	async fn get_block_header(
		&self,
		block_number: u64,
	) -> Result<Option<EVMBlockHeader>, BlockChainError>;
}

#[async_trait]
impl<T: BlockchainTransport + Clone> EvmClientTrait for EvmClient<T> {
	async fn get_latest_block_number(&self) -> Result<u64, BlockChainError> {
		let result = self.call("eth_blockNumber", json!([])).await?;
		let hex = result.as_str().ok_or_else(|| {
			BlockChainError::malformed_response("eth_blockNumber result is not a string")
		})?;
		parse_hex_u64(hex).map_err(BlockChainError::malformed_response)
	}

	async fn get_transfer_logs(
		&self,
		from_block: u64,
		to_block: u64,
		token_address: &str,
	) -> Result<Vec<EVMLog>, BlockChainError> {
		let filter = json!([{
			"fromBlock": to_hex_quantity(from_block),
			"toBlock": to_hex_quantity(to_block),
			"address": token_address,
			"topics": [TRANSFER_EVENT_TOPIC]
		}]);

		let result = self.call("eth_getLogs", filter).await?;
		serde_json::from_value(result).map_err(|e| {
			BlockChainError::malformed_response(format!("Failed to parse logs: {}", e))
		})
	}

	async fn get_block_header(
		&self,
		block_number: u64,
	) -> Result<Option<EVMBlockHeader>, BlockChainError> {
		let params = json!([to_hex_quantity(block_number), false]);
		let result = self.call("eth_getBlockByNumber", params).await?;

		if result.is_null() {
			return Ok(None);
		}

		serde_json::from_value(result).map(Some).map_err(|e| {
			BlockChainError::malformed_response(format!(
				"Failed to parse block {}: {}",
				block_number, e
			))
		})
	}
}
