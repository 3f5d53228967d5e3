//! Blockchain error types and handling.
//!
//! Every failure to read chain state surfaces as a [`BlockChainError`]. Callers treat
//! all variants except [`BlockChainError::MalformedResponse`] as transient: the scan is
//! aborted and the chain cursor stays where it was.

use log::error;
use thiserror::Error;

/// Represents possible errors that can occur while reading a chain
#[derive(Debug, Error)]
pub enum BlockChainError {
	/// The RPC endpoint could not be reached or returned an error status
	#[error("Chain unavailable: {0}")]
	ChainUnavailable(String),

	/// The node answered with a JSON-RPC error object
	#[error("Request error: {0}")]
	RequestError(String),

	/// The node answered with a payload that could not be decoded
	#[error("Malformed response: {0}")]
	MalformedResponse(String),

	/// When a requested block cannot be found on the chain
	#[error("Block not found: {0}")]
	BlockNotFound(u64),

	/// Client pool failed to create or hand out a client
	#[error("Client pool error: {0}")]
	ClientPoolError(String),
}

impl BlockChainError {
	/// Creates a new chain unavailable error with logging
	pub fn chain_unavailable(msg: impl Into<String>) -> Self {
		let error = Self::ChainUnavailable(msg.into());
		error!("{}", error);
		error
	}

	/// Creates a new request error with logging
	pub fn request_error(msg: impl Into<String>) -> Self {
		let error = Self::RequestError(msg.into());
		error!("{}", error);
		error
	}

	/// Creates a new malformed response error with logging
	pub fn malformed_response(msg: impl Into<String>) -> Self {
		let error = Self::MalformedResponse(msg.into());
		error!("{}", error);
		error
	}

	/// Creates a new block not found error with logging
	pub fn block_not_found(number: u64) -> Self {
		let error = Self::BlockNotFound(number);
		error!("{}", error);
		error
	}

	/// Creates a new client pool error with logging
	pub fn client_pool_error(msg: impl Into<String>) -> Self {
		let error = Self::ClientPoolError(msg.into());
		error!("{}", error);
		error
	}
}

impl From<anyhow::Error> for BlockChainError {
	fn from(err: anyhow::Error) -> Self {
		Self::chain_unavailable(format!("{:#}", err))
	}
}
