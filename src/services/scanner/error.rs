//! Deposit scanner error types.

use log::error;
use thiserror::Error;

use crate::{repositories::RepositoryError, services::lifecycle::LifecycleError};

#[derive(Debug, Error)]
pub enum ScannerError {
	/// The chain could not be read; the scan cursor is left untouched
	#[error("Chain unavailable: {0}")]
	ChainUnavailable(String),

	/// The chain is not registered
	#[error("Unknown chain: {0}")]
	UnknownChain(u64),

	/// Reading or writing the ledger or the scan cursor failed
	#[error("Storage error: {0}")]
	StorageError(String),
}

impl ScannerError {
	pub fn chain_unavailable(msg: impl Into<String>) -> Self {
		let error = Self::ChainUnavailable(msg.into());
		error!("{}", error);
		error
	}

	pub fn unknown_chain(chain_id: u64) -> Self {
		let error = Self::UnknownChain(chain_id);
		error!("{}", error);
		error
	}

	pub fn storage_error(msg: impl Into<String>) -> Self {
		let error = Self::StorageError(msg.into());
		error!("{}", error);
		error
	}
}

impl From<RepositoryError> for ScannerError {
	fn from(err: RepositoryError) -> Self {
		Self::storage_error(err.to_string())
	}
}

impl From<LifecycleError> for ScannerError {
	fn from(err: LifecycleError) -> Self {
		Self::storage_error(err.to_string())
	}
}
