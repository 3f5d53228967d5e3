//! Lifecycle driver error types.

use log::error;
use thiserror::Error;

use crate::repositories::RepositoryError;

#[derive(Debug, Error)]
pub enum LifecycleError {
	/// The deposit does not exist in the ledger
	#[error("Deposit not found: {0}")]
	NotFound(String),

	/// Reading or writing the ledger failed
	#[error("Storage error: {0}")]
	StorageError(String),
}

impl LifecycleError {
	pub fn not_found(msg: impl Into<String>) -> Self {
		let error = Self::NotFound(msg.into());
		error!("{}", error);
		error
	}

	pub fn storage_error(msg: impl Into<String>) -> Self {
		let error = Self::StorageError(msg.into());
		error!("{}", error);
		error
	}
}

impl From<RepositoryError> for LifecycleError {
	fn from(err: RepositoryError) -> Self {
		match err {
			RepositoryError::NotFound(msg) => Self::not_found(msg),
			other => Self::storage_error(other.to_string()),
		}
	}
}
