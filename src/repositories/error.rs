//! Error types for repository operations.
//!
//! Covers loading chains and deposit addresses from configuration, persisting scan
//! cursors and deposit snapshots, and lookups of unknown records.

use log::error;
use thiserror::Error;

/// Errors that can occur during repository operations
#[derive(Debug, Error)]
pub enum RepositoryError {
	/// Error that occurs when configuration validation fails
	#[error("Validation error: {0}")]
	ValidationError(String),

	/// Error that occurs when loading configurations or state from files
	#[error("Load error: {0}")]
	LoadError(String),

	/// Error that occurs when persisting state
	#[error("Storage error: {0}")]
	StorageError(String),

	/// The referenced record does not exist
	#[error("Not found: {0}")]
	NotFound(String),

	/// Error that occurs due to internal repository operations
	#[error("Internal error: {0}")]
	InternalError(String),
}

impl RepositoryError {
	/// Create a new validation error with the given message
	///
	/// Also logs the error message at the error level.
	pub fn validation_error(msg: impl Into<String>) -> Self {
		let error = Self::ValidationError(msg.into());
		error!("{}", error);
		error
	}

	/// Create a new load error with the given message
	///
	/// Also logs the error message at the error level.
	pub fn load_error(msg: impl Into<String>) -> Self {
		let error = Self::LoadError(msg.into());
		error!("{}", error);
		error
	}

	/// Create a new storage error with the given message
	///
	/// Also logs the error message at the error level.
	pub fn storage_error(msg: impl Into<String>) -> Self {
		let error = Self::StorageError(msg.into());
		error!("{}", error);
		error
	}

	/// Create a new not found error with the given message
	///
	/// Also logs the error message at the error level.
	pub fn not_found(msg: impl Into<String>) -> Self {
		let error = Self::NotFound(msg.into());
		error!("{}", error);
		error
	}

	/// Create a new internal error with the given message
	///
	/// Also logs the error message at the error level.
	pub fn internal_error(msg: impl Into<String>) -> Self {
		let error = Self::InternalError(msg.into());
		error!("{}", error);
		error
	}
}

impl From<std::io::Error> for RepositoryError {
	fn from(err: std::io::Error) -> Self {
		Self::storage_error(err.to_string())
	}
}

impl From<serde_json::Error> for RepositoryError {
	fn from(err: serde_json::Error) -> Self {
		Self::load_error(err.to_string())
	}
}
