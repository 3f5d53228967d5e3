//! Downstream collaborator error types.

use log::error;
use thiserror::Error;

/// Errors raised while setting up or calling a downstream collaborator
#[derive(Debug, Error)]
pub enum DownstreamError {
	/// The collaborator endpoint is misconfigured
	#[error("Configuration error: {0}")]
	ConfigError(String),

	/// The request could not be built or signed
	#[error("Request error: {0}")]
	RequestError(String),
}

impl DownstreamError {
	/// Creates a new configuration error with logging
	pub fn config_error(msg: impl Into<String>) -> Self {
		let error = Self::ConfigError(msg.into());
		error!("{}", error);
		error
	}

	/// Creates a new request error with logging
	pub fn request_error(msg: impl Into<String>) -> Self {
		let error = Self::RequestError(msg.into());
		error!("{}", error);
		error
	}
}
