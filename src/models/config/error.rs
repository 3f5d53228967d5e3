//! Errors raised while loading chain, deposit address and scanner configuration.

use log::error;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
#[allow(clippy::enum_variant_names)]
pub enum ConfigError {
	/// A configuration value is out of range or malformed
	#[error("Validation error: {0}")]
	ValidationError(String),

	/// A configuration file is not valid JSON for its type
	#[error("Parse error: {0}")]
	ParseError(String),

	/// A configuration file or directory could not be read
	#[error("File error: {0}")]
	FileError(String),

	/// A file that must load completely could not be loaded
	#[error("Invalid configuration file {path}: {reason}")]
	InvalidFile { path: String, reason: String },
}

impl ConfigError {
	pub fn validation_error(msg: impl Into<String>) -> Self {
		let error = Self::ValidationError(msg.into());
		error!("{}", error);
		error
	}

	pub fn parse_error(msg: impl Into<String>) -> Self {
		let error = Self::ParseError(msg.into());
		error!("{}", error);
		error
	}

	pub fn file_error(msg: impl Into<String>) -> Self {
		let error = Self::FileError(msg.into());
		error!("{}", error);
		error
	}

	/// Wraps the error of a single file with the file's path
	pub fn invalid_file(path: &Path, reason: impl std::fmt::Display) -> Self {
		let error = Self::InvalidFile {
			path: path.display().to_string(),
			reason: reason.to_string(),
		};
		error!("{}", error);
		error
	}
}

impl From<std::io::Error> for ConfigError {
	fn from(err: std::io::Error) -> Self {
		Self::file_error(err.to_string())
	}
}

impl From<serde_json::Error> for ConfigError {
	fn from(err: serde_json::Error) -> Self {
		Self::parse_error(err.to_string())
	}
}
