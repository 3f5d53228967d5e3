//! Configuration loading and validation.
//!
//! Chains, deposit addresses and scanner settings are read from JSON files under the
//! `config/` directory:
//!
//! - `config/chains/*.json`: one [`Chain`](crate::models::Chain) per file
//! - `config/deposit_addresses/*.json`: one address or an array of addresses per file
//! - `config/scanner.json`: optional [`ScannerConfig`](crate::models::ScannerConfig)

use std::path::Path;

mod chain_config;
mod deposit_address_config;
mod error;
mod scanner_config;

pub use error::ConfigError;

/// Common interface for loading configuration files
pub trait ConfigLoader: Sized {
	fn load_all<T>(path: Option<&Path>) -> Result<T, ConfigError>
	where
		T: FromIterator<(String, Self)>;

	fn load_from_path(path: &Path) -> Result<Self, ConfigError>;

	fn validate(&self) -> Result<(), String>;

	fn is_json_file(path: &Path) -> bool {
		path.extension()
			.map(|ext| ext.to_string_lossy().to_lowercase() == "json")
			.unwrap_or(false)
	}
}
