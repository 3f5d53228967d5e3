//! Chain configuration loading and validation.

use std::path::Path;

use crate::{
	models::{config::error::ConfigError, Chain, ConfigLoader},
	utils::parsing::is_evm_address,
};

/// Highest decimal precision accepted for a token
const MAX_TOKEN_DECIMALS: u32 = 18;

impl ConfigLoader for Chain {
	/// Load all chain configurations from a directory
	///
	/// Files that fail to parse or validate are skipped so that one broken chain does
	/// not prevent the others from being monitored. Entries are keyed by chain name.
	fn load_all<T>(path: Option<&Path>) -> Result<T, ConfigError>
	where
		T: FromIterator<(String, Self)>,
	{
		let chain_dir = path.unwrap_or(Path::new("config/chains"));
		let mut pairs = Vec::new();

		if !chain_dir.exists() {
			return Err(ConfigError::file_error("chains directory not found"));
		}

		for entry in std::fs::read_dir(chain_dir)? {
			let entry = entry?;
			let path = entry.path();

			if !Self::is_json_file(&path) {
				continue;
			}

			match Self::load_from_path(&path) {
				Ok(chain) => pairs.push((chain.name.clone(), chain)),
				Err(e) => log::warn!("Skipping chain config {}: {}", path.display(), e),
			}
		}

		Ok(T::from_iter(pairs))
	}

	fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
		let file = std::fs::File::open(path)?;
		let config: Chain = serde_json::from_reader(file)?;

		// Validate the config after loading
		if let Err(validation_error) = config.validate() {
			return Err(ConfigError::validation_error(validation_error));
		}

		Ok(config)
	}

	fn validate(&self) -> Result<(), String> {
		// Validate name
		if self.name.is_empty()
			|| !self
				.name
				.chars()
				.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
		{
			return Err(
				"Chain name must contain only lowercase letters, numbers, and underscores"
					.to_string(),
			);
		}

		if self.rpc_urls.is_empty() {
			return Err("At least one RPC URL is required".to_string());
		}

		// Validate RPC URL types
		let supported_types = ["rpc"];
		if !self
			.rpc_urls
			.iter()
			.all(|rpc_url| supported_types.contains(&rpc_url.type_.as_str()))
		{
			return Err(format!(
				"RPC URL type must be one of: {}",
				supported_types.join(", ")
			));
		}

		// Validate RPC URLs format
		if !self.rpc_urls.iter().all(|rpc_url| {
			rpc_url.url.starts_with("http://") || rpc_url.url.starts_with("https://")
		}) {
			return Err("All RPC URLs must start with http:// or https://".to_string());
		}

		// Validate RPC URL weights
		if !self.rpc_urls.iter().all(|rpc_url| rpc_url.weight <= 100) {
			return Err("All RPC URL weights must be between 0 and 100".to_string());
		}

		if !is_evm_address(&self.usdc_token_address) {
			return Err(format!(
				"Invalid token address: {}",
				self.usdc_token_address
			));
		}

		if self.usdc_decimals > MAX_TOKEN_DECIMALS {
			return Err(format!(
				"Token decimals must be at most {}",
				MAX_TOKEN_DECIMALS
			));
		}

		if self.required_confirmations == 0 {
			return Err("Required confirmations must be greater than 0".to_string());
		}

		Ok(())
	}
}
