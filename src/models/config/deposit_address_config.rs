//! Deposit address configuration loading and validation.
//!
//! A file may contain a single address object or an array of them, so that address
//! exports from the user service can be dropped in as-is.

use std::path::Path;

use crate::{
	models::{config::error::ConfigError, ConfigLoader, DepositAddress},
	utils::parsing::is_evm_address,
};

impl DepositAddress {
	/// Parses every address in a file, accepting an object or an array
	fn load_many_from_path(path: &Path) -> Result<Vec<Self>, ConfigError> {
		let file = std::fs::File::open(path)?;
		let value: serde_json::Value = serde_json::from_reader(file)?;

		let addresses: Vec<DepositAddress> = match value {
			serde_json::Value::Array(_) => serde_json::from_value(value)?,
			_ => vec![serde_json::from_value(value)?],
		};

		for address in &addresses {
			address
				.validate()
				.map_err(ConfigError::validation_error)?;
		}

		Ok(addresses)
	}
}

impl ConfigLoader for DepositAddress {
	/// Load all deposit addresses from a directory, keyed by address id
	///
	/// Unlike chain files, a bad address file fails the whole load: skipping it would
	/// leave its users without an owner and their transfers unrecorded.
	fn load_all<T>(path: Option<&Path>) -> Result<T, ConfigError>
	where
		T: FromIterator<(String, Self)>,
	{
		let address_dir = path.unwrap_or(Path::new("config/deposit_addresses"));
		let mut pairs = Vec::new();

		if !address_dir.exists() {
			return Err(ConfigError::file_error(
				"deposit_addresses directory not found",
			));
		}

		for entry in std::fs::read_dir(address_dir)? {
			let entry = entry?;
			let path = entry.path();

			if !Self::is_json_file(&path) {
				continue;
			}

			let addresses = Self::load_many_from_path(&path)
				.map_err(|e| ConfigError::invalid_file(&path, e))?;
			pairs.extend(addresses.into_iter().map(|a| (a.id.to_string(), a)));
		}

		Ok(T::from_iter(pairs))
	}

	fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
		let file = std::fs::File::open(path)?;
		let config: DepositAddress = serde_json::from_reader(file)?;

		if let Err(validation_error) = config.validate() {
			return Err(ConfigError::validation_error(validation_error));
		}

		Ok(config)
	}

	fn validate(&self) -> Result<(), String> {
		if !is_evm_address(&self.deposit_address) {
			return Err(format!(
				"Invalid deposit address for user {}: {}",
				self.user_id, self.deposit_address
			));
		}
		Ok(())
	}
}
