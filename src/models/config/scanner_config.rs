//! Scanner configuration loading and validation.
//!
//! The scanner settings live in a single optional `scanner.json` file inside the
//! configuration directory. When the file is absent the defaults are used.

use std::{path::Path, str::FromStr};

use crate::models::{config::error::ConfigError, ConfigLoader, ScannerConfig};

/// File name of the scanner settings inside the configuration directory
const SCANNER_CONFIG_FILE: &str = "scanner.json";

impl ScannerConfig {
	/// Loads `scanner.json` from the given configuration directory, falling back to
	/// the defaults when the file does not exist
	pub fn load_or_default(config_dir: &Path) -> Result<Self, ConfigError> {
		let path = config_dir.join(SCANNER_CONFIG_FILE);
		if !path.exists() {
			log::info!(
				"No {} found in {}, using default scanner settings",
				SCANNER_CONFIG_FILE,
				config_dir.display()
			);
			return Ok(Self::default());
		}
		Self::load_from_path(&path)
	}
}

impl ConfigLoader for ScannerConfig {
	/// Yields at most one entry, keyed `"scanner"`
	fn load_all<T>(path: Option<&Path>) -> Result<T, ConfigError>
	where
		T: FromIterator<(String, Self)>,
	{
		let config_dir = path.unwrap_or(Path::new("config"));
		let config = Self::load_or_default(config_dir)?;
		Ok(T::from_iter([("scanner".to_string(), config)]))
	}

	fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
		let file = std::fs::File::open(path)?;
		let config: ScannerConfig = serde_json::from_reader(file)?;

		if let Err(validation_error) = config.validate() {
			return Err(ConfigError::validation_error(validation_error));
		}

		Ok(config)
	}

	fn validate(&self) -> Result<(), String> {
		if let Err(e) = cron::Schedule::from_str(&self.cron_schedule) {
			return Err(format!(
				"Invalid cron schedule '{}': {}",
				self.cron_schedule, e
			));
		}

		if self.max_blocks_per_scan == 0 {
			return Err("max_blocks_per_scan must be greater than 0".to_string());
		}

		if self.currency.trim().is_empty() {
			return Err("currency must not be empty".to_string());
		}

		for (name, endpoint) in [("crediting", &self.crediting), ("mirroring", &self.mirroring)] {
			if let Some(endpoint) = endpoint {
				if url::Url::parse(&endpoint.url).is_err() {
					return Err(format!("Invalid {} URL: {}", name, endpoint.url));
				}
			}
		}

		Ok(())
	}
}
