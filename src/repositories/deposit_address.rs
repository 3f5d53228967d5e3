//! User deposit address registry.
//!
//! Maps `(chain id, address)` to the users owning that address. Addresses are compared
//! case-insensitively. Lookups return every active owner so that the scanner can
//! detect an address registered to more than one user.

use std::{collections::HashMap, path::Path};
use uuid::Uuid;

use crate::{
	models::{ConfigLoader, DepositAddress},
	repositories::error::RepositoryError,
};

/// Lookup of deposit address ownership
pub trait DepositAddressRepositoryTrait: Send + Sync {
	/// Distinct users owning an active deposit address on a chain
	fn find_owners(&self, chain_id: u64, address: &str) -> Vec<Uuid>;

	fn get_all(&self) -> Vec<DepositAddress>;
}

/// In-memory deposit address registry
pub struct DepositAddressRepository {
	addresses: HashMap<(u64, String), Vec<DepositAddress>>,
}

impl DepositAddressRepository {
	/// Loads every address file under `path` (default `config/deposit_addresses`)
	pub fn new(path: Option<&Path>) -> Result<Self, RepositoryError> {
		let addresses: HashMap<String, DepositAddress> =
			DepositAddress::load_all(path).map_err(|e| {
				RepositoryError::load_error(format!("Failed to load deposit addresses: {}", e))
			})?;
		Ok(Self::new_with_addresses(addresses.into_values().collect()))
	}

	pub fn new_with_addresses(addresses: Vec<DepositAddress>) -> Self {
		let mut index: HashMap<(u64, String), Vec<DepositAddress>> = HashMap::new();
		for address in addresses {
			index
				.entry((address.chain_id, address.normalized_address()))
				.or_default()
				.push(address);
		}
		Self { addresses: index }
	}
}

impl DepositAddressRepositoryTrait for DepositAddressRepository {
	fn find_owners(&self, chain_id: u64, address: &str) -> Vec<Uuid> {
		let mut owners: Vec<Uuid> = self
			.addresses
			.get(&(chain_id, address.to_lowercase()))
			.map(|entries| {
				entries
					.iter()
					.filter(|entry| entry.is_active)
					.map(|entry| entry.user_id)
					.collect()
			})
			.unwrap_or_default();
		owners.sort();
		owners.dedup();
		owners
	}

	fn get_all(&self) -> Vec<DepositAddress> {
		self.addresses.values().flatten().cloned().collect()
	}
}
