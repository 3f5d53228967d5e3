//! Service wiring used by the integration tests.

use deposit_monitor::{
	bootstrap::{wire_services, Boundaries, Services},
	models::{Chain, ScannerConfig},
	repositories::{
		ChainRegistry, ChainRepository, ChainService, DepositAddressRepository,
		DepositRepository, FileScanCursorStorage,
	},
	services::{
		blockchain::ChainReader,
		downstream::{CreditingService, DisabledCollaborator, MirroringService},
	},
	utils::tests::builders::{chain::ChainBuilder, deposit_address::DepositAddressBuilder},
};
use std::sync::Arc;
use tempfile::TempDir;
use uuid::Uuid;

pub const DEPOSIT_ADDRESS: &str = "0x2222222222222222222222222222222222222222";

pub struct Harness {
	pub services: Services,
	pub deposits: Arc<DepositRepository>,
	pub data_dir: TempDir,
}

pub struct HarnessBuilder {
	chains: Vec<Chain>,
	owners: Vec<(u64, Uuid)>,
	config: ScannerConfig,
	deposits: Option<Arc<DepositRepository>>,
	crediting: Arc<dyn CreditingService>,
	mirroring: Arc<dyn MirroringService>,
}

impl HarnessBuilder {
	pub fn new() -> Self {
		Self {
			chains: Vec::new(),
			owners: Vec::new(),
			config: ScannerConfig::default(),
			deposits: None,
			crediting: Arc::new(DisabledCollaborator::new("crediting")),
			mirroring: Arc::new(DisabledCollaborator::new("mirroring")),
		}
	}

	pub fn chain(mut self, chain: Chain) -> Self {
		self.chains.push(chain);
		self
	}

	/// Registers `user` as the owner of [`DEPOSIT_ADDRESS`] on `chain_id`
	pub fn owner(mut self, chain_id: u64, user: Uuid) -> Self {
		self.owners.push((chain_id, user));
		self
	}

	pub fn config(mut self, config: ScannerConfig) -> Self {
		self.config = config;
		self
	}

	/// Shares a ledger with another harness, as after a restart
	pub fn deposits(mut self, deposits: Arc<DepositRepository>) -> Self {
		self.deposits = Some(deposits);
		self
	}

	pub fn crediting(mut self, crediting: impl CreditingService + 'static) -> Self {
		self.crediting = Arc::new(crediting);
		self
	}

	pub fn mirroring(mut self, mirroring: impl MirroringService + 'static) -> Self {
		self.mirroring = Arc::new(mirroring);
		self
	}

	pub async fn build(self, reader: impl ChainReader + 'static) -> Harness {
		let data_dir = TempDir::new().unwrap();
		let chains = if self.chains.is_empty() {
			vec![ChainBuilder::new().build()]
		} else {
			self.chains
		};

		let registry = Arc::new(
			ChainService::new_with_repository(
				&ChainRepository::new_with_chains(chains),
				Arc::new(FileScanCursorStorage::new(data_dir.path())),
			)
			.await
			.unwrap(),
		);
		let addresses = Arc::new(DepositAddressRepository::new_with_addresses(
			self.owners
				.into_iter()
				.map(|(chain_id, user)| {
					DepositAddressBuilder::new()
						.chain_id(chain_id)
						.user_id(user)
						.address(DEPOSIT_ADDRESS)
						.build()
				})
				.collect(),
		));
		let deposits = self
			.deposits
			.unwrap_or_else(|| Arc::new(DepositRepository::new()));

		let services = wire_services(
			self.config,
			registry,
			deposits.clone(),
			addresses,
			Boundaries {
				reader: Arc::new(reader),
				crediting: self.crediting,
				mirroring: self.mirroring,
			},
		);

		Harness {
			services,
			deposits,
			data_dir,
		}
	}
}

impl Harness {
	pub async fn cursor(&self, chain_id: u64) -> u64 {
		self.services
			.registry
			.get(chain_id)
			.await
			.unwrap()
			.last_scanned_block
	}
}
