//! Service wiring.
//!
//! Loads configuration from a config directory and connects the registry, ledger,
//! chain reader, downstream collaborators, lifecycle driver, scanner and scheduler.
//!
//! Expected layout of the config directory:
//! - `chains/*.json`
//! - `deposit_addresses/*.json`
//! - `scanner.json` (optional)

use std::{error::Error, path::Path, sync::Arc};

use crate::{
	models::{CollaboratorEndpoint, ScannerConfig},
	repositories::{
		ChainRegistry, ChainRepository, ChainService, DepositAddressRepository,
		DepositAddressRepositoryTrait, DepositRepository, DepositRepositoryTrait,
		FileScanCursorStorage,
	},
	services::{
		blockchain::{ChainReader, ClientPool, EvmChainReader},
		downstream::{
			CreditingService, DisabledCollaborator, DownstreamError, HttpCreditingService,
			HttpMirroringService, MirroringService,
		},
		lifecycle::DepositLifecycleDriver,
		scanner::DepositScanner,
		scheduler::ScanScheduler,
	},
	utils::http::HttpRetryConfig,
};

/// Type alias for results of the bootstrap functions
pub type Result<T> = std::result::Result<T, Box<dyn Error + Send + Sync>>;

/// File name of the deposit snapshot inside the data directory
pub const DEPOSIT_SNAPSHOT_FILE: &str = "deposits.json";

/// Fully wired services
pub struct Services {
	pub config: ScannerConfig,
	pub registry: Arc<dyn ChainRegistry>,
	pub deposits: Arc<dyn DepositRepositoryTrait>,
	pub driver: Arc<DepositLifecycleDriver>,
	pub scanner: Arc<DepositScanner>,
	pub scheduler: Arc<ScanScheduler>,
}

/// External boundaries of the service, injectable for tests
pub struct Boundaries {
	pub reader: Arc<dyn ChainReader>,
	pub crediting: Arc<dyn CreditingService>,
	pub mirroring: Arc<dyn MirroringService>,
}

/// Loads configuration and state from disk and wires every service
pub async fn initialize_services(config_dir: &Path) -> Result<Services> {
	let config = ScannerConfig::load_or_default(config_dir)?;
	let data_dir = Path::new(&config.data_dir);

	let chain_repository = ChainRepository::new(Some(&config_dir.join("chains")))?;
	let registry: Arc<dyn ChainRegistry> = Arc::new(
		ChainService::new_with_repository(
			&chain_repository,
			Arc::new(FileScanCursorStorage::new(data_dir)),
		)
		.await?,
	);
	let addresses: Arc<dyn DepositAddressRepositoryTrait> = Arc::new(
		DepositAddressRepository::new(Some(&config_dir.join("deposit_addresses")))?,
	);
	let deposits: Arc<dyn DepositRepositoryTrait> =
		Arc::new(DepositRepository::with_snapshot(data_dir.join(DEPOSIT_SNAPSHOT_FILE)).await?);

	let (crediting, mirroring) = create_collaborators(&config)?;
	let boundaries = Boundaries {
		reader: Arc::new(EvmChainReader::new(Arc::new(ClientPool::new()))),
		crediting,
		mirroring,
	};

	tracing::info!(
		"Loaded {} active chains and {} deposit addresses",
		registry.list_active().await.len(),
		addresses.get_all().len()
	);

	Ok(wire_services(config, registry, deposits, addresses, boundaries))
}

/// Builds the crediting and mirroring clients
///
/// A collaborator without a configured endpoint is replaced by one that defers
/// every call, leaving deposits for a later reconciliation pass.
pub fn create_collaborators(
	config: &ScannerConfig,
) -> std::result::Result<(Arc<dyn CreditingService>, Arc<dyn MirroringService>), DownstreamError>
{
	let retry_config = HttpRetryConfig::default();

	let crediting: Arc<dyn CreditingService> = match &config.crediting {
		Some(endpoint) => {
			log_endpoint("crediting", endpoint);
			Arc::new(HttpCreditingService::new(endpoint, &retry_config)?)
		}
		None => Arc::new(DisabledCollaborator::new("crediting")),
	};
	let mirroring: Arc<dyn MirroringService> = match &config.mirroring {
		Some(endpoint) => {
			log_endpoint("mirroring", endpoint);
			Arc::new(HttpMirroringService::new(endpoint, &retry_config)?)
		}
		None => Arc::new(DisabledCollaborator::new("mirroring")),
	};

	Ok((crediting, mirroring))
}

fn log_endpoint(name: &str, endpoint: &CollaboratorEndpoint) {
	tracing::info!(
		"Using {} endpoint {} ({})",
		name,
		endpoint.url,
		if endpoint.secret.is_some() {
			"signed"
		} else {
			"unsigned"
		}
	);
}

/// Connects already-built repositories and boundaries
pub fn wire_services(
	config: ScannerConfig,
	registry: Arc<dyn ChainRegistry>,
	deposits: Arc<dyn DepositRepositoryTrait>,
	addresses: Arc<dyn DepositAddressRepositoryTrait>,
	boundaries: Boundaries,
) -> Services {
	let driver = Arc::new(DepositLifecycleDriver::new(
		deposits.clone(),
		boundaries.crediting,
		boundaries.mirroring,
	));
	let scanner = Arc::new(DepositScanner::new(
		registry.clone(),
		boundaries.reader,
		deposits.clone(),
		addresses,
		driver.clone(),
		config.clone(),
	));
	let scheduler = Arc::new(ScanScheduler::new(
		registry.clone(),
		scanner.clone(),
		driver.clone(),
		config.cron_schedule.clone(),
	));

	Services {
		config,
		registry,
		deposits,
		driver,
		scanner,
		scheduler,
	}
}
