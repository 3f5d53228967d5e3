//! Domain models and data structures for deposit monitoring.
//!
//! - `blockchain`: transfer events read from chains and their EVM wire types
//! - `config`: Configuration loading and validation
//! - `core`: Core domain models (Chain, Deposit, DepositAddress, ScannerConfig)

mod blockchain;
mod config;
mod core;

// Re-export blockchain types
pub use blockchain::TokenTransfer;

pub use blockchain::evm::{EVMBlockHeader, EVMLog, TRANSFER_EVENT_TOPIC};

// Re-export core types
pub use core::{
	Chain, CollaboratorEndpoint, Deposit, DepositAddress, DepositMethod, DepositStatus,
	ProcessingStatus, RpcUrl, ScannerConfig, DEFAULT_CRON_SCHEDULE, DEFAULT_MAX_BLOCKS_PER_SCAN,
	DEFAULT_REQUIRED_CONFIRMATIONS, DEFAULT_USDC_DECIMALS, USDC_CURRENCY,
};

// Re-export config types
pub use config::{ConfigError, ConfigLoader};
