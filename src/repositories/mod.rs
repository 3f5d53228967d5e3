//! Repositories for chains, deposit addresses and deposits.
//!
//! - `chain`: chain configurations, the chain registry and scan cursor storage
//! - `deposit_address`: user ↔ deposit address ownership
//! - `deposit`: the deposit ledger

mod chain;
mod deposit;
mod deposit_address;
mod error;

pub use chain::{
	ChainRegistry, ChainRepository, ChainRepositoryTrait, ChainService, FileScanCursorStorage,
	ScanCursorStorage,
};
pub use deposit::{DepositRepository, DepositRepositoryTrait};
pub use deposit_address::{DepositAddressRepository, DepositAddressRepositoryTrait};
pub use error::RepositoryError;
