mod chain;
mod deposit;
mod deposit_address;
mod scanner;

pub use chain::{Chain, RpcUrl, DEFAULT_REQUIRED_CONFIRMATIONS, DEFAULT_USDC_DECIMALS};
pub use deposit::{Deposit, DepositMethod, DepositStatus, ProcessingStatus, USDC_CURRENCY};
pub use deposit_address::DepositAddress;
pub use scanner::{
	CollaboratorEndpoint, ScannerConfig, DEFAULT_CRON_SCHEDULE, DEFAULT_MAX_BLOCKS_PER_SCAN,
};
