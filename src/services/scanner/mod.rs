//! Deposit detection: per-chain scan passes over token transfers.

mod error;
mod service;

pub use error::ScannerError;
pub use service::{DepositScanner, ScanReport};
