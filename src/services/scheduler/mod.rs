//! Scheduling of deposit scans across chains.

mod error;
mod service;

pub use error::SchedulerError;
pub use service::{ChainScanOutcome, ScanScheduler};
