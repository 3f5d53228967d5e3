//! Scan scheduler error types.

use log::error;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchedulerError {
	/// Creating, starting or stopping the cron scheduler failed
	#[error("Scheduler error: {0}")]
	SchedulerError(String),

	/// The chain is not registered
	#[error("Unknown chain: {0}")]
	UnknownChain(u64),
}

impl SchedulerError {
	pub fn scheduler_error(msg: impl Into<String>) -> Self {
		let error = Self::SchedulerError(msg.into());
		error!("{}", error);
		error
	}

	pub fn unknown_chain(chain_id: u64) -> Self {
		let error = Self::UnknownChain(chain_id);
		error!("{}", error);
		error
	}
}
