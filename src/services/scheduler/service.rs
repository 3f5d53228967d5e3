//! Periodic fan-out of deposit scans.
//!
//! Every tick spawns one task per active chain. A task holds its chain's lock for
//! the whole scan and reconciliation; a tick that finds the lock taken skips the
//! chain instead of waiting. Task errors and panics are logged and reported per
//! chain, never propagated to other chains.

use futures::future::join_all;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::{
	models::Chain,
	repositories::ChainRegistry,
	services::{
		lifecycle::{DepositLifecycleDriver, ReconcileReport},
		scanner::{DepositScanner, ScanReport},
		scheduler::SchedulerError,
	},
	utils::metrics::DEPOSIT_SCAN_ERRORS,
};

/// What happened to one chain during a tick or trigger
#[derive(Debug)]
pub enum ChainScanOutcome {
	/// The scan and the reconciliation pass both ran; either may have failed
	Ran {
		scan: Result<ScanReport, String>,
		reconciliation: Result<ReconcileReport, String>,
	},
	/// A previous scan of the chain was still running
	Skipped,
	/// The chain task panicked or was cancelled
	Aborted(String),
}

impl ChainScanOutcome {
	pub fn is_skipped(&self) -> bool {
		matches!(self, Self::Skipped)
	}

	pub fn scan_report(&self) -> Option<&ScanReport> {
		match self {
			Self::Ran { scan: Ok(report), .. } => Some(report),
			_ => None,
		}
	}
}

/// Runs guarded scan + reconciliation passes for single chains
struct ChainRunner {
	scanner: Arc<DepositScanner>,
	driver: Arc<DepositLifecycleDriver>,
	locks: Mutex<HashMap<u64, Arc<Mutex<()>>>>,
}

impl ChainRunner {
	async fn lock_for(&self, chain_id: u64) -> Arc<Mutex<()>> {
		self.locks
			.lock()
			.await
			.entry(chain_id)
			.or_default()
			.clone()
	}

	async fn run(&self, chain: &Chain) -> ChainScanOutcome {
		let lock = self.lock_for(chain.chain_id).await;
		let Ok(_guard) = lock.try_lock() else {
			tracing::info!("Scan of chain {} still running, skipping", chain.name);
			return ChainScanOutcome::Skipped;
		};

		let scan = self.scanner.scan(chain.chain_id).await.map_err(|e| {
			DEPOSIT_SCAN_ERRORS
				.with_label_values(&[chain.name.as_str()])
				.inc();
			tracing::error!("Scan of chain {} failed: {}", chain.name, e);
			e.to_string()
		});
		let reconciliation = self.driver.reconcile(chain.chain_id).await.map_err(|e| {
			tracing::error!("Reconciliation of chain {} failed: {}", chain.name, e);
			e.to_string()
		});

		ChainScanOutcome::Ran {
			scan,
			reconciliation,
		}
	}

	/// Runs the chain on its own task so a panic stays contained
	async fn run_isolated(self: Arc<Self>, chain: Chain) -> ChainScanOutcome {
		let name = chain.name.clone();
		match tokio::spawn(async move { self.run(&chain).await }).await {
			Ok(outcome) => outcome,
			Err(e) => {
				tracing::error!("Scan task of chain {} aborted: {}", name, e);
				ChainScanOutcome::Aborted(e.to_string())
			}
		}
	}
}

async fn run_tick(
	registry: Arc<dyn ChainRegistry>,
	runner: Arc<ChainRunner>,
) -> Vec<(u64, ChainScanOutcome)> {
	let chains = registry.list_active().await;
	let ids: Vec<u64> = chains.iter().map(|chain| chain.chain_id).collect();
	let outcomes = join_all(
		chains
			.into_iter()
			.map(|chain| runner.clone().run_isolated(chain)),
	)
	.await;
	ids.into_iter().zip(outcomes).collect()
}

/// Periodic driver of deposit scanning
pub struct ScanScheduler {
	registry: Arc<dyn ChainRegistry>,
	runner: Arc<ChainRunner>,
	cron_schedule: String,
	job_scheduler: Mutex<Option<JobScheduler>>,
}

impl ScanScheduler {
	pub fn new(
		registry: Arc<dyn ChainRegistry>,
		scanner: Arc<DepositScanner>,
		driver: Arc<DepositLifecycleDriver>,
		cron_schedule: impl Into<String>,
	) -> Self {
		Self {
			registry,
			runner: Arc::new(ChainRunner {
				scanner,
				driver,
				locks: Mutex::new(HashMap::new()),
			}),
			cron_schedule: cron_schedule.into(),
			job_scheduler: Mutex::new(None),
		}
	}

	/// Scans and reconciles every active chain concurrently
	///
	/// Returns one outcome per active chain, ordered by chain id.
	pub async fn tick(&self) -> Vec<(u64, ChainScanOutcome)> {
		run_tick(self.registry.clone(), self.runner.clone()).await
	}

	/// Scans and reconciles one chain right away
	///
	/// Shares the chain's lock with [`ScanScheduler::tick`], so a trigger arriving
	/// during a scheduled scan of the same chain is skipped.
	pub async fn trigger(&self, chain_id: u64) -> Result<ChainScanOutcome, SchedulerError> {
		let chain = self
			.registry
			.get(chain_id)
			.await
			.ok_or_else(|| SchedulerError::unknown_chain(chain_id))?;
		Ok(self.runner.clone().run_isolated(chain).await)
	}

	/// Starts ticking on the configured cron schedule
	pub async fn start(&self) -> Result<(), SchedulerError> {
		let mut slot = self.job_scheduler.lock().await;
		if slot.is_some() {
			return Ok(());
		}

		let scheduler = JobScheduler::new().await.map_err(|e| {
			SchedulerError::scheduler_error(format!("Failed to create scheduler: {}", e))
		})?;

		let registry = self.registry.clone();
		let runner = self.runner.clone();
		let job = Job::new_async(self.cron_schedule.as_str(), move |_uuid, _l| {
			let registry = registry.clone();
			let runner = runner.clone();
			Box::pin(async move {
				let outcomes = run_tick(registry, runner).await;
				tracing::debug!("Scan tick finished for {} chains", outcomes.len());
			})
		})
		.map_err(|e| SchedulerError::scheduler_error(format!("Failed to create job: {}", e)))?;

		scheduler
			.add(job)
			.await
			.map_err(|e| SchedulerError::scheduler_error(format!("Failed to add job: {}", e)))?;
		scheduler.start().await.map_err(|e| {
			SchedulerError::scheduler_error(format!("Failed to start scheduler: {}", e))
		})?;

		tracing::info!("Scan scheduler started ({})", self.cron_schedule);
		*slot = Some(scheduler);
		Ok(())
	}

	/// Stops ticking; scans already running finish on their own
	pub async fn stop(&self) -> Result<(), SchedulerError> {
		if let Some(mut scheduler) = self.job_scheduler.lock().await.take() {
			scheduler.shutdown().await.map_err(|e| {
				SchedulerError::scheduler_error(format!("Failed to stop scheduler: {}", e))
			})?;
			tracing::info!("Scan scheduler stopped");
		}
		Ok(())
	}

	pub async fn is_running(&self) -> bool {
		self.job_scheduler.lock().await.is_some()
	}
}
