//! Scan scheduler fan-out, isolation and mutual exclusion.

use async_trait::async_trait;
use deposit_monitor::{
	models::{Chain, ScannerConfig, TokenTransfer},
	services::{
		blockchain::{BlockChainError, ChainReader},
		scheduler::{ChainScanOutcome, SchedulerError},
	},
	utils::tests::builders::chain::ChainBuilder,
};
use std::{sync::Arc, time::Duration};
use tokio::sync::Notify;

use crate::integration::{common::HarnessBuilder, mocks::ScriptedChains};

fn chain(chain_id: u64, name: &str) -> Chain {
	ChainBuilder::new()
		.chain_id(chain_id)
		.name(name)
		.last_scanned_block(10)
		.build()
}

#[tokio::test]
async fn test_tick_scans_every_active_chain() {
	let chains = ScriptedChains::new();
	chains.set_head(1, 50);
	chains.set_head(137, 70);
	let harness = HarnessBuilder::new()
		.chain(chain(137, "polygon"))
		.chain(chain(1, "ethereum"))
		.chain(ChainBuilder::new().chain_id(8453).name("base").active(false).build())
		.build(chains.reader())
		.await;

	let outcomes = harness.services.scheduler.tick().await;

	let ids: Vec<u64> = outcomes.iter().map(|(id, _)| *id).collect();
	assert_eq!(ids, vec![1, 137]);
	assert!(outcomes.iter().all(|(_, o)| o.scan_report().is_some()));
	assert_eq!(harness.cursor(1).await, 50);
	assert_eq!(harness.cursor(137).await, 70);
	assert_eq!(harness.cursor(8453).await, 10);
}

#[tokio::test]
async fn test_failing_chain_does_not_affect_others() {
	let chains = ScriptedChains::new();
	chains.set_head(1, 50);
	chains.set_head(137, 70);
	chains.set_unavailable(137, true);
	let harness = HarnessBuilder::new()
		.chain(chain(1, "ethereum"))
		.chain(chain(137, "polygon"))
		.build(chains.reader())
		.await;

	let outcomes = harness.services.scheduler.tick().await;

	assert!(outcomes[0].1.scan_report().is_some());
	match &outcomes[1].1 {
		ChainScanOutcome::Ran {
			scan,
			reconciliation,
		} => {
			assert!(scan.is_err());
			assert!(reconciliation.is_ok());
		}
		other => panic!("unexpected outcome {:?}", other),
	}
	assert_eq!(harness.cursor(1).await, 50);
	assert_eq!(harness.cursor(137).await, 10);
}

/// Reader that panics on one chain and blocks on another until released
struct UnrulyReader {
	inner: Box<dyn ChainReader>,
	panic_chain: Option<u64>,
	blocked_chain: Option<u64>,
	entered: Arc<Notify>,
	release: Arc<Notify>,
}

#[async_trait]
impl ChainReader for UnrulyReader {
	async fn current_height(&self, chain: &Chain) -> Result<u64, BlockChainError> {
		if Some(chain.chain_id) == self.panic_chain {
			panic!("reader exploded on chain {}", chain.chain_id);
		}
		if Some(chain.chain_id) == self.blocked_chain {
			self.entered.notify_one();
			self.release.notified().await;
		}
		self.inner.current_height(chain).await
	}

	async fn transfers_to(
		&self,
		chain: &Chain,
		from_block: u64,
		to_block: u64,
		token_address: &str,
	) -> Result<Vec<TokenTransfer>, BlockChainError> {
		self.inner
			.transfers_to(chain, from_block, to_block, token_address)
			.await
	}

	async fn block_hash(
		&self,
		chain: &Chain,
		block_number: u64,
	) -> Result<Option<String>, BlockChainError> {
		self.inner.block_hash(chain, block_number).await
	}
}

#[tokio::test]
async fn test_panicking_chain_is_isolated() {
	let chains = ScriptedChains::new();
	chains.set_head(1, 50);
	let reader = UnrulyReader {
		inner: Box::new(chains.reader()),
		panic_chain: Some(137),
		blocked_chain: None,
		entered: Arc::new(Notify::new()),
		release: Arc::new(Notify::new()),
	};
	let harness = HarnessBuilder::new()
		.chain(chain(1, "ethereum"))
		.chain(chain(137, "polygon"))
		.build(reader)
		.await;

	let outcomes = harness.services.scheduler.tick().await;

	assert!(outcomes[0].1.scan_report().is_some());
	assert!(matches!(outcomes[1].1, ChainScanOutcome::Aborted(_)));
	assert_eq!(harness.cursor(1).await, 50);

	// The lock of the panicked chain is released for the next tick
	let outcomes = harness.services.scheduler.tick().await;
	assert!(!outcomes[1].1.is_skipped());
}

#[tokio::test]
async fn test_overlapping_scan_of_same_chain_is_skipped() {
	let chains = ScriptedChains::new();
	chains.set_head(1, 50);
	let entered = Arc::new(Notify::new());
	let release = Arc::new(Notify::new());
	let reader = UnrulyReader {
		inner: Box::new(chains.reader()),
		panic_chain: None,
		blocked_chain: Some(1),
		entered: entered.clone(),
		release: release.clone(),
	};
	let harness = HarnessBuilder::new()
		.chain(chain(1, "ethereum"))
		.build(reader)
		.await;
	let scheduler = harness.services.scheduler.clone();

	let running = tokio::spawn(async move { scheduler.tick().await });
	entered.notified().await;

	let outcome = harness.services.scheduler.trigger(1).await.unwrap();
	assert!(outcome.is_skipped());

	release.notify_one();
	let outcomes = running.await.unwrap();
	assert!(outcomes[0].1.scan_report().is_some());
	assert_eq!(harness.cursor(1).await, 50);

	// Once the first scan is done the chain can be triggered again
	chains.set_head(1, 60);
	let outcome = tokio::time::timeout(Duration::from_secs(5), async {
		// The blocked chain waits for a release on every scan
		release.notify_one();
		harness.services.scheduler.trigger(1).await
	})
	.await
	.unwrap()
	.unwrap();
	assert!(!outcome.is_skipped());
}

#[tokio::test]
async fn test_trigger_unknown_chain() {
	let harness = HarnessBuilder::new()
		.build(ScriptedChains::new().reader())
		.await;
	let result = harness.services.scheduler.trigger(999).await;
	assert!(matches!(result, Err(SchedulerError::UnknownChain(999))));
}

#[tokio::test]
async fn test_start_ticks_on_schedule_and_stops() {
	let chains = ScriptedChains::new();
	chains.set_head(1, 50);
	let harness = HarnessBuilder::new()
		.chain(chain(1, "ethereum"))
		.config(ScannerConfig {
			cron_schedule: "* * * * * *".to_string(),
			..Default::default()
		})
		.build(chains.reader())
		.await;
	let scheduler = harness.services.scheduler.clone();

	scheduler.start().await.unwrap();
	assert!(scheduler.is_running().await);

	let mut advanced = false;
	for _ in 0..30 {
		tokio::time::sleep(Duration::from_millis(100)).await;
		if harness.cursor(1).await == 50 {
			advanced = true;
			break;
		}
	}
	scheduler.stop().await.unwrap();

	assert!(advanced);
	assert!(!scheduler.is_running().await);
}

#[tokio::test]
async fn test_start_rejects_invalid_schedule() {
	let harness = HarnessBuilder::new()
		.config(ScannerConfig {
			cron_schedule: "whenever".to_string(),
			..Default::default()
		})
		.build(ScriptedChains::new().reader())
		.await;

	let result = harness.services.scheduler.start().await;
	assert!(matches!(result, Err(SchedulerError::SchedulerError(_))));
	assert!(!harness.services.scheduler.is_running().await);
}
