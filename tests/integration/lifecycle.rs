//! Lifecycle driver against the in-memory ledger.

use deposit_monitor::{
	models::ProcessingStatus,
	repositories::{DepositRepository, DepositRepositoryTrait},
	services::{downstream::OpResult, lifecycle::DepositLifecycleDriver},
	utils::tests::builders::deposit::DepositBuilder,
};
use std::sync::{
	atomic::{AtomicUsize, Ordering},
	Arc,
};

use crate::integration::mocks::{
	counting_crediting, mirroring_returning, MockCreditingService, MockMirroringService,
};

#[tokio::test]
async fn test_concurrent_processing_credits_once() {
	let deposits = Arc::new(DepositRepository::new());
	let deposit = DepositBuilder::new()
		.processing_status(ProcessingStatus::Confirmed)
		.confirmations(12)
		.build();
	let id = deposit.id;
	deposits.insert_if_absent(deposit).await.unwrap();

	let calls = Arc::new(AtomicUsize::new(0));
	let driver = Arc::new(DepositLifecycleDriver::new(
		deposits.clone(),
		Arc::new(counting_crediting(calls.clone())),
		Arc::new(mirroring_returning(OpResult::Pending("ledger down".into()))),
	));

	let handles: Vec<_> = (0..8)
		.map(|_| {
			let driver = driver.clone();
			tokio::spawn(async move { driver.process(id).await.unwrap() })
		})
		.collect();
	for handle in handles {
		handle.await.unwrap();
	}

	let stored = deposits.get(id).await.unwrap().unwrap();
	assert_eq!(stored.processing_status, ProcessingStatus::Credited);
	assert!(stored.credited_to_magic);
	assert!(calls.load(Ordering::SeqCst) >= 1);

	// A credited deposit is never credited again, whatever reconciliation does
	let before = calls.load(Ordering::SeqCst);
	driver.reconcile(1).await.unwrap();
	driver.reconcile(1).await.unwrap();
	assert_eq!(calls.load(Ordering::SeqCst), before);
}

#[tokio::test]
async fn test_reconcile_isolates_deposits() {
	let deposits = Arc::new(DepositRepository::new());
	let rejected = DepositBuilder::new()
		.tx_hash("0x01")
		.processing_status(ProcessingStatus::Confirmed)
		.build();
	let accepted = DepositBuilder::new()
		.tx_hash("0x02")
		.processing_status(ProcessingStatus::Processing)
		.build();
	let waiting = DepositBuilder::new()
		.tx_hash("0x03")
		.processing_status(ProcessingStatus::Credited)
		.credited(true)
		.build();
	let other_chain = DepositBuilder::new()
		.tx_hash("0x04")
		.chain_id(137)
		.processing_status(ProcessingStatus::Confirmed)
		.build();
	let (rejected_id, accepted_id, waiting_id, other_id) =
		(rejected.id, accepted.id, waiting.id, other_chain.id);
	for deposit in [rejected, accepted, waiting, other_chain] {
		deposits.insert_if_absent(deposit).await.unwrap();
	}

	let mut crediting = MockCreditingService::new();
	crediting.expect_credit().returning(move |request| {
		if request.deposit_id == rejected_id {
			OpResult::Failed("account closed".to_string())
		} else {
			OpResult::Success
		}
	});
	let mut mirroring = MockMirroringService::new();
	mirroring.expect_ledger_id().return_const(Some("ldg".to_string()));
	mirroring.expect_mirror().returning(move |request| {
		if request.deposit_id == waiting_id {
			OpResult::Pending("timeout".to_string())
		} else {
			OpResult::Success
		}
	});

	let driver = DepositLifecycleDriver::new(deposits.clone(), Arc::new(crediting), Arc::new(mirroring));
	let report = driver.reconcile(1).await.unwrap();

	assert_eq!(report.examined, 3);
	assert_eq!(report.failed, 1);
	assert_eq!(report.completed, 1);
	assert_eq!(report.pending, 1);
	assert_eq!(report.errors, 0);

	let status = |id| {
		let deposits = deposits.clone();
		async move { deposits.get(id).await.unwrap().unwrap().processing_status }
	};
	assert_eq!(status(rejected_id).await, ProcessingStatus::Failed);
	assert_eq!(status(accepted_id).await, ProcessingStatus::Completed);
	assert_eq!(status(waiting_id).await, ProcessingStatus::Credited);
	assert_eq!(status(other_id).await, ProcessingStatus::Confirmed);
}

#[tokio::test]
async fn test_failed_deposit_stays_failed() {
	let deposits = Arc::new(DepositRepository::new());
	let deposit = DepositBuilder::new()
		.processing_status(ProcessingStatus::Confirming)
		.build();
	let id = deposit.id;
	deposits.insert_if_absent(deposit).await.unwrap();

	let mut crediting = MockCreditingService::new();
	crediting.expect_credit().never();
	let driver = DepositLifecycleDriver::new(
		deposits.clone(),
		Arc::new(crediting),
		Arc::new(MockMirroringService::new()),
	);

	assert!(driver
		.fail(id, ProcessingStatus::Confirming, "reorg: block 85 hash changed")
		.await
		.unwrap());
	// A stale expectation does nothing
	assert!(!driver
		.fail(id, ProcessingStatus::Confirming, "again")
		.await
		.unwrap());

	let stored = deposits.get(id).await.unwrap().unwrap();
	let update = driver.apply_confirmations(&stored, 1_000).await.unwrap();
	assert_eq!(update.new_status, None);
	assert_eq!(driver.process(id).await.unwrap(), ProcessingStatus::Failed);
	assert_eq!(
		deposits.get(id).await.unwrap().unwrap().failure_reason.as_deref(),
		Some("reorg: block 85 hash changed")
	);
}
