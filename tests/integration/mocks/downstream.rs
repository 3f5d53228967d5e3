use async_trait::async_trait;
use deposit_monitor::services::downstream::{
	CreditRequest, CreditingService, MirrorRequest, MirroringService, OpResult,
};
use mockall::mock;
use std::sync::{
	atomic::{AtomicUsize, Ordering},
	Arc,
};

mock! {
	pub CreditingService {}

	#[async_trait]
	impl CreditingService for CreditingService {
		async fn credit(&self, request: &CreditRequest) -> OpResult;
	}
}

mock! {
	pub MirroringService {}

	#[async_trait]
	impl MirroringService for MirroringService {
		async fn mirror(&self, request: &MirrorRequest) -> OpResult;
		fn ledger_id(&self) -> Option<String>;
	}
}

/// Crediting mock that always succeeds and counts its calls
pub fn counting_crediting(calls: Arc<AtomicUsize>) -> MockCreditingService {
	let mut crediting = MockCreditingService::new();
	crediting.expect_credit().returning(move |_| {
		calls.fetch_add(1, Ordering::SeqCst);
		OpResult::Success
	});
	crediting
}

/// Mirroring mock that answers every call with `result`
pub fn mirroring_returning(result: OpResult) -> MockMirroringService {
	let mut mirroring = MockMirroringService::new();
	mirroring.expect_ledger_id().return_const(None);
	mirroring
		.expect_mirror()
		.returning(move |_| result.clone());
	mirroring
}
