//! Properties of the deposit ledger under arbitrary scan sequences.

use deposit_monitor::{
	models::ProcessingStatus,
	repositories::{DepositRepository, DepositRepositoryTrait},
	services::{downstream::DisabledCollaborator, lifecycle::DepositLifecycleDriver},
	utils::tests::builders::deposit::DepositBuilder,
};
use proptest::prelude::*;
use std::sync::Arc;

use crate::properties::strategies::observed_heads;

fn runtime() -> tokio::runtime::Runtime {
	tokio::runtime::Builder::new_current_thread()
		.enable_all()
		.build()
		.unwrap()
}

proptest! {
	#![proptest_config(ProptestConfig::with_cases(64))]

	#[test]
	fn confirmations_and_status_are_monotonic(
		block in 0u64..200,
		required in 1u64..30,
		heads in observed_heads(),
	) {
		runtime().block_on(async {
			let deposits = Arc::new(DepositRepository::new());
			let deposit = DepositBuilder::new()
				.block_number(block)
				.required_confirmations(required)
				.build();
			let id = deposit.id;
			deposits.insert_if_absent(deposit).await.unwrap();

			let driver = DepositLifecycleDriver::new(
				deposits.clone(),
				Arc::new(DisabledCollaborator::new("crediting")),
				Arc::new(DisabledCollaborator::new("mirroring")),
			);

			let mut last_confirmations = 0;
			let mut last_status = ProcessingStatus::Detected;
			let mut highest_head = 0;
			for head in heads {
				let current = deposits.get(id).await.unwrap().unwrap();
				driver.apply_confirmations(&current, head).await.unwrap();
				highest_head = highest_head.max(head);

				let stored = deposits.get(id).await.unwrap().unwrap();
				prop_assert!(stored.confirmations >= last_confirmations);
				prop_assert!(
					stored.processing_status == last_status
						|| last_status.can_transition_to(stored.processing_status)
				);
				prop_assert_eq!(stored.confirmations, highest_head.saturating_sub(block));
				prop_assert_eq!(
					stored.processing_status == ProcessingStatus::Confirmed,
					stored.confirmations >= required
				);
				last_confirmations = stored.confirmations;
				last_status = stored.processing_status;
			}
			Ok(())
		})?;
	}
}
