//! EVM chain reader against a mocked JSON-RPC node.

use deposit_monitor::{
	models::{ProcessingStatus, TRANSFER_EVENT_TOPIC},
	repositories::DepositRepositoryTrait,
	services::blockchain::{ChainReader, ClientPool, EvmChainReader},
	utils::tests::builders::chain::ChainBuilder,
};
use mockito::{Matcher, Server, ServerGuard};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use crate::integration::common::{HarnessBuilder, DEPOSIT_ADDRESS};

const TOKEN: &str = "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48";
const TX: &str = "0x5e1f0000000000000000000000000000000000000000000000000000000000aa";
const BLOCK_85_HASH: &str = "0x8585858585858585858585858585858585858585858585858585858585858585";

async fn rpc(server: &mut ServerGuard, method: &str, result: serde_json::Value) -> mockito::Mock {
	server
		.mock("POST", "/")
		.match_body(Matcher::PartialJson(json!({ "method": method })))
		.with_status(200)
		.with_body(json!({"jsonrpc": "2.0", "id": 1, "result": result}).to_string())
		.create_async()
		.await
}

async fn node() -> (ServerGuard, Vec<mockito::Mock>) {
	let mut server = Server::new_async().await;
	let mocks = vec![
		rpc(&mut server, "net_version", json!("1")).await,
		rpc(&mut server, "eth_blockNumber", json!("0x64")).await,
		rpc(
			&mut server,
			"eth_getLogs",
			json!([{
				"address": TOKEN,
				"topics": [
					TRANSFER_EVENT_TOPIC,
					"0x0000000000000000000000001111111111111111111111111111111111111111",
					format!("0x000000000000000000000000{}", &DEPOSIT_ADDRESS[2..]),
				],
				"data": "0x0000000000000000000000000000000000000000000000000000000005f5e100",
				"blockNumber": "0x55",
				"transactionHash": TX,
				"transactionIndex": "0x0",
				"logIndex": "0x2",
				"removed": false
			}]),
		)
		.await,
		rpc(
			&mut server,
			"eth_getBlockByNumber",
			json!({"number": "0x55", "hash": BLOCK_85_HASH, "timestamp": "0x65f0a3c0"}),
		)
		.await,
	];
	(server, mocks)
}

#[tokio::test]
async fn test_reader_decodes_transfers() {
	let (server, _mocks) = node().await;
	let chain = ChainBuilder::new()
		.rpc_url(&server.url())
		.token_address(TOKEN)
		.build();
	let pool = Arc::new(ClientPool::new());
	let reader = EvmChainReader::new(pool.clone());

	assert_eq!(reader.current_height(&chain).await.unwrap(), 100);
	let transfers = reader.transfers_to(&chain, 81, 100, TOKEN).await.unwrap();
	assert_eq!(transfers.len(), 1);
	assert_eq!(transfers[0].to_address, DEPOSIT_ADDRESS);
	assert_eq!(transfers[0].raw_amount.to::<u128>(), 100_000_000);
	assert_eq!(transfers[0].position(), (85, 2));
	assert_eq!(transfers[0].block_hash.as_deref(), Some(BLOCK_85_HASH));
	assert!(transfers[0].block_timestamp.is_some());

	assert_eq!(
		reader.block_hash(&chain, 85).await.unwrap().as_deref(),
		Some(BLOCK_85_HASH)
	);
	assert_eq!(pool.get_client_count().await, 1);
}

#[tokio::test]
async fn test_scan_through_json_rpc() {
	let (server, _mocks) = node().await;
	let user = Uuid::new_v4();
	let harness = HarnessBuilder::new()
		.chain(
			ChainBuilder::new()
				.rpc_url(&server.url())
				.token_address(TOKEN)
				.last_scanned_block(80)
				.build(),
		)
		.owner(1, user)
		.build(EvmChainReader::new(Arc::new(ClientPool::new())))
		.await;

	let report = harness.services.scanner.scan(1).await.unwrap();
	assert_eq!(report.range, Some((81, 100)));
	assert_eq!(report.deposits_created, 1);

	let deposit = harness.deposits.find_by_tx(1, TX).await.unwrap().unwrap();
	assert_eq!(deposit.user_id, user);
	assert_eq!(deposit.amount.to_string(), "100.000000");
	assert_eq!(deposit.confirmations, 15);
	assert_ne!(deposit.processing_status, ProcessingStatus::Detected);
	assert_eq!(harness.cursor(1).await, 100);
}

#[tokio::test]
async fn test_unreachable_node_is_chain_unavailable() {
	let chain = ChainBuilder::new().rpc_url("http://127.0.0.1:1").build();
	let reader = EvmChainReader::new(Arc::new(ClientPool::new()));
	assert!(reader.current_height(&chain).await.is_err());
}
