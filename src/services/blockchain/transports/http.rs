//! HTTP transport implementation for chain interactions.
//!
//! JSON-RPC over HTTP with:
//! - Multiple RPC endpoints ordered by weight, with automatic failover
//! - Retrying middleware for transient errors
//! - Connection health checks before an endpoint is used

use async_trait::async_trait;
use reqwest::Client;
use reqwest_retry::DefaultRetryableStrategy;
use serde_json::{json, Value};
use std::{sync::Arc, time::Duration};
use url::Url;

use crate::{
	models::Chain,
	services::blockchain::{
		transports::{BlockchainTransport, EndpointManager, RotatingTransport},
		BlockChainError,
	},
	utils::http::{create_retryable_http_client, HttpRetryConfig},
};

/// Basic HTTP transport client for JSON-RPC nodes
///
/// The client is thread-safe and can be shared across multiple tasks.
#[derive(Clone, Debug)]
pub struct HttpTransportClient {
	/// Plain HTTP client used for connection checks
	pub client: Arc<Client>,
	/// Manages RPC endpoint rotation and request handling
	endpoint_manager: EndpointManager,
}

impl HttpTransportClient {
	/// Creates a new HTTP transport client for a chain
	///
	/// Endpoints are tried in order of descending weight; the first one that answers
	/// `net_version` becomes active and the rest become fallbacks. Endpoints with
	/// weight 0 are disabled.
	pub async fn new(chain: &Chain) -> Result<Self, BlockChainError> {
		Self::new_with_retry_config(chain, &HttpRetryConfig::default()).await
	}

	pub async fn new_with_retry_config(
		chain: &Chain,
		retry_config: &HttpRetryConfig,
	) -> Result<Self, BlockChainError> {
		let mut rpc_urls: Vec<_> = chain
			.rpc_urls
			.iter()
			.filter(|rpc_url| rpc_url.type_ == "rpc" && rpc_url.weight > 0)
			.collect();

		rpc_urls.sort_by(|a, b| b.weight.cmp(&a.weight));

		let client = Client::builder()
			.timeout(Duration::from_secs(30))
			.connect_timeout(Duration::from_secs(10))
			.build()
			.map_err(|e| {
				BlockChainError::client_pool_error(format!("Failed to create HTTP client: {}", e))
			})?;

		for rpc_url in rpc_urls.iter() {
			let url = match Url::parse(&rpc_url.url) {
				Ok(url) => url,
				Err(_) => continue,
			};

			match client.post(url).json(&Self::connection_check_payload()).send().await {
				Ok(response) if response.status().is_success() => {
					let fallback_urls: Vec<String> = rpc_urls
						.iter()
						.filter(|other| other.url != rpc_url.url)
						.map(|other| other.url.clone())
						.collect();

					let retrying_client = create_retryable_http_client(
						retry_config,
						client.clone(),
						None::<DefaultRetryableStrategy>,
					);

					return Ok(Self {
						client: Arc::new(client),
						endpoint_manager: EndpointManager::new(
							retrying_client,
							rpc_url.url.as_ref(),
							fallback_urls,
						),
					});
				}
				Ok(response) => {
					tracing::warn!(
						"RPC endpoint {} for chain {} answered {}",
						rpc_url.url,
						chain.name,
						response.status()
					);
				}
				Err(e) => {
					tracing::warn!(
						"RPC endpoint {} for chain {} unreachable: {}",
						rpc_url.url,
						chain.name,
						e
					);
				}
			}
		}

		Err(BlockChainError::chain_unavailable(format!(
			"All RPC URLs failed to connect for chain {}",
			chain.name
		)))
	}

	fn connection_check_payload() -> Value {
		json!({
			"jsonrpc": "2.0",
			"id": 1,
			"method": "net_version",
			"params": []
		})
	}
}

#[async_trait]
impl BlockchainTransport for HttpTransportClient {
	async fn get_current_url(&self) -> String {
		self.endpoint_manager.active_url.read().await.clone()
	}

	async fn send_raw_request(
		&self,
		method: &str,
		params: Value,
	) -> Result<Value, BlockChainError> {
		self.endpoint_manager
			.send_raw_request(self, method, params)
			.await
	}
}

#[async_trait]
impl RotatingTransport for HttpTransportClient {
	async fn try_connect(&self, url: &str) -> Result<(), BlockChainError> {
		let url = Url::parse(url)
			.map_err(|_| BlockChainError::chain_unavailable(format!("Invalid URL: {}", url)))?;

		match self
			.client
			.post(url.clone())
			.json(&Self::connection_check_payload())
			.send()
			.await
		{
			Ok(response) if response.status().is_success() => Ok(()),
			Ok(response) => Err(BlockChainError::chain_unavailable(format!(
				"{} answered {}",
				url,
				response.status()
			))),
			Err(e) => Err(BlockChainError::chain_unavailable(format!(
				"Failed to connect to {}: {}",
				url, e
			))),
		}
	}

	async fn update_client(&self, url: &str) -> Result<(), BlockChainError> {
		let parsed_url = Url::parse(url)
			.map_err(|_| BlockChainError::chain_unavailable(format!("Invalid URL: {}", url)))?;
		let normalized_url = parsed_url.as_str().trim_end_matches('/');

		// The HTTP client is URL-agnostic; only the active URL changes
		let mut active_url = self.endpoint_manager.active_url.write().await;
		*active_url = normalized_url.to_string();
		Ok(())
	}
}
