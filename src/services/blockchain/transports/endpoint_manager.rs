//! Manages the rotation of chain HTTP RPC endpoints
//!
//! Sends requests to the active endpoint and falls back to the other configured URLs
//! when the active one is unreachable or rate limited.

use reqwest_middleware::ClientWithMiddleware;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::services::blockchain::{
	transports::{RotatingTransport, ROTATE_ON_ERROR_CODES},
	BlockChainError,
};

/// Manages the rotation of chain RPC endpoints
///
/// # Fields
/// * `active_url` - The current active URL
/// * `fallback_urls` - A list of fallback URLs to rotate to
/// * `client` - The retrying client used for every request
/// * `rotation_lock` - Serializes rotations so concurrent failures rotate once
#[derive(Clone, Debug)]
pub struct EndpointManager {
	pub active_url: Arc<RwLock<String>>,
	pub fallback_urls: Arc<RwLock<Vec<String>>>,
	client: ClientWithMiddleware,
	rotation_lock: Arc<tokio::sync::Mutex<()>>,
}

impl EndpointManager {
	pub fn new(client: ClientWithMiddleware, active_url: &str, fallback_urls: Vec<String>) -> Self {
		Self {
			active_url: Arc::new(RwLock::new(active_url.to_string())),
			fallback_urls: Arc::new(RwLock::new(fallback_urls)),
			rotation_lock: Arc::new(tokio::sync::Mutex::new(())),
			client,
		}
	}

	/// Rotates to the next reachable fallback URL
	///
	/// The previously active URL is pushed to the back of the fallback list so it is
	/// retried only after every other endpoint.
	pub async fn rotate_url<T: RotatingTransport>(
		&self,
		transport: &T,
	) -> Result<(), BlockChainError> {
		let _guard = self.rotation_lock.lock().await;

		let current_active = self.active_url.read().await.clone();

		let new_url = {
			let mut fallback_urls = self.fallback_urls.write().await;
			match fallback_urls.iter().position(|url| url != &current_active) {
				Some(pos) => fallback_urls.remove(pos),
				None => {
					return Err(BlockChainError::chain_unavailable(
						"No fallback URLs available",
					))
				}
			}
		};

		if transport.try_connect(&new_url).await.is_ok() {
			transport.update_client(&new_url).await?;

			let mut active_url = self.active_url.write().await;
			let mut fallback_urls = self.fallback_urls.write().await;
			tracing::debug!(
				"Successful rotation - from: {}, to: {}",
				current_active,
				new_url
			);
			fallback_urls.push(current_active);
			*active_url = new_url;
			Ok(())
		} else {
			let mut fallback_urls = self.fallback_urls.write().await;
			fallback_urls.push(new_url.clone());
			Err(BlockChainError::chain_unavailable(format!(
				"Failed to connect to fallback URL {}",
				new_url
			)))
		}
	}

	/// Rotates if fallbacks exist and the failure warrants it
	///
	/// # Returns
	/// * `Ok(true)` - Rotation succeeded, the caller should retry the request
	/// * `Ok(false)` - No rotation was needed or possible
	/// * `Err` - Rotation was attempted but failed
	async fn should_attempt_rotation<T: RotatingTransport>(
		&self,
		transport: &T,
		status: Option<u16>,
	) -> Result<bool, BlockChainError> {
		let should_rotate = {
			let fallback_urls = self.fallback_urls.read().await;
			!fallback_urls.is_empty()
				&& status.is_none_or(|s| ROTATE_ON_ERROR_CODES.contains(&s))
		};

		if should_rotate {
			self.rotate_url(transport).await.map(|_| true)
		} else {
			Ok(false)
		}
	}

	/// Sends a JSON-RPC request with automatic URL rotation on failure
	///
	/// Network errors and the status codes in [`ROTATE_ON_ERROR_CODES`] rotate to the
	/// next endpoint and retry; every endpoint is tried at most once per request.
	pub async fn send_raw_request<T: RotatingTransport>(
		&self,
		transport: &T,
		method: &str,
		params: Value,
	) -> Result<Value, BlockChainError> {
		let max_attempts = 1 + self.fallback_urls.read().await.len();

		for _ in 0..max_attempts {
			let current_url = self.active_url.read().await.clone();
			let request_body = transport.customize_request(method, params.clone());

			let response = match self
				.client
				.post(current_url.as_str())
				.header("Content-Type", "application/json")
				.json(&request_body)
				.send()
				.await
			{
				Ok(resp) => resp,
				Err(network_error) => {
					tracing::warn!(
						"Network error while calling {} on {}: {}",
						method,
						current_url,
						network_error
					);
					match self.should_attempt_rotation(transport, None).await {
						Ok(true) => continue,
						Ok(false) => {
							return Err(BlockChainError::chain_unavailable(format!(
								"{} failed on {}: {}",
								method, current_url, network_error
							)))
						}
						Err(rotation_error) => return Err(rotation_error),
					}
				}
			};

			let status = response.status();
			if !status.is_success() {
				let error_body = response.text().await.unwrap_or_default();
				tracing::warn!("Request failed with status {}: {}", status, error_body);

				match self
					.should_attempt_rotation(transport, Some(status.as_u16()))
					.await
				{
					Ok(true) => continue,
					Ok(false) => {
						return Err(BlockChainError::chain_unavailable(format!(
							"{} returned HTTP {} from {}: {}",
							method, status, current_url, error_body
						)))
					}
					Err(rotation_error) => return Err(rotation_error),
				}
			}

			return response.json().await.map_err(|e| {
				BlockChainError::malformed_response(format!(
					"Failed to parse {} response: {}",
					method, e
				))
			});
		}

		Err(BlockChainError::chain_unavailable(format!(
			"{} failed on every configured endpoint",
			method
		)))
	}
}
