//! Signed JSON-over-HTTP client shared by the downstream collaborators.
//!
//! Status mapping:
//! - 2xx and 409 (already applied) → [`OpResult::Success`]
//! - other 4xx → [`OpResult::Failed`] (permanent rejection)
//! - 5xx and network errors → [`OpResult::Pending`] (retried on reconciliation)

use chrono::Utc;
use hmac::{Hmac, Mac};
use reqwest::{header::HeaderMap, StatusCode};
use reqwest_middleware::ClientWithMiddleware;
use reqwest_retry::DefaultRetryableStrategy;
use serde::Serialize;
use sha2::Sha256;
use url::Url;

use crate::{
	models::CollaboratorEndpoint,
	services::downstream::DownstreamError,
	utils::http::{create_retryable_http_client, HttpRetryConfig},
};

/// HMAC SHA256 type alias
type HmacSha256 = Hmac<Sha256>;

/// Outcome of a call to a downstream collaborator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpResult {
	/// The operation was applied (now or by an earlier call with the same key)
	Success,
	/// The collaborator rejected the operation permanently
	Failed(String),
	/// The outcome is unknown or the collaborator is unavailable; retry later
	Pending(String),
}

/// Client posting signed JSON payloads to one collaborator
pub struct CollaboratorClient {
	client: ClientWithMiddleware,
	base_url: Url,
	secret: Option<String>,
}

impl CollaboratorClient {
	pub fn new(
		endpoint: &CollaboratorEndpoint,
		retry_config: &HttpRetryConfig,
	) -> Result<Self, DownstreamError> {
		let mut base_url = Url::parse(&endpoint.url).map_err(|e| {
			DownstreamError::config_error(format!("Invalid URL {}: {}", endpoint.url, e))
		})?;
		// Relative joins must append to the base path, not replace its last segment
		if !base_url.path().ends_with('/') {
			let path = format!("{}/", base_url.path());
			base_url.set_path(&path);
		}

		let base_client = reqwest::Client::builder()
			.timeout(std::time::Duration::from_secs(30))
			.build()
			.map_err(|e| DownstreamError::config_error(format!("Failed to create HTTP client: {}", e)))?;

		Ok(Self {
			client: create_retryable_http_client(
				retry_config,
				base_client,
				None::<DefaultRetryableStrategy>,
			),
			base_url,
			secret: endpoint.secret.clone(),
		})
	}

	/// Signs `body` with the configured secret
	///
	/// Returns the hex signature over `body || timestamp` and the timestamp used.
	pub fn sign_request(secret: &str, body: &[u8]) -> Result<(String, String), DownstreamError> {
		let timestamp = Utc::now().timestamp_millis().to_string();

		let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
			.map_err(|e| DownstreamError::config_error(format!("Invalid secret: {}", e)))?;
		mac.update(body);
		mac.update(timestamp.as_bytes());

		Ok((hex::encode(mac.finalize().into_bytes()), timestamp))
	}

	/// Posts `payload` to `<base>/<path>` with an idempotency key
	pub async fn post<T: Serialize + Sync>(
		&self,
		path: &str,
		idempotency_key: &str,
		payload: &T,
	) -> OpResult {
		match self.try_post(path, idempotency_key, payload).await {
			Ok(result) => result,
			Err(e) => OpResult::Pending(e.to_string()),
		}
	}

	async fn try_post<T: Serialize + Sync>(
		&self,
		path: &str,
		idempotency_key: &str,
		payload: &T,
	) -> Result<OpResult, DownstreamError> {
		let url = self
			.base_url
			.join(path)
			.map_err(|e| DownstreamError::request_error(format!("Invalid path {}: {}", path, e)))?;
		let body = serde_json::to_vec(payload)
			.map_err(|e| DownstreamError::request_error(format!("Failed to encode payload: {}", e)))?;

		let mut headers = HeaderMap::new();
		headers.insert(
			"Content-Type",
			"application/json".parse().map_err(|_| {
				DownstreamError::request_error("Invalid content type header")
			})?,
		);
		headers.insert(
			"Idempotency-Key",
			idempotency_key.parse().map_err(|_| {
				DownstreamError::request_error(format!("Invalid idempotency key {}", idempotency_key))
			})?,
		);
		if let Some(secret) = &self.secret {
			let (signature, timestamp) = Self::sign_request(secret, &body)?;
			headers.insert(
				"X-Signature",
				signature
					.parse()
					.map_err(|_| DownstreamError::request_error("Invalid signature value"))?,
			);
			headers.insert(
				"X-Timestamp",
				timestamp
					.parse()
					.map_err(|_| DownstreamError::request_error("Invalid timestamp value"))?,
			);
		}

		let response = match self
			.client
			.post(url.clone())
			.headers(headers)
			.body(body)
			.send()
			.await
		{
			Ok(response) => response,
			Err(e) => {
				tracing::warn!("Request to {} failed: {}", url, e);
				return Ok(OpResult::Pending(format!("request to {} failed: {}", url, e)));
			}
		};

		let status = response.status();
		if status.is_success() || status == StatusCode::CONFLICT {
			return Ok(OpResult::Success);
		}

		let body = response.text().await.unwrap_or_default();
		if status.is_client_error() && !is_retryable_client_error(status) {
			Ok(OpResult::Failed(format!("{} rejected with {}: {}", url, status, body)))
		} else {
			Ok(OpResult::Pending(format!("{} answered {}: {}", url, status, body)))
		}
	}
}

/// Client errors that say "try again later" rather than "never"
fn is_retryable_client_error(status: StatusCode) -> bool {
	// 408 Request Timeout, 425 Too Early, 429 Too Many Requests
	matches!(status.as_u16(), 408 | 425 | 429)
}
