//! Network transport implementations for chain readers.
//!
//! Provides the JSON-RPC over HTTP transport used by the EVM reader, with retrying
//! middleware and fallback URL rotation.

mod endpoint_manager;
mod http;

pub use endpoint_manager::EndpointManager;
pub use http::HttpTransportClient;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::services::blockchain::BlockChainError;

/// HTTP status codes that trigger RPC endpoint rotation
/// - 429: Too Many Requests - indicates rate limiting from the current endpoint
/// - 502/503/504: the gateway in front of the node is failing
pub const ROTATE_ON_ERROR_CODES: [u16; 4] = [429, 502, 503, 504];

/// Base trait for all chain transport clients
#[async_trait]
pub trait BlockchainTransport: Send + Sync {
	/// Get the current URL being used by the transport
	async fn get_current_url(&self) -> String;

	/// Send a raw JSON-RPC request and return the full response envelope
	async fn send_raw_request(&self, method: &str, params: Value)
		-> Result<Value, BlockChainError>;

	/// Builds the request body for a method call
	fn customize_request(&self, method: &str, params: Value) -> Value {
		json!({
			"jsonrpc": "2.0",
			"id": 1,
			"method": method,
			"params": params
		})
	}
}

/// Extension trait for transports that support URL rotation
#[async_trait]
pub trait RotatingTransport: BlockchainTransport {
	/// Attempts to establish a connection with a new URL
	async fn try_connect(&self, url: &str) -> Result<(), BlockChainError>;

	/// Updates the client with a new URL
	async fn update_client(&self, url: &str) -> Result<(), BlockChainError>;
}
