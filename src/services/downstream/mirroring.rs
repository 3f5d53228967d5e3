//! Mirroring collaborator: records a credited deposit in the ledger of record.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::{
	models::{CollaboratorEndpoint, Deposit},
	services::downstream::{CollaboratorClient, DownstreamError, OpResult},
	utils::http::HttpRetryConfig,
};

/// Mirror request, idempotent by `deposit_id`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MirrorRequest {
	pub deposit_id: Uuid,
	pub amount: Decimal,
	pub currency: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub ledger_id: Option<String>,
}

impl MirrorRequest {
	pub fn for_deposit(deposit: &Deposit, ledger_id: Option<String>) -> Self {
		Self {
			deposit_id: deposit.id,
			amount: deposit.amount,
			currency: deposit.currency.clone(),
			ledger_id,
		}
	}
}

#[async_trait]
pub trait MirroringService: Send + Sync {
	async fn mirror(&self, request: &MirrorRequest) -> OpResult;

	/// Ledger the mirrored transactions are recorded in
	fn ledger_id(&self) -> Option<String> {
		None
	}
}

/// Posts mirror requests to `<base>/transactions`
pub struct HttpMirroringService {
	client: CollaboratorClient,
	ledger_id: Option<String>,
}

impl HttpMirroringService {
	pub fn new(
		endpoint: &CollaboratorEndpoint,
		retry_config: &HttpRetryConfig,
	) -> Result<Self, DownstreamError> {
		Ok(Self {
			client: CollaboratorClient::new(endpoint, retry_config)?,
			ledger_id: endpoint.ledger_id.clone(),
		})
	}
}

#[async_trait]
impl MirroringService for HttpMirroringService {
	async fn mirror(&self, request: &MirrorRequest) -> OpResult {
		tracing::debug!("Mirroring deposit {}", request.deposit_id);
		self.client
			.post("transactions", &request.deposit_id.to_string(), request)
			.await
	}

	fn ledger_id(&self) -> Option<String> {
		self.ledger_id.clone()
	}
}
