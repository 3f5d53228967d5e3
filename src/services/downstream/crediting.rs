//! Crediting collaborator: applies a confirmed deposit to the user's balance.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::{
	models::{CollaboratorEndpoint, Deposit},
	services::downstream::{CollaboratorClient, DownstreamError, OpResult},
	utils::http::HttpRetryConfig,
};

/// Credit request, idempotent by `deposit_id`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditRequest {
	pub deposit_id: Uuid,
	pub user_id: Uuid,
	pub amount: Decimal,
	pub currency: String,
}

impl From<&Deposit> for CreditRequest {
	fn from(deposit: &Deposit) -> Self {
		Self {
			deposit_id: deposit.id,
			user_id: deposit.user_id,
			amount: deposit.amount,
			currency: deposit.currency.clone(),
		}
	}
}

#[async_trait]
pub trait CreditingService: Send + Sync {
	async fn credit(&self, request: &CreditRequest) -> OpResult;
}

/// Posts credit requests to `<base>/credits`
pub struct HttpCreditingService {
	client: CollaboratorClient,
}

impl HttpCreditingService {
	pub fn new(
		endpoint: &CollaboratorEndpoint,
		retry_config: &HttpRetryConfig,
	) -> Result<Self, DownstreamError> {
		Ok(Self {
			client: CollaboratorClient::new(endpoint, retry_config)?,
		})
	}
}

#[async_trait]
impl CreditingService for HttpCreditingService {
	async fn credit(&self, request: &CreditRequest) -> OpResult {
		tracing::debug!(
			"Crediting deposit {} ({} {})",
			request.deposit_id,
			request.amount,
			request.currency
		);
		self.client
			.post("credits", &request.deposit_id.to_string(), request)
			.await
	}
}
