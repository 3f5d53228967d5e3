//! Stand-in collaborator used when no endpoint is configured.
//!
//! Every call is reported as pending, so deposits wait in Processing or Credited
//! until an endpoint is configured and the reconciliation pass picks them up.

use async_trait::async_trait;

use crate::services::downstream::{
	CreditRequest, CreditingService, MirrorRequest, MirroringService, OpResult,
};

pub struct DisabledCollaborator {
	name: &'static str,
}

impl DisabledCollaborator {
	pub fn new(name: &'static str) -> Self {
		Self { name }
	}

	fn pending(&self) -> OpResult {
		tracing::warn!("No {} endpoint configured, deferring", self.name);
		OpResult::Pending(format!("{} collaborator not configured", self.name))
	}
}

#[async_trait]
impl CreditingService for DisabledCollaborator {
	async fn credit(&self, _request: &CreditRequest) -> OpResult {
		self.pending()
	}
}

#[async_trait]
impl MirroringService for DisabledCollaborator {
	async fn mirror(&self, _request: &MirrorRequest) -> OpResult {
		self.pending()
	}
}
