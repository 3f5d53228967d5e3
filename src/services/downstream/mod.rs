//! Downstream collaborators notified as deposits move through the lifecycle.
//!
//! - crediting: applies confirmed deposits to user balances
//! - mirroring: records credited deposits in the ledger of record
//!
//! Both contracts are idempotent by deposit id and report an [`OpResult`].

mod client;
mod crediting;
mod disabled;
mod error;
mod mirroring;

pub use client::{CollaboratorClient, OpResult};
pub use crediting::{CreditRequest, CreditingService, HttpCreditingService};
pub use disabled::DisabledCollaborator;
pub use error::DownstreamError;
pub use mirroring::{HttpMirroringService, MirrorRequest, MirroringService};
