//! Deposit lifecycle: confirmation state machine, crediting, mirroring and
//! reconciliation.

mod driver;
mod error;

pub use driver::{ConfirmationUpdate, DepositLifecycleDriver, ReconcileReport};
pub use error::LifecycleError;
