//! Test doubles shared by the integration tests.
//!
//! - [`MockChainReader`], [`MockCreditingService`], [`MockMirroringService`]: mockall
//!   mocks of the external boundaries
//! - [`ScriptedChains`]: mutable chain state (head, transfers, canonical hashes) that
//!   a mock reader is wired to, so a test can move the head between scans

mod downstream;
mod reader;

pub use downstream::*;
pub use reader::*;
