//! Core services.
//!
//! - `blockchain`: chain readers, JSON-RPC transports and client pooling
//! - `downstream`: crediting and mirroring collaborators
//! - `lifecycle`: deposit state machine and reconciliation
//! - `scanner`: per-chain deposit detection
//! - `scheduler`: periodic, per-chain isolated scan fan-out

pub mod blockchain;
pub mod downstream;
pub mod lifecycle;
pub mod scanner;
pub mod scheduler;
