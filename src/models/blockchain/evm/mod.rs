//! Ethereum Virtual Machine (EVM) blockchain specific implementations.
//!
//! This module contains the JSON-RPC data structures read from EVM-based chains:
//! block headers and ERC-20 transfer logs.

mod block;
mod log;

pub use block::BlockHeader as EVMBlockHeader;
pub use log::{Log as EVMLog, TRANSFER_EVENT_TOPIC};
