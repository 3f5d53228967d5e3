//! Blockchain-specific model implementations.
//!
//! This module contains the chain-agnostic [`TokenTransfer`] produced by chain readers
//! and the EVM wire types it is decoded from.

pub mod evm;
mod transfer;

pub use transfer::TokenTransfer;
