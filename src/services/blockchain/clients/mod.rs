//! Chain client implementations.
//!
//! - [`EvmClient`]: JSON-RPC calls against an EVM node
//! - [`EvmChainReader`]: the [`ChainReader`](crate::services::blockchain::ChainReader)
//!   built on pooled EVM clients

mod evm {
	pub mod client;
	pub mod reader;
}

pub use evm::{
	client::{EvmClient, EvmClientTrait},
	reader::EvmChainReader,
};
