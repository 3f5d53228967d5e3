//! Chain reader interfaces and implementations.
//!
//! - [`ChainReader`]: the read-only view of a chain used by the scanner
//! - EVM client and reader built on a JSON-RPC HTTP transport
//! - Client pool caching one client per chain
//! - Error handling for chain reads

mod client;
mod clients;
mod error;
mod pool;
mod transports;

pub use client::ChainReader;
pub use clients::{EvmChainReader, EvmClient, EvmClientTrait};
pub use error::BlockChainError;
pub use pool::{ClientPool, ClientPoolTrait, ClientStorage};
pub use transports::{
	BlockchainTransport, EndpointManager, HttpTransportClient, RotatingTransport,
	ROTATE_ON_ERROR_CODES,
};
