//! Deposit detection and confirmation tracking.
//!
//! The service periodically scans each configured chain for USDC transfers to user
//! deposit addresses, tracks their confirmations against a per-chain threshold and
//! drives every deposit through the processing pipeline
//! (detected → confirming → confirmed → processing → credited → completed).
//!
//! - `bootstrap`: wiring of configuration, repositories and services
//! - `models`: domain types and configuration loading
//! - `repositories`: chains, deposit addresses and the deposit ledger
//! - `services`: chain readers, the scanner, the lifecycle driver, downstream
//!   collaborators and the scan scheduler
//! - `utils`: logging, HTTP, metrics and test helpers

pub mod bootstrap;
pub mod models;
pub mod repositories;
pub mod services;
pub mod utils;
