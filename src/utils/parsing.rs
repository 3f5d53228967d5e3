//! Parsing utilities
//!
//! This module provides utilities for parsing the hex-encoded quantities returned by
//! JSON-RPC nodes.

/// Parses a `0x`-prefixed (or bare) hex quantity into a `u64`.
///
/// Returns an error if the string is empty or contains non-hex characters.
pub fn parse_hex_u64(s: &str) -> Result<u64, String> {
	let digits = s.trim().trim_start_matches("0x").trim_start_matches("0X");
	if digits.is_empty() {
		return Err(format!("Invalid hex quantity: '{}'", s));
	}
	u64::from_str_radix(digits, 16).map_err(|e| format!("Invalid hex quantity: '{}'. Error: {}", s, e))
}

/// Formats a block number as a JSON-RPC hex quantity.
pub fn to_hex_quantity(value: u64) -> String {
	format!("0x{:x}", value)
}

/// Extracts a 20-byte address from a 32-byte left-padded log topic.
///
/// The result is lowercase and `0x`-prefixed.
pub fn topic_to_address(topic: &str) -> Result<String, String> {
	let digits = topic.trim_start_matches("0x");
	if digits.len() != 64 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
		return Err(format!("Invalid address topic: '{}'", topic));
	}
	Ok(format!("0x{}", digits[24..].to_lowercase()))
}

/// Returns true if the string is a `0x`-prefixed 20-byte hex address.
pub fn is_evm_address(s: &str) -> bool {
	let Some(digits) = s.strip_prefix("0x") else {
		return false;
	};
	digits.len() == 40 && digits.chars().all(|c| c.is_ascii_hexdigit())
}
