//! JSON parser for locality facts documents.

use anyhow::{Context, Result};

use crate::facts::LocalityFacts;

/// Decodes a JSON [`LocalityFacts`] document from raw bytes.
///
/// # Errors
///
/// Returns an error if the bytes are not a valid facts document.
pub fn parse_facts(bytes: &[u8]) -> Result<LocalityFacts> {
    serde_json::from_slice(bytes).context("invalid locality facts document")
}

/// Reads and decodes a facts document from `path`.
pub fn read_facts(path: &str) -> Result<LocalityFacts> {
    let bytes = std::fs::read(path).with_context(|| format!("failed to read facts '{path}'"))?;
    parse_facts(&bytes).with_context(|| format!("failed to parse facts '{path}'"))
}
