// crates/onsight-core/src/core/hashing.rs
// ============================================================================
// Module: Onsight Canonical Hashing
// Description: RFC 8785 JSON canonicalization and SHA-1 content digests.
// Purpose: Provide deterministic fingerprints for tie events and lineages.
// Dependencies: serde, serde_jcs, sha1
// ============================================================================

//! ## Overview
//! Tie fingerprints are content hashes over canonical JSON (RFC 8785 / JCS:
//! sorted object keys, no whitespace, UTF-8) so that recomputing a ranking
//! yields byte-identical identifiers regardless of roster ordering. The
//! digest is SHA-1 rendered as lowercase hex; persisted human decisions key
//! off these values, so the format is frozen.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;
use sha1::Digest;
use sha1::Sha1;
use thiserror::Error;

// ============================================================================
// SECTION: Prefixes
// ============================================================================

/// Prefix for tie-event fingerprints.
pub const TIE_FINGERPRINT_PREFIX: &str = "tb3:";

/// Prefix for tie lineage keys.
pub const LINEAGE_KEY_PREFIX: &str = "tb-lineage:";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised when computing canonical hashes.
#[derive(Debug, Error)]
pub enum HashError {
    /// JSON canonicalization failed (non-finite float or unsupported value).
    #[error("failed to canonicalize json: {0}")]
    Canonicalization(String),
}

// ============================================================================
// SECTION: Hashing Helpers
// ============================================================================

/// Returns canonical JSON bytes for a serializable value using RFC 8785.
///
/// # Errors
///
/// Returns [`HashError::Canonicalization`] when serialization fails.
pub fn canonical_json_bytes<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, HashError> {
    serde_jcs::to_vec(value).map_err(|err| HashError::Canonicalization(err.to_string()))
}

/// Hashes canonical JSON and renders the digest with the given prefix.
///
/// # Errors
///
/// Returns [`HashError::Canonicalization`] when serialization fails.
pub fn prefixed_canonical_hash<T: Serialize + ?Sized>(
    prefix: &str,
    value: &T,
) -> Result<String, HashError> {
    let bytes = canonical_json_bytes(value)?;
    Ok(format!("{prefix}{}", sha1_hex(&bytes)))
}

/// Hashes raw bytes with SHA-1 and encodes the digest as lowercase hex.
#[must_use]
pub fn sha1_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(bytes);
    hex_encode(&hasher.finalize())
}

// ============================================================================
// SECTION: Hex Encoding
// ============================================================================

/// Encodes bytes as a lowercase hex string.
fn hex_encode(bytes: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        out.push(HEX[(byte >> 4) as usize] as char);
        out.push(HEX[(byte & 0x0f) as usize] as char);
    }
    out
}
