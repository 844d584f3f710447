// crates/onsight-core/src/core/identifiers.rs
// ============================================================================
// Module: Onsight Identifiers
// Description: Canonical opaque identifiers for box sessions and ranking.
// Purpose: Provide strongly typed, serializable identifiers with stable wire forms.
// Dependencies: serde, uuid
// ============================================================================

//! ## Overview
//! This module defines the canonical identifiers used throughout the Onsight
//! core. Identifiers are opaque and serialize as plain strings on the wire.
//! Session identifiers are the only identifiers the core ever mints itself;
//! everything else arrives from the host and is treated as opaque.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

// ============================================================================
// SECTION: Session Identifier
// ============================================================================

/// Session identifier marking one epoch of a box.
///
/// # Invariants
/// - Opaque UTF-8 string; freshly minted values are UUIDv4-shaped.
/// - Regenerated only on state construction, `RESET_BOX`, and the
///   `unmarkAll` branch of `RESET_PARTIAL`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Creates a session identifier from an existing opaque value.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Mints a fresh UUIDv4 session identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for SessionId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for SessionId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

// ============================================================================
// SECTION: Athlete Identifier
// ============================================================================

/// Athlete identifier used by the ranking engine.
///
/// # Invariants
/// - Opaque UTF-8 string; no normalization or validation is applied by this type.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AthleteId(String);

impl AthleteId {
    /// Creates a new athlete identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AthleteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for AthleteId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for AthleteId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

// ============================================================================
// SECTION: Tie Fingerprint
// ============================================================================

/// Deterministic content-hash identifier for a tie event.
///
/// # Invariants
/// - Canonical values are `"tb3:" + lowercase hex SHA-1`; values arriving
///   from the host are stored verbatim as persistence keys.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TieFingerprint(String);

impl TieFingerprint {
    /// Creates a new tie fingerprint.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the fingerprint as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TieFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for TieFingerprint {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for TieFingerprint {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

// ============================================================================
// SECTION: Lineage Key
// ============================================================================

/// Coarse identifier grouping tie events by round and raw performance.
///
/// # Invariants
/// - Canonical values are `"tb-lineage:" + lowercase hex SHA-1`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineageKey(String);

impl LineageKey {
    /// Creates a new lineage key.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LineageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for LineageKey {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for LineageKey {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}
