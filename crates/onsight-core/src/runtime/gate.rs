// crates/onsight-core/src/runtime/gate.rs
// ============================================================================
// Module: Onsight Session Gate
// Description: Epoch admission checks for incoming commands.
// Purpose: Reject stale-tab commands before they reach the state machine.
// Dependencies: crate::core, thiserror
// ============================================================================

//! ## Overview
//! Concurrent judge tabs race; the gate serializes them without locks by
//! checking each command's (`sessionId`, `boxVersion`) pair against the
//! box's current epoch. A losing command is rejected and must not be
//! applied. `INIT_ROUTE` is validated with `require_session = false`
//! because it opens an epoch rather than participating in one.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::BoxState;
use crate::core::CommandRecord;

// ============================================================================
// SECTION: Gate Errors
// ============================================================================

/// Epoch admission failures.
///
/// # Invariants
/// - Variants are stable; hosts map them onto transport responses using
///   [`GateError::kind`] and [`GateError::status_code`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GateError {
    /// The command carries no session while one is required.
    #[error("sessionId required for all commands except INIT_ROUTE")]
    MissingSession,
    /// The command's session does not match the box's current epoch.
    #[error("sessionId does not match the current box session")]
    StaleSession,
    /// The command's box version is older than the box's current version.
    #[error("boxVersion is older than the current box version")]
    StaleVersion,
}

impl GateError {
    /// Stable machine-readable kind string.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::MissingSession => "missing_session",
            Self::StaleSession => "stale_session",
            Self::StaleVersion => "stale_version",
        }
    }

    /// Advisory transport status, when one applies.
    #[must_use]
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::MissingSession => Some(400),
            Self::StaleSession | Self::StaleVersion => None,
        }
    }
}

// ============================================================================
// SECTION: Epoch Check
// ============================================================================

/// Validates a command's session and version against the current box epoch.
///
/// # Errors
///
/// Returns [`GateError`] when the command must be rejected:
/// - [`GateError::MissingSession`] when `require_session` is set and the
///   command carries no (or an empty) `sessionId`;
/// - [`GateError::StaleSession`] when both sides carry a session and they
///   differ;
/// - [`GateError::StaleVersion`] when the command's `boxVersion` is lower
///   than the box's.
pub fn check_epoch(
    state: &BoxState,
    record: &CommandRecord,
    require_session: bool,
) -> Result<(), GateError> {
    let incoming = record.session_id.as_deref().filter(|session| !session.is_empty());

    if require_session && incoming.is_none() {
        return Err(GateError::MissingSession);
    }

    if let Some(incoming) = incoming {
        let current = state.session_id.as_str();
        if !current.is_empty() && incoming != current {
            return Err(GateError::StaleSession);
        }
    }

    if let Some(incoming_version) = record.box_version {
        if incoming_version < state.box_version {
            return Err(GateError::StaleVersion);
        }
    }

    Ok(())
}
