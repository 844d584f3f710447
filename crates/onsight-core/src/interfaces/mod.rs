// crates/onsight-core/src/interfaces/mod.rs
// ============================================================================
// Module: Onsight Interfaces
// Description: Host-agnostic interfaces for manual tiebreak resolution.
// Purpose: Define the contract surface between the ranking engine and stored decisions.
// Dependencies: crate::core, thiserror
// ============================================================================

//! ## Overview
//! The ranking engine never reads persisted decisions itself; the host
//! supplies a [`TieBreakResolver`] that looks them up (typically keyed by
//! the context's fingerprint). Implementations must be deterministic; any
//! fault is absorbed by the engine and treated as an undecided tie.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::Athlete;
use crate::core::TieBreakDecision;
use crate::core::TieContext;

// ============================================================================
// SECTION: Tiebreak Resolver
// ============================================================================

/// Resolver errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling; the engine maps every
///   error to a pending decision.
#[derive(Debug, Error)]
pub enum ResolverError {
    /// Resolver backend reported an error.
    #[error("tiebreak resolver error: {0}")]
    Backend(String),
}

/// Supplies human tiebreak decisions to the ranking engine.
///
/// Called at most once per tie group per stage per ranking computation.
pub trait TieBreakResolver {
    /// Resolves one tie group for the given context.
    ///
    /// Returning `Ok(None)` means no decision exists yet; the engine treats
    /// it — and any `Err` — as pending.
    ///
    /// # Errors
    ///
    /// Returns [`ResolverError`] when the decision store cannot be consulted.
    fn resolve(
        &self,
        group: &[Athlete],
        context: &TieContext,
    ) -> Result<Option<TieBreakDecision>, ResolverError>;
}
