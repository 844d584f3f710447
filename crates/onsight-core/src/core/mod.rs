// crates/onsight-core/src/core/mod.rs
// ============================================================================
// Module: Onsight Core Types
// Description: Canonical contest-state, command, and ranking structures.
// Purpose: Provide stable, serializable types for box snapshots and rankings.
// Dependencies: serde, serde_jcs, sha1, uuid
// ============================================================================

//! ## Overview
//! Core types define the box-state aggregate, the typed command union, the
//! ranking data model, and the canonical hashing and sanitization helpers.
//! These types are the canonical source of truth for any derived API
//! surfaces (HTTP, WebSocket, or exports) owned by the host.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod command;
pub mod hashing;
pub mod identifiers;
pub mod ranking;
pub mod sanitize;
pub mod state;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use command::Command;
pub use command::CommandOutcome;
pub use command::CommandRecord;
pub use hashing::HashError;
pub use hashing::LINEAGE_KEY_PREFIX;
pub use hashing::TIE_FINGERPRINT_PREFIX;
pub use hashing::canonical_json_bytes;
pub use hashing::prefixed_canonical_hash;
pub use hashing::sha1_hex;
pub use identifiers::AthleteId;
pub use identifiers::LineageKey;
pub use identifiers::SessionId;
pub use identifiers::TieFingerprint;
pub use ranking::Athlete;
pub use ranking::LeadResult;
pub use ranking::RankingOptions;
pub use ranking::RankingResult;
pub use ranking::RankingRow;
pub use ranking::TieBreakDecision;
pub use ranking::TieChoice;
pub use ranking::TieContext;
pub use ranking::TieEvent;
pub use ranking::TieStage;
pub use ranking::TieStatus;
pub use sanitize::MAX_CATEGORY_LEN;
pub use sanitize::MAX_NAME_LEN;
pub use sanitize::sanitize_category;
pub use sanitize::sanitize_competitor_name;
pub use sanitize::sanitize_string;
pub use state::BoxState;
pub use state::Competitor;
pub use state::RouteSeries;
pub use state::TieDecisionChoice;
pub use state::TimerState;
pub use state::parse_timer_preset;
