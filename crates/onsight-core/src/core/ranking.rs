// crates/onsight-core/src/core/ranking.rs
// ============================================================================
// Module: Onsight Ranking Types
// Description: Lead results, tie contexts, tie events, and ranking rows.
// Purpose: Provide stable serializable types for the Lead-finals ranking engine.
// Dependencies: crate::core::identifiers, serde
// ============================================================================

//! ## Overview
//! These types carry the inputs and outputs of the Lead ranking engine. All
//! values are immutable snapshots; the engine in `runtime::ranking` is a
//! pure function over them plus resolver calls. Tie events are the audit
//! trail for every manual decision the podium workflow requires.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::AthleteId;
use crate::core::identifiers::LineageKey;
use crate::core::identifiers::TieFingerprint;

// ============================================================================
// SECTION: Athletes and Results
// ============================================================================

/// One athlete on the start list.
///
/// # Invariants
/// - `id` is an opaque stable string unique within the roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Athlete {
    /// Stable athlete identifier.
    pub id: AthleteId,
    /// Display name.
    pub name: String,
}

impl Athlete {
    /// Creates an athlete from an identifier and display name.
    #[must_use]
    pub fn new(id: impl Into<AthleteId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// One athlete's Lead result on a route.
///
/// # Invariants
/// - `hold` counts the highest hold reached; `plus` only matters when the
///   route was not topped (a top dominates any plus).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LeadResult {
    /// Whether the route was topped.
    pub topped: bool,
    /// Highest hold reached.
    pub hold: u32,
    /// Whether a `+` was earned on the last hold.
    pub plus: bool,
    /// Registered climb time in seconds, when one exists.
    pub time_seconds: Option<f64>,
}

impl LeadResult {
    /// Numeric display hint matching the hold+plus UI convention.
    #[must_use]
    pub fn score_hint(&self) -> f64 {
        if self.topped {
            f64::from(self.hold)
        } else {
            f64::from(self.hold) + if self.plus { 0.1 } else { 0.0 }
        }
    }
}

// ============================================================================
// SECTION: Tie Workflow Inputs
// ============================================================================

/// Tiebreak workflow stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieStage {
    /// Resolution by ranks carried over from previous rounds.
    PreviousRounds,
    /// Resolution by registered climb time.
    Time,
}

/// Operator choice for one tie group and stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TieChoice {
    /// Break the tie at this stage.
    Yes,
    /// Keep the tie (fall through or stay shared).
    No,
    /// No decision yet.
    Pending,
}

/// Context handed to the resolver for one tie group and stage.
///
/// # Invariants
/// - `fingerprint` is deterministic for the group's content and stage.
/// - `rank_start..=rank_end` is the inclusive rank span the group occupies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TieContext {
    /// Round the ranking is computed for.
    pub round_name: String,
    /// Workflow stage being queried.
    pub stage: TieStage,
    /// First rank occupied by the group.
    pub rank_start: u32,
    /// Last rank occupied by the group.
    pub rank_end: u32,
    /// Whether the group touches the podium.
    pub affects_podium: bool,
    /// Deterministic tie fingerprint for persistence keys.
    pub fingerprint: TieFingerprint,
    /// The tied athletes.
    pub athletes: Vec<Athlete>,
    /// The shared Lead performance.
    pub performance: LeadResult,
    /// Lineage key (previous-rounds stage only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lineage_key: Option<LineageKey>,
}

/// Resolver answer for one tie group and stage.
///
/// # Invariants
/// - `previous_ranks_by_athlete` is meaningful only for the
///   previous-rounds stage with `choice == Yes`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TieBreakDecision {
    /// Operator choice for the current stage.
    pub choice: TieChoice,
    /// Previous-round ranks keyed by athlete id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_ranks_by_athlete: Option<BTreeMap<AthleteId, u32>>,
}

impl TieBreakDecision {
    /// A decision that breaks the tie at the current stage.
    #[must_use]
    pub const fn split() -> Self {
        Self {
            choice: TieChoice::Yes,
            previous_ranks_by_athlete: None,
        }
    }

    /// A `yes` decision carrying previous-round ranks.
    #[must_use]
    pub const fn split_by_previous_ranks(ranks: BTreeMap<AthleteId, u32>) -> Self {
        Self {
            choice: TieChoice::Yes,
            previous_ranks_by_athlete: Some(ranks),
        }
    }

    /// A decision that keeps the tie at the current stage.
    #[must_use]
    pub const fn keep() -> Self {
        Self {
            choice: TieChoice::No,
            previous_ranks_by_athlete: None,
        }
    }

    /// The undecided default.
    #[must_use]
    pub const fn pending() -> Self {
        Self {
            choice: TieChoice::Pending,
            previous_ranks_by_athlete: None,
        }
    }
}

// ============================================================================
// SECTION: Ranking Outputs
// ============================================================================

/// One row of the final ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingRow {
    /// Stable athlete identifier.
    pub athlete_id: AthleteId,
    /// Display name.
    pub athlete_name: String,
    /// Final rank (shared ranks repeat the same value).
    pub rank: u32,
    /// Whether the route was topped.
    pub topped: bool,
    /// Highest hold reached.
    pub hold: u32,
    /// Whether a `+` was earned.
    pub plus: bool,
    /// Registered climb time in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_seconds: Option<f64>,
    /// Whether this athlete won the previous-rounds tiebreak badge.
    pub tb_prev: bool,
    /// Whether this athlete went through the time tiebreak stage.
    pub tb_time: bool,
    /// Numeric display hint matching the hold+plus UI convention.
    pub score_hint: f64,
}

/// Lifecycle status of a tie event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TieStatus {
    /// Awaiting an operator decision.
    Pending,
    /// Fully resolved.
    Resolved,
    /// An operator decision was invalid or insufficient.
    Error,
}

/// Audit record for one tie group's trip through the workflow.
///
/// # Invariants
/// - `members` snapshot the group at its shared rank, before any split.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TieEvent {
    /// Deterministic tie fingerprint.
    pub fingerprint: TieFingerprint,
    /// Workflow stage the event belongs to.
    pub stage: TieStage,
    /// First rank occupied by the group.
    pub rank_start: u32,
    /// Last rank occupied by the group.
    pub rank_end: u32,
    /// Whether the group touches the podium.
    pub affects_podium: bool,
    /// Group members at their shared rank.
    pub members: Vec<RankingRow>,
    /// Event status.
    pub status: TieStatus,
    /// Machine-readable detail for pending/error events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Lineage key (previous-rounds stage only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lineage_key: Option<LineageKey>,
    /// Previous-round ranks already supplied by the operator.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub known_prev_ranks_by_athlete: Option<BTreeMap<AthleteId, u32>>,
    /// Athletes still missing a previous-round rank, sorted by id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub missing_prev_rounds_athlete_ids: Option<Vec<AthleteId>>,
    /// Whether the operator must supply previous-rounds input to proceed.
    pub requires_prev_rounds_input: bool,
}

/// Complete output of one ranking computation.
///
/// # Invariants
/// - `is_resolved` implies no tie event is podium-affecting and
///   pending/error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingResult {
    /// Final ranking rows, ordered by rank then stable athlete key.
    pub rows: Vec<RankingRow>,
    /// Audit trail of tie events, in discovery order.
    pub tie_events: Vec<TieEvent>,
    /// Whether the podium is fully decided.
    pub is_resolved: bool,
    /// Whether any podium tie is still pending or in error.
    pub has_pending_podium_ties: bool,
    /// In-band error strings; the engine never raises.
    pub errors: Vec<String>,
}

// ============================================================================
// SECTION: Ranking Options
// ============================================================================

/// Tunables for one ranking computation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankingOptions {
    /// Leading ranks whose ties must be explicitly resolved.
    pub podium_places: u32,
    /// Round name folded into fingerprints and contexts.
    pub round_name: String,
}

impl Default for RankingOptions {
    fn default() -> Self {
        Self {
            podium_places: 3,
            round_name: "Final".to_string(),
        }
    }
}
