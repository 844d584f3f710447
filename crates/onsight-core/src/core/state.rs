// crates/onsight-core/src/core/state.rs
// ============================================================================
// Module: Onsight Box State
// Description: Contest box aggregate — epoch, route config, timer, progress, results.
// Purpose: Capture the full per-box contest state as one serializable value.
// Dependencies: crate::core::identifiers, serde
// ============================================================================

//! ## Overview
//! A box is one judge station running one route at a time. Its entire
//! contest state lives in a single [`BoxState`] value that only the
//! transition function in `runtime::machine` evolves; the host persists and
//! broadcasts snapshots of it verbatim. Wire field names are frozen
//! (`sessionId`, `boxVersion`, competitor `nume`, ...) for compatibility
//! with existing observers.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::LineageKey;
use crate::core::identifiers::SessionId;
use crate::core::identifiers::TieFingerprint;

// ============================================================================
// SECTION: Timer State
// ============================================================================

/// Timer lifecycle states.
///
/// # Invariants
/// - `Running` if and only if `BoxState::started` is `true`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    /// Timer is not running and has not been paused.
    Idle,
    /// Timer is counting down.
    Running,
    /// Timer was stopped mid-countdown.
    Paused,
}

// ============================================================================
// SECTION: Tie Decisions
// ============================================================================

/// Persisted yes/no choice for a tiebreak fingerprint.
///
/// # Invariants
/// - Variants are stable for serialization; they round-trip as `"yes"`/`"no"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TieDecisionChoice {
    /// Break the tie.
    Yes,
    /// Keep the tie.
    No,
}

// ============================================================================
// SECTION: Competitors
// ============================================================================

/// One competitor entry in the box roster.
///
/// # Invariants
/// - `name` is non-empty and sanitized.
/// - Roster order is queue order and is significant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Competitor {
    /// Sanitized competitor name (wire name `nume`).
    #[serde(rename = "nume")]
    pub name: String,
    /// Whether the competitor already climbed and was scored.
    pub marked: bool,
    /// Optional sanitized club affiliation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub club: Option<String>,
}

// ============================================================================
// SECTION: Box State
// ============================================================================

/// Per-route score or time cells, indexed by `routeIndex - 1`.
///
/// Cells are `None` for routes not yet scored.
pub type RouteSeries = Vec<Option<f64>>;

/// Full contest state for one box.
///
/// # Invariants
/// - `box_version` never decreases within a `session_id`.
/// - `0.0 <= hold_count <= holds_count` whenever `holds_count > 0`.
/// - `timer_state == Running` if and only if `started`.
/// - `scores`/`times` series never extend past the current `route_index`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoxState {
    /// Session epoch token; rotated on full reset and restart-from-first.
    pub session_id: SessionId,
    /// Monotonic epoch counter, incremented by `INIT_ROUTE`.
    pub box_version: u64,
    /// Whether a route has been initialized since the last reset.
    pub initiated: bool,
    /// Sanitized contest category label.
    pub categorie: String,
    /// Current route number, 1-based.
    pub route_index: u32,
    /// Total number of routes in the contest.
    pub routes_count: u32,
    /// Maximum holds on the current route.
    pub holds_count: u32,
    /// Per-route maximum holds; may be empty.
    pub holds_counts: Vec<u32>,
    /// Timer lifecycle state.
    pub timer_state: TimerState,
    /// Mirror of `timer_state == Running`.
    pub started: bool,
    /// Normalized timer preset (`MM:SS`), when configured.
    pub timer_preset: Option<String>,
    /// Timer preset in seconds, derived from `timer_preset`.
    pub timer_preset_sec: Option<u32>,
    /// Authoritative remaining seconds fed by the external ticker.
    pub remaining: Option<f64>,
    /// Current climber hold progress; supports 0.1 granularity.
    pub hold_count: f64,
    /// Name of the climber currently on the wall, or empty.
    pub current_climber: String,
    /// Name of the next unmarked climber in queue, or empty.
    pub preparing_climber: String,
    /// Most recently registered climb time in seconds.
    pub last_registered_time: Option<f64>,
    /// Ordered competitor roster; insertion order is queue order.
    pub competitors: Vec<Competitor>,
    /// Per-competitor scores indexed by route.
    pub scores: BTreeMap<String, RouteSeries>,
    /// Per-competitor registered times indexed by route.
    pub times: BTreeMap<String, RouteSeries>,
    /// Whether the time criterion participates in ranking.
    pub time_criterion_enabled: bool,
    /// Persisted time-stage decisions keyed by tie fingerprint.
    pub time_tiebreak_decisions: BTreeMap<TieFingerprint, TieDecisionChoice>,
    /// Fingerprint of the most recently resolved time-stage tie.
    pub time_tiebreak_resolved_fingerprint: Option<TieFingerprint>,
    /// Decision applied to the resolved time-stage fingerprint.
    pub time_tiebreak_resolved_decision: Option<TieDecisionChoice>,
    /// Last operator preference for the time stage.
    pub time_tiebreak_preference: Option<TieDecisionChoice>,
    /// Persisted previous-rounds decisions keyed by tie fingerprint.
    pub prev_rounds_tiebreak_decisions: BTreeMap<TieFingerprint, TieDecisionChoice>,
    /// Fingerprint of the most recently resolved previous-rounds tie.
    pub prev_rounds_tiebreak_resolved_fingerprint: Option<TieFingerprint>,
    /// Decision applied to the resolved previous-rounds fingerprint.
    pub prev_rounds_tiebreak_resolved_decision: Option<TieDecisionChoice>,
    /// Last operator preference for the previous-rounds stage.
    pub prev_rounds_tiebreak_preference: Option<TieDecisionChoice>,
    /// Manual orderings keyed by tie fingerprint (previous-rounds `yes`).
    pub prev_rounds_tiebreak_orders: BTreeMap<TieFingerprint, Vec<String>>,
    /// Manual rank maps keyed by tie fingerprint (previous-rounds `yes`).
    pub prev_rounds_tiebreak_ranks: BTreeMap<TieFingerprint, BTreeMap<String, u32>>,
    /// Stable rank maps keyed by tie lineage (round + raw performance).
    pub prev_rounds_tiebreak_lineage_ranks: BTreeMap<LineageKey, BTreeMap<String, u32>>,
}

impl BoxState {
    /// Creates a fresh box state with a newly minted session epoch.
    #[must_use]
    pub fn new() -> Self {
        Self::with_session(SessionId::generate())
    }

    /// Creates a fresh box state bound to the provided session epoch.
    #[must_use]
    pub fn with_session(session_id: SessionId) -> Self {
        Self {
            session_id,
            box_version: 0,
            initiated: false,
            categorie: String::new(),
            route_index: 1,
            routes_count: 1,
            holds_count: 0,
            holds_counts: Vec::new(),
            timer_state: TimerState::Idle,
            started: false,
            timer_preset: None,
            timer_preset_sec: None,
            remaining: None,
            hold_count: 0.0,
            current_climber: String::new(),
            preparing_climber: String::new(),
            last_registered_time: None,
            competitors: Vec::new(),
            scores: BTreeMap::new(),
            times: BTreeMap::new(),
            time_criterion_enabled: false,
            time_tiebreak_decisions: BTreeMap::new(),
            time_tiebreak_resolved_fingerprint: None,
            time_tiebreak_resolved_decision: None,
            time_tiebreak_preference: None,
            prev_rounds_tiebreak_decisions: BTreeMap::new(),
            prev_rounds_tiebreak_resolved_fingerprint: None,
            prev_rounds_tiebreak_resolved_decision: None,
            prev_rounds_tiebreak_preference: None,
            prev_rounds_tiebreak_orders: BTreeMap::new(),
            prev_rounds_tiebreak_ranks: BTreeMap::new(),
            prev_rounds_tiebreak_lineage_ranks: BTreeMap::new(),
        }
    }
}

impl Default for BoxState {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// SECTION: Timer Preset Parsing
// ============================================================================

/// Parses a `MM:SS` (or `M:S`) preset into whole seconds.
///
/// Mirrors the tolerant historical behavior: an empty component counts as
/// zero, anything non-numeric yields `None`.
#[must_use]
pub fn parse_timer_preset(preset: &str) -> Option<u32> {
    let (minutes, seconds) = preset.split_once(':')?;
    let minutes = parse_component(minutes)?;
    let seconds = parse_component(seconds)?;
    Some(minutes * 60 + seconds)
}

/// Parses one preset component, treating an empty string as zero.
fn parse_component(component: &str) -> Option<u32> {
    let trimmed = component.trim();
    if trimmed.is_empty() {
        return Some(0);
    }
    trimmed.parse().ok()
}
