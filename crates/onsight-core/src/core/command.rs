// crates/onsight-core/src/core/command.rs
// ============================================================================
// Module: Onsight Commands
// Description: Typed contest commands, validated records, and transition outcomes.
// Purpose: Give every wire command a tagged variant carrying only its own fields.
// Dependencies: crate::core::state, serde, serde_json
// ============================================================================

//! ## Overview
//! Commands arrive from the host as loose JSON records; `runtime::validator`
//! is the boundary where a record becomes a [`Command`] variant. Fields that
//! need historical coercion quirks (submit indices, registered times,
//! competitor entries) stay as raw [`Value`]s so the state machine can apply
//! the same tolerant rules to typed and wire construction alike. Variant
//! tags and field names serialize to the frozen wire contract.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use crate::core::state::BoxState;

// ============================================================================
// SECTION: Command Variants
// ============================================================================

/// Typed contest command, one variant per recognized wire type.
///
/// # Invariants
/// - Tags and field names are stable for serialization and echo payloads.
/// - Variants carry only the fields their command type accepts.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Command {
    /// Initialize (or re-initialize) a route on this box.
    #[serde(rename = "INIT_ROUTE")]
    InitRoute {
        /// 1-based route number; defaults to 1.
        #[serde(rename = "routeIndex", skip_serializing_if = "Option::is_none")]
        route_index: Option<u32>,
        /// Maximum holds on the route; defaults to 0.
        #[serde(rename = "holdsCount", skip_serializing_if = "Option::is_none")]
        holds_count: Option<u32>,
        /// Total routes in the contest.
        #[serde(rename = "routesCount", skip_serializing_if = "Option::is_none")]
        routes_count: Option<u32>,
        /// Per-route maximum holds.
        #[serde(rename = "holdsCounts", skip_serializing_if = "Option::is_none")]
        holds_counts: Option<Vec<u32>>,
        /// Raw competitor entries; normalized by the state machine.
        #[serde(skip_serializing_if = "Option::is_none")]
        competitors: Option<Vec<Value>>,
        /// Contest category label.
        #[serde(skip_serializing_if = "Option::is_none")]
        categorie: Option<String>,
        /// Timer preset in `MM:SS` form.
        #[serde(rename = "timerPreset", skip_serializing_if = "Option::is_none")]
        timer_preset: Option<String>,
    },
    /// Start the countdown for the current climber.
    #[serde(rename = "START_TIMER")]
    StartTimer,
    /// Pause the countdown.
    #[serde(rename = "STOP_TIMER")]
    StopTimer,
    /// Resume a paused countdown.
    #[serde(rename = "RESUME_TIMER")]
    ResumeTimer,
    /// Adjust the current climber's hold progress.
    #[serde(rename = "PROGRESS_UPDATE")]
    ProgressUpdate {
        /// Signed hold delta; defaults to 1.
        #[serde(skip_serializing_if = "Option::is_none")]
        delta: Option<f64>,
    },
    /// Register the climb time shown on the judge display.
    #[serde(rename = "REGISTER_TIME")]
    RegisterTime {
        /// Raw registered time; coerced tolerantly by the state machine.
        #[serde(rename = "registeredTime", skip_serializing_if = "Option::is_none")]
        registered_time: Option<Value>,
    },
    /// High-frequency authoritative timer feed from the external ticker.
    #[serde(rename = "TIMER_SYNC")]
    TimerSync {
        /// Remaining seconds reported by the ticker.
        #[serde(skip_serializing_if = "Option::is_none")]
        remaining: Option<f64>,
    },
    /// Configure the timer preset outside of route initialization.
    #[serde(rename = "SET_TIMER_PRESET")]
    SetTimerPreset {
        /// Timer preset in `MM:SS` form.
        #[serde(rename = "timerPreset", skip_serializing_if = "Option::is_none")]
        timer_preset: Option<String>,
    },
    /// Submit a score (and optionally a time) for a competitor.
    #[serde(rename = "SUBMIT_SCORE")]
    SubmitScore {
        /// Target competitor by name.
        #[serde(skip_serializing_if = "Option::is_none")]
        competitor: Option<String>,
        /// Target competitor by roster index (legacy alias).
        #[serde(rename = "competitorIdx", skip_serializing_if = "Option::is_none")]
        competitor_idx: Option<Value>,
        /// Target competitor by roster index.
        #[serde(skip_serializing_if = "Option::is_none")]
        idx: Option<Value>,
        /// Score for the current route.
        #[serde(skip_serializing_if = "Option::is_none")]
        score: Option<f64>,
        /// Raw registered time; falls back to the state's last registered time.
        #[serde(rename = "registeredTime", skip_serializing_if = "Option::is_none")]
        registered_time: Option<Value>,
    },
    /// Enable or disable the time criterion for ranking.
    #[serde(rename = "SET_TIME_CRITERION")]
    SetTimeCriterion {
        /// New flag value.
        #[serde(rename = "timeCriterionEnabled", skip_serializing_if = "Option::is_none")]
        time_criterion_enabled: Option<bool>,
    },
    /// Persist an operator decision for a time-stage tie.
    #[serde(rename = "SET_TIME_TIEBREAK_DECISION")]
    SetTimeTiebreakDecision {
        /// Operator choice, `yes` or `no`.
        #[serde(rename = "timeTiebreakDecision", skip_serializing_if = "Option::is_none")]
        decision: Option<String>,
        /// Fingerprint of the tie event being decided.
        #[serde(rename = "timeTiebreakFingerprint", skip_serializing_if = "Option::is_none")]
        fingerprint: Option<String>,
    },
    /// Persist an operator decision for a previous-rounds tie.
    #[serde(rename = "SET_PREV_ROUNDS_TIEBREAK_DECISION")]
    SetPrevRoundsTiebreakDecision {
        /// Operator choice, `yes` or `no`.
        #[serde(rename = "prevRoundsTiebreakDecision", skip_serializing_if = "Option::is_none")]
        decision: Option<String>,
        /// Fingerprint of the tie event being decided.
        #[serde(
            rename = "prevRoundsTiebreakFingerprint",
            skip_serializing_if = "Option::is_none"
        )]
        fingerprint: Option<String>,
        /// Manual ordering of the tied names, best first.
        #[serde(rename = "prevRoundsTiebreakOrder", skip_serializing_if = "Option::is_none")]
        order: Option<Vec<Value>>,
        /// Manual previous-rounds ranks keyed by competitor name.
        #[serde(
            rename = "prevRoundsTiebreakRanksByName",
            skip_serializing_if = "Option::is_none"
        )]
        ranks_by_name: Option<Value>,
        /// Lineage key carrying the decision across recomputed fingerprints.
        #[serde(
            rename = "prevRoundsTiebreakLineageKey",
            skip_serializing_if = "Option::is_none"
        )]
        lineage_key: Option<String>,
    },
    /// Ask the host to rebroadcast the current snapshot.
    #[serde(rename = "REQUEST_STATE")]
    RequestState,
    /// Ask the host which competitor is active.
    #[serde(rename = "REQUEST_ACTIVE_COMPETITOR")]
    RequestActiveCompetitor,
    /// Announce the active climber to observers.
    #[serde(rename = "ACTIVE_CLIMBER")]
    ActiveClimber,
    /// Selectively reset timer, progress, or the whole marking state.
    #[serde(rename = "RESET_PARTIAL")]
    ResetPartial {
        /// Reset timer state and remaining seconds.
        #[serde(rename = "resetTimer")]
        reset_timer: bool,
        /// Clear the current climber's hold progress.
        #[serde(rename = "clearProgress")]
        clear_progress: bool,
        /// Unmark everyone and rewind the box to a pre-init state.
        #[serde(rename = "unmarkAll")]
        unmark_all: bool,
    },
    /// Reset the box to a fresh default state with a new session epoch.
    #[serde(rename = "RESET_BOX")]
    ResetBox,
}

impl Command {
    /// Returns whether the session gate should demand a `sessionId`.
    ///
    /// `INIT_ROUTE` is the canonical sessionless command: it opens a new
    /// epoch rather than participating in one.
    #[must_use]
    pub const fn requires_session(&self) -> bool {
        !matches!(
            self,
            Self::InitRoute {
                ..
            }
        )
    }
}

// ============================================================================
// SECTION: Command Record
// ============================================================================

/// A validated command together with its envelope and echo payload base.
///
/// # Invariants
/// - `payload` holds the original wire record (unknown fields included) when
///   built by the validator, or the canonical serialization of `command`
///   when built directly.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandRecord {
    /// Typed command body.
    pub command: Command,
    /// Box identifier; `-1` means global, not box-scoped.
    pub box_id: Option<i64>,
    /// Session epoch token presented by the caller.
    pub session_id: Option<String>,
    /// Box version presented by the caller.
    pub box_version: Option<u64>,
    /// Optional caller-side action identifier for deduplication.
    pub action_id: Option<String>,
    /// Echo payload base; enriched by the state machine.
    pub payload: Map<String, Value>,
}

impl CommandRecord {
    /// Builds a record directly from a typed command.
    #[must_use]
    pub fn new(command: Command) -> Self {
        let payload = match serde_json::to_value(&command) {
            Ok(Value::Object(map)) => map,
            Ok(_) | Err(_) => Map::new(),
        };
        Self {
            command,
            box_id: None,
            session_id: None,
            box_version: None,
            action_id: None,
            payload,
        }
    }

    /// Builds a record from a typed command plus the original wire payload.
    #[must_use]
    pub const fn from_wire(command: Command, payload: Map<String, Value>) -> Self {
        Self {
            command,
            box_id: None,
            session_id: None,
            box_version: None,
            action_id: None,
            payload,
        }
    }

    /// Attaches a session epoch token.
    #[must_use]
    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        let session_id = session_id.into();
        self.payload.insert("sessionId".to_string(), Value::String(session_id.clone()));
        self.session_id = Some(session_id);
        self
    }

    /// Attaches a box version.
    #[must_use]
    pub fn with_box_version(mut self, box_version: u64) -> Self {
        self.payload.insert("boxVersion".to_string(), Value::from(box_version));
        self.box_version = Some(box_version);
        self
    }

    /// Attaches a box identifier.
    #[must_use]
    pub fn with_box_id(mut self, box_id: i64) -> Self {
        self.payload.insert("boxId".to_string(), Value::from(box_id));
        self.box_id = Some(box_id);
        self
    }
}

// ============================================================================
// SECTION: Command Outcome
// ============================================================================

/// Result of applying one command to a box state.
///
/// # Invariants
/// - `state` is a complete replacement value; the caller persists it and,
///   when `snapshot_required`, broadcasts it together with `payload`.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandOutcome {
    /// The new box state.
    pub state: BoxState,
    /// Echo payload: the original command enriched with resolved fields.
    pub payload: Map<String, Value>,
    /// Whether the caller must persist and broadcast the snapshot.
    pub snapshot_required: bool,
}
