// crates/onsight-core/src/runtime/machine.rs
// ============================================================================
// Module: Onsight Contest State Machine
// Description: Pure transition function over box state for each command type.
// Purpose: Evolve contest state deterministically and emit echo payloads.
// Dependencies: crate::core, serde_json, thiserror
// ============================================================================

//! ## Overview
//! `apply_command` is the single canonical execution path for contest
//! commands: every API surface the host exposes must funnel through it. It
//! works on a copy of the provided state and returns the new state, the
//! echo payload (the original record enriched with server-resolved fields),
//! and whether the caller must persist and broadcast the snapshot.
//!
//! The machine is deliberately tolerant: hosts sometimes construct commands
//! in code with historical quirks (numeric strings for times and indices,
//! loosely shaped competitor entries), so coercion mirrors the long-standing
//! wire behavior instead of assuming the validator ran first. Only the two
//! failure classes the product treats as operator errors reject the command
//! outright: bad submit indices and bad tiebreak decisions.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde_json::Map;
use serde_json::Value;
use thiserror::Error;

use crate::core::BoxState;
use crate::core::Command;
use crate::core::CommandOutcome;
use crate::core::CommandRecord;
use crate::core::Competitor;
use crate::core::LineageKey;
use crate::core::SessionId;
use crate::core::TieDecisionChoice;
use crate::core::TieFingerprint;
use crate::core::TimerState;
use crate::core::parse_timer_preset;
use crate::core::sanitize_category;
use crate::core::sanitize_competitor_name;
use crate::core::sanitize_string;
use crate::runtime::validator::normalize_timer_preset;

// ============================================================================
// SECTION: Transition Errors
// ============================================================================

/// Synchronous command rejections raised by the state machine.
///
/// # Invariants
/// - No state change has happened when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    /// A submit index was neither an integer nor a base-10 numeric string.
    #[error("SUBMIT_SCORE idx must be an int or numeric string")]
    InvalidSubmitIndex,
    /// A submit index fell outside the roster.
    #[error("SUBMIT_SCORE idx out of range")]
    SubmitIndexOutOfRange,
    /// A submit index referred to a roster entry without a usable name.
    #[error("SUBMIT_SCORE idx refers to invalid competitor")]
    InvalidSubmitTarget,
    /// A tiebreak decision was not `yes` or `no`.
    #[error("tiebreak decision must be \"yes\" or \"no\"")]
    InvalidTiebreakDecision,
    /// A tiebreak decision carried no fingerprint.
    #[error("tiebreak fingerprint must be a non-empty string")]
    MissingTiebreakFingerprint,
    /// A previous-rounds rank map contained a non-positive or non-integer rank.
    #[error("tiebreak ranks must map names to positive integers")]
    InvalidTiebreakRanks,
}

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// Applies one command to the box state.
///
/// Pure by copy: the caller's state is untouched; the outcome carries the
/// replacement value. `TIMER_SYNC` is the only transition that does not
/// demand a snapshot.
///
/// # Errors
///
/// Returns [`TransitionError`] when a `SUBMIT_SCORE` index or a tiebreak
/// decision payload is invalid; the command is rejected with no state
/// change. All other ill-formed optional fields are silently ignored.
pub fn apply_command(
    state: &BoxState,
    record: &CommandRecord,
) -> Result<CommandOutcome, TransitionError> {
    let mut next = state.clone();
    let mut payload = record.payload.clone();
    let snapshot_required = match &record.command {
        Command::InitRoute {
            route_index,
            holds_count,
            routes_count,
            holds_counts,
            competitors,
            categorie,
            timer_preset,
        } => {
            apply_init_route(
                &mut next,
                &mut payload,
                InitRouteFields {
                    route_index: *route_index,
                    holds_count: *holds_count,
                    routes_count: *routes_count,
                    holds_counts: holds_counts.as_deref(),
                    competitors: competitors.as_deref(),
                    categorie: categorie.as_deref(),
                    timer_preset: timer_preset.as_deref(),
                },
            );
            true
        }
        Command::StartTimer => {
            next.started = true;
            next.timer_state = TimerState::Running;
            next.last_registered_time = None;
            next.remaining = None;
            true
        }
        Command::StopTimer => {
            next.started = false;
            next.timer_state = TimerState::Paused;
            true
        }
        Command::ResumeTimer => {
            next.started = true;
            next.timer_state = TimerState::Running;
            next.last_registered_time = None;
            true
        }
        Command::ProgressUpdate {
            delta,
        } => {
            apply_progress_update(&mut next, delta.unwrap_or(1.0));
            true
        }
        Command::RegisterTime {
            registered_time,
        } => {
            if let Some(candidate) = registered_time.as_ref().and_then(coerce_optional_time) {
                next.last_registered_time = Some(candidate);
            }
            true
        }
        Command::TimerSync {
            remaining,
        } => {
            next.remaining = *remaining;
            false
        }
        Command::SetTimerPreset {
            timer_preset,
        } => {
            apply_set_timer_preset(&mut next, &mut payload, timer_preset.as_deref());
            true
        }
        Command::SubmitScore {
            competitor,
            competitor_idx,
            idx,
            score,
            registered_time,
        } => {
            apply_submit_score(
                &mut next,
                &mut payload,
                SubmitScoreFields {
                    competitor: competitor.as_deref(),
                    competitor_idx: competitor_idx.as_ref(),
                    idx: idx.as_ref(),
                    score: *score,
                    registered_time: registered_time.as_ref(),
                },
            )?;
            true
        }
        Command::SetTimeCriterion {
            time_criterion_enabled,
        } => {
            if let Some(enabled) = time_criterion_enabled {
                next.time_criterion_enabled = *enabled;
            }
            true
        }
        Command::SetTimeTiebreakDecision {
            decision,
            fingerprint,
        } => {
            apply_time_tiebreak_decision(
                &mut next,
                &mut payload,
                decision.as_deref(),
                fingerprint.as_deref(),
            )?;
            true
        }
        Command::SetPrevRoundsTiebreakDecision {
            decision,
            fingerprint,
            order,
            ranks_by_name,
            lineage_key,
        } => {
            apply_prev_rounds_tiebreak_decision(
                &mut next,
                &mut payload,
                PrevRoundsDecisionFields {
                    decision: decision.as_deref(),
                    fingerprint: fingerprint.as_deref(),
                    order: order.as_deref(),
                    ranks_by_name: ranks_by_name.as_ref(),
                    lineage_key: lineage_key.as_deref(),
                },
            )?;
            true
        }
        Command::RequestState | Command::RequestActiveCompetitor | Command::ActiveClimber => false,
        Command::ResetPartial {
            reset_timer,
            clear_progress,
            unmark_all,
        } => {
            apply_reset_partial(&mut next, *reset_timer, *clear_progress, *unmark_all);
            true
        }
        Command::ResetBox => {
            next = apply_reset_box(&next);
            true
        }
    };

    Ok(CommandOutcome {
        state: next,
        payload,
        snapshot_required,
    })
}

// ============================================================================
// SECTION: Route Initialization
// ============================================================================

/// Borrowed `INIT_ROUTE` fields.
struct InitRouteFields<'a> {
    /// 1-based route number; defaults to 1 (a zero also maps to 1).
    route_index: Option<u32>,
    /// Maximum holds on the route; defaults to 0.
    holds_count: Option<u32>,
    /// Total routes in the contest.
    routes_count: Option<u32>,
    /// Per-route maximum holds.
    holds_counts: Option<&'a [u32]>,
    /// Raw competitor entries.
    competitors: Option<&'a [Value]>,
    /// Contest category label.
    categorie: Option<&'a str>,
    /// Timer preset in `MM:SS` form.
    timer_preset: Option<&'a str>,
}

/// Applies `INIT_ROUTE`: opens the next box version and stages the route.
fn apply_init_route(next: &mut BoxState, payload: &mut Map<String, Value>, fields: InitRouteFields) {
    next.box_version += 1;
    payload
        .insert("sessionId".to_string(), Value::String(next.session_id.as_str().to_string()));
    next.initiated = true;

    let route_index = fields.route_index.unwrap_or(1).max(1);
    next.holds_count = fields.holds_count.unwrap_or(0);
    next.route_index = route_index;
    if let Some(routes_count) = fields.routes_count {
        next.routes_count = routes_count;
    }
    if let Some(holds_counts) = fields.holds_counts {
        next.holds_counts = holds_counts.to_vec();
    }

    let competitors = normalize_competitors(fields.competitors.unwrap_or_default());
    next.current_climber = competitors.first().map(|comp| comp.name.clone()).unwrap_or_default();
    next.preparing_climber = competitors.get(1).map(|comp| comp.name.clone()).unwrap_or_default();
    next.competitors = competitors;

    next.started = false;
    next.timer_state = TimerState::Idle;
    next.hold_count = 0.0;
    next.last_registered_time = None;
    next.remaining = None;

    // A fresh contest in this box starts at route 1; later routes must keep
    // the scores and times already earned on earlier routes.
    if route_index == 1 {
        next.scores.clear();
        next.times.clear();
        clear_tiebreak_state(next);
    }

    if let Some(categorie) = fields.categorie {
        let sanitized = sanitize_category(categorie);
        if !sanitized.is_empty() {
            next.categorie = sanitized;
        }
    }
    if let Some(preset) = fields.timer_preset {
        if !preset.is_empty() {
            next.timer_preset = Some(preset.to_string());
            next.timer_preset_sec = parse_timer_preset(preset);
        }
    }
}

/// Clears every tiebreak decision map and resolved pointer.
fn clear_tiebreak_state(next: &mut BoxState) {
    next.time_tiebreak_decisions.clear();
    next.time_tiebreak_resolved_fingerprint = None;
    next.time_tiebreak_resolved_decision = None;
    next.time_tiebreak_preference = None;
    next.prev_rounds_tiebreak_decisions.clear();
    next.prev_rounds_tiebreak_resolved_fingerprint = None;
    next.prev_rounds_tiebreak_resolved_decision = None;
    next.prev_rounds_tiebreak_preference = None;
    next.prev_rounds_tiebreak_orders.clear();
    next.prev_rounds_tiebreak_ranks.clear();
    next.prev_rounds_tiebreak_lineage_ranks.clear();
}

// ============================================================================
// SECTION: Progress
// ============================================================================

/// Applies `PROGRESS_UPDATE` with clamping to `[0, holdsCount]`.
fn apply_progress_update(next: &mut BoxState, delta: f64) {
    // The +1 path goes through integer floor so repeated single increments
    // never accumulate float error; fractional deltas round to one decimal.
    let stepped = if (delta - 1.0).abs() < f64::EPSILON {
        next.hold_count.floor() + 1.0
    } else {
        ((next.hold_count + delta) * 10.0).round() / 10.0
    };
    let mut clamped = if stepped < 0.0 { 0.0 } else { stepped };
    if next.holds_count > 0 && clamped > f64::from(next.holds_count) {
        clamped = f64::from(next.holds_count);
    }
    next.hold_count = clamped;
}

// ============================================================================
// SECTION: Timer Preset
// ============================================================================

/// Applies `SET_TIMER_PRESET`, reflecting the preset into `remaining` when
/// the timer is not mid-countdown.
fn apply_set_timer_preset(
    next: &mut BoxState,
    payload: &mut Map<String, Value>,
    timer_preset: Option<&str>,
) {
    let Some(preset) = timer_preset else {
        return;
    };
    let Ok(normalized) = normalize_timer_preset(preset) else {
        // Malformed presets from direct construction are ignored; the wire
        // path rejects them in the validator.
        return;
    };
    let preset_sec = parse_timer_preset(&normalized);
    next.timer_preset = Some(normalized.clone());
    next.timer_preset_sec = preset_sec;
    payload.insert("timerPreset".to_string(), Value::String(normalized));
    if !matches!(next.timer_state, TimerState::Running | TimerState::Paused) {
        next.remaining = preset_sec.map(f64::from);
    }
}

// ============================================================================
// SECTION: Score Submission
// ============================================================================

/// Borrowed `SUBMIT_SCORE` fields.
struct SubmitScoreFields<'a> {
    /// Target competitor by name.
    competitor: Option<&'a str>,
    /// Target competitor by roster index (legacy alias).
    competitor_idx: Option<&'a Value>,
    /// Target competitor by roster index.
    idx: Option<&'a Value>,
    /// Score for the current route.
    score: Option<f64>,
    /// Raw registered time.
    registered_time: Option<&'a Value>,
}

/// Applies `SUBMIT_SCORE`: records results, resets the climb, marks the
/// competitor, and advances the queue.
fn apply_submit_score(
    next: &mut BoxState,
    payload: &mut Map<String, Value>,
    fields: SubmitScoreFields,
) -> Result<(), TransitionError> {
    let effective_time = fields
        .registered_time
        .and_then(coerce_optional_time)
        .or(next.last_registered_time);
    payload.insert(
        "registeredTime".to_string(),
        effective_time.map_or(Value::Null, Value::from),
    );

    let mut resolved_name = fields.competitor.map(str::to_string);
    let index = match (fields.idx, fields.competitor_idx) {
        (Some(raw), _) | (None, Some(raw)) => coerce_index(raw)?,
        (None, None) => None,
    };
    if let Some(index) = index {
        let position =
            usize::try_from(index).map_err(|_| TransitionError::SubmitIndexOutOfRange)?;
        let target = next
            .competitors
            .get(position)
            .ok_or(TransitionError::SubmitIndexOutOfRange)?;
        if target.name.trim().is_empty() {
            return Err(TransitionError::InvalidSubmitTarget);
        }
        payload.insert("competitor".to_string(), Value::String(target.name.clone()));
        resolved_name = Some(target.name.clone());
    }

    let active_name = next.current_climber.clone();
    let route_slot = usize::try_from(next.route_index.max(1) - 1).unwrap_or(0);
    if let Some(name) = resolved_name.as_deref().filter(|name| !name.is_empty()) {
        if let Some(score) = fields.score {
            let series = next.scores.entry(name.to_string()).or_default();
            while series.len() <= route_slot {
                series.push(None);
            }
            series[route_slot] = Some(score);
        }
        if let Some(time) = effective_time {
            let series = next.times.entry(name.to_string()).or_default();
            while series.len() <= route_slot {
                series.push(None);
            }
            series[route_slot] = Some(time);
        }
    }

    next.started = false;
    next.timer_state = TimerState::Idle;
    next.hold_count = 0.0;
    next.last_registered_time = effective_time;
    next.remaining = None;

    if !next.competitors.is_empty() {
        if let Some(name) = resolved_name.as_deref().filter(|name| !name.is_empty()) {
            if let Some(target) = next.competitors.iter_mut().find(|comp| comp.name == name) {
                target.marked = true;
            }
            // Advance only when the active climber was submitted so
            // retroactive edits never disturb the queue.
            if name == active_name {
                next.current_climber = next_unmarked_after(&next.competitors, &active_name);
            }
        }
        next.preparing_climber = next_unmarked_after(&next.competitors, &next.current_climber);
    }
    Ok(())
}

// ============================================================================
// SECTION: Tiebreak Decisions
// ============================================================================

/// Applies `SET_TIME_TIEBREAK_DECISION`.
fn apply_time_tiebreak_decision(
    next: &mut BoxState,
    payload: &mut Map<String, Value>,
    decision: Option<&str>,
    fingerprint: Option<&str>,
) -> Result<(), TransitionError> {
    let choice = normalize_tiebreak_choice(decision)?;
    let fingerprint = normalize_tiebreak_fingerprint(fingerprint)?;

    next.time_tiebreak_decisions.insert(fingerprint.clone(), choice);
    next.time_tiebreak_preference = Some(choice);
    next.time_tiebreak_resolved_fingerprint = Some(fingerprint.clone());
    next.time_tiebreak_resolved_decision = Some(choice);

    payload.insert("timeTiebreakDecision".to_string(), Value::String(choice_label(choice)));
    payload.insert(
        "timeTiebreakFingerprint".to_string(),
        Value::String(fingerprint.as_str().to_string()),
    );
    Ok(())
}

/// Borrowed `SET_PREV_ROUNDS_TIEBREAK_DECISION` fields.
struct PrevRoundsDecisionFields<'a> {
    /// Operator choice.
    decision: Option<&'a str>,
    /// Tie fingerprint being decided.
    fingerprint: Option<&'a str>,
    /// Manual ordering of the tied names.
    order: Option<&'a [Value]>,
    /// Manual rank map keyed by name.
    ranks_by_name: Option<&'a Value>,
    /// Lineage key for carrying the decision forward.
    lineage_key: Option<&'a str>,
}

/// Applies `SET_PREV_ROUNDS_TIEBREAK_DECISION`.
fn apply_prev_rounds_tiebreak_decision(
    next: &mut BoxState,
    payload: &mut Map<String, Value>,
    fields: PrevRoundsDecisionFields,
) -> Result<(), TransitionError> {
    let choice = normalize_tiebreak_choice(fields.decision)?;
    let fingerprint = normalize_tiebreak_fingerprint(fields.fingerprint)?;
    let order = fields.order.map(normalize_tiebreak_order);
    let ranks = fields.ranks_by_name.map(normalize_tiebreak_ranks).transpose()?;
    let lineage_key = fields
        .lineage_key
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(LineageKey::new);

    next.prev_rounds_tiebreak_decisions.insert(fingerprint.clone(), choice);
    next.prev_rounds_tiebreak_preference = Some(choice);
    next.prev_rounds_tiebreak_resolved_fingerprint = Some(fingerprint.clone());
    next.prev_rounds_tiebreak_resolved_decision = Some(choice);

    match choice {
        TieDecisionChoice::Yes => {
            if let Some(order) = order.clone().filter(|order| !order.is_empty()) {
                next.prev_rounds_tiebreak_orders.insert(fingerprint.clone(), order);
            }
            if let Some(ranks) = ranks.clone().filter(|ranks| !ranks.is_empty()) {
                next.prev_rounds_tiebreak_ranks.insert(fingerprint.clone(), ranks.clone());
                if let Some(lineage_key) = &lineage_key {
                    next.prev_rounds_tiebreak_lineage_ranks.insert(lineage_key.clone(), ranks);
                }
            }
        }
        TieDecisionChoice::No => {
            next.prev_rounds_tiebreak_orders.remove(&fingerprint);
            next.prev_rounds_tiebreak_ranks.remove(&fingerprint);
            if let Some(lineage_key) = &lineage_key {
                next.prev_rounds_tiebreak_lineage_ranks.remove(lineage_key);
            }
        }
    }

    payload
        .insert("prevRoundsTiebreakDecision".to_string(), Value::String(choice_label(choice)));
    payload.insert(
        "prevRoundsTiebreakFingerprint".to_string(),
        Value::String(fingerprint.as_str().to_string()),
    );
    if let Some(order) = order {
        payload.insert(
            "prevRoundsTiebreakOrder".to_string(),
            Value::Array(order.into_iter().map(Value::String).collect()),
        );
    }
    if let Some(ranks) = ranks {
        payload.insert(
            "prevRoundsTiebreakRanksByName".to_string(),
            Value::Object(
                ranks.into_iter().map(|(name, rank)| (name, Value::from(rank))).collect(),
            ),
        );
    }
    if let Some(lineage_key) = lineage_key {
        payload.insert(
            "prevRoundsTiebreakLineageKey".to_string(),
            Value::String(lineage_key.as_str().to_string()),
        );
    }
    Ok(())
}

/// Normalizes a tiebreak choice string into a persisted decision.
fn normalize_tiebreak_choice(
    decision: Option<&str>,
) -> Result<TieDecisionChoice, TransitionError> {
    match decision.map(str::trim).map(str::to_lowercase).as_deref() {
        Some("yes") => Ok(TieDecisionChoice::Yes),
        Some("no") => Ok(TieDecisionChoice::No),
        _ => Err(TransitionError::InvalidTiebreakDecision),
    }
}

/// Normalizes a tiebreak fingerprint string.
fn normalize_tiebreak_fingerprint(
    fingerprint: Option<&str>,
) -> Result<TieFingerprint, TransitionError> {
    fingerprint
        .map(str::trim)
        .filter(|fingerprint| !fingerprint.is_empty())
        .map(TieFingerprint::new)
        .ok_or(TransitionError::MissingTiebreakFingerprint)
}

/// Normalizes a manual order list: trimmed strings, empties dropped,
/// deduplicated in arrival order.
fn normalize_tiebreak_order(order: &[Value]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(order.len());
    for entry in order {
        let Some(name) = entry.as_str() else {
            continue;
        };
        let trimmed = name.trim();
        if trimmed.is_empty() || out.iter().any(|existing| existing == trimmed) {
            continue;
        }
        out.push(trimmed.to_string());
    }
    out
}

/// Normalizes a manual rank map: each rank must be a positive integer.
fn normalize_tiebreak_ranks(
    ranks: &Value,
) -> Result<BTreeMap<String, u32>, TransitionError> {
    let Some(entries) = ranks.as_object() else {
        return Err(TransitionError::InvalidTiebreakRanks);
    };
    let mut out = BTreeMap::new();
    for (name, rank) in entries {
        let rank = rank
            .as_u64()
            .filter(|rank| *rank >= 1)
            .and_then(|rank| u32::try_from(rank).ok())
            .ok_or(TransitionError::InvalidTiebreakRanks)?;
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(TransitionError::InvalidTiebreakRanks);
        }
        out.insert(trimmed.to_string(), rank);
    }
    Ok(out)
}

/// Renders a persisted choice as its wire label.
fn choice_label(choice: TieDecisionChoice) -> String {
    match choice {
        TieDecisionChoice::Yes => "yes".to_string(),
        TieDecisionChoice::No => "no".to_string(),
    }
}

// ============================================================================
// SECTION: Resets
// ============================================================================

/// Applies `RESET_PARTIAL` with the `unmarkAll` cascade.
fn apply_reset_partial(
    next: &mut BoxState,
    reset_timer: bool,
    clear_progress: bool,
    unmark_all: bool,
) {
    let reset_timer = reset_timer || unmark_all;
    let clear_progress = clear_progress || unmark_all;

    if unmark_all {
        // Rewind the box to a pre-init state under a fresh epoch; the
        // roster itself survives, unmarked.
        next.initiated = false;
        next.session_id = SessionId::generate();
        next.route_index = 1;
        if let Some(first) = next.holds_counts.first() {
            next.holds_count = *first;
        }
        next.scores.clear();
        next.times.clear();
        next.last_registered_time = None;
        clear_tiebreak_state(next);
        for competitor in &mut next.competitors {
            competitor.marked = false;
        }
        next.current_climber.clear();
        next.preparing_climber.clear();
    }

    if reset_timer {
        next.started = false;
        next.timer_state = TimerState::Idle;
        next.remaining = next.timer_preset_sec.map(f64::from);
        next.last_registered_time = None;
    }

    if clear_progress {
        next.hold_count = 0.0;
    }
}

/// Applies `RESET_BOX`: a fresh default state under a new epoch.
///
/// `boxVersion` survives the reset (historical behavior; concurrent tabs
/// keep their monotonic ordering across the new session).
fn apply_reset_box(current: &BoxState) -> BoxState {
    let mut fresh = BoxState::with_session(SessionId::generate());
    fresh.box_version = current.box_version;
    fresh
}

// ============================================================================
// SECTION: Coercion Helpers
// ============================================================================

/// Coerces a raw wire value into a finite non-negative time.
///
/// Numbers and numeric strings coerce; booleans, non-finite floats, blank
/// strings, and structured values never do.
fn coerce_optional_time(value: &Value) -> Option<f64> {
    let candidate = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return None;
            }
            trimmed.parse::<f64>().ok()
        }
        Value::Bool(_) | Value::Null | Value::Array(_) | Value::Object(_) => None,
    };
    candidate.filter(|time| time.is_finite() && *time >= 0.0)
}

/// Coerces a raw submit index into an integer.
///
/// `None` means "not provided" (null or blank string); anything present but
/// non-numeric is an operator error.
fn coerce_index(value: &Value) -> Result<Option<i64>, TransitionError> {
    match value {
        Value::Null => Ok(None),
        Value::Number(number) => {
            number.as_i64().map(Some).ok_or(TransitionError::InvalidSubmitIndex)
        }
        Value::String(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            trimmed.parse::<i64>().map(Some).map_err(|_| TransitionError::InvalidSubmitIndex)
        }
        Value::Bool(_) | Value::Array(_) | Value::Object(_) => {
            Err(TransitionError::InvalidSubmitIndex)
        }
    }
}

// ============================================================================
// SECTION: Roster Helpers
// ============================================================================

/// Normalizes raw competitor entries into roster entries.
///
/// Malformed entries are dropped; the rest are kept in arrival order.
fn normalize_competitors(entries: &[Value]) -> Vec<Competitor> {
    let mut out = Vec::with_capacity(entries.len());
    for entry in entries {
        let Some(record) = entry.as_object() else {
            continue;
        };
        let Some(raw_name) = record.get("nume").and_then(Value::as_str) else {
            continue;
        };
        let name = sanitize_competitor_name(raw_name);
        if name.is_empty() {
            continue;
        }
        let club = record.get("club").and_then(coerce_club);
        let marked = record.get("marked").is_some_and(coerce_marked);
        out.push(Competitor {
            name,
            marked,
            club,
        });
    }
    out
}

/// Coerces a raw club value into a sanitized non-empty string.
fn coerce_club(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(text) => text.clone(),
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => return None,
    };
    let sanitized = sanitize_string(&text, 255);
    if sanitized.is_empty() { None } else { Some(sanitized) }
}

/// Coerces a raw marked flag: bools, non-zero integers, and the usual
/// truthy strings count as marked.
fn coerce_marked(value: &Value) -> bool {
    match value {
        Value::Bool(flag) => *flag,
        Value::Number(number) => {
            number.as_f64().is_some_and(|number| number.trunc() != 0.0)
        }
        Value::String(text) => {
            matches!(text.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "y" | "on")
        }
        Value::Null | Value::Array(_) | Value::Object(_) => false,
    }
}

/// Finds the next unmarked competitor after `current` in roster order.
fn next_unmarked_after(competitors: &[Competitor], current: &str) -> String {
    if competitors.is_empty() || current.is_empty() {
        return String::new();
    }
    let Some(position) = competitors.iter().position(|comp| comp.name == current) else {
        return String::new();
    };
    competitors[position + 1 ..]
        .iter()
        .find(|comp| !comp.marked && !comp.name.trim().is_empty())
        .map(|comp| comp.name.clone())
        .unwrap_or_default()
}

// ============================================================================
// SECTION: Time Criterion Helper
// ============================================================================

/// Computes the new time-criterion flag and its broadcast payload.
///
/// Pure convenience for hosts that flip the flag outside the command path;
/// the emitted payload always uses the modern `SET_TIME_CRITERION` type.
#[must_use]
pub fn toggle_time_criterion(
    enabled: Option<bool>,
    box_id: Option<i64>,
) -> (bool, Map<String, Value>) {
    let new_value = enabled.unwrap_or(false);
    let mut payload = Map::new();
    payload.insert("type".to_string(), Value::String("SET_TIME_CRITERION".to_string()));
    payload.insert("timeCriterionEnabled".to_string(), Value::Bool(new_value));
    if let Some(box_id) = box_id {
        payload.insert("boxId".to_string(), Value::from(box_id));
    }
    (new_value, payload)
}
