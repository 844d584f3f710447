// crates/onsight-core/src/runtime/validator.rs
// ============================================================================
// Module: Onsight Command Validator
// Description: Syntactic and semantic validation of incoming command records.
// Purpose: Turn loose JSON records into typed commands, fail-closed.
// Dependencies: crate::core, serde_json, thiserror
// ============================================================================

//! ## Overview
//! The validator is the boundary where an untrusted wire record becomes a
//! typed [`Command`]. It enforces the closed set of command types, numeric
//! ranges, per-type required fields, timer-preset normalization, and the
//! content rules for competitor names. Anything it cannot prove safe is
//! rejected; the state machine downstream only ever sees validated shapes
//! (or commands the host constructed directly in code).

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Map;
use serde_json::Value;
use thiserror::Error;

use crate::core::Command;
use crate::core::CommandRecord;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Inclusive `boxId` range; `-1` is the global (not box-scoped) sentinel.
const BOX_ID_RANGE: (i64, i64) = (-1, 9_999);

/// Maximum `boxVersion` value.
const MAX_BOX_VERSION: u64 = 99_999;

/// Maximum `sessionId` length.
const MAX_SESSION_ID_LEN: usize = 64;

/// Maximum `actionId` length.
const MAX_ACTION_ID_LEN: usize = 128;

/// Maximum competitor-roster size per command.
const MAX_COMPETITORS: usize = 500;

/// Maximum `competitor` field length.
const MAX_COMPETITOR_LEN: usize = 255;

/// Substrings that disqualify operator-entered names outright.
///
/// # Invariants
/// - All entries are lowercase; matching lowercases the candidate first.
const DANGEROUS_SUBSTRINGS: &[&str] = &[
    "--",
    "/*",
    "*/",
    "<script",
    "</script",
    "javascript:",
    "vbscript:",
    "onerror=",
    "onload=",
    "onclick=",
    "data:text/html",
];

// ============================================================================
// SECTION: Validation Errors
// ============================================================================

/// Command validation failures.
///
/// # Invariants
/// - Variants are stable for transport mapping; no state change has
///   happened when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// The wire payload is not a JSON object.
    #[error("command must be a JSON object")]
    NotARecord,
    /// The record has no `type` string.
    #[error("command type is required")]
    MissingType,
    /// The record's `type` is not in the recognized set.
    #[error("unknown command type: {0}")]
    UnknownType(String),
    /// A per-type required field is missing.
    #[error("{command} requires {field}")]
    MissingField {
        /// Command type name.
        command: &'static str,
        /// Missing field name.
        field: &'static str,
    },
    /// A field has the wrong JSON type.
    #[error("{field} has an invalid type")]
    InvalidType {
        /// Offending field name.
        field: &'static str,
    },
    /// A numeric field is outside its allowed range.
    #[error("{field} is out of range")]
    OutOfRange {
        /// Offending field name.
        field: &'static str,
    },
    /// A string field violates its length bounds.
    #[error("{field} has an invalid length")]
    InvalidLength {
        /// Offending field name.
        field: &'static str,
    },
    /// The timer preset is not `M:S`/`MM:SS` within bounds.
    #[error("timerPreset must be M:S or MM:SS with minutes 0-99 and seconds 0-59")]
    InvalidTimerPreset,
    /// A name field contains dangerous content.
    #[error("{field} contains disallowed content")]
    DangerousContent {
        /// Offending field name.
        field: &'static str,
    },
    /// The competitor list exceeds the roster cap.
    #[error("competitors list exceeds {MAX_COMPETITORS} entries")]
    TooManyCompetitors,
    /// A competitor entry is not a record with a non-empty `nume`.
    #[error("competitors entries must be records with a non-empty nume")]
    InvalidCompetitorEntry,
}

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// Validates a loose wire record into a typed [`CommandRecord`].
///
/// The returned record keeps the original payload (unknown fields included)
/// as the echo base.
///
/// # Errors
///
/// Returns [`CommandError`] when the record is not an object, its type is
/// unknown, a required field is missing, or any field fails its range,
/// length, or content rules.
pub fn validate_command(record: &Value) -> Result<CommandRecord, CommandError> {
    let map = record.as_object().ok_or(CommandError::NotARecord)?;
    let ctype = map
        .get("type")
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
        .ok_or(CommandError::MissingType)?;

    let command = match ctype {
        "INIT_ROUTE" => validate_init_route(map)?,
        "START_TIMER" => Command::StartTimer,
        "STOP_TIMER" => Command::StopTimer,
        "RESUME_TIMER" => Command::ResumeTimer,
        "PROGRESS_UPDATE" => validate_progress_update(map)?,
        "REGISTER_TIME" => validate_register_time(map)?,
        "TIMER_SYNC" => validate_timer_sync(map)?,
        "SET_TIMER_PRESET" => validate_set_timer_preset(map)?,
        "SUBMIT_SCORE" => validate_submit_score(map)?,
        "SET_TIME_CRITERION" => validate_set_time_criterion(map)?,
        "SET_TIME_TIEBREAK_DECISION" => validate_time_tiebreak(map)?,
        "SET_PREV_ROUNDS_TIEBREAK_DECISION" => validate_prev_rounds_tiebreak(map)?,
        "REQUEST_STATE" => Command::RequestState,
        "REQUEST_ACTIVE_COMPETITOR" => Command::RequestActiveCompetitor,
        "ACTIVE_CLIMBER" => Command::ActiveClimber,
        "RESET_PARTIAL" => validate_reset_partial(map)?,
        "RESET_BOX" => Command::ResetBox,
        other => return Err(CommandError::UnknownType(other.to_string())),
    };

    let mut out = CommandRecord::from_wire(command, map.clone());
    out.box_id = validate_box_id(map)?;
    out.session_id = validate_session_id(map)?;
    out.box_version = validate_box_version(map)?;
    out.action_id = validate_action_id(map)?;
    Ok(out)
}

// ============================================================================
// SECTION: Envelope Fields
// ============================================================================

/// Validates the optional `boxId` envelope field.
fn validate_box_id(map: &Map<String, Value>) -> Result<Option<i64>, CommandError> {
    let Some(value) = present(map, "boxId") else {
        return Ok(None);
    };
    let box_id = value.as_i64().ok_or(CommandError::InvalidType {
        field: "boxId",
    })?;
    if box_id < BOX_ID_RANGE.0 || box_id > BOX_ID_RANGE.1 {
        return Err(CommandError::OutOfRange {
            field: "boxId",
        });
    }
    Ok(Some(box_id))
}

/// Validates the optional `sessionId` envelope field.
fn validate_session_id(map: &Map<String, Value>) -> Result<Option<String>, CommandError> {
    let Some(value) = present(map, "sessionId") else {
        return Ok(None);
    };
    let session = value.as_str().ok_or(CommandError::InvalidType {
        field: "sessionId",
    })?;
    if session.is_empty() || session.len() > MAX_SESSION_ID_LEN {
        return Err(CommandError::InvalidLength {
            field: "sessionId",
        });
    }
    Ok(Some(session.to_string()))
}

/// Validates the optional `boxVersion` envelope field.
fn validate_box_version(map: &Map<String, Value>) -> Result<Option<u64>, CommandError> {
    let Some(value) = present(map, "boxVersion") else {
        return Ok(None);
    };
    let version = value.as_u64().ok_or(CommandError::InvalidType {
        field: "boxVersion",
    })?;
    if version > MAX_BOX_VERSION {
        return Err(CommandError::OutOfRange {
            field: "boxVersion",
        });
    }
    Ok(Some(version))
}

/// Validates the optional `actionId` envelope field.
fn validate_action_id(map: &Map<String, Value>) -> Result<Option<String>, CommandError> {
    let Some(value) = present(map, "actionId") else {
        return Ok(None);
    };
    let action = value.as_str().ok_or(CommandError::InvalidType {
        field: "actionId",
    })?;
    if action.is_empty() || action.len() > MAX_ACTION_ID_LEN {
        return Err(CommandError::InvalidLength {
            field: "actionId",
        });
    }
    Ok(Some(action.to_string()))
}

// ============================================================================
// SECTION: Per-Type Validation
// ============================================================================

/// Validates `INIT_ROUTE` fields.
fn validate_init_route(map: &Map<String, Value>) -> Result<Command, CommandError> {
    let route_index = require_u64_range(map, "INIT_ROUTE", "routeIndex", 1, 999)?;
    let holds_count = require_u64_range(map, "INIT_ROUTE", "holdsCount", 0, 100)?;
    let routes_count = optional_u64_range(map, "routesCount", 1, 999)?;
    let holds_counts = optional_holds_counts(map)?;
    let competitors = optional_competitors(map)?;
    let categorie = optional_string(map, "categorie", MAX_COMPETITOR_LEN)?;
    let timer_preset = optional_timer_preset(map)?;

    Ok(Command::InitRoute {
        route_index: Some(u64_to_u32(route_index)),
        holds_count: Some(u64_to_u32(holds_count)),
        routes_count: routes_count.map(u64_to_u32),
        holds_counts,
        competitors,
        categorie,
        timer_preset,
    })
}

/// Validates `PROGRESS_UPDATE` fields.
fn validate_progress_update(map: &Map<String, Value>) -> Result<Command, CommandError> {
    let delta = require_f64_range(map, "PROGRESS_UPDATE", "delta", -10.0, 10.0)?;
    Ok(Command::ProgressUpdate {
        delta: Some(delta),
    })
}

/// Validates `REGISTER_TIME` fields.
fn validate_register_time(map: &Map<String, Value>) -> Result<Command, CommandError> {
    let time = require_time_value(map, "REGISTER_TIME", "registeredTime")?;
    Ok(Command::RegisterTime {
        registered_time: Some(time),
    })
}

/// Validates `TIMER_SYNC` fields.
fn validate_timer_sync(map: &Map<String, Value>) -> Result<Command, CommandError> {
    let remaining = require_f64_range(map, "TIMER_SYNC", "remaining", 0.0, 9_999.0)?;
    Ok(Command::TimerSync {
        remaining: Some(remaining),
    })
}

/// Validates `SET_TIMER_PRESET` fields.
fn validate_set_timer_preset(map: &Map<String, Value>) -> Result<Command, CommandError> {
    let preset = optional_timer_preset(map)?.ok_or(CommandError::MissingField {
        command: "SET_TIMER_PRESET",
        field: "timerPreset",
    })?;
    Ok(Command::SetTimerPreset {
        timer_preset: Some(preset),
    })
}

/// Validates `SUBMIT_SCORE` fields.
fn validate_submit_score(map: &Map<String, Value>) -> Result<Command, CommandError> {
    let competitor = optional_competitor_name(map)?;
    let idx = optional_index(map, "idx")?;
    let competitor_idx = optional_index(map, "competitorIdx")?;

    if competitor.is_none() && idx.is_none() && competitor_idx.is_none() {
        return Err(CommandError::MissingField {
            command: "SUBMIT_SCORE",
            field: "competitor, competitorIdx, or idx",
        });
    }

    let score = optional_f64_range(map, "score", 0.0, 100.0)?;
    let registered_time = optional_time_value(map, "registeredTime")?;

    Ok(Command::SubmitScore {
        competitor,
        competitor_idx,
        idx,
        score,
        registered_time,
    })
}

/// Validates `SET_TIME_CRITERION` fields.
fn validate_set_time_criterion(map: &Map<String, Value>) -> Result<Command, CommandError> {
    let value = present(map, "timeCriterionEnabled").ok_or(CommandError::MissingField {
        command: "SET_TIME_CRITERION",
        field: "timeCriterionEnabled",
    })?;
    let enabled = value.as_bool().ok_or(CommandError::InvalidType {
        field: "timeCriterionEnabled",
    })?;
    Ok(Command::SetTimeCriterion {
        time_criterion_enabled: Some(enabled),
    })
}

/// Validates `SET_TIME_TIEBREAK_DECISION` fields.
fn validate_time_tiebreak(map: &Map<String, Value>) -> Result<Command, CommandError> {
    Ok(Command::SetTimeTiebreakDecision {
        decision: optional_string(map, "timeTiebreakDecision", 16)?,
        fingerprint: optional_string(map, "timeTiebreakFingerprint", 128)?,
    })
}

/// Validates `SET_PREV_ROUNDS_TIEBREAK_DECISION` fields.
fn validate_prev_rounds_tiebreak(map: &Map<String, Value>) -> Result<Command, CommandError> {
    let order = match present(map, "prevRoundsTiebreakOrder") {
        None => None,
        Some(Value::Array(items)) => Some(items.clone()),
        Some(_) => {
            return Err(CommandError::InvalidType {
                field: "prevRoundsTiebreakOrder",
            });
        }
    };
    let ranks_by_name = match present(map, "prevRoundsTiebreakRanksByName") {
        None => None,
        Some(value @ Value::Object(_)) => Some(value.clone()),
        Some(_) => {
            return Err(CommandError::InvalidType {
                field: "prevRoundsTiebreakRanksByName",
            });
        }
    };
    Ok(Command::SetPrevRoundsTiebreakDecision {
        decision: optional_string(map, "prevRoundsTiebreakDecision", 16)?,
        fingerprint: optional_string(map, "prevRoundsTiebreakFingerprint", 128)?,
        order,
        ranks_by_name,
        lineage_key: optional_string(map, "prevRoundsTiebreakLineageKey", 128)?,
    })
}

/// Validates `RESET_PARTIAL` fields.
fn validate_reset_partial(map: &Map<String, Value>) -> Result<Command, CommandError> {
    Ok(Command::ResetPartial {
        reset_timer: optional_flag(map, "resetTimer")?,
        clear_progress: optional_flag(map, "clearProgress")?,
        unmark_all: optional_flag(map, "unmarkAll")?,
    })
}

// ============================================================================
// SECTION: Field Helpers
// ============================================================================

/// Returns a field value, treating JSON `null` as absent.
fn present<'a>(map: &'a Map<String, Value>, field: &str) -> Option<&'a Value> {
    map.get(field).filter(|value| !value.is_null())
}

/// Narrows a validated `u64` into `u32` (ranges above guarantee fit).
#[allow(clippy::cast_possible_truncation, reason = "Callers range-check to at most 999.")]
const fn u64_to_u32(value: u64) -> u32 {
    value as u32
}

/// Requires an unsigned integer field within an inclusive range.
fn require_u64_range(
    map: &Map<String, Value>,
    command: &'static str,
    field: &'static str,
    min: u64,
    max: u64,
) -> Result<u64, CommandError> {
    let value = present(map, field).ok_or(CommandError::MissingField {
        command,
        field,
    })?;
    let number = value.as_u64().ok_or(CommandError::InvalidType {
        field,
    })?;
    if number < min || number > max {
        return Err(CommandError::OutOfRange {
            field,
        });
    }
    Ok(number)
}

/// Validates an optional unsigned integer field within an inclusive range.
fn optional_u64_range(
    map: &Map<String, Value>,
    field: &'static str,
    min: u64,
    max: u64,
) -> Result<Option<u64>, CommandError> {
    let Some(value) = present(map, field) else {
        return Ok(None);
    };
    let number = value.as_u64().ok_or(CommandError::InvalidType {
        field,
    })?;
    if number < min || number > max {
        return Err(CommandError::OutOfRange {
            field,
        });
    }
    Ok(Some(number))
}

/// Requires a finite float field within an inclusive range.
fn require_f64_range(
    map: &Map<String, Value>,
    command: &'static str,
    field: &'static str,
    min: f64,
    max: f64,
) -> Result<f64, CommandError> {
    let value = present(map, field).ok_or(CommandError::MissingField {
        command,
        field,
    })?;
    finite_f64_in_range(value, field, min, max)
}

/// Validates an optional finite float field within an inclusive range.
fn optional_f64_range(
    map: &Map<String, Value>,
    field: &'static str,
    min: f64,
    max: f64,
) -> Result<Option<f64>, CommandError> {
    let Some(value) = present(map, field) else {
        return Ok(None);
    };
    finite_f64_in_range(value, field, min, max).map(Some)
}

/// Extracts a finite float from a JSON number and range-checks it.
fn finite_f64_in_range(
    value: &Value,
    field: &'static str,
    min: f64,
    max: f64,
) -> Result<f64, CommandError> {
    let number = value.as_f64().filter(|number| number.is_finite()).ok_or(
        CommandError::InvalidType {
            field,
        },
    )?;
    if number < min || number > max {
        return Err(CommandError::OutOfRange {
            field,
        });
    }
    Ok(number)
}

/// Validates an optional string field with a maximum length.
fn optional_string(
    map: &Map<String, Value>,
    field: &'static str,
    max_len: usize,
) -> Result<Option<String>, CommandError> {
    let Some(value) = present(map, field) else {
        return Ok(None);
    };
    let text = value.as_str().ok_or(CommandError::InvalidType {
        field,
    })?;
    if text.len() > max_len {
        return Err(CommandError::InvalidLength {
            field,
        });
    }
    Ok(Some(text.to_string()))
}

/// Validates an optional strict-boolean flag, defaulting to `false`.
fn optional_flag(map: &Map<String, Value>, field: &'static str) -> Result<bool, CommandError> {
    let Some(value) = present(map, field) else {
        return Ok(false);
    };
    value.as_bool().ok_or(CommandError::InvalidType {
        field,
    })
}

/// Requires a registered-time value: a finite number in `[0, 3600]`,
/// numeric strings included.
fn require_time_value(
    map: &Map<String, Value>,
    command: &'static str,
    field: &'static str,
) -> Result<Value, CommandError> {
    let value = present(map, field).ok_or(CommandError::MissingField {
        command,
        field,
    })?;
    check_time_value(value, field)?;
    Ok(value.clone())
}

/// Validates an optional registered-time value.
fn optional_time_value(
    map: &Map<String, Value>,
    field: &'static str,
) -> Result<Option<Value>, CommandError> {
    let Some(value) = present(map, field) else {
        return Ok(None);
    };
    check_time_value(value, field)?;
    Ok(Some(value.clone()))
}

/// Checks a time value for shape and range without coercing it.
///
/// The state machine performs the actual coercion; the validator only
/// guarantees the wire value can coerce to a finite time in `[0, 3600]`.
fn check_time_value(value: &Value, field: &'static str) -> Result<(), CommandError> {
    let number = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        Value::Bool(_) | Value::Null | Value::Array(_) | Value::Object(_) => None,
    };
    let number = number.filter(|number| number.is_finite()).ok_or(CommandError::InvalidType {
        field,
    })?;
    if !(0.0..=3_600.0).contains(&number) {
        return Err(CommandError::OutOfRange {
            field,
        });
    }
    Ok(())
}

/// Validates an optional roster index: integer or base-10 numeric string.
///
/// Empty strings count as absent, matching the historical tab behavior of
/// sending `idx: ""` when no row is selected.
fn optional_index(
    map: &Map<String, Value>,
    field: &'static str,
) -> Result<Option<Value>, CommandError> {
    let Some(value) = present(map, field) else {
        return Ok(None);
    };
    match value {
        Value::Number(number) => {
            let index = number.as_i64().ok_or(CommandError::InvalidType {
                field,
            })?;
            if !(0..=9_999).contains(&index) {
                return Err(CommandError::OutOfRange {
                    field,
                });
            }
            Ok(Some(value.clone()))
        }
        Value::String(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            let index: i64 = trimmed.parse().map_err(|_| CommandError::InvalidType {
                field,
            })?;
            if !(0..=9_999).contains(&index) {
                return Err(CommandError::OutOfRange {
                    field,
                });
            }
            Ok(Some(value.clone()))
        }
        Value::Bool(_) | Value::Null | Value::Array(_) | Value::Object(_) => {
            Err(CommandError::InvalidType {
                field,
            })
        }
    }
}

// ============================================================================
// SECTION: Timer Preset Normalization
// ============================================================================

/// Validates and normalizes an optional `timerPreset` field.
fn optional_timer_preset(map: &Map<String, Value>) -> Result<Option<String>, CommandError> {
    let Some(value) = present(map, "timerPreset") else {
        return Ok(None);
    };
    let preset = value.as_str().ok_or(CommandError::InvalidType {
        field: "timerPreset",
    })?;
    normalize_timer_preset(preset).map(Some)
}

/// Normalizes `M:S`/`MM:SS` into zero-padded `MM:SS`.
///
/// # Errors
///
/// Returns [`CommandError::InvalidTimerPreset`] for any other shape, or
/// when minutes exceed 99 or seconds exceed 59.
pub fn normalize_timer_preset(preset: &str) -> Result<String, CommandError> {
    let (minutes, seconds) =
        preset.trim().split_once(':').ok_or(CommandError::InvalidTimerPreset)?;
    let minutes = parse_preset_component(minutes, 99)?;
    let seconds = parse_preset_component(seconds, 59)?;
    Ok(format!("{minutes:02}:{seconds:02}"))
}

/// Parses one preset component: 1-2 ASCII digits up to `max`.
fn parse_preset_component(component: &str, max: u32) -> Result<u32, CommandError> {
    if component.is_empty()
        || component.len() > 2
        || !component.bytes().all(|byte| byte.is_ascii_digit())
    {
        return Err(CommandError::InvalidTimerPreset);
    }
    let parsed: u32 = component.parse().map_err(|_| CommandError::InvalidTimerPreset)?;
    if parsed > max {
        return Err(CommandError::InvalidTimerPreset);
    }
    Ok(parsed)
}

// ============================================================================
// SECTION: Name Safety
// ============================================================================

/// Returns whether a string contains a known-dangerous substring.
fn has_dangerous_content(value: &str) -> bool {
    let lowered = value.to_lowercase();
    DANGEROUS_SUBSTRINGS.iter().any(|needle| lowered.contains(needle))
}

/// Returns whether a directly-supplied competitor name looks like an
/// injection attempt.
///
/// The SQL heuristic only fires when an apostrophe is present, so ordinary
/// names with apostrophes (`O'Brien`) pass.
fn is_suspicious_direct_name(value: &str) -> bool {
    if has_dangerous_content(value) {
        return true;
    }
    if value.contains('<') && value.contains('>') {
        return true;
    }
    if value.contains('\'') {
        let lowered = value.to_lowercase();
        if lowered.contains(" or ") || lowered.contains(" and ") || lowered.contains('=') {
            return true;
        }
    }
    false
}

/// Validates the optional direct `competitor` field.
fn optional_competitor_name(map: &Map<String, Value>) -> Result<Option<String>, CommandError> {
    let Some(value) = present(map, "competitor") else {
        return Ok(None);
    };
    let name = value.as_str().ok_or(CommandError::InvalidType {
        field: "competitor",
    })?;
    if name.is_empty() || name.len() > MAX_COMPETITOR_LEN {
        return Err(CommandError::InvalidLength {
            field: "competitor",
        });
    }
    if is_suspicious_direct_name(name) {
        return Err(CommandError::DangerousContent {
            field: "competitor",
        });
    }
    Ok(Some(name.to_string()))
}

/// Validates the optional competitor roster on `INIT_ROUTE`.
fn optional_competitors(map: &Map<String, Value>) -> Result<Option<Vec<Value>>, CommandError> {
    let Some(value) = present(map, "competitors") else {
        return Ok(None);
    };
    let entries = value.as_array().ok_or(CommandError::InvalidType {
        field: "competitors",
    })?;
    if entries.len() > MAX_COMPETITORS {
        return Err(CommandError::TooManyCompetitors);
    }
    for entry in entries {
        let record = entry.as_object().ok_or(CommandError::InvalidCompetitorEntry)?;
        let name = record
            .get("nume")
            .and_then(Value::as_str)
            .filter(|name| !name.trim().is_empty())
            .ok_or(CommandError::InvalidCompetitorEntry)?;
        if has_dangerous_content(name) {
            return Err(CommandError::DangerousContent {
                field: "competitors",
            });
        }
    }
    Ok(Some(entries.clone()))
}

/// Validates the optional per-route holds list on `INIT_ROUTE`.
fn optional_holds_counts(map: &Map<String, Value>) -> Result<Option<Vec<u32>>, CommandError> {
    let Some(value) = present(map, "holdsCounts") else {
        return Ok(None);
    };
    let entries = value.as_array().ok_or(CommandError::InvalidType {
        field: "holdsCounts",
    })?;
    if entries.len() > 999 {
        return Err(CommandError::InvalidLength {
            field: "holdsCounts",
        });
    }
    let mut out = Vec::with_capacity(entries.len());
    for entry in entries {
        let holds = entry.as_u64().ok_or(CommandError::InvalidType {
            field: "holdsCounts",
        })?;
        if holds > 100 {
            return Err(CommandError::OutOfRange {
                field: "holdsCounts",
            });
        }
        out.push(u64_to_u32(holds));
    }
    Ok(Some(out))
}
