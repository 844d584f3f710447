// crates/onsight-core/src/runtime/ranking.rs
// ============================================================================
// Module: Onsight Lead Ranking Engine
// Description: Lead comparator, podium tiebreak workflow, and collapse rules.
// Purpose: Compute final Lead rankings with auditable manual tie resolution.
// Dependencies: crate::{core, interfaces}, serde_json
// ============================================================================

//! ## Overview
//! The single source of truth for Lead ranking across every host surface:
//! comparator (top beats non-top, then hold, then plus), manual podium
//! tiebreak workflow (previous rounds first, registered time second), and
//! the collapse rules that keep tiebreak effort constrained to the podium.
//! The engine is total: operator mistakes and resolver faults surface as
//! tie events and in-band error strings, never as panics or `Err`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::collections::BTreeSet;

use serde_json::Value;
use serde_json::json;

use crate::core::Athlete;
use crate::core::AthleteId;
use crate::core::LeadResult;
use crate::core::LineageKey;
use crate::core::RankingOptions;
use crate::core::RankingResult;
use crate::core::RankingRow;
use crate::core::TieBreakDecision;
use crate::core::TieChoice;
use crate::core::TieContext;
use crate::core::TieEvent;
use crate::core::TieFingerprint;
use crate::core::TieStage;
use crate::core::TieStatus;
use crate::core::hashing::LINEAGE_KEY_PREFIX;
use crate::core::hashing::TIE_FINGERPRINT_PREFIX;
use crate::core::hashing::prefixed_canonical_hash;
use crate::interfaces::TieBreakResolver;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// Computes the final Lead ranking with explicit tiebreak workflow support.
///
/// `athletes` is the ordered start list; athletes without a result in
/// `results` are skipped. The resolver supplies manual decisions (typically
/// from persisted box state keyed by fingerprint); passing `None` leaves
/// every podium tie pending.
#[must_use]
pub fn compute_lead_ranking(
    athletes: &[Athlete],
    results: &BTreeMap<AthleteId, LeadResult>,
    resolver: Option<&dyn TieBreakResolver>,
    options: &RankingOptions,
) -> RankingResult {
    let podium_places = options.podium_places.max(1);
    let mut items: Vec<ResolvedItem> = athletes
        .iter()
        .filter_map(|athlete| {
            results.get(&athlete.id).map(|result| ResolvedItem {
                athlete: athlete.clone(),
                result: *result,
                tb_prev: false,
                tb_time: false,
            })
        })
        .collect();

    // Base ordering: Lead performance comparator, stable name/id fallback.
    items.sort_by(|a, b| {
        perf_key(&b.result)
            .cmp(&perf_key(&a.result))
            .then_with(|| stable_key(a).cmp(&stable_key(b)))
    });

    let mut pass = RankingPass {
        round_name: options.round_name.clone(),
        podium_places,
        resolver,
        tie_events: Vec::new(),
        errors: Vec::new(),
    };

    // Walk maximal runs of identical performance and resolve each run.
    let mut final_chunks: Vec<TieChunk> = Vec::new();
    let mut cursor = 0;
    while cursor < items.len() {
        let key = perf_key(&items[cursor].result);
        let mut end = cursor + 1;
        while end < items.len() && perf_key(&items[end].result) == key {
            end += 1;
        }
        let group: Vec<ResolvedItem> = items[cursor .. end].to_vec();
        let rank_start =
            len_u32(final_chunks.iter().map(|chunk| chunk.items.len()).sum::<usize>()) + 1;
        if group.len() <= 1 {
            final_chunks.push(TieChunk {
                items: group,
            });
        } else {
            let (chunks, _) = pass.resolve_group(group, rank_start);
            final_chunks.extend(chunks);
        }
        cursor = end;
    }

    // Assign shared ranks per chunk.
    let mut rows: Vec<RankingRow> = Vec::new();
    let mut position: u32 = 1;
    let mut has_pending_podium = false;
    for chunk in &final_chunks {
        let rank = position;
        let mut ordered = chunk.items.clone();
        ordered.sort_by(|a, b| stable_key(a).cmp(&stable_key(b)));
        for item in &ordered {
            rows.push(to_ranking_row(item, rank));
        }
        if chunk.items.len() > 1 && rank <= podium_places {
            has_pending_podium = true;
        }
        position += len_u32(chunk.items.len());
    }
    rows.sort_by(row_order);

    collapse_below_podium(&mut rows, podium_places);

    // Pending or error podium events also mark the ranking unresolved.
    if pass
        .tie_events
        .iter()
        .any(|event| event.affects_podium && event.status != TieStatus::Resolved)
    {
        has_pending_podium = true;
    }

    RankingResult {
        rows,
        tie_events: pass.tie_events,
        is_resolved: !has_pending_podium,
        has_pending_podium_ties: has_pending_podium,
        errors: pass.errors,
    }
}

// ============================================================================
// SECTION: Working State
// ============================================================================

/// One athlete joined with their result during a ranking pass.
#[derive(Debug, Clone)]
struct ResolvedItem {
    /// The athlete.
    athlete: Athlete,
    /// Their Lead result.
    result: LeadResult,
    /// Previous-rounds tiebreak badge.
    tb_prev: bool,
    /// Time tiebreak badge.
    tb_time: bool,
}

/// A run of athletes sharing one final rank.
#[derive(Debug, Clone)]
struct TieChunk {
    /// Chunk members; all receive the chunk's starting rank.
    items: Vec<ResolvedItem>,
}

/// Mutable state threaded through one ranking computation.
struct RankingPass<'a> {
    /// Round name folded into fingerprints and contexts.
    round_name: String,
    /// Podium threshold.
    podium_places: u32,
    /// Manual decision source.
    resolver: Option<&'a dyn TieBreakResolver>,
    /// Audit trail accumulated during the pass.
    tie_events: Vec<TieEvent>,
    /// In-band error strings accumulated during the pass.
    errors: Vec<String>,
}

impl RankingPass<'_> {
    /// Resolves one performance-tied group starting at `rank_start`.
    ///
    /// Returns the chunks replacing the group plus whether the group is
    /// fully resolved.
    fn resolve_group(&mut self, members: Vec<ResolvedItem>, rank_start: u32) -> (Vec<TieChunk>, bool) {
        let affects_podium = rank_start <= self.podium_places;
        if !affects_podium {
            // Outside the podium ties stay shared by default.
            return (
                vec![TieChunk {
                    items: members,
                }],
                true,
            );
        }
        let Some(first) = members.first() else {
            return (Vec::new(), true);
        };
        let performance = first.result;
        let rank_end = rank_start + len_u32(members.len()) - 1;
        let fingerprint = build_tie_fingerprint(
            &self.round_name,
            TieStage::PreviousRounds,
            rank_start,
            rank_end,
            affects_podium,
            &members,
        );
        let lineage_key = build_lineage_key(&self.round_name, &performance);
        let context = TieContext {
            round_name: self.round_name.clone(),
            stage: TieStage::PreviousRounds,
            rank_start,
            rank_end,
            affects_podium,
            fingerprint: fingerprint.clone(),
            athletes: members.iter().map(|item| item.athlete.clone()).collect(),
            performance,
            lineage_key: Some(lineage_key.clone()),
        };
        let decision = self.resolve_with_fallback(&members, &context);

        match decision.choice {
            TieChoice::Pending => {
                self.tie_events.push(TieEvent {
                    fingerprint,
                    stage: TieStage::PreviousRounds,
                    rank_start,
                    rank_end,
                    affects_podium,
                    members: event_rows(&members, rank_start),
                    status: TieStatus::Pending,
                    detail: Some("previous_rounds_pending".to_string()),
                    lineage_key: Some(lineage_key),
                    known_prev_ranks_by_athlete: Some(BTreeMap::new()),
                    missing_prev_rounds_athlete_ids: Some(sorted_ids(&members)),
                    requires_prev_rounds_input: true,
                });
                (
                    vec![TieChunk {
                        items: members,
                    }],
                    false,
                )
            }
            TieChoice::No => self.resolve_time_stage(members, rank_start),
            TieChoice::Yes => self.split_by_previous_rounds(
                members,
                rank_start,
                rank_end,
                fingerprint,
                lineage_key,
                decision.previous_ranks_by_athlete,
            ),
        }
    }

    /// Splits a podium group by validated previous-round ranks, recursing
    /// any intra-rank ties into the time stage.
    fn split_by_previous_rounds(
        &mut self,
        members: Vec<ResolvedItem>,
        rank_start: u32,
        rank_end: u32,
        fingerprint: TieFingerprint,
        lineage_key: LineageKey,
        ranks: Option<BTreeMap<AthleteId, u32>>,
    ) -> (Vec<TieChunk>, bool) {
        if let Err(reason) = validate_previous_ranks(&members, ranks.as_ref()) {
            self.errors.push(format!("invalid_previous_rounds_decision:{fingerprint}:{reason}"));
            self.tie_events.push(TieEvent {
                fingerprint,
                stage: TieStage::PreviousRounds,
                rank_start,
                rank_end,
                affects_podium: true,
                members: event_rows(&members, rank_start),
                status: TieStatus::Error,
                detail: Some(reason),
                lineage_key: Some(lineage_key),
                known_prev_ranks_by_athlete: Some(BTreeMap::new()),
                missing_prev_rounds_athlete_ids: Some(sorted_ids(&members)),
                requires_prev_rounds_input: true,
            });
            return (
                vec![TieChunk {
                    items: members,
                }],
                false,
            );
        }
        let ranks = ranks.unwrap_or_default();

        let member_snapshot = members.clone();
        let mut known: Vec<ResolvedItem> = Vec::new();
        let mut missing: Vec<ResolvedItem> = Vec::new();
        for item in members {
            if ranks.contains_key(&item.athlete.id) {
                known.push(item);
            } else {
                missing.push(item);
            }
        }
        if known.is_empty() {
            self.tie_events.push(TieEvent {
                fingerprint,
                stage: TieStage::PreviousRounds,
                rank_start,
                rank_end,
                affects_podium: true,
                members: event_rows(&member_snapshot, rank_start),
                status: TieStatus::Pending,
                detail: Some("previous_rounds_missing_members".to_string()),
                lineage_key: Some(lineage_key),
                known_prev_ranks_by_athlete: Some(BTreeMap::new()),
                missing_prev_rounds_athlete_ids: Some(sorted_ids(&missing)),
                requires_prev_rounds_input: true,
            });
            return (
                vec![TieChunk {
                    items: missing,
                }],
                false,
            );
        }

        let known_ranks: BTreeMap<AthleteId, u32> = known
            .iter()
            .filter_map(|item| {
                ranks.get(&item.athlete.id).map(|rank| (item.athlete.id.clone(), *rank))
            })
            .collect();

        let partitions = partition_by_prev_ranks(known, &ranks);
        let mut chunks: Vec<TieChunk> = Vec::new();
        let mut all_resolved = true;
        let mut consumed: u32 = 0;
        for (part_idx, mut part) in partitions.into_iter().enumerate() {
            let part_rank_start = rank_start + consumed;
            consumed += len_u32(part.len());
            if part.len() == 1 {
                // Only the best previous-ranked athlete in the group wears
                // the TB-prev badge.
                if part_idx == 0 {
                    part[0].tb_prev = true;
                }
                chunks.push(TieChunk {
                    items: part,
                });
                continue;
            }
            let (time_chunks, resolved) = self.resolve_time_stage(part, part_rank_start);
            chunks.extend(time_chunks);
            all_resolved = all_resolved && resolved;
        }

        if !missing.is_empty() {
            missing.sort_by(|a, b| stable_key(a).cmp(&stable_key(b)));
            self.tie_events.push(TieEvent {
                fingerprint,
                stage: TieStage::PreviousRounds,
                rank_start,
                rank_end,
                affects_podium: true,
                members: event_rows(&member_snapshot, rank_start),
                status: TieStatus::Pending,
                detail: Some("previous_rounds_missing_members".to_string()),
                lineage_key: Some(lineage_key),
                known_prev_ranks_by_athlete: Some(known_ranks),
                missing_prev_rounds_athlete_ids: Some(sorted_ids(&missing)),
                requires_prev_rounds_input: true,
            });
            chunks.push(TieChunk {
                items: missing,
            });
            return (chunks, false);
        }
        (chunks, all_resolved)
    }

    /// Resolves one tied group (or sub-group) by registered time.
    fn resolve_time_stage(
        &mut self,
        members: Vec<ResolvedItem>,
        rank_start: u32,
    ) -> (Vec<TieChunk>, bool) {
        let Some(first) = members.first() else {
            return (Vec::new(), true);
        };
        let performance = first.result;
        let affects_podium = rank_start <= self.podium_places;
        let rank_end = rank_start + len_u32(members.len()) - 1;
        let fingerprint = build_tie_fingerprint(
            &self.round_name,
            TieStage::Time,
            rank_start,
            rank_end,
            affects_podium,
            &members,
        );
        let context = TieContext {
            round_name: self.round_name.clone(),
            stage: TieStage::Time,
            rank_start,
            rank_end,
            affects_podium,
            fingerprint: fingerprint.clone(),
            athletes: members.iter().map(|item| item.athlete.clone()).collect(),
            performance,
            lineage_key: None,
        };
        let decision = self.resolve_with_fallback(&members, &context);

        match decision.choice {
            TieChoice::Pending => {
                self.tie_events.push(TieEvent {
                    fingerprint,
                    stage: TieStage::Time,
                    rank_start,
                    rank_end,
                    affects_podium,
                    members: event_rows(&members, rank_start),
                    status: TieStatus::Pending,
                    detail: Some("time_tiebreak_pending".to_string()),
                    lineage_key: None,
                    known_prev_ranks_by_athlete: None,
                    missing_prev_rounds_athlete_ids: None,
                    requires_prev_rounds_input: false,
                });
                (
                    vec![TieChunk {
                        items: members,
                    }],
                    !affects_podium,
                )
            }
            TieChoice::No => {
                if affects_podium {
                    self.errors
                        .push(format!("podium_time_tiebreak_keep_tied_not_allowed:{fingerprint}"));
                    self.tie_events.push(TieEvent {
                        fingerprint,
                        stage: TieStage::Time,
                        rank_start,
                        rank_end,
                        affects_podium: true,
                        members: event_rows(&members, rank_start),
                        status: TieStatus::Error,
                        detail: Some("podium_keep_tied_not_allowed".to_string()),
                        lineage_key: None,
                        known_prev_ranks_by_athlete: None,
                        missing_prev_rounds_athlete_ids: None,
                        requires_prev_rounds_input: false,
                    });
                    return (
                        vec![TieChunk {
                            items: members,
                        }],
                        false,
                    );
                }
                (
                    vec![TieChunk {
                        items: members,
                    }],
                    true,
                )
            }
            TieChoice::Yes => self.split_by_time(members, rank_start, rank_end, fingerprint),
        }
    }

    /// Splits a group by registered time after a `yes` decision.
    fn split_by_time(
        &mut self,
        mut members: Vec<ResolvedItem>,
        rank_start: u32,
        rank_end: u32,
        fingerprint: TieFingerprint,
    ) -> (Vec<TieChunk>, bool) {
        let affects_podium = rank_start <= self.podium_places;
        let missing: Vec<AthleteId> = members
            .iter()
            .filter(|item| !item.result.time_seconds.is_some_and(f64::is_finite))
            .map(|item| item.athlete.id.clone())
            .collect();
        if !missing.is_empty() {
            self.errors.push(format!("time_tiebreak_missing_times:{fingerprint}"));
            self.tie_events.push(TieEvent {
                fingerprint,
                stage: TieStage::Time,
                rank_start,
                rank_end,
                affects_podium,
                members: event_rows(&members, rank_start),
                status: TieStatus::Error,
                detail: Some("missing_time_seconds".to_string()),
                lineage_key: None,
                known_prev_ranks_by_athlete: None,
                missing_prev_rounds_athlete_ids: None,
                requires_prev_rounds_input: false,
            });
            return (
                vec![TieChunk {
                    items: members,
                }],
                !affects_podium,
            );
        }

        // Everyone routed through the time stage wears the TB-time badge,
        // whether or not the stage actually split them.
        for item in &mut members {
            item.tb_time = true;
        }
        let event_snapshot = members.clone();
        let partitions = partition_by_time(members);
        let has_unresolved = partitions.iter().any(|part| part.len() > 1);
        if has_unresolved && affects_podium {
            self.tie_events.push(TieEvent {
                fingerprint,
                stage: TieStage::Time,
                rank_start,
                rank_end,
                affects_podium: true,
                members: event_rows(&event_snapshot, rank_start),
                status: TieStatus::Error,
                detail: Some("identical_time_keeps_podium_tie".to_string()),
                lineage_key: None,
                known_prev_ranks_by_athlete: None,
                missing_prev_rounds_athlete_ids: None,
                requires_prev_rounds_input: false,
            });
        }
        let chunks = partitions
            .into_iter()
            .map(|items| TieChunk {
                items,
            })
            .collect();
        (chunks, !(has_unresolved && affects_podium))
    }

    /// Queries the resolver, absorbing faults and absent decisions into
    /// the pending default.
    fn resolve_with_fallback(
        &self,
        group: &[ResolvedItem],
        context: &TieContext,
    ) -> TieBreakDecision {
        let Some(resolver) = self.resolver else {
            return TieBreakDecision::pending();
        };
        let athletes: Vec<Athlete> = group.iter().map(|item| item.athlete.clone()).collect();
        match resolver.resolve(&athletes, context) {
            Ok(Some(decision)) => decision,
            Ok(None) | Err(_) => TieBreakDecision::pending(),
        }
    }
}

// ============================================================================
// SECTION: Comparator
// ============================================================================

/// Lead performance key: higher compares greater.
///
/// A plus only counts when the route was not topped; a top already
/// dominates any plus.
const fn perf_key(result: &LeadResult) -> (bool, u32, bool) {
    (result.topped, result.hold, result.plus && !result.topped)
}

/// Deterministic within-performance athlete order: lowercase name, then id.
fn stable_key(item: &ResolvedItem) -> (String, String) {
    (item.athlete.name.to_lowercase(), item.athlete.id.to_string())
}

/// Final row order: rank, then lowercase name, then id.
fn row_order(a: &RankingRow, b: &RankingRow) -> Ordering {
    a.rank
        .cmp(&b.rank)
        .then_with(|| a.athlete_name.to_lowercase().cmp(&b.athlete_name.to_lowercase()))
        .then_with(|| a.athlete_id.cmp(&b.athlete_id))
}

// ============================================================================
// SECTION: Partitioning
// ============================================================================

/// Partitions members by previous-round rank ascending, keeping a stable
/// member order inside each rank.
fn partition_by_prev_ranks(
    members: Vec<ResolvedItem>,
    ranks: &BTreeMap<AthleteId, u32>,
) -> Vec<Vec<ResolvedItem>> {
    let mut grouped: BTreeMap<u32, Vec<ResolvedItem>> = BTreeMap::new();
    for item in members {
        let rank = ranks.get(&item.athlete.id).copied().unwrap_or(u32::MAX);
        grouped.entry(rank).or_default().push(item);
    }
    grouped
        .into_values()
        .map(|mut part| {
            part.sort_by(|a, b| stable_key(a).cmp(&stable_key(b)));
            part
        })
        .collect()
}

/// Partitions members into runs of identical registered time, ascending.
fn partition_by_time(members: Vec<ResolvedItem>) -> Vec<Vec<ResolvedItem>> {
    let mut ordered = members;
    ordered.sort_by(|a, b| {
        time_or_inf(a)
            .partial_cmp(&time_or_inf(b))
            .unwrap_or(Ordering::Equal)
            .then_with(|| stable_key(a).cmp(&stable_key(b)))
    });
    let mut partitions: Vec<Vec<ResolvedItem>> = Vec::new();
    for item in ordered {
        match partitions.last_mut() {
            Some(current)
                if current
                    .first()
                    .is_some_and(|head| head.result.time_seconds == item.result.time_seconds) =>
            {
                current.push(item);
            }
            _ => partitions.push(vec![item]),
        }
    }
    partitions
}

/// Sort key for the time stage; missing times sink to the end.
fn time_or_inf(item: &ResolvedItem) -> f64 {
    item.result.time_seconds.unwrap_or(f64::INFINITY)
}

// ============================================================================
// SECTION: Validation
// ============================================================================

/// Validates an operator-supplied previous-rounds rank map.
fn validate_previous_ranks(
    members: &[ResolvedItem],
    ranks: Option<&BTreeMap<AthleteId, u32>>,
) -> Result<(), String> {
    let Some(ranks) = ranks.filter(|ranks| !ranks.is_empty()) else {
        return Err("missing_previous_rounds_ranks".to_string());
    };
    let expected: BTreeSet<&AthleteId> = members.iter().map(|item| &item.athlete.id).collect();
    for (athlete_id, rank) in ranks {
        if !expected.contains(athlete_id) {
            return Err(format!("invalid_previous_rounds_rank_member:{athlete_id}"));
        }
        if *rank == 0 {
            return Err(format!("invalid_previous_rounds_rank:{athlete_id}"));
        }
    }
    Ok(())
}

// ============================================================================
// SECTION: Fingerprints
// ============================================================================

/// Builds the deterministic fingerprint for one tie group and stage.
///
/// The canonical payload sorts members by `(lowercase name, id)` so roster
/// permutations never change the digest. Non-finite member times hash as
/// null, which also keeps canonicalization infallible.
fn build_tie_fingerprint(
    round_name: &str,
    stage: TieStage,
    rank_start: u32,
    rank_end: u32,
    affects_podium: bool,
    members: &[ResolvedItem],
) -> TieFingerprint {
    let mut sorted: Vec<&ResolvedItem> = members.iter().collect();
    sorted.sort_by(|a, b| stable_key(a).cmp(&stable_key(b)));
    let member_values: Vec<Value> = sorted
        .iter()
        .map(|item| {
            json!({
                "id": item.athlete.id.as_str(),
                "name": item.athlete.name,
                "topped": item.result.topped,
                "hold": item.result.hold,
                "plus": item.result.plus,
                "time": item.result.time_seconds.filter(|time| time.is_finite()),
            })
        })
        .collect();
    let payload = json!({
        "round": round_name,
        "stage": stage_label(stage),
        "rank_start": rank_start,
        "rank_end": rank_end,
        "affects_podium": affects_podium,
        "members": member_values,
    });
    TieFingerprint::new(
        prefixed_canonical_hash(TIE_FINGERPRINT_PREFIX, &payload)
            .unwrap_or_else(|_| format!("{TIE_FINGERPRINT_PREFIX}unhashable")),
    )
}

/// Builds the lineage key for one round and raw performance.
fn build_lineage_key(round_name: &str, result: &LeadResult) -> LineageKey {
    let payload = json!({
        "round": round_name,
        "context": "overall",
        "performance": {
            "topped": result.topped,
            "hold": result.hold,
            "plus": result.plus && !result.topped,
        },
    });
    LineageKey::new(
        prefixed_canonical_hash(LINEAGE_KEY_PREFIX, &payload)
            .unwrap_or_else(|_| format!("{LINEAGE_KEY_PREFIX}unhashable")),
    )
}

/// Wire label for a tie stage.
const fn stage_label(stage: TieStage) -> &'static str {
    match stage {
        TieStage::PreviousRounds => "previous_rounds",
        TieStage::Time => "time",
    }
}

// ============================================================================
// SECTION: Row Construction
// ============================================================================

/// Renders one working item as a ranking row at the given rank.
fn to_ranking_row(item: &ResolvedItem, rank: u32) -> RankingRow {
    RankingRow {
        athlete_id: item.athlete.id.clone(),
        athlete_name: item.athlete.name.clone(),
        rank,
        topped: item.result.topped,
        hold: item.result.hold,
        plus: item.result.plus,
        time_seconds: item.result.time_seconds,
        tb_prev: item.tb_prev,
        tb_time: item.tb_time,
        score_hint: item.result.score_hint(),
    }
}

/// Snapshot rows for a tie event, all at the group's shared rank.
fn event_rows(members: &[ResolvedItem], rank_start: u32) -> Vec<RankingRow> {
    members.iter().map(|item| to_ranking_row(item, rank_start)).collect()
}

/// Member athlete ids sorted ascending, for stable event reporting.
fn sorted_ids(members: &[ResolvedItem]) -> Vec<AthleteId> {
    let mut ids: Vec<AthleteId> = members.iter().map(|item| item.athlete.id.clone()).collect();
    ids.sort();
    ids
}

// ============================================================================
// SECTION: Podium Boundary Collapse
// ============================================================================

/// Collapses split ranks back to shared ranks beyond the podium.
///
/// A performance group wholly below the podium shares its minimum rank; a
/// group straddling the boundary keeps its podium part split and collapses
/// only the tail.
fn collapse_below_podium(rows: &mut [RankingRow], podium_places: u32) {
    let mut by_perf: Vec<RankingRow> = rows.to_vec();
    by_perf.sort_by(|a, b| {
        row_perf_key(b)
            .cmp(&row_perf_key(a))
            .then_with(|| a.athlete_name.to_lowercase().cmp(&b.athlete_name.to_lowercase()))
            .then_with(|| a.athlete_id.cmp(&b.athlete_id))
    });

    let mut collapsed: BTreeMap<AthleteId, u32> = BTreeMap::new();
    let mut cursor = 0;
    while cursor < by_perf.len() {
        let key = row_perf_key(&by_perf[cursor]);
        let mut end = cursor + 1;
        while end < by_perf.len() && row_perf_key(&by_perf[end]) == key {
            end += 1;
        }
        let group = &by_perf[cursor .. end];
        if group.len() > 1 {
            let min_rank = group.iter().map(|row| row.rank).min().unwrap_or(0);
            let max_rank = group.iter().map(|row| row.rank).max().unwrap_or(0);
            if min_rank > podium_places {
                for row in group {
                    collapsed.insert(row.athlete_id.clone(), min_rank);
                }
            } else if max_rank > podium_places {
                let tail: Vec<&RankingRow> =
                    group.iter().filter(|row| row.rank > podium_places).collect();
                if let Some(shared) = tail.iter().map(|row| row.rank).min() {
                    for row in tail {
                        collapsed.insert(row.athlete_id.clone(), shared);
                    }
                }
            }
        }
        cursor = end;
    }

    if !collapsed.is_empty() {
        for row in rows.iter_mut() {
            if let Some(rank) = collapsed.get(&row.athlete_id) {
                row.rank = *rank;
            }
        }
        rows.sort_by(row_order);
    }
}

/// Performance key for a finished row.
const fn row_perf_key(row: &RankingRow) -> (bool, u32, bool) {
    (row.topped, row.hold, row.plus && !row.topped)
}

// ============================================================================
// SECTION: Numeric Helpers
// ============================================================================

/// Saturating `usize` to `u32` conversion for rank arithmetic.
fn len_u32(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}
