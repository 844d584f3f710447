// crates/onsight-core/tests/ranking.rs
// ============================================================================
// Module: Lead Ranking Engine Tests
// Description: Comparator, podium tiebreak workflow, and collapse coverage.
// ============================================================================
//! ## Overview
//! Exercises the ranking engine with table-driven resolvers: clean
//! rankings, previous-rounds splits, time splits, partial operator input,
//! error reporting, below-podium collapse, and fingerprint determinism
//! (including golden SHA-1 values pinning the canonical-JSON contract).

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    clippy::float_cmp,
    clippy::missing_docs_in_private_items,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::collections::BTreeMap;
use std::collections::HashMap;

use onsight_core::Athlete;
use onsight_core::AthleteId;
use onsight_core::LeadResult;
use onsight_core::RankingOptions;
use onsight_core::RankingResult;
use onsight_core::RankingRow;
use onsight_core::ResolverError;
use onsight_core::TieBreakDecision;
use onsight_core::TieBreakResolver;
use onsight_core::TieContext;
use onsight_core::TieStage;
use onsight_core::TieStatus;
use onsight_core::compute_lead_ranking;

fn athlete(id: &str, name: &str) -> Athlete {
    Athlete::new(id, name)
}

fn result(topped: bool, hold: u32, plus: bool, time_seconds: Option<f64>) -> LeadResult {
    LeadResult {
        topped,
        hold,
        plus,
        time_seconds,
    }
}

fn results(entries: &[(&str, LeadResult)]) -> BTreeMap<AthleteId, LeadResult> {
    entries.iter().map(|(id, result)| (AthleteId::new(*id), *result)).collect()
}

fn ranks(entries: &[(&str, u32)]) -> BTreeMap<AthleteId, u32> {
    entries.iter().map(|(id, rank)| (AthleteId::new(*id), *rank)).collect()
}

fn rows_by_id(out: &RankingResult) -> HashMap<String, RankingRow> {
    out.rows.iter().map(|row| (row.athlete_id.to_string(), row.clone())).collect()
}

/// Table-driven resolver keyed by stage, sorted member ids, and rank start.
struct MapResolver {
    decisions: Vec<(TieStage, Vec<&'static str>, u32, TieBreakDecision)>,
}

impl TieBreakResolver for MapResolver {
    fn resolve(
        &self,
        group: &[Athlete],
        context: &TieContext,
    ) -> Result<Option<TieBreakDecision>, ResolverError> {
        let mut ids: Vec<String> = group.iter().map(|athlete| athlete.id.to_string()).collect();
        ids.sort();
        Ok(self
            .decisions
            .iter()
            .find(|(stage, key, rank_start, _)| {
                *stage == context.stage
                    && *rank_start == context.rank_start
                    && key.len() == ids.len()
                    && key.iter().zip(&ids).all(|(a, b)| a == b)
            })
            .map(|(_, _, _, decision)| decision.clone()))
    }
}

/// Resolver that splits every tie: previous rounds by group order, time by
/// registered times.
struct AlwaysSplitResolver;

impl TieBreakResolver for AlwaysSplitResolver {
    fn resolve(
        &self,
        group: &[Athlete],
        context: &TieContext,
    ) -> Result<Option<TieBreakDecision>, ResolverError> {
        if context.stage == TieStage::PreviousRounds {
            let ranks: BTreeMap<AthleteId, u32> = group
                .iter()
                .enumerate()
                .map(|(idx, athlete)| {
                    (athlete.id.clone(), u32::try_from(idx).unwrap_or(u32::MAX) + 1)
                })
                .collect();
            return Ok(Some(TieBreakDecision::split_by_previous_ranks(ranks)));
        }
        Ok(Some(TieBreakDecision::split()))
    }
}

/// Resolver whose backend always fails.
struct FailingResolver;

impl TieBreakResolver for FailingResolver {
    fn resolve(
        &self,
        _group: &[Athlete],
        _context: &TieContext,
    ) -> Result<Option<TieBreakDecision>, ResolverError> {
        Err(ResolverError::Backend("decision store offline".to_string()))
    }
}

#[test]
fn ranking_without_ties_is_clean() {
    let athletes = [athlete("A", "Ana"), athlete("B", "Bob"), athlete("C", "Cara")];
    let results = results(&[
        ("A", result(true, 40, false, Some(90.0))),
        ("B", result(false, 39, true, Some(100.0))),
        ("C", result(false, 39, false, Some(80.0))),
    ]);
    let out = compute_lead_ranking(&athletes, &results, None, &RankingOptions::default());
    assert!(out.is_resolved);
    assert!(out.tie_events.is_empty());
    let ids: Vec<String> = out.rows.iter().map(|row| row.athlete_id.to_string()).collect();
    assert_eq!(ids, ["A", "B", "C"]);
    let ranks: Vec<u32> = out.rows.iter().map(|row| row.rank).collect();
    assert_eq!(ranks, [1, 2, 3]);
}

#[test]
fn plus_is_ignored_when_topped() {
    let athletes = [athlete("A", "Ana"), athlete("B", "Bob")];
    let results = results(&[
        ("A", result(true, 40, false, None)),
        ("B", result(true, 40, true, None)),
    ]);
    let out = compute_lead_ranking(&athletes, &results, None, &RankingOptions::default());
    // Identical performances: the plus on a top must not split them.
    assert_eq!(out.rows[0].rank, out.rows[1].rank);
}

#[test]
fn score_hint_matches_display_convention() {
    assert_eq!(result(true, 40, true, None).score_hint(), 40.0);
    assert_eq!(result(false, 39, true, None).score_hint(), 39.1);
    assert_eq!(result(false, 39, false, None).score_hint(), 39.0);
}

#[test]
fn tie_outside_podium_stays_shared() {
    let athletes = [
        athlete("A", "Ana"),
        athlete("B", "Bob"),
        athlete("C", "Cara"),
        athlete("D", "Dan"),
        athlete("E", "Ema"),
    ];
    let results = results(&[
        ("A", result(true, 40, false, Some(100.0))),
        ("B", result(false, 39, true, Some(101.0))),
        ("C", result(false, 38, true, Some(102.0))),
        ("D", result(false, 30, false, Some(103.0))),
        ("E", result(false, 30, false, Some(104.0))),
    ]);
    let out = compute_lead_ranking(&athletes, &results, None, &RankingOptions::default());
    let by_id = rows_by_id(&out);
    assert!(out.is_resolved);
    assert_eq!(by_id["D"].rank, 4);
    assert_eq!(by_id["E"].rank, 4);
    assert!(out.tie_events.is_empty());
}

#[test]
fn two_way_podium_tie_resolved_by_previous_rounds() {
    let athletes = [athlete("A", "Ana"), athlete("B", "Bob")];
    let results = results(&[
        ("A", result(false, 30, false, Some(140.0))),
        ("B", result(false, 30, false, Some(100.0))),
    ]);
    let resolver = MapResolver {
        decisions: vec![(
            TieStage::PreviousRounds,
            vec!["A", "B"],
            1,
            TieBreakDecision::split_by_previous_ranks(ranks(&[("A", 1), ("B", 2)])),
        )],
    };
    let out =
        compute_lead_ranking(&athletes, &results, Some(&resolver), &RankingOptions::default());
    let by_id = rows_by_id(&out);
    assert!(out.is_resolved);
    assert_eq!(by_id["A"].rank, 1);
    assert_eq!(by_id["B"].rank, 2);
    assert!(by_id["A"].tb_prev);
    assert!(!by_id["B"].tb_prev);
}

#[test]
fn three_way_podium_tie_resolved_by_full_previous_rounds_order() {
    let athletes = [athlete("A", "Ana"), athlete("B", "Bob"), athlete("C", "Cara")];
    let results = results(&[
        ("A", result(false, 30, false, Some(130.0))),
        ("B", result(false, 30, false, Some(120.0))),
        ("C", result(false, 30, false, Some(110.0))),
    ]);
    let resolver = MapResolver {
        decisions: vec![(
            TieStage::PreviousRounds,
            vec!["A", "B", "C"],
            1,
            TieBreakDecision::split_by_previous_ranks(ranks(&[("C", 1), ("A", 2), ("B", 3)])),
        )],
    };
    let out =
        compute_lead_ranking(&athletes, &results, Some(&resolver), &RankingOptions::default());
    let ids: Vec<String> = out.rows.iter().map(|row| row.athlete_id.to_string()).collect();
    assert_eq!(ids, ["C", "A", "B"]);
    let row_ranks: Vec<u32> = out.rows.iter().map(|row| row.rank).collect();
    assert_eq!(row_ranks, [1, 2, 3]);
}

#[test]
fn partial_previous_rounds_then_time_for_remaining_subgroup() {
    let athletes = [athlete("A", "Ana"), athlete("B", "Bob"), athlete("C", "Cara")];
    let results = results(&[
        ("A", result(false, 30, false, Some(105.0))),
        ("B", result(false, 30, false, Some(130.0))),
        ("C", result(false, 30, false, Some(150.0))),
    ]);
    let resolver = MapResolver {
        decisions: vec![
            (
                TieStage::PreviousRounds,
                vec!["A", "B", "C"],
                1,
                TieBreakDecision::split_by_previous_ranks(ranks(&[
                    ("C", 1),
                    ("A", 2),
                    ("B", 2),
                ])),
            ),
            (TieStage::Time, vec!["A", "B"], 2, TieBreakDecision::split()),
        ],
    };
    let out =
        compute_lead_ranking(&athletes, &results, Some(&resolver), &RankingOptions::default());
    let by_id = rows_by_id(&out);
    assert!(out.is_resolved);
    let ids: Vec<String> = out.rows.iter().map(|row| row.athlete_id.to_string()).collect();
    assert_eq!(ids, ["C", "A", "B"]);
    assert!(by_id["C"].tb_prev);
    assert!(by_id["A"].tb_time);
    assert!(by_id["B"].tb_time);
}

#[test]
fn partial_previous_rounds_input_reports_missing_athlete() {
    let athletes = [athlete("A", "Ana"), athlete("B", "Bob"), athlete("C", "Cara")];
    let results = results(&[
        ("A", result(false, 30, false, Some(105.0))),
        ("B", result(false, 30, false, Some(130.0))),
        ("C", result(false, 30, false, Some(140.0))),
    ]);
    let resolver = MapResolver {
        decisions: vec![(
            TieStage::PreviousRounds,
            vec!["A", "B", "C"],
            1,
            TieBreakDecision::split_by_previous_ranks(ranks(&[("A", 1), ("B", 2)])),
        )],
    };
    let out =
        compute_lead_ranking(&athletes, &results, Some(&resolver), &RankingOptions::default());
    let by_id = rows_by_id(&out);
    assert_eq!(by_id["A"].rank, 1);
    assert_eq!(by_id["B"].rank, 2);
    assert_eq!(by_id["C"].rank, 3);
    assert!(!out.is_resolved);
    assert!(out.has_pending_podium_ties);

    let pending: Vec<_> = out
        .tie_events
        .iter()
        .filter(|event| {
            event.stage == TieStage::PreviousRounds && event.status == TieStatus::Pending
        })
        .collect();
    assert!(!pending.is_empty());
    let event = pending[0];
    assert!(event.requires_prev_rounds_input);
    assert_eq!(
        event.known_prev_ranks_by_athlete.as_ref(),
        Some(&ranks(&[("A", 1), ("B", 2)]))
    );
    assert_eq!(
        event.missing_prev_rounds_athlete_ids.as_deref(),
        Some(&[AthleteId::new("C")][..])
    );
}

#[test]
fn inconsistent_partial_input_stays_pending_without_errors() {
    let athletes = [athlete("A", "Ana"), athlete("B", "Bob")];
    let results = results(&[
        ("A", result(false, 30, false, Some(90.0))),
        ("B", result(false, 30, false, Some(100.0))),
    ]);
    let resolver = MapResolver {
        decisions: vec![(
            TieStage::PreviousRounds,
            vec!["A", "B"],
            1,
            TieBreakDecision::split_by_previous_ranks(ranks(&[("A", 1)])),
        )],
    };
    let out =
        compute_lead_ranking(&athletes, &results, Some(&resolver), &RankingOptions::default());
    assert!(!out.is_resolved);
    assert!(out.errors.is_empty());
    assert_eq!(out.rows[0].rank, 1);
    assert_eq!(out.rows[1].rank, 2);
    let pending: Vec<_> =
        out.tie_events.iter().filter(|event| event.status == TieStatus::Pending).collect();
    assert_eq!(
        pending[0].missing_prev_rounds_athlete_ids.as_deref(),
        Some(&[AthleteId::new("B")][..])
    );
}

#[test]
fn invalid_previous_ranks_are_reported_as_errors() {
    let athletes = [athlete("A", "Ana"), athlete("B", "Bob")];
    let results = results(&[
        ("A", result(false, 30, false, Some(90.0))),
        ("B", result(false, 30, false, Some(100.0))),
    ]);
    // A rank for an athlete outside the group is operator error.
    let resolver = MapResolver {
        decisions: vec![(
            TieStage::PreviousRounds,
            vec!["A", "B"],
            1,
            TieBreakDecision::split_by_previous_ranks(ranks(&[("Z", 1)])),
        )],
    };
    let out =
        compute_lead_ranking(&athletes, &results, Some(&resolver), &RankingOptions::default());
    assert!(!out.is_resolved);
    assert_eq!(out.errors.len(), 1);
    assert!(out.errors[0].starts_with("invalid_previous_rounds_decision:tb3:"));
    let event = &out.tie_events[0];
    assert_eq!(event.status, TieStatus::Error);
    assert_eq!(event.detail.as_deref(), Some("invalid_previous_rounds_rank_member:Z"));
    // The group keeps its shared rank.
    assert_eq!(out.rows[0].rank, 1);
    assert_eq!(out.rows[1].rank, 1);
}

#[test]
fn time_stage_splits_by_registered_time() {
    let athletes = [athlete("A", "Ana"), athlete("B", "Bob")];
    let results = results(&[
        ("A", result(false, 30, false, Some(120.0))),
        ("B", result(false, 30, false, Some(100.0))),
    ]);
    let resolver = MapResolver {
        decisions: vec![
            (TieStage::PreviousRounds, vec!["A", "B"], 1, TieBreakDecision::keep()),
            (TieStage::Time, vec!["A", "B"], 1, TieBreakDecision::split()),
        ],
    };
    let out =
        compute_lead_ranking(&athletes, &results, Some(&resolver), &RankingOptions::default());
    let by_id = rows_by_id(&out);
    assert!(out.is_resolved);
    assert_eq!(by_id["B"].rank, 1, "faster time wins");
    assert_eq!(by_id["A"].rank, 2);
    assert!(by_id["A"].tb_time);
    assert!(by_id["B"].tb_time);
}

#[test]
fn podium_keep_tied_by_time_is_not_allowed() {
    let athletes = [athlete("A", "Ana"), athlete("B", "Bob")];
    let results = results(&[
        ("A", result(false, 30, false, Some(90.0))),
        ("B", result(false, 30, false, Some(100.0))),
    ]);
    let resolver = MapResolver {
        decisions: vec![
            (TieStage::PreviousRounds, vec!["A", "B"], 1, TieBreakDecision::keep()),
            (TieStage::Time, vec!["A", "B"], 1, TieBreakDecision::keep()),
        ],
    };
    let out =
        compute_lead_ranking(&athletes, &results, Some(&resolver), &RankingOptions::default());
    assert!(!out.is_resolved);
    assert!(out.errors[0].starts_with("podium_time_tiebreak_keep_tied_not_allowed:tb3:"));
    let event = out
        .tie_events
        .iter()
        .find(|event| event.status == TieStatus::Error)
        .expect("error event");
    assert_eq!(event.detail.as_deref(), Some("podium_keep_tied_not_allowed"));
    assert_eq!(out.rows[0].rank, 1);
    assert_eq!(out.rows[1].rank, 1);
}

#[test]
fn time_split_with_missing_times_is_an_error() {
    let athletes = [athlete("A", "Ana"), athlete("B", "Bob")];
    let results = results(&[
        ("A", result(false, 30, false, None)),
        ("B", result(false, 30, false, Some(100.0))),
    ]);
    let resolver = MapResolver {
        decisions: vec![
            (TieStage::PreviousRounds, vec!["A", "B"], 1, TieBreakDecision::keep()),
            (TieStage::Time, vec!["A", "B"], 1, TieBreakDecision::split()),
        ],
    };
    let out =
        compute_lead_ranking(&athletes, &results, Some(&resolver), &RankingOptions::default());
    assert!(!out.is_resolved);
    assert!(out.errors[0].starts_with("time_tiebreak_missing_times:tb3:"));
    let event = &out.tie_events[0];
    assert_eq!(event.status, TieStatus::Error);
    assert_eq!(event.detail.as_deref(), Some("missing_time_seconds"));
}

#[test]
fn identical_times_keep_the_podium_tie_as_an_error() {
    let athletes = [athlete("A", "Ana"), athlete("B", "Bob")];
    let results = results(&[
        ("A", result(false, 30, false, Some(100.0))),
        ("B", result(false, 30, false, Some(100.0))),
    ]);
    let resolver = MapResolver {
        decisions: vec![
            (TieStage::PreviousRounds, vec!["A", "B"], 1, TieBreakDecision::keep()),
            (TieStage::Time, vec!["A", "B"], 1, TieBreakDecision::split()),
        ],
    };
    let out =
        compute_lead_ranking(&athletes, &results, Some(&resolver), &RankingOptions::default());
    assert!(!out.is_resolved);
    let event = &out.tie_events[0];
    assert_eq!(event.detail.as_deref(), Some("identical_time_keeps_podium_tie"));
    assert_eq!(out.rows[0].rank, 1);
    assert_eq!(out.rows[1].rank, 1);
    assert!(out.rows.iter().all(|row| row.tb_time));
}

#[test]
fn previous_rounds_split_does_not_survive_below_podium() {
    let athletes = [
        athlete("X", "Xena"),
        athlete("A", "Ana"),
        athlete("B", "Bob"),
        athlete("C", "Cara"),
        athlete("D", "Dan"),
    ];
    let results = results(&[
        ("X", result(true, 40, false, Some(80.0))),
        ("A", result(false, 30, false, Some(100.0))),
        ("B", result(false, 30, false, Some(120.0))),
        ("C", result(false, 35, false, Some(90.0))),
        ("D", result(false, 34, false, Some(95.0))),
    ]);
    let out = compute_lead_ranking(
        &athletes,
        &results,
        Some(&AlwaysSplitResolver),
        &RankingOptions::default(),
    );
    let by_id = rows_by_id(&out);
    assert_eq!(by_id["A"].rank, 4);
    assert_eq!(by_id["B"].rank, 4);
}

#[test]
fn only_tail_below_podium_collapses_when_group_straddles_boundary() {
    let athletes = [
        athlete("A", "Ana"),
        athlete("B", "Bob"),
        athlete("C", "Cara"),
        athlete("D", "Dan"),
        athlete("E", "Ema"),
    ];
    let results = results(&[
        ("A", result(true, 40, false, Some(80.0))),
        ("B", result(true, 39, false, Some(81.0))),
        ("C", result(false, 30, false, Some(100.0))),
        ("D", result(false, 30, false, Some(110.0))),
        ("E", result(false, 30, false, Some(120.0))),
    ]);
    let resolver = MapResolver {
        decisions: vec![
            (
                TieStage::PreviousRounds,
                vec!["C", "D", "E"],
                3,
                TieBreakDecision::split_by_previous_ranks(ranks(&[
                    ("C", 1),
                    ("D", 2),
                    ("E", 3),
                ])),
            ),
        ],
    };
    let out =
        compute_lead_ranking(&athletes, &results, Some(&resolver), &RankingOptions::default());
    let by_id = rows_by_id(&out);
    assert_eq!(by_id["C"].rank, 3);
    assert_eq!(by_id["D"].rank, 4);
    assert_eq!(by_id["E"].rank, 4);
}

#[test]
fn resolver_faults_are_absorbed_as_pending() {
    let athletes = [athlete("A", "Ana"), athlete("B", "Bob")];
    let results = results(&[
        ("A", result(false, 30, false, Some(90.0))),
        ("B", result(false, 30, false, Some(100.0))),
    ]);
    let out = compute_lead_ranking(
        &athletes,
        &results,
        Some(&FailingResolver),
        &RankingOptions::default(),
    );
    assert!(!out.is_resolved);
    assert!(out.errors.is_empty());
    assert_eq!(out.tie_events[0].status, TieStatus::Pending);
    assert_eq!(out.tie_events[0].detail.as_deref(), Some("previous_rounds_pending"));
}

#[test]
fn athletes_without_results_are_skipped() {
    let athletes = [athlete("A", "Ana"), athlete("B", "Bob")];
    let results = results(&[("A", result(false, 20, false, None))]);
    let out = compute_lead_ranking(&athletes, &results, None, &RankingOptions::default());
    assert_eq!(out.rows.len(), 1);
    assert_eq!(out.rows[0].athlete_id, AthleteId::new("A"));
}

#[test]
fn fingerprint_matches_golden_sha1_for_previous_rounds_tie() {
    let athletes = [athlete("A", "Ana"), athlete("B", "Bob")];
    let results = results(&[
        ("A", result(false, 30, false, None)),
        ("B", result(false, 30, false, None)),
    ]);
    let out = compute_lead_ranking(&athletes, &results, None, &RankingOptions::default());
    let event = &out.tie_events[0];
    assert_eq!(
        event.fingerprint.as_str(),
        "tb3:c57c1cd8be0ac1d7fd70206f985f83d89e4e830c",
        "canonical-JSON SHA-1 contract must not drift"
    );
    assert_eq!(
        event.lineage_key.as_ref().map(|key| key.as_str().to_string()),
        Some("tb-lineage:53a83c23de8aa70dd1f61f8592b44113ac8e2050".to_string())
    );
}

#[test]
fn fingerprint_matches_golden_sha1_for_time_stage() {
    let athletes = [athlete("A", "Ana"), athlete("B", "Bob")];
    let results = results(&[
        ("A", result(false, 30, false, Some(100.0))),
        ("B", result(false, 30, false, Some(120.0))),
    ]);
    // Decline the previous-rounds stage so the tie reaches the time stage
    // with no decision recorded there.
    let resolver = MapResolver {
        decisions: vec![(TieStage::PreviousRounds, vec!["A", "B"], 1, TieBreakDecision::keep())],
    };
    let out =
        compute_lead_ranking(&athletes, &results, Some(&resolver), &RankingOptions::default());
    let event = out
        .tie_events
        .iter()
        .find(|event| event.stage == TieStage::Time)
        .expect("time-stage event");
    assert_eq!(event.fingerprint.as_str(), "tb3:4a4077a9425664d1c6af26b54dc1be0a601f093e");
}

#[test]
fn fingerprints_are_stable_under_roster_permutation() {
    let forward = [athlete("A", "Ana"), athlete("B", "Bob"), athlete("C", "Cara")];
    let backward = [athlete("C", "Cara"), athlete("B", "Bob"), athlete("A", "Ana")];
    let results = results(&[
        ("A", result(false, 30, false, Some(105.0))),
        ("B", result(false, 30, false, Some(130.0))),
        ("C", result(false, 30, false, Some(140.0))),
    ]);
    let out_a = compute_lead_ranking(&forward, &results, None, &RankingOptions::default());
    let out_b = compute_lead_ranking(&backward, &results, None, &RankingOptions::default());
    assert_eq!(out_a.tie_events[0].fingerprint, out_b.tie_events[0].fingerprint);
    assert_eq!(out_a.rows, out_b.rows);
}

#[test]
fn podium_places_floor_is_one() {
    let athletes = [athlete("A", "Ana"), athlete("B", "Bob")];
    let results = results(&[
        ("A", result(false, 30, false, None)),
        ("B", result(false, 30, false, None)),
    ]);
    let options = RankingOptions {
        podium_places: 0,
        round_name: "Final".to_string(),
    };
    let out = compute_lead_ranking(&athletes, &results, None, &options);
    // A zero podium is clamped to one, so the rank-1 tie still needs work.
    assert!(!out.is_resolved);
}
