// crates/onsight-core/tests/proptest_machine.rs
// ============================================================================
// Module: State Machine Property-Based Tests
// Description: Invariant checks across random command sequences.
// Purpose: Detect clamp, epoch, and timer-mirror violations.
// ============================================================================

//! Property-based tests for contest state invariants.

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
    clippy::missing_docs_in_private_items,
    reason = "Test-only assertions and helpers are permitted."
)]

use onsight_core::BoxState;
use onsight_core::Command;
use onsight_core::CommandRecord;
use onsight_core::TimerState;
use onsight_core::apply_command;
use proptest::prelude::*;
use serde_json::json;

fn command_strategy() -> impl Strategy<Value = Command> {
    prop_oneof![
        Just(Command::StartTimer),
        Just(Command::StopTimer),
        Just(Command::ResumeTimer),
        Just(Command::ResetBox),
        (-100i32 ..= 100).prop_map(|tenths| Command::ProgressUpdate {
            delta: Some(f64::from(tenths) / 10.0),
        }),
        (0u32 ..= 600).prop_map(|secs| Command::RegisterTime {
            registered_time: Some(json!(secs)),
        }),
        (0u32 ..= 600).prop_map(|secs| Command::TimerSync {
            remaining: Some(f64::from(secs)),
        }),
        (1u32 ..= 3, 1u32 ..= 20).prop_map(|(route_index, holds_count)| Command::InitRoute {
            route_index: Some(route_index),
            holds_count: Some(holds_count),
            routes_count: None,
            holds_counts: None,
            competitors: json!([{"nume": "Ana"}, {"nume": "Bob"}]).as_array().cloned(),
            categorie: None,
            timer_preset: None,
        }),
        prop_oneof![Just("Ana"), Just("Bob")].prop_map(|name| Command::SubmitScore {
            competitor: Some(name.to_string()),
            competitor_idx: None,
            idx: None,
            score: Some(5.0),
            registered_time: None,
        }),
        (any::<bool>(), any::<bool>(), any::<bool>()).prop_map(
            |(reset_timer, clear_progress, unmark_all)| Command::ResetPartial {
                reset_timer,
                clear_progress,
                unmark_all,
            }
        ),
    ]
}

proptest! {
    #[test]
    fn hold_count_stays_clamped(
        holds_count in 1u32 ..= 30,
        deltas in prop::collection::vec(-100i32 ..= 100, 1 .. 40),
    ) {
        let mut state = BoxState::new();
        state.holds_count = holds_count;
        for tenths in deltas {
            let record = CommandRecord::new(Command::ProgressUpdate {
                delta: Some(f64::from(tenths) / 10.0),
            });
            state = apply_command(&state, &record).expect("progress never fails").state;
            prop_assert!(state.hold_count >= 0.0);
            prop_assert!(state.hold_count <= f64::from(holds_count));
        }
    }

    #[test]
    fn epoch_and_timer_invariants_hold_across_sequences(
        commands in prop::collection::vec(command_strategy(), 1 .. 30),
    ) {
        let mut state = BoxState::new();
        let mut last_version = state.box_version;
        let mut last_session = state.session_id.clone();
        for command in commands {
            let was_init = matches!(
                command,
                Command::InitRoute {
                    ..
                }
            );
            let record = CommandRecord::new(command);
            let outcome = apply_command(&state, &record).expect("sequence commands never fail");
            state = outcome.state;

            // started mirrors the running timer state exactly.
            prop_assert_eq!(state.started, state.timer_state == TimerState::Running);

            // boxVersion never decreases within a session and INIT_ROUTE
            // strictly increments it.
            if state.session_id == last_session {
                if was_init {
                    prop_assert!(state.box_version == last_version + 1);
                } else {
                    prop_assert!(state.box_version >= last_version);
                }
            }
            last_version = state.box_version;
            last_session = state.session_id.clone();

            // Hold progress never escapes its bounds.
            prop_assert!(state.hold_count >= 0.0);
            if state.holds_count > 0 {
                prop_assert!(state.hold_count <= f64::from(state.holds_count));
            }

            // The preparing climber, when set, is an unmarked competitor
            // positioned after the current climber.
            if !state.preparing_climber.is_empty() {
                let current_pos =
                    state.competitors.iter().position(|c| c.name == state.current_climber);
                let preparing_pos =
                    state.competitors.iter().position(|c| c.name == state.preparing_climber);
                prop_assert!(preparing_pos.is_some());
                if let (Some(current), Some(preparing)) = (current_pos, preparing_pos) {
                    prop_assert!(preparing > current);
                    prop_assert!(!state.competitors[preparing].marked);
                }
            }
        }
    }
}
