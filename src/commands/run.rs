//! Run control. A run is bound to the analyzer selected when it starts;
//! every tick generates results for the sample it makes current.

use serde::{Deserialize, Serialize};

use crate::connection_config;
use crate::core_state::{CoreError, CoreState};
use crate::ledger;
use crate::scheduler::{RunState, TickReport};
use crate::synthesis::{self, GenerationOutcome};

/// One tick as seen by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunTick {
    pub report: TickReport,
    /// Results produced for the current sample; `None` on a no-op tick.
    pub generation: Option<GenerationOutcome>,
    /// Results marked sent because the analyzer has automatic sending on.
    pub auto_sent: usize,
}

pub fn start_run(sample_numbers: Vec<String>, state: &CoreState) -> Result<RunState, CoreError> {
    let analyzer = state.require_selected_analyzer()?;
    let mut session = state.lock_run()?;
    let run_state = session.scheduler.start(sample_numbers)?;
    session.analyzer_id = Some(analyzer.id);
    tracing::info!(analyzer = %analyzer.name, "Run bound to analyzer");
    Ok(run_state)
}

/// Generate for the pending sample, then advance. A failed generation
/// leaves the scheduler where it was so the same sample is retried.
pub fn tick(state: &CoreState) -> Result<RunTick, CoreError> {
    let mut session = state.lock_run()?;
    let pending = session.scheduler.pending().map(str::to_string);

    let (generation, auto_sent) = match (pending, session.analyzer_id) {
        (Some(sample), Some(analyzer_id)) => {
            let conn = state.open_db()?;
            let generation = state
                .with_rng(|rng| synthesis::generate(&conn, analyzer_id, &[sample.clone()], rng))?
                .map_err(|e| {
                    tracing::warn!(sample = %sample, error = %e, "Tick generation failed");
                    e
                })?;

            let settings = connection_config::effective(&conn, analyzer_id)?;
            let auto_sent = if settings.auto_send {
                ledger::mark_sent(&conn, &generation.result_ids())?
            } else {
                0
            };
            (Some(generation), auto_sent)
        }
        _ => (None, 0),
    };

    let report = session.scheduler.tick();
    Ok(RunTick {
        report,
        generation,
        auto_sent,
    })
}

pub fn current_state(state: &CoreState) -> Result<RunState, CoreError> {
    Ok(state.lock_run()?.scheduler.state())
}

/// Stop the current run. Returns how many samples had been processed, or
/// `None` when no run was active.
pub fn cancel_run(state: &CoreState) -> Result<Option<usize>, CoreError> {
    let mut session = state.lock_run()?;
    let processed = session.scheduler.cancel();
    if processed.is_some() {
        session.analyzer_id = None;
    }
    Ok(processed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{connection, results, samples, test_support};
    use crate::models::{ConnectionSettingsInput, SampleEntry};

    fn numbers(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn store(state: &CoreState, list: &[&str]) {
        let entries = list.iter().map(|n| SampleEntry::new(n, "", "")).collect();
        samples::store_samples(entries, state).unwrap();
    }

    #[test]
    fn two_ticks_over_two_samples() {
        let state = test_support::selected_state();
        store(&state, &["S001", "S002"]);

        assert_eq!(current_state(&state).unwrap(), RunState::Idle);
        start_run(numbers(&["S001", "S002"]), &state).unwrap();

        let first = tick(&state).unwrap();
        assert_eq!(first.report.current.as_deref(), Some("S001"));
        assert_eq!(current_state(&state).unwrap(), RunState::Running { index: 1, total: 2 });

        let second = tick(&state).unwrap();
        assert_eq!(second.report.current.as_deref(), Some("S002"));
        assert_eq!(current_state(&state).unwrap(), RunState::Completed { total: 2 });

        let idle = tick(&state).unwrap();
        assert!(idle.report.current.is_none());
        assert!(idle.generation.is_none());
    }

    #[test]
    fn tick_generates_for_current_sample_only() {
        let state = test_support::selected_state();
        store(&state, &["S001", "S002"]);
        start_run(numbers(&["S001", "S002"]), &state).unwrap();

        let first = tick(&state).unwrap();
        let generation = first.generation.unwrap();
        assert_eq!(generation.results().len(), 3);
        assert!(generation.results().iter().all(|r| r.sample_number == "S001"));
        assert_eq!(first.auto_sent, 0);
        assert_eq!(results::count_unsent_results(&state).unwrap(), 3);
    }

    #[test]
    fn auto_send_marks_tick_results_sent() {
        let state = test_support::selected_state();
        let input = ConnectionSettingsInput {
            auto_send: true,
            ..ConnectionSettingsInput::default()
        };
        connection::save_connection_settings(1, input, &state).unwrap();
        store(&state, &["S001"]);
        start_run(numbers(&["S001"]), &state).unwrap();

        let report = tick(&state).unwrap();
        assert_eq!(report.auto_sent, 3);
        assert_eq!(results::count_unsent_results(&state).unwrap(), 0);
    }

    #[test]
    fn unknown_sample_reported_missing() {
        let state = test_support::selected_state();
        start_run(numbers(&["S404"]), &state).unwrap();
        let report = tick(&state).unwrap();
        match report.generation {
            Some(GenerationOutcome::Generated {
                results,
                missing_samples,
            }) => {
                assert!(results.is_empty());
                assert_eq!(missing_samples, vec!["S404"]);
            }
            other => panic!("Expected generation outcome, got {other:?}"),
        }
    }

    #[test]
    fn start_requires_selection() {
        let state = test_support::state();
        let err = start_run(numbers(&["S001"]), &state).unwrap_err();
        assert_eq!(err.kind(), "validation");
    }

    #[test]
    fn second_start_while_running_rejected() {
        let state = test_support::selected_state();
        start_run(numbers(&["S001", "S002"]), &state).unwrap();
        assert!(start_run(numbers(&["S003"]), &state).is_err());
        assert_eq!(current_state(&state).unwrap(), RunState::Running { index: 0, total: 2 });
    }

    #[test]
    fn cancel_returns_to_idle() {
        let state = test_support::selected_state();
        assert_eq!(cancel_run(&state).unwrap(), None);

        start_run(numbers(&["S001", "S002"]), &state).unwrap();
        tick(&state).unwrap();
        assert_eq!(cancel_run(&state).unwrap(), Some(1));
        assert_eq!(current_state(&state).unwrap(), RunState::Idle);
        assert!(tick(&state).unwrap().generation.is_none());
    }

    #[test]
    fn failed_generation_keeps_sample_pending() {
        let state = test_support::selected_state();
        store(&state, &["S001", "S002"]);
        let conn = state.open_db().unwrap();
        let wide = crate::db::repository::insert_test(
            &conn,
            1,
            &crate::models::NewTest {
                code: "WIDE".into(),
                unit: "u".into(),
                lower: -1e308,
                upper: 1e308,
            },
        )
        .unwrap();
        start_run(numbers(&["S001", "S002"]), &state).unwrap();

        let err = tick(&state).unwrap_err();
        assert_eq!(err.kind(), "validation");
        assert_eq!(current_state(&state).unwrap(), RunState::Running { index: 0, total: 2 });
        assert_eq!(results::count_unsent_results(&state).unwrap(), 0);

        // Once the catalog is usable the same sample is retried.
        crate::db::repository::delete_test(&conn, wide).unwrap();
        let retry = tick(&state).unwrap();
        assert_eq!(retry.report.current.as_deref(), Some("S001"));
        assert_eq!(retry.generation.unwrap().results().len(), 3);
        assert_eq!(current_state(&state).unwrap(), RunState::Running { index: 1, total: 2 });
    }

    #[test]
    fn run_stays_bound_to_starting_analyzer() {
        let state = test_support::selected_state();
        store(&state, &["S001"]);
        start_run(numbers(&["S001"]), &state).unwrap();

        // Analyzer 2 has no tests; the run still generates for analyzer 1.
        crate::commands::analyzers::select_analyzer(2, &state).unwrap();
        let report = tick(&state).unwrap();
        assert_eq!(report.generation.unwrap().results().len(), 3);
    }
}
