//! Sample intake, result generation, and the combined "start analysis".

use chrono::Utc;

use crate::commands::run;
use crate::core_state::{CoreError, CoreState};
use crate::intake::{self, IntakeRecord};
use crate::models::SampleEntry;
use crate::scheduler::RunState;
use crate::synthesis::{self, GenerationOutcome};

/// Store the filled rows of the sample form. Blank rows are skipped.
pub fn store_samples(
    entries: Vec<SampleEntry>,
    state: &CoreState,
) -> Result<Vec<IntakeRecord>, CoreError> {
    let entries = intake::retain_filled(entries);
    let conn = state.open_db()?;
    let now = Utc::now().naive_utc();
    intake::store_samples(&conn, &entries, &now)
}

pub fn generate_results(
    analyzer_id: i64,
    sample_numbers: Vec<String>,
    state: &CoreState,
) -> Result<GenerationOutcome, CoreError> {
    let conn = state.open_db()?;
    state.with_rng(|rng| synthesis::generate(&conn, analyzer_id, &sample_numbers, rng))?
}

/// Register the form's samples and start a run over them for the selected
/// analyzer. Results are produced as the run ticks.
pub fn start_analysis(entries: Vec<SampleEntry>, state: &CoreState) -> Result<RunState, CoreError> {
    state.require_selected_analyzer()?;
    let entries = intake::retain_filled(entries);
    if entries.is_empty() {
        return Err(CoreError::validation("Please enter at least one sample ID"));
    }

    // Checked before storing so a rejected start leaves stored samples alone.
    if state.lock_run()?.scheduler.state().is_running() {
        return Err(CoreError::validation("A run is already in progress"));
    }

    let records = store_samples(entries, state)?;
    let numbers = records.into_iter().map(|r| r.sample_number).collect();
    run::start_run(numbers, state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{results, test_support};
    use crate::intake::IntakeAction;

    #[test]
    fn blank_rows_skipped() {
        let state = test_support::state();
        let records = store_samples(
            vec![SampleEntry::new("S001", "P1", "Alice"), SampleEntry::default()],
            &state,
        )
        .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].action, IntakeAction::Inserted);
    }

    #[test]
    fn generated_result_in_range_and_unsent() {
        let state = test_support::state();
        crate::commands::catalog::replace_tests(
            1,
            vec![crate::models::TestDraft::new("Test_1", "mmol/l", "0.5", "5.0")],
            &state,
        )
        .unwrap();
        store_samples(vec![SampleEntry::new("S001", "", "")], &state).unwrap();

        generate_results(1, vec!["S001".into()], &state).unwrap();

        let sample = results::list_samples(&state).unwrap().remove(0);
        let rows = results::get_sample_results(sample.id, &state).unwrap();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].value >= 0.5 && rows[0].value <= 5.0);
        assert!(!rows[0].sent);
    }

    #[test]
    fn regeneration_resets_sent_on_same_row() {
        let state = test_support::state();
        store_samples(vec![SampleEntry::new("S001", "", "")], &state).unwrap();
        let first = generate_results(1, vec!["S001".into()], &state).unwrap();
        results::mark_results_sent(first.result_ids(), &state).unwrap();

        let second = generate_results(1, vec!["S001".into()], &state).unwrap();
        assert_eq!(first.result_ids(), second.result_ids());
        let sample_id = first.results()[0].sample_id;
        let rows = results::get_sample_results(sample_id, &state).unwrap();
        assert!(rows.iter().all(|r| !r.sent));
    }

    #[test]
    fn analyzer_without_tests_generates_nothing() {
        let state = test_support::state();
        store_samples(vec![SampleEntry::new("S001", "", "")], &state).unwrap();
        let outcome = generate_results(2, vec!["S001".into()], &state).unwrap();
        assert_eq!(outcome, GenerationOutcome::NoTests);
    }

    #[test]
    fn start_analysis_needs_selection_and_samples() {
        let state = test_support::state();
        let err = start_analysis(vec![SampleEntry::new("S001", "", "")], &state).unwrap_err();
        assert_eq!(err.kind(), "validation");

        let state = test_support::selected_state();
        let err = start_analysis(vec![SampleEntry::default()], &state).unwrap_err();
        assert!(err.to_string().contains("at least one sample"));
    }

    #[test]
    fn start_analysis_stores_and_starts_run() {
        let state = test_support::selected_state();
        let run_state = start_analysis(
            vec![
                SampleEntry::new("S001", "P1", "Alice"),
                SampleEntry::new("", "", ""),
                SampleEntry::new("S002", "P2", "Bob"),
            ],
            &state,
        )
        .unwrap();
        assert_eq!(run_state, RunState::Running { index: 0, total: 2 });
        assert_eq!(results::list_samples(&state).unwrap().len(), 2);
    }

    #[test]
    fn rejected_start_keeps_stored_patient() {
        let state = test_support::selected_state();
        start_analysis(vec![SampleEntry::new("S001", "P1", "Alice")], &state).unwrap();
        let before = results::list_samples(&state).unwrap().remove(0);

        let err = start_analysis(vec![SampleEntry::new("S001", "P9", "Mallory")], &state)
            .unwrap_err();
        assert!(err.to_string().contains("already in progress"));

        let after = results::list_samples(&state).unwrap().remove(0);
        assert_eq!(after, before);
        assert_eq!(after.patient_name, "Alice");
    }

    #[test]
    fn unknown_analyzer_generation_not_found() {
        let state = test_support::state();
        store_samples(vec![SampleEntry::new("S001", "", "")], &state).unwrap();
        let err = generate_results(42, vec!["S001".into()], &state).unwrap_err();
        assert_eq!(err.kind(), "not_found");
    }

    #[test]
    fn unusable_range_does_not_break_later_generation() {
        let state = test_support::state();
        store_samples(vec![SampleEntry::new("S001", "", "")], &state).unwrap();
        let err = crate::commands::catalog::replace_tests(
            1,
            vec![crate::models::TestDraft::new("WIDE", "u", "-1e308", "1e308")],
            &state,
        )
        .unwrap_err();
        assert_eq!(err.kind(), "validation");

        // A row stored without validation is refused at generation time.
        let conn = state.open_db().unwrap();
        crate::db::repository::insert_test(
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
        let err = generate_results(1, vec!["S001".into()], &state).unwrap_err();
        assert_eq!(err.kind(), "validation");

        crate::commands::catalog::replace_tests(
            1,
            vec![crate::models::TestDraft::new("Test_1", "mmol/l", "0.5", "5.0")],
            &state,
        )
        .unwrap();
        let outcome = generate_results(1, vec!["S001".into()], &state).unwrap();
        assert_eq!(outcome.results().len(), 1);
    }

    #[test]
    fn stored_timestamp_is_utc() {
        let state = test_support::state();
        let slack = chrono::Duration::milliseconds(1);
        let before = Utc::now().naive_utc() - slack;
        store_samples(vec![SampleEntry::new("S001", "", "")], &state).unwrap();
        let after = Utc::now().naive_utc() + slack;

        let stored = results::list_samples(&state).unwrap().remove(0).date_time;
        assert!(stored >= before && stored <= after);
    }
}
