//! Analyzer listing and selection.

use crate::core_state::{CoreError, CoreState};
use crate::models::Analyzer;
use crate::registry::{self, AnalyzerProfile};

pub fn list_analyzers(state: &CoreState) -> Result<Vec<Analyzer>, CoreError> {
    let conn = state.open_db()?;
    registry::list_analyzers(&conn)
}

pub fn get_analyzer(analyzer_id: i64, state: &CoreState) -> Result<Analyzer, CoreError> {
    let conn = state.open_db()?;
    registry::get_analyzer(&conn, analyzer_id)
}

/// Make `analyzer_id` the current analyzer and return everything its
/// settings and catalog views show.
pub fn select_analyzer(analyzer_id: i64, state: &CoreState) -> Result<AnalyzerProfile, CoreError> {
    let conn = state.open_db()?;
    let profile = registry::load_profile(&conn, analyzer_id)?;
    state.set_selected_analyzer(profile.analyzer.clone())?;
    tracing::info!(analyzer = %profile.analyzer.name, "Analyzer selected");
    Ok(profile)
}

/// The current analyzer, if any.
pub fn selected_analyzer(state: &CoreState) -> Result<Option<Analyzer>, CoreError> {
    state.selected_analyzer()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support;

    #[test]
    fn lists_seeded_analyzers() {
        let state = test_support::state();
        let names: Vec<String> = list_analyzers(&state)
            .unwrap()
            .into_iter()
            .map(|a| a.name)
            .collect();
        assert_eq!(names, vec!["Analyzer 1", "Analyzer 2"]);
    }

    #[test]
    fn select_sets_current_analyzer() {
        let state = test_support::state();
        assert!(selected_analyzer(&state).unwrap().is_none());

        let profile = select_analyzer(2, &state).unwrap();
        assert_eq!(profile.analyzer.name, "Analyzer 2");
        assert!(profile.tests.is_empty());
        assert_eq!(selected_analyzer(&state).unwrap(), Some(profile.analyzer));
    }

    #[test]
    fn selecting_unknown_analyzer_keeps_previous() {
        let state = test_support::selected_state();
        let err = select_analyzer(42, &state).unwrap_err();
        assert_eq!(err.kind(), "not_found");
        assert_eq!(selected_analyzer(&state).unwrap().unwrap().id, 1);
    }

    #[test]
    fn get_analyzer_by_id() {
        let state = test_support::state();
        assert_eq!(get_analyzer(1, &state).unwrap().name, "Analyzer 1");
        assert_eq!(get_analyzer(3, &state).unwrap_err().kind(), "not_found");
    }
}
