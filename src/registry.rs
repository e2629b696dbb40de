//! Analyzer registry: the set of simulated instrument profiles.
//!
//! Analyzers are created only by first-start seeding; the core never adds
//! or removes them. Loading a profile gathers everything the settings and
//! catalog views need for one analyzer.

use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::connection_config::{self, FieldAvailability};
use crate::core_state::CoreError;
use crate::db::repository;
use crate::models::{Analyzer, AstmTemplate, ConnectionSettings, TestDefinition};
use crate::templates;

/// Everything shown after an analyzer is selected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzerProfile {
    pub analyzer: Analyzer,
    /// Stored settings, or the form defaults when none were ever saved.
    pub settings: ConnectionSettings,
    pub settings_saved: bool,
    pub fields: FieldAvailability,
    pub tests: Vec<TestDefinition>,
    pub templates: Vec<AstmTemplate>,
}

pub fn list_analyzers(conn: &Connection) -> Result<Vec<Analyzer>, CoreError> {
    Ok(repository::list_analyzers(conn)?)
}

pub fn get_analyzer(conn: &Connection, id: i64) -> Result<Analyzer, CoreError> {
    repository::get_analyzer(conn, id)?.ok_or_else(|| CoreError::not_found("analyzer", id))
}

pub fn load_profile(conn: &Connection, id: i64) -> Result<AnalyzerProfile, CoreError> {
    let analyzer = get_analyzer(conn, id)?;
    let stored = repository::get_connection_settings(conn, id)?;
    let settings_saved = stored.is_some();
    let settings = stored.unwrap_or_else(|| ConnectionSettings::defaults_for(id));
    let fields = connection_config::field_availability(&settings.transport);
    let tests = repository::list_tests(conn, id)?;
    let templates = templates::effective_templates(conn, id)?;

    tracing::debug!(
        analyzer = %analyzer.name,
        tests = tests.len(),
        settings_saved,
        "Loaded analyzer profile"
    );

    Ok(AnalyzerProfile {
        analyzer,
        settings,
        settings_saved,
        fields,
        tests,
        templates,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::seed::seed_defaults;
    use crate::db::sqlite::open_memory_database;
    use crate::models::enums::TemplateType;
    use crate::models::Transport;

    fn seeded() -> Connection {
        let conn = open_memory_database().unwrap();
        seed_defaults(&conn).unwrap();
        conn
    }

    #[test]
    fn lists_seeded_analyzers_in_id_order() {
        let conn = seeded();
        let analyzers = list_analyzers(&conn).unwrap();
        assert_eq!(analyzers.len(), 2);
        assert!(analyzers[0].id < analyzers[1].id);
        assert_eq!(analyzers[0].name, "Analyzer 1");
    }

    #[test]
    fn unknown_analyzer_is_not_found() {
        let conn = seeded();
        let err = get_analyzer(&conn, 404).unwrap_err();
        assert!(matches!(err, CoreError::NotFound { .. }));
        assert_eq!(err.kind(), "not_found");
    }

    #[test]
    fn fresh_profile_uses_defaults() {
        let conn = seeded();
        let profile = load_profile(&conn, 1).unwrap();
        assert!(!profile.settings_saved);
        assert!(matches!(profile.settings.transport, Transport::Tcp(_)));
        assert_eq!(profile.tests.len(), 3);
        assert_eq!(profile.templates.len(), 2);
        assert_eq!(profile.templates[0].template_type, TemplateType::SampleInfo);
        assert!(!profile.fields.lis_port);
    }
}
