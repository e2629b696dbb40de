//! Test catalog and ASTM template commands.

use crate::catalog;
use crate::core_state::{CoreError, CoreState};
use crate::models::enums::{MessageDirection, TemplateField, TemplateType};
use crate::models::{AstmTemplate, TestDefinition, TestDraft};
use crate::templates;

pub fn list_tests(analyzer_id: i64, state: &CoreState) -> Result<Vec<TestDefinition>, CoreError> {
    let conn = state.open_db()?;
    catalog::list(&conn, analyzer_id)
}

/// Replace the analyzer's catalog using the configured orphan policy.
pub fn replace_tests(
    analyzer_id: i64,
    drafts: Vec<TestDraft>,
    state: &CoreState,
) -> Result<Vec<TestDefinition>, CoreError> {
    let conn = state.open_db()?;
    catalog::replace(&conn, analyzer_id, &drafts, state.config().orphan_policy)
}

pub fn delete_test(test_id: i64, state: &CoreState) -> Result<(), CoreError> {
    let conn = state.open_db()?;
    catalog::delete_test(&conn, test_id, state.config().orphan_policy)
}

pub fn count_orphaned_results(state: &CoreState) -> Result<i64, CoreError> {
    let conn = state.open_db()?;
    catalog::count_orphaned_results(&conn)
}

/// Both templates of an analyzer; unsaved types come back with stock text.
pub fn get_templates(analyzer_id: i64, state: &CoreState) -> Result<Vec<AstmTemplate>, CoreError> {
    let conn = state.open_db()?;
    templates::effective_templates(&conn, analyzer_id)
}

pub fn save_template(
    analyzer_id: i64,
    template_type: TemplateType,
    content: String,
    state: &CoreState,
) -> Result<AstmTemplate, CoreError> {
    let conn = state.open_db()?;
    templates::save_template(&conn, analyzer_id, template_type, &content)
}

/// Editor helper: append a field line to template text. Nothing is stored.
pub fn append_template_field(
    content: String,
    direction: MessageDirection,
    field: TemplateField,
    text: String,
) -> String {
    templates::append_field(&content, direction, field, &text)
}
