//! Test catalog per analyzer: the tests it runs and their reference ranges.
//!
//! Replacement is all-or-nothing. Every draft row is validated before the
//! database is touched, and the delete-then-insert runs in one transaction.
//! What happens to results that reference the removed tests is governed by
//! [`OrphanPolicy`].

use rusqlite::Connection;

use crate::core_state::CoreError;
use crate::db::repository;
use crate::models::enums::OrphanPolicy;
use crate::models::{NewTest, TestDefinition, TestDraft};
use crate::registry;

pub fn list(conn: &Connection, analyzer_id: i64) -> Result<Vec<TestDefinition>, CoreError> {
    Ok(repository::list_tests(conn, analyzer_id)?)
}

fn parse_bound(row: usize, label: &str, raw: &str) -> Result<f64, CoreError> {
    let value: f64 = raw.trim().parse().map_err(|_| {
        CoreError::validation(format!(
            "Row {row}: {label} range '{}' is not a number",
            raw.trim()
        ))
    })?;
    if !value.is_finite() {
        return Err(CoreError::validation(format!(
            "Row {row}: {label} range must be a finite number"
        )));
    }
    Ok(value)
}

/// Validate every draft. Rows are numbered from 1 in error messages.
pub fn validate_drafts(drafts: &[TestDraft]) -> Result<Vec<NewTest>, CoreError> {
    drafts
        .iter()
        .enumerate()
        .map(|(i, draft)| {
            let row = i + 1;
            let code = draft.code.trim();
            if code.is_empty() {
                return Err(CoreError::validation(format!("Row {row}: test code is required")));
            }
            let unit = draft.unit.trim();
            if unit.is_empty() {
                return Err(CoreError::validation(format!(
                    "Row {row}: unit is required for test '{code}'"
                )));
            }
            let lower = parse_bound(row, "lower", &draft.lower)?;
            let upper = parse_bound(row, "upper", &draft.upper)?;
            if lower > upper {
                return Err(CoreError::validation(format!(
                    "Row {row}: lower range {lower} exceeds upper range {upper} for test '{code}'"
                )));
            }
            if !(upper - lower).is_finite() {
                return Err(CoreError::validation(format!(
                    "Row {row}: range {lower} to {upper} is too wide for test '{code}'"
                )));
            }
            Ok(NewTest {
                code: code.to_string(),
                unit: unit.to_string(),
                lower,
                upper,
            })
        })
        .collect()
}

/// Replace the analyzer's whole catalog with `drafts`.
pub fn replace(
    conn: &Connection,
    analyzer_id: i64,
    drafts: &[TestDraft],
    policy: OrphanPolicy,
) -> Result<Vec<TestDefinition>, CoreError> {
    registry::get_analyzer(conn, analyzer_id)?;
    let tests = validate_drafts(drafts)?;

    let tx = conn.unchecked_transaction()?;

    let referenced = repository::count_results_for_analyzer_tests(&tx, analyzer_id)?;
    let purged = match policy {
        OrphanPolicy::Reject if referenced > 0 => {
            return Err(CoreError::validation(format!(
                "{referenced} stored result(s) reference this analyzer's tests; \
                 replacing the catalog would orphan them"
            )));
        }
        OrphanPolicy::Purge => repository::delete_results_for_analyzer_tests(&tx, analyzer_id)?,
        OrphanPolicy::Retain | OrphanPolicy::Reject => 0,
    };

    let removed = repository::delete_tests_for_analyzer(&tx, analyzer_id)?;
    for test in &tests {
        repository::insert_test(&tx, analyzer_id, test)?;
    }
    tx.commit()?;

    if policy == OrphanPolicy::Retain && referenced > 0 {
        tracing::warn!(
            analyzer_id,
            orphaned = referenced,
            "Catalog replaced; existing results now reference removed tests"
        );
    }
    tracing::info!(
        analyzer_id,
        removed,
        inserted = tests.len(),
        purged,
        policy = %policy,
        "Test catalog replaced"
    );

    list(conn, analyzer_id)
}

/// Remove one test definition.
pub fn delete_test(conn: &Connection, test_id: i64, policy: OrphanPolicy) -> Result<(), CoreError> {
    let test = repository::get_test(conn, test_id)?
        .ok_or_else(|| CoreError::not_found("test", test_id))?;

    let tx = conn.unchecked_transaction()?;
    let referenced = repository::count_results_for_test(&tx, test_id)?;
    match policy {
        OrphanPolicy::Reject if referenced > 0 => {
            return Err(CoreError::validation(format!(
                "{referenced} stored result(s) reference test '{}'",
                test.code
            )));
        }
        OrphanPolicy::Purge => {
            repository::delete_results_for_test(&tx, test_id)?;
        }
        OrphanPolicy::Retain | OrphanPolicy::Reject => {}
    }
    repository::delete_test(&tx, test_id)?;
    tx.commit()?;

    tracing::info!(test = %test.code, analyzer_id = test.analyzer_id, policy = %policy, "Test deleted");
    Ok(())
}

pub fn count_orphaned_results(conn: &Connection) -> Result<i64, CoreError> {
    Ok(repository::count_orphaned_results(conn)?)
}
