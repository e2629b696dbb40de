//! First-start seeding: two analyzer profiles, the first with a small
//! photometric test catalog. Guarded by a row count so it runs once.

use rusqlite::Connection;

use super::repository::{count_analyzers, insert_analyzer, insert_test};
use super::DatabaseError;
use crate::models::NewTest;

pub const SEED_ANALYZERS: &[&str] = &["Analyzer 1", "Analyzer 2"];

/// (code, unit, lower, upper) for the first seeded analyzer.
pub const SEED_TESTS: &[(&str, &str, f64, f64)] = &[
    ("Test_1", "mmol/l", 0.5, 5.0),
    ("Photo_reflex_test", "mmol/l", 1.0, 5.5),
    ("Photometric_test", "mmol/l", 0.05, 1.2),
];

/// Seed an empty database. Returns `false` when analyzers already exist.
pub fn seed_defaults(conn: &Connection) -> Result<bool, DatabaseError> {
    if count_analyzers(conn)? > 0 {
        return Ok(false);
    }

    let tx = conn.unchecked_transaction()?;
    let mut first_id = None;
    for name in SEED_ANALYZERS {
        let id = insert_analyzer(&tx, name)?;
        first_id.get_or_insert(id);
    }
    if let Some(analyzer_id) = first_id {
        for (code, unit, lower, upper) in SEED_TESTS {
            insert_test(
                &tx,
                analyzer_id,
                &NewTest {
                    code: (*code).into(),
                    unit: (*unit).into(),
                    lower: *lower,
                    upper: *upper,
                },
            )?;
        }
    }
    tx.commit()?;

    tracing::info!(
        analyzers = SEED_ANALYZERS.len(),
        tests = SEED_TESTS.len(),
        "Seeded default analyzer profiles"
    );
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::{list_analyzers, list_tests};
    use crate::db::sqlite::open_memory_database;

    #[test]
    fn seeds_two_analyzers_and_first_catalog() {
        let conn = open_memory_database().unwrap();
        assert!(seed_defaults(&conn).unwrap());

        let analyzers = list_analyzers(&conn).unwrap();
        let names: Vec<&str> = analyzers.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["Analyzer 1", "Analyzer 2"]);

        let tests = list_tests(&conn, analyzers[0].id).unwrap();
        assert_eq!(tests.len(), 3);
        assert_eq!(tests[0].code, "Test_1");
        assert_eq!(tests[0].unit, "mmol/l");
        assert_eq!((tests[0].lower, tests[0].upper), (0.5, 5.0));
        assert!(list_tests(&conn, analyzers[1].id).unwrap().is_empty());
    }

    #[test]
    fn seeding_is_idempotent() {
        let conn = open_memory_database().unwrap();
        assert!(seed_defaults(&conn).unwrap());
        assert!(!seed_defaults(&conn).unwrap());
        assert_eq!(list_analyzers(&conn).unwrap().len(), 2);
    }
}
