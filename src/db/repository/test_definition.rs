use rusqlite::{params, Connection, OptionalExtension};

use crate::db::DatabaseError;
use crate::models::{NewTest, TestDefinition};

const TEST_COLUMNS: &str = "id, analyzer_id, test_code, unit, lower_range, upper_range";

fn test_from_row(row: &rusqlite::Row<'_>) -> Result<TestDefinition, rusqlite::Error> {
    Ok(TestDefinition {
        id: row.get(0)?,
        analyzer_id: row.get(1)?,
        code: row.get(2)?,
        unit: row.get(3)?,
        lower: row.get(4)?,
        upper: row.get(5)?,
    })
}

pub fn list_tests(conn: &Connection, analyzer_id: i64) -> Result<Vec<TestDefinition>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {TEST_COLUMNS} FROM tests WHERE analyzer_id = ?1 ORDER BY id"
    ))?;
    let tests = stmt
        .query_map(params![analyzer_id], test_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(tests)
}

pub fn get_test(conn: &Connection, id: i64) -> Result<Option<TestDefinition>, DatabaseError> {
    let test = conn
        .query_row(
            &format!("SELECT {TEST_COLUMNS} FROM tests WHERE id = ?1"),
            params![id],
            test_from_row,
        )
        .optional()?;
    Ok(test)
}

pub fn insert_test(conn: &Connection, analyzer_id: i64, test: &NewTest) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO tests (analyzer_id, test_code, unit, lower_range, upper_range)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![analyzer_id, test.code, test.unit, test.lower, test.upper],
    )
    .map_err(DatabaseError::from_write)?;
    Ok(conn.last_insert_rowid())
}

pub fn delete_tests_for_analyzer(conn: &Connection, analyzer_id: i64) -> Result<usize, DatabaseError> {
    let deleted = conn.execute("DELETE FROM tests WHERE analyzer_id = ?1", params![analyzer_id])?;
    Ok(deleted)
}

pub fn delete_test(conn: &Connection, id: i64) -> Result<usize, DatabaseError> {
    let deleted = conn.execute("DELETE FROM tests WHERE id = ?1", params![id])?;
    Ok(deleted)
}
