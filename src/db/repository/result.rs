use rusqlite::{params, Connection, OptionalExtension};

use crate::db::DatabaseError;
use crate::models::enums::AbnormalFlag;
use crate::models::{ResultRow, StoredResult};

pub fn find_result_id(
    conn: &Connection,
    sample_id: i64,
    test_id: i64,
) -> Result<Option<i64>, DatabaseError> {
    let id = conn
        .query_row(
            "SELECT id FROM results WHERE sample_id = ?1 AND test_id = ?2",
            params![sample_id, test_id],
            |row| row.get(0),
        )
        .optional()?;
    Ok(id)
}

pub fn get_result(conn: &Connection, id: i64) -> Result<Option<StoredResult>, DatabaseError> {
    let result = conn
        .query_row(
            "SELECT id, sample_id, test_id, result_value, sent FROM results WHERE id = ?1",
            params![id],
            |row| {
                Ok(StoredResult {
                    id: row.get(0)?,
                    sample_id: row.get(1)?,
                    test_id: row.get(2)?,
                    value: row.get(3)?,
                    sent: row.get(4)?,
                })
            },
        )
        .optional()?;
    Ok(result)
}

pub fn insert_result(
    conn: &Connection,
    sample_id: i64,
    test_id: i64,
    value: f64,
) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO results (sample_id, test_id, result_value, sent) VALUES (?1, ?2, ?3, 0)",
        params![sample_id, test_id, value],
    )
    .map_err(DatabaseError::from_write)?;
    Ok(conn.last_insert_rowid())
}

/// Overwrite a value. The sent flag is cleared: an acknowledgement of the
/// old value does not carry over.
pub fn update_result_value(conn: &Connection, id: i64, value: f64) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE results SET result_value = ?1, sent = 0 WHERE id = ?2",
        params![value, id],
    )?;
    Ok(())
}

/// Returns 1 when the row exists (already sent or not), 0 otherwise.
pub fn mark_result_sent(conn: &Connection, id: i64) -> Result<usize, DatabaseError> {
    let updated = conn.execute("UPDATE results SET sent = 1 WHERE id = ?1", params![id])?;
    Ok(updated)
}

/// Results of a sample joined with their tests. Rows whose test no longer
/// exists are not returned. The abnormal flag is derived here, on every read.
pub fn list_result_rows(conn: &Connection, sample_id: i64) -> Result<Vec<ResultRow>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT r.id, t.test_code, r.result_value, t.unit, t.lower_range, t.upper_range, r.sent
         FROM results r
         JOIN tests t ON r.test_id = t.id
         WHERE r.sample_id = ?1
         ORDER BY t.id",
    )?;
    let rows = stmt
        .query_map(params![sample_id], |row| {
            let value: f64 = row.get(2)?;
            let lower: f64 = row.get(4)?;
            let upper: f64 = row.get(5)?;
            Ok(ResultRow {
                result_id: row.get(0)?,
                test_code: row.get(1)?,
                value,
                unit: row.get(3)?,
                lower,
                upper,
                sent: row.get(6)?,
                abnormal: AbnormalFlag::classify(value, lower, upper),
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn result_ids_for_sample(conn: &Connection, sample_id: i64) -> Result<Vec<i64>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT r.id FROM results r JOIN tests t ON r.test_id = t.id
         WHERE r.sample_id = ?1 ORDER BY r.id",
    )?;
    let ids = stmt
        .query_map(params![sample_id], |row| row.get(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ids)
}

pub fn count_unsent_results(conn: &Connection) -> Result<i64, DatabaseError> {
    let count = conn.query_row("SELECT COUNT(*) FROM results WHERE sent = 0", [], |row| {
        row.get(0)
    })?;
    Ok(count)
}

/// Results that point at a test row which no longer exists.
pub fn count_orphaned_results(conn: &Connection) -> Result<i64, DatabaseError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM results r
         WHERE NOT EXISTS (SELECT 1 FROM tests t WHERE t.id = r.test_id)",
        [],
        |row| row.get(0),
    )?;
    Ok(count)
}

pub fn count_results_for_analyzer_tests(
    conn: &Connection,
    analyzer_id: i64,
) -> Result<i64, DatabaseError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM results
         WHERE test_id IN (SELECT id FROM tests WHERE analyzer_id = ?1)",
        params![analyzer_id],
        |row| row.get(0),
    )?;
    Ok(count)
}

pub fn count_results_for_test(conn: &Connection, test_id: i64) -> Result<i64, DatabaseError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM results WHERE test_id = ?1",
        params![test_id],
        |row| row.get(0),
    )?;
    Ok(count)
}

pub fn delete_results_for_analyzer_tests(
    conn: &Connection,
    analyzer_id: i64,
) -> Result<usize, DatabaseError> {
    let deleted = conn.execute(
        "DELETE FROM results WHERE test_id IN (SELECT id FROM tests WHERE analyzer_id = ?1)",
        params![analyzer_id],
    )?;
    Ok(deleted)
}

pub fn delete_results_for_test(conn: &Connection, test_id: i64) -> Result<usize, DatabaseError> {
    let deleted = conn.execute("DELETE FROM results WHERE test_id = ?1", params![test_id])?;
    Ok(deleted)
}
