use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension};

use crate::db::DatabaseError;
use crate::models::{Sample, SampleEntry};

/// UTC, stored with microseconds so samples registered in the same second
/// keep their order.
pub const SAMPLE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";
const SAMPLE_TIMESTAMP_PARSE: &str = "%Y-%m-%d %H:%M:%S%.f";

struct SampleRow {
    id: i64,
    sample_number: String,
    patient_id: String,
    patient_name: String,
    date_time: String,
}

fn sample_row_from_rusqlite(row: &rusqlite::Row<'_>) -> Result<SampleRow, rusqlite::Error> {
    Ok(SampleRow {
        id: row.get(0)?,
        sample_number: row.get(1)?,
        patient_id: row.get(2)?,
        patient_name: row.get(3)?,
        date_time: row.get(4)?,
    })
}

fn sample_from_row(row: SampleRow) -> Result<Sample, DatabaseError> {
    let date_time = NaiveDateTime::parse_from_str(&row.date_time, SAMPLE_TIMESTAMP_PARSE)
        .map_err(|_| DatabaseError::InvalidTimestamp {
            field: "samples.date_time".into(),
            value: row.date_time.clone(),
        })?;
    Ok(Sample {
        id: row.id,
        sample_number: row.sample_number,
        patient_id: row.patient_id,
        patient_name: row.patient_name,
        date_time,
    })
}

pub fn find_sample_id(conn: &Connection, sample_number: &str) -> Result<Option<i64>, DatabaseError> {
    let id = conn
        .query_row(
            "SELECT id FROM samples WHERE sample_number = ?1",
            params![sample_number],
            |row| row.get(0),
        )
        .optional()?;
    Ok(id)
}

pub fn get_sample(conn: &Connection, id: i64) -> Result<Option<Sample>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT id, sample_number, patient_id, patient_name, date_time
             FROM samples WHERE id = ?1",
            params![id],
            sample_row_from_rusqlite,
        )
        .optional()?;
    row.map(sample_from_row).transpose()
}

pub fn insert_sample(
    conn: &Connection,
    entry: &SampleEntry,
    now: &NaiveDateTime,
) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO samples (sample_number, patient_id, patient_name, date_time)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            entry.sample_number,
            entry.patient_id,
            entry.patient_name,
            now.format(SAMPLE_TIMESTAMP_FORMAT).to_string(),
        ],
    )
    .map_err(DatabaseError::from_write)?;
    Ok(conn.last_insert_rowid())
}

pub fn update_sample(
    conn: &Connection,
    id: i64,
    entry: &SampleEntry,
    now: &NaiveDateTime,
) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE samples SET patient_id = ?1, patient_name = ?2, date_time = ?3 WHERE id = ?4",
        params![
            entry.patient_id,
            entry.patient_name,
            now.format(SAMPLE_TIMESTAMP_FORMAT).to_string(),
            id,
        ],
    )?;
    Ok(())
}

/// Most recently stored first.
pub fn list_samples(conn: &Connection) -> Result<Vec<Sample>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, sample_number, patient_id, patient_name, date_time
         FROM samples ORDER BY date_time DESC, id DESC",
    )?;
    let rows = stmt
        .query_map([], sample_row_from_rusqlite)?
        .collect::<Result<Vec<_>, _>>()?;
    rows.into_iter().map(sample_from_row).collect()
}
