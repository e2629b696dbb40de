//! Sample registration from the sample input form.

use chrono::NaiveDateTime;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::core_state::CoreError;
use crate::db::repository;
use crate::models::SampleEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntakeAction {
    Inserted,
    Updated,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntakeRecord {
    pub sample_id: i64,
    pub sample_number: String,
    pub action: IntakeAction,
}

/// Drop form rows whose sample number was left blank.
pub fn retain_filled(entries: Vec<SampleEntry>) -> Vec<SampleEntry> {
    entries
        .into_iter()
        .filter(|entry| !entry.sample_number.trim().is_empty())
        .collect()
}

/// Insert or refresh one sample. An existing sample number keeps its id and
/// gets the new patient fields and timestamp.
pub fn store_sample(
    conn: &Connection,
    entry: &SampleEntry,
    now: &NaiveDateTime,
) -> Result<IntakeRecord, CoreError> {
    let number = entry.sample_number.trim();
    if number.is_empty() {
        return Err(CoreError::validation("Sample number is required"));
    }
    let entry = SampleEntry {
        sample_number: number.to_string(),
        ..entry.clone()
    };

    let (sample_id, action) = match repository::find_sample_id(conn, number)? {
        Some(id) => {
            repository::update_sample(conn, id, &entry, now)?;
            (id, IntakeAction::Updated)
        }
        None => (repository::insert_sample(conn, &entry, now)?, IntakeAction::Inserted),
    };

    tracing::debug!(sample = number, sample_id, ?action, "Sample stored");
    Ok(IntakeRecord {
        sample_id,
        sample_number: entry.sample_number,
        action,
    })
}

/// Store entries one by one. There is no batch transaction: entries before
/// a failing one stay stored.
pub fn store_samples(
    conn: &Connection,
    entries: &[SampleEntry],
    now: &NaiveDateTime,
) -> Result<Vec<IntakeRecord>, CoreError> {
    let records = entries
        .iter()
        .map(|entry| store_sample(conn, entry, now))
        .collect::<Result<Vec<_>, _>>()?;

    let inserted = records
        .iter()
        .filter(|r| r.action == IntakeAction::Inserted)
        .count();
    tracing::info!(
        inserted,
        updated = records.len() - inserted,
        "Samples stored"
    );
    Ok(records)
}
