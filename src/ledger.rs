//! Read side of stored samples and results, plus the sent flag.

use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::core_state::CoreError;
use crate::db::repository;
use crate::models::{ResultRow, Sample};

/// Patient header and results of one sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleDetail {
    pub sample: Sample,
    pub results: Vec<ResultRow>,
    pub abnormal_count: usize,
}

pub fn list_samples(conn: &Connection) -> Result<Vec<Sample>, CoreError> {
    Ok(repository::list_samples(conn)?)
}

fn require_sample(conn: &Connection, sample_id: i64) -> Result<Sample, CoreError> {
    repository::get_sample(conn, sample_id)?.ok_or_else(|| CoreError::not_found("sample", sample_id))
}

pub fn get_results(conn: &Connection, sample_id: i64) -> Result<Vec<ResultRow>, CoreError> {
    require_sample(conn, sample_id)?;
    Ok(repository::list_result_rows(conn, sample_id)?)
}

pub fn get_sample_detail(conn: &Connection, sample_id: i64) -> Result<SampleDetail, CoreError> {
    let sample = require_sample(conn, sample_id)?;
    let results = repository::list_result_rows(conn, sample_id)?;
    let abnormal_count = results.iter().filter(|r| r.is_abnormal()).count();
    Ok(SampleDetail {
        sample,
        results,
        abnormal_count,
    })
}

/// Mark results sent. Unknown ids are ignored; returns how many exist.
pub fn mark_sent(conn: &Connection, result_ids: &[i64]) -> Result<usize, CoreError> {
    let mut marked = 0;
    for &id in result_ids {
        marked += repository::mark_result_sent(conn, id)?;
    }
    if marked < result_ids.len() {
        tracing::debug!(
            requested = result_ids.len(),
            marked,
            "Some result ids did not exist"
        );
    }
    tracing::info!(marked, "Results marked sent");
    Ok(marked)
}

/// Mark every displayed result of a sample sent.
pub fn send_all(conn: &Connection, sample_id: i64) -> Result<usize, CoreError> {
    require_sample(conn, sample_id)?;
    let ids = repository::result_ids_for_sample(conn, sample_id)?;
    mark_sent(conn, &ids)
}

pub fn unsent_count(conn: &Connection) -> Result<i64, CoreError> {
    Ok(repository::count_unsent_results(conn)?)
}
