//! Stored samples, their results, and the sent flag.

use crate::core_state::{CoreError, CoreState};
use crate::ledger::{self, SampleDetail};
use crate::models::{ResultRow, Sample};

pub fn list_samples(state: &CoreState) -> Result<Vec<Sample>, CoreError> {
    let conn = state.open_db()?;
    ledger::list_samples(&conn)
}

pub fn get_sample_results(sample_id: i64, state: &CoreState) -> Result<Vec<ResultRow>, CoreError> {
    let conn = state.open_db()?;
    ledger::get_results(&conn, sample_id)
}

pub fn get_sample_detail(sample_id: i64, state: &CoreState) -> Result<SampleDetail, CoreError> {
    let conn = state.open_db()?;
    ledger::get_sample_detail(&conn, sample_id)
}

pub fn mark_results_sent(result_ids: Vec<i64>, state: &CoreState) -> Result<usize, CoreError> {
    let conn = state.open_db()?;
    ledger::mark_sent(&conn, &result_ids)
}

pub fn send_all_results(sample_id: i64, state: &CoreState) -> Result<usize, CoreError> {
    let conn = state.open_db()?;
    ledger::send_all(&conn, sample_id)
}

pub fn count_unsent_results(state: &CoreState) -> Result<i64, CoreError> {
    let conn = state.open_db()?;
    ledger::unsent_count(&conn)
}
