//! Host timer for runs: ticks the current run on a fixed interval until it
//! leaves the running state.

use std::sync::Arc;
use std::time::Duration;

use crate::commands::run::{self, RunTick};
use crate::core_state::{CoreError, CoreState};

/// Tick until the run completes or is cancelled. Returns every tick that
/// made a sample current. On a failed tick the run stays on its pending
/// sample, so a later driver resumes it.
pub async fn drive_run(state: Arc<CoreState>, period: Duration) -> Result<Vec<RunTick>, CoreError> {
    let mut timer = tokio::time::interval(period);
    timer.tick().await; // Consume initial immediate tick

    let mut ticks = Vec::new();
    loop {
        timer.tick().await;
        if !run::current_state(&state)?.is_running() {
            break;
        }
        let tick = run::tick(&state).map_err(|e| {
            tracing::warn!(error = %e, "Run driver stopped on failed tick");
            e
        })?;
        let still_running = tick.report.state.is_running();
        if tick.report.current.is_some() {
            ticks.push(tick);
        }
        if !still_running {
            break;
        }
    }

    tracing::info!(processed = ticks.len(), "Run driver finished");
    Ok(ticks)
}

/// Spawn [`drive_run`] with the configured tick interval.
pub fn spawn_run_driver(
    state: Arc<CoreState>,
) -> tokio::task::JoinHandle<Result<Vec<RunTick>, CoreError>> {
    let period = state.config().tick_interval;
    tokio::spawn(drive_run(state, period))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{results, samples, test_support};
    use crate::models::SampleEntry;
    use crate::scheduler::RunState;

    #[tokio::test]
    async fn drives_run_to_completion() {
        let state = Arc::new(test_support::selected_state());
        samples::start_analysis(
            vec![SampleEntry::new("S001", "", ""), SampleEntry::new("S002", "", "")],
            &state,
        )
        .unwrap();

        let ticks = drive_run(state.clone(), Duration::from_millis(5)).await.unwrap();
        let order: Vec<String> = ticks
            .iter()
            .filter_map(|t| t.report.current.clone())
            .collect();
        assert_eq!(order, vec!["S001", "S002"]);
        assert_eq!(run::current_state(&state).unwrap(), RunState::Completed { total: 2 });
        assert_eq!(results::count_unsent_results(&state).unwrap(), 6);
    }

    #[tokio::test]
    async fn idle_scheduler_returns_immediately() {
        let state = Arc::new(test_support::selected_state());
        let ticks = drive_run(state, Duration::from_millis(5)).await.unwrap();
        assert!(ticks.is_empty());
    }

    #[tokio::test]
    async fn cancelled_run_stops_driver() {
        let state = Arc::new(test_support::selected_state());
        run::start_run(vec!["A".into(), "B".into(), "C".into()], &state).unwrap();
        run::tick(&state).unwrap();
        run::cancel_run(&state).unwrap();

        let ticks = drive_run(state, Duration::from_millis(5)).await.unwrap();
        assert!(ticks.is_empty());
    }

    #[tokio::test]
    async fn failed_tick_leaves_run_resumable() {
        let state = Arc::new(test_support::selected_state());
        let conn = state.open_db().unwrap();
        let wide = crate::db::repository::insert_test(
            &conn,
            1,
            &crate::models::NewTest {
                code: "WIDE".into(),
                unit: "u".into(),
                lower: -1e308,
                upper: 1e308,
            },
        )
        .unwrap();
        samples::start_analysis(vec![SampleEntry::new("S001", "", "")], &state).unwrap();

        let err = drive_run(state.clone(), Duration::from_millis(5)).await.unwrap_err();
        assert_eq!(err.kind(), "validation");
        assert_eq!(run::current_state(&state).unwrap(), RunState::Running { index: 0, total: 1 });

        crate::db::repository::delete_test(&conn, wide).unwrap();
        let ticks = drive_run(state.clone(), Duration::from_millis(5)).await.unwrap();
        assert_eq!(ticks.len(), 1);
        assert_eq!(run::current_state(&state).unwrap(), RunState::Completed { total: 1 });
    }

    #[tokio::test]
    async fn spawned_driver_uses_config_interval() {
        let state = Arc::new(test_support::selected_state());
        run::start_run(vec!["S001".into()], &state).unwrap();
        // 1s default period; one tick completes the run
        let ticks = spawn_run_driver(state).await.unwrap().unwrap();
        assert_eq!(ticks.len(), 1);
    }
}
