//! Progress scheduler: a state machine over a fixed sample list.
//!
//! The host timer calls [`ProgressScheduler::tick`]; each tick makes the
//! next sample current. Nothing here touches storage.

use serde::{Deserialize, Serialize};

use crate::core_state::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RunState {
    #[default]
    Idle,
    /// `index` samples have been processed so far.
    Running { index: usize, total: usize },
    Completed { total: usize },
}

impl RunState {
    pub fn is_running(&self) -> bool {
        matches!(self, RunState::Running { .. })
    }

    /// Share of the run processed, 0 to 100.
    pub fn percent(&self) -> u8 {
        match *self {
            RunState::Idle => 0,
            RunState::Running { index, total } if total > 0 => (index * 100 / total) as u8,
            RunState::Running { .. } => 0,
            RunState::Completed { .. } => 100,
        }
    }
}

/// What one tick did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickReport {
    /// Sample made current by this tick, `None` when the run was not active.
    pub current: Option<String>,
    pub state: RunState,
}

#[derive(Debug, Default)]
pub struct ProgressScheduler {
    samples: Vec<String>,
    state: RunState,
}

impl ProgressScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn samples(&self) -> &[String] {
        &self.samples
    }

    /// Sample the next tick will make current, if a run is active.
    pub fn pending(&self) -> Option<&str> {
        match self.state {
            RunState::Running { index, .. } => self.samples.get(index).map(String::as_str),
            _ => None,
        }
    }

    /// Begin a run. Idle and completed schedulers may start again.
    pub fn start(&mut self, samples: Vec<String>) -> Result<RunState, CoreError> {
        if self.state.is_running() {
            return Err(CoreError::validation("A run is already in progress"));
        }
        if samples.is_empty() {
            return Err(CoreError::validation("Please enter at least one sample ID"));
        }
        self.state = RunState::Running {
            index: 0,
            total: samples.len(),
        };
        self.samples = samples;
        tracing::info!(samples = self.samples.len(), "Run started");
        Ok(self.state)
    }

    pub fn tick(&mut self) -> TickReport {
        let RunState::Running { index, total } = self.state else {
            return TickReport {
                current: None,
                state: self.state,
            };
        };

        let current = self.samples.get(index).cloned();
        let next = index + 1;
        self.state = if next >= total {
            tracing::info!(total, "Run completed");
            RunState::Completed { total }
        } else {
            RunState::Running { index: next, total }
        };
        tracing::debug!(sample = ?current, progress = self.state.percent(), "Tick");

        TickReport {
            current,
            state: self.state,
        }
    }

    /// Stop a running run. Returns how many samples had been processed, or
    /// `None` when nothing was running.
    pub fn cancel(&mut self) -> Option<usize> {
        let RunState::Running { index, total } = self.state else {
            return None;
        };
        self.state = RunState::Idle;
        self.samples.clear();
        tracing::info!(processed = index, total, "Run cancelled");
        Some(index)
    }
}
