//! Shared application state handed to every command.
//!
//! Holds the injected connection source, the simulator configuration, the
//! currently selected analyzer, the progress scheduler of the current run
//! and the random source used for result synthesis. Mutexes give interior
//! mutability so the state can sit in an `Arc` next to the run driver; the
//! engine still assumes a single logical caller.

use std::fmt::Display;
use std::sync::{Mutex, MutexGuard};

use rand::rngs::StdRng;
use rand::SeedableRng;
use rusqlite::Connection;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::config::SimulatorConfig;
use crate::db::{self, ConnectionSource, DatabaseError, FileDatabase, SharedMemoryDatabase};
use crate::models::Analyzer;
use crate::scheduler::ProgressScheduler;

// ═══════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
    #[error("Internal lock error")]
    LockPoisoned,
}

impl CoreError {
    pub fn validation(message: impl Into<String>) -> Self {
        CoreError::Validation(message.into())
    }

    pub fn not_found(entity: &str, id: impl Display) -> Self {
        CoreError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Error class reported to the presentation layer.
    pub fn kind(&self) -> &'static str {
        match self {
            CoreError::Validation(_) => "validation",
            CoreError::NotFound { .. } | CoreError::Database(DatabaseError::NotFound { .. }) => {
                "not_found"
            }
            CoreError::Database(_) => "persistence",
            CoreError::LockPoisoned => "internal",
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Database(DatabaseError::Sqlite(err))
    }
}

impl Serialize for CoreError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("CoreError", 2)?;
        s.serialize_field("kind", self.kind())?;
        s.serialize_field("message", &self.to_string())?;
        s.end()
    }
}

// ═══════════════════════════════════════════════════════════
// CoreState
// ═══════════════════════════════════════════════════════════

/// The scheduler of the current run and the analyzer it generates for.
#[derive(Debug, Default)]
pub struct RunSession {
    pub scheduler: ProgressScheduler,
    pub analyzer_id: Option<i64>,
}

pub struct CoreState {
    source: Box<dyn ConnectionSource>,
    config: SimulatorConfig,
    selected: Mutex<Option<Analyzer>>,
    run: Mutex<RunSession>,
    rng: Mutex<StdRng>,
}

impl CoreState {
    /// File-backed state at `config.database_path`.
    pub fn new(config: SimulatorConfig) -> Result<Self, CoreError> {
        let source = FileDatabase::create(&config.database_path)?;
        Self::with_source(Box::new(source), config)
    }

    /// State over a private in-memory database.
    pub fn in_memory(config: SimulatorConfig) -> Result<Self, CoreError> {
        let source = SharedMemoryDatabase::new()?;
        Self::with_source(Box::new(source), config)
    }

    /// Wrap any connection source; seeds default analyzers on first use.
    pub fn with_source(
        source: Box<dyn ConnectionSource>,
        config: SimulatorConfig,
    ) -> Result<Self, CoreError> {
        {
            let conn = source.open()?;
            db::run_migrations(&conn)?;
            db::seed::seed_defaults(&conn)?;
        }

        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        tracing::info!(
            database = %source.describe(),
            orphan_policy = %config.orphan_policy,
            seeded_rng = config.rng_seed.is_some(),
            "Simulator state ready"
        );

        Ok(Self {
            source,
            config,
            selected: Mutex::new(None),
            run: Mutex::new(RunSession::default()),
            rng: Mutex::new(rng),
        })
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    /// Open a connection for one operation. Dropping it releases it.
    pub fn open_db(&self) -> Result<Connection, CoreError> {
        Ok(self.source.open()?)
    }

    // ── Analyzer selection ──────────────────────────────────

    pub fn selected_analyzer(&self) -> Result<Option<Analyzer>, CoreError> {
        let guard = self.selected.lock().map_err(|_| CoreError::LockPoisoned)?;
        Ok(guard.clone())
    }

    pub fn set_selected_analyzer(&self, analyzer: Analyzer) -> Result<(), CoreError> {
        let mut guard = self.selected.lock().map_err(|_| CoreError::LockPoisoned)?;
        *guard = Some(analyzer);
        Ok(())
    }

    /// The selected analyzer, or a validation error when none is selected.
    pub fn require_selected_analyzer(&self) -> Result<Analyzer, CoreError> {
        self.selected_analyzer()?
            .ok_or_else(|| CoreError::validation("Please select an analyzer first"))
    }

    // ── Run and randomness ──────────────────────────────────

    pub fn lock_run(&self) -> Result<MutexGuard<'_, RunSession>, CoreError> {
        self.run.lock().map_err(|_| CoreError::LockPoisoned)
    }

    pub fn with_rng<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> Result<T, CoreError> {
        let mut rng = self.rng.lock().map_err(|_| CoreError::LockPoisoned)?;
        Ok(f(&mut rng))
    }
}
