//! Connection sources, the storage seam every operation goes through.
//!
//! A command acquires one connection from the source, runs to completion and
//! drops it. Two implementations: a SQLite file on disk, and a named
//! shared-cache in-memory database for tests and throwaway sessions.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use rusqlite::{Connection, OpenFlags};

use super::sqlite::{configure_pragmas, open_database, run_migrations};
use super::DatabaseError;

/// Hands out ready-to-use connections (pragmas applied, schema current).
pub trait ConnectionSource: Send + Sync {
    fn open(&self) -> Result<Connection, DatabaseError>;

    /// Human-readable location, for logs.
    fn describe(&self) -> String;
}

/// SQLite database file on disk.
pub struct FileDatabase {
    path: PathBuf,
}

impl FileDatabase {
    /// Create parent directories and bring the schema up to date.
    pub fn create(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| DatabaseError::MigrationFailed {
                    version: 0,
                    reason: format!("cannot create {}: {e}", parent.display()),
                })?;
            }
        }
        open_database(path)?;
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConnectionSource for FileDatabase {
    fn open(&self) -> Result<Connection, DatabaseError> {
        let conn = Connection::open(&self.path)?;
        configure_pragmas(&conn)?;
        Ok(conn)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

static NEXT_MEMORY_DB: AtomicU64 = AtomicU64::new(0);

/// Named in-memory database shared by every connection opened from it.
///
/// The anchor connection keeps the database alive; it is dropped together
/// with the source.
pub struct SharedMemoryDatabase {
    uri: String,
    _anchor: Mutex<Connection>,
}

impl SharedMemoryDatabase {
    pub fn new() -> Result<Self, DatabaseError> {
        let n = NEXT_MEMORY_DB.fetch_add(1, Ordering::Relaxed);
        let uri = format!(
            "file:analyzer-sim-{}-{n}?mode=memory&cache=shared",
            std::process::id()
        );
        let anchor = open_uri(&uri)?;
        run_migrations(&anchor)?;
        Ok(Self {
            uri,
            _anchor: Mutex::new(anchor),
        })
    }
}

impl ConnectionSource for SharedMemoryDatabase {
    fn open(&self) -> Result<Connection, DatabaseError> {
        open_uri(&self.uri)
    }

    fn describe(&self) -> String {
        self.uri.clone()
    }
}

fn open_uri(uri: &str) -> Result<Connection, DatabaseError> {
    let conn = Connection::open_with_flags(
        uri,
        OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )?;
    configure_pragmas(&conn)?;
    Ok(conn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::count_tables;

    #[test]
    fn memory_source_shares_data_between_connections() {
        let source = SharedMemoryDatabase::new().unwrap();
        {
            let conn = source.open().unwrap();
            conn.execute("INSERT INTO analyzers (name) VALUES ('Shared')", [])
                .unwrap();
        }
        let conn = source.open().unwrap();
        let name: String = conn
            .query_row("SELECT name FROM analyzers", [], |row| row.get(0))
            .unwrap();
        assert_eq!(name, "Shared");
    }

    #[test]
    fn memory_sources_are_isolated() {
        let a = SharedMemoryDatabase::new().unwrap();
        let b = SharedMemoryDatabase::new().unwrap();
        a.open()
            .unwrap()
            .execute("INSERT INTO analyzers (name) VALUES ('OnlyInA')", [])
            .unwrap();
        let count: i64 = b
            .open()
            .unwrap()
            .query_row("SELECT COUNT(*) FROM analyzers", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn file_source_creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("analyzersim.db");
        let source = FileDatabase::create(&path).unwrap();
        assert!(path.exists());
        let conn = source.open().unwrap();
        assert_eq!(count_tables(&conn).unwrap(), 7);
        assert!(source.describe().ends_with("analyzersim.db"));
    }
}
