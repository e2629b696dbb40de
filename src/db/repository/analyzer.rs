use rusqlite::{params, Connection, OptionalExtension};

use crate::db::DatabaseError;
use crate::models::Analyzer;

pub fn insert_analyzer(conn: &Connection, name: &str) -> Result<i64, DatabaseError> {
    conn.execute("INSERT INTO analyzers (name) VALUES (?1)", params![name])
        .map_err(DatabaseError::from_write)?;
    Ok(conn.last_insert_rowid())
}

pub fn list_analyzers(conn: &Connection) -> Result<Vec<Analyzer>, DatabaseError> {
    let mut stmt = conn.prepare("SELECT id, name FROM analyzers ORDER BY id")?;
    let rows = stmt
        .query_map([], |row| {
            Ok(Analyzer {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn get_analyzer(conn: &Connection, id: i64) -> Result<Option<Analyzer>, DatabaseError> {
    let analyzer = conn
        .query_row(
            "SELECT id, name FROM analyzers WHERE id = ?1",
            params![id],
            |row| {
                Ok(Analyzer {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            },
        )
        .optional()?;
    Ok(analyzer)
}

pub fn count_analyzers(conn: &Connection) -> Result<i64, DatabaseError> {
    let count = conn.query_row("SELECT COUNT(*) FROM analyzers", [], |row| row.get(0))?;
    Ok(count)
}
