use anyhow::{anyhow, Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use crate::entities::EntityKind;
use crate::store::ObjectStore;

/// SQLite-backed object store
///
/// One `objects` table holds every kind as a JSON document. The timestamp
/// columns mirror the document so the table stays inspectable from sqlite3.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database {:?}", path))?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        setup_database(&conn)?;
        Ok(SqliteStore {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("sqlite connection lock poisoned"))
    }
}

pub fn setup_database(conn: &Connection) -> Result<()> {
    // Enable WAL mode for crash recovery (in-memory databases report "memory")
    conn.pragma_update(None, "journal_mode", "WAL")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS objects (
            kind TEXT NOT NULL,
            id TEXT NOT NULL,
            data TEXT NOT NULL,
            created_at TEXT,
            updated_at TEXT,
            PRIMARY KEY (kind, id)
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_objects_kind ON objects(kind)",
        [],
    )?;

    Ok(())
}

fn parse_document(kind: EntityKind, data: &str) -> Result<Value> {
    serde_json::from_str(data).with_context(|| format!("Failed to parse {} document", kind))
}

impl ObjectStore for SqliteStore {
    fn all(&self, kind: EntityKind) -> Result<Vec<Value>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare_cached(
            "SELECT data FROM objects
             WHERE kind = ?1
             ORDER BY rowid",
        )?;

        let rows = stmt
            .query_map([kind.as_str()], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        rows.iter().map(|data| parse_document(kind, data)).collect()
    }

    fn get(&self, kind: EntityKind, id: &str) -> Result<Option<Value>> {
        let conn = self.lock()?;
        let data: Option<String> = conn
            .query_row(
                "SELECT data FROM objects WHERE kind = ?1 AND id = ?2",
                params![kind.as_str(), id],
                |row| row.get(0),
            )
            .optional()?;

        data.map(|data| parse_document(kind, &data)).transpose()
    }

    fn put(&self, kind: EntityKind, id: &str, document: Value) -> Result<()> {
        let created_at = document.get("created_at").and_then(Value::as_str).map(str::to_string);
        let updated_at = document.get("updated_at").and_then(Value::as_str).map(str::to_string);
        let data = serde_json::to_string(&document)?;

        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO objects (kind, id, data, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(kind, id) DO UPDATE SET
                data = excluded.data,
                created_at = excluded.created_at,
                updated_at = excluded.updated_at",
            params![kind.as_str(), id, data, created_at, updated_at],
        )?;

        Ok(())
    }

    fn delete(&self, kind: EntityKind, id: &str) -> Result<bool> {
        let conn = self.lock()?;
        let removed = conn.execute(
            "DELETE FROM objects WHERE kind = ?1 AND id = ?2",
            params![kind.as_str(), id],
        )?;

        Ok(removed > 0)
    }

    fn commit(&self) -> Result<()> {
        // Statements run in autocommit mode; this only releases cached statements
        let conn = self.lock()?;
        conn.flush_prepared_statement_cache();
        Ok(())
    }

    fn count(&self, kind: EntityKind) -> Result<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM objects WHERE kind = ?1",
            [kind.as_str()],
            |row| row.get(0),
        )?;

        Ok(count as usize)
    }
}
