//! SQLite-backed lock registry.
//!
//! Reads three tables:
//! - `locks(lock_id, last_battery_check)`
//! - `lock_user_mapping(lock_id, user_id, fcm_id)`
//! - `notification_opens(campaign_tag, user_id, lock_id)`

use rusqlite::types::Value;
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};
use tracing::debug;

use super::DataSource;
use crate::error::SourceError;
use crate::lock::{LockRecord, LockUser};

pub struct LiveSource {
    conn: Connection,
    path: PathBuf,
}

impl LiveSource {
    /// Open an existing registry.
    ///
    /// # Errors
    /// Returns [`SourceError::NotFound`] if the file does not exist, or
    /// [`SourceError::OpenFailed`] if SQLite cannot open it.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            return Err(SourceError::NotFound(path));
        }
        Self::connect(path)
    }

    /// Open a registry, creating the file and tables if needed.
    pub fn open_or_create(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| SourceError::Unavailable(format!("{}: {e}", parent.display())))?;
            }
        }
        let source = Self::connect(path)?;
        source.ensure_schema()?;
        Ok(source)
    }

    /// Open an in-memory registry with the tables created.
    pub fn open_memory() -> Result<Self, SourceError> {
        let path = PathBuf::from(":memory:");
        let conn = Connection::open_in_memory().map_err(|source| SourceError::OpenFailed {
            path: path.clone(),
            source,
        })?;
        let source = Self { conn, path };
        source.ensure_schema()?;
        Ok(source)
    }

    fn connect(path: PathBuf) -> Result<Self, SourceError> {
        let conn = Connection::open(&path).map_err(|source| SourceError::OpenFailed {
            path: path.clone(),
            source,
        })?;
        Ok(Self { conn, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the registry tables if they don't exist.
    pub fn ensure_schema(&self) -> Result<(), SourceError> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS locks (
                lock_id            TEXT PRIMARY KEY,
                last_battery_check TEXT
            );

            CREATE TABLE IF NOT EXISTS lock_user_mapping (
                lock_id TEXT NOT NULL,
                user_id TEXT NOT NULL,
                fcm_id  TEXT NOT NULL DEFAULT '',
                PRIMARY KEY (lock_id, user_id)
            );

            CREATE TABLE IF NOT EXISTS notification_opens (
                campaign_tag TEXT NOT NULL,
                user_id      TEXT NOT NULL,
                lock_id      TEXT NOT NULL,
                opened_at    TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            );

            CREATE INDEX IF NOT EXISTS idx_lock_user_mapping_lock_id
                ON lock_user_mapping(lock_id);
            CREATE INDEX IF NOT EXISTS idx_notification_opens_tag
                ON notification_opens(campaign_tag);",
        )?;
        Ok(())
    }

    pub fn upsert_lock(&self, lock: &LockRecord) -> Result<(), SourceError> {
        self.conn.execute(
            "INSERT INTO locks (lock_id, last_battery_check) VALUES (?1, ?2)
             ON CONFLICT(lock_id) DO UPDATE SET last_battery_check = excluded.last_battery_check",
            params![lock.lock_id, lock.last_battery_check],
        )?;
        Ok(())
    }

    pub fn assign_user(&self, lock_id: &str, user: &LockUser) -> Result<(), SourceError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO lock_user_mapping (lock_id, user_id, fcm_id)
             VALUES (?1, ?2, ?3)",
            params![lock_id, user.user_id, user.push_token],
        )?;
        Ok(())
    }

    pub fn record_open(
        &self,
        campaign_tag: &str,
        user_id: &str,
        lock_id: &str,
    ) -> Result<(), SourceError> {
        self.conn.execute(
            "INSERT INTO notification_opens (campaign_tag, user_id, lock_id) VALUES (?1, ?2, ?3)",
            params![campaign_tag, user_id, lock_id],
        )?;
        Ok(())
    }
}

/// Render whatever the registry stored as text; the filter decides if it's usable.
fn value_to_text(value: Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Integer(i) => i.to_string(),
        Value::Real(r) => r.to_string(),
        Value::Text(s) => s,
        Value::Blob(b) => String::from_utf8_lossy(&b).into_owned(),
    }
}

impl DataSource for LiveSource {
    fn name(&self) -> &str {
        "live"
    }

    fn locks(&self) -> Result<Vec<LockRecord>, SourceError> {
        let mut stmt = self
            .conn
            .prepare("SELECT lock_id, last_battery_check FROM locks ORDER BY rowid")?;
        let rows = stmt.query_map([], |row| {
            Ok(LockRecord {
                lock_id: row.get(0)?,
                last_battery_check: value_to_text(row.get(1)?),
            })
        })?;

        let locks = rows.collect::<Result<Vec<_>, _>>()?;
        debug!(count = locks.len(), path = %self.path.display(), "loaded locks from registry");
        Ok(locks)
    }

    fn users_for_lock(&self, lock_id: &str) -> Result<Vec<LockUser>, SourceError> {
        let mut stmt = self.conn.prepare(
            "SELECT user_id, fcm_id FROM lock_user_mapping WHERE lock_id = ?1 ORDER BY rowid",
        )?;
        let rows = stmt.query_map(params![lock_id], |row| {
            Ok(LockUser {
                user_id: row.get(0)?,
                push_token: row.get(1)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn recorded_opens(&self, campaign_tag: &str) -> Result<Vec<(String, String)>, SourceError> {
        let mut stmt = self.conn.prepare(
            "SELECT user_id, lock_id FROM notification_opens
             WHERE campaign_tag = ?1 ORDER BY rowid",
        )?;
        let rows = stmt.query_map(params![campaign_tag], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}
