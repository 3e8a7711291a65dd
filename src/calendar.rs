//! Calendar snapshot storage
//!
//! The calendar is one JSON blob: a map from date key (YYYY-MM-DD) to the
//! ordered events of that day. Reads return the latest stored snapshot or
//! an empty map; the overwrite path is transactional (delete-all, then
//! insert-one) and is the single place a storage error surfaces to the
//! user.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{Connection, params};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::warn;

/// One calendar event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEntry {
    pub id: String,
    pub title: String,
}

/// Date key (YYYY-MM-DD) to the day's events, in stored order
pub type CalendarEventMap = BTreeMap<String, Vec<CalendarEntry>>;

pub struct CalendarStore {
    conn: Mutex<Connection>,
}

impl CalendarStore {
    /// Open (or create) the store at the given path.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path).context("Failed to open calendar database")?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// In-memory store (for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn init_schema(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS calendar_snapshot (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                payload TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )?;
        Ok(())
    }

    /// Latest stored snapshot, or an empty map when none exists.
    pub async fn load(&self) -> Result<CalendarEventMap> {
        let conn = self.conn.lock().await;
        let payload: Option<String> = conn
            .query_row(
                "SELECT payload FROM calendar_snapshot ORDER BY id DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(other),
            })
            .context("Failed to read calendar snapshot")?;

        match payload {
            Some(raw) => {
                serde_json::from_str(&raw).context("Stored calendar snapshot is malformed")
            }
            None => Ok(CalendarEventMap::new()),
        }
    }

    /// Read degraded to an empty map on any failure; the recommendation
    /// pipeline must keep working without calendar data.
    pub async fn load_or_empty(&self) -> CalendarEventMap {
        match self.load().await {
            Ok(map) => map,
            Err(e) => {
                warn!("Calendar read degraded to empty map: {:#}", e);
                CalendarEventMap::new()
            }
        }
    }

    /// Overwrite the snapshot: delete all rows, insert one. Not an upsert,
    /// not an append. Errors roll back and propagate to the caller.
    pub async fn save(&self, map: &CalendarEventMap) -> Result<()> {
        let payload = serde_json::to_string(map).context("Failed to encode calendar snapshot")?;

        let mut conn = self.conn.lock().await;
        let tx = conn
            .transaction()
            .context("Failed to begin calendar transaction")?;
        tx.execute("DELETE FROM calendar_snapshot", [])?;
        tx.execute(
            "INSERT INTO calendar_snapshot (payload, updated_at) VALUES (?1, ?2)",
            params![payload, Utc::now().to_rfc3339()],
        )?;
        tx.commit().context("Failed to commit calendar snapshot")?;
        Ok(())
    }
}
