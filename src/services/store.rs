// src/services/store.rs
use std::path::Path;
use std::sync::{Arc, Mutex};

use rusqlite::{Connection, params};
use thiserror::Error;
use tracing::info;

use crate::message::HistoryMessage;

/// History fetches are truncated to this many rows no matter what the caller
/// asks for.
pub const MAX_HISTORY_LIMIT: i64 = 200;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("database task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// One exchange waiting to be appended to the log.
#[derive(Debug, Clone)]
pub struct NewChatRecord {
    pub session_id: String,
    pub user_message: String,
    pub bot_response: String,
    pub lang_code: String,
    pub created_at: String,
}

/// Append-only log of chat exchanges backed by SQLite. Rows are never
/// updated or deleted; ascending rowid defines conversation order.
#[derive(Clone)]
pub struct ChatStore {
    conn: Arc<Mutex<Connection>>,
}

impl ChatStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        info!("opening chat store at {}", path.display());
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        Self::from_connection(conn)
    }

    pub fn in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        ensure_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Appends one immutable row and returns its id.
    pub async fn insert(&self, record: NewChatRecord) -> Result<i64, StoreError> {
        self.call(move |conn| {
            conn.execute(
                "INSERT INTO chats (session_id, user_message, bot_response, lang_code, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    record.session_id,
                    record.user_message,
                    record.bot_response,
                    record.lang_code,
                    record.created_at
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
    }

    /// Rows for a session in insertion order, truncated to `limit`
    /// (clamped to [1, MAX_HISTORY_LIMIT]).
    pub async fn fetch(
        &self,
        session_id: &str,
        limit: i64,
    ) -> Result<Vec<HistoryMessage>, StoreError> {
        let session_id = session_id.to_string();
        let limit = limit.clamp(1, MAX_HISTORY_LIMIT);
        self.call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT user_message, bot_response, lang_code, created_at
                 FROM chats WHERE session_id = ?1 ORDER BY id ASC LIMIT ?2",
            )?;
            let rows = stmt
                .query_map(params![session_id, limit], |row| {
                    Ok(HistoryMessage {
                        user_message: row.get(0)?,
                        bot_response: row.get(1)?,
                        lang_code: row.get(2)?,
                        created_at: row.get(3)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
        .await
    }

    async fn call<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, StoreError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn.lock().expect("chat store mutex poisoned");
            f(&guard)
        })
        .await?
    }
}

fn ensure_schema(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS chats (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            session_id TEXT,
            user_message TEXT,
            bot_response TEXT,
            lang_code TEXT,
            created_at TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_chats_session ON chats(session_id);",
    )
}
