pub(crate) mod migrations;
pub mod queries;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::Connection;
use serde::de::DeserializeOwned;

use caseline_core::attachment::{Attachment, AttachmentBlob, CreateAttachment};
use caseline_core::case::Case;

use crate::{Database, DbConfig, DbError};

/// Extension trait that converts `rusqlite::Result<T>` into `Result<T, DbError>`.
pub(crate) trait SqliteResultExt<T> {
    fn to_db(self) -> Result<T, DbError>;
}

impl<T> SqliteResultExt<T> for rusqlite::Result<T> {
    fn to_db(self) -> Result<T, DbError> {
        self.map_err(map_sqlite_err)
    }
}

#[derive(Clone)]
pub struct SqliteDatabase {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteDatabase {
    pub fn open(config: &DbConfig) -> Result<Self, DbError> {
        let path = config
            .sqlite_path
            .as_deref()
            .map(PathBuf::from)
            .unwrap_or_else(|| crate::data_dir().join("caseline.db"));
        std::fs::create_dir_all(path.parent().unwrap_or(Path::new(".")))?;
        Self::open_path(&path)
    }

    pub fn open_path(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path).to_db()?;
        conn.execute_batch(
            "PRAGMA journal_mode=WAL;
             PRAGMA foreign_keys=ON;
             PRAGMA busy_timeout=5000;",
        )
        .to_db()?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory().to_db()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;").to_db()?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    pub(crate) fn with_conn<F, T>(&self, f: F) -> Result<T, DbError>
    where
        F: FnOnce(&Connection) -> Result<T, DbError>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|_| DbError::Internal("lock poisoned".into()))?;
        f(&conn)
    }

    fn run_migrations(&self) -> Result<(), DbError> {
        self.with_conn(migrations::run)
    }
}

/// Map a `rusqlite::Error` into a `DbError::Internal`.
pub(crate) fn map_sqlite_err(e: rusqlite::Error) -> DbError {
    DbError::Internal(e.to_string())
}

/// Parse a JSON text column. Malformed content reads as absent.
pub(crate) fn parse_json_column<T: DeserializeOwned>(column: &str, raw: Option<String>) -> Option<T> {
    let raw = raw?;
    match serde_json::from_str(&raw) {
        Ok(v) => Some(v),
        Err(e) => {
            tracing::warn!("ignoring malformed json in column {column}: {e}");
            None
        }
    }
}

pub(crate) fn to_json_column<T: serde::Serialize>(value: Option<&T>) -> Result<Option<String>, DbError> {
    value
        .map(serde_json::to_string)
        .transpose()
        .map_err(|e| DbError::Internal(format!("json encode: {e}")))
}


#[async_trait]
impl Database for SqliteDatabase {
    // -- Cases --
    async fn get_case(&self, case_id: &str) -> Result<Option<Case>, DbError> {
        let db = self.clone();
        let case_id = case_id.to_string();
        tokio::task::spawn_blocking(move || db.get_case_sync(&case_id))
            .await
            .map_err(|e| DbError::Internal(e.to_string()))?
    }
    async fn put_case(&self, case: &Case) -> Result<(), DbError> {
        let db = self.clone();
        let case = case.clone();
        tokio::task::spawn_blocking(move || db.put_case_sync(&case))
            .await
            .map_err(|e| DbError::Internal(e.to_string()))?
    }

    // -- Attachments --
    async fn get_attachment_blob(
        &self,
        attachment_id: &str,
    ) -> Result<Option<AttachmentBlob>, DbError> {
        let db = self.clone();
        let attachment_id = attachment_id.to_string();
        tokio::task::spawn_blocking(move || db.get_attachment_blob_sync(&attachment_id))
            .await
            .map_err(|e| DbError::Internal(e.to_string()))?
    }
    async fn insert_attachment(&self, input: &CreateAttachment) -> Result<Attachment, DbError> {
        let db = self.clone();
        let input = input.clone();
        tokio::task::spawn_blocking(move || db.insert_attachment_sync(&input))
            .await
            .map_err(|e| DbError::Internal(e.to_string()))?
    }
}
