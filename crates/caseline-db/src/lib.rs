#[cfg(feature = "postgres")]
pub mod postgres;
#[cfg(feature = "sqlite")]
pub mod sqlite;

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use caseline_core::attachment::{Attachment, AttachmentBlob, CreateAttachment};
use caseline_core::case::Case;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Internal(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Where the database lives.
///
/// A `database_url` selects Postgres; otherwise SQLite is opened at
/// `sqlite_path`, or under the default data directory.
#[derive(Debug, Clone, Default)]
pub struct DbConfig {
    pub database_url: Option<String>,
    pub sqlite_path: Option<String>,
}

/// Storage for cases and confirmation attachments.
///
/// Lookups return `Ok(None)` for a missing row; `Err` is reserved for faults.
#[async_trait]
pub trait Database: Send + Sync {
    // -- Cases --
    async fn get_case(&self, case_id: &str) -> Result<Option<Case>, DbError>;
    /// Insert the case, or replace the stored one with the same `case_id`.
    async fn put_case(&self, case: &Case) -> Result<(), DbError>;

    // -- Attachments --
    async fn get_attachment_blob(
        &self,
        attachment_id: &str,
    ) -> Result<Option<AttachmentBlob>, DbError>;
    async fn insert_attachment(&self, input: &CreateAttachment) -> Result<Attachment, DbError>;
}

/// Open the backend selected by `config`.
pub async fn open_database(config: &DbConfig) -> Result<Arc<dyn Database>, DbError> {
    if let Some(url) = config.database_url.as_deref() {
        return open_postgres(url).await;
    }
    open_sqlite(config)
}

#[cfg(feature = "postgres")]
async fn open_postgres(url: &str) -> Result<Arc<dyn Database>, DbError> {
    tracing::info!("using postgres backend");
    Ok(Arc::new(postgres::PostgresDatabase::connect(url).await?))
}

#[cfg(not(feature = "postgres"))]
async fn open_postgres(_url: &str) -> Result<Arc<dyn Database>, DbError> {
    Err(DbError::Internal(
        "database_url is set but the 'postgres' feature is not enabled".into(),
    ))
}

#[cfg(feature = "sqlite")]
fn open_sqlite(config: &DbConfig) -> Result<Arc<dyn Database>, DbError> {
    let db = SqliteDatabase::open(config)?;
    Ok(Arc::new(db))
}

#[cfg(not(feature = "sqlite"))]
fn open_sqlite(_config: &DbConfig) -> Result<Arc<dyn Database>, DbError> {
    Err(DbError::Internal(
        "no database_url given and the 'sqlite' feature is not enabled".into(),
    ))
}

/// `$XDG_DATA_HOME/caseline`, falling back to `~/.local/share/caseline`.
pub fn data_dir() -> PathBuf {
    data_dir_from(
        std::env::var("XDG_DATA_HOME").ok(),
        std::env::var_os("HOME").map(PathBuf::from),
    )
}

fn data_dir_from(xdg_data_home: Option<String>, home: Option<PathBuf>) -> PathBuf {
    if let Some(xdg) = xdg_data_home {
        PathBuf::from(xdg).join("caseline")
    } else if let Some(home) = home {
        home.join(".local/share").join("caseline")
    } else {
        PathBuf::from("caseline")
    }
}
