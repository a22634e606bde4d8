pub mod migrations;
pub mod queries;

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use caseline_core::attachment::{Attachment, AttachmentBlob, CreateAttachment};
use caseline_core::case::Case;

use crate::{Database, DbError};

/// Map a sqlx::Error into a DbError::Internal.
pub(crate) fn pg_err(e: sqlx::Error) -> DbError {
    DbError::Internal(e.to_string())
}

#[derive(Clone)]
pub struct PostgresDatabase {
    pub(crate) pool: PgPool,
}

impl PostgresDatabase {
    /// Connect to a Postgres database and run migrations.
    pub async fn connect(url: &str) -> Result<Self, DbError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(url)
            .await
            .map_err(pg_err)?;

        let db = Self { pool };
        migrations::run(&db.pool).await?;
        Ok(db)
    }
}

#[async_trait]
impl Database for PostgresDatabase {
    // -- Cases --
    async fn get_case(&self, case_id: &str) -> Result<Option<Case>, DbError> {
        self.pg_get_case(case_id).await
    }
    async fn put_case(&self, case: &Case) -> Result<(), DbError> {
        self.pg_put_case(case).await
    }

    // -- Attachments --
    async fn get_attachment_blob(
        &self,
        attachment_id: &str,
    ) -> Result<Option<AttachmentBlob>, DbError> {
        self.pg_get_attachment_blob(attachment_id).await
    }
    async fn insert_attachment(&self, input: &CreateAttachment) -> Result<Attachment, DbError> {
        self.pg_insert_attachment(input).await
    }
}
