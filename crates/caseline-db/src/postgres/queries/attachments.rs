use chrono::Utc;

use caseline_core::attachment::{Attachment, AttachmentBlob, CreateAttachment};

use super::super::{pg_err, PostgresDatabase};
use crate::DbError;

#[derive(sqlx::FromRow)]
struct AttachmentRow {
    attachment_id: String,
    case_id: Option<String>,
    filename: Option<String>,
    mime_type: Option<String>,
    has_binary_data: bool,
    created_at: i64,
}

impl From<AttachmentRow> for Attachment {
    fn from(r: AttachmentRow) -> Self {
        Attachment {
            attachment_id: r.attachment_id,
            case_id: r.case_id,
            filename: r.filename,
            mime_type: r.mime_type,
            has_binary_data: r.has_binary_data,
            created_at: r.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct BlobRow {
    binary_data_base64: Option<String>,
    filename: Option<String>,
    mime_type: Option<String>,
}

impl From<BlobRow> for AttachmentBlob {
    fn from(r: BlobRow) -> Self {
        AttachmentBlob {
            binary_data_base64: r.binary_data_base64,
            filename: r.filename,
            mime_type: r.mime_type,
        }
    }
}

impl PostgresDatabase {
    pub(crate) async fn pg_get_attachment_blob(
        &self,
        attachment_id: &str,
    ) -> Result<Option<AttachmentBlob>, DbError> {
        let row = sqlx::query_as::<_, BlobRow>(
            "SELECT binary_data_base64, filename, mime_type
             FROM confirmation_attachments WHERE attachment_id = $1 LIMIT 1",
        )
        .bind(attachment_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(pg_err)?;

        Ok(row.map(AttachmentBlob::from))
    }

    pub(crate) async fn pg_insert_attachment(
        &self,
        input: &CreateAttachment,
    ) -> Result<Attachment, DbError> {
        let id = input
            .attachment_id
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        let now = Utc::now().timestamp_millis();

        let row = sqlx::query_as::<_, AttachmentRow>(
            "INSERT INTO confirmation_attachments
                (attachment_id, case_id, binary_data_base64, filename, mime_type, created_at)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING attachment_id, case_id, filename, mime_type,
                (binary_data_base64 IS NOT NULL AND binary_data_base64 <> '') AS has_binary_data,
                created_at",
        )
        .bind(&id)
        .bind(&input.case_id)
        .bind(&input.binary_data_base64)
        .bind(&input.filename)
        .bind(&input.mime_type)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(pg_err)?;

        Ok(row.into())
    }
}
