use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};

use caseline_core::attachment::{Attachment, AttachmentBlob, CreateAttachment};

use super::super::{SqliteDatabase, SqliteResultExt};
use crate::DbError;

const ATTACHMENT_COLUMNS: &str = "attachment_id, case_id, filename, mime_type,
     (binary_data_base64 IS NOT NULL AND binary_data_base64 <> '') AS has_binary_data,
     created_at";

fn row_to_attachment(row: &Row) -> rusqlite::Result<Attachment> {
    Ok(Attachment {
        attachment_id: row.get("attachment_id")?,
        case_id: row.get("case_id")?,
        filename: row.get("filename")?,
        mime_type: row.get("mime_type")?,
        has_binary_data: row.get("has_binary_data")?,
        created_at: row.get("created_at")?,
    })
}

fn row_to_blob(row: &Row) -> rusqlite::Result<AttachmentBlob> {
    Ok(AttachmentBlob {
        binary_data_base64: row.get("binary_data_base64")?,
        filename: row.get("filename")?,
        mime_type: row.get("mime_type")?,
    })
}

impl SqliteDatabase {
    pub fn get_attachment_blob_sync(
        &self,
        attachment_id: &str,
    ) -> Result<Option<AttachmentBlob>, DbError> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT binary_data_base64, filename, mime_type
                 FROM confirmation_attachments WHERE attachment_id = ?1 LIMIT 1",
                params![attachment_id],
                row_to_blob,
            )
            .optional()
            .to_db()
        })
    }

    pub fn insert_attachment_sync(&self, input: &CreateAttachment) -> Result<Attachment, DbError> {
        self.with_conn(|conn| {
            let id = input
                .attachment_id
                .clone()
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
            let now = Utc::now().timestamp_millis();
            conn.execute(
                "INSERT INTO confirmation_attachments
                    (attachment_id, case_id, binary_data_base64, filename, mime_type, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    id,
                    input.case_id,
                    input.binary_data_base64,
                    input.filename,
                    input.mime_type,
                    now
                ],
            )
            .to_db()?;
            conn.query_row(
                &format!(
                    "SELECT {ATTACHMENT_COLUMNS} FROM confirmation_attachments WHERE attachment_id = ?1"
                ),
                params![id],
                row_to_attachment,
            )
            .to_db()
        })
    }
}
