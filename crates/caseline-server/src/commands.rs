//! One-shot maintenance commands run from the server binary.

use std::path::Path;

use anyhow::{Context, Result};
use caseline_core::attachment::{encode_payload, Attachment, CreateAttachment};
use caseline_core::case::Case;
use caseline_db::Database;
use caseline_service::LocalCaseStore;
use tracing::info;

/// Load a JSON array of cases and write each one. Returns how many were written.
pub async fn import_cases(store: &LocalCaseStore, path: &Path) -> Result<usize> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    let cases: Vec<Case> =
        serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))?;

    for case in &cases {
        store
            .put_case(case)
            .await
            .with_context(|| format!("writing case {:?}", case.case_id))?;
    }
    info!("imported {} cases from {}", cases.len(), path.display());
    Ok(cases.len())
}

/// Options for [`attach_file`].
#[derive(Debug, Default, Clone)]
pub struct AttachOptions {
    pub attachment_id: Option<String>,
    pub case_id: Option<String>,
    pub mime_type: Option<String>,
}

/// Store a file from disk as a base64 attachment.
pub async fn attach_file(db: &dyn Database, path: &Path, opts: AttachOptions) -> Result<Attachment> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string());
    let mime_type = opts.mime_type.or_else(|| guess_mime_type(path).map(String::from));

    let attachment = db
        .insert_attachment(&CreateAttachment {
            attachment_id: opts.attachment_id,
            case_id: opts.case_id,
            binary_data_base64: Some(encode_payload(&bytes)),
            filename,
            mime_type,
        })
        .await?;
    info!(
        "stored attachment {} ({} bytes)",
        attachment.attachment_id,
        bytes.len()
    );
    Ok(attachment)
}

fn guess_mime_type(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "tif" | "tiff" => "image/tiff",
        "txt" => "text/plain",
        "csv" => "text/csv",
        "xml" => "application/xml",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "eml" => "message/rfc822",
        _ => return None,
    };
    Some(mime)
}
