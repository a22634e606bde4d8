use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::CaselineError;

pub const DEFAULT_MIME_TYPE: &str = "application/pdf";
pub const DEFAULT_FILENAME: &str = "attachment.pdf";

/// Standard alphabet, padding optional on decode, always written on encode.
const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// A confirmation attachment row, without its payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub attachment_id: String,
    pub case_id: Option<String>,
    pub filename: Option<String>,
    pub mime_type: Option<String>,
    pub has_binary_data: bool,
    /// Milliseconds since the Unix epoch.
    pub created_at: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateAttachment {
    /// Generated when absent.
    #[serde(default)]
    pub attachment_id: Option<String>,
    #[serde(default)]
    pub case_id: Option<String>,
    #[serde(default)]
    pub binary_data_base64: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub mime_type: Option<String>,
}

/// The columns read when serving a download.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttachmentBlob {
    pub binary_data_base64: Option<String>,
    pub filename: Option<String>,
    pub mime_type: Option<String>,
}

impl AttachmentBlob {
    /// Decode the stored payload.
    ///
    /// Returns `Ok(None)` when there is nothing to serve: the column is null
    /// or holds an empty string.
    pub fn decode(&self) -> Result<Option<Vec<u8>>, CaselineError> {
        match self.binary_data_base64.as_deref() {
            None | Some("") => Ok(None),
            Some(encoded) => decode_payload(encoded).map(Some),
        }
    }

    pub fn content_type(&self) -> &str {
        non_empty(self.mime_type.as_deref()).unwrap_or(DEFAULT_MIME_TYPE)
    }

    pub fn download_filename(&self) -> &str {
        non_empty(self.filename.as_deref()).unwrap_or(DEFAULT_FILENAME)
    }

    /// `attachment; filename="..."` with header-unsafe characters replaced.
    pub fn content_disposition(&self) -> String {
        format!(
            "attachment; filename=\"{}\"",
            header_safe_filename(self.download_filename())
        )
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.is_empty())
}

/// Decode a base64 payload, tolerating line breaks and missing padding.
pub fn decode_payload(encoded: &str) -> Result<Vec<u8>, CaselineError> {
    let result = if encoded.bytes().any(|b| b.is_ascii_whitespace()) {
        let compact: String = encoded
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();
        PAYLOAD_ENGINE.decode(compact)
    } else {
        PAYLOAD_ENGINE.decode(encoded)
    };
    result.map_err(|e| CaselineError::InvalidPayload(e.to_string()))
}

pub fn encode_payload(bytes: &[u8]) -> String {
    PAYLOAD_ENGINE.encode(bytes)
}

/// Replace characters that cannot sit inside a quoted header parameter.
pub fn header_safe_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c == '"' || c == '\\' || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect()
}
