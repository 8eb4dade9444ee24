//! Inline image payloads and their self-describing `data:` URI form.
//!
//! Images travel between steps as `data:{mime};base64,{payload}` strings so the
//! critique step can recover the bytes without a separate fetch.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Media type assumed when the generative service omits one.
pub const DEFAULT_IMAGE_MIME: &str = "image/png";

/// Base64-encoded image plus its media type. Serializes as the generative API's
/// `inlineData` object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineImage {
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub data: String,
}

impl InlineImage {
    pub fn from_bytes(mime_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: STANDARD.encode(bytes),
        }
    }

    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }

    /// Parses a `data:{mime};base64,{payload}` URI. The payload must be valid base64.
    pub fn from_data_uri(uri: &str) -> Result<Self, AppError> {
        let rest = uri
            .strip_prefix("data:")
            .ok_or_else(|| invalid_uri("missing 'data:' prefix"))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| invalid_uri("missing ',' separator"))?;
        let mime_type = header
            .strip_suffix(";base64")
            .ok_or_else(|| invalid_uri("payload is not base64-encoded"))?;

        if mime_type.is_empty() {
            return Err(invalid_uri("missing media type"));
        }
        STANDARD
            .decode(payload)
            .map_err(|e| invalid_uri(&format!("payload is not valid base64: {e}")))?;

        Ok(Self {
            mime_type: mime_type.to_string(),
            data: payload.to_string(),
        })
    }
}

fn invalid_uri(reason: &str) -> AppError {
    AppError::Validation(format!("Invalid image reference: {reason}"))
}
