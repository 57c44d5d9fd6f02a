//! Errors and settings shared by extraction providers.

use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;

/// Errors returned while calling an extraction provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Endpoint failed to parse or normalize.
    #[error("Invalid Document AI endpoint: {0}")]
    InvalidUrl(String),
    /// HTTP layer failed before receiving a response.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Provider rejected the credentials or the caller lacks permission.
    #[error("Document AI rejected credentials ({status}): {body}")]
    Unauthorized {
        /// HTTP status returned by the provider.
        status: StatusCode,
        /// Body payload associated with the failing response.
        body: String,
    },
    /// Provider quota is exhausted.
    #[error("Document AI quota exceeded: {body}")]
    QuotaExceeded {
        /// Body payload associated with the failing response.
        body: String,
    },
    /// Provider could not process the submitted document.
    #[error("Document AI rejected the document ({status}): {body}")]
    InvalidDocument {
        /// HTTP status returned by the provider.
        status: StatusCode,
        /// Body payload associated with the failing response.
        body: String,
    },
    /// Provider is temporarily unable to serve requests.
    #[error("Document AI unavailable ({status}): {body}")]
    Unavailable {
        /// HTTP status returned by the provider.
        status: StatusCode,
        /// Body payload associated with the failing response.
        body: String,
    },
    /// Provider responded with a status outside the known categories.
    #[error("Unexpected Document AI response ({status}): {body}")]
    UnexpectedStatus {
        /// HTTP status returned by the provider.
        status: StatusCode,
        /// Body payload associated with the failing response.
        body: String,
    },
    /// Successful response body could not be decoded.
    #[error("Malformed Document AI response: {0}")]
    MalformedResponse(String),
}

impl ProviderError {
    /// Classify a non-success response.
    pub fn from_status(status: StatusCode, body: String) -> Self {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Self::Unauthorized { status, body },
            StatusCode::TOO_MANY_REQUESTS => Self::QuotaExceeded { body },
            StatusCode::BAD_REQUEST
            | StatusCode::PAYLOAD_TOO_LARGE
            | StatusCode::UNSUPPORTED_MEDIA_TYPE
            | StatusCode::UNPROCESSABLE_ENTITY => Self::InvalidDocument { status, body },
            status if status.is_server_error() => Self::Unavailable { status, body },
            status => Self::UnexpectedStatus { status, body },
        }
    }

    /// Whether the failure was caused by the submitted document rather than the service.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidDocument { .. })
    }
}

/// Connection settings for the Document AI REST endpoint.
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    /// Base URL, e.g. `https://us-documentai.googleapis.com`.
    pub endpoint: String,
    /// Optional OAuth bearer token attached to every request.
    pub access_token: Option<String>,
    /// Per-request timeout.
    pub timeout: Duration,
}

/// Guess a MIME type from the file extensions Document AI accepts.
pub fn mime_type_for_file_name(file_name: &str) -> Option<&'static str> {
    let (_, extension) = file_name.rsplit_once('.')?;
    let mime = match extension.to_ascii_lowercase().as_str() {
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "tif" | "tiff" => "image/tiff",
        "bmp" => "image/bmp",
        "webp" => "image/webp",
        _ => return None,
    };
    Some(mime)
}
