//! Error types for the request pipeline.
//!
//! # Design
//! Every failure is scoped to a single request and surfaces through the same
//! `Result` the success value travels in. `ErrorKind` gives callers a stable
//! category to branch on (for example, retry only `Transport`) without
//! matching on variant payloads.

use thiserror::Error;

/// Boxed error reported by a transport implementation.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Coarse category of a [`ClientError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Encoding,
    Transport,
    Decode,
    InvalidRequest,
    Unknown,
}

/// Failures while turning typed parameters into a query string or body.
#[derive(Debug, Error)]
pub enum EncodingError {
    /// The parameters could not be serialized to JSON.
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    /// The flattened field pairs could not be form-encoded.
    #[error("form encoding failed: {0}")]
    Form(#[from] serde_urlencoded::ser::Error),

    /// Form, multipart and query encoding need a JSON object at the top level.
    #[error("parameters must serialize to a JSON object, got {found}")]
    NotAnObject { found: &'static str },

    /// A multipart field was not a base64 string, or its name cannot be
    /// written into the part headers.
    #[error("multipart field {field:?} needs a header-safe name and a base64 string value")]
    InvalidMultipartField { field: String },
}

/// Errors returned by `HttpClient` operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The parameters could not be encoded for the requested content type.
    #[error("encoding failed: {0}")]
    Encoding(#[from] EncodingError),

    /// The transport reported a network-level failure and no response.
    #[error("transport error: {0}")]
    Transport(#[source] BoxError),

    /// The response bytes could not be interpreted as the requested type.
    #[error("decode error in {url}: {reason}")]
    Decode {
        url: String,
        reason: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    /// The path did not resolve against the base URL; nothing was sent.
    #[error("invalid URL '{path}': {source}")]
    InvalidRequest {
        path: String,
        #[source]
        source: url::ParseError,
    },

    /// The transport finished with neither a response nor an error.
    #[error("no response and no error reported for {url}")]
    NoResponse { url: String },
}

impl ClientError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::Encoding(_) => ErrorKind::Encoding,
            ClientError::Transport(_) => ErrorKind::Transport,
            ClientError::Decode { .. } => ErrorKind::Decode,
            ClientError::InvalidRequest { .. } => ErrorKind::InvalidRequest,
            ClientError::NoResponse { .. } => ErrorKind::Unknown,
        }
    }
}
