//! Response decoder.
//!
//! # Design
//! The caller picks the result kind through the type it asks for:
//! `Json<T>` (and `Empty`, `serde_json::Value`) is structured, `Bytes` /
//! `Vec<u8>` is raw bytes, `String` is text. `FromResponse` tags each type
//! with its `ResultKind`, and `decode` evaluates a fixed order:
//!
//! 1. JSON content type: structured decode into the requested type.
//! 2. Raw-bytes kind: the body as-is.
//! 3. Text kind: the body if it is valid UTF-8.
//! 4. Anything else is a decode error naming the URL.

use bytes::Bytes;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::ClientError;
use crate::headers::is_json_response;
use crate::http::HttpResponse;
use crate::transport::TransportOutcome;
use crate::types::Empty;

/// How a response type wants non-JSON bodies interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultKind {
    Structured,
    Bytes,
    Text,
}

/// A type a response body can be decoded into.
pub trait FromResponse: Sized {
    const KIND: ResultKind;

    /// Decode a body whose content type is JSON.
    fn from_json(body: &[u8]) -> Result<Self, serde_json::Error>;

    fn from_bytes(_body: Vec<u8>) -> Option<Self> {
        None
    }

    fn from_text(_text: String) -> Option<Self> {
        None
    }
}

/// Structured JSON response of type `T`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Json<T>(pub T);

impl<T> Json<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T: DeserializeOwned> FromResponse for Json<T> {
    const KIND: ResultKind = ResultKind::Structured;

    fn from_json(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(body).map(Json)
    }
}

impl FromResponse for serde_json::Value {
    const KIND: ResultKind = ResultKind::Structured;

    fn from_json(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(body)
    }
}

impl FromResponse for Empty {
    const KIND: ResultKind = ResultKind::Structured;

    fn from_json(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(body)
    }
}

impl FromResponse for Vec<u8> {
    const KIND: ResultKind = ResultKind::Bytes;

    fn from_json(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(body)
    }

    fn from_bytes(body: Vec<u8>) -> Option<Self> {
        Some(body)
    }
}

impl FromResponse for Bytes {
    const KIND: ResultKind = ResultKind::Bytes;

    fn from_json(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice::<Vec<u8>>(body).map(Bytes::from)
    }

    fn from_bytes(body: Vec<u8>) -> Option<Self> {
        Some(Bytes::from(body))
    }
}

impl FromResponse for String {
    const KIND: ResultKind = ResultKind::Text;

    fn from_json(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(body)
    }

    fn from_text(text: String) -> Option<Self> {
        Some(text)
    }
}

/// Decode a received response into `R`.
///
/// Errors name the URL the response came from when the transport knows it
/// (after redirects), else the requested `url`.
pub fn decode<R: FromResponse>(response: HttpResponse, url: &str) -> Result<R, ClientError> {
    let final_url = response.url.clone();
    let url = final_url.as_deref().unwrap_or(url);
    debug!(url, status = response.status, len = response.body.len(), "decoding response");

    if is_json_response(&response.headers) {
        return R::from_json(&response.body).map_err(|e| {
            warn!(url, error = %e, "JSON response did not match the requested type");
            ClientError::Decode {
                url: url.to_string(),
                reason: format!("invalid JSON body: {e}"),
                source: Some(e),
            }
        });
    }

    let len = response.body.len();
    let decoded = match R::KIND {
        ResultKind::Bytes => R::from_bytes(response.body),
        ResultKind::Text => String::from_utf8(response.body).ok().and_then(R::from_text),
        ResultKind::Structured => None,
    };
    decoded.ok_or_else(|| {
        warn!(url, kind = ?R::KIND, len, "response body has no usable representation");
        ClientError::Decode {
            url: url.to_string(),
            reason: format!("cannot decode {len}-byte body as {:?}", R::KIND),
            source: None,
        }
    })
}

/// Route a transport outcome: a response wins over an error, an error alone
/// is a transport failure, and neither is `NoResponse`.
pub fn decode_outcome<R: FromResponse>(outcome: TransportOutcome, url: &str) -> Result<R, ClientError> {
    match outcome {
        TransportOutcome {
            response: Some(response),
            error,
        } => {
            if let Some(error) = error {
                debug!(url, %error, "transport reported an error alongside a response");
            }
            decode(response, url)
        }
        TransportOutcome {
            response: None,
            error: Some(error),
        } => {
            warn!(url, %error, "transport failed");
            Err(ClientError::Transport(error))
        }
        TransportOutcome {
            response: None,
            error: None,
        } => {
            warn!(url, "transport returned neither a response nor an error");
            Err(ClientError::NoResponse { url: url.to_string() })
        }
    }
}
