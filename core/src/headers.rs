//! Header builder.
//!
//! # Design
//! `HeaderConfig` is a small immutable value built once and cloned into each
//! client. It owns the always-present headers (the JSON content type plus
//! anything the caller layered on, such as an `Authorization` header) and
//! knows the content-type header for every `ContentType`. There is no
//! module-level header state.

use uuid::Uuid;

use crate::http::Headers;
use crate::types::ContentType;

pub const CONTENT_TYPE: &str = "Content-Type";
pub const AUTHORIZATION: &str = "Authorization";

pub const APPLICATION_JSON: &str = "application/json";
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
pub const MULTIPART_FORM_DATA: &str = "multipart/form-data";

/// An immutable header key/value pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderPair {
    pub key: String,
    pub value: String,
}

impl HeaderPair {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Headers sent with every request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderConfig {
    extra: Headers,
}

impl HeaderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `Authorization: Bearer <token>` to every request.
    pub fn with_bearer_token(self, token: &str) -> Self {
        self.with_header(AUTHORIZATION, format!("Bearer {token}"))
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key, value);
        self
    }

    /// The always-present headers: JSON content type, overridden by any
    /// configured extras on key collision.
    pub fn common_headers(&self) -> Headers {
        let mut headers = Headers::new();
        headers.insert(CONTENT_TYPE, JSON_CONTENT_TYPE);
        headers.merge(&self.extra);
        headers
    }

    /// Content-type header for `content_type`. `boundary` is only read for
    /// multipart.
    pub fn content_type_header(&self, content_type: ContentType, boundary: &str) -> HeaderPair {
        let value = match content_type {
            ContentType::Json => JSON_CONTENT_TYPE.to_string(),
            ContentType::FormUrlEncoded => FORM_CONTENT_TYPE.to_string(),
            ContentType::Multipart => format!("{MULTIPART_FORM_DATA}; boundary={boundary}"),
        };
        HeaderPair::new(CONTENT_TYPE, value)
    }
}

/// Fresh multipart boundary, one per request.
pub fn new_boundary() -> String {
    Uuid::new_v4().to_string().to_uppercase()
}

/// Whether a response `Content-Type` asks for JSON decoding.
pub fn is_json_response(headers: &Headers) -> bool {
    headers
        .get(CONTENT_TYPE)
        .is_some_and(|v| v.to_ascii_lowercase().contains(APPLICATION_JSON))
}
