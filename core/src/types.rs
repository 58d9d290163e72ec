//! Caller-facing value types shared by the encoder and decoder.

use serde::{Deserialize, Serialize, Serializer};

/// Wire encoding used for a request body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentType {
    #[default]
    Json,
    FormUrlEncoded,
    Multipart,
}

/// Marker for "this request has no parameters".
///
/// Serializes to JSON `null`, which the encoder treats as "no query string
/// and no body". `()` and `None` behave the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NoParams;

impl Serialize for NoParams {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_unit()
    }
}

/// Response shape for endpoints that answer with an empty JSON object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Empty {}
