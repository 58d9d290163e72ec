//! Body encoder.
//!
//! # Design
//! JSON bodies are the parameters serialized as-is. Form, multipart and GET
//! query encoding all go through the same JSON round-trip: the parameters
//! become a `serde_json::Map` (declaration order preserved), which is then
//! flattened into `(key, value)` pairs or multipart parts. Parameters that
//! serialize to `null` mean "no parameters" and produce neither a body nor a
//! query string.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Serialize;
use serde_json::{Map, Value};
use url::Url;

use crate::error::EncodingError;
use crate::headers::{new_boundary, HeaderConfig, HeaderPair};
use crate::types::ContentType;

/// Content-type header plus body bytes for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedBody {
    pub header: HeaderPair,
    pub body: Option<Vec<u8>>,
}

/// Encode `params` as a request body for `content_type`.
pub fn encode<P>(
    config: &HeaderConfig,
    content_type: ContentType,
    params: &P,
) -> Result<EncodedBody, EncodingError>
where
    P: Serialize + ?Sized,
{
    let encoded = match content_type {
        ContentType::Json => EncodedBody {
            header: config.content_type_header(content_type, ""),
            body: json_body(params)?,
        },
        ContentType::FormUrlEncoded => EncodedBody {
            header: config.content_type_header(content_type, ""),
            body: form_body(params)?,
        },
        ContentType::Multipart => {
            let boundary = new_boundary();
            EncodedBody {
                header: config.content_type_header(content_type, &boundary),
                body: multipart_body(&boundary, params)?,
            }
        }
    };
    Ok(encoded)
}

pub fn json_body<P: Serialize + ?Sized>(params: &P) -> Result<Option<Vec<u8>>, EncodingError> {
    let value = serde_json::to_value(params)?;
    if value.is_null() {
        return Ok(None);
    }
    Ok(Some(serde_json::to_vec(&value)?))
}

/// `key=value&key=value` with arrays of strings repeated per element.
pub fn form_body<P: Serialize + ?Sized>(params: &P) -> Result<Option<Vec<u8>>, EncodingError> {
    let Some(fields) = field_map(params)? else {
        return Ok(None);
    };
    let encoded = serde_urlencoded::to_string(flatten_pairs(fields))?;
    Ok(Some(encoded.into_bytes()))
}

/// One `image/png` part per field; every field must hold base64 data and
/// have a name that can sit inside a quoted header parameter.
pub fn multipart_body<P: Serialize + ?Sized>(
    boundary: &str,
    params: &P,
) -> Result<Option<Vec<u8>>, EncodingError> {
    let Some(fields) = field_map(params)? else {
        return Ok(None);
    };

    let mut body = Vec::new();
    for (key, value) in fields {
        if !is_header_safe_name(&key) {
            return Err(EncodingError::InvalidMultipartField { field: key });
        }
        let payload = value
            .as_str()
            .and_then(|encoded| STANDARD.decode(encoded).ok())
            .ok_or_else(|| EncodingError::InvalidMultipartField { field: key.clone() })?;

        body.extend_from_slice(
            format!(
                "\r\n--{boundary}\r\n\
                 Content-Disposition: form-data; name=\"{key}\"; filename=\"{key}.png\"\r\n\
                 Content-Type: image/png\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(&payload);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{boundary}--").as_bytes());
    Ok(Some(body))
}

/// Query pairs for a GET request. Empty when there are no parameters.
pub fn query_pairs<P: Serialize + ?Sized>(params: &P) -> Result<Vec<(String, String)>, EncodingError> {
    Ok(field_map(params)?.map(flatten_pairs).unwrap_or_default())
}

/// Append `pairs` to the query of `url`, leaving it untouched when empty.
pub fn append_query(url: &mut Url, pairs: &[(String, String)]) {
    if pairs.is_empty() {
        return;
    }
    let mut query = url.query_pairs_mut();
    for (key, value) in pairs {
        query.append_pair(key, value);
    }
}

fn is_header_safe_name(name: &str) -> bool {
    !name.is_empty() && !name.chars().any(|c| c == '"' || c == '\\' || c.is_control())
}

fn field_map<P: Serialize + ?Sized>(params: &P) -> Result<Option<Map<String, Value>>, EncodingError> {
    match serde_json::to_value(params)? {
        Value::Null => Ok(None),
        Value::Object(fields) => Ok(Some(fields)),
        other => Err(EncodingError::NotAnObject {
            found: json_type_name(&other),
        }),
    }
}

fn flatten_pairs(fields: Map<String, Value>) -> Vec<(String, String)> {
    let mut pairs = Vec::with_capacity(fields.len());
    for (key, value) in fields {
        match value {
            Value::Null => {}
            Value::String(s) => pairs.push((key, s)),
            Value::Array(items) if items.iter().all(Value::is_string) => {
                for item in items {
                    if let Value::String(s) = item {
                        pairs.push((key.clone(), s));
                    }
                }
            }
            // numbers, bools, nested objects and mixed arrays
            other => pairs.push((key, other.to_string())),
        }
    }
    pairs
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
