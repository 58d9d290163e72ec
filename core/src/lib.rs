//! Typed HTTP request encoding and response decoding over a pluggable
//! transport.
//!
//! # Overview
//! `HttpClient` turns a method, a path, and serializable parameters into an
//! `HttpRequest` (query string for GET; JSON, form-urlencoded or multipart
//! body otherwise), hands it to a `Transport`, and decodes what comes back
//! into the type the caller asked for.
//!
//! # Design
//! - `HttpClient` is stateless: base URL, an immutable `HeaderConfig`, and a
//!   transport. Requests share nothing.
//! - Each call is split into `build_request` (pure) and `decode_response`
//!   (pure), so the I/O boundary is explicit and hosts can do their own I/O.
//! - The default `UreqTransport` opens a fresh agent per request.
//! - Every failure is a `ClientError` with a stable `ErrorKind`.

pub mod client;
pub mod decode;
pub mod encoding;
pub mod error;
pub mod headers;
pub mod http;
pub mod service;
pub mod transport;
pub mod types;

pub use client::{HttpClient, HttpClientBuilder};
pub use decode::{FromResponse, Json, ResultKind};
pub use encoding::EncodedBody;
pub use error::{ClientError, EncodingError, ErrorKind};
pub use headers::{HeaderConfig, HeaderPair};
pub use http::{Headers, HttpMethod, HttpRequest, HttpResponse};
pub use service::HttpService;
pub use transport::{Transport, TransportConfig, TransportOutcome, UreqTransport};
pub use types::{ContentType, Empty, NoParams};
pub use url::Url;
