//! Request dispatcher.
//!
//! # Design
//! `HttpClient` holds only a base URL, an immutable `HeaderConfig`, and a
//! transport, and carries no mutable state between calls. Every operation is
//! split into `build_request`, which produces an `HttpRequest` without
//! touching the network, and `decode_response`, which consumes whatever the
//! transport observed. The async verbs glue the two halves around
//! `Transport::send`; hosts that do their own I/O can call the halves
//! directly.

use std::time::Duration;

use serde::Serialize;
use tracing::debug;
use url::Url;

use crate::decode::{decode_outcome, FromResponse};
use crate::encoding;
use crate::error::ClientError;
use crate::headers::HeaderConfig;
use crate::http::{HttpMethod, HttpRequest};
use crate::transport::{Transport, TransportConfig, TransportOutcome, UreqTransport};
use crate::types::ContentType;

/// Stateless HTTP client over a pluggable [`Transport`].
///
/// Paths resolve against the base URL the way relative links do, so a base
/// of `http://host/api/` and a path of `users` give `http://host/api/users`,
/// while an absolute URL passes through untouched.
#[derive(Debug, Clone)]
pub struct HttpClient<T = UreqTransport> {
    base_url: Url,
    headers: HeaderConfig,
    transport: T,
}

impl HttpClient<UreqTransport> {
    pub fn new(base_url: Url) -> Self {
        Self::builder(base_url).build()
    }

    pub fn builder(base_url: Url) -> HttpClientBuilder<UreqTransport> {
        HttpClientBuilder {
            base_url,
            headers: HeaderConfig::new(),
            transport: UreqTransport::default(),
        }
    }
}

impl<T> HttpClient<T> {
    pub fn with_transport(base_url: Url, headers: HeaderConfig, transport: T) -> Self {
        Self {
            base_url,
            headers,
            transport,
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn header_config(&self) -> &HeaderConfig {
        &self.headers
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Resolve `path` (relative path or absolute URL) against the base URL.
    pub fn resolve(&self, path: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(path)
            .map_err(|source| ClientError::InvalidRequest {
                path: path.to_string(),
                source,
            })
    }

    /// Build the request for `method` without sending it.
    ///
    /// GET turns `params` into a query string. POST and PUT encode them as
    /// the body for `content_type`. DELETE always sends a JSON body and keeps
    /// the common JSON content type whatever `content_type` says.
    pub fn build_request<P>(
        &self,
        method: HttpMethod,
        path: &str,
        params: &P,
        content_type: ContentType,
    ) -> Result<HttpRequest, ClientError>
    where
        P: Serialize + ?Sized,
    {
        let mut url = self.resolve(path)?;
        let mut headers = self.headers.common_headers();

        let body = match method {
            HttpMethod::Get => {
                let pairs = encoding::query_pairs(params)?;
                encoding::append_query(&mut url, &pairs);
                None
            }
            HttpMethod::Post | HttpMethod::Put => {
                let encoded = encoding::encode(&self.headers, content_type, params)?;
                headers.insert(encoded.header.key, encoded.header.value);
                encoded.body
            }
            HttpMethod::Delete => {
                if content_type != ContentType::Json {
                    debug!(?content_type, "DELETE bodies are always JSON; ignoring requested content type");
                }
                encoding::json_body(params)?
            }
        };

        Ok(HttpRequest {
            method,
            url: url.into(),
            headers,
            body,
        })
    }

    /// Turn a transport outcome for `url` into the requested result type.
    pub fn decode_response<R: FromResponse>(
        &self,
        outcome: TransportOutcome,
        url: &str,
    ) -> Result<R, ClientError> {
        decode_outcome(outcome, url)
    }
}

impl<T: Transport> HttpClient<T> {
    /// Build, send and decode one request.
    pub async fn send<P, R>(
        &self,
        method: HttpMethod,
        path: &str,
        params: &P,
        content_type: ContentType,
    ) -> Result<R, ClientError>
    where
        P: Serialize + ?Sized,
        R: FromResponse,
    {
        let request = self.build_request(method, path, params, content_type)?;
        let url = request.url.clone();
        debug!(%method, %url, "dispatching request");
        let outcome = self.transport.send(request).await;
        self.decode_response(outcome, &url)
    }

    pub async fn get<P, R>(&self, path: &str, params: &P) -> Result<R, ClientError>
    where
        P: Serialize + ?Sized,
        R: FromResponse,
    {
        self.send(HttpMethod::Get, path, params, ContentType::Json).await
    }

    pub async fn post<P, R>(&self, path: &str, params: &P, content_type: ContentType) -> Result<R, ClientError>
    where
        P: Serialize + ?Sized,
        R: FromResponse,
    {
        self.send(HttpMethod::Post, path, params, content_type).await
    }

    pub async fn put<P, R>(&self, path: &str, params: &P, content_type: ContentType) -> Result<R, ClientError>
    where
        P: Serialize + ?Sized,
        R: FromResponse,
    {
        self.send(HttpMethod::Put, path, params, content_type).await
    }

    pub async fn delete<P, R>(&self, path: &str, params: &P, content_type: ContentType) -> Result<R, ClientError>
    where
        P: Serialize + ?Sized,
        R: FromResponse,
    {
        self.send(HttpMethod::Delete, path, params, content_type).await
    }
}

/// Builder for [`HttpClient`].
#[derive(Debug, Clone)]
pub struct HttpClientBuilder<T = UreqTransport> {
    base_url: Url,
    headers: HeaderConfig,
    transport: T,
}

impl HttpClientBuilder<UreqTransport> {
    /// Overall per-request timeout for the default transport.
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.transport = UreqTransport::new(TransportConfig {
            timeout,
            ..self.transport.config()
        });
        self
    }

    /// Largest response body the default transport reads, in bytes.
    pub fn max_body_size(mut self, max_body_size: u64) -> Self {
        self.transport = UreqTransport::new(TransportConfig {
            max_body_size,
            ..self.transport.config()
        });
        self
    }
}

impl<T> HttpClientBuilder<T> {
    pub fn headers(mut self, headers: HeaderConfig) -> Self {
        self.headers = headers;
        self
    }

    pub fn bearer_token(mut self, token: &str) -> Self {
        self.headers = self.headers.with_bearer_token(token);
        self
    }

    pub fn transport<U: Transport>(self, transport: U) -> HttpClientBuilder<U> {
        HttpClientBuilder {
            base_url: self.base_url,
            headers: self.headers,
            transport,
        }
    }

    pub fn build(self) -> HttpClient<T> {
        HttpClient::with_transport(self.base_url, self.headers, self.transport)
    }
}
