//! Transport boundary and the default `ureq` transport.
//!
//! # Design
//! A `Transport` takes a finished `HttpRequest` and reports back a
//! `TransportOutcome`: a response, an error, both, or (in theory) neither.
//! The decoder owns the precedence rules, so implementations just report
//! what happened. HTTP status codes are data, never errors.
//!
//! When the status line and headers arrive but the body read fails, the
//! outcome carries both the bodiless response and the error.
//!
//! `UreqTransport` builds a fresh agent per request and drops it once the
//! single call completes, so nothing is pooled across calls. The blocking
//! `ureq` call runs on tokio's blocking pool to keep the caller's task free.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};
use ureq::ResponseExt;

use crate::error::BoxError;
use crate::http::{Headers, HttpMethod, HttpRequest, HttpResponse};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Response bodies are read in full unless a smaller cap is configured.
pub const DEFAULT_MAX_BODY_SIZE: u64 = u64::MAX;

/// What a transport observed for one request.
#[derive(Debug, Default)]
pub struct TransportOutcome {
    pub response: Option<HttpResponse>,
    pub error: Option<BoxError>,
}

impl TransportOutcome {
    pub fn completed(response: HttpResponse) -> Self {
        Self {
            response: Some(response),
            error: None,
        }
    }

    pub fn failed(error: BoxError) -> Self {
        Self {
            response: None,
            error: Some(error),
        }
    }
}

/// Executes one request against the network.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> TransportOutcome;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, request: HttpRequest) -> TransportOutcome {
        (**self).send(request).await
    }
}

/// Settings for [`UreqTransport`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportConfig {
    /// Upper bound for the whole call, connect through body read. `None`
    /// waits forever.
    pub timeout: Option<Duration>,
    /// Largest response body read, in bytes. A longer body fails the read.
    pub max_body_size: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Some(DEFAULT_TIMEOUT),
            max_body_size: DEFAULT_MAX_BODY_SIZE,
        }
    }
}

/// Blocking `ureq` client driven from tokio's blocking pool.
#[derive(Debug, Clone, Default)]
pub struct UreqTransport {
    config: TransportConfig,
}

impl UreqTransport {
    pub fn new(config: TransportConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> TransportConfig {
        self.config
    }

    fn agent(&self) -> ureq::Agent {
        ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(self.config.timeout)
            .build()
            .new_agent()
    }
}

#[async_trait]
impl Transport for UreqTransport {
    async fn send(&self, request: HttpRequest) -> TransportOutcome {
        let agent = self.agent();
        let max_body_size = self.config.max_body_size;
        match tokio::task::spawn_blocking(move || execute(&agent, request, max_body_size)).await {
            Ok(outcome) => outcome,
            Err(e) => TransportOutcome::failed(Box::new(e)),
        }
    }
}

fn with_headers<B>(mut builder: ureq::RequestBuilder<B>, headers: &Headers) -> ureq::RequestBuilder<B> {
    for (key, value) in headers.iter() {
        builder = builder.header(key, value);
    }
    builder
}

fn execute(agent: &ureq::Agent, request: HttpRequest, max_body_size: u64) -> TransportOutcome {
    let HttpRequest {
        method,
        url,
        headers,
        body,
    } = request;
    debug!(%method, %url, body_len = body.as_ref().map_or(0, Vec::len), "sending request");

    let sent = match (method, body) {
        (HttpMethod::Get, _) => with_headers(agent.get(&url), &headers).call(),
        (HttpMethod::Delete, Some(body)) => with_headers(agent.delete(&url), &headers)
            .force_send_body()
            .send(&body[..]),
        (HttpMethod::Delete, None) => with_headers(agent.delete(&url), &headers).call(),
        (HttpMethod::Post, Some(body)) => with_headers(agent.post(&url), &headers).send(&body[..]),
        (HttpMethod::Post, None) => with_headers(agent.post(&url), &headers).send_empty(),
        (HttpMethod::Put, Some(body)) => with_headers(agent.put(&url), &headers).send(&body[..]),
        (HttpMethod::Put, None) => with_headers(agent.put(&url), &headers).send_empty(),
    };
    let mut response = match sent {
        Ok(response) => response,
        Err(e) => return TransportOutcome::failed(Box::new(e)),
    };

    let status = response.status().as_u16();
    let headers: Headers = response
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect();
    let final_url = response.get_uri().to_string();

    match response.body_mut().with_config().limit(max_body_size).read_to_vec() {
        Ok(body) => {
            debug!(%url, %final_url, status, body_len = body.len(), "response received");
            TransportOutcome::completed(HttpResponse {
                status,
                headers,
                body,
                url: Some(final_url),
            })
        }
        Err(e) => {
            warn!(%url, status, error = %e, "response body could not be read");
            TransportOutcome {
                response: Some(HttpResponse {
                    status,
                    headers,
                    body: Vec::new(),
                    url: Some(final_url),
                }),
                error: Some(Box::new(e)),
            }
        }
    }
}
