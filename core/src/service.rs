//! Base for API-specific services.

use crate::client::HttpClient;
use crate::transport::UreqTransport;

/// Owns the `HttpClient` an API-specific service issues its calls through.
///
/// Services wrap this and expose typed endpoint methods on top of the
/// client's generic verbs.
#[derive(Debug, Clone)]
pub struct HttpService<T = UreqTransport> {
    client: HttpClient<T>,
}

impl<T> HttpService<T> {
    pub fn new(client: HttpClient<T>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &HttpClient<T> {
        &self.client
    }

    pub fn into_client(self) -> HttpClient<T> {
        self.client
    }
}
