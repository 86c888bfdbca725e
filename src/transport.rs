//! The HTTP transport seam.
//!
//! A [`Connection`](crate::Connection) builds [`HttpRequest`]s and hands
//! them to a [`Transport`]. The production implementation wraps a blocking
//! `reqwest` client; tests substitute a scripted in-memory transport. The
//! transport performs no retries and surfaces timeouts as plain transport
//! errors.

use std::time::Duration;

use reqwest::{Method, Url};

use crate::connection::Credentials;
use crate::error::Result;

/// One outgoing request, fully resolved by the connection.
#[derive(Debug)]
pub struct HttpRequest {
    /// GET or POST.
    pub method: Method,
    /// Absolute request URL, query string included.
    pub url: Url,
    /// Request body, line-protocol text on the write path.
    pub body: Option<String>,
    /// Basic-auth credentials.
    pub auth: Option<Credentials>,
    /// Per-request timeout; the transport default applies when unset.
    pub timeout: Option<Duration>,
}

/// The raw response a transport hands back: status code and body text.
#[derive(Debug)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body.
    pub body: String,
}

impl HttpResponse {
    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Blocking HTTP transport.
///
/// Implementations send one request and block until the response arrives
/// or the timeout elapses.
pub trait Transport: Send + Sync {
    /// Send the request and return the raw response.
    fn send(&self, request: HttpRequest) -> Result<HttpResponse>;
}

/// [`Transport`] backed by a blocking `reqwest` client.
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    /// Create a transport with a default client.
    pub fn new() -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
        }
    }

    /// Create a transport from a preconfigured client.
    ///
    /// This allows proxies, TLS settings, connection pooling limits, etc.
    /// to be configured upstream.
    pub fn with_client(client: reqwest::blocking::Client) -> Self {
        Self { client }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let mut builder = self.client.request(request.method, request.url);

        if let Some(credentials) = &request.auth {
            builder = builder.basic_auth(&credentials.username, Some(&credentials.password));
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send()?;
        let status = response.status().as_u16();
        let body = response.text()?;

        Ok(HttpResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_success_bounds() {
        for status in [200, 204, 299] {
            let response = HttpResponse {
                status,
                body: String::new(),
            };
            assert!(response.is_success(), "status {}", status);
        }
        for status in [199, 300, 400, 404, 500] {
            let response = HttpResponse {
                status,
                body: String::new(),
            };
            assert!(!response.is_success(), "status {}", status);
        }
    }
}
