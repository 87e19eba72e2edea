//! HTTP transport abstraction.
//!
//! The dispatcher talks to the network through [`HttpTransport`] so that
//! callers can inject their own client (custom TLS, proxies, pooling) or a
//! synthetic implementation in tests. The default path uses a process-wide
//! `reqwest::Client` through the same trait; the per-request timeout is
//! applied on the request builder, so the shared client honors it too.

use crate::error::ResourceError;
use async_trait::async_trait;
use bytes::Bytes;
use once_cell::sync::Lazy;
use reqwest::Method;
use reqwest::header::HeaderMap;
use std::time::Duration;

/// Fully assembled request handed to a transport.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Bytes,
    pub timeout: Duration,
}

/// Raw response as observed by a transport. The body is fully read before
/// the transport returns; no reader escapes this layer.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Executes one request and returns the raw response.
///
/// Implementations report transport-level failures (DNS, refusal, timeout)
/// with [`ResourceError::transport`] and body-read failures with
/// [`ResourceError::read`]; status classification stays in the dispatcher.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn execute(&self, request: TransportRequest) -> Result<TransportResponse, ResourceError>;
}

#[async_trait]
impl HttpTransport for reqwest::Client {
    async fn execute(&self, request: TransportRequest) -> Result<TransportResponse, ResourceError> {
        let response = self
            .request(request.method, &request.url)
            .headers(request.headers)
            .body(request.body)
            .timeout(request.timeout)
            .send()
            .await
            .map_err(|e| ResourceError::transport(&request.url, e))?;

        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|e| ResourceError::read(&request.url, status, e))?;

        Ok(TransportResponse {
            status,
            headers,
            body,
        })
    }
}

static SHARED_CLIENT: Lazy<reqwest::Client> = Lazy::new(reqwest::Client::new);

/// The client used when no transport override is supplied.
pub(crate) fn shared_client() -> &'static reqwest::Client {
    &SHARED_CLIENT
}
