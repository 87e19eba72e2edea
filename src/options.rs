//! Per-call configuration.
//!
//! All optional knobs of a call live in one [`RequestOptions`] value instead
//! of a trail of nullable parameters. Options are input-only: entry points
//! clone the header map before injecting their content-type default, so the
//! caller's value is never mutated.

use crate::transport::HttpTransport;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// A single cookie sent with the request.
#[derive(Debug, Clone)]
pub struct Cookie {
    pub name: String,
    pub value: String,
}

impl Cookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Rendered `name=value` pair for the `Cookie` header.
    pub(crate) fn pair(&self) -> String {
        format!("{}={}", self.name, self.value)
    }
}

/// Optional settings for a single call.
///
/// `timeout` falls back to [`crate::defaults::REQUEST_TIMEOUT`] when unset or
/// zero. `transport` replaces the shared client entirely; it is the caller's
/// escape hatch for TLS configuration, proxying and connection pooling, none
/// of which are managed here.
#[derive(Clone, Default)]
pub struct RequestOptions {
    pub headers: HashMap<String, String>,
    pub cookie: Option<Cookie>,
    pub timeout: Option<Duration>,
    pub transport: Option<Arc<dyn HttpTransport>>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers.extend(headers);
        self
    }

    pub fn cookie(mut self, cookie: Cookie) -> Self {
        self.cookie = Some(cookie);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }
}
