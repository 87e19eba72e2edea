//! Error types.
//!
//! Every failure on the way to a response (building the request, the network
//! round trip, reading the body, a status code of 400 or above) is reported
//! as a [`ResourceError`]. Decode failures are deliberately *not* folded into
//! `ResourceError`: the raw codec error is surfaced as its own
//! [`HttpError`] variant, so callers distinguish "the call failed" from
//! "the call succeeded but the response was malformed" by matching on the
//! variant and inspecting [`HttpError::status`].

use bytes::Bytes;
use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Structured description of a failed outbound call.
///
/// `http_code` is 0 when the request never reached the server. For status
/// failures, `body` echoes the *outgoing* request payload (as a string) and
/// `response` holds the raw bytes the server sent back; on other paths
/// `response` is empty.
#[derive(Debug, Error)]
#[error("resource error: url: {url}, status code: {http_code}, message: {message}")]
pub struct ResourceError {
    pub url: String,
    pub http_code: u16,
    pub message: String,
    pub body: String,
    pub response: Bytes,
    #[source]
    pub source: Option<BoxError>,
}

impl ResourceError {
    /// The request could not be constructed (bad method, header or URL).
    pub fn build(url: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self {
            url: url.into(),
            http_code: 0,
            message: "request construction failed".to_string(),
            body: String::new(),
            response: Bytes::new(),
            source: Some(source.into()),
        }
    }

    /// The request left but no response came back (DNS, refusal, timeout).
    pub fn transport(url: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self {
            url: url.into(),
            http_code: 0,
            message: "request dispatch failed".to_string(),
            body: String::new(),
            response: Bytes::new(),
            source: Some(source.into()),
        }
    }

    /// The response arrived but its body could not be read.
    pub fn read(url: impl Into<String>, http_code: u16, source: impl Into<BoxError>) -> Self {
        Self {
            url: url.into(),
            http_code,
            message: "response read failed".to_string(),
            body: String::new(),
            response: Bytes::new(),
            source: Some(source.into()),
        }
    }

    /// The server answered with a status code above 399.
    ///
    /// `request_body` is echoed into `body` regardless of what the server
    /// returned; the response payload is kept separately in `response`.
    pub fn status_failure(
        url: impl Into<String>,
        http_code: u16,
        request_body: &Bytes,
        response: Bytes,
    ) -> Self {
        Self {
            url: url.into(),
            http_code,
            message: "incorrect response status code".to_string(),
            body: String::from_utf8_lossy(request_body).into_owned(),
            response,
            source: None,
        }
    }
}

/// Error returned by the typed entry points.
#[derive(Debug, Error)]
pub enum HttpError {
    #[error(transparent)]
    Resource(#[from] ResourceError),

    /// The call itself succeeded but the body was not valid JSON for the
    /// requested target type. `status` is the true server-reported code.
    #[error("json decode failed with status {status}: {source}")]
    JsonDecode {
        status: u16,
        #[source]
        source: serde_json::Error,
    },

    /// As [`HttpError::JsonDecode`], for XML responses.
    #[error("xml decode failed with status {status}: {source}")]
    XmlDecode {
        status: u16,
        #[source]
        source: quick_xml::DeError,
    },
}

impl HttpError {
    /// HTTP status associated with the failure, 0 when the request never
    /// completed.
    pub fn status(&self) -> u16 {
        match self {
            Self::Resource(err) => err.http_code,
            Self::JsonDecode { status, .. } | Self::XmlDecode { status, .. } => *status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_failure_echoes_request_body() {
        let err = ResourceError::status_failure(
            "http://example.invalid/x",
            404,
            &Bytes::from_static(b"ping"),
            Bytes::from_static(b"not found"),
        );
        assert_eq!(err.http_code, 404);
        assert_eq!(err.body, "ping");
        assert_eq!(err.response.as_ref(), b"not found");
        assert!(err.source.is_none());
    }

    #[test]
    fn display_includes_url_and_code() {
        let err = ResourceError::transport("http://example.invalid/x", "connection refused");
        let rendered = err.to_string();
        assert!(rendered.contains("http://example.invalid/x"));
        assert!(rendered.contains("status code: 0"));
    }

    #[test]
    fn http_error_status_per_variant() {
        let resource = HttpError::from(ResourceError::status_failure(
            "http://example.invalid",
            500,
            &Bytes::new(),
            Bytes::new(),
        ));
        assert_eq!(resource.status(), 500);

        let json_err = serde_json::from_str::<serde_json::Value>("nope").unwrap_err();
        let decode = HttpError::JsonDecode {
            status: 200,
            source: json_err,
        };
        assert_eq!(decode.status(), 200);
    }
}
