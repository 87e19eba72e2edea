//! The request dispatcher shared by every public entry point.

use crate::defaults;
use crate::error::ResourceError;
use crate::options::RequestOptions;
use crate::transport::{HttpTransport, TransportRequest, shared_client};
use bytes::Bytes;
use reqwest::Method;
use reqwest::header::{AUTHORIZATION, COOKIE, HeaderMap, HeaderName, HeaderValue};
use url::Url;

/// Raw outcome of a dispatched call with a status code below 400.
#[derive(Debug, Clone)]
pub struct HttpReply {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Build and execute one HTTP request.
///
/// A non-empty `token` is written to the `Authorization` header verbatim;
/// the caller supplies any scheme prefix (`"Bearer ..."` etc.). URLs that
/// carry a query string are re-encoded canonically before dispatch. Status
/// codes above 399 are classified as failures whose error echoes the
/// outgoing request body; see [`ResourceError::status_failure`].
pub async fn send_request(
    method: &str,
    url: &str,
    token: Option<&str>,
    body: impl Into<Bytes>,
    options: &RequestOptions,
) -> Result<HttpReply, ResourceError> {
    let body = body.into();

    let method =
        Method::from_bytes(method.as_bytes()).map_err(|e| ResourceError::build(url, e))?;
    let timeout = options
        .timeout
        .filter(|t| !t.is_zero())
        .unwrap_or(defaults::REQUEST_TIMEOUT);
    let headers = build_header_map(url, options, token)?;

    let target = if url.contains('?') {
        canonicalize_query(url)?
    } else {
        url.to_owned()
    };

    tracing::debug!("dispatching {} {}", method, target);

    let transport: &dyn HttpTransport = match &options.transport {
        Some(custom) => custom.as_ref(),
        None => shared_client(),
    };

    let response = transport
        .execute(TransportRequest {
            method,
            url: target.clone(),
            headers,
            body: body.clone(),
            timeout,
        })
        .await?;

    if response.status > 399 {
        tracing::warn!("{} answered with status {}", target, response.status);
        return Err(ResourceError::status_failure(
            target,
            response.status,
            &body,
            response.body,
        ));
    }

    Ok(HttpReply {
        status: response.status,
        headers: response.headers,
        body: response.body,
    })
}

fn build_header_map(
    url: &str,
    options: &RequestOptions,
    token: Option<&str>,
) -> Result<HeaderMap, ResourceError> {
    let mut map = HeaderMap::with_capacity(options.headers.len() + 2);
    for (name, value) in &options.headers {
        let name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|e| ResourceError::build(url, e))?;
        let value = HeaderValue::from_str(value).map_err(|e| ResourceError::build(url, e))?;
        map.insert(name, value);
    }

    if let Some(cookie) = &options.cookie {
        // Append to an existing Cookie header rather than replacing it.
        let rendered = match map.get(COOKIE).and_then(|v| v.to_str().ok()) {
            Some(existing) => format!("{existing}; {}", cookie.pair()),
            None => cookie.pair(),
        };
        map.insert(
            COOKIE,
            HeaderValue::from_str(&rendered).map_err(|e| ResourceError::build(url, e))?,
        );
    }

    if let Some(token) = token.filter(|t| !t.is_empty()) {
        map.insert(
            AUTHORIZATION,
            HeaderValue::from_str(token).map_err(|e| ResourceError::build(url, e))?,
        );
    }

    Ok(map)
}

/// Re-parse a `?`-bearing URL and re-encode its query string so that key
/// escaping is consistent no matter how the caller spelled it.
fn canonicalize_query(raw: &str) -> Result<String, ResourceError> {
    let mut parsed = Url::parse(raw).map_err(|e| ResourceError::build(raw, e))?;
    let pairs: Vec<(String, String)> = parsed
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    if pairs.is_empty() {
        parsed.set_query(None);
    } else {
        parsed.query_pairs_mut().clear().extend_pairs(pairs);
    }
    Ok(parsed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ResourceError;
    use crate::options::{Cookie, RequestOptions};
    use crate::transport::{HttpTransport, TransportRequest, TransportResponse};
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    #[test]
    fn canonicalize_reencodes_values() {
        let out = canonicalize_query("http://example.invalid/p?name=%41&b=two words").unwrap();
        assert_eq!(out, "http://example.invalid/p?name=A&b=two+words");
    }

    #[test]
    fn canonicalize_drops_empty_query() {
        let out = canonicalize_query("http://example.invalid/p?").unwrap();
        assert_eq!(out, "http://example.invalid/p");
    }

    #[test]
    fn header_map_rejects_invalid_names() {
        let options = RequestOptions::new().header("bad header", "v");
        let err = build_header_map("http://example.invalid", &options, None).unwrap_err();
        assert_eq!(err.http_code, 0);
        assert!(err.source.is_some());
    }

    #[test]
    fn cookie_appends_to_existing_header() {
        let options = RequestOptions::new()
            .header("Cookie", "a=1")
            .cookie(Cookie::new("session", "xyz"));
        let map = build_header_map("http://example.invalid", &options, None).unwrap();
        assert_eq!(map.get(COOKIE).unwrap(), "a=1; session=xyz");
    }

    #[tokio::test]
    async fn sends_token_and_cookie_headers() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/check")
            .match_header("authorization", "Bearer abc")
            .match_header("cookie", "session=xyz")
            .with_status(200)
            .with_body("ok")
            .create_async()
            .await;

        let url = format!("{}/check", server.url());
        let options = RequestOptions::new().cookie(Cookie::new("session", "xyz"));
        let reply = send_request("GET", &url, Some("Bearer abc"), Bytes::new(), &options)
            .await
            .expect("request should succeed");

        assert_eq!(reply.status, 200);
        assert_eq!(reply.body.as_ref(), b"ok");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn empty_token_sets_no_authorization() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/anon")
            .match_header("authorization", mockito::Matcher::Missing)
            .with_status(200)
            .create_async()
            .await;

        let url = format!("{}/anon", server.url());
        send_request("GET", &url, Some(""), Bytes::new(), &RequestOptions::new())
            .await
            .expect("request should succeed");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn status_failure_echoes_outgoing_body() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/missing")
            .with_status(404)
            .with_body("not found")
            .create_async()
            .await;

        let url = format!("{}/missing", server.url());
        let err = send_request(
            "POST",
            &url,
            None,
            Bytes::from_static(b"ping"),
            &RequestOptions::new(),
        )
        .await
        .unwrap_err();

        assert_eq!(err.http_code, 404);
        assert_eq!(err.body, "ping");
        assert_eq!(err.response.as_ref(), b"not found");
        assert_eq!(err.message, "incorrect response status code");
    }

    #[tokio::test]
    async fn query_is_reencoded_before_dispatch() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/q")
            .match_query(mockito::Matcher::UrlEncoded("name".into(), "A".into()))
            .with_status(200)
            .create_async()
            .await;

        // %41 decodes to a plain "A" in the canonical form.
        let url = format!("{}/q?name=%41", server.url());
        send_request("GET", &url, None, Bytes::new(), &RequestOptions::new())
            .await
            .expect("request should succeed");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn connection_refusal_reports_code_zero() {
        let err = send_request(
            "GET",
            "http://127.0.0.1:1/unreachable",
            None,
            Bytes::new(),
            &RequestOptions::new(),
        )
        .await
        .unwrap_err();

        assert_eq!(err.http_code, 0);
        assert!(err.source.is_some());
    }

    struct RecordingTransport {
        seen: Mutex<Option<TransportRequest>>,
    }

    #[async_trait]
    impl HttpTransport for RecordingTransport {
        async fn execute(
            &self,
            request: TransportRequest,
        ) -> Result<TransportResponse, ResourceError> {
            *self.seen.lock().unwrap() = Some(request);
            Ok(TransportResponse {
                status: 200,
                headers: HeaderMap::new(),
                body: Bytes::from_static(b"synthetic"),
            })
        }
    }

    #[tokio::test]
    async fn transport_override_bypasses_network() {
        let transport = Arc::new(RecordingTransport {
            seen: Mutex::new(None),
        });
        let options = RequestOptions::new().transport(transport.clone());

        let reply = send_request(
            "PUT",
            "http://example.invalid/any",
            None,
            Bytes::from_static(b"payload"),
            &options,
        )
        .await
        .expect("synthetic transport should answer");

        assert_eq!(reply.body.as_ref(), b"synthetic");
        let seen = transport.seen.lock().unwrap().take().expect("request captured");
        assert_eq!(seen.method, Method::PUT);
        assert_eq!(seen.timeout, defaults::REQUEST_TIMEOUT);
        assert_eq!(seen.body.as_ref(), b"payload");
    }
}
