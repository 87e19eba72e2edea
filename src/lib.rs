//! http-dispatch
//!
//! Thin helpers around `reqwest` for one-shot request/response exchanges:
//! build a request (method, URL, headers, cookie, optional bearer token),
//! send it with a timeout through the shared client or a caller-supplied
//! transport, and decode the body as JSON or XML into a caller-chosen type.
//! Form-encoded POSTs and multipart file uploads are covered by dedicated
//! entry points.
//!
//! Nothing is retried and no state is shared between calls beyond the
//! default connection pool; retry policy belongs to the caller.
//!
//! ```rust,ignore
//! use http_dispatch::{RequestOptions, request_json};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct Status { ok: bool }
//!
//! let reply = request_json::<Status>(
//!     "POST",
//!     "https://api.example.com/v1/check",
//!     serde_json::to_vec(&payload)?,
//!     &RequestOptions::new(),
//! )
//! .await?;
//! assert!(reply.value.unwrap().ok);
//! ```
#![deny(unsafe_code)]

pub mod defaults;
pub mod dispatch;
pub mod error;
pub mod multipart;
pub mod options;
pub mod request;
pub mod transport;

pub use dispatch::{HttpReply, send_request};
pub use error::{HttpError, ResourceError};
pub use multipart::FileItem;
pub use options::{Cookie, RequestOptions};
pub use request::{
    TypedReply, post_file_json, post_file_json_with_token, post_form_json, post_form_xml,
    put_file_json, put_file_json_with_token, request_json, request_json_with_token, request_xml,
    request_xml_with_token,
};
pub use transport::{HttpTransport, TransportRequest, TransportResponse};
