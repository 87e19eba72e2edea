//! Multipart/form-data body encoding for the file-upload entry points.
//!
//! The body is encoded to raw bytes rather than built with
//! `reqwest::multipart::Form` so that the assembled payload can be handed to
//! a transport override like any other request. The generated content-type
//! (boundary included) is injected into the effective headers by the entry
//! point.

use bytes::Bytes;
use std::collections::HashMap;
use uuid::Uuid;

/// A named upload unit: form field key, file name and raw content.
#[derive(Debug, Clone)]
pub struct FileItem {
    pub field: String,
    pub file_name: String,
    pub content: Bytes,
}

impl FileItem {
    pub fn new(
        field: impl Into<String>,
        file_name: impl Into<String>,
        content: impl Into<Bytes>,
    ) -> Self {
        Self {
            field: field.into(),
            file_name: file_name.into(),
            content: content.into(),
        }
    }
}

pub(crate) struct EncodedForm {
    pub content_type: String,
    pub body: Bytes,
}

/// Encode text fields and one file part. Text fields are always written
/// before the file part, and the closing boundary terminator is always
/// present.
pub(crate) fn encode_form(fields: &HashMap<String, String>, file: &FileItem) -> EncodedForm {
    let boundary = Uuid::new_v4().simple().to_string();
    let mut body = Vec::with_capacity(file.content.len() + 512);

    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n",
                escape_quoted(name)
            )
            .as_bytes(),
        );
        body.extend_from_slice(value.as_bytes());
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n",
            escape_quoted(&file.field),
            escape_quoted(&file.file_name)
        )
        .as_bytes(),
    );
    body.extend_from_slice(&file.content);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    EncodedForm {
        content_type: format!("multipart/form-data; boundary={boundary}"),
        body: body.into(),
    }
}

/// Escape `\` and `"` in quoted-string parameters (field names, filenames).
fn escape_quoted(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
