//! Multipart form payloads
//!
//! `FormData` is both the multipart request body and the result of reading
//! an url-encoded response body with [`Response::form_data`](crate::http::Response::form_data).

use bytes::{BufMut, Bytes, BytesMut};

/// Value of a single form field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartValue {
    Text(String),
    Bytes(Bytes),
}

/// A named form field with optional file metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    name: String,
    value: PartValue,
    filename: Option<String>,
    content_type: Option<String>,
}

impl Part {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn value(&self) -> &PartValue {
        &self.value
    }

    #[must_use]
    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }
}

/// Ordered collection of form fields
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    parts: Vec<Part>,
}

impl FormData {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a text field.
    #[must_use]
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.append_text(name, value);
        self
    }

    /// Append a file field.
    #[must_use]
    pub fn file(
        mut self,
        name: impl Into<String>,
        filename: impl Into<String>,
        data: impl Into<Bytes>,
        content_type: Option<&str>,
    ) -> Self {
        self.parts.push(Part {
            name: name.into(),
            value: PartValue::Bytes(data.into()),
            filename: Some(filename.into()),
            content_type: content_type.map(str::to_string),
        });
        self
    }

    pub fn append_text(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.parts.push(Part {
            name: name.into(),
            value: PartValue::Text(value.into()),
            filename: None,
            content_type: None,
        });
    }

    /// First text value stored under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.parts.iter().find_map(|part| match (&part.value, part.name == name) {
            (PartValue::Text(text), true) => Some(text.as_str()),
            _ => None,
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Part> {
        self.parts.iter()
    }

    /// Encode as `multipart/form-data` with a fresh boundary.
    ///
    /// Returns the boundary together with the encoded body.
    #[must_use]
    pub fn encode(&self) -> (String, Bytes) {
        let boundary = generate_boundary();
        let body = self.encode_with_boundary(&boundary);
        (boundary, body)
    }

    pub(crate) fn encode_with_boundary(&self, boundary: &str) -> Bytes {
        let mut out = BytesMut::new();
        for part in &self.parts {
            out.put_slice(b"--");
            out.put_slice(boundary.as_bytes());
            out.put_slice(b"\r\nContent-Disposition: form-data; name=\"");
            out.put_slice(escape_field(&part.name).as_bytes());
            out.put_u8(b'"');
            if let Some(filename) = &part.filename {
                out.put_slice(b"; filename=\"");
                out.put_slice(escape_field(filename).as_bytes());
                out.put_u8(b'"');
            }
            out.put_slice(b"\r\n");

            match (&part.content_type, &part.filename) {
                (Some(content_type), _) => {
                    out.put_slice(b"Content-Type: ");
                    out.put_slice(content_type.as_bytes());
                    out.put_slice(b"\r\n");
                }
                (None, Some(_)) => out.put_slice(b"Content-Type: application/octet-stream\r\n"),
                (None, None) => {}
            }
            out.put_slice(b"\r\n");

            match &part.value {
                PartValue::Text(text) => out.put_slice(text.as_bytes()),
                PartValue::Bytes(bytes) => out.put_slice(bytes),
            }
            out.put_slice(b"\r\n");
        }
        out.put_slice(b"--");
        out.put_slice(boundary.as_bytes());
        out.put_slice(b"--\r\n");
        out.freeze()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormData {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut form = FormData::new();
        for (name, value) in iter {
            form.append_text(name, value);
        }
        form
    }
}

fn generate_boundary() -> String {
    format!("----formdata-fetchkit-{:016x}", fastrand::u64(..))
}

// Quotes and line breaks would terminate the header parameter early.
fn escape_field(value: &str) -> String {
    value
        .replace('"', "%22")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}
