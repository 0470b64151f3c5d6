//! Request body handling
//!
//! Setting a body moves the builder into the [`BodySet`] state, which is the
//! only state offering `post`, `put` and `patch`.

use bytes::Bytes;
use fetchkit_client::{FormData, RequestBody};
use http::header::CONTENT_TYPE;
use serde::Serialize;

use crate::builder::core::{BodyNotSet, BodySet, ContentType, FetchBuilder};

impl FetchBuilder<BodyNotSet> {
    /// Serialize `body` according to the chosen content type
    ///
    /// Url-encodes for [`ContentType::ApplicationFormUrlEncoded`] and uses
    /// JSON otherwise. Serialization failures surface when the request is sent.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use fetchkit::FetchBuilder;
    /// use serde::Serialize;
    ///
    /// #[derive(Serialize)]
    /// struct User {
    ///     name: String,
    /// }
    ///
    /// let pending = FetchBuilder::json()
    ///     .body(&User { name: "Ada".to_string() })
    ///     .post("https://api.example.com/users");
    /// ```
    #[must_use]
    pub fn body<T: Serialize + ?Sized>(self, body: &T) -> FetchBuilder<BodySet> {
        match self.content_type {
            Some(ContentType::ApplicationFormUrlEncoded) => self.form(body),
            _ => {
                let mut builder = self.with_content_type(ContentType::ApplicationJson);
                builder.config = builder.config.json(body);
                builder.into_state(BodySet)
            }
        }
    }

    /// Url-encode `body` as `application/x-www-form-urlencoded`.
    #[must_use]
    pub fn form<T: Serialize + ?Sized>(self, body: &T) -> FetchBuilder<BodySet> {
        let mut builder = self.with_content_type(ContentType::ApplicationFormUrlEncoded);
        builder.config = builder.config.form(body);
        builder.into_state(BodySet)
    }

    /// Send `form` as `multipart/form-data`; the boundary is generated on send.
    #[must_use]
    pub fn multipart(mut self, form: FormData) -> FetchBuilder<BodySet> {
        self.content_type = Some(ContentType::MultipartFormData);
        self.config = self.config.body(RequestBody::Form(form));
        self.into_state(BodySet)
    }

    /// Send raw bytes, `application/octet-stream` unless a content type was chosen.
    #[must_use]
    pub fn raw_body(self, bytes: impl Into<Bytes>) -> FetchBuilder<BodySet> {
        let content_type = self
            .content_type
            .unwrap_or(ContentType::ApplicationOctetStream);
        let mut builder = self.with_content_type(content_type);
        builder.config = builder.config.body(RequestBody::Bytes(bytes.into()));
        builder.into_state(BodySet)
    }

    /// Send text, `text/plain` unless a content type was chosen.
    #[must_use]
    pub fn text_body(self, text: &str) -> FetchBuilder<BodySet> {
        let content_type = self.content_type.unwrap_or(ContentType::TextPlain);
        let mut builder = self.with_content_type(content_type);
        builder.config = builder.config.body(RequestBody::Text(text.to_string()));
        builder.into_state(BodySet)
    }

    fn with_content_type(mut self, content_type: ContentType) -> Self {
        self.content_type = Some(content_type);
        self.config = self.config.header(CONTENT_TYPE, content_type.as_str());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Search<'a> {
        q: &'a str,
        page: u32,
    }

    #[test]
    fn form_builder_url_encodes_body() {
        let builder = FetchBuilder::form_urlencoded().body(&Search { q: "rust", page: 2 });
        assert_eq!(
            builder.config().get_headers()["content-type"],
            "application/x-www-form-urlencoded"
        );
        assert!(builder.config().pending_error().is_none());
    }

    #[test]
    fn plain_body_defaults_to_json() {
        let builder = FetchBuilder::new().body(&Search { q: "rust", page: 1 });
        assert_eq!(builder.config().get_headers()["content-type"], "application/json");
    }

    #[test]
    fn multipart_leaves_content_type_to_encoder() {
        let builder = FetchBuilder::json().multipart(FormData::new().text("a", "1"));
        assert!(!builder.config().get_headers().contains_key("content-type"));
    }

    #[test]
    fn text_body_respects_chosen_content_type() {
        let builder = FetchBuilder::new()
            .content_type(ContentType::TextHtml)
            .text_body("<p>hi</p>");
        assert_eq!(builder.config().get_headers()["content-type"], "text/html");
    }
}
