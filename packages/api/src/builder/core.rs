//! Core `FetchBuilder` structures and base functionality
//!
//! Contains the builder struct, its body typestates and the constructors
//! every chain starts from.

use std::fmt;
use std::time::Duration;

use fetchkit_client::{FetchClient, RequestConfig};

/// Content types the builder knows how to announce and encode for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    ApplicationJson,
    ApplicationFormUrlEncoded,
    ApplicationOctetStream,
    TextPlain,
    TextHtml,
    MultipartFormData,
}

impl ContentType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ContentType::ApplicationJson => "application/json",
            ContentType::ApplicationFormUrlEncoded => "application/x-www-form-urlencoded",
            ContentType::ApplicationOctetStream => "application/octet-stream",
            ContentType::TextPlain => "text/plain",
            ContentType::TextHtml => "text/html",
            ContentType::MultipartFormData => "multipart/form-data",
        }
    }
}

impl From<&str> for ContentType {
    fn from(s: &str) -> Self {
        let essence = s.split(';').next().unwrap_or_default().trim();
        match essence {
            "application/x-www-form-urlencoded" => ContentType::ApplicationFormUrlEncoded,
            "application/octet-stream" => ContentType::ApplicationOctetStream,
            "text/plain" => ContentType::TextPlain,
            "text/html" => ContentType::TextHtml,
            "multipart/form-data" => ContentType::MultipartFormData,
            _ => ContentType::ApplicationJson,
        }
    }
}

/// State marker for a builder without a request body
#[derive(Debug, Clone, Copy)]
pub struct BodyNotSet;

/// State marker for a builder with a request body
#[derive(Debug, Clone, Copy)]
pub struct BodySet;

/// Fluent request builder
///
/// The type parameter tracks whether a body has been set: `get`, `head`
/// and `delete` are only available without one, `post`, `put` and `patch`
/// only with one.
///
/// # Examples
///
/// ```no_run
/// use fetchkit::FetchBuilder;
///
/// # async fn run() -> fetchkit::Result<()> {
/// let user: serde_json::Value = FetchBuilder::json()
///     .query("expand", "teams")
///     .get("https://api.example.com/users/1")
///     .json()
///     .await?;
/// # let _ = user;
/// # Ok(())
/// # }
/// ```
pub struct FetchBuilder<S = BodyNotSet> {
    pub(crate) client: Option<FetchClient>,
    pub(crate) config: RequestConfig,
    pub(crate) content_type: Option<ContentType>,
    pub(crate) state: S,
    pub(crate) debug_enabled: bool,
}

impl FetchBuilder<BodyNotSet> {
    /// Start a builder that sends through the process-wide client.
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: None,
            config: RequestConfig::new(),
            content_type: None,
            state: BodyNotSet,
            debug_enabled: false,
        }
    }

    /// Start a builder bound to a specific client.
    #[must_use]
    pub fn with_client(client: &FetchClient) -> Self {
        Self {
            client: Some(client.clone()),
            ..Self::new()
        }
    }

    /// Start a builder for a JSON API: sets `Accept: application/json` and
    /// serializes bodies as JSON.
    #[must_use]
    pub fn json() -> Self {
        Self::new()
            .accept_content_type(ContentType::ApplicationJson)
            .content_type(ContentType::ApplicationJson)
    }

    /// Start a builder that url-encodes bodies.
    #[must_use]
    pub fn form_urlencoded() -> Self {
        Self::new().content_type(ContentType::ApplicationFormUrlEncoded)
    }
}

impl Default for FetchBuilder<BodyNotSet> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> FetchBuilder<S> {
    /// Log the request line when the call is sent.
    #[must_use]
    pub fn debug(mut self) -> Self {
        self.debug_enabled = true;
        self
    }

    /// Choose the content type of the body set later.
    ///
    /// The header is written when the body is set. For [`FetchBuilder::body`]
    /// this also picks the encoding: url-encoded for
    /// [`ContentType::ApplicationFormUrlEncoded`], JSON otherwise.
    #[must_use]
    pub fn content_type(mut self, content_type: ContentType) -> Self {
        self.content_type = Some(content_type);
        self
    }

    /// Abort the call if it has not settled after `timeout`.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.timeout(timeout);
        self
    }

    #[must_use]
    pub fn timeout_seconds(self, seconds: u64) -> Self {
        self.timeout(Duration::from_secs(seconds))
    }

    /// The configuration collected so far.
    #[must_use]
    pub fn config(&self) -> &RequestConfig {
        &self.config
    }

    /// Carry the configuration over into another body state.
    pub(crate) fn into_state<T>(self, state: T) -> FetchBuilder<T> {
        FetchBuilder {
            client: self.client,
            config: self.config,
            content_type: self.content_type,
            state,
            debug_enabled: self.debug_enabled,
        }
    }
}

impl<S: fmt::Debug> fmt::Debug for FetchBuilder<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchBuilder")
            .field("client", &self.client)
            .field("config", &self.config)
            .field("content_type", &self.content_type)
            .field("state", &self.state)
            .field("debug_enabled", &self.debug_enabled)
            .finish()
    }
}
