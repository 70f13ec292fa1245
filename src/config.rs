//! Client configuration.
//!
//! All client behaviour is controlled through [`ClientConfig`], built via its
//! [`ClientConfigBuilder`]. Keeping every knob in one struct makes it trivial
//! to share configs across tasks and to diff two runs to understand why their
//! requests differ.
//!
//! # Design choice: builder over constructor
//! The builder lets callers set only what they care about and rely on
//! documented defaults for the rest; most users only ever set the API key.

use crate::error::NanonetsError;
use std::fmt;

/// Default API host. Overridable for proxies and test servers.
pub const DEFAULT_BASE_URL: &str = "https://extraction-api.nanonets.com";

/// Default model for chat completions.
pub const DEFAULT_CHAT_MODEL: &str = "nanonets/Nanonets-OCR-s";

/// Environment variable consulted when no API key is set explicitly.
pub const API_KEY_ENV: &str = "NANONETS_API_KEY";

/// Configuration for a [`crate::NanonetsClient`].
///
/// Built via [`ClientConfig::builder()`] or [`ClientConfig::default()`]
/// (which reads the API key from `NANONETS_API_KEY` at client construction).
///
/// # Example
/// ```rust
/// use nanonets_ocr::ClientConfig;
///
/// let config = ClientConfig::builder()
///     .api_key("sk-test")
///     .timeout_secs(60)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ClientConfig {
    /// Bearer token for the `Authorization` header. If `None`, the client
    /// falls back to the `NANONETS_API_KEY` environment variable.
    pub api_key: Option<String>,

    /// API host, without a trailing slash. Default: [`DEFAULT_BASE_URL`].
    pub base_url: String,

    /// Per-request timeout in seconds. Default: 120.
    ///
    /// Sync extraction holds the connection open while the remote model
    /// reads the document, so a multi-page upload can legitimately take
    /// over a minute. Lower this for latency-sensitive callers and switch
    /// to [`crate::NanonetsClient::extract_async`] plus polling instead.
    pub timeout_secs: u64,

    /// Model used for chat completions when the request does not name one.
    /// Default: [`DEFAULT_CHAT_MODEL`].
    pub chat_model: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 120,
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
        }
    }
}

// Manual Debug so the credential never lands in logs.
impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("chat_model", &self.chat_model)
            .finish()
    }
}

impl ClientConfig {
    /// Create a new builder for `ClientConfig`.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder {
            config: Self::default(),
        }
    }

    /// Resolve the effective API key: explicit value first, then the
    /// `NANONETS_API_KEY` environment variable.
    pub(crate) fn resolve_api_key(&self) -> Result<String, NanonetsError> {
        if let Some(ref key) = self.api_key {
            if !key.is_empty() {
                return Ok(key.clone());
            }
        }
        match std::env::var(API_KEY_ENV) {
            Ok(key) if !key.is_empty() => Ok(key),
            _ => Err(NanonetsError::MissingApiKey),
        }
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.config.base_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.timeout_secs = secs.max(1);
        self
    }

    pub fn chat_model(mut self, model: impl Into<String>) -> Self {
        self.config.chat_model = model.into();
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ClientConfig, NanonetsError> {
        let c = &self.config;
        if !c.base_url.starts_with("http://") && !c.base_url.starts_with("https://") {
            return Err(NanonetsError::InvalidConfig(format!(
                "base_url must be an HTTP(S) URL, got '{}'",
                c.base_url
            )));
        }
        if c.chat_model.is_empty() {
            return Err(NanonetsError::InvalidConfig(
                "chat_model must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}
