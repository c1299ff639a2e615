//! Configuration management for the Slack client.
//!
//! Supports configuration via:
//! - Explicit values
//! - Environment variables
//! - Builder pattern

use crate::errors::{ConfigurationError, SlackResult};
use http::HeaderMap;
use secrecy::{ExposeSecret, SecretString};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Token type enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    /// Bot token (xoxb-*)
    Bot,
    /// User token (xoxp-*)
    User,
    /// App-level token (xapp-*)
    App,
    /// Legacy or otherwise unrecognised token
    Other,
}

impl TokenType {
    /// Detect token type from prefix
    pub fn from_token(token: &str) -> Self {
        if token.starts_with("xoxb-") {
            TokenType::Bot
        } else if token.starts_with("xoxp-") {
            TokenType::User
        } else if token.starts_with("xapp-") {
            TokenType::App
        } else {
            TokenType::Other
        }
    }
}

/// Secure wrapper for Slack tokens
#[derive(Clone)]
pub struct SlackToken {
    token: SecretString,
    token_type: TokenType,
}

impl SlackToken {
    /// Create a new token
    pub fn new(token: impl Into<String>) -> Self {
        let token_str = token.into();
        let token_type = TokenType::from_token(&token_str);
        Self {
            token: SecretString::new(token_str),
            token_type,
        }
    }

    /// Get the token type
    pub fn token_type(&self) -> TokenType {
        self.token_type
    }

    /// Expose the token for use in requests
    pub(crate) fn expose(&self) -> &str {
        self.token.expose_secret()
    }
}

impl std::fmt::Debug for SlackToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SlackToken({:?}, [REDACTED])", self.token_type)
    }
}

/// TLS certificate verification setting applied to the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TlsVerify {
    /// Use the CA roots bundled with the TLS backend
    Bundled,
    /// Use only the roots found in this PEM bundle
    CaBundle(PathBuf),
    /// Do not verify server certificates
    Disabled,
}

impl TlsVerify {
    /// Parse a textual setting.
    ///
    /// An empty (or blank) value means "not given" and yields `None`, so that
    /// callers fall back to the transport's current default. `false`/`0`
    /// disable verification, `true`/`1` select the bundled roots, and any
    /// other value is taken as a path to a CA bundle.
    pub fn from_setting(value: &str) -> Option<Self> {
        let value = value.trim();
        match value.to_ascii_lowercase().as_str() {
            "" => None,
            "false" | "0" => Some(TlsVerify::Disabled),
            "true" | "1" => Some(TlsVerify::Bundled),
            _ => Some(TlsVerify::CaBundle(PathBuf::from(value))),
        }
    }
}

impl From<bool> for TlsVerify {
    fn from(verify: bool) -> Self {
        if verify {
            TlsVerify::Bundled
        } else {
            TlsVerify::Disabled
        }
    }
}

impl From<PathBuf> for TlsVerify {
    fn from(path: PathBuf) -> Self {
        TlsVerify::CaBundle(path)
    }
}

impl From<&str> for TlsVerify {
    fn from(path: &str) -> Self {
        TlsVerify::CaBundle(PathBuf::from(path))
    }
}

/// Configuration for the Slack client
#[derive(Clone)]
pub struct SlackConfig {
    /// Token sent with every request
    pub(crate) token: Option<SlackToken>,
    /// Base URL for API requests
    pub base_url: Url,
    /// Request timeout
    pub timeout: Duration,
    /// TLS verification applied to the default transport
    pub tls_verify: Option<TlsVerify>,
    /// Default headers
    pub default_headers: HeaderMap,
}

impl std::fmt::Debug for SlackConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlackConfig")
            .field("token", &self.token.as_ref().map(|t| t.token_type))
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("tls_verify", &self.tls_verify)
            .finish()
    }
}

impl Default for SlackConfig {
    fn default() -> Self {
        Self {
            token: None,
            base_url: Url::parse(crate::DEFAULT_BASE_URL)
                .expect("DEFAULT_BASE_URL is a valid URL"),
            timeout: Duration::from_secs(crate::DEFAULT_TIMEOUT_SECS),
            tls_verify: None,
            default_headers: HeaderMap::new(),
        }
    }
}

impl SlackConfig {
    /// Create a new configuration builder
    pub fn builder() -> SlackConfigBuilder {
        SlackConfigBuilder::new()
    }

    /// Create configuration from environment variables
    ///
    /// Reads:
    /// - `SLACK_TOKEN` (falls back to `SLACK_BOT_TOKEN`)
    /// - `SLACK_BASE_URL`
    /// - `SLACK_TIMEOUT` - seconds
    /// - `SLACK_SSL_VERIFY` - `false`, `true`, or a CA bundle path
    pub fn from_env() -> SlackResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Create configuration from an arbitrary variable lookup
    pub(crate) fn from_lookup<F>(lookup: F) -> SlackResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = SlackConfigBuilder::new();

        if let Some(token) = lookup("SLACK_TOKEN").or_else(|| lookup("SLACK_BOT_TOKEN")) {
            builder = builder.token(token);
        }

        if let Some(url) = lookup("SLACK_BASE_URL") {
            builder = builder.base_url(&url)?;
        }

        if let Some(timeout) = lookup("SLACK_TIMEOUT") {
            let secs = timeout.parse::<u64>().map_err(|e| {
                ConfigurationError::EnvVar(format!("SLACK_TIMEOUT: {}", e))
            })?;
            builder = builder.timeout(Duration::from_secs(secs));
        }

        if let Some(verify) = lookup("SLACK_SSL_VERIFY").and_then(|v| TlsVerify::from_setting(&v)) {
            builder = builder.tls_verify(verify);
        }

        Ok(builder.build())
    }

    /// Get the token if available
    pub fn token(&self) -> Option<&SlackToken> {
        self.token.as_ref()
    }

    /// Build the full URL for an endpoint
    ///
    /// Trailing separators on the base collapse into exactly one `/`; the
    /// endpoint is appended as given.
    pub fn build_url(&self, endpoint: &str) -> String {
        let base = self.base_url.as_str().trim_end_matches('/');
        format!("{}/{}", base, endpoint)
    }
}

/// Builder for SlackConfig
#[derive(Default)]
pub struct SlackConfigBuilder {
    config: SlackConfig,
}

impl SlackConfigBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self {
            config: SlackConfig::default(),
        }
    }

    /// Set the token
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.config.token = Some(SlackToken::new(token));
        self
    }

    /// Set the base URL
    pub fn base_url(mut self, url: &str) -> Result<Self, ConfigurationError> {
        self.config.base_url =
            Url::parse(url).map_err(|e| ConfigurationError::InvalidConfiguration {
                message: format!("Invalid URL: {}", e),
            })?;
        Ok(self)
    }

    /// Set the timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the TLS verification used by the default transport
    pub fn tls_verify(mut self, verify: impl Into<TlsVerify>) -> Self {
        self.config.tls_verify = Some(verify.into());
        self
    }

    /// Add a default header
    pub fn default_header(mut self, name: &str, value: &str) -> Self {
        if let Ok(header_name) = name.parse::<http::header::HeaderName>() {
            if let Ok(header_value) = value.parse::<http::header::HeaderValue>() {
                self.config.default_headers.insert(header_name, header_value);
            }
        }
        self
    }

    /// Build the configuration
    pub fn build(self) -> SlackConfig {
        self.config
    }
}
