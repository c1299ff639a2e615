//! Slack client implementation.
//!
//! [`SlackClient`] resolves API method URLs, injects the token and timestamp
//! into every request, delegates to an [`HttpTransport`] and decodes the
//! JSON body of the response.

use crate::auth::{merge_auth, Clock, SystemClock};
use crate::config::{SlackConfig, SlackToken, TlsVerify};
use crate::errors::{ParseError, SlackError, SlackResult};
use crate::observability::redact_query;
use crate::transport::{HttpTransport, HttpVerb, ReqwestTransport, RequestOptions};
use once_cell::sync::OnceCell;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Client for the Slack Web API
pub struct SlackClient {
    config: SlackConfig,
    token: Option<SlackToken>,
    transport: OnceCell<Arc<dyn HttpTransport>>,
    clock: Arc<dyn Clock>,
}

impl SlackClient {
    /// Create a client around an existing transport.
    ///
    /// The transport's TLS verification is resolved immediately, as by
    /// [`SlackClient::set_transport`].
    pub fn new(transport: Arc<dyn HttpTransport>, token: Option<String>) -> SlackResult<Self> {
        let mut client = Self::from_config(SlackConfig::default());
        client.set_token_opt(token);
        client.set_transport(transport, None)?;
        Ok(client)
    }

    /// Create a client from configuration.
    ///
    /// No transport is built here; the default [`ReqwestTransport`] is
    /// created from the configuration on first use.
    pub fn from_config(config: SlackConfig) -> Self {
        let token = config.token.clone();
        Self {
            config,
            token,
            transport: OnceCell::new(),
            clock: Arc::new(SystemClock),
        }
    }

    /// Create a client from environment variables (see [`SlackConfig::from_env`])
    pub fn from_env() -> SlackResult<Self> {
        Ok(Self::from_config(SlackConfig::from_env()?))
    }

    /// Use a different clock for request timestamps
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Get the configuration
    pub fn config(&self) -> &SlackConfig {
        &self.config
    }

    /// Install the transport returned by `factory`.
    ///
    /// The factory is always invoked and its result always replaces the
    /// current transport. Afterwards `verify` is applied as by
    /// [`SlackClient::set_ssl_verify_path`].
    pub fn set_transport_factory<F>(
        &mut self,
        factory: F,
        verify: Option<TlsVerify>,
    ) -> SlackResult<()>
    where
        F: FnOnce() -> SlackResult<Arc<dyn HttpTransport>>,
    {
        let transport = factory()?;
        self.transport = OnceCell::with_value(transport);
        self.set_ssl_verify_path(verify)
    }

    /// Install `transport` if the client has none yet.
    ///
    /// An already configured transport is kept and `transport` is dropped;
    /// use [`SlackClient::set_transport_factory`] to replace one. `verify` is
    /// applied to whichever transport ends up installed.
    pub fn set_transport(
        &mut self,
        transport: Arc<dyn HttpTransport>,
        verify: Option<TlsVerify>,
    ) -> SlackResult<()> {
        if self.transport.set(transport).is_err() {
            debug!("Transport already configured, keeping the existing one");
        }
        self.set_ssl_verify_path(verify)
    }

    /// Build the default transport if none is configured, then apply `verify`
    pub fn ensure_transport(&mut self, verify: Option<TlsVerify>) -> SlackResult<()> {
        self.transport()?;
        self.set_ssl_verify_path(verify)
    }

    /// Get the transport, building the default one on first use
    pub fn transport(&self) -> SlackResult<&Arc<dyn HttpTransport>> {
        self.transport.get_or_try_init(|| {
            debug!(timeout = ?self.config.timeout, "Building default transport");
            let transport = ReqwestTransport::with_options(
                self.config.timeout,
                self.config.default_headers.clone(),
                self.config.tls_verify.clone(),
            )?;
            Ok::<_, SlackError>(Arc::new(transport) as Arc<dyn HttpTransport>)
        })
    }

    /// Set the TLS verification used for every HTTPS request.
    ///
    /// With `None` the transport's current setting is kept, or
    /// [`TlsVerify::Bundled`] is installed if it has none.
    pub fn set_ssl_verify_path(&self, verify: Option<TlsVerify>) -> SlackResult<()> {
        // build the default transport first so its configured setting is seen
        let transport = self.transport()?;
        let verify = verify
            .or_else(|| transport.default_verify())
            .unwrap_or(TlsVerify::Bundled);
        debug!(verify = ?verify, "Applying TLS verification");
        transport.set_default_verify(verify)
    }

    /// TLS verification currently applied, [`TlsVerify::Bundled`] if unset
    pub fn ssl_verify_path(&self) -> TlsVerify {
        self.transport
            .get()
            .and_then(|transport| transport.default_verify())
            .unwrap_or(TlsVerify::Bundled)
    }

    /// Set the token sent with every request
    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = Some(SlackToken::new(token));
    }

    /// Stop sending a token
    pub fn clear_token(&mut self) {
        self.token = None;
    }

    fn set_token_opt(&mut self, token: Option<String>) {
        self.token = token.map(SlackToken::new);
    }

    pub(crate) fn token(&self) -> Option<&SlackToken> {
        self.token.as_ref()
    }

    /// Full URL for an API method, e.g. `chat.postMessage`
    pub fn url(&self, api_method: &str) -> String {
        self.config.build_url(api_method)
    }

    /// Merge the token and current timestamp into `options`
    pub fn merge_parameters(&self, options: RequestOptions) -> RequestOptions {
        merge_auth(options, self.token(), self.clock.as_ref())
    }

    /// Send a GET request to an API method
    pub async fn get(&self, api_method: &str, options: RequestOptions) -> SlackResult<Value> {
        self.call(HttpVerb::Get, api_method, options).await
    }

    /// Send a POST request to an API method
    pub async fn post(&self, api_method: &str, options: RequestOptions) -> SlackResult<Value> {
        self.call(HttpVerb::Post, api_method, options).await
    }

    /// Send a PUT request to an API method
    pub async fn put(&self, api_method: &str, options: RequestOptions) -> SlackResult<Value> {
        self.call(HttpVerb::Put, api_method, options).await
    }

    /// Send a DELETE request to an API method
    pub async fn delete(&self, api_method: &str, options: RequestOptions) -> SlackResult<Value> {
        self.call(HttpVerb::Delete, api_method, options).await
    }

    /// Send a PATCH request to an API method
    pub async fn patch(&self, api_method: &str, options: RequestOptions) -> SlackResult<Value> {
        self.call(HttpVerb::Patch, api_method, options).await
    }

    /// Send a GET request and deserialize the response into `T`
    pub async fn get_as<T: DeserializeOwned>(
        &self,
        api_method: &str,
        options: RequestOptions,
    ) -> SlackResult<T> {
        let url = self.url(api_method);
        let options = self.merge_parameters(options);
        self.method_as(HttpVerb::Get, &url, options).await
    }

    #[instrument(skip(self, verb, options), fields(verb = %verb))]
    async fn call(
        &self,
        verb: HttpVerb,
        api_method: &str,
        options: RequestOptions,
    ) -> SlackResult<Value> {
        let url = self.url(api_method);
        let options = self.merge_parameters(options);
        self.method(verb, &url, options).await
    }

    /// Dispatch `options` to `url` with the transport's `verb` method and
    /// decode the body as JSON.
    ///
    /// No authentication is added here; the verb methods do that.
    pub async fn method(
        &self,
        verb: HttpVerb,
        url: &str,
        options: RequestOptions,
    ) -> SlackResult<Value> {
        self.method_as(verb, url, options).await
    }

    /// Like [`SlackClient::method`], deserializing into `T`
    pub async fn method_as<T: DeserializeOwned>(
        &self,
        verb: HttpVerb,
        url: &str,
        options: RequestOptions,
    ) -> SlackResult<T> {
        let transport = self.transport()?;

        debug!(
            verb = %verb,
            url = %url,
            query = ?redact_query(&options.query),
            has_body = options.body.is_some(),
            "Dispatching request"
        );

        let body = match verb {
            HttpVerb::Get => transport.get(url, &options).await?,
            HttpVerb::Post => transport.post(url, &options).await?,
            HttpVerb::Put => transport.put(url, &options).await?,
            HttpVerb::Delete => transport.delete(url, &options).await?,
            HttpVerb::Patch => transport.patch(url, &options).await?,
        };

        serde_json::from_slice(&body).map_err(|e| SlackError::Parse(ParseError::from(e)))
    }
}

impl std::fmt::Debug for SlackClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlackClient")
            .field("base_url", &self.config.base_url.as_str())
            .field("token", &self.token)
            .field("has_transport", &self.transport.get().is_some())
            .finish()
    }
}
