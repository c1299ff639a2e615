//! HTTP transport layer for the Slack client.
//!
//! The client never talks to the network itself: it hands a verb, a URL and
//! the merged [`RequestOptions`] to an [`HttpTransport`] and gets the raw
//! response body back.

use crate::config::TlsVerify;
use crate::errors::{ConfigurationError, SlackResult, TransportError};
use async_trait::async_trait;
use bytes::Bytes;
use http::{HeaderMap, Method};
use parking_lot::RwLock;
use reqwest::{Certificate, Client, ClientBuilder};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// HTTP verbs supported by the Slack client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpVerb {
    /// GET
    Get,
    /// POST
    Post,
    /// PUT
    Put,
    /// DELETE
    Delete,
    /// PATCH
    Patch,
}

impl HttpVerb {
    /// The matching `http::Method`
    pub fn as_method(self) -> Method {
        match self {
            HttpVerb::Get => Method::GET,
            HttpVerb::Post => Method::POST,
            HttpVerb::Put => Method::PUT,
            HttpVerb::Delete => Method::DELETE,
            HttpVerb::Patch => Method::PATCH,
        }
    }
}

impl fmt::Display for HttpVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_method().as_str())
    }
}

/// Query and body of a request.
///
/// `query` is encoded into the URL query string, `body` (if any) is sent as
/// JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RequestOptions {
    /// Query-string parameters
    pub query: BTreeMap<String, String>,
    /// Request payload
    pub body: Option<serde_json::Value>,
}

impl RequestOptions {
    /// Create empty options
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a query parameter
    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(name.into(), value.into());
        self
    }

    /// Set the request body
    pub fn body(mut self, body: impl Into<serde_json::Value>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Set the request body from any serializable value
    pub fn json_body<T: Serialize>(mut self, body: &T) -> SlackResult<Self> {
        self.body = Some(serde_json::to_value(body).map_err(|e| {
            ConfigurationError::InvalidConfiguration {
                message: format!("Unserializable request body: {}", e),
            }
        })?);
        Ok(self)
    }
}

/// HTTP transport trait for making API requests
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send a request and return the raw response body
    async fn send(&self, verb: HttpVerb, url: &str, options: &RequestOptions) -> SlackResult<Bytes>;

    /// Send a GET request
    async fn get(&self, url: &str, options: &RequestOptions) -> SlackResult<Bytes> {
        self.send(HttpVerb::Get, url, options).await
    }

    /// Send a POST request
    async fn post(&self, url: &str, options: &RequestOptions) -> SlackResult<Bytes> {
        self.send(HttpVerb::Post, url, options).await
    }

    /// Send a PUT request
    async fn put(&self, url: &str, options: &RequestOptions) -> SlackResult<Bytes> {
        self.send(HttpVerb::Put, url, options).await
    }

    /// Send a DELETE request
    async fn delete(&self, url: &str, options: &RequestOptions) -> SlackResult<Bytes> {
        self.send(HttpVerb::Delete, url, options).await
    }

    /// Send a PATCH request
    async fn patch(&self, url: &str, options: &RequestOptions) -> SlackResult<Bytes> {
        self.send(HttpVerb::Patch, url, options).await
    }

    /// Current default TLS verification, if one was set
    fn default_verify(&self) -> Option<TlsVerify>;

    /// Replace the default TLS verification
    fn set_default_verify(&self, verify: TlsVerify) -> SlackResult<()>;
}

struct ClientState {
    client: Client,
    verify: Option<TlsVerify>,
}

/// Default HTTP transport implementation using reqwest
pub struct ReqwestTransport {
    state: RwLock<ClientState>,
    default_headers: HeaderMap,
    default_timeout: Duration,
}

impl ReqwestTransport {
    /// Create a new transport with the given timeout
    pub fn new(timeout: Duration) -> SlackResult<Self> {
        Self::with_options(timeout, HeaderMap::new(), None)
    }

    /// Create a transport with default headers and an initial TLS setting
    pub fn with_options(
        timeout: Duration,
        default_headers: HeaderMap,
        verify: Option<TlsVerify>,
    ) -> SlackResult<Self> {
        let client = build_client(timeout, &default_headers, verify.as_ref())?;

        Ok(Self {
            state: RwLock::new(ClientState { client, verify }),
            default_headers,
            default_timeout: timeout,
        })
    }
}

fn build_client(
    timeout: Duration,
    default_headers: &HeaderMap,
    verify: Option<&TlsVerify>,
) -> SlackResult<Client> {
    let mut builder = ClientBuilder::new()
        .timeout(timeout)
        .pool_max_idle_per_host(10)
        .default_headers(default_headers.clone());

    match verify {
        None | Some(TlsVerify::Bundled) => {}
        Some(TlsVerify::Disabled) => {
            warn!("TLS certificate verification is disabled");
            builder = builder.danger_accept_invalid_certs(true);
        }
        Some(TlsVerify::CaBundle(path)) => {
            let invalid = |message: String| ConfigurationError::InvalidCaBundle {
                path: path.display().to_string(),
                message,
            };
            let pem = std::fs::read(path).map_err(|e| invalid(e.to_string()))?;
            let certificates =
                Certificate::from_pem_bundle(&pem).map_err(|e| invalid(e.to_string()))?;
            if certificates.is_empty() {
                return Err(invalid("no certificates found".to_string()).into());
            }

            builder = builder.tls_built_in_root_certs(false);
            for certificate in certificates {
                builder = builder.add_root_certificate(certificate);
            }
        }
    }

    builder.build().map_err(|e| {
        TransportError::TlsError {
            message: e.to_string(),
        }
        .into()
    })
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    #[instrument(skip_all, fields(method = %verb, url = %url))]
    async fn send(
        &self,
        verb: HttpVerb,
        url: &str,
        options: &RequestOptions,
    ) -> SlackResult<Bytes> {
        // reqwest clients are reference counted; never hold the lock across an await
        let client = self.state.read().client.clone();

        let mut req_builder = client.request(verb.as_method(), url).query(&options.query);

        if let Some(body) = &options.body {
            req_builder = req_builder.json(body);
        }

        let response = req_builder.send().await.map_err(TransportError::from)?;

        let status = response.status();
        let body = response.bytes().await.map_err(TransportError::from)?;

        if !status.is_success() {
            warn!(status = %status, "Request failed with non-success status");
            return Err(TransportError::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            }
            .into());
        }

        debug!(status = %status, bytes = body.len(), "Received response");
        Ok(body)
    }

    fn default_verify(&self) -> Option<TlsVerify> {
        self.state.read().verify.clone()
    }

    fn set_default_verify(&self, verify: TlsVerify) -> SlackResult<()> {
        let client = build_client(self.default_timeout, &self.default_headers, Some(&verify))?;

        let mut state = self.state.write();
        state.client = client;
        state.verify = Some(verify);
        Ok(())
    }
}

impl fmt::Debug for ReqwestTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReqwestTransport")
            .field("default_timeout", &self.default_timeout)
            .field("verify", &self.state.read().verify)
            .finish()
    }
}
