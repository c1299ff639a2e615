//! Mock implementations for testing.
//!
//! Provides a recording transport and a fixed clock so client behavior can
//! be asserted without a network.

use crate::auth::Clock;
use crate::config::TlsVerify;
use crate::errors::{SlackError, SlackResult, TransportError};
use crate::transport::{HttpTransport, HttpVerb, RequestOptions};
use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicI64, Ordering};

/// Mock response configuration
#[derive(Debug, Clone)]
pub struct MockResponse {
    /// Response body
    pub body: String,
    /// Error to return instead
    pub error: Option<SlackError>,
}

impl MockResponse {
    /// Create a successful JSON response
    pub fn json<T: Serialize>(data: &T) -> Self {
        Self::ok(serde_json::to_string(data).expect("mock response must serialize"))
    }

    /// Create a successful response with raw body
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            error: None,
        }
    }

    /// Create an error response
    pub fn error(error: impl Into<SlackError>) -> Self {
        Self {
            body: String::new(),
            error: Some(error.into()),
        }
    }

    /// Create a response the transport rejects with the given HTTP status
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self::error(TransportError::Status {
            status,
            body: body.into(),
        })
    }
}

/// Recorded request for verification
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    /// Request verb
    pub verb: HttpVerb,
    /// Request URL
    pub url: String,
    /// Query and body as handed to the transport
    pub options: RequestOptions,
}

impl RecordedRequest {
    /// Look up a query parameter
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.options.query.get(name).map(String::as_str)
    }
}

/// Mock HTTP transport for testing
pub struct MockHttpTransport {
    /// Queue of responses to return
    responses: Mutex<VecDeque<MockResponse>>,
    /// Recorded requests
    requests: Mutex<Vec<RecordedRequest>>,
    /// Default response if queue is empty
    default_response: Option<MockResponse>,
    /// Default TLS verification
    verify: RwLock<Option<TlsVerify>>,
}

impl MockHttpTransport {
    /// Create a new mock transport
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            default_response: None,
            verify: RwLock::new(None),
        }
    }

    /// Add a response to the queue
    pub fn add_response(self, response: MockResponse) -> Self {
        self.responses.lock().push_back(response);
        self
    }

    /// Add a JSON response
    pub fn add_json_response<T: Serialize>(self, data: &T) -> Self {
        self.add_response(MockResponse::json(data))
    }

    /// Set default response when queue is empty
    pub fn with_default_response(mut self, response: MockResponse) -> Self {
        self.default_response = Some(response);
        self
    }

    /// Start with a TLS verification already set
    pub fn with_verify(self, verify: TlsVerify) -> Self {
        *self.verify.write() = Some(verify);
        self
    }

    /// Get recorded requests
    pub fn recorded_requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }

    /// Get the last recorded request
    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.requests.lock().last().cloned()
    }

    /// Get remaining response count
    pub fn remaining_responses(&self) -> usize {
        self.responses.lock().len()
    }

    fn next_response(&self) -> Option<MockResponse> {
        let mut queue = self.responses.lock();
        queue.pop_front().or_else(|| self.default_response.clone())
    }
}

impl Default for MockHttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpTransport for MockHttpTransport {
    async fn send(
        &self,
        verb: HttpVerb,
        url: &str,
        options: &RequestOptions,
    ) -> SlackResult<Bytes> {
        self.requests.lock().push(RecordedRequest {
            verb,
            url: url.to_string(),
            options: options.clone(),
        });

        let response = self.next_response().ok_or_else(|| {
            SlackError::Transport(TransportError::Http("No mock response configured".to_string()))
        })?;

        if let Some(error) = response.error {
            return Err(error);
        }

        Ok(Bytes::from(response.body))
    }

    fn default_verify(&self) -> Option<TlsVerify> {
        self.verify.read().clone()
    }

    fn set_default_verify(&self, verify: TlsVerify) -> SlackResult<()> {
        *self.verify.write() = Some(verify);
        Ok(())
    }
}

impl std::fmt::Debug for MockHttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockHttpTransport")
            .field("pending_responses", &self.responses.lock().len())
            .field("recorded_requests", &self.requests.lock().len())
            .finish()
    }
}

/// Clock returning a settable instant
#[derive(Debug)]
pub struct FixedClock {
    now: AtomicI64,
}

impl FixedClock {
    /// Create a clock frozen at `now` (seconds since the epoch)
    pub fn new(now: i64) -> Self {
        Self {
            now: AtomicI64::new(now),
        }
    }

    /// Move the clock to `now`
    pub fn set(&self, now: i64) {
        self.now.store(now, Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn unix_timestamp(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}
