//! Slack Web API Client
//!
//! A thin client for the Slack Web API:
//! - Verb methods (`get`, `post`, `put`, `delete`, `patch`) addressed by API
//!   method name, e.g. `chat.postMessage`
//! - The token and a Unix timestamp are injected into the query string of
//!   every request
//! - Responses are decoded into `serde_json::Value` (or any
//!   `DeserializeOwned` type)
//! - Pluggable HTTP transport with configurable TLS verification
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use slack_api::{RequestOptions, SlackClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Create client from environment
//!     let client = slack_api::create_client_from_env()?;
//!
//!     let response = client
//!         .post(
//!             "chat.postMessage",
//!             RequestOptions::new()
//!                 .query("channel", "#general")
//!                 .query("text", "Hello, Slack!"),
//!         )
//!         .await?;
//!
//!     println!("ok: {}", response["ok"]);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod auth;
pub mod client;
pub mod config;
pub mod errors;
pub mod transport;

pub mod observability;

// Testing utilities
pub mod mocks;

// Tests
#[cfg(test)]
mod tests;

// Re-exports for convenience
pub use client::SlackClient;
pub use config::{SlackConfig, SlackConfigBuilder, TlsVerify};
pub use errors::{SlackError, SlackResult};
pub use transport::{HttpTransport, HttpVerb, ReqwestTransport, RequestOptions};

/// Default base URL for Slack API
pub const DEFAULT_BASE_URL: &str = "https://slack.com/api";

/// Default timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Create a Slack client with the given configuration
pub fn create_client(config: SlackConfig) -> SlackClient {
    SlackClient::from_config(config)
}

/// Create a Slack client from environment variables
///
/// Reads:
/// - `SLACK_TOKEN` - API token (falls back to `SLACK_BOT_TOKEN`)
/// - `SLACK_BASE_URL` - API root, defaults to [`DEFAULT_BASE_URL`]
/// - `SLACK_TIMEOUT` - Request timeout in seconds
/// - `SLACK_SSL_VERIFY` - `false`, `true`, or the path to a CA bundle
pub fn create_client_from_env() -> SlackResult<SlackClient> {
    SlackClient::from_env()
}
