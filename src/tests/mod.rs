//! Tests for the Slack API client.

#[cfg(test)]
mod client_tests;
