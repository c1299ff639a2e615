//! Observability helpers for the Slack client.
//!
//! The crate emits `tracing` events and spans; installing a subscriber is
//! left to the host application.

pub mod logging;

pub use logging::*;
