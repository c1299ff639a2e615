//! Authentication parameters for Slack API requests.
//!
//! Every request carries the token and a Unix timestamp as query
//! parameters. [`merge_auth`] writes both into the caller's options.

use crate::config::SlackToken;
use crate::transport::RequestOptions;
use chrono::Utc;

/// Query parameter holding the request timestamp
pub const TIMESTAMP_PARAM: &str = "t";

/// Query parameter holding the token
pub const TOKEN_PARAM: &str = "token";

/// Source of the request timestamp
pub trait Clock: Send + Sync {
    /// Current time as whole seconds since the Unix epoch
    fn unix_timestamp(&self) -> i64;
}

/// Wall-clock time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn unix_timestamp(&self) -> i64 {
        Utc::now().timestamp()
    }
}

/// Merge the token and timestamp into request options.
///
/// `t` and `token` always overwrite whatever the caller put under those keys.
/// Without a token the `token` key is removed rather than sent empty. The
/// body passes through untouched.
pub fn merge_auth(
    options: RequestOptions,
    token: Option<&SlackToken>,
    clock: &dyn Clock,
) -> RequestOptions {
    let RequestOptions { mut query, body } = options;

    query.insert(
        TIMESTAMP_PARAM.to_string(),
        clock.unix_timestamp().to_string(),
    );

    match token {
        Some(token) => {
            query.insert(TOKEN_PARAM.to_string(), token.expose().to_string());
        }
        None => {
            query.remove(TOKEN_PARAM);
        }
    }

    RequestOptions { query, body }
}
