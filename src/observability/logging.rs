//! Logging utilities with sensitive data redaction.

use std::collections::BTreeMap;

const REDACTED: &str = "[REDACTED]";

const SENSITIVE_PARAMS: [&str; 5] = ["token", "key", "secret", "password", "api_key"];

fn is_sensitive(name: &str) -> bool {
    SENSITIVE_PARAMS.iter().any(|s| name.eq_ignore_ascii_case(s))
}

/// Copy of a query map with sensitive values replaced
pub fn redact_query(query: &BTreeMap<String, String>) -> BTreeMap<String, String> {
    query
        .iter()
        .map(|(key, value)| {
            let value = if is_sensitive(key) {
                REDACTED.to_string()
            } else {
                value.clone()
            };
            (key.clone(), value)
        })
        .collect()
}
