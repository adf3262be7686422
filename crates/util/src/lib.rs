pub mod async_runtime;
pub mod http;
pub mod path_processing;

pub use async_runtime::BlockingRuntime;
pub use http::{build_path, parse_response_body};
pub use path_processing::expand_tilde;

use once_cell::sync::Lazy;
use regex::Regex;

static SENSITIVE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)(authorization: )([\w\-\.=:/+ ]+)",
        r"(?i)([A-Z0-9_]*?(KEY|TOKEN|SECRET|PASSWORD)[=:] ?)([^\s]+)",
    ]
    .iter()
    .filter_map(|pattern| Regex::new(pattern).ok())
    .collect()
});

/// Header names whose values never reach the logs.
const SENSITIVE_HEADERS: &[&str] = &["authorization", "proxy-authorization", "cookie", "x-api-key"];

/// Redacts values that look like secrets in a string.
pub fn redact_sensitive(input: &str) -> String {
    let mut redacted = input.to_string();
    for pattern in SENSITIVE_PATTERNS.iter() {
        redacted = pattern
            .replace_all(&redacted, |caps: &regex::Captures| {
                let prefix = caps.get(1).map(|m| m.as_str()).unwrap_or("");
                format!("{prefix}<redacted>")
            })
            .to_string();
    }
    redacted
}

/// Returns a loggable rendering of a single header value.
pub fn redact_header_value(name: &str, value: &str) -> String {
    if SENSITIVE_HEADERS.iter().any(|header| header.eq_ignore_ascii_case(name)) {
        return "<redacted>".to_string();
    }
    redact_sensitive(value)
}
