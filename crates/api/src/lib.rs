//! HTTP client for the service under test.
//!
//! This crate provides a thin wrapper around a configured `reqwest::Client`:
//!
//! - Validating the configured base URL
//! - Applying default headers from the harness configuration
//! - Building requests with a consistent User-Agent
//!
//! The primary entry point is [`ServiceClient`]. Create an instance via
//! [`ServiceClient::new`], and then build requests with
//! [`ServiceClient::request`].
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use indexmap::IndexMap;
//! use yamlrest_api::ServiceClient;
//!
//! let client = ServiceClient::new("http://localhost:9200", &IndexMap::new(), Duration::from_secs(30))?;
//! let response = client.request(reqwest::Method::GET, "/").send().await?;
//! println!("status: {}", response.status());
//! ```

use std::{env, time::Duration};

use anyhow::{Context, Result, anyhow};
use indexmap::IndexMap;
use reqwest::{Client, RequestBuilder, Url, header};
use tracing::debug;

#[derive(Debug, Clone)]
/// Configured `reqwest::Client` bound to the base URL of the service under test.
pub struct ServiceClient {
    pub base_url: String,
    pub http: Client,
    pub user_agent: String,
}

impl ServiceClient {
    /// Construct a client for `base_url` with the given default headers and timeout.
    ///
    /// A trailing `/` on the base URL is dropped so API paths can always start with `/`.
    pub fn new(base_url: &str, default_headers: &IndexMap<String, String>, timeout: Duration) -> Result<Self> {
        validate_base_url(base_url)?;

        let mut headers = header::HeaderMap::new();
        for (name, value) in default_headers {
            let header_name =
                header::HeaderName::from_bytes(name.as_bytes()).with_context(|| format!("invalid header name '{name}'"))?;
            let header_value =
                header::HeaderValue::from_str(value).with_context(|| format!("invalid value for header '{name}'"))?;
            headers.insert(header_name, header_value);
        }
        if !headers.contains_key(header::ACCEPT) {
            headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));
        }

        let http = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .context("build http client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
            user_agent: format!("yamlrest/{}; {}", env!("CARGO_PKG_VERSION"), env::consts::OS),
        })
    }

    /// Build a `reqwest::RequestBuilder` for a method and service-relative path.
    pub fn request(&self, method: reqwest::Method, path: &str) -> RequestBuilder {
        let url = self.url_for(path);
        debug!(%method, %url, "building request");

        self.http
            .request(method, url)
            .header(header::USER_AGENT, &self.user_agent)
    }

    fn url_for(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}

/// Validate that a base URL is acceptable for use by the client.
///
/// Rules:
/// - must parse as an absolute URL
/// - scheme must be `http` or `https`
/// - a host is required
fn validate_base_url(base: &str) -> Result<()> {
    let parsed_base_url = Url::parse(base).map_err(|e| anyhow!("Invalid base URL '{}': {}", base, e))?;

    if !matches!(parsed_base_url.scheme(), "http" | "https") {
        return Err(anyhow!(
            "base URL must use http or https; got '{}://'",
            parsed_base_url.scheme()
        ));
    }

    if parsed_base_url.host_str().is_none() {
        return Err(anyhow!("base URL '{}' must include a host", base));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_http_and_https_hosts() {
        assert!(validate_base_url("http://localhost:9200").is_ok());
        assert!(validate_base_url("https://search.internal.example.com").is_ok());
    }

    #[test]
    fn rejects_other_schemes_and_garbage() {
        assert!(validate_base_url("ftp://localhost").is_err());
        assert!(validate_base_url("not a url").is_err());
    }

    #[test]
    fn joins_paths_without_double_slashes() {
        let client = ServiceClient::new("http://127.0.0.1:9200/", &IndexMap::new(), Duration::from_secs(5)).expect("client");
        assert_eq!(client.base_url, "http://127.0.0.1:9200");
        assert_eq!(client.url_for("/_cluster/health"), "http://127.0.0.1:9200/_cluster/health");
        assert_eq!(client.url_for("test/_doc/1"), "http://127.0.0.1:9200/test/_doc/1");
    }

    #[test]
    fn rejects_invalid_default_headers() {
        let mut headers = IndexMap::new();
        headers.insert("bad header".to_string(), "value".to_string());
        assert!(ServiceClient::new("http://localhost:9200", &headers, Duration::from_secs(5)).is_err());
    }
}
