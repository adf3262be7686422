use std::{collections::HashSet, str::FromStr};

use anyhow::{Context, Result, anyhow};
use indexmap::IndexMap;
use reqwest::{Method, header};
use tracing::{debug, info};
use yamlrest_api::ServiceClient;
use yamlrest_registry::{ApiRegistry, ResolvedRoute};
use yamlrest_types::{ApiRequest, ApiResponse, RequestEntity, Version};
use yamlrest_util::{BlockingRuntime, parse_response_body};

use super::{Transport, TransportError};
use crate::{
    config::HarnessConfig,
    object_path::{evaluate, split_path},
};

/// Param listing statuses to treat as success, e.g. `ignore: 404` or `ignore: "400,404"`.
const IGNORE_PARAM: &str = "ignore";

/// Transport sending calls over HTTP to a live service.
///
/// Owns a single-threaded runtime so it can be driven from synchronous code;
/// it must not be called from inside another Tokio runtime.
#[derive(Debug)]
pub struct HttpTransport {
    client: ServiceClient,
    registry: ApiRegistry,
    runtime: BlockingRuntime,
    version: Version,
}

impl HttpTransport {
    pub fn new(client: ServiceClient, registry: ApiRegistry, version: Version) -> Result<Self> {
        Ok(Self {
            client,
            registry,
            runtime: BlockingRuntime::new()?,
            version,
        })
    }

    /// Builds a transport from configuration. The service version is the
    /// pinned `server_version` or, when absent, probed from the service.
    pub fn connect(config: &HarnessConfig, registry: ApiRegistry) -> Result<Self> {
        let client = ServiceClient::new(&config.base_url, &config.headers, config.timeout()).context("create service client")?;
        let mut transport = Self::new(client, registry, Version::default())?;
        transport.version = match config.server_version {
            Some(version) => version,
            None => transport.probe_version(&config.version_probe_path, &config.version_field)?,
        };
        info!(base_url = %config.base_url, version = %transport.version, "connected to service");
        Ok(transport)
    }

    pub fn registry(&self) -> &ApiRegistry {
        &self.registry
    }

    fn probe_version(&self, probe_path: &str, version_field: &str) -> Result<Version> {
        let response = self
            .runtime
            .block_on(send(&self.client, Method::GET, probe_path, &IndexMap::new(), &IndexMap::new(), None))
            .with_context(|| format!("probe service version at {probe_path}"))?;
        if response.is_error_status() {
            return Err(anyhow!("version probe at {probe_path} returned status {}", response.status));
        }
        let raw = evaluate(&response.body, &split_path(version_field))
            .and_then(|value| value.as_str())
            .ok_or_else(|| anyhow!("version probe response has no string at [{version_field}]"))?;
        Version::from_str(raw).with_context(|| format!("parse service version '{raw}'"))
    }
}

impl Transport for HttpTransport {
    fn call_api(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        let failed = |message: String| TransportError::Failed {
            api: request.api_name.clone(),
            message,
        };

        let mut params = request.params.clone();
        let ignored = params
            .shift_remove(IGNORE_PARAM)
            .map(|raw| parse_ignored(&raw))
            .transpose()
            .map_err(failed)?
            .unwrap_or_default();

        let ResolvedRoute { method, path, query } = self
            .registry
            .route(&request.api_name, &params, request.entity.is_some())
            .map_err(|error| failed(error.to_string()))?;
        let method = Method::from_bytes(method.as_bytes()).map_err(|error| failed(error.to_string()))?;

        debug!(api = %request.api_name, %method, %path, query = ?query, "dispatching http request");
        let response = self
            .runtime
            .block_on(send(&self.client, method, &path, &query, &request.headers, request.entity.as_ref()))
            .map_err(|error| failed(format!("{error:#}")))?;

        if response.is_error_status() && !ignored.contains(&response.status) {
            return Err(TransportError::Remote {
                api: request.api_name.clone(),
                response: Box::new(response),
            });
        }
        Ok(response)
    }

    fn server_version(&self) -> Version {
        self.version
    }
}

fn parse_ignored(raw: &str) -> Result<HashSet<u16>, String> {
    raw.split(',')
        .map(str::trim)
        .filter(|status| !status.is_empty())
        .map(|status| status.parse::<u16>().map_err(|_| format!("invalid ignore status '{status}'")))
        .collect()
}

async fn send(
    client: &ServiceClient,
    method: Method,
    path: &str,
    query: &IndexMap<String, String>,
    headers: &IndexMap<String, String>,
    entity: Option<&RequestEntity>,
) -> Result<ApiResponse> {
    let mut builder = client.request(method, path);
    if !query.is_empty() {
        let pairs: Vec<(&str, &str)> = query.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        builder = builder.query(&pairs);
    }
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    if let Some(entity) = entity {
        builder = builder.header(header::CONTENT_TYPE, entity.content_type.as_str()).body(entity.body.clone());
    }

    let response = builder.send().await.context("send request")?;
    let status = response.status().as_u16();
    let response_headers: IndexMap<String, String> = response
        .headers()
        .iter()
        .filter_map(|(name, value)| value.to_str().ok().map(|value| (name.to_string(), value.to_string())))
        .collect();
    let text = response.text().await.context("read response body")?;

    Ok(ApiResponse {
        status,
        body: parse_response_body(&text),
        headers: response_headers,
    })
}
