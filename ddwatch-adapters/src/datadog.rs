//! Datadog adapter using the v1 monitors HTTP API.
//!
//! Lists every monitor visible to the configured API/application key pair
//! with a single `GET /api/v1/monitor` request.
//!
//! ## Example
//!
//! ```rust,no_run
//! use ddwatch_adapters::datadog::DatadogAdapter;
//! use ddwatch_adapters::MonitorSource;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let adapter = DatadogAdapter::builder()
//!         .credentials("api-key", "app-key")
//!         .build()?;
//!
//!     for monitor in adapter.list_monitors().await? {
//!         println!("{} [{}] {}", monitor.id, monitor.overall_state, monitor.name);
//!     }
//!
//!     Ok(())
//! }
//! ```

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use ddwatch_types::{MonitorRecord, MonitorState, Priority};

use crate::{AdapterError, MonitorSource};

/// Default Datadog site.
pub const DEFAULT_SITE: &str = "datadoghq.com";

const API_KEY_HEADER: &str = "dd-api-key";
const APP_KEY_HEADER: &str = "dd-application-key";
const MONITORS_PATH: &str = "/api/v1/monitor";

/// Datadog adapter for listing monitors.
#[derive(Clone)]
pub struct DatadogAdapter {
    client: Client,
    endpoint: String,
    params: ListMonitorsParams,
}

impl DatadogAdapter {
    /// Create a new builder for configuring the adapter.
    pub fn builder() -> DatadogAdapterBuilder {
        DatadogAdapterBuilder::default()
    }

    /// Base URL requests are sent to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Query parameters sent with every list call.
    pub fn params(&self) -> &ListMonitorsParams {
        &self.params
    }

    async fn fetch_monitors(&self) -> Result<Vec<MonitorRecord>, AdapterError> {
        let url = format!("{}{}", self.endpoint, MONITORS_PATH);

        let response = self.client.get(&url).query(&self.params).send().await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(AdapterError::Auth(format!(
                "API returned status {}",
                status
            )));
        }

        if !status.is_success() {
            return Err(AdapterError::Http(format!("API returned status {}", status)));
        }

        let body = response.bytes().await?;
        let monitors: Vec<MonitorResponse> =
            serde_json::from_slice(&body).map_err(|e| AdapterError::Parse(e.to_string()))?;

        let records: Vec<MonitorRecord> = monitors.into_iter().map(MonitorRecord::from).collect();

        if tracing::enabled!(tracing::Level::DEBUG) {
            match serde_json::to_string_pretty(&records) {
                Ok(json) => tracing::debug!(count = records.len(), "listed monitors:\n{}", json),
                Err(e) => tracing::debug!(error = %e, "could not render monitors as JSON"),
            }
        }

        Ok(records)
    }
}

#[async_trait]
impl MonitorSource for DatadogAdapter {
    async fn list_monitors(&self) -> Result<Vec<MonitorRecord>, AdapterError> {
        self.fetch_monitors().await
    }

    fn description(&self) -> String {
        format!("datadog: {}", self.endpoint)
    }
}

impl fmt::Debug for DatadogAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatadogAdapter")
            .field("endpoint", &self.endpoint)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// Filter and pagination parameters for the list monitors call.
///
/// The defaults request the first page of up to 100 monitors with no filters
/// and without downtime information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListMonitorsParams {
    /// Additional group state information to include (`all`, `alert`, ...).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_states: Option<String>,
    /// Filter monitors by name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Comma separated scope tags to filter by.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
    /// Comma separated service/custom tags to filter by.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monitor_tags: Option<String>,
    pub with_downtimes: bool,
    pub id_offset: i64,
    pub page: i64,
    pub page_size: i32,
}

impl Default for ListMonitorsParams {
    fn default() -> Self {
        Self {
            group_states: None,
            name: None,
            tags: None,
            monitor_tags: None,
            with_downtimes: false,
            id_offset: 0,
            page: 0,
            page_size: 100,
        }
    }
}

/// Builder for DatadogAdapter.
#[derive(Default)]
pub struct DatadogAdapterBuilder {
    endpoint: Option<String>,
    site: Option<String>,
    api_key: Option<String>,
    app_key: Option<String>,
    timeout: Option<Duration>,
    params: Option<ListMonitorsParams>,
}

impl DatadogAdapterBuilder {
    /// Set the API and application keys.
    pub fn credentials(mut self, api_key: impl Into<String>, app_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self.app_key = Some(app_key.into());
        self
    }

    /// Set the Datadog site (default: "datadoghq.com").
    ///
    /// Requests go to `https://api.<site>` unless an explicit endpoint is set.
    pub fn site(mut self, site: impl Into<String>) -> Self {
        self.site = Some(site.into());
        self
    }

    /// Override the base URL (e.g., "http://127.0.0.1:8126").
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set a request timeout. By default requests never time out.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Replace the list call parameters.
    pub fn params(mut self, params: ListMonitorsParams) -> Self {
        self.params = Some(params);
        self
    }

    /// Build the adapter.
    pub fn build(self) -> Result<DatadogAdapter, AdapterError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            API_KEY_HEADER,
            sensitive_header(self.api_key.as_deref().unwrap_or_default(), API_KEY_HEADER)?,
        );
        headers.insert(
            APP_KEY_HEADER,
            sensitive_header(self.app_key.as_deref().unwrap_or_default(), APP_KEY_HEADER)?,
        );

        let mut client = Client::builder().default_headers(headers);
        if let Some(timeout) = self.timeout {
            client = client.timeout(timeout);
        }
        let client = client
            .build()
            .map_err(|e| AdapterError::Client(e.to_string()))?;

        let endpoint = match self.endpoint {
            Some(endpoint) => endpoint,
            None => format!(
                "https://api.{}",
                self.site.as_deref().unwrap_or(DEFAULT_SITE)
            ),
        };

        Ok(DatadogAdapter {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            params: self.params.unwrap_or_default(),
        })
    }
}

fn sensitive_header(value: &str, name: &str) -> Result<HeaderValue, AdapterError> {
    let mut header = HeaderValue::from_str(value)
        .map_err(|_| AdapterError::Client(format!("{} contains invalid characters", name)))?;
    header.set_sensitive(true);
    Ok(header)
}

/// Monitor object from the Datadog API. Only the fields ddwatch uses.
#[derive(Debug, Deserialize)]
struct MonitorResponse {
    id: i64,
    #[serde(default)]
    name: String,
    #[serde(default)]
    priority: Option<i64>,
    #[serde(default)]
    overall_state: Option<String>,
    #[serde(default)]
    tags: Option<Vec<String>>,
}

impl From<MonitorResponse> for MonitorRecord {
    fn from(m: MonitorResponse) -> Self {
        MonitorRecord {
            id: m.id,
            name: m.name,
            priority: m
                .priority
                .and_then(|p| u8::try_from(p).ok())
                .and_then(Priority::new),
            overall_state: m
                .overall_state
                .as_deref()
                .map(MonitorState::from_api)
                .unwrap_or_default(),
            tags: m.tags.unwrap_or_default(),
        }
    }
}
