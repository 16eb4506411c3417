use std::error::Error as StdError;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Config;
use crate::records::Grid;

pub const SHEETS_API_BASE: &str = "https://sheets.googleapis.com";
/// Fixed cell range served by the proxy.
pub const RANGE: &str = "Sheet1!A:AY";

const GENERIC_UPSTREAM_ERROR: &str = "Google Sheets API Error";

#[derive(Error, Debug)]
pub enum FetchError {
    /// The provider answered with a non-success status.
    #[error("{0}")]
    Upstream(String),
    /// The provider could not be reached or its body was not JSON.
    #[error("Google Sheets API unavailable: {0}")]
    UpstreamUnavailable(#[source] Box<dyn StdError + Send + Sync>),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::UpstreamUnavailable(Box::new(err))
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::UpstreamUnavailable(Box::new(err))
    }
}

/// Body of a `spreadsheets.values.get` response. Both fields are optional:
/// a sheet without data omits `values`, a failed call carries `error`.
#[derive(Deserialize, Debug, Default)]
struct ValuesResponse {
    #[serde(default)]
    values: Option<Grid>,
    #[serde(default)]
    error: Option<ErrorDetail>,
}

#[derive(Deserialize, Debug)]
struct ErrorDetail {
    #[serde(default)]
    message: Option<String>,
}

/// Read-only client for the Google Sheets v4 values endpoint.
#[derive(Clone, Debug)]
pub struct SheetsClient {
    http: reqwest::Client,
    base_url: String,
}

impl SheetsClient {
    pub fn new() -> Result<Self, FetchError> {
        Self::with_base_url(SHEETS_API_BASE)
    }

    /// Point the client at another host serving the same API, e.g. a mock server.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(SheetsClient {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn values_url(&self, sheet_id: &str) -> String {
        format!(
            "{}/v4/spreadsheets/{}/values/{}",
            self.base_url, sheet_id, RANGE
        )
    }

    /// Fetch the raw grid for [`RANGE`]. A sheet without values yields an
    /// empty grid rather than an error.
    pub async fn fetch_values(&self, config: &Config) -> Result<Grid, FetchError> {
        let url = self.values_url(&config.sheet_id);
        debug!("GET {}", url);

        let response = self
            .http
            .get(&url)
            .query(&[("key", config.api_key.as_str())])
            .send()
            .await?;
        let status = response.status();
        let bytes = response.bytes().await?;
        // the body must be JSON whatever the status
        let body: Value = serde_json::from_slice(&bytes)?;

        if !status.is_success() {
            let message = serde_json::from_value::<ValuesResponse>(body)
                .ok()
                .and_then(|parsed| parsed.error)
                .and_then(|error| error.message)
                .unwrap_or_else(|| GENERIC_UPSTREAM_ERROR.to_string());
            warn!(%status, "Google Sheets API rejected the request: {}", message);
            return Err(FetchError::Upstream(message));
        }

        let parsed: ValuesResponse = serde_json::from_value(body)?;
        Ok(parsed.values.unwrap_or_default())
    }
}
