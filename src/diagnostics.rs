//! Operator-facing snapshot of the proxy's environment.

use std::env;

use chrono::{DateTime, SecondsFormat, Utc};
use http::StatusCode;
use serde::Serialize;
use tracing::info;

use crate::config::{ENV_API_KEY, ENV_SHEET_ID};
use crate::handler::ApiResponse;

const NOT_SET: &str = "NOT_SET";
const ENV_RUNTIME_NAMES: [&str; 2] = ["APP_ENV", "NODE_ENV"];

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct DebugInfo {
    pub message: &'static str,
    pub environment: EnvironmentSnapshot,
    #[serde(rename = "nodeEnv")]
    pub node_env: Option<String>,
    pub timestamp: String,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentSnapshot {
    #[serde(rename = "API_KEY")]
    pub api_key: String,
    #[serde(rename = "SHEET_ID")]
    pub sheet_id: String,
    #[serde(rename = "API_KEY_length")]
    pub api_key_length: usize,
    #[serde(rename = "SHEET_ID_length")]
    pub sheet_id_length: usize,
    #[serde(rename = "API_KEY_raw_exists")]
    pub api_key_raw_exists: bool,
    #[serde(rename = "SHEET_ID_raw_exists")]
    pub sheet_id_raw_exists: bool,
}

/// Keep the first 10 and last 5 characters of `key`.
pub fn redact(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    let head: String = chars.iter().take(10).collect();
    let tail: String = chars[chars.len().saturating_sub(5)..].iter().collect();
    format!("{}...{}", head, tail)
}

impl DebugInfo {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok(), Utc::now())
    }

    pub fn from_lookup<F>(lookup: F, now: DateTime<Utc>) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        // an empty variable reads as unset
        let read = |name: &str| lookup(name).filter(|value| !value.is_empty());
        let api_key = read(ENV_API_KEY);
        let sheet_id = read(ENV_SHEET_ID);

        let environment = EnvironmentSnapshot {
            api_key: api_key.as_deref().map_or_else(|| NOT_SET.to_string(), redact),
            sheet_id: sheet_id.clone().unwrap_or_else(|| NOT_SET.to_string()),
            // an unset variable reports the length of the placeholder
            api_key_length: api_key.as_deref().unwrap_or(NOT_SET).chars().count(),
            sheet_id_length: sheet_id.as_deref().unwrap_or(NOT_SET).chars().count(),
            api_key_raw_exists: api_key.is_some(),
            sheet_id_raw_exists: sheet_id.is_some(),
        };

        DebugInfo {
            message: "Debug Info",
            environment,
            node_env: ENV_RUNTIME_NAMES.iter().find_map(|name| read(*name)),
            timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

pub fn diagnostics_response() -> ApiResponse {
    let info = DebugInfo::from_env();
    info!(
        api_key_set = info.environment.api_key_raw_exists,
        sheet_id_set = info.environment.sheet_id_raw_exists,
        "Serving debug info"
    );
    ApiResponse::json(StatusCode::OK, &info)
}
