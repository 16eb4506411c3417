//! Request handling shared by the Lambda function and the local server.
//!
//! Both deployments answer the sheet endpoint the same way; they differ only in
//! the methods they advertise over CORS and the hints they give when
//! something is misconfigured. Each adapter turns an [`ApiResponse`] into its
//! own response type.

use http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
};
use http::{HeaderMap, HeaderValue, StatusCode};
use serde::Serialize;
use serde_json::json;
use tracing::{error, info};

use crate::config::{Config, ConfigError};
use crate::records::to_records;
use crate::sheets::SheetsClient;

pub const CONTENT_TYPE_JSON: &str = "application/json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deployment {
    /// One function invocation per request.
    Hosted,
    /// Long-running development server.
    Local,
}

impl Deployment {
    pub fn allowed_methods(self) -> &'static str {
        match self {
            Deployment::Hosted => "GET, OPTIONS",
            Deployment::Local => "GET, POST, OPTIONS",
        }
    }

    /// Headers attached to every response. CORS is fully open.
    pub fn cors_headers(self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
        headers.insert(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(self.allowed_methods()),
        );
        headers.insert(
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("Content-Type"),
        );
        headers
    }

    fn missing_config_message(self) -> &'static str {
        match self {
            Deployment::Hosted => {
                "Make sure API_KEY and SHEET_ID are set in the function's environment variables"
            }
            Deployment::Local => "Make sure API_KEY and SHEET_ID are set in the .env file",
        }
    }

    fn fetch_hint(self) -> &'static str {
        match self {
            Deployment::Hosted => "Check API_KEY and SHEET_ID in the function's environment variables",
            Deployment::Local => "Check API_KEY and SHEET_ID in .env",
        }
    }
}

/// Status plus an optional JSON body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: Option<String>,
}

impl ApiResponse {
    pub fn empty(status: StatusCode) -> Self {
        ApiResponse { status, body: None }
    }

    pub fn json<T: Serialize + ?Sized>(status: StatusCode, value: &T) -> Self {
        match serde_json::to_string(value) {
            Ok(body) => ApiResponse {
                status,
                body: Some(body),
            },
            Err(err) => {
                error!("Failed to serialize response body: {}", err);
                ApiResponse {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    body: Some(json!({ "error": err.to_string() }).to_string()),
                }
            }
        }
    }

    pub fn preflight() -> Self {
        Self::empty(StatusCode::OK)
    }

    pub fn method_not_allowed() -> Self {
        Self::json(
            StatusCode::METHOD_NOT_ALLOWED,
            &json!({ "error": "Method not allowed" }),
        )
    }
}

/// Resolve the sheet into records and build the response for it.
///
/// `config` is whatever configuration resolution produced for this request:
/// freshly loaded for the hosted function, resolved at startup for the local
/// server.
pub async fn sheet_response(
    deployment: Deployment,
    config: &Result<Config, ConfigError>,
    client: &SheetsClient,
) -> ApiResponse {
    let config = match config {
        Ok(config) => config,
        Err(err) => return missing_config_response(deployment, err),
    };

    info!("Fetching data from Google Sheets...");
    info!(
        "API_KEY length: {}, SHEET_ID length: {}",
        config.api_key.len(),
        config.sheet_id.len()
    );

    match client.fetch_values(config).await {
        Ok(grid) => {
            let records = to_records(&grid);
            let response = ApiResponse::json(StatusCode::OK, &records);
            info!("Fetched {} rows", records.len());
            response
        }
        Err(err) => {
            error!("Error: {}", err);
            ApiResponse::json(
                StatusCode::INTERNAL_SERVER_ERROR,
                &json!({
                    "error": err.to_string(),
                    "hint": deployment.fetch_hint(),
                }),
            )
        }
    }
}

fn missing_config_response(deployment: Deployment, err: &ConfigError) -> ApiResponse {
    let (has_api_key, has_sheet_id) = err.presence();
    error!(has_api_key, has_sheet_id, "Cannot fetch sheet without configuration");
    ApiResponse::json(
        StatusCode::INTERNAL_SERVER_ERROR,
        &json!({
            "error": "Missing environment variables",
            "message": deployment.missing_config_message(),
            "debug": {
                "hasApiKey": has_api_key,
                "hasSheetId": has_sheet_id,
            },
        }),
    )
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_cors_headers() {
        let headers = Deployment::Hosted.cors_headers();
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_METHODS], "GET, OPTIONS");
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_HEADERS], "Content-Type");

        let headers = Deployment::Local.cors_headers();
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_METHODS], "GET, POST, OPTIONS");
    }

    #[test]
    fn test_preflight_has_no_body() {
        let response = ApiResponse::preflight();
        assert_eq!(response.status, StatusCode::OK);
        assert!(response.body.is_none());
    }

    #[test]
    fn test_method_not_allowed_body() {
        let response = ApiResponse::method_not_allowed();
        assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(
            response.body.as_deref(),
            Some(r#"{"error":"Method not allowed"}"#)
        );
    }

    #[tokio::test]
    async fn test_missing_config_skips_upstream() {
        // nothing listens here; the request must never be attempted
        let client = SheetsClient::with_base_url("http://127.0.0.1:1").unwrap();
        let config = Err(ConfigError::MissingConfiguration {
            has_api_key: false,
            has_sheet_id: true,
        });

        let response = sheet_response(Deployment::Hosted, &config, &client).await;
        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);

        let body: Value = serde_json::from_str(response.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["error"], "Missing environment variables");
        assert_eq!(body["debug"]["hasApiKey"], false);
        assert_eq!(body["debug"]["hasSheetId"], true);
        assert!(body["message"].as_str().unwrap().contains("API_KEY"));
    }

    #[tokio::test]
    async fn test_unreachable_upstream_is_500_with_hint() {
        let client = SheetsClient::with_base_url("http://127.0.0.1:1").unwrap();
        let config = Ok(Config {
            api_key: "key".to_string(),
            sheet_id: "sheet".to_string(),
        });

        let response = sheet_response(Deployment::Local, &config, &client).await;
        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);

        let body: Value = serde_json::from_str(response.body.as_deref().unwrap()).unwrap();
        assert!(body["error"]
            .as_str()
            .unwrap()
            .starts_with("Google Sheets API unavailable"));
        assert_eq!(body["hint"], "Check API_KEY and SHEET_ID in .env");
    }
}
