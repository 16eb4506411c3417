use aws_lambda_events::apigw::{ApiGatewayProxyRequest, ApiGatewayProxyResponse};
use aws_lambda_events::encodings::Body;
use http::header::CONTENT_TYPE;
use http::{HeaderValue, Method};
use lambda_runtime::{Error, LambdaEvent};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::diagnostics;
use crate::handler::{self, ApiResponse, Deployment, CONTENT_TYPE_JSON};
use crate::sheets::SheetsClient;

// lambda handler
pub async fn function_handler(
    client: &SheetsClient,
    evt: LambdaEvent<ApiGatewayProxyRequest>,
) -> Result<ApiGatewayProxyResponse, Error> {
    let request = evt.payload;
    let path = request.path.as_deref().unwrap_or("/");
    info!("Handling {} {}", request.http_method, path);
    debug!("Request context: {:?}", evt.context);

    let response = route(client, &request.http_method, path).await;
    Ok(into_proxy_response(response))
}

/// Dispatch one invocation. Configuration is resolved on every call since
/// nothing is carried between invocations.
pub async fn route(client: &SheetsClient, method: &Method, path: &str) -> ApiResponse {
    if method == Method::OPTIONS {
        return ApiResponse::preflight();
    }
    // diagnostics answer any method
    if is_diagnostics_path(path) {
        return diagnostics::diagnostics_response();
    }
    if method != Method::GET {
        warn!("Rejecting {} {}", method, path);
        return ApiResponse::method_not_allowed();
    }

    let config = Config::load_from_env();
    handler::sheet_response(Deployment::Hosted, &config, client).await
}

fn is_diagnostics_path(path: &str) -> bool {
    path.trim_end_matches('/').ends_with("/debug")
}

fn into_proxy_response(response: ApiResponse) -> ApiGatewayProxyResponse {
    let mut headers = Deployment::Hosted.cors_headers();
    if response.body.is_some() {
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(CONTENT_TYPE_JSON));
    }

    let mut proxy_response = ApiGatewayProxyResponse::default();
    proxy_response.status_code = i64::from(response.status.as_u16());
    proxy_response.headers = headers;
    proxy_response.body = response.body.map(Body::Text);
    proxy_response
}
