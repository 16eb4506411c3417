//! Local development server: the sheet endpoint plus the dashboard's static files.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::{Method, StatusCode, Uri};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::{Config, ConfigError};
use crate::diagnostics;
use crate::handler::{self, ApiResponse, Deployment, CONTENT_TYPE_JSON};
use crate::sheets::SheetsClient;

pub const DEFAULT_PORT: u16 = 5503;
pub const SHEET_PATH: &str = "/getSheet";
pub const DEBUG_PATH: &str = "/debug";

const INDEX_DOCUMENT: &str = "/index.html";
const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// State shared read-only by every request.
#[derive(Debug)]
pub struct AppState {
    /// Resolved once at startup. A failure here is answered on every sheet
    /// request and never re-checked.
    pub config: Result<Config, ConfigError>,
    pub client: SheetsClient,
    pub static_root: PathBuf,
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        match self.body {
            Some(body) => (self.status, [(CONTENT_TYPE, CONTENT_TYPE_JSON)], body).into_response(),
            None => self.status.into_response(),
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(SHEET_PATH, any(get_sheet))
        .route(DEBUG_PATH, any(debug_info))
        .fallback(static_file)
        .layer(middleware::from_fn(cors))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `host:port` and serve until Ctrl+C.
pub async fn serve(state: Arc<AppState>, host: &str, port: u16) -> std::io::Result<()> {
    let listener = TcpListener::bind((host, port)).await?;
    log_banner(&state, port);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

fn log_banner(state: &AppState, port: u16) {
    let (has_api_key, has_sheet_id) = match &state.config {
        Ok(_) => (true, true),
        Err(err) => err.presence(),
    };
    info!("Development server started");
    info!("URL:          http://localhost:{}", port);
    info!("API endpoint: http://localhost:{}{}", port, SHEET_PATH);
    info!(
        "Environment:  {}",
        if has_api_key { "API_KEY set" } else { "API_KEY missing" }
    );
    info!(
        "Sheet ID:     {}",
        if has_sheet_id { "SHEET_ID set" } else { "SHEET_ID missing" }
    );
    info!("Static root:  {}", state.static_root.display());
    info!("Press Ctrl+C to stop the server");
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {}", err);
        std::future::pending::<()>().await;
    }
}

// Answers preflight on every path and stamps CORS headers on all responses.
async fn cors(request: Request, next: Next) -> Response {
    let mut response = if request.method() == Method::OPTIONS {
        ApiResponse::preflight().into_response()
    } else {
        next.run(request).await
    };
    response
        .headers_mut()
        .extend(Deployment::Local.cors_headers());
    response
}

// No method check here: anything but OPTIONS fetches the sheet.
async fn get_sheet(State(state): State<Arc<AppState>>) -> ApiResponse {
    handler::sheet_response(Deployment::Local, &state.config, &state.client).await
}

async fn debug_info() -> ApiResponse {
    diagnostics::diagnostics_response()
}

async fn static_file(State(state): State<Arc<AppState>>, uri: Uri) -> Response {
    let pathname = match uri.path() {
        "/" => INDEX_DOCUMENT,
        path => path,
    };

    let Some(file_path) = resolve_static_path(&state.static_root, pathname) else {
        info!("404 {} (outside static root)", pathname);
        return not_found();
    };

    match tokio::fs::read(&file_path).await {
        Ok(contents) => {
            info!("Served {}", pathname);
            ([(CONTENT_TYPE, content_type_for(&file_path))], contents).into_response()
        }
        Err(err) => {
            info!("404 {} ({})", pathname, err);
            not_found()
        }
    }
}

fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        [(CONTENT_TYPE, "text/plain")],
        "404 Not Found",
    )
        .into_response()
}

/// Map a request path onto a file below `root`. Paths that would climb out of
/// the root (`..`, absolute prefixes) resolve to nothing.
pub fn resolve_static_path(root: &Path, pathname: &str) -> Option<PathBuf> {
    let relative = Path::new(pathname.trim_start_matches('/'));
    let mut resolved = root.to_path_buf();
    for component in relative.components() {
        match component {
            Component::Normal(part) => resolved.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(resolved)
}

/// Content type by file extension. Matching is case-sensitive.
pub fn content_type_for(path: &Path) -> &'static str {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("html") => "text/html",
        Some("css") => "text/css",
        Some("js") => "application/javascript",
        Some("json") => "application/json",
        Some("png") => "image/png",
        Some("jpg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        _ => DEFAULT_CONTENT_TYPE,
    }
}
