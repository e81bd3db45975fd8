//! Development server for the browser front-end
//!
//! Provides a simple HTTP server that:
//! - Serves the page shells and the wasm package from one directory
//! - Forwards `/api/*` to the catalog backend, so the pages can issue same-origin requests

use axum::{
    body::Bytes,
    extract::State,
    http::{header::CONTENT_TYPE, HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use libcat::CatalogError;
use std::{net::SocketAddr, path::PathBuf};
use tower_http::{services::ServeDir, trace::TraceLayer};

/// Shared state for the dev server
#[derive(Clone)]
struct DevServerState {
    /// Backend origin requests are forwarded to
    backend: url::Url,
    client: reqwest::Client,
}

/// Development server for the catalog pages
pub struct DevServer {
    /// Port the server is running on
    port: u16,
    /// Directory holding `index.html`, `viewer.html`, `sparql.html` and `pkg/`
    static_root: PathBuf,
    state: DevServerState,
}

impl DevServer {
    /// Create a new dev server
    ///
    /// # Arguments
    /// * `static_root` - Directory containing the page shells
    /// * `port` - Port to bind the server to
    /// * `backend` - Origin of the catalog backend
    pub fn new(static_root: PathBuf, port: u16, backend: url::Url) -> Self {
        Self {
            port,
            static_root,
            state: DevServerState {
                backend,
                client: reqwest::Client::new(),
            },
        }
    }

    /// Start the dev server (blocking until shutdown signal)
    pub async fn serve(
        self,
        shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let addr = SocketAddr::from(([127, 0, 0, 1], self.port));
        let backend = self.state.backend.clone();

        let app = Router::new()
            .route("/api/*path", any(proxy_handler))
            .fallback_service(ServeDir::new(&self.static_root))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state);

        tracing::info!("Dev server starting on http://{}", addr);
        println!("\nDev server running at http://{addr}");
        println!("Serving: {}", self.static_root.display());
        println!("Forwarding /api to {backend}\n");

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app.into_make_service())
            .with_graceful_shutdown(shutdown_signal)
            .await?;

        tracing::info!("Dev server shut down");
        Ok(())
    }
}

/// `/api/*` handler
async fn proxy_handler(
    State(state): State<DevServerState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    match forward(&state, method, &uri, &headers, body).await {
        Ok(response) => response,
        Err(err) => {
            tracing::warn!("[DevServer] Forwarding {uri} failed: {err}");
            (StatusCode::BAD_GATEWAY, err.to_string()).into_response()
        }
    }
}

async fn forward(
    state: &DevServerState,
    method: Method,
    uri: &Uri,
    headers: &HeaderMap,
    body: Bytes,
) -> Result<Response, CatalogError> {
    let path = uri
        .path_and_query()
        .map(|p| p.as_str())
        .unwrap_or_else(|| uri.path());
    let url = state.backend.join(path)?;
    let method = reqwest::Method::from_bytes(method.as_str().as_bytes())
        .map_err(|e| CatalogError::Command(format!("unsupported method: {e}")))?;

    let mut request = state.client.request(method, url).body(body.to_vec());
    if let Some(content_type) = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()) {
        request = request.header(reqwest::header::CONTENT_TYPE, content_type);
    }
    let response = request.send().await?;

    let status = StatusCode::from_u16(response.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/json")
        .to_string();
    let body = response.bytes().await?;
    tracing::debug!("[DevServer] {} {} -> {}", uri.path(), body.len(), status);
    Ok((status, [(CONTENT_TYPE, content_type)], body.to_vec()).into_response())
}
