mod api;

use crate::service::{IngestService, QueryService};
use anyhow::Result;
use axum::{
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use rust_embed::RustEmbed;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

#[derive(RustEmbed)]
#[folder = "web-ui/dist"]
struct Assets;

/// Services shared by every request handler.
pub struct Backend {
    pub ingest: IngestService,
    pub query: QueryService,
}

/// Assembles the API routes, the dashboard assets and permissive CORS.
pub fn build_router(backend: Arc<Backend>) -> Router {
    let api_router = Router::new()
        .route("/api/logs", get(api::recent_logs).post(api::ingest_log))
        .with_state(backend);

    Router::new()
        .merge(api_router)
        .fallback(static_handler)
        .layer(CorsLayer::permissive())
}

pub async fn start_server(backend: Arc<Backend>, addr: SocketAddr) -> Result<()> {
    let app = build_router(backend);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Dashboard:        http://{}/", addr);
    info!("Ingest endpoint:  POST http://{}/api/logs", addr);
    info!("Query endpoint:   GET  http://{}/api/logs", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

async fn static_handler(uri: Uri) -> Response {
    let path = uri.path().trim_start_matches('/');

    if path.is_empty() || path == "index.html" {
        return serve_file("index.html");
    }

    // Unknown paths fall back to the dashboard page.
    if Assets::get(path).is_some() {
        serve_file(path)
    } else {
        serve_file("index.html")
    }
}

fn serve_file(path: &str) -> Response {
    match Assets::get(path) {
        Some(content) => {
            let mime = mime_guess::from_path(path).first_or_octet_stream();
            (
                [(header::CONTENT_TYPE, mime.as_ref().to_string())],
                content.data.into_owned(),
            )
                .into_response()
        }
        None => (StatusCode::NOT_FOUND, "404 Not Found").into_response(),
    }
}
