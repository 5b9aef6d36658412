//! Serve command implementation.

use super::check::build_routes;
use anyhow::{Context, Result};
use axum::{
    body::Body,
    extract::State,
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};
use ddpub_render::{Payload, RouteTable};
use std::path::Path;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Validate the site, then serve it until interrupted.
pub async fn serve_site(config_dir: &Path, notes_dir: &Path, host: &str, port: u16) -> Result<()> {
    let routes = build_routes(config_dir, notes_dir)?;
    let app = app(Arc::new(routes));

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    tracing::info!("Serving at http://{}", addr);
    println!("\nServing at http://{}", addr);
    println!("   Press Ctrl+C to stop\n");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Every request goes through an exact lookup in `routes`.
pub fn app(routes: Arc<RouteTable>) -> Router {
    Router::new()
        .fallback(serve_route)
        .with_state(routes)
        .layer(TraceLayer::new_for_http())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", err);
    }
}

async fn serve_route(State(routes): State<Arc<RouteTable>>, uri: Uri) -> Response {
    let raw = uri.path();
    let Ok(path) = urlencoding::decode(raw) else {
        return not_found();
    };

    if let Some(payload) = routes.get(&path) {
        return respond(payload).await;
    }

    if !path.ends_with('/') && routes.contains(&format!("{}/", path)) {
        return (
            StatusCode::MOVED_PERMANENTLY,
            [(header::LOCATION, format!("{}/", raw))],
        )
            .into_response();
    }

    not_found()
}

async fn respond(payload: &Payload) -> Response {
    let body = match &payload.body {
        ddpub_render::Body::Bytes(bytes) => Body::from(bytes.to_vec()),
        ddpub_render::Body::File(path) => match tokio::fs::read(path).await {
            Ok(content) => Body::from(content),
            Err(err) => {
                tracing::warn!("Failed to read {:?}: {}", path, err);
                return not_found();
            }
        },
    };

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, payload.content_type.clone())],
        body,
    )
        .into_response()
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "404 Not Found").into_response()
}
