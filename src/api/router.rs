//! Router assembly: public health probe, authenticated analysis routes,
//! CORS, and the request body cap.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::{middleware, Router};
use tower_http::cors::CorsLayer;

use crate::api::endpoints::{analyze, health, reports};
use crate::api::middleware::auth::require_auth;
use crate::api::types::AppState;
use crate::pipeline::extraction::MAX_DOCUMENT_BYTES;

/// Extra room on top of the document bound for multipart framing.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn api_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/api/documents/analyze", post(analyze::analyze_document))
        .route("/api/reports", post(reports::create_report))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ));

    Router::new()
        .route("/api/health", get(health::health))
        .merge(protected)
        .layer(DefaultBodyLimit::max(
            MAX_DOCUMENT_BYTES + MULTIPART_OVERHEAD_BYTES,
        ))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
