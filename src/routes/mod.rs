//! Route modules for the OCR server

pub mod frontend;
pub mod health;
pub mod ocr;

use axum::{routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the full application router
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/", get(frontend::index))
        .route("/health", get(health::health_check))
        .merge(ocr::router(state.config().server.max_upload_bytes));

    frontend::mount_static(app, &state.config().frontend.static_dir)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
