//! Landing page and static assets

use std::path::Path;

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Router,
};
use tower_http::services::ServeDir;

use crate::state::AppState;

const INDEX_FILE: &str = "index.html";
const MISSING_PAGE: &str = "<h1>Frontend missing</h1>";

/// GET /
pub async fn index(State(state): State<AppState>) -> Response {
    let index_path = state.config().frontend.static_dir.join(INDEX_FILE);

    match tokio::fs::read_to_string(&index_path).await {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::warn!("Landing page {} unavailable: {}", index_path.display(), e);
            (StatusCode::INTERNAL_SERVER_ERROR, Html(MISSING_PAGE)).into_response()
        }
    }
}

/// Mount `/static` when the directory exists. Checked once, at startup.
pub fn mount_static(router: Router<AppState>, static_dir: &Path) -> Router<AppState> {
    if static_dir.is_dir() {
        tracing::info!("Serving static assets from {}", static_dir.display());
        router.nest_service("/static", ServeDir::new(static_dir))
    } else {
        tracing::info!(
            "Static directory {} not found, /static disabled",
            static_dir.display()
        );
        router
    }
}
