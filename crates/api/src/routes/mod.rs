//! Route definitions: path-to-handler wiring, one module per resource.

pub mod health;

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{annotation, auth, queue};
use crate::state::AppState;

/// Application routes mounted at the root.
///
/// ```text
/// POST /auth/login       -> auth::login
/// GET  /                 -> queue::queue_view
/// POST /save_annotation  -> annotation::save_annotation
/// ```
pub fn app_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(auth::login))
        .route("/", get(queue::queue_view))
        .route("/save_annotation", post(annotation::save_annotation))
}
