use std::sync::Arc;

use angiomark_drive::RemoteListing;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: angiomark_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Remote listing used by sync; `None` when no credential/root folder
    /// is configured (tests inject an in-memory fake here).
    pub listing: Option<Arc<dyn RemoteListing>>,
}
