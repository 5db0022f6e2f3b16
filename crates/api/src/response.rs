//! Shared response envelope types for API handlers.
//!
//! Data-carrying read endpoints (the queue view) wrap their payload in a
//! `{ "data": ... }` envelope; auth and health responses stay flat. Use
//! [`DataResponse`] instead of ad-hoc `serde_json::json!({ "data": ... })`
//! to get compile-time type safety and consistent serialization.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
