//! HTTP request handlers, grouped by resource.

pub mod annotation;
pub mod auth;
pub mod queue;
