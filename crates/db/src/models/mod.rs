//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - `Deserialize`/plain DTOs for the writes the system actually performs

pub mod annotation;
pub mod case_comment;
pub mod patient;
pub mod user;
