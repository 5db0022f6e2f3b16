//! Domain logic for the Angiomark annotation workflow.
//!
//! Pure types and functions with no I/O: the error taxonomy, staged-image
//! classification, annotation field validation, patient identifier
//! normalization, and the natural ordering used during synchronization.

pub mod annotation;
pub mod error;
pub mod ident;
pub mod natsort;
pub mod stage;
pub mod types;
