//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod annotation_repo;
pub mod case_comment_repo;
pub mod patient_repo;
pub mod user_repo;

pub use annotation_repo::AnnotationRepo;
pub use case_comment_repo::CaseCommentRepo;
pub use patient_repo::PatientRepo;
pub use user_repo::UserRepo;
