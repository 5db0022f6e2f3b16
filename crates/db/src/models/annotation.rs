//! Annotation entity model (one reviewer's judgment on one patient).

use serde::Serialize;
use sqlx::FromRow;

use angiomark_core::types::{DbId, Timestamp};

/// A row from the `annotations` table.
///
/// Exactly one exists per (user, patient), enforced by the
/// `uq_annotations_user_patient` constraint. `finalized_at` stays NULL
/// until the owning reviewer finalizes.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Annotation {
    pub id: DbId,
    pub user_id: DbId,
    pub patient_id: String,
    pub vasculitis_present: bool,
    /// One of `active`, `inactive`, `unknown`, or unset.
    pub activity: Option<String>,
    /// Image quality, 1 (poor) to 10 (good).
    pub quality: Option<i32>,
    /// The reviewer's private comment; finalizing copies it to the shared
    /// ledger but never moves it.
    pub comment: Option<String>,
    pub finalized_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Annotation {
    pub fn is_finalized(&self) -> bool {
        self.finalized_at.is_some()
    }
}

/// Another reviewer's most recently finalized annotation on a patient,
/// shown read-only as a peer reference.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PeerAnnotation {
    pub username: String,
    pub vasculitis_present: bool,
    pub activity: Option<String>,
    pub quality: Option<i32>,
    pub comment: Option<String>,
    pub finalized_at: Option<Timestamp>,
}
