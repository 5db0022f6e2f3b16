//! Patient and patient-image entity models.

use serde::Serialize;
use sqlx::FromRow;

use angiomark_core::types::{DbId, Timestamp};

/// A row from the `patients` table.
///
/// The identifier is the normalized remote folder name and serves as the
/// primary key. Patients come into existence only through sync.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Patient {
    pub patient_id: String,
    pub created_at: Timestamp,
}

/// A row from the `patient_images` table: one staged image of a patient.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PatientImage {
    pub id: DbId,
    pub patient_id: String,
    /// One of `early`, `mid`, `late`.
    pub stage: String,
    pub image_url: String,
    pub created_at: Timestamp,
}

/// DTO for the images written during a patient's image replacement.
#[derive(Debug, Clone)]
pub struct NewPatientImage {
    pub stage: String,
    pub image_url: String,
}
