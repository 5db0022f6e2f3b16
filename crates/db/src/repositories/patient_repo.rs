//! Repository for the `patients` and `patient_images` tables.

use sqlx::PgPool;

use crate::models::patient::{NewPatientImage, Patient, PatientImage};

/// Column list for patients queries.
const PATIENT_COLUMNS: &str = "patient_id, created_at";

/// Column list for patient_images queries.
const IMAGE_COLUMNS: &str = "id, patient_id, stage, image_url, created_at";

/// Provides patient lookup, queue selection, and sync-owned image writes.
pub struct PatientRepo;

impl PatientRepo {
    /// Find a patient by identifier.
    pub async fn find_by_id(
        pool: &PgPool,
        patient_id: &str,
    ) -> Result<Option<Patient>, sqlx::Error> {
        let query = format!("SELECT {PATIENT_COLUMNS} FROM patients WHERE patient_id = $1");
        sqlx::query_as::<_, Patient>(&query)
            .bind(patient_id)
            .fetch_optional(pool)
            .await
    }

    /// Number of patients in the pool.
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM patients")
            .fetch_one(pool)
            .await?;
        Ok(row.0)
    }

    /// Insert the patient if it does not exist yet.
    ///
    /// Idempotent: returns the row either way, with `true` when this call
    /// created it. Safe under concurrent sync runs (`ON CONFLICT DO
    /// NOTHING` + fetch-after-conflict).
    pub async fn create_if_absent(
        pool: &PgPool,
        patient_id: &str,
    ) -> Result<(Patient, bool), sqlx::Error> {
        let insert = format!(
            "INSERT INTO patients (patient_id)
             VALUES ($1)
             ON CONFLICT (patient_id) DO NOTHING
             RETURNING {PATIENT_COLUMNS}"
        );
        if let Some(created) = sqlx::query_as::<_, Patient>(&insert)
            .bind(patient_id)
            .fetch_optional(pool)
            .await?
        {
            return Ok((created, true));
        }

        let select = format!("SELECT {PATIENT_COLUMNS} FROM patients WHERE patient_id = $1");
        let existing = sqlx::query_as::<_, Patient>(&select)
            .bind(patient_id)
            .fetch_one(pool)
            .await?;
        Ok((existing, false))
    }

    /// First patient (by identifier ascending) the given user has not yet
    /// finalized an annotation for. The queue is a per-user set difference
    /// over the shared pool; draft annotations do not remove a patient.
    pub async fn next_unfinalized_for_user(
        pool: &PgPool,
        user_id: i64,
    ) -> Result<Option<Patient>, sqlx::Error> {
        let query = format!(
            "SELECT {PATIENT_COLUMNS} FROM patients p
             WHERE NOT EXISTS (
                 SELECT 1 FROM annotations a
                 WHERE a.patient_id = p.patient_id
                   AND a.user_id = $1
                   AND a.finalized_at IS NOT NULL
             )
             ORDER BY p.patient_id ASC
             LIMIT 1"
        );
        sqlx::query_as::<_, Patient>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Immediate predecessor and successor identifiers in full ascending
    /// patient order, independent of annotation state. Used for the
    /// previous/next navigation links.
    pub async fn neighbors(
        pool: &PgPool,
        patient_id: &str,
    ) -> Result<(Option<String>, Option<String>), sqlx::Error> {
        let prev: Option<(String,)> = sqlx::query_as(
            "SELECT patient_id FROM patients
             WHERE patient_id < $1
             ORDER BY patient_id DESC
             LIMIT 1",
        )
        .bind(patient_id)
        .fetch_optional(pool)
        .await?;

        let next: Option<(String,)> = sqlx::query_as(
            "SELECT patient_id FROM patients
             WHERE patient_id > $1
             ORDER BY patient_id ASC
             LIMIT 1",
        )
        .bind(patient_id)
        .fetch_optional(pool)
        .await?;

        Ok((prev.map(|r| r.0), next.map(|r| r.0)))
    }

    /// All images of a patient, in insertion order.
    pub async fn images_for(
        pool: &PgPool,
        patient_id: &str,
    ) -> Result<Vec<PatientImage>, sqlx::Error> {
        let query = format!(
            "SELECT {IMAGE_COLUMNS} FROM patient_images
             WHERE patient_id = $1
             ORDER BY id ASC"
        );
        sqlx::query_as::<_, PatientImage>(&query)
            .bind(patient_id)
            .fetch_all(pool)
            .await
    }

    /// Replace all of a patient's images with a freshly scanned set.
    ///
    /// Delete-then-insert inside one transaction scoped to this single
    /// patient, so a concurrent reader never observes a partially-replaced
    /// set and re-running with unchanged remote data reproduces the same
    /// rows. Returns the number of images written.
    pub async fn replace_images(
        pool: &PgPool,
        patient_id: &str,
        images: &[NewPatientImage],
    ) -> Result<usize, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM patient_images WHERE patient_id = $1")
            .bind(patient_id)
            .execute(&mut *tx)
            .await?;

        for image in images {
            sqlx::query(
                "INSERT INTO patient_images (patient_id, stage, image_url)
                 VALUES ($1, $2, $3)",
            )
            .bind(patient_id)
            .bind(&image.stage)
            .bind(&image.image_url)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(images.len())
    }
}
