//! Repository for the `annotations` table.

use sqlx::PgPool;

use angiomark_core::annotation::ValidAnnotationFields;
use angiomark_core::types::DbId;

use crate::models::annotation::{Annotation, PeerAnnotation};

/// Column list for annotations queries.
const COLUMNS: &str = "id, user_id, patient_id, vasculitis_present, activity, \
    quality, comment, finalized_at, created_at, updated_at";

/// Provides the per-(user, patient) annotation lifecycle.
pub struct AnnotationRepo;

impl AnnotationRepo {
    /// Fetch the annotation for a (user, patient) pair, creating an empty
    /// one on first access.
    ///
    /// Atomic upsert, not read-then-write: two concurrent first views hit
    /// the `uq_annotations_user_patient` constraint, one insert wins, and
    /// the loser falls through to the fetch.
    pub async fn get_or_create(
        pool: &PgPool,
        user_id: DbId,
        patient_id: &str,
    ) -> Result<Annotation, sqlx::Error> {
        let insert = format!(
            "INSERT INTO annotations (user_id, patient_id)
             VALUES ($1, $2)
             ON CONFLICT ON CONSTRAINT uq_annotations_user_patient DO NOTHING
             RETURNING {COLUMNS}"
        );
        if let Some(created) = sqlx::query_as::<_, Annotation>(&insert)
            .bind(user_id)
            .bind(patient_id)
            .fetch_optional(pool)
            .await?
        {
            return Ok(created);
        }

        let select = format!(
            "SELECT {COLUMNS} FROM annotations WHERE user_id = $1 AND patient_id = $2"
        );
        sqlx::query_as::<_, Annotation>(&select)
            .bind(user_id)
            .bind(patient_id)
            .fetch_one(pool)
            .await
    }

    /// Find an annotation by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Annotation>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM annotations WHERE id = $1");
        sqlx::query_as::<_, Annotation>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Persist validated field values without touching `finalized_at`.
    pub async fn update_fields(
        pool: &PgPool,
        id: DbId,
        fields: &ValidAnnotationFields,
    ) -> Result<Annotation, sqlx::Error> {
        let query = format!(
            "UPDATE annotations SET
                vasculitis_present = $1,
                activity = $2,
                quality = $3,
                comment = $4,
                updated_at = NOW()
             WHERE id = $5
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Annotation>(&query)
            .bind(fields.vasculitis_present)
            .bind(fields.activity.map(|a| a.as_str()))
            .bind(fields.quality)
            .bind(&fields.comment)
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// Persist validated field values and finalize.
    ///
    /// The finalize timestamp is set only on the first finalization
    /// (`COALESCE` keeps an existing one), and the row is locked for the
    /// old-state read so concurrent double-finalize reports the null→set
    /// transition exactly once. On that transition a non-empty comment is
    /// copied to the shared ledger within the same transaction, so the
    /// finalize and its ledger entry commit or roll back together.
    /// Returns the updated row and whether this call performed the
    /// transition.
    pub async fn finalize(
        pool: &PgPool,
        id: DbId,
        fields: &ValidAnnotationFields,
    ) -> Result<(Annotation, bool), sqlx::Error> {
        let mut tx = pool.begin().await?;

        let was_finalized: (bool,) = sqlx::query_as(
            "SELECT finalized_at IS NOT NULL FROM annotations WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        let query = format!(
            "UPDATE annotations SET
                vasculitis_present = $1,
                activity = $2,
                quality = $3,
                comment = $4,
                finalized_at = COALESCE(finalized_at, NOW()),
                updated_at = NOW()
             WHERE id = $5
             RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Annotation>(&query)
            .bind(fields.vasculitis_present)
            .bind(fields.activity.map(|a| a.as_str()))
            .bind(fields.quality)
            .bind(&fields.comment)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        let newly_finalized = !was_finalized.0;
        if newly_finalized {
            if let Some(body) = updated.comment.as_deref().filter(|c| !c.is_empty()) {
                sqlx::query(
                    "INSERT INTO case_comments (patient_id, user_id, body)
                     VALUES ($1, $2, $3)",
                )
                .bind(&updated.patient_id)
                .bind(updated.user_id)
                .bind(body)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;
        Ok((updated, newly_finalized))
    }

    /// Most recently finalized annotation on a patient by any other
    /// reviewer, with the reviewer's username, for the peer reference view.
    pub async fn latest_finalized_peer(
        pool: &PgPool,
        patient_id: &str,
        excluding_user: DbId,
    ) -> Result<Option<PeerAnnotation>, sqlx::Error> {
        sqlx::query_as::<_, PeerAnnotation>(
            "SELECT u.username, a.vasculitis_present, a.activity, a.quality,
                    a.comment, a.finalized_at
             FROM annotations a
             JOIN users u ON u.id = a.user_id
             WHERE a.patient_id = $1
               AND a.user_id <> $2
               AND a.finalized_at IS NOT NULL
             ORDER BY a.finalized_at DESC
             LIMIT 1",
        )
        .bind(patient_id)
        .bind(excluding_user)
        .fetch_optional(pool)
        .await
    }
}
