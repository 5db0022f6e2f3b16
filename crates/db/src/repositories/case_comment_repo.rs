//! Repository for the `case_comments` ledger.
//!
//! Append and list only. No update or delete methods exist: the ledger is
//! immutable by design of the schema, not just by convention here.

use sqlx::PgPool;

use angiomark_core::types::DbId;

use crate::models::case_comment::{CaseComment, CaseCommentWithAuthor};

/// Column list for case_comments queries.
const COLUMNS: &str = "id, patient_id, user_id, body, created_at";

pub struct CaseCommentRepo;

impl CaseCommentRepo {
    /// Append one entry to a patient's ledger.
    pub async fn append(
        pool: &PgPool,
        patient_id: &str,
        user_id: DbId,
        body: &str,
    ) -> Result<CaseComment, sqlx::Error> {
        let query = format!(
            "INSERT INTO case_comments (patient_id, user_id, body)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CaseComment>(&query)
            .bind(patient_id)
            .bind(user_id)
            .bind(body)
            .fetch_one(pool)
            .await
    }

    /// All entries for a patient in creation order, each with its author's
    /// username (None when the account was later removed).
    pub async fn list_for_patient(
        pool: &PgPool,
        patient_id: &str,
    ) -> Result<Vec<CaseCommentWithAuthor>, sqlx::Error> {
        sqlx::query_as::<_, CaseCommentWithAuthor>(
            "SELECT c.id, c.patient_id, u.username AS author, c.body, c.created_at
             FROM case_comments c
             LEFT JOIN users u ON u.id = c.user_id
             WHERE c.patient_id = $1
             ORDER BY c.created_at ASC, c.id ASC",
        )
        .bind(patient_id)
        .fetch_all(pool)
        .await
    }
}
