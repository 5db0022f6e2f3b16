//! Shared case-comment ledger models.

use serde::Serialize;
use sqlx::FromRow;

use angiomark_core::types::{DbId, Timestamp};

/// A row from the `case_comments` table.
///
/// Append-only: no update or delete path exists anywhere in the system.
/// `user_id` is nulled (not cascaded) if the author's account is removed.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CaseComment {
    pub id: DbId,
    pub patient_id: String,
    pub user_id: Option<DbId>,
    pub body: String,
    pub created_at: Timestamp,
}

/// A ledger entry with its author's username resolved for display.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CaseCommentWithAuthor {
    pub id: DbId,
    pub patient_id: String,
    /// None if the authoring account was later removed.
    pub author: Option<String>,
    pub body: String,
    pub created_at: Timestamp,
}
