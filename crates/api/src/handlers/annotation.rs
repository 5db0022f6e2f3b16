//! Handler for annotation submission (`POST /save_annotation`).

use axum::extract::State;
use axum::response::Redirect;
use axum::Json;
use serde::Deserialize;

use angiomark_core::annotation::{AnnotationFields, SaveAction};
use angiomark_core::types::DbId;
use angiomark_db::repositories::{AnnotationRepo, PatientRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Request body for `POST /save_annotation`.
#[derive(Debug, Deserialize)]
pub struct SaveAnnotationRequest {
    pub annotation_id: DbId,
    #[serde(flatten)]
    pub fields: AnnotationFields,
    pub action: SaveAction,
}

/// POST /save_annotation
///
/// Persist the reviewer's field values on their own annotation. `save`
/// keeps it a draft and redirects back to the same patient;
/// `save_and_next` finalizes it and redirects to the next queue patient
/// (or bare `/` when the queue is exhausted).
///
/// An annotation id that does not exist or belongs to another reviewer
/// gets the same 404, so a guessed id reveals nothing and mutates nothing.
pub async fn save_annotation(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<SaveAnnotationRequest>,
) -> AppResult<Redirect> {
    let annotation = AnnotationRepo::find_by_id(&state.pool, input.annotation_id)
        .await?
        .ok_or_else(|| AppError::annotation_not_found(input.annotation_id))?;

    if annotation.user_id != user.user_id {
        return Err(AppError::annotation_not_found(input.annotation_id));
    }

    let fields = input.fields.validate().map_err(AppError::Fields)?;

    match input.action {
        SaveAction::Save => {
            AnnotationRepo::update_fields(&state.pool, annotation.id, &fields).await?;
            tracing::debug!(
                annotation_id = annotation.id,
                patient_id = %annotation.patient_id,
                "Draft saved"
            );
            Ok(Redirect::to(&format!(
                "/?patient_id={}",
                annotation.patient_id
            )))
        }
        SaveAction::SaveAndNext => {
            // The repo copies a non-empty comment to the ledger inside the
            // finalize transaction, exactly once per null->set transition.
            let (updated, newly_finalized) =
                AnnotationRepo::finalize(&state.pool, annotation.id, &fields).await?;

            tracing::info!(
                annotation_id = updated.id,
                patient_id = %updated.patient_id,
                newly_finalized,
                "Annotation finalized"
            );

            let next = PatientRepo::next_unfinalized_for_user(&state.pool, user.user_id).await?;
            Ok(match next {
                Some(patient) => Redirect::to(&format!("/?patient_id={}", patient.patient_id)),
                None => Redirect::to("/"),
            })
        }
    }
}
