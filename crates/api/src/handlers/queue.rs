//! Handler for the annotation queue view (`GET /`).

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use angiomark_core::stage::Stage;
use angiomark_db::models::annotation::{Annotation, PeerAnnotation};
use angiomark_db::models::case_comment::CaseCommentWithAuthor;
use angiomark_db::repositories::{AnnotationRepo, CaseCommentRepo, PatientRepo};

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;
use crate::sync::run_sync;

/// Query parameters for `GET /`.
#[derive(Debug, Deserialize)]
pub struct QueueQuery {
    /// Navigate to this patient instead of the queue head. Unknown ids
    /// fall back to queue selection.
    pub patient_id: Option<String>,
    /// Force a synchronization run before selecting.
    #[serde(default)]
    pub sync: bool,
}

/// A patient's image URLs grouped by angiography stage, in sync insertion
/// order within each stage.
#[derive(Debug, Default, Serialize)]
pub struct ImagesByStage {
    pub early: Vec<String>,
    pub mid: Vec<String>,
    pub late: Vec<String>,
}

/// The resolved patient with everything the annotation view needs.
#[derive(Debug, Serialize)]
pub struct PatientView {
    pub patient_id: String,
    pub images: ImagesByStage,
    /// The caller's annotation, created empty on first view.
    pub annotation: Annotation,
    /// Shared ledger entries, oldest first.
    pub case_comments: Vec<CaseCommentWithAuthor>,
    /// Another reviewer's most recently finalized annotation, if any.
    pub peer_annotation: Option<PeerAnnotation>,
    pub prev_patient_id: Option<String>,
    pub next_patient_id: Option<String>,
}

/// Response payload for `GET /`.
#[derive(Debug, Serialize)]
pub struct QueueView {
    /// `None` when there is nothing to annotate; see the two flags.
    pub patient: Option<PatientView>,
    /// The caller has finalized every patient in a nonempty pool.
    pub complete: bool,
    /// The pool itself is empty (nothing was ever synced, or sync failed).
    pub pool_empty: bool,
    /// Aggregate warnings from the synchronization run, if one happened.
    pub sync_warnings: Vec<String>,
}

/// GET /
///
/// Resolve the next patient for the authenticated reviewer. Synchronizes
/// first when forced via `sync=true` or when the patient pool is empty;
/// sync problems degrade to warnings rather than failing the view.
pub async fn queue_view(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<QueueQuery>,
) -> AppResult<Json<DataResponse<QueueView>>> {
    let mut sync_warnings = Vec::new();

    let mut pool_count = PatientRepo::count(&state.pool).await?;
    if query.sync || pool_count == 0 {
        sync_warnings = try_sync(&state).await;
        pool_count = PatientRepo::count(&state.pool).await?;
    }

    let mut patient = None;
    if let Some(requested) = query.patient_id.as_deref() {
        patient = PatientRepo::find_by_id(&state.pool, requested).await?;
        if patient.is_none() {
            tracing::debug!(patient_id = %requested, "Requested patient not found, falling back to queue");
        }
    }
    if patient.is_none() {
        patient = PatientRepo::next_unfinalized_for_user(&state.pool, user.user_id).await?;
    }

    let Some(patient) = patient else {
        return Ok(Json(DataResponse {
            data: QueueView {
                patient: None,
                complete: pool_count > 0,
                pool_empty: pool_count == 0,
                sync_warnings,
            },
        }));
    };

    let annotation =
        AnnotationRepo::get_or_create(&state.pool, user.user_id, &patient.patient_id).await?;

    let mut images = ImagesByStage::default();
    for image in PatientRepo::images_for(&state.pool, &patient.patient_id).await? {
        // The CHECK constraint on the column admits only the three stages.
        match Stage::parse(&image.stage) {
            Ok(Stage::Early) => images.early.push(image.image_url),
            Ok(Stage::Late) => images.late.push(image.image_url),
            Ok(Stage::Mid) | Err(_) => images.mid.push(image.image_url),
        }
    }

    let case_comments = CaseCommentRepo::list_for_patient(&state.pool, &patient.patient_id).await?;
    let peer_annotation =
        AnnotationRepo::latest_finalized_peer(&state.pool, &patient.patient_id, user.user_id)
            .await?;
    let (prev_patient_id, next_patient_id) =
        PatientRepo::neighbors(&state.pool, &patient.patient_id).await?;

    Ok(Json(DataResponse {
        data: QueueView {
            patient: Some(PatientView {
                patient_id: patient.patient_id,
                images,
                annotation,
                case_comments,
                peer_annotation,
                prev_patient_id,
                next_patient_id,
            }),
            complete: false,
            pool_empty: false,
            sync_warnings,
        },
    }))
}

/// Run a sync pass if one is configured, reducing every failure mode to
/// requester-visible warnings.
async fn try_sync(state: &AppState) -> Vec<String> {
    let (Some(listing), Some(drive)) = (&state.listing, &state.config.drive) else {
        return vec!["Synchronization is not configured".to_string()];
    };

    match run_sync(&state.pool, listing.as_ref(), &drive.root_folder_id).await {
        Ok(outcome) => outcome.warnings(),
        Err(e) => {
            tracing::warn!(error = %e, "Sync run failed");
            vec![format!("Synchronization unavailable: {e}")]
        }
    }
}
