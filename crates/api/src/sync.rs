//! Drive synchronization: reconcile the remote folder hierarchy into
//! local patient and image rows.
//!
//! Each immediate sub-folder of the configured root folder is one patient.
//! Folders are processed in natural order (`C9` before `C10`). Per folder:
//! resolve-or-create the patient, scan the folder for staged images, then
//! replace that patient's cached image rows inside a single transaction.
//! A failed folder is recorded and the loop continues, so one bad patient
//! never corrupts or aborts the rest of the run. Re-running against an
//! unchanged remote reproduces the identical local state.

use serde::Serialize;
use sqlx::PgPool;

use angiomark_core::ident::normalize_patient_id;
use angiomark_core::natsort::natural_cmp;
use angiomark_db::models::patient::NewPatientImage;
use angiomark_db::repositories::PatientRepo;
use angiomark_drive::{scan_patient_folder, DriveError, RemoteListing};

/// One patient folder that could not be synchronized.
#[derive(Debug, Clone, Serialize)]
pub struct SyncFailure {
    pub folder: String,
    pub message: String,
}

/// Aggregate result of one synchronization run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncOutcome {
    /// Patient folders found under the root.
    pub patients_seen: usize,
    /// Patients that did not exist locally before this run.
    pub patients_created: usize,
    /// Image rows written across all successfully synced patients.
    pub images_written: usize,
    /// Folders skipped because of an error, in processing order.
    pub failures: Vec<SyncFailure>,
}

impl SyncOutcome {
    /// Human-readable warnings for the requester, one per failed folder.
    pub fn warnings(&self) -> Vec<String> {
        self.failures
            .iter()
            .map(|f| format!("Sync failed for folder '{}': {}", f.folder, f.message))
            .collect()
    }
}

/// Run one full synchronization pass.
///
/// Failure to list the root folder fails the whole run (the caller surfaces
/// it as a sync-unavailable warning); failures inside a single patient's
/// unit of work are isolated into [`SyncOutcome::failures`].
pub async fn run_sync(
    pool: &PgPool,
    listing: &dyn RemoteListing,
    root_folder_id: &str,
) -> Result<SyncOutcome, DriveError> {
    let mut folders = listing.list_child_folders(root_folder_id).await?;
    folders.sort_by(|a, b| natural_cmp(&a.name, &b.name));

    let mut outcome = SyncOutcome {
        patients_seen: folders.len(),
        ..SyncOutcome::default()
    };

    for folder in &folders {
        match sync_one_patient(pool, listing, &folder.id, &folder.name).await {
            Ok((created, images)) => {
                if created {
                    outcome.patients_created += 1;
                }
                outcome.images_written += images;
            }
            Err(e) => {
                tracing::warn!(folder = %folder.name, error = %e, "Patient sync failed");
                outcome.failures.push(SyncFailure {
                    folder: folder.name.clone(),
                    message: e.to_string(),
                });
            }
        }
    }

    tracing::info!(
        patients_seen = outcome.patients_seen,
        patients_created = outcome.patients_created,
        images_written = outcome.images_written,
        failures = outcome.failures.len(),
        "Sync run complete"
    );
    Ok(outcome)
}

/// Errors inside one patient's unit of work.
#[derive(Debug, thiserror::Error)]
enum PatientSyncError {
    #[error(transparent)]
    Core(#[from] angiomark_core::error::CoreError),
    #[error(transparent)]
    Drive(#[from] DriveError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Sync a single patient folder: resolve-or-create the patient, scan, and
/// atomically replace its image set. Returns whether the patient was
/// created and how many images were written.
async fn sync_one_patient(
    pool: &PgPool,
    listing: &dyn RemoteListing,
    folder_id: &str,
    folder_name: &str,
) -> Result<(bool, usize), PatientSyncError> {
    let patient_id = normalize_patient_id(folder_name)?;
    let (_, created) = PatientRepo::create_if_absent(pool, &patient_id).await?;

    let scanned = scan_patient_folder(listing, folder_id, folder_name).await?;
    let images: Vec<NewPatientImage> = scanned
        .into_iter()
        .map(|img| NewPatientImage {
            stage: img.stage.as_str().to_string(),
            image_url: img.url,
        })
        .collect();

    let written = PatientRepo::replace_images(pool, &patient_id, &images).await?;
    tracing::debug!(patient_id = %patient_id, images = written, "Patient synced");
    Ok((created, written))
}
