//! Recursive scanner for one patient's folder.
//!
//! Walks a patient folder to arbitrary depth and classifies every image
//! file into a stage: a marker in the file name wins, then a marker in the
//! immediate parent folder's name, then the `mid` default. Non-image
//! entries are skipped; a folder with no matching images yields an empty
//! list, not an error.

use angiomark_core::stage::Stage;

use crate::api::{DriveError, RemoteListing};

/// One image record produced by a scan: stage plus a resolved display URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedImage {
    pub stage: Stage,
    pub url: String,
}

/// Scan a patient folder, returning one record per image file found.
///
/// The walk is an explicit work stack instead of recursion so arbitrarily
/// deep nesting cannot overflow, and each stacked entry carries the folder
/// name that serves as the stage-hint context for its direct children.
pub async fn scan_patient_folder(
    listing: &dyn RemoteListing,
    folder_id: &str,
    folder_name: &str,
) -> Result<Vec<ScannedImage>, DriveError> {
    let mut images = Vec::new();
    let mut pending = vec![(folder_id.to_string(), folder_name.to_string())];

    while let Some((current_id, current_name)) = pending.pop() {
        for entry in listing.list_children(&current_id).await? {
            if entry.is_folder() {
                pending.push((entry.id, entry.name));
            } else if entry.is_image() {
                images.push(ScannedImage {
                    stage: Stage::classify(&entry.name, &current_name),
                    url: listing.display_url(&entry.id),
                });
            } else {
                tracing::trace!(name = %entry.name, mime = %entry.mime_type, "Skipping non-image file");
            }
        }
    }

    Ok(images)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::InMemoryListing;

    #[tokio::test]
    async fn test_flat_folder_classified_by_file_name() {
        let mut listing = InMemoryListing::new();
        listing.add_folder("root");
        listing.add_image("root", "f1", "C7_early.png");
        listing.add_image("root", "f2", "C7_mid.png");
        listing.add_image("root", "f3", "C7_late.png");

        let mut images = scan_patient_folder(&listing, "root", "C7").await.unwrap();
        images.sort_by(|a, b| a.url.cmp(&b.url));

        assert_eq!(images.len(), 3);
        assert_eq!(images[0].stage, Stage::Early);
        assert_eq!(images[0].url, listing.display_url("f1"));
        assert_eq!(images[1].stage, Stage::Mid);
        assert_eq!(images[2].stage, Stage::Late);
    }

    #[tokio::test]
    async fn test_nested_folder_name_is_stage_hint() {
        let mut listing = InMemoryListing::new();
        listing.add_folder("root");
        let late = listing.add_subfolder("root", "late phase");
        listing.add_image(&late, "f1", "IMG_0001.png");
        listing.add_image(&late, "f2", "IMG_0002.png");

        let images = scan_patient_folder(&listing, "root", "C7").await.unwrap();
        assert_eq!(images.len(), 2);
        assert!(images.iter().all(|i| i.stage == Stage::Late));
    }

    #[tokio::test]
    async fn test_unmatched_defaults_to_mid() {
        let mut listing = InMemoryListing::new();
        listing.add_folder("root");
        listing.add_image("root", "f1", "IMG_0001.png");

        let images = scan_patient_folder(&listing, "root", "C7").await.unwrap();
        assert_eq!(images[0].stage, Stage::Mid);
    }

    #[tokio::test]
    async fn test_file_name_overrides_folder_hint() {
        let mut listing = InMemoryListing::new();
        listing.add_folder("root");
        let early = listing.add_subfolder("root", "early");
        listing.add_image(&early, "f1", "late_recheck.png");

        let images = scan_patient_folder(&listing, "root", "C7").await.unwrap();
        assert_eq!(images[0].stage, Stage::Late);
    }

    #[tokio::test]
    async fn test_deep_nesting_and_non_images_skipped() {
        let mut listing = InMemoryListing::new();
        listing.add_folder("root");
        let a = listing.add_subfolder("root", "session 1");
        let b = listing.add_subfolder(&a, "repeat");
        let c = listing.add_subfolder(&b, "early");
        listing.add_image(&c, "f1", "IMG_0001.png");
        listing.add_file("root", "f2", "notes.pdf", "application/pdf");

        let images = scan_patient_folder(&listing, "root", "C7").await.unwrap();
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].stage, Stage::Early);
    }

    #[tokio::test]
    async fn test_empty_folder_yields_empty_list() {
        let mut listing = InMemoryListing::new();
        listing.add_folder("root");

        let images = scan_patient_folder(&listing, "root", "C7").await.unwrap();
        assert!(images.is_empty());
    }

    #[tokio::test]
    async fn test_multiple_images_per_stage_kept() {
        let mut listing = InMemoryListing::new();
        listing.add_folder("root");
        listing.add_image("root", "f1", "early_1.png");
        listing.add_image("root", "f2", "early_2.png");

        let images = scan_patient_folder(&listing, "root", "C7").await.unwrap();
        assert_eq!(images.len(), 2);
        assert!(images.iter().all(|i| i.stage == Stage::Early));
    }
}
