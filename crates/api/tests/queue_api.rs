//! HTTP-level integration tests for the queue view and synchronization.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use common::{
    body_json, build_test_app, build_test_app_with_listing, get_auth, post_json_auth,
    redirect_location, seed_reviewer, TEST_ROOT_FOLDER,
};
use sqlx::PgPool;

use angiomark_drive::testing::InMemoryListing;
use angiomark_drive::RemoteListing;

/// A remote with three patient folders, each holding one image per stage.
fn remote_with_three_patients() -> Arc<dyn RemoteListing> {
    let mut listing = InMemoryListing::new();
    listing.add_folder(TEST_ROOT_FOLDER);
    for name in ["c2", "c1", "c3"] {
        let folder = listing.add_subfolder(TEST_ROOT_FOLDER, name);
        listing.add_image(&folder, &format!("{name}-e"), "scan_early.png");
        listing.add_image(&folder, &format!("{name}-m"), "scan_mid.png");
        listing.add_image(&folder, &format!("{name}-l"), "scan_late.png");
    }
    Arc::new(listing)
}

async fn queue_view(
    pool: &PgPool,
    listing: &Arc<dyn RemoteListing>,
    token: &str,
    uri: &str,
) -> serde_json::Value {
    let app = build_test_app_with_listing(pool.clone(), Some(Arc::clone(listing)));
    let response = get_auth(app, uri, token).await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await
}

/// An empty pool triggers a sync, and the queue serves the first patient
/// in ascending id order with a lazily created annotation.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_auto_sync_on_empty_pool(pool: PgPool) {
    let (_, token) = seed_reviewer(&pool, "alice").await;
    let listing = remote_with_three_patients();

    let json = queue_view(&pool, &listing, &token, "/").await;
    let data = &json["data"];

    assert_eq!(data["pool_empty"], false);
    assert_eq!(data["complete"], false);
    assert_eq!(data["sync_warnings"].as_array().unwrap().len(), 0);
    assert_eq!(data["patient"]["patient_id"], "C1");
    // Folder names are uppercased on ingest.
    assert_eq!(data["patient"]["annotation"]["patient_id"], "C1");
    assert_eq!(data["patient"]["annotation"]["finalized_at"], serde_json::Value::Null);
    assert_eq!(data["patient"]["next_patient_id"], "C2");
    assert_eq!(data["patient"]["prev_patient_id"], serde_json::Value::Null);
}

/// Images land in their stage buckets: filename hint first, then the
/// containing folder's name, defaulting to mid.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_images_grouped_by_stage(pool: PgPool) {
    let (_, token) = seed_reviewer(&pool, "alice").await;

    let mut listing = InMemoryListing::new();
    listing.add_folder(TEST_ROOT_FOLDER);
    let c1 = listing.add_subfolder(TEST_ROOT_FOLDER, "c1");
    listing.add_image(&c1, "img-1", "scan_early.png");
    listing.add_image(&c1, "img-2", "scan_late.png");
    listing.add_image(&c1, "img-3", "unlabeled.png");
    let late_sub = listing.add_subfolder(&c1, "late");
    listing.add_image(&late_sub, "img-4", "followup.png");
    let listing: Arc<dyn RemoteListing> = Arc::new(listing);

    let json = queue_view(&pool, &listing, &token, "/").await;
    let images = &json["data"]["patient"]["images"];

    assert_eq!(images["early"].as_array().unwrap().len(), 1);
    // img-3 has no stage hint anywhere, so it defaults to mid.
    assert_eq!(images["mid"].as_array().unwrap().len(), 1);
    // img-2 by filename, img-4 by its parent folder's name.
    assert_eq!(images["late"].as_array().unwrap().len(), 2);
    assert!(images["early"][0]
        .as_str()
        .unwrap()
        .contains("img-1"));
}

/// Re-syncing against an unchanged remote reproduces the identical local
/// state: same patients, same image rows, no duplicates.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_sync_idempotent(pool: PgPool) {
    let (_, token) = seed_reviewer(&pool, "alice").await;
    let listing = remote_with_three_patients();

    queue_view(&pool, &listing, &token, "/").await;
    let patients_before: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM patients")
        .fetch_one(&pool)
        .await
        .unwrap();
    let images_before: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM patient_images")
        .fetch_one(&pool)
        .await
        .unwrap();

    queue_view(&pool, &listing, &token, "/?sync=true").await;
    let patients_after: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM patients")
        .fetch_one(&pool)
        .await
        .unwrap();
    let images_after: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM patient_images")
        .fetch_one(&pool)
        .await
        .unwrap();

    assert_eq!(patients_before, (3,));
    assert_eq!(patients_before, patients_after);
    assert_eq!(images_before, (9,));
    assert_eq!(images_before, images_after);
}

/// A forced resync reflects remote changes with full-replace semantics.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_forced_resync_picks_up_remote_changes(pool: PgPool) {
    let (_, token) = seed_reviewer(&pool, "alice").await;

    let mut before = InMemoryListing::new();
    before.add_folder(TEST_ROOT_FOLDER);
    before.add_subfolder_with_id(TEST_ROOT_FOLDER, "c1-folder", "c1");
    before.add_image("c1-folder", "old-img", "scan_early.png");
    let before: Arc<dyn RemoteListing> = Arc::new(before);

    queue_view(&pool, &before, &token, "/").await;

    // The remote set changed entirely: the old image is gone, two new ones
    // exist. The local rows must be the new set, not a union.
    let mut after = InMemoryListing::new();
    after.add_folder(TEST_ROOT_FOLDER);
    after.add_subfolder_with_id(TEST_ROOT_FOLDER, "c1-folder", "c1");
    after.add_image("c1-folder", "new-img-1", "scan_mid.png");
    after.add_image("c1-folder", "new-img-2", "scan_late.png");
    let after: Arc<dyn RemoteListing> = Arc::new(after);

    let json = queue_view(&pool, &after, &token, "/?sync=true").await;
    let images = &json["data"]["patient"]["images"];

    assert_eq!(images["early"].as_array().unwrap().len(), 0);
    assert_eq!(images["mid"].as_array().unwrap().len(), 1);
    assert_eq!(images["late"].as_array().unwrap().len(), 1);
}

/// Explicit patient navigation resolves that patient with its neighbors.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_explicit_patient_navigation(pool: PgPool) {
    let (_, token) = seed_reviewer(&pool, "alice").await;
    let listing = remote_with_three_patients();

    let json = queue_view(&pool, &listing, &token, "/?patient_id=C2").await;
    let patient = &json["data"]["patient"];

    assert_eq!(patient["patient_id"], "C2");
    assert_eq!(patient["prev_patient_id"], "C1");
    assert_eq!(patient["next_patient_id"], "C3");
}

/// An unknown explicit patient id falls back to normal queue selection.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_unknown_patient_falls_back(pool: PgPool) {
    let (_, token) = seed_reviewer(&pool, "alice").await;
    let listing = remote_with_three_patients();

    let json = queue_view(&pool, &listing, &token, "/?patient_id=ZZZ").await;

    assert_eq!(json["data"]["patient"]["patient_id"], "C1");
}

/// Without a configured remote, the queue degrades to an empty-pool view
/// with a warning instead of an error.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_sync_not_configured(pool: PgPool) {
    let (_, token) = seed_reviewer(&pool, "alice").await;
    let app = build_test_app(pool);

    let response = get_auth(app, "/", &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let data = body_json(response).await["data"].clone();
    assert_eq!(data["patient"], serde_json::Value::Null);
    assert_eq!(data["pool_empty"], true);
    assert_eq!(data["complete"], false);
    assert_eq!(
        data["sync_warnings"][0],
        "Synchronization is not configured"
    );
}

/// One unreadable patient folder is reported as a warning and never
/// prevents the rest of the pool from syncing.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_folder_failure_is_isolated(pool: PgPool) {
    let (_, token) = seed_reviewer(&pool, "alice").await;

    let mut listing = InMemoryListing::new();
    listing.add_folder(TEST_ROOT_FOLDER);
    let c1 = listing.add_subfolder(TEST_ROOT_FOLDER, "c1");
    listing.add_image(&c1, "c1-img", "scan_early.png");
    let c2 = listing.add_subfolder(TEST_ROOT_FOLDER, "c2");
    listing.fail_listing(&c2);
    let listing: Arc<dyn RemoteListing> = Arc::new(listing);

    let json = queue_view(&pool, &listing, &token, "/").await;
    let data = &json["data"];

    let warnings = data["sync_warnings"].as_array().unwrap();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].as_str().unwrap().contains("c2"));
    assert_eq!(data["patient"]["patient_id"], "C1");
    assert_eq!(data["patient"]["images"]["early"].as_array().unwrap().len(), 1);
}

/// Finalizing the whole pool flips the view to the completion state, and
/// the queue advances independently per reviewer.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_completion_and_per_user_progress(pool: PgPool) {
    let (_, alice) = seed_reviewer(&pool, "alice").await;
    let (_, bob) = seed_reviewer(&pool, "bob").await;

    let mut listing = InMemoryListing::new();
    listing.add_folder(TEST_ROOT_FOLDER);
    listing.add_subfolder(TEST_ROOT_FOLDER, "c1");
    let listing: Arc<dyn RemoteListing> = Arc::new(listing);

    let json = queue_view(&pool, &listing, &alice, "/").await;
    let annotation_id = json["data"]["patient"]["annotation"]["id"].as_i64().unwrap();

    let app = build_test_app_with_listing(pool.clone(), Some(Arc::clone(&listing)));
    let body = serde_json::json!({
        "annotation_id": annotation_id,
        "vasculitis_present": true,
        "action": "save_and_next",
    });
    let response = post_json_auth(app, "/save_annotation", &alice, body).await;
    // Pool exhausted for alice: redirect to the bare queue.
    assert_eq!(redirect_location(&response), "/");

    let json = queue_view(&pool, &listing, &alice, "/").await;
    assert_eq!(json["data"]["patient"], serde_json::Value::Null);
    assert_eq!(json["data"]["complete"], true);
    assert_eq!(json["data"]["pool_empty"], false);

    // Bob's queue is untouched by alice's progress.
    let json = queue_view(&pool, &listing, &bob, "/").await;
    assert_eq!(json["data"]["patient"]["patient_id"], "C1");
}

/// A finalized annotation by another reviewer appears as the peer
/// reference, and its comment shows up in the shared ledger.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_peer_annotation_and_ledger_visible(pool: PgPool) {
    let (_, alice) = seed_reviewer(&pool, "alice").await;
    let (_, bob) = seed_reviewer(&pool, "bob").await;

    let mut listing = InMemoryListing::new();
    listing.add_folder(TEST_ROOT_FOLDER);
    listing.add_subfolder(TEST_ROOT_FOLDER, "c1");
    let listing: Arc<dyn RemoteListing> = Arc::new(listing);

    let json = queue_view(&pool, &listing, &alice, "/").await;
    let annotation_id = json["data"]["patient"]["annotation"]["id"].as_i64().unwrap();

    let app = build_test_app_with_listing(pool.clone(), Some(Arc::clone(&listing)));
    let body = serde_json::json!({
        "annotation_id": annotation_id,
        "vasculitis_present": true,
        "activity": "active",
        "quality": 8,
        "comment": "diffuse wall thickening",
        "action": "save_and_next",
    });
    let response = post_json_auth(app, "/save_annotation", &alice, body).await;
    assert_eq!(redirect_location(&response), "/");

    let json = queue_view(&pool, &listing, &bob, "/?patient_id=C1").await;
    let patient = &json["data"]["patient"];

    assert_eq!(patient["peer_annotation"]["username"], "alice");
    assert_eq!(patient["peer_annotation"]["quality"], 8);
    let comments = patient["case_comments"].as_array().unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0]["author"], "alice");
    assert_eq!(comments[0]["body"], "diffuse wall thickening");
}
