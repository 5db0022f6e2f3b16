//! Integration tests for the sync-owned image replacement: full-replace
//! semantics, idempotence, and multiple images per stage.

use sqlx::PgPool;

use angiomark_db::models::patient::NewPatientImage;
use angiomark_db::repositories::PatientRepo;

fn image(stage: &str, url: &str) -> NewPatientImage {
    NewPatientImage {
        stage: stage.to_string(),
        image_url: url.to_string(),
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_replace_installs_scanned_set(pool: PgPool) {
    PatientRepo::create_if_absent(&pool, "C1").await.unwrap();

    let written = PatientRepo::replace_images(
        &pool,
        "C1",
        &[image("early", "u1"), image("mid", "u2"), image("late", "u3")],
    )
    .await
    .unwrap();
    assert_eq!(written, 3);

    let images = PatientRepo::images_for(&pool, "C1").await.unwrap();
    assert_eq!(images.len(), 3);
    assert_eq!(images[0].stage, "early");
    assert_eq!(images[0].image_url, "u1");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_replace_is_full_not_additive(pool: PgPool) {
    PatientRepo::create_if_absent(&pool, "C1").await.unwrap();

    PatientRepo::replace_images(&pool, "C1", &[image("early", "old"), image("mid", "old2")])
        .await
        .unwrap();
    PatientRepo::replace_images(&pool, "C1", &[image("late", "new")])
        .await
        .unwrap();

    let images = PatientRepo::images_for(&pool, "C1").await.unwrap();
    assert_eq!(images.len(), 1);
    assert_eq!(images[0].image_url, "new");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_replace_twice_with_same_set_is_idempotent(pool: PgPool) {
    PatientRepo::create_if_absent(&pool, "C1").await.unwrap();
    let set = [image("early", "u1"), image("mid", "u2")];

    PatientRepo::replace_images(&pool, "C1", &set).await.unwrap();
    PatientRepo::replace_images(&pool, "C1", &set).await.unwrap();

    let images = PatientRepo::images_for(&pool, "C1").await.unwrap();
    let pairs: Vec<_> = images
        .iter()
        .map(|i| (i.stage.as_str(), i.image_url.as_str()))
        .collect();
    assert_eq!(pairs, vec![("early", "u1"), ("mid", "u2")]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_multiple_images_per_stage_allowed(pool: PgPool) {
    PatientRepo::create_if_absent(&pool, "C1").await.unwrap();

    PatientRepo::replace_images(&pool, "C1", &[image("mid", "u1"), image("mid", "u2")])
        .await
        .unwrap();

    let images = PatientRepo::images_for(&pool, "C1").await.unwrap();
    assert_eq!(images.len(), 2);
    assert!(images.iter().all(|i| i.stage == "mid"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_replace_scoped_to_one_patient(pool: PgPool) {
    PatientRepo::create_if_absent(&pool, "C1").await.unwrap();
    PatientRepo::create_if_absent(&pool, "C2").await.unwrap();

    PatientRepo::replace_images(&pool, "C1", &[image("early", "c1-img")])
        .await
        .unwrap();
    PatientRepo::replace_images(&pool, "C2", &[image("early", "c2-img")])
        .await
        .unwrap();
    PatientRepo::replace_images(&pool, "C1", &[]).await.unwrap();

    assert!(PatientRepo::images_for(&pool, "C1").await.unwrap().is_empty());
    assert_eq!(PatientRepo::images_for(&pool, "C2").await.unwrap().len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_invalid_stage_rejected_by_schema(pool: PgPool) {
    PatientRepo::create_if_absent(&pool, "C1").await.unwrap();

    let result =
        PatientRepo::replace_images(&pool, "C1", &[image("latest", "u1")]).await;
    assert!(result.is_err());

    // The failed transaction left nothing behind.
    assert!(PatientRepo::images_for(&pool, "C1").await.unwrap().is_empty());
}
