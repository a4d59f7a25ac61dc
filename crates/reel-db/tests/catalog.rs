//! Integration tests for the source video catalog and generated videos.

use reel_db::models::{CreateGeneratedVideo, CreateSourceVideo, UpdateSourceVideo};
use reel_db::repositories::{GeneratedVideoRepo, SourceVideoRepo, UserRepo};
use reel_models::VideoStatus;
use sqlx::PgPool;
use uuid::Uuid;

fn new_source(title: &str) -> CreateSourceVideo {
    let id = Uuid::new_v4();
    CreateSourceVideo {
        id,
        title: title.to_string(),
        filename: format!("{id}.mp4"),
        thumbnail_filename: format!("{id}.jpg"),
        duration: Some(12.5),
        file_size: Some(1_048_576),
    }
}

fn new_generated(user_id: Uuid, source_id: Uuid, text: &str) -> CreateGeneratedVideo {
    let id = Uuid::new_v4();
    CreateGeneratedVideo {
        id,
        user_id,
        ai_avatar_video_id: source_id,
        overlay_text: text.to_string(),
        video_filename: format!("{id}.mp4"),
        thumbnail_filename: format!("{id}.jpg"),
        status: VideoStatus::Completed,
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_source_video_crud(pool: PgPool) {
    let input = new_source("Gardening tips");
    let created = SourceVideoRepo::create(&pool, &input).await.unwrap();
    assert_eq!(created.id, input.id);
    assert_eq!(created.duration, Some(12.5));

    assert!(SourceVideoRepo::exists(&pool, input.id).await.unwrap());
    let by_name = SourceVideoRepo::find_by_filename(&pool, &input.filename)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(by_name.id, input.id);

    let updated = SourceVideoRepo::update(
        &pool,
        input.id,
        &UpdateSourceVideo {
            title: Some("Plant care".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(updated.title, "Plant care");
    assert_eq!(updated.filename, input.filename);

    assert_eq!(SourceVideoRepo::list_all(&pool).await.unwrap().len(), 1);

    assert!(SourceVideoRepo::delete(&pool, input.id).await.unwrap());
    assert!(!SourceVideoRepo::exists(&pool, input.id).await.unwrap());
    assert!(!SourceVideoRepo::delete(&pool, input.id).await.unwrap());
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_generated_videos_are_scoped_to_owner(pool: PgPool) {
    let source = SourceVideoRepo::create(&pool, &new_source("Base")).await.unwrap();
    let alice = UserRepo::ensure_exists(&pool, Uuid::new_v4()).await.unwrap().id;
    let bob = UserRepo::ensure_exists(&pool, Uuid::new_v4()).await.unwrap().id;

    let first = GeneratedVideoRepo::create(&pool, &new_generated(alice, source.id, "first"))
        .await
        .unwrap();
    let second = GeneratedVideoRepo::create(&pool, &new_generated(alice, source.id, "second"))
        .await
        .unwrap();
    GeneratedVideoRepo::create(&pool, &new_generated(bob, source.id, "other"))
        .await
        .unwrap();

    assert_eq!(first.status, "completed");

    let listed = GeneratedVideoRepo::list_by_user(&pool, alice).await.unwrap();
    let ids: Vec<Uuid> = listed.iter().map(|v| v.id).collect();
    assert_eq!(ids, vec![second.id, first.id]);

    let found = GeneratedVideoRepo::find_by_id(&pool, first.id).await.unwrap().unwrap();
    assert_eq!(found.overlay_text, "first");
}
