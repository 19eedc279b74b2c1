//! Integration tests for the generation lifecycle endpoints.

mod common;

use axum::http::StatusCode;
use common::{
    await_terminal, expect_status, get_auth, post_json, seed_repository, seed_user,
};
use serde_json::json;
use sqlx::PgPool;

use shipnotes_db::models::status::GenerationStatus;

fn start_body(repository_id: i64) -> serde_json::Value {
    json!({
        "repository_id": repository_id,
        "start_date": "2025-01-01",
        "end_date": "2025-01-07",
    })
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn start_returns_202_with_processing_record(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (_user, token) = seed_user(&pool, "ada", "editor").await;
    let repo_id = seed_repository(&pool).await;

    let body = expect_status(
        post_json(app, "/api/v1/generations", Some(&token), start_body(repo_id)).await,
        StatusCode::ACCEPTED,
    )
    .await;

    assert_eq!(
        body["data"]["status_id"],
        GenerationStatus::Processing.id() as i64
    );
    assert_eq!(body["data"]["progress"], 0);
    assert_eq!(body["data"]["branch"], "main");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn start_with_bad_range_is_400(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (_user, token) = seed_user(&pool, "ada", "editor").await;
    let repo_id = seed_repository(&pool).await;

    let response = post_json(
        app,
        "/api/v1/generations",
        Some(&token),
        json!({
            "repository_id": repo_id,
            "start_date": "2025-02-01",
            "end_date": "2025-01-01",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn start_with_unknown_repository_is_404(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (_user, token) = seed_user(&pool, "ada", "editor").await;

    let response = post_json(
        app,
        "/api/v1/generations",
        Some(&token),
        start_body(999_999),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn viewers_cannot_start_generations(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (_user, token) = seed_user(&pool, "casual", "viewer").await;
    let repo_id = seed_repository(&pool).await;

    let response = post_json(app, "/api/v1/generations", Some(&token), start_body(repo_id)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn get_unknown_generation_is_404(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (_user, token) = seed_user(&pool, "ada", "editor").await;

    let response = get_auth(app, "/api/v1/generations/424242", &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn poll_reaches_completed_and_publish_creates_document(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (_user, token) = seed_user(&pool, "ada", "editor").await;
    let repo_id = seed_repository(&pool).await;

    let started = expect_status(
        post_json(
            app.clone(),
            "/api/v1/generations",
            Some(&token),
            start_body(repo_id),
        )
        .await,
        StatusCode::ACCEPTED,
    )
    .await;
    let generation_id = started["data"]["id"].as_i64().expect("generation id");

    await_terminal(&pool, generation_id).await;

    let polled = expect_status(
        get_auth(
            app.clone(),
            &format!("/api/v1/generations/{generation_id}"),
            &token,
        )
        .await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(
        polled["data"]["status_id"],
        GenerationStatus::Completed.id() as i64
    );
    assert_eq!(polled["data"]["progress"], 100);
    assert!(polled["data"]["generated_content"].is_object());

    let published = expect_status(
        post_json(
            app.clone(),
            &format!("/api/v1/generations/{generation_id}/publish"),
            Some(&token),
            json!({}),
        )
        .await,
        StatusCode::CREATED,
    )
    .await;
    let changelog_id = published["data"]["id"].as_i64().expect("changelog id");
    assert_eq!(published["data"]["ai_generation_id"], generation_id);

    // The document carries the full content.
    let document = expect_status(
        get_auth(app, &format!("/api/v1/changelogs/{changelog_id}"), &token).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(document["data"]["sections"].as_array().map(Vec::len), Some(2));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn publish_of_unfinished_generation_is_409(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (user_id, token) = seed_user(&pool, "ada", "editor").await;
    let repo_id = seed_repository(&pool).await;

    // Insert a processing record directly; no pipeline task owns it, so
    // it stays processing.
    let generation = shipnotes_db::repositories::GenerationRepo::create(
        &pool,
        &shipnotes_db::models::generation::NewGeneration {
            repository_id: repo_id,
            branch: "main".into(),
            range_start: chrono::Utc::now(),
            range_end: chrono::Utc::now(),
            options: Default::default(),
            requested_by: user_id,
        },
    )
    .await
    .expect("insert");

    let response = post_json(
        app,
        &format!("/api/v1/generations/{}/publish", generation.id),
        Some(&token),
        json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM changelogs")
        .fetch_one(&pool)
        .await
        .expect("count");
    assert_eq!(count, 0);
}
