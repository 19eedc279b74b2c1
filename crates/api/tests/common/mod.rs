//! Shared helpers for API integration tests.
//!
//! Builds the real application router (same middleware stack as
//! production) on top of in-memory collaborator doubles, so tests
//! exercise everything except the actual GitHub and LLM networks.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use shipnotes_api::auth::jwt::{generate_access_token, JwtConfig};
use shipnotes_api::auth::password::hash_password;
use shipnotes_api::config::ServerConfig;
use shipnotes_api::router::build_app_router;
use shipnotes_api::state::AppState;
use shipnotes_core::analysis::CommitAnalysis;
use shipnotes_core::clients::{ChangelogModel, ClientError, CommitSource, ModelCompletion};
use shipnotes_core::commit::Commit;
use shipnotes_core::options::GenerationOptions;
use shipnotes_core::types::{DbId, Timestamp};
use shipnotes_db::models::repository::CreateRepository;
use shipnotes_db::models::status::GenerationStatus;
use shipnotes_db::repositories::{GenerationRepo, RepositoryRepo, UserRepo};
use shipnotes_pipeline::GenerationOrchestrator;

// ---------------------------------------------------------------------------
// Collaborator doubles
// ---------------------------------------------------------------------------

/// Commit source returning three fixed commits for every repository.
pub struct StaticSource;

#[async_trait]
impl CommitSource for StaticSource {
    async fn repository_exists(&self, _owner: &str, _name: &str) -> Result<bool, ClientError> {
        Ok(true)
    }

    async fn list_commits(
        &self,
        _owner: &str,
        _name: &str,
        _branch: &str,
        _since: Timestamp,
        _until: Timestamp,
    ) -> Result<Vec<Commit>, ClientError> {
        Ok(test_commits())
    }
}

/// Model returning canned, well-formed completions.
pub struct StaticModel;

#[async_trait]
impl ChangelogModel for StaticModel {
    async fn categorize_commits(&self, _commits: &[Commit]) -> Result<ModelCompletion, ClientError> {
        Ok(completion(CATEGORIZE_OK))
    }

    async fn synthesize_changelog(
        &self,
        _analyses: &[CommitAnalysis],
        _options: &GenerationOptions,
        _repository_name: &str,
    ) -> Result<ModelCompletion, ClientError> {
        Ok(completion(SYNTHESIZE_OK))
    }
}

pub const CATEGORIZE_OK: &str = r#"[
  {"sha": "aaa111", "category": "feature", "description": "Add CSV export", "confidence": 0.9},
  {"sha": "bbb222", "category": "fix", "description": "Fix crash on empty input", "confidence": 0.8},
  {"sha": "ccc333", "category": "fix", "description": "Fix connection leak", "confidence": 0.7}
]"#;

pub const SYNTHESIZE_OK: &str = r#"{
  "version": "1.4.0",
  "title": "January release",
  "summary": "One feature and two fixes.",
  "sections": [
    {"title": "Features", "changes": [
      {"description": "CSV export", "category": "feature", "commit_shas": ["aaa111"]}
    ]},
    {"title": "Bug Fixes", "changes": [
      {"description": "No more crash on empty input", "category": "fix", "commit_shas": ["bbb222"]},
      {"description": "Plug connection leak", "category": "fix", "commit_shas": ["ccc333"]}
    ]}
  ],
  "metadata": {"total_commits": 0, "contributors": 0, "breaking_changes": 0, "features": 0, "fixes": 0}
}"#;

fn completion(text: &str) -> ModelCompletion {
    ModelCompletion {
        text: text.to_string(),
        model: "test-model".to_string(),
        prompt_tokens: 100,
        completion_tokens: 50,
    }
}

pub fn test_commits() -> Vec<Commit> {
    let commit = |sha: &str, message: &str, author: &str| Commit {
        sha: sha.to_string(),
        message: message.to_string(),
        author_name: author.to_string(),
        author_email: None,
        authored_at: chrono::Utc::now(),
    };
    vec![
        commit("aaa111", "feat: add CSV export", "alice"),
        commit("bbb222", "fix: crash on empty input", "bob"),
        commit("ccc333", "fix: connection leak", "alice"),
    ]
}

// ---------------------------------------------------------------------------
// App construction
// ---------------------------------------------------------------------------

/// Build a test `ServerConfig` with safe, deterministic defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "integration-test-secret-long-enough".to_string(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_days: 7,
        },
        github_base_url: "http://github.invalid".to_string(),
        github_token: "test-token".to_string(),
        llm_base_url: "http://llm.invalid".to_string(),
        llm_api_key: "test-key".to_string(),
        llm_model: "test-model".to_string(),
        stage_deadline_secs: 5,
        stale_generation_mins: 0,
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool and in-memory collaborator doubles.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let commit_source: Arc<StaticSource> = Arc::new(StaticSource);
    let orchestrator = Arc::new(GenerationOrchestrator::new(
        pool.clone(),
        commit_source.clone(),
        Arc::new(StaticModel),
        Duration::from_secs(config.stage_deadline_secs),
    ));

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        orchestrator,
        commit_source,
    };

    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Password used for every seeded user.
pub const TEST_PASSWORD: &str = "integration-test-password";

/// Insert a user with the given role; returns `(user_id, bearer_token)`.
pub async fn seed_user(pool: &PgPool, username: &str, role: &str) -> (DbId, String) {
    let hash = hash_password(TEST_PASSWORD).expect("hashing");
    let user = UserRepo::create(
        pool,
        username,
        &format!("{username}@example.com"),
        &hash,
        role,
    )
    .await
    .expect("user insert");

    let token = generate_access_token(user.id, role, &test_config().jwt).expect("token");
    (user.id, token)
}

/// Insert the `acme/widgets` repository; returns its id.
pub async fn seed_repository(pool: &PgPool) -> DbId {
    RepositoryRepo::create(
        pool,
        &CreateRepository {
            owner: "acme".into(),
            name: "widgets".into(),
            provider: None,
            default_branch: None,
            description: None,
        },
    )
    .await
    .expect("repository insert")
    .id
}

/// Poll the database until a generation leaves `processing`.
pub async fn await_terminal(pool: &PgPool, id: DbId) {
    for _ in 0..500 {
        let generation = GenerationRepo::find_by_id(pool, id)
            .await
            .expect("poll query")
            .expect("record exists");
        if generation.status_id != GenerationStatus::Processing.id() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("generation {id} did not reach a terminal state in time");
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

/// Unauthenticated GET.
pub async fn get(app: Router, path: &str) -> Response<Body> {
    let request = Request::builder()
        .uri(path)
        .body(Body::empty())
        .expect("request");
    app.oneshot(request).await.expect("response")
}

/// Authenticated GET with a bearer token.
pub async fn get_auth(app: Router, path: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .uri(path)
        .header("Authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .expect("request");
    app.oneshot(request).await.expect("response")
}

/// Authenticated POST with a JSON body.
pub async fn post_json(
    app: Router,
    path: &str,
    token: Option<&str>,
    body: serde_json::Value,
) -> Response<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(path)
        .header("Content-Type", "application/json");
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    let request = builder
        .body(Body::from(body.to_string()))
        .expect("request");
    app.oneshot(request).await.expect("response")
}

/// Authenticated PUT with a JSON body.
pub async fn put_json(
    app: Router,
    path: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    let request = Request::builder()
        .method("PUT")
        .uri(path)
        .header("Content-Type", "application/json")
        .header("Authorization", format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .expect("request");
    app.oneshot(request).await.expect("response")
}

/// Authenticated DELETE.
pub async fn delete_auth(app: Router, path: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .method("DELETE")
        .uri(path)
        .header("Authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .expect("request");
    app.oneshot(request).await.expect("response")
}

/// Collect a response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body is JSON")
}

/// Assert a status and return the parsed body.
pub async fn expect_status(response: Response<Body>, status: StatusCode) -> serde_json::Value {
    assert_eq!(response.status(), status);
    body_json(response).await
}
