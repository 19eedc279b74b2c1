//! End-to-end pipeline tests with in-memory collaborator doubles.
//!
//! The doubles return canned completion text, so the resilient-parsing
//! path (fences, truncation) is exercised through the real pipeline
//! against a real database.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::PgPool;

use shipnotes_core::analysis::CommitAnalysis;
use shipnotes_core::clients::{ChangelogModel, ClientError, CommitSource, ModelCompletion};
use shipnotes_core::commit::Commit;
use shipnotes_core::generation::PROGRESS_DONE;
use shipnotes_core::options::GenerationOptions;
use shipnotes_core::types::{DbId, Timestamp};
use shipnotes_db::models::generation::{Generation, StartGeneration};
use shipnotes_db::models::repository::CreateRepository;
use shipnotes_db::models::status::GenerationStatus;
use shipnotes_db::repositories::{ChangelogRepo, GenerationRepo, RepositoryRepo, UserRepo};
use shipnotes_pipeline::assembly::create_changelog_from_generation;
use shipnotes_pipeline::{GenerationOrchestrator, PipelineError};

// ---------------------------------------------------------------------------
// Doubles
// ---------------------------------------------------------------------------

/// Commit source returning a fixed commit list.
struct StaticSource {
    commits: Vec<Commit>,
}

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
        Ok(self.commits.clone())
    }
}

/// Model returning fixed completion text per call.
struct StaticModel {
    categorize_text: String,
    synthesize_text: String,
}

#[async_trait]
impl ChangelogModel for StaticModel {
    async fn categorize_commits(&self, _commits: &[Commit]) -> Result<ModelCompletion, ClientError> {
        Ok(completion(&self.categorize_text))
    }

    async fn synthesize_changelog(
        &self,
        _analyses: &[CommitAnalysis],
        _options: &GenerationOptions,
        _repository_name: &str,
    ) -> Result<ModelCompletion, ClientError> {
        Ok(completion(&self.synthesize_text))
    }
}

fn completion(text: &str) -> ModelCompletion {
    ModelCompletion {
        text: text.to_string(),
        model: "test-model".to_string(),
        prompt_tokens: 100,
        completion_tokens: 50,
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

fn commit(sha: &str, message: &str, author: &str) -> Commit {
    Commit {
        sha: sha.to_string(),
        message: message.to_string(),
        author_name: author.to_string(),
        author_email: None,
        authored_at: chrono::Utc::now(),
    }
}

fn three_commits() -> Vec<Commit> {
    vec![
        commit("aaa111", "feat: add CSV export", "alice"),
        commit("bbb222", "fix: crash on empty input", "bob"),
        commit("ccc333", "fix: connection leak", "alice"),
    ]
}

/// Valid categorization array matching `three_commits`.
const CATEGORIZE_OK: &str = r#"[
  {"sha": "aaa111", "category": "feature", "description": "Add CSV export", "confidence": 0.9},
  {"sha": "bbb222", "category": "fix", "description": "Fix crash on empty input", "confidence": 0.8},
  {"sha": "ccc333", "category": "fix", "description": "Fix connection leak", "confidence": 0.7}
]"#;

/// Valid synthesis payload: 2 sections, 3 changes total.
const SYNTHESIZE_OK: &str = r#"{
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
  "metadata": {"total_commits": 99, "contributors": 99, "breaking_changes": 99, "features": 99, "fixes": 99}
}"#;

async fn seed_user_and_repo(pool: &PgPool) -> (DbId, DbId) {
    let user = UserRepo::create(pool, "tester", "tester@example.com", "not-a-real-hash", "editor")
        .await
        .expect("user insert");
    let repo = RepositoryRepo::create(
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
    .expect("repository insert");
    (user.id, repo.id)
}

fn orchestrator(pool: &PgPool, commits: Vec<Commit>, model: StaticModel) -> GenerationOrchestrator {
    GenerationOrchestrator::new(
        pool.clone(),
        Arc::new(StaticSource { commits }),
        Arc::new(model),
        Duration::from_secs(5),
    )
}

fn start_request(repository_id: DbId) -> StartGeneration {
    StartGeneration {
        repository_id,
        branch: None,
        start_date: "2025-01-01".to_string(),
        end_date: "2025-01-07".to_string(),
        options: GenerationOptions::default(),
    }
}

/// Poll until the record leaves `processing` (or 5 seconds pass).
async fn await_terminal(pool: &PgPool, id: DbId) -> Generation {
    for _ in 0..500 {
        let generation = GenerationRepo::find_by_id(pool, id)
            .await
            .expect("poll query")
            .expect("record exists");
        if generation.status_id != GenerationStatus::Processing.id() {
            return generation;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("generation {id} did not reach a terminal state in time");
}

// ---------------------------------------------------------------------------
// start_generation contract
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn start_returns_processing_at_zero_with_unique_ids(pool: PgPool) {
    let (user_id, repo_id) = seed_user_and_repo(&pool).await;
    let orch = orchestrator(
        &pool,
        three_commits(),
        StaticModel {
            categorize_text: CATEGORIZE_OK.into(),
            synthesize_text: SYNTHESIZE_OK.into(),
        },
    );

    let first = orch
        .start_generation(user_id, &start_request(repo_id))
        .await
        .expect("first start");
    let second = orch
        .start_generation(user_id, &start_request(repo_id))
        .await
        .expect("second start");

    assert_eq!(first.status_id, GenerationStatus::Processing.id());
    assert_eq!(first.progress, 0);
    // Defaulted from the repository row.
    assert_eq!(first.branch, "main");
    assert_ne!(first.id, second.id);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn bad_date_range_is_rejected_before_any_record_exists(pool: PgPool) {
    let (user_id, repo_id) = seed_user_and_repo(&pool).await;
    let orch = orchestrator(
        &pool,
        three_commits(),
        StaticModel {
            categorize_text: CATEGORIZE_OK.into(),
            synthesize_text: SYNTHESIZE_OK.into(),
        },
    );

    let mut request = start_request(repo_id);
    request.start_date = "2025-02-01".into();
    request.end_date = "2025-01-01".into();

    let result = orch.start_generation(user_id, &request).await;
    assert!(matches!(result, Err(PipelineError::Core(_))));

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM generations")
        .fetch_one(&pool)
        .await
        .expect("count");
    assert_eq!(count, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_repository_is_rejected(pool: PgPool) {
    let (user_id, _repo_id) = seed_user_and_repo(&pool).await;
    let orch = orchestrator(
        &pool,
        three_commits(),
        StaticModel {
            categorize_text: CATEGORIZE_OK.into(),
            synthesize_text: SYNTHESIZE_OK.into(),
        },
    );

    let result = orch.start_generation(user_id, &start_request(999_999)).await;
    assert!(matches!(result, Err(PipelineError::Core(_))));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unparseable_dates_are_rejected(pool: PgPool) {
    let (user_id, repo_id) = seed_user_and_repo(&pool).await;
    let orch = orchestrator(
        &pool,
        three_commits(),
        StaticModel {
            categorize_text: CATEGORIZE_OK.into(),
            synthesize_text: SYNTHESIZE_OK.into(),
        },
    );

    let mut request = start_request(repo_id);
    request.start_date = "last tuesday".into();

    assert!(orch.start_generation(user_id, &request).await.is_err());
}

// ---------------------------------------------------------------------------
// Pipeline outcomes
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn happy_path_completes_with_reconciled_metadata(pool: PgPool) {
    let (user_id, repo_id) = seed_user_and_repo(&pool).await;
    let orch = orchestrator(
        &pool,
        three_commits(),
        StaticModel {
            categorize_text: CATEGORIZE_OK.into(),
            synthesize_text: SYNTHESIZE_OK.into(),
        },
    );

    let started = orch
        .start_generation(user_id, &start_request(repo_id))
        .await
        .expect("start");
    let done = await_terminal(&pool, started.id).await;

    assert_eq!(done.status_id, GenerationStatus::Completed.id());
    assert_eq!(done.progress, PROGRESS_DONE);

    let content = done.generated_content.expect("content present");
    assert_eq!(content["sections"].as_array().map(Vec::len), Some(2));
    // The model claimed 99 everywhere; the recount is authoritative.
    assert_eq!(content["metadata"]["total_commits"], 3);
    assert_eq!(content["metadata"]["contributors"], 2);
    assert_eq!(content["metadata"]["breaking_changes"], 0);
    assert_eq!(content["metadata"]["features"], 1);
    assert_eq!(content["metadata"]["fixes"], 2);

    let metadata = done.ai_metadata.expect("ai metadata present");
    assert_eq!(metadata["model"], "test-model");
    assert_eq!(metadata["prompt_tokens"], 200);

    let analyses = done.commit_analyses.as_array().expect("analyses array");
    assert_eq!(analyses.len(), 3);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn zero_commits_fails_with_no_content(pool: PgPool) {
    let (user_id, repo_id) = seed_user_and_repo(&pool).await;
    let orch = orchestrator(
        &pool,
        Vec::new(),
        StaticModel {
            categorize_text: CATEGORIZE_OK.into(),
            synthesize_text: SYNTHESIZE_OK.into(),
        },
    );

    let started = orch
        .start_generation(user_id, &start_request(repo_id))
        .await
        .expect("start");
    let done = await_terminal(&pool, started.id).await;

    assert_eq!(done.status_id, GenerationStatus::Failed.id());
    assert!(done.generated_content.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn fenced_model_output_still_completes(pool: PgPool) {
    let (user_id, repo_id) = seed_user_and_repo(&pool).await;
    let orch = orchestrator(
        &pool,
        three_commits(),
        StaticModel {
            categorize_text: format!("```json\n{CATEGORIZE_OK}\n```"),
            synthesize_text: format!("Here you go!\n\n```json\n{SYNTHESIZE_OK}\n```"),
        },
    );

    let started = orch
        .start_generation(user_id, &start_request(repo_id))
        .await
        .expect("start");
    let done = await_terminal(&pool, started.id).await;

    assert_eq!(done.status_id, GenerationStatus::Completed.id());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn truncated_synthesis_recovers_a_valid_prefix(pool: PgPool) {
    // Cut SYNTHESIZE_OK mid-way through the second section: the salvage
    // keeps the complete "Features" section and the generation completes
    // with a coherent subset, never corrupt content.
    let truncated = r#"{
  "version": "1.4.0",
  "title": "January release",
  "summary": "One feature and two fixes.",
  "sections": [
    {"title": "Features", "changes": [
      {"description": "CSV export", "category": "feature", "commit_shas": ["aaa111"]}
    ]}
  ],
  "metadata": {"total_commits": 99, "contributors": 99, "breaking"#;

    let (user_id, repo_id) = seed_user_and_repo(&pool).await;
    let orch = orchestrator(
        &pool,
        three_commits(),
        StaticModel {
            categorize_text: CATEGORIZE_OK.into(),
            synthesize_text: truncated.into(),
        },
    );

    let started = orch
        .start_generation(user_id, &start_request(repo_id))
        .await
        .expect("start");
    let done = await_terminal(&pool, started.id).await;

    assert_eq!(done.status_id, GenerationStatus::Completed.id());
    let content = done.generated_content.expect("content present");
    assert_eq!(content["sections"].as_array().map(Vec::len), Some(1));
    // Reconciliation replaced the truncated metadata block entirely.
    assert_eq!(content["metadata"]["total_commits"], 3);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn hopeless_synthesis_fails_but_preserves_analyses(pool: PgPool) {
    let (user_id, repo_id) = seed_user_and_repo(&pool).await;
    let orch = orchestrator(
        &pool,
        three_commits(),
        StaticModel {
            categorize_text: CATEGORIZE_OK.into(),
            synthesize_text: "I'm sorry, I cannot write a changelog today.".into(),
        },
    );

    let started = orch
        .start_generation(user_id, &start_request(repo_id))
        .await
        .expect("start");
    let done = await_terminal(&pool, started.id).await;

    assert_eq!(done.status_id, GenerationStatus::Failed.id());
    assert!(done.generated_content.is_none());
    // Diagnostics: the stage-2 analyses survive the failure.
    assert_eq!(done.commit_analyses.as_array().map(Vec::len), Some(3));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn terminal_states_are_immutable(pool: PgPool) {
    let (user_id, repo_id) = seed_user_and_repo(&pool).await;
    let orch = orchestrator(
        &pool,
        three_commits(),
        StaticModel {
            categorize_text: CATEGORIZE_OK.into(),
            synthesize_text: SYNTHESIZE_OK.into(),
        },
    );

    let started = orch
        .start_generation(user_id, &start_request(repo_id))
        .await
        .expect("start");
    let done = await_terminal(&pool, started.id).await;
    assert_eq!(done.status_id, GenerationStatus::Completed.id());

    // Late writes from a ghost task are no-ops on terminal rows.
    assert!(!GenerationRepo::fail(&pool, done.id).await.expect("fail call"));
    GenerationRepo::update_progress(&pool, done.id, 10)
        .await
        .expect("progress call");

    let after = GenerationRepo::find_by_id(&pool, done.id)
        .await
        .expect("query")
        .expect("exists");
    assert_eq!(after.status_id, GenerationStatus::Completed.id());
    assert_eq!(after.progress, 100);
}

// ---------------------------------------------------------------------------
// Assembly
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn publish_creates_full_document_with_fresh_ids(pool: PgPool) {
    let (user_id, repo_id) = seed_user_and_repo(&pool).await;
    let orch = orchestrator(
        &pool,
        three_commits(),
        StaticModel {
            categorize_text: CATEGORIZE_OK.into(),
            synthesize_text: SYNTHESIZE_OK.into(),
        },
    );

    let started = orch
        .start_generation(user_id, &start_request(repo_id))
        .await
        .expect("start");
    let done = await_terminal(&pool, started.id).await;
    assert_eq!(done.status_id, GenerationStatus::Completed.id());

    let changelog =
        create_changelog_from_generation(&pool, done.id, user_id, &Default::default())
            .await
            .expect("publish");

    assert_eq!(changelog.ai_generation_id, Some(done.id));

    let with_content = ChangelogRepo::get_with_content(&pool, changelog.id)
        .await
        .expect("load")
        .expect("exists");
    assert_eq!(with_content.sections.len(), 2);
    let total_changes: usize = with_content.sections.iter().map(|s| s.changes.len()).sum();
    assert_eq!(total_changes, 3);

    // Fresh database ids, ordered positions.
    assert_eq!(with_content.sections[0].section.position, 0);
    assert_eq!(with_content.sections[1].section.position, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn publish_of_processing_generation_creates_nothing(pool: PgPool) {
    let (user_id, repo_id) = seed_user_and_repo(&pool).await;
    // A source that never returns keeps the record processing long enough
    // to observe the precondition failure.
    let orch = orchestrator(
        &pool,
        three_commits(),
        StaticModel {
            // Unparseable on purpose; the record will eventually fail, but
            // we publish while it is still processing or already failed --
            // both must be rejected.
            categorize_text: "not json".into(),
            synthesize_text: "not json".into(),
        },
    );

    let started = orch
        .start_generation(user_id, &start_request(repo_id))
        .await
        .expect("start");

    let result =
        create_changelog_from_generation(&pool, started.id, user_id, &Default::default()).await;
    assert!(matches!(result, Err(PipelineError::Core(_))));

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM changelogs")
        .fetch_one(&pool)
        .await
        .expect("count");
    assert_eq!(count, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn publish_of_missing_generation_fails(pool: PgPool) {
    let (user_id, _repo_id) = seed_user_and_repo(&pool).await;
    let result =
        create_changelog_from_generation(&pool, 424_242, user_id, &Default::default()).await;
    assert!(matches!(result, Err(PipelineError::Core(_))));
}
