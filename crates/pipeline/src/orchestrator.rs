//! Owns the lifecycle of one changelog generation.
//!
//! `start_generation` validates the request, persists a `processing`
//! record, and returns it immediately; the fetch → analyze → synthesize
//! pipeline runs in a spawned task that only ever talks back through the
//! record's status and progress fields. Pollers observe via
//! `get_generation`.
//!
//! The collaborators are injected trait objects, never globals, so tests
//! drive the full pipeline with in-memory doubles.

use std::sync::Arc;
use std::time::{Duration, Instant};

use shipnotes_core::analysis::{normalize_analyses, CommitAnalysis};
use shipnotes_core::changelog::{reconcile_metadata, GeneratedChangelog};
use shipnotes_core::clients::{ChangelogModel, ClientError, CommitSource, ModelCompletion};
use shipnotes_core::commit::Commit;
use shipnotes_core::error::CoreError;
use shipnotes_core::generation::{
    mean_confidence, parse_date_bound, validate_date_range, AiMetadata, PROGRESS_ANALYZED,
    PROGRESS_FETCHED, PROGRESS_RECONCILED, PROGRESS_SYNTHESIZED,
};
use shipnotes_core::options::GenerationOptions;
use shipnotes_core::types::{DbId, Timestamp};
use shipnotes_db::models::generation::{Generation, NewGeneration, StartGeneration};
use shipnotes_db::repositories::{GenerationRepo, RepositoryRepo};
use shipnotes_db::DbPool;
use shipnotes_llm::repair;

use crate::error::PipelineError;

/// Drives changelog generations from request to terminal state.
pub struct GenerationOrchestrator {
    pool: DbPool,
    commits: Arc<dyn CommitSource>,
    model: Arc<dyn ChangelogModel>,
    stage_deadline: Duration,
}

impl GenerationOrchestrator {
    /// Create an orchestrator with injected collaborators.
    pub fn new(
        pool: DbPool,
        commits: Arc<dyn CommitSource>,
        model: Arc<dyn ChangelogModel>,
        stage_deadline: Duration,
    ) -> Self {
        Self {
            pool,
            commits,
            model,
            stage_deadline,
        }
    }

    /// Accept a generation request.
    ///
    /// Validates synchronously (parseable dates, start <= end, known
    /// repository) before any record exists, then persists exactly one
    /// `processing` record at progress 0, spawns the background pipeline,
    /// and returns the record. Background failures are never reported
    /// through this return value.
    pub async fn start_generation(
        &self,
        requested_by: DbId,
        request: &StartGeneration,
    ) -> Result<Generation, PipelineError> {
        let range_start = parse_date_bound(&request.start_date)?;
        let range_end = parse_date_bound(&request.end_date)?;
        validate_date_range(range_start, range_end)?;

        let repository = RepositoryRepo::find_by_id(&self.pool, request.repository_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Repository",
                id: request.repository_id,
            })?;

        let branch = request
            .branch
            .clone()
            .filter(|b| !b.trim().is_empty())
            .unwrap_or_else(|| repository.default_branch.clone());

        let generation = GenerationRepo::create(
            &self.pool,
            &NewGeneration {
                repository_id: repository.id,
                branch: branch.clone(),
                range_start,
                range_end,
                options: request.options.clone(),
                requested_by,
            },
        )
        .await?;

        tracing::info!(
            generation_id = generation.id,
            repository = %repository.full_name(),
            branch = %branch,
            "Generation accepted",
        );

        let task = PipelineTask {
            pool: self.pool.clone(),
            commits: Arc::clone(&self.commits),
            model: Arc::clone(&self.model),
            stage_deadline: self.stage_deadline,
            generation_id: generation.id,
            repository_name: repository.full_name(),
            owner: repository.owner,
            name: repository.name,
            branch,
            range_start,
            range_end,
            options: request.options.clone(),
        };
        tokio::spawn(task.run());

        Ok(generation)
    }

    /// Snapshot read of a generation record. Never blocks on the pipeline.
    pub async fn get_generation(&self, id: DbId) -> Result<Option<Generation>, sqlx::Error> {
        GenerationRepo::find_by_id(&self.pool, id).await
    }
}

// ---------------------------------------------------------------------------
// Background pipeline
// ---------------------------------------------------------------------------

/// Everything one spawned pipeline run needs; owns its data so the task
/// is `'static`.
struct PipelineTask {
    pool: DbPool,
    commits: Arc<dyn CommitSource>,
    model: Arc<dyn ChangelogModel>,
    stage_deadline: Duration,
    generation_id: DbId,
    repository_name: String,
    owner: String,
    name: String,
    branch: String,
    range_start: Timestamp,
    range_end: Timestamp,
    options: GenerationOptions,
}

/// Failure modes of the background stages. These never leave the spawned
/// task: `run` maps any of them to the record's `failed` status and a log
/// line for operators.
#[derive(Debug, thiserror::Error)]
enum StageError {
    #[error("no commits in the requested range")]
    NoCommits,

    #[error("{stage}: {source}")]
    Client {
        stage: &'static str,
        source: ClientError,
    },

    #[error("{stage} exceeded the stage deadline")]
    Deadline { stage: &'static str },

    #[error("{stage} response could not be parsed as JSON")]
    Unparseable { stage: &'static str },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl PipelineTask {
    async fn run(self) {
        let started = Instant::now();
        if let Err(e) = self.execute(started).await {
            tracing::warn!(
                generation_id = self.generation_id,
                error = %e,
                "Generation pipeline failed",
            );
            match GenerationRepo::fail(&self.pool, self.generation_id).await {
                Ok(true) => {}
                Ok(false) => {
                    // Already terminal (e.g. swept by the watchdog); the
                    // guarded transition affected zero rows.
                    tracing::debug!(
                        generation_id = self.generation_id,
                        "Failure transition skipped: record already terminal",
                    );
                }
                Err(db_err) => {
                    tracing::error!(
                        generation_id = self.generation_id,
                        error = %db_err,
                        "Could not mark generation as failed",
                    );
                }
            }
        }
    }

    /// The ordered stages. Each persisted write completes before the next
    /// stage begins; any error aborts the remaining stages.
    async fn execute(&self, started: Instant) -> Result<(), StageError> {
        // Stage 1: fetch commits. An empty range is terminal.
        let commits = self.fetch_commits().await?;
        if commits.is_empty() {
            return Err(StageError::NoCommits);
        }
        GenerationRepo::update_progress(&self.pool, self.generation_id, PROGRESS_FETCHED).await?;

        // Stage 2: per-commit categorization.
        let (analyses, categorize) = self.categorize(&commits).await?;
        let analyses_value =
            serde_json::to_value(&analyses).unwrap_or_else(|_| serde_json::Value::Array(vec![]));
        GenerationRepo::store_analyses(
            &self.pool,
            self.generation_id,
            &analyses_value,
            PROGRESS_ANALYZED,
        )
        .await?;

        // Stage 3: full changelog synthesis.
        let (mut content, synthesize) = self.synthesize(&analyses).await?;
        GenerationRepo::update_progress(&self.pool, self.generation_id, PROGRESS_SYNTHESIZED)
            .await?;

        // Stage 4: reconcile the model's metadata against a recount.
        reconcile_metadata(&mut content, &analyses, &commits);
        GenerationRepo::update_progress(&self.pool, self.generation_id, PROGRESS_RECONCILED)
            .await?;

        // Stage 5: terminal completion.
        let ai_metadata = AiMetadata {
            model: synthesize.model,
            prompt_tokens: categorize.prompt_tokens + synthesize.prompt_tokens,
            completion_tokens: categorize.completion_tokens + synthesize.completion_tokens,
            confidence: mean_confidence(&analyses),
            processing_ms: started.elapsed().as_millis() as u64,
        };
        let content_value = serde_json::to_value(&content)
            .map_err(|_| StageError::Unparseable { stage: "synthesis" })?;
        let metadata_value = serde_json::to_value(&ai_metadata)
            .unwrap_or_else(|_| serde_json::json!({}));

        let completed = GenerationRepo::complete(
            &self.pool,
            self.generation_id,
            &content_value,
            &metadata_value,
        )
        .await?;

        if completed {
            tracing::info!(
                generation_id = self.generation_id,
                sections = content.sections.len(),
                changes = content.change_count(),
                elapsed_ms = ai_metadata.processing_ms,
                "Generation completed",
            );
        } else {
            tracing::warn!(
                generation_id = self.generation_id,
                "Completion skipped: record already terminal",
            );
        }
        Ok(())
    }

    async fn fetch_commits(&self) -> Result<Vec<Commit>, StageError> {
        let fut = self.commits.list_commits(
            &self.owner,
            &self.name,
            &self.branch,
            self.range_start,
            self.range_end,
        );
        with_deadline("commit fetch", self.stage_deadline, fut).await
    }

    async fn categorize(
        &self,
        commits: &[Commit],
    ) -> Result<(Vec<CommitAnalysis>, ModelCompletion), StageError> {
        let fut = self.model.categorize_commits(commits);
        let completion = with_deadline("categorization", self.stage_deadline, fut).await?;

        let values = repair::extract_json(&completion.text)
            .and_then(|v| v.as_array().cloned())
            .ok_or(StageError::Unparseable { stage: "categorization" })?;

        let analyses = normalize_analyses(&values, commits);
        if analyses.is_empty() {
            // Parsed, but nothing normalizable survived: treat the same as
            // an unparseable response.
            return Err(StageError::Unparseable { stage: "categorization" });
        }
        Ok((analyses, completion))
    }

    async fn synthesize(
        &self,
        analyses: &[CommitAnalysis],
    ) -> Result<(GeneratedChangelog, ModelCompletion), StageError> {
        let fut = self
            .model
            .synthesize_changelog(analyses, &self.options, &self.repository_name);
        let completion = with_deadline("synthesis", self.stage_deadline, fut).await?;

        let value = repair::extract_json(&completion.text)
            .ok_or(StageError::Unparseable { stage: "synthesis" })?;
        let content = GeneratedChangelog::from_model_value(&value, &self.repository_name)
            .ok_or(StageError::Unparseable { stage: "synthesis" })?;
        Ok((content, completion))
    }
}

/// Wrap an outbound collaborator call with the per-stage deadline.
async fn with_deadline<T>(
    stage: &'static str,
    deadline: Duration,
    fut: impl std::future::Future<Output = Result<T, ClientError>>,
) -> Result<T, StageError> {
    match tokio::time::timeout(deadline, fut).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(source)) => Err(StageError::Client { stage, source }),
        Err(_) => Err(StageError::Deadline { stage }),
    }
}
