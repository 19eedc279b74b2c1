//! Collaborator seams for the generation pipeline.
//!
//! The orchestrator never talks to GitHub or the language model directly;
//! it holds `Arc<dyn CommitSource>` / `Arc<dyn ChangelogModel>` instances
//! constructed at startup, so tests substitute in-memory doubles.

use async_trait::async_trait;

use crate::analysis::CommitAnalysis;
use crate::commit::Commit;
use crate::options::GenerationOptions;
use crate::types::Timestamp;

/// Errors surfaced by outbound collaborators. Always typed -- the
/// orchestrator maps any of these uniformly to a failed generation.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The collaborator could not be reached at all.
    #[error("Connection error: {0}")]
    Connection(String),

    /// The collaborator answered with a non-success status.
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// The collaborator answered, but the payload could not be used.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// A raw model completion: text plus usage bookkeeping. Parsing the text
/// into structured data is the pipeline's job (see `shipnotes-llm`'s
/// repair module), so resilient-parsing behavior is testable end to end
/// with doubles that return canned text.
#[derive(Debug, Clone)]
pub struct ModelCompletion {
    pub text: String,
    pub model: String,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

/// Read access to a source-control host.
#[async_trait]
pub trait CommitSource: Send + Sync {
    /// Whether `owner/name` exists and is visible with the configured token.
    async fn repository_exists(&self, owner: &str, name: &str) -> Result<bool, ClientError>;

    /// List commits on `branch` authored within `[since, until]`,
    /// oldest first.
    async fn list_commits(
        &self,
        owner: &str,
        name: &str,
        branch: &str,
        since: Timestamp,
        until: Timestamp,
    ) -> Result<Vec<Commit>, ClientError>;
}

/// The language-model collaborator: one call per pipeline stage.
#[async_trait]
pub trait ChangelogModel: Send + Sync {
    /// Ask the model to categorize each commit. The completion text is
    /// expected to contain a JSON array with one object per commit.
    async fn categorize_commits(&self, commits: &[Commit]) -> Result<ModelCompletion, ClientError>;

    /// Ask the model to synthesize the full changelog from categorized
    /// commits. The completion text is expected to contain a JSON object.
    async fn synthesize_changelog(
        &self,
        analyses: &[CommitAnalysis],
        options: &GenerationOptions,
        repository_name: &str,
    ) -> Result<ModelCompletion, ClientError>;
}
