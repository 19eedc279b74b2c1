//! Generation-record entity model and DTOs.
//!
//! `commit_analyses`, `generated_content`, and `ai_metadata` are stored as
//! JSONB and surface here as `serde_json::Value`; the typed views live in
//! `shipnotes_core` (`CommitAnalysis`, `GeneratedChangelog`, `AiMetadata`)
//! and are deserialized where the pipeline needs them.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use shipnotes_core::options::GenerationOptions;
use shipnotes_core::types::{DbId, Timestamp};

use super::status::StatusId;

/// A generation row from the `generations` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Generation {
    pub id: DbId,
    pub repository_id: DbId,
    pub branch: String,
    pub range_start: Timestamp,
    pub range_end: Timestamp,
    pub status_id: StatusId,
    /// 0-100; monotonically non-decreasing while processing.
    pub progress: i16,
    pub options: serde_json::Value,
    /// Ordered array of per-commit analyses; empty until the analysis
    /// stage persists, preserved on failure for diagnostics.
    pub commit_analyses: serde_json::Value,
    /// Present if and only if the generation completed.
    pub generated_content: Option<serde_json::Value>,
    pub ai_metadata: Option<serde_json::Value>,
    pub requested_by: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Body for `POST /api/v1/generations`.
///
/// Dates are strings so both RFC 3339 timestamps and bare `YYYY-MM-DD`
/// dates are accepted; parsing happens in the orchestrator's synchronous
/// validation, before any record is created.
#[derive(Debug, Clone, Deserialize)]
pub struct StartGeneration {
    pub repository_id: DbId,
    /// Defaults to the repository's default branch.
    pub branch: Option<String>,
    pub start_date: String,
    pub end_date: String,
    #[serde(default)]
    pub options: GenerationOptions,
}

/// Query parameters for `GET /api/v1/generations`.
#[derive(Debug, Deserialize)]
pub struct GenerationListQuery {
    pub repository_id: Option<DbId>,
    pub status_id: Option<StatusId>,
    /// Maximum number of results. Defaults to 50, capped at 100.
    pub limit: Option<i64>,
    /// Number of results to skip. Defaults to 0.
    pub offset: Option<i64>,
}

/// Validated, parsed form of [`StartGeneration`] handed to the pipeline.
#[derive(Debug, Clone)]
pub struct NewGeneration {
    pub repository_id: DbId,
    pub branch: String,
    pub range_start: Timestamp,
    pub range_end: Timestamp,
    pub options: GenerationOptions,
    pub requested_by: DbId,
}
