//! Repository for the `generations` table.
//!
//! Uses `GenerationStatus` from `models::status` for all status
//! transitions. Every lifecycle UPDATE is guarded by
//! `status_id = Processing` so terminal rows are immutable: a late write
//! from a dead pipeline task (or a watchdog racing a finishing task)
//! simply affects zero rows.

use sqlx::PgPool;

use shipnotes_core::types::{DbId, Timestamp};

use crate::models::generation::{Generation, GenerationListQuery, NewGeneration};
use crate::models::status::{GenerationStatus, StatusId};

/// Column list for `generations` queries.
const COLUMNS: &str = "\
    id, repository_id, branch, range_start, range_end, status_id, progress, \
    options, commit_analyses, generated_content, ai_metadata, \
    requested_by, created_at, updated_at";

/// Maximum page size for generation listing.
const MAX_LIMIT: i64 = 100;

/// Default page size for generation listing.
const DEFAULT_LIMIT: i64 = 50;

/// Provides lifecycle operations for generation records.
pub struct GenerationRepo;

impl GenerationRepo {
    /// Create a new generation in `processing` at progress 0.
    /// Returns immediately with the created row.
    pub async fn create(pool: &PgPool, input: &NewGeneration) -> Result<Generation, sqlx::Error> {
        let options = serde_json::to_value(&input.options)
            .expect("GenerationOptions always serializes");
        let query = format!(
            "INSERT INTO generations
                 (repository_id, branch, range_start, range_end, status_id, options, requested_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Generation>(&query)
            .bind(input.repository_id)
            .bind(&input.branch)
            .bind(input.range_start)
            .bind(input.range_end)
            .bind(GenerationStatus::Processing.id())
            .bind(options)
            .bind(input.requested_by)
            .fetch_one(pool)
            .await
    }

    /// Find a generation by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Generation>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM generations WHERE id = $1");
        sqlx::query_as::<_, Generation>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Advance progress on a processing generation.
    ///
    /// `GREATEST` keeps progress monotonically non-decreasing even if a
    /// stage reports a lower value; the status guard makes the update a
    /// no-op on terminal rows.
    pub async fn update_progress(
        pool: &PgPool,
        id: DbId,
        progress: i16,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE generations
             SET progress = GREATEST(progress, $2)
             WHERE id = $1 AND status_id = $3",
        )
        .bind(id)
        .bind(progress)
        .bind(GenerationStatus::Processing.id())
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Store the normalized per-commit analyses and advance progress in
    /// one durable write.
    pub async fn store_analyses(
        pool: &PgPool,
        id: DbId,
        analyses: &serde_json::Value,
        progress: i16,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE generations
             SET commit_analyses = $2, progress = GREATEST(progress, $3)
             WHERE id = $1 AND status_id = $4",
        )
        .bind(id)
        .bind(analyses)
        .bind(progress)
        .bind(GenerationStatus::Processing.id())
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Terminal transition: processing -> completed, persisting the
    /// synthesized content and AI metadata atomically with the status flip
    /// and progress 100. Affects zero rows if the record is already
    /// terminal.
    pub async fn complete(
        pool: &PgPool,
        id: DbId,
        content: &serde_json::Value,
        ai_metadata: &serde_json::Value,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE generations
             SET status_id = $2, progress = 100, generated_content = $3, ai_metadata = $4
             WHERE id = $1 AND status_id = $5",
        )
        .bind(id)
        .bind(GenerationStatus::Completed.id())
        .bind(content)
        .bind(ai_metadata)
        .bind(GenerationStatus::Processing.id())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Terminal transition: processing -> failed. Analyses collected so far
    /// are preserved; `generated_content` stays absent. No automatic retry
    /// exists -- a caller retries by starting a new generation.
    pub async fn fail(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE generations
             SET status_id = $2
             WHERE id = $1 AND status_id = $3",
        )
        .bind(id)
        .bind(GenerationStatus::Failed.id())
        .bind(GenerationStatus::Processing.id())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Watchdog sweep: fail every processing generation whose last write
    /// is older than `cutoff`. Returns the number of rows swept.
    pub async fn fail_stale(pool: &PgPool, cutoff: Timestamp) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE generations
             SET status_id = $1
             WHERE status_id = $2 AND updated_at < $3",
        )
        .bind(GenerationStatus::Failed.id())
        .bind(GenerationStatus::Processing.id())
        .bind(cutoff)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// List generations with optional repository/status filters and
    /// pagination, newest first.
    pub async fn list(
        pool: &PgPool,
        params: &GenerationListQuery,
    ) -> Result<Vec<Generation>, sqlx::Error> {
        let limit = params.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
        let offset = params.offset.unwrap_or(0);

        // Build the WHERE clause and track the next bind parameter index.
        let mut conditions: Vec<String> = Vec::new();
        let mut bind_idx: u32 = 1;

        if params.repository_id.is_some() {
            conditions.push(format!("repository_id = ${bind_idx}"));
            bind_idx += 1;
        }
        if params.status_id.is_some() {
            conditions.push(format!("status_id = ${bind_idx}"));
            bind_idx += 1;
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let query = format!(
            "SELECT {COLUMNS} FROM generations \
             {where_clause} \
             ORDER BY created_at DESC \
             LIMIT ${bind_idx} OFFSET ${}",
            bind_idx + 1,
        );

        let mut q = sqlx::query_as::<_, Generation>(&query);
        if let Some(rid) = params.repository_id {
            q = q.bind(rid);
        }
        if let Some(sid) = params.status_id {
            q = q.bind(sid);
        }
        q = q.bind(limit).bind(offset);

        q.fetch_all(pool).await
    }

    /// Count generations per status (dashboard widget).
    pub async fn count_by_status(pool: &PgPool) -> Result<Vec<(StatusId, i64)>, sqlx::Error> {
        sqlx::query_as::<_, (StatusId, i64)>(
            "SELECT status_id, COUNT(*) FROM generations GROUP BY status_id",
        )
        .fetch_all(pool)
        .await
    }
}
