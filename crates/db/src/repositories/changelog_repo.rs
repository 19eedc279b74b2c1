//! Repository for changelog documents and their sections/changes.
//!
//! Document insertion is a single transaction covering the header row,
//! every section, and every change -- readers never observe a partially
//! written document.

use sqlx::{PgPool, Postgres, Transaction};

use shipnotes_core::types::DbId;

use crate::models::changelog::{
    Changelog, ChangelogChange, ChangelogListQuery, ChangelogSection, ChangelogWithContent,
    NewChangelogDocument, SectionWithChanges, UpdateChangelog,
};
use crate::models::status::{ChangelogStatus, StatusId};

/// Column list for `changelogs` queries.
const COLUMNS: &str = "\
    id, repository_id, version, title, description, branch, range_start, range_end, \
    status_id, tags, ai_generation_id, created_by, created_at, updated_at";

/// Column list for `changelog_sections` queries.
const SECTION_COLUMNS: &str = "id, changelog_id, title, position";

/// Column list for `changelog_changes` queries.
const CHANGE_COLUMNS: &str =
    "id, section_id, description, category, impact, breaking_change, commit_shas, position";

/// Maximum page size for changelog listing.
const MAX_LIMIT: i64 = 100;

/// Default page size for changelog listing.
const DEFAULT_LIMIT: i64 = 50;

/// Provides CRUD operations for changelog documents.
pub struct ChangelogRepo;

impl ChangelogRepo {
    /// Insert a complete document atomically.
    ///
    /// All rows get fresh BIGSERIAL ids; section and change positions
    /// follow the input order. Rolls back entirely on any failure.
    pub async fn insert_document(
        pool: &PgPool,
        doc: &NewChangelogDocument,
    ) -> Result<Changelog, sqlx::Error> {
        let mut tx: Transaction<'_, Postgres> = pool.begin().await?;

        let query = format!(
            "INSERT INTO changelogs
                 (repository_id, version, title, description, branch, range_start, range_end,
                  status_id, tags, ai_generation_id, created_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             RETURNING {COLUMNS}"
        );
        let changelog = sqlx::query_as::<_, Changelog>(&query)
            .bind(doc.repository_id)
            .bind(&doc.version)
            .bind(&doc.title)
            .bind(&doc.description)
            .bind(&doc.branch)
            .bind(doc.range_start)
            .bind(doc.range_end)
            .bind(ChangelogStatus::Draft.id())
            .bind(&doc.tags)
            .bind(doc.ai_generation_id)
            .bind(doc.created_by)
            .fetch_one(&mut *tx)
            .await?;

        for (section_pos, section) in doc.sections.iter().enumerate() {
            let section_id: DbId = sqlx::query_scalar(
                "INSERT INTO changelog_sections (changelog_id, title, position)
                 VALUES ($1, $2, $3)
                 RETURNING id",
            )
            .bind(changelog.id)
            .bind(&section.title)
            .bind(section_pos as i32)
            .fetch_one(&mut *tx)
            .await?;

            for (change_pos, change) in section.changes.iter().enumerate() {
                sqlx::query(
                    "INSERT INTO changelog_changes
                         (section_id, description, category, impact, breaking_change,
                          commit_shas, position)
                     VALUES ($1, $2, $3, $4, $5, $6, $7)",
                )
                .bind(section_id)
                .bind(&change.description)
                .bind(&change.category)
                .bind(&change.impact)
                .bind(change.breaking_change)
                .bind(&change.commit_shas)
                .bind(change_pos as i32)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;
        Ok(changelog)
    }

    /// Find a document header row by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Changelog>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM changelogs WHERE id = $1");
        sqlx::query_as::<_, Changelog>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Load a full document: header plus ordered sections and changes.
    pub async fn get_with_content(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ChangelogWithContent>, sqlx::Error> {
        let Some(changelog) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };
        let sections = Self::load_content(pool, &changelog).await?;
        Ok(Some(ChangelogWithContent { changelog, sections }))
    }

    /// Load ordered sections and changes for a document header.
    pub async fn load_content(
        pool: &PgPool,
        changelog: &Changelog,
    ) -> Result<Vec<SectionWithChanges>, sqlx::Error> {
        let query = format!(
            "SELECT {SECTION_COLUMNS} FROM changelog_sections
             WHERE changelog_id = $1 ORDER BY position"
        );
        let sections = sqlx::query_as::<_, ChangelogSection>(&query)
            .bind(changelog.id)
            .fetch_all(pool)
            .await?;

        let mut out = Vec::with_capacity(sections.len());
        for section in sections {
            let query = format!(
                "SELECT {CHANGE_COLUMNS} FROM changelog_changes
                 WHERE section_id = $1 ORDER BY position"
            );
            let changes = sqlx::query_as::<_, ChangelogChange>(&query)
                .bind(section.id)
                .fetch_all(pool)
                .await?;
            out.push(SectionWithChanges { section, changes });
        }
        Ok(out)
    }

    /// List document headers with optional repository/status filters and
    /// pagination, newest first.
    pub async fn list(
        pool: &PgPool,
        params: &ChangelogListQuery,
    ) -> Result<Vec<Changelog>, sqlx::Error> {
        let limit = params.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
        let offset = params.offset.unwrap_or(0);

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
            "SELECT {COLUMNS} FROM changelogs \
             {where_clause} \
             ORDER BY created_at DESC \
             LIMIT ${bind_idx} OFFSET ${}",
            bind_idx + 1,
        );

        let mut q = sqlx::query_as::<_, Changelog>(&query);
        if let Some(rid) = params.repository_id {
            q = q.bind(rid);
        }
        if let Some(sid) = params.status_id {
            q = q.bind(sid);
        }
        q = q.bind(limit).bind(offset);

        q.fetch_all(pool).await
    }

    /// Update document metadata. Only non-`None` fields are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateChangelog,
    ) -> Result<Option<Changelog>, sqlx::Error> {
        let query = format!(
            "UPDATE changelogs SET
                version = COALESCE($2, version),
                title = COALESCE($3, title),
                description = COALESCE($4, description),
                tags = COALESCE($5, tags)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Changelog>(&query)
            .bind(id)
            .bind(&input.version)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.tags)
            .fetch_optional(pool)
            .await
    }

    /// Set the publication status of a document.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn set_status(
        pool: &PgPool,
        id: DbId,
        status: ChangelogStatus,
    ) -> Result<Option<Changelog>, sqlx::Error> {
        let query = format!(
            "UPDATE changelogs SET status_id = $2 WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Changelog>(&query)
            .bind(id)
            .bind(status.id())
            .fetch_optional(pool)
            .await
    }

    /// Delete a document by ID. Sections and changes cascade.
    /// Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM changelogs WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// List published documents for a repository, newest first
    /// (public changelog site).
    pub async fn list_published(
        pool: &PgPool,
        repository_id: DbId,
    ) -> Result<Vec<Changelog>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM changelogs
             WHERE repository_id = $1 AND status_id = $2
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Changelog>(&query)
            .bind(repository_id)
            .bind(ChangelogStatus::Published.id())
            .fetch_all(pool)
            .await
    }

    /// Find the newest published document with the given version string.
    pub async fn find_published_version(
        pool: &PgPool,
        repository_id: DbId,
        version: &str,
    ) -> Result<Option<Changelog>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM changelogs
             WHERE repository_id = $1 AND version = $2 AND status_id = $3
             ORDER BY created_at DESC
             LIMIT 1"
        );
        sqlx::query_as::<_, Changelog>(&query)
            .bind(repository_id)
            .bind(version)
            .bind(ChangelogStatus::Published.id())
            .fetch_optional(pool)
            .await
    }

    /// Count documents per status (dashboard widget).
    pub async fn count_by_status(pool: &PgPool) -> Result<Vec<(StatusId, i64)>, sqlx::Error> {
        sqlx::query_as::<_, (StatusId, i64)>(
            "SELECT status_id, COUNT(*) FROM changelogs GROUP BY status_id",
        )
        .fetch_all(pool)
        .await
    }
}
