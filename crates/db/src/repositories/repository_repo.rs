//! Repository for the `repositories` table (tracked source repositories).

use sqlx::PgPool;

use shipnotes_core::types::DbId;

use crate::models::repository::{CreateRepository, Repository, UpdateRepository};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, owner, name, provider, default_branch, description, created_at, updated_at";

/// Provides CRUD operations for tracked repositories.
pub struct RepositoryRepo;

impl RepositoryRepo {
    /// Insert a new repository, returning the created row.
    ///
    /// `provider` defaults to `github` and `default_branch` to `main`
    /// when omitted in the input.
    pub async fn create(pool: &PgPool, input: &CreateRepository) -> Result<Repository, sqlx::Error> {
        let query = format!(
            "INSERT INTO repositories (owner, name, provider, default_branch, description)
             VALUES ($1, $2, COALESCE($3, 'github'), COALESCE($4, 'main'), $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Repository>(&query)
            .bind(&input.owner)
            .bind(&input.name)
            .bind(&input.provider)
            .bind(&input.default_branch)
            .bind(&input.description)
            .fetch_one(pool)
            .await
    }

    /// Find a repository by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Repository>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM repositories WHERE id = $1");
        sqlx::query_as::<_, Repository>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a repository by its `owner/name` pair (public site lookups).
    pub async fn find_by_owner_name(
        pool: &PgPool,
        owner: &str,
        name: &str,
    ) -> Result<Option<Repository>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM repositories WHERE owner = $1 AND name = $2");
        sqlx::query_as::<_, Repository>(&query)
            .bind(owner)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// List all repositories ordered by owner/name.
    pub async fn list(pool: &PgPool) -> Result<Vec<Repository>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM repositories ORDER BY owner, name");
        sqlx::query_as::<_, Repository>(&query).fetch_all(pool).await
    }

    /// Update a repository. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateRepository,
    ) -> Result<Option<Repository>, sqlx::Error> {
        let query = format!(
            "UPDATE repositories SET
                default_branch = COALESCE($2, default_branch),
                description = COALESCE($3, description)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Repository>(&query)
            .bind(id)
            .bind(&input.default_branch)
            .bind(&input.description)
            .fetch_optional(pool)
            .await
    }

    /// Delete a repository by ID. Returns `true` if a row was removed.
    /// Generations and changelogs cascade.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM repositories WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
