//! Tracked-repository entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use shipnotes_core::types::{DbId, Timestamp};

/// A repository row from the `repositories` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Repository {
    pub id: DbId,
    pub owner: String,
    pub name: String,
    pub provider: String,
    pub default_branch: String,
    pub description: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Repository {
    /// `owner/name` display form used in prompts and public URLs.
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

/// DTO for registering a repository.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateRepository {
    #[validate(length(min = 1, max = 100))]
    pub owner: String,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    /// Defaults to `github` if omitted.
    pub provider: Option<String>,
    /// Defaults to `main` if omitted.
    pub default_branch: Option<String>,
    pub description: Option<String>,
}

/// DTO for updating a repository. All fields are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateRepository {
    pub default_branch: Option<String>,
    pub description: Option<String>,
}
