//! Changelog document entity models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use shipnotes_core::types::{DbId, Timestamp};

use super::status::StatusId;

/// A changelog document row from the `changelogs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Changelog {
    pub id: DbId,
    pub repository_id: DbId,
    pub version: String,
    pub title: String,
    pub description: Option<String>,
    pub branch: String,
    pub range_start: Timestamp,
    pub range_end: Timestamp,
    pub status_id: StatusId,
    pub tags: Vec<String>,
    /// Back-reference to the generation this document was assembled from.
    /// Nulled if that generation is later deleted; the document survives.
    pub ai_generation_id: Option<DbId>,
    pub created_by: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A section row from the `changelog_sections` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ChangelogSection {
    pub id: DbId,
    pub changelog_id: DbId,
    pub title: String,
    pub position: i32,
}

/// A change row from the `changelog_changes` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ChangelogChange {
    pub id: DbId,
    pub section_id: DbId,
    pub description: String,
    pub category: String,
    pub impact: String,
    pub breaking_change: bool,
    pub commit_shas: Vec<String>,
    pub position: i32,
}

/// A section with its owned changes, as returned by content reads.
#[derive(Debug, Clone, Serialize)]
pub struct SectionWithChanges {
    #[serde(flatten)]
    pub section: ChangelogSection,
    pub changes: Vec<ChangelogChange>,
}

/// A full document: header row plus ordered sections and changes.
#[derive(Debug, Clone, Serialize)]
pub struct ChangelogWithContent {
    #[serde(flatten)]
    pub changelog: Changelog,
    pub sections: Vec<SectionWithChanges>,
}

// ---------------------------------------------------------------------------
// Assembly input
// ---------------------------------------------------------------------------

/// A change to insert, produced by the assembly mapping step.
#[derive(Debug, Clone)]
pub struct NewChange {
    pub description: String,
    pub category: String,
    pub impact: String,
    pub breaking_change: bool,
    pub commit_shas: Vec<String>,
}

/// A section to insert with its changes.
#[derive(Debug, Clone)]
pub struct NewSection {
    pub title: String,
    pub changes: Vec<NewChange>,
}

/// A complete document to insert atomically. Fresh ids for the document,
/// every section, and every change are assigned by the database.
#[derive(Debug, Clone)]
pub struct NewChangelogDocument {
    pub repository_id: DbId,
    pub version: String,
    pub title: String,
    pub description: Option<String>,
    pub branch: String,
    pub range_start: Timestamp,
    pub range_end: Timestamp,
    pub tags: Vec<String>,
    pub ai_generation_id: Option<DbId>,
    pub created_by: DbId,
    pub sections: Vec<NewSection>,
}

// ---------------------------------------------------------------------------
// Request DTOs
// ---------------------------------------------------------------------------

/// Body for `POST /api/v1/generations/{id}/publish`. All fields optional;
/// omitted fields keep the generated values.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PublishCustomizations {
    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// Body for `PUT /api/v1/changelogs/{id}`. All fields are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateChangelog {
    pub version: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// Body for `POST /api/v1/changelogs/{id}/status`.
#[derive(Debug, Clone, Deserialize)]
pub struct SetChangelogStatus {
    /// One of `draft | review | published | archived`.
    pub status: String,
}

/// Query parameters for `GET /api/v1/changelogs`.
#[derive(Debug, Deserialize)]
pub struct ChangelogListQuery {
    pub repository_id: Option<DbId>,
    pub status_id: Option<StatusId>,
    /// Maximum number of results. Defaults to 50, capped at 100.
    pub limit: Option<i64>,
    /// Number of results to skip. Defaults to 0.
    pub offset: Option<i64>,
}
