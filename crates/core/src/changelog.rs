//! The structured changelog payload produced by the synthesis stage.
//!
//! [`GeneratedChangelog::from_model_value`] applies the same defensive
//! normalization as commit analyses: missing fields get documented
//! defaults, wrong-typed fields are coerced, and the aggregate metadata
//! block is always recomputed from the stored analyses rather than
//! trusted from the model (`reconcile_metadata`).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::analysis::{impact_for_category, CommitAnalysis, CommitCategory, Impact};
use crate::commit::Commit;

// ---------------------------------------------------------------------------
// Payload types
// ---------------------------------------------------------------------------

/// One rendered change line inside a section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedChange {
    pub description: String,
    pub category: CommitCategory,
    /// Omitted by the model in practice; assembly derives it from the
    /// category when absent.
    pub impact: Option<Impact>,
    pub breaking_change: bool,
    /// SHAs of the commits this change summarizes.
    pub commit_shas: Vec<String>,
}

/// An ordered group of changes under one heading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedSection {
    pub title: String,
    pub changes: Vec<GeneratedChange>,
}

/// Aggregate statistics over the analyzed commit range.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangelogMetadata {
    pub total_commits: u32,
    pub contributors: u32,
    pub breaking_changes: u32,
    pub features: u32,
    pub fixes: u32,
}

/// The full synthesized changelog payload persisted on a completed
/// generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedChangelog {
    pub version: String,
    pub title: String,
    pub summary: String,
    pub sections: Vec<GeneratedSection>,
    pub metadata: ChangelogMetadata,
}

/// Version string used when the model does not propose one.
pub const DEFAULT_VERSION: &str = "Unreleased";

impl GeneratedChangelog {
    /// Build a changelog from the model's response object.
    ///
    /// `repository_name` seeds the title when the model omits one. Sections
    /// that are not objects and changes without any usable description are
    /// dropped. The metadata block starts zeroed; callers are expected to
    /// run [`reconcile_metadata`] before persisting.
    pub fn from_model_value(value: &Value, repository_name: &str) -> Option<Self> {
        let obj = value.as_object()?;

        let version = obj
            .get("version")
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(DEFAULT_VERSION)
            .to_string();

        let title = obj
            .get("title")
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("{repository_name} changelog"));

        let summary = obj
            .get("summary")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string();

        let sections = obj
            .get("sections")
            .and_then(Value::as_array)
            .map(|arr| arr.iter().filter_map(section_from_value).collect())
            .unwrap_or_default();

        Some(GeneratedChangelog {
            version,
            title,
            summary,
            sections,
            metadata: ChangelogMetadata::default(),
        })
    }

    /// Total number of change lines across all sections.
    pub fn change_count(&self) -> usize {
        self.sections.iter().map(|s| s.changes.len()).sum()
    }
}

fn section_from_value(value: &Value) -> Option<GeneratedSection> {
    let obj = value.as_object()?;
    let title = obj
        .get("title")
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())?
        .to_string();
    let changes = obj
        .get("changes")
        .and_then(Value::as_array)
        .map(|arr| arr.iter().filter_map(change_from_value).collect())
        .unwrap_or_default();
    Some(GeneratedSection { title, changes })
}

fn change_from_value(value: &Value) -> Option<GeneratedChange> {
    let obj = value.as_object()?;
    let description = obj
        .get("description")
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())?
        .to_string();

    let category = obj
        .get("category")
        .and_then(Value::as_str)
        .and_then(CommitCategory::parse)
        .unwrap_or(CommitCategory::Chore);

    let impact = obj.get("impact").and_then(Value::as_str).and_then(Impact::parse);

    let breaking_change = obj
        .get("breaking_change")
        .and_then(Value::as_bool)
        .unwrap_or(false)
        || category == CommitCategory::Breaking;

    let commit_shas = obj
        .get("commit_shas")
        .or_else(|| obj.get("commits"))
        .and_then(Value::as_array)
        .map(|arr| arr.iter().filter_map(Value::as_str).map(str::to_string).collect())
        .unwrap_or_default();

    Some(GeneratedChange {
        description,
        category,
        impact,
        breaking_change,
        commit_shas,
    })
}

// ---------------------------------------------------------------------------
// Metadata reconciliation
// ---------------------------------------------------------------------------

/// Recount aggregate statistics from the stored analyses and commits.
///
/// The model's self-reported counts are advisory only; this recount is
/// authoritative and overwrites whatever the synthesis stage returned.
pub fn recount_metadata(analyses: &[CommitAnalysis], commits: &[Commit]) -> ChangelogMetadata {
    let mut contributors: Vec<&str> = commits.iter().map(|c| c.author_name.as_str()).collect();
    contributors.sort_unstable();
    contributors.dedup();

    ChangelogMetadata {
        total_commits: commits.len() as u32,
        contributors: contributors.len() as u32,
        breaking_changes: analyses.iter().filter(|a| a.breaking_change).count() as u32,
        features: analyses
            .iter()
            .filter(|a| a.category == CommitCategory::Feature)
            .count() as u32,
        fixes: analyses
            .iter()
            .filter(|a| a.category == CommitCategory::Fix)
            .count() as u32,
    }
}

/// Replace the payload's metadata block with an authoritative recount.
pub fn reconcile_metadata(
    content: &mut GeneratedChangelog,
    analyses: &[CommitAnalysis],
    commits: &[Commit],
) {
    content.metadata = recount_metadata(analyses, commits);
}

/// Impact persisted for an assembled change: the model's value when it
/// supplied one, the fixed category mapping otherwise.
pub fn effective_impact(change: &GeneratedChange) -> Impact {
    change.impact.unwrap_or_else(|| impact_for_category(change.category))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
