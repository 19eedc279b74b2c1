//! Per-commit categorization results and their normalization.
//!
//! The language model is asked to return one analysis object per commit,
//! but its output is not contractually guaranteed to match the requested
//! schema. [`CommitAnalysis::from_model_value`] therefore fills every
//! missing field with a documented default and coerces wrong-typed fields
//! instead of failing, so a partially malformed response degrades
//! gracefully rather than aborting the pipeline.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Category / impact enums
// ---------------------------------------------------------------------------

/// Fixed commit category vocabulary the model is asked to choose from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitCategory {
    Feature,
    Fix,
    Breaking,
    Docs,
    Refactor,
    Perf,
    Test,
    Security,
    Chore,
}

impl CommitCategory {
    /// Lowercase wire name, matching the prompt vocabulary.
    pub fn as_str(self) -> &'static str {
        match self {
            CommitCategory::Feature => "feature",
            CommitCategory::Fix => "fix",
            CommitCategory::Breaking => "breaking",
            CommitCategory::Docs => "docs",
            CommitCategory::Refactor => "refactor",
            CommitCategory::Perf => "perf",
            CommitCategory::Test => "test",
            CommitCategory::Security => "security",
            CommitCategory::Chore => "chore",
        }
    }

    /// Parse a category name case-insensitively. Unknown names yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "feature" | "feat" => Some(CommitCategory::Feature),
            "fix" | "bugfix" => Some(CommitCategory::Fix),
            "breaking" => Some(CommitCategory::Breaking),
            "docs" | "documentation" => Some(CommitCategory::Docs),
            "refactor" => Some(CommitCategory::Refactor),
            "perf" | "performance" => Some(CommitCategory::Perf),
            "test" | "tests" => Some(CommitCategory::Test),
            "security" => Some(CommitCategory::Security),
            "chore" => Some(CommitCategory::Chore),
            _ => None,
        }
    }

    /// Section heading used when grouping a changelog by category.
    pub fn section_title(self) -> &'static str {
        match self {
            CommitCategory::Feature => "Features",
            CommitCategory::Fix => "Bug Fixes",
            CommitCategory::Breaking => "Breaking Changes",
            CommitCategory::Docs => "Documentation",
            CommitCategory::Refactor => "Refactoring",
            CommitCategory::Perf => "Performance",
            CommitCategory::Test => "Testing",
            CommitCategory::Security => "Security",
            CommitCategory::Chore => "Maintenance",
        }
    }
}

/// Release impact of a single change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    Major,
    Minor,
    Patch,
}

impl Impact {
    pub fn as_str(self) -> &'static str {
        match self {
            Impact::Major => "major",
            Impact::Minor => "minor",
            Impact::Patch => "patch",
        }
    }

    /// Parse an impact name case-insensitively. Unknown names yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "major" => Some(Impact::Major),
            "minor" => Some(Impact::Minor),
            "patch" => Some(Impact::Patch),
            _ => None,
        }
    }
}

/// Fixed category-to-impact mapping applied when the model supplies no
/// impact of its own: breaking changes are major, features minor,
/// everything else patch.
pub fn impact_for_category(category: CommitCategory) -> Impact {
    match category {
        CommitCategory::Breaking => Impact::Major,
        CommitCategory::Feature => Impact::Minor,
        _ => Impact::Patch,
    }
}

// ---------------------------------------------------------------------------
// Confidence defaults
// ---------------------------------------------------------------------------

/// Confidence assigned when the model omits the field entirely.
pub const DEFAULT_CONFIDENCE: f64 = 0.5;
/// Floor applied to present-but-implausibly-low confidence values so
/// downstream aggregates never operate on zeros.
pub const MIN_CONFIDENCE: f64 = 0.3;

/// Normalize a model-reported confidence into `[MIN_CONFIDENCE, 1.0]`,
/// defaulting to [`DEFAULT_CONFIDENCE`] when absent or not a number.
pub fn clamp_confidence(raw: Option<f64>) -> f64 {
    match raw {
        Some(v) if v.is_finite() => v.clamp(MIN_CONFIDENCE, 1.0),
        _ => DEFAULT_CONFIDENCE,
    }
}

// ---------------------------------------------------------------------------
// CommitAnalysis
// ---------------------------------------------------------------------------

/// The categorized, per-commit output of the classification stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitAnalysis {
    pub sha: String,
    pub category: CommitCategory,
    pub description: String,
    pub impact: Impact,
    pub breaking_change: bool,
    pub affected_components: Vec<String>,
    pub user_facing: bool,
    pub confidence: f64,
}

impl CommitAnalysis {
    /// Build an analysis from one element of the model's response array.
    ///
    /// Every field the model omitted or mistyped is defaulted:
    /// - `category` falls back to `chore`
    /// - `description` falls back to the raw commit subject (`fallback_description`)
    /// - `impact` falls back to the fixed category mapping
    /// - `breaking_change` falls back to `false` (forced `true` for the
    ///   breaking category)
    /// - `affected_components` falls back to an empty list
    /// - `user_facing` falls back to `true` for features and fixes
    /// - `confidence` is clamped via [`clamp_confidence`]
    ///
    /// Returns `None` only when `value` is not a JSON object or no SHA can
    /// be determined (neither in the element nor from `fallback_sha`).
    pub fn from_model_value(
        value: &Value,
        fallback_sha: Option<&str>,
        fallback_description: Option<&str>,
    ) -> Option<Self> {
        let obj = value.as_object()?;

        let sha = obj
            .get("sha")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .or(fallback_sha)?
            .to_string();

        let category = obj
            .get("category")
            .or_else(|| obj.get("type"))
            .and_then(Value::as_str)
            .and_then(CommitCategory::parse)
            .unwrap_or(CommitCategory::Chore);

        let description = obj
            .get("description")
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
            .or(fallback_description)
            .unwrap_or("")
            .to_string();

        let impact = obj
            .get("impact")
            .and_then(Value::as_str)
            .and_then(Impact::parse)
            .unwrap_or_else(|| impact_for_category(category));

        let breaking_change = obj
            .get("breaking_change")
            .or_else(|| obj.get("breakingChange"))
            .and_then(Value::as_bool)
            .unwrap_or(false)
            || category == CommitCategory::Breaking;

        let affected_components = obj
            .get("affected_components")
            .or_else(|| obj.get("affectedComponents"))
            .and_then(Value::as_array)
            .map(|arr| {
                arr.iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let user_facing = obj
            .get("user_facing")
            .or_else(|| obj.get("userFacing"))
            .and_then(Value::as_bool)
            .unwrap_or(matches!(
                category,
                CommitCategory::Feature | CommitCategory::Fix | CommitCategory::Breaking
            ));

        let confidence = clamp_confidence(obj.get("confidence").and_then(Value::as_f64));

        Some(CommitAnalysis {
            sha,
            category,
            description,
            impact,
            breaking_change,
            affected_components,
            user_facing,
            confidence,
        })
    }
}

/// Normalize a whole model response array into analyses, pairing elements
/// with the fetched commits by position for SHA/description fallbacks.
///
/// Elements that cannot be normalized at all (non-objects with no
/// positional commit to fall back on) are dropped, not fatal.
pub fn normalize_analyses(values: &[Value], commits: &[crate::commit::Commit]) -> Vec<CommitAnalysis> {
    values
        .iter()
        .enumerate()
        .filter_map(|(i, v)| {
            let fallback = commits.get(i);
            CommitAnalysis::from_model_value(
                v,
                fallback.map(|c| c.sha.as_str()),
                fallback.map(|c| c.subject()),
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
