//! Generation request options. Every field has a default so an omitted
//! `options` object in the request body is equivalent to `{}`.

use serde::{Deserialize, Serialize};

/// How synthesized changes are grouped into sections.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupingStrategy {
    /// One section per commit category (Features, Bug Fixes, ...).
    #[default]
    Category,
    /// One section per affected component.
    Component,
    /// A single chronological section.
    Chronological,
}

/// Who the changelog prose is written for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Audience {
    Developers,
    #[default]
    Mixed,
    Users,
}

/// Options accepted on `POST /generations`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationOptions {
    pub grouping: GroupingStrategy,
    pub audience: Audience,
    /// Emit a dedicated "Breaking Changes" section when any exist.
    pub include_breaking_section: bool,
    /// Include commits classified as not user-facing (refactors, tests...).
    pub include_non_user_facing: bool,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            grouping: GroupingStrategy::Category,
            audience: Audience::Mixed,
            include_breaking_section: true,
            include_non_user_facing: false,
        }
    }
}
