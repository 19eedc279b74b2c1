//! Prompt construction for the two model calls.
//!
//! Both prompts embed a strict JSON example of the expected response
//! shape. The model is *asked* to answer with JSON only; actual output is
//! still treated as untrusted and goes through [`crate::repair`] and the
//! core normalization layer.

use shipnotes_core::analysis::CommitAnalysis;
use shipnotes_core::commit::Commit;
use shipnotes_core::options::{Audience, GenerationOptions, GroupingStrategy};

/// System prompt for the per-commit categorization call.
pub const CATEGORIZE_SYSTEM: &str = "\
You are a release-notes assistant that classifies git commits. \
Respond with a JSON array only: no prose, no markdown fences.";

/// System prompt for the changelog synthesis call.
pub const SYNTHESIZE_SYSTEM: &str = "\
You are a release-notes assistant that writes changelogs from \
categorized commits. Respond with a JSON object only: no prose, no \
markdown fences.";

/// Build the user prompt asking the model to categorize each commit.
///
/// The response must be a JSON array with exactly one object per input
/// commit, in the same order.
pub fn categorization_prompt(commits: &[Commit]) -> String {
    let mut prompt = String::from(
        "Classify each of the following commits. Return a JSON array with \
         one object per commit, in input order, shaped exactly like this \
         example:\n\n\
         [\n  {\n    \"sha\": \"<commit sha>\",\n    \"category\": \
         \"feature|fix|breaking|docs|refactor|perf|test|security|chore\",\n    \
         \"description\": \"<one sentence, imperative mood>\",\n    \
         \"impact\": \"major|minor|patch\",\n    \
         \"breaking_change\": false,\n    \
         \"affected_components\": [\"<component>\"],\n    \
         \"user_facing\": true,\n    \
         \"confidence\": 0.9\n  }\n]\n\nCommits:\n",
    );

    for commit in commits {
        prompt.push_str(&format!(
            "- sha: {}\n  author: {}\n  message: {}\n",
            commit.sha,
            commit.author_name,
            commit.subject(),
        ));
    }

    prompt
}

/// Build the user prompt asking the model to synthesize the changelog.
pub fn synthesis_prompt(
    analyses: &[CommitAnalysis],
    options: &GenerationOptions,
    repository_name: &str,
) -> String {
    let audience = match options.audience {
        Audience::Developers => "software developers integrating with the project",
        Audience::Users => "non-technical end users",
        Audience::Mixed => "a mixed technical and non-technical audience",
    };
    let grouping = match options.grouping {
        GroupingStrategy::Category => "group changes into sections by category",
        GroupingStrategy::Component => "group changes into sections by affected component",
        GroupingStrategy::Chronological => "use a single chronological section",
    };

    let mut prompt = format!(
        "Write a changelog for {repository_name} aimed at {audience}; \
         {grouping}. Return a JSON object shaped exactly like this \
         example:\n\n\
         {{\n  \"version\": \"1.4.0\",\n  \"title\": \"<release title>\",\n  \
         \"summary\": \"<two sentences>\",\n  \"sections\": [\n    {{\n      \
         \"title\": \"Features\",\n      \"changes\": [\n        {{\n          \
         \"description\": \"<user-readable change>\",\n          \
         \"category\": \"feature\",\n          \
         \"breaking_change\": false,\n          \
         \"commit_shas\": [\"<sha>\"]\n        }}\n      ]\n    }}\n  ],\n  \
         \"metadata\": {{\n    \"total_commits\": 0,\n    \
         \"contributors\": 0,\n    \"breaking_changes\": 0,\n    \
         \"features\": 0,\n    \"fixes\": 0\n  }}\n}}\n\n"
    );

    if options.include_breaking_section {
        prompt.push_str(
            "If any change is breaking, lead with a dedicated \"Breaking \
             Changes\" section.\n",
        );
    }
    if !options.include_non_user_facing {
        prompt.push_str("Omit changes that are not user facing.\n");
    }

    prompt.push_str("\nCategorized commits:\n");
    for analysis in analyses {
        prompt.push_str(&format!(
            "- sha: {}\n  category: {}\n  impact: {}\n  breaking: {}\n  \
             user_facing: {}\n  description: {}\n",
            analysis.sha,
            analysis.category.as_str(),
            analysis.impact.as_str(),
            analysis.breaking_change,
            analysis.user_facing,
            analysis.description,
        ));
    }

    prompt
}
