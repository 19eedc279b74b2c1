//! Converts a completed generation into a persisted changelog document.
//!
//! The mapping step is pure (`build_document`); persistence is a single
//! transaction in `ChangelogRepo::insert_document`, so a failed publish
//! leaves zero rows behind.

use shipnotes_core::changelog::{effective_impact, GeneratedChangelog};
use shipnotes_core::error::CoreError;
use shipnotes_core::types::DbId;
use shipnotes_db::models::changelog::{
    Changelog, NewChange, NewChangelogDocument, NewSection, PublishCustomizations,
};
use shipnotes_db::models::generation::Generation;
use shipnotes_db::models::status::GenerationStatus;
use shipnotes_db::repositories::{ChangelogRepo, GenerationRepo};
use shipnotes_db::DbPool;

use crate::error::PipelineError;

/// Create a changelog document from a completed generation.
///
/// Preconditions (checked before any write):
/// - the generation exists, otherwise `NotFound`;
/// - it is `completed` with content present, otherwise `Conflict`.
///
/// The created document is an independent copy with fresh ids; later
/// mutation or deletion of the generation does not affect it.
pub async fn create_changelog_from_generation(
    pool: &DbPool,
    generation_id: DbId,
    requester_id: DbId,
    customizations: &PublishCustomizations,
) -> Result<Changelog, PipelineError> {
    let generation = GenerationRepo::find_by_id(pool, generation_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Generation",
            id: generation_id,
        })?;

    if generation.status_id != GenerationStatus::Completed.id() {
        return Err(CoreError::Conflict(
            "Generation is not completed; nothing to publish yet".to_string(),
        )
        .into());
    }

    let content_value = generation.generated_content.clone().ok_or_else(|| {
        // Unreachable for rows written by this codebase (content is set
        // atomically with the completed flip), but never trust a row.
        CoreError::Internal("completed generation has no generated content".to_string())
    })?;

    let content: GeneratedChangelog = serde_json::from_value(content_value)
        .map_err(|e| CoreError::Internal(format!("stored generated content is invalid: {e}")))?;

    let document = build_document(&generation, &content, requester_id, customizations);

    let changelog = ChangelogRepo::insert_document(pool, &document).await?;

    tracing::info!(
        changelog_id = changelog.id,
        generation_id,
        sections = document.sections.len(),
        "Changelog document created from generation",
    );

    Ok(changelog)
}

/// Pure mapping from generated content to an insertable document.
///
/// Customization overrides win over generated values; each change's
/// persisted impact is the model's when present, the fixed category
/// mapping otherwise.
pub fn build_document(
    generation: &Generation,
    content: &GeneratedChangelog,
    requester_id: DbId,
    customizations: &PublishCustomizations,
) -> NewChangelogDocument {
    let sections = content
        .sections
        .iter()
        .map(|section| NewSection {
            title: section.title.clone(),
            changes: section
                .changes
                .iter()
                .map(|change| NewChange {
                    description: change.description.clone(),
                    category: change.category.as_str().to_string(),
                    impact: effective_impact(change).as_str().to_string(),
                    breaking_change: change.breaking_change,
                    commit_shas: change.commit_shas.clone(),
                })
                .collect(),
        })
        .collect();

    NewChangelogDocument {
        repository_id: generation.repository_id,
        version: content.version.clone(),
        title: customizations
            .title
            .clone()
            .unwrap_or_else(|| content.title.clone()),
        description: customizations
            .description
            .clone()
            .or_else(|| Some(content.summary.clone()).filter(|s| !s.is_empty())),
        branch: generation.branch.clone(),
        range_start: generation.range_start,
        range_end: generation.range_end,
        tags: customizations.tags.clone().unwrap_or_default(),
        ai_generation_id: Some(generation.id),
        created_by: requester_id,
        sections,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use shipnotes_core::analysis::{CommitCategory, Impact};
    use shipnotes_core::changelog::{GeneratedChange, GeneratedSection};

    fn generation() -> Generation {
        Generation {
            id: 7,
            repository_id: 3,
            branch: "main".into(),
            range_start: chrono::Utc::now(),
            range_end: chrono::Utc::now(),
            status_id: GenerationStatus::Completed.id(),
            progress: 100,
            options: json!({}),
            commit_analyses: json!([]),
            generated_content: None,
            ai_metadata: None,
            requested_by: 1,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    fn content() -> GeneratedChangelog {
        GeneratedChangelog {
            version: "1.4.0".into(),
            title: "January release".into(),
            summary: "Two fixes, one feature.".into(),
            sections: vec![
                GeneratedSection {
                    title: "Features".into(),
                    changes: vec![GeneratedChange {
                        description: "CSV export".into(),
                        category: CommitCategory::Feature,
                        impact: None,
                        breaking_change: false,
                        commit_shas: vec!["a".into()],
                    }],
                },
                GeneratedSection {
                    title: "Bug Fixes".into(),
                    changes: vec![
                        GeneratedChange {
                            description: "Fix crash".into(),
                            category: CommitCategory::Fix,
                            impact: Some(Impact::Patch),
                            breaking_change: false,
                            commit_shas: vec!["b".into()],
                        },
                        GeneratedChange {
                            description: "Fix leak".into(),
                            category: CommitCategory::Fix,
                            impact: None,
                            breaking_change: false,
                            commit_shas: vec![],
                        },
                    ],
                },
            ],
            metadata: Default::default(),
        }
    }

    #[test]
    fn document_maps_every_section_and_change() {
        let doc = build_document(
            &generation(),
            &content(),
            42,
            &PublishCustomizations::default(),
        );
        assert_eq!(doc.sections.len(), 2);
        assert_eq!(doc.sections[0].changes.len(), 1);
        assert_eq!(doc.sections[1].changes.len(), 2);
        assert_eq!(doc.version, "1.4.0");
        assert_eq!(doc.created_by, 42);
        assert_eq!(doc.ai_generation_id, Some(7));
    }

    #[test]
    fn missing_impact_falls_back_to_category_mapping() {
        let doc = build_document(
            &generation(),
            &content(),
            42,
            &PublishCustomizations::default(),
        );
        // Feature without explicit impact -> minor.
        assert_eq!(doc.sections[0].changes[0].impact, "minor");
        // Fix without explicit impact -> patch.
        assert_eq!(doc.sections[1].changes[1].impact, "patch");
    }

    #[test]
    fn customizations_override_generated_values() {
        let customizations = PublishCustomizations {
            title: Some("Custom title".into()),
            description: Some("Custom description".into()),
            tags: Some(vec!["release".into()]),
        };
        let doc = build_document(&generation(), &content(), 42, &customizations);
        assert_eq!(doc.title, "Custom title");
        assert_eq!(doc.description.as_deref(), Some("Custom description"));
        assert_eq!(doc.tags, vec!["release"]);
    }

    #[test]
    fn generated_summary_becomes_description_by_default() {
        let doc = build_document(
            &generation(),
            &content(),
            42,
            &PublishCustomizations::default(),
        );
        assert_eq!(doc.description.as_deref(), Some("Two fixes, one feature."));
    }
}
