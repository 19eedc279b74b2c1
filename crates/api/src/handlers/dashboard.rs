//! Handlers for the internal dashboard summary widget.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use shipnotes_db::models::status::{ChangelogStatus, GenerationStatus, StatusId};
use shipnotes_db::repositories::{ChangelogRepo, GenerationRepo, RepositoryRepo};

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Counts per generation status.
#[derive(Debug, Default, Serialize)]
pub struct GenerationCounts {
    pub processing: i64,
    pub completed: i64,
    pub failed: i64,
}

/// Counts per changelog status.
#[derive(Debug, Default, Serialize)]
pub struct ChangelogCounts {
    pub draft: i64,
    pub review: i64,
    pub published: i64,
    pub archived: i64,
}

/// Response for `GET /dashboard/summary`.
#[derive(Debug, Serialize)]
pub struct DashboardSummary {
    pub repositories: usize,
    pub generations: GenerationCounts,
    pub changelogs: ChangelogCounts,
}

/// GET /api/v1/dashboard/summary
///
/// Aggregate counts for the internal dashboard landing page.
pub async fn summary(
    _auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let repositories = RepositoryRepo::list(&state.pool).await?.len();

    let mut generations = GenerationCounts::default();
    for (status_id, count) in GenerationRepo::count_by_status(&state.pool).await? {
        match status_id {
            id if id == StatusId::from(GenerationStatus::Processing) => {
                generations.processing = count
            }
            id if id == StatusId::from(GenerationStatus::Completed) => {
                generations.completed = count
            }
            id if id == StatusId::from(GenerationStatus::Failed) => generations.failed = count,
            _ => {}
        }
    }

    let mut changelogs = ChangelogCounts::default();
    for (status_id, count) in ChangelogRepo::count_by_status(&state.pool).await? {
        match status_id {
            id if id == StatusId::from(ChangelogStatus::Draft) => changelogs.draft = count,
            id if id == StatusId::from(ChangelogStatus::Review) => changelogs.review = count,
            id if id == StatusId::from(ChangelogStatus::Published) => changelogs.published = count,
            id if id == StatusId::from(ChangelogStatus::Archived) => changelogs.archived = count,
            _ => {}
        }
    }

    Ok(Json(DataResponse {
        data: DashboardSummary {
            repositories,
            generations,
            changelogs,
        },
    }))
}
