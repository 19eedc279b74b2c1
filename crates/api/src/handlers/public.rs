//! Unauthenticated handlers for the public changelog site.
//!
//! Only `published` documents are visible here, addressed by the
//! repository's `owner/name` pair rather than internal ids.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;

use shipnotes_db::models::changelog::ChangelogWithContent;
use shipnotes_db::models::repository::Repository;
use shipnotes_db::repositories::{ChangelogRepo, RepositoryRepo};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /public/changelog/{owner}/{name}
///
/// Published document headers for a repository, newest first.
pub async fn list_published(
    State(state): State<AppState>,
    Path((owner, name)): Path<(String, String)>,
) -> AppResult<impl IntoResponse> {
    let repository = find_repository(&state, &owner, &name).await?;
    let changelogs = ChangelogRepo::list_published(&state.pool, repository.id).await?;
    Ok(Json(DataResponse { data: changelogs }))
}

/// GET /public/changelog/{owner}/{name}/{version}
///
/// One published document with full content.
pub async fn get_published_version(
    State(state): State<AppState>,
    Path((owner, name, version)): Path<(String, String, String)>,
) -> AppResult<impl IntoResponse> {
    let repository = find_repository(&state, &owner, &name).await?;

    let changelog = ChangelogRepo::find_published_version(&state.pool, repository.id, &version)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "No published changelog {version} for {owner}/{name}"
            ))
        })?;

    let sections = ChangelogRepo::load_content(&state.pool, &changelog).await?;
    Ok(Json(DataResponse {
        data: ChangelogWithContent { changelog, sections },
    }))
}

/// Resolve a tracked repository by owner/name or 404.
async fn find_repository(state: &AppState, owner: &str, name: &str) -> AppResult<Repository> {
    RepositoryRepo::find_by_owner_name(&state.pool, owner, name)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No changelog exists for {owner}/{name}")))
}
