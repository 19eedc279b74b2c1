//! Handlers for the `/changelogs` resource (internal dashboard CRUD).

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use shipnotes_core::error::CoreError;
use shipnotes_core::types::DbId;
use shipnotes_db::models::changelog::{ChangelogListQuery, SetChangelogStatus, UpdateChangelog};
use shipnotes_db::models::status::ChangelogStatus;
use shipnotes_db::repositories::ChangelogRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/changelogs
///
/// List document headers, newest first. Supports `repository_id`,
/// `status_id`, `limit`, and `offset` query parameters.
pub async fn list(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<ChangelogListQuery>,
) -> AppResult<impl IntoResponse> {
    let changelogs = ChangelogRepo::list(&state.pool, &params).await?;
    Ok(Json(DataResponse { data: changelogs }))
}

/// GET /api/v1/changelogs/{id}
///
/// Full document: header plus ordered sections and changes.
pub async fn get_by_id(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let document = ChangelogRepo::get_with_content(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Changelog",
            id,
        }))?;
    Ok(Json(DataResponse { data: document }))
}

/// PUT /api/v1/changelogs/{id}
pub async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateChangelog>,
) -> AppResult<impl IntoResponse> {
    auth.require_editor()?;
    let changelog = ChangelogRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Changelog",
            id,
        }))?;
    Ok(Json(DataResponse { data: changelog }))
}

/// POST /api/v1/changelogs/{id}/status
///
/// Move a document through the draft -> review -> published -> archived
/// workflow. Any transition between named statuses is allowed; the status
/// value itself is validated.
pub async fn set_status(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<SetChangelogStatus>,
) -> AppResult<impl IntoResponse> {
    auth.require_editor()?;

    let status = ChangelogStatus::parse(&input.status).ok_or_else(|| {
        AppError::BadRequest(format!(
            "'{}' is not a changelog status (draft, review, published, archived)",
            input.status
        ))
    })?;

    let changelog = ChangelogRepo::set_status(&state.pool, id, status)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Changelog",
            id,
        }))?;

    tracing::info!(
        changelog_id = id,
        status = status.name(),
        user_id = auth.user_id,
        "Changelog status changed",
    );

    Ok(Json(DataResponse { data: changelog }))
}

/// DELETE /api/v1/changelogs/{id}
///
/// Removes the document and, via cascade, its sections and changes.
/// Returns 204 on success.
pub async fn delete(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    auth.require_editor()?;
    let deleted = ChangelogRepo::delete(&state.pool, id).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Changelog",
            id,
        }));
    }
    tracing::info!(changelog_id = id, user_id = auth.user_id, "Changelog deleted");
    Ok(StatusCode::NO_CONTENT)
}
