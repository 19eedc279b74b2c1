//! Handlers for the `/repositories` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use validator::Validate;

use shipnotes_core::error::CoreError;
use shipnotes_core::types::DbId;
use shipnotes_db::models::repository::{CreateRepository, UpdateRepository};
use shipnotes_db::repositories::RepositoryRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/repositories
pub async fn list(_auth: AuthUser, State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let repositories = RepositoryRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: repositories }))
}

/// POST /api/v1/repositories
///
/// Register a repository for changelog tracking. The `owner/name` pair is
/// checked against the source-control host before the row is created so a
/// typo fails loudly here rather than on every later generation.
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateRepository>,
) -> AppResult<impl IntoResponse> {
    auth.require_editor()?;
    input
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let exists = state
        .commit_source
        .repository_exists(&input.owner, &input.name)
        .await
        .map_err(|e| AppError::InternalError(format!("Repository lookup failed: {e}")))?;
    if !exists {
        return Err(AppError::BadRequest(format!(
            "{}/{} was not found on the source-control host",
            input.owner, input.name
        )));
    }

    let repository = RepositoryRepo::create(&state.pool, &input).await?;

    tracing::info!(
        repository_id = repository.id,
        repository = %repository.full_name(),
        user_id = auth.user_id,
        "Repository registered",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: repository })))
}

/// GET /api/v1/repositories/{id}
pub async fn get_by_id(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let repository = RepositoryRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Repository",
            id,
        }))?;
    Ok(Json(DataResponse { data: repository }))
}

/// PUT /api/v1/repositories/{id}
pub async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateRepository>,
) -> AppResult<impl IntoResponse> {
    auth.require_editor()?;
    let repository = RepositoryRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Repository",
            id,
        }))?;
    Ok(Json(DataResponse { data: repository }))
}

/// DELETE /api/v1/repositories/{id}
///
/// Removes the repository and, via cascade, its generations and
/// changelogs. Returns 204 on success.
pub async fn delete(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    auth.require_editor()?;
    let deleted = RepositoryRepo::delete(&state.pool, id).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Repository",
            id,
        }));
    }
    tracing::info!(repository_id = id, user_id = auth.user_id, "Repository deleted");
    Ok(StatusCode::NO_CONTENT)
}
