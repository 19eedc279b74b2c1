//! Handlers for the `/generations` resource.
//!
//! Routes:
//! - `POST /generations`              — accept a generation request (202)
//! - `GET  /generations`              — list records
//! - `GET  /generations/{id}`         — poll one record
//! - `POST /generations/{id}/publish` — assemble a changelog document

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use shipnotes_core::error::CoreError;
use shipnotes_core::types::DbId;
use shipnotes_db::models::changelog::PublishCustomizations;
use shipnotes_db::models::generation::{GenerationListQuery, StartGeneration};
use shipnotes_db::repositories::GenerationRepo;
use shipnotes_pipeline::assembly::create_changelog_from_generation;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/generations
///
/// Validates the request synchronously, persists a `processing` record at
/// progress 0, and returns it with 202. The pipeline runs in the
/// background; poll `GET /generations/{id}` until the status leaves
/// `processing`. Background failures are visible only through that status.
pub async fn start(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<StartGeneration>,
) -> AppResult<impl IntoResponse> {
    auth.require_editor()?;

    let generation = state
        .orchestrator
        .start_generation(auth.user_id, &input)
        .await?;

    Ok((StatusCode::ACCEPTED, Json(DataResponse { data: generation })))
}

/// GET /api/v1/generations
///
/// List generation records, newest first. Supports `repository_id`,
/// `status_id`, `limit`, and `offset` query parameters.
pub async fn list(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<GenerationListQuery>,
) -> AppResult<impl IntoResponse> {
    let generations = GenerationRepo::list(&state.pool, &params).await?;
    Ok(Json(DataResponse { data: generations }))
}

/// GET /api/v1/generations/{id}
///
/// Snapshot of the current record state; never blocks on the pipeline.
pub async fn get_by_id(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let generation = state
        .orchestrator
        .get_generation(id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Generation",
            id,
        }))?;
    Ok(Json(DataResponse { data: generation }))
}

/// POST /api/v1/generations/{id}/publish
///
/// Assemble a changelog document from a completed generation. Returns 201
/// with the new document, 404 for unknown ids, 409 when the generation is
/// not completed. Nothing is written on failure.
pub async fn publish(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(customizations): Json<PublishCustomizations>,
) -> AppResult<impl IntoResponse> {
    auth.require_editor()?;

    let changelog =
        create_changelog_from_generation(&state.pool, id, auth.user_id, &customizations).await?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: changelog })))
}
