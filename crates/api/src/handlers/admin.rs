//! Handlers for admin-only user management.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use validator::Validate;

use shipnotes_core::error::CoreError;
use shipnotes_core::roles::{ROLE_ADMIN, ROLE_EDITOR, VALID_ROLES};
use shipnotes_db::models::user::CreateUser;
use shipnotes_db::repositories::UserRepo;

use crate::auth::password::hash_password;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Guard: the caller must hold the admin role.
fn require_admin(auth: &AuthUser) -> Result<(), AppError> {
    if auth.role == ROLE_ADMIN {
        Ok(())
    } else {
        Err(AppError::Core(CoreError::Forbidden(
            "This action requires the admin role".into(),
        )))
    }
}

/// POST /api/v1/admin/users
///
/// Create a user account. Role defaults to `editor` and must be one of
/// the known role names.
pub async fn create_user(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateUser>,
) -> AppResult<impl IntoResponse> {
    require_admin(&auth)?;
    input
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let role = input.role.as_deref().unwrap_or(ROLE_EDITOR);
    if !VALID_ROLES.contains(&role) {
        return Err(AppError::BadRequest(format!(
            "Invalid role '{role}'. Must be one of: {}",
            VALID_ROLES.join(", ")
        )));
    }

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        &state.pool,
        &input.username,
        &input.email,
        &password_hash,
        role,
    )
    .await?;

    tracing::info!(
        user_id = user.id,
        username = %user.username,
        role = %user.role,
        created_by = auth.user_id,
        "User created",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: user })))
}

/// GET /api/v1/admin/users
pub async fn list_users(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    require_admin(&auth)?;
    let users = UserRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: users }))
}
