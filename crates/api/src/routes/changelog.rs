//! Route definitions for the `/changelogs` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::changelog;
use crate::state::AppState;

/// Routes mounted at `/changelogs`.
///
/// ```text
/// GET    /              -> list
/// GET    /{id}          -> get_by_id (with sections and changes)
/// PUT    /{id}          -> update
/// DELETE /{id}          -> delete
/// POST   /{id}/status   -> set_status
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(changelog::list))
        .route(
            "/{id}",
            get(changelog::get_by_id)
                .put(changelog::update)
                .delete(changelog::delete),
        )
        .route("/{id}/status", post(changelog::set_status))
}
