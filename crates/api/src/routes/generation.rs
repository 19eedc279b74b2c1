//! Route definitions for the `/generations` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::generation;
use crate::state::AppState;

/// Routes mounted at `/generations`.
///
/// ```text
/// GET  /               -> list
/// POST /               -> start (202, fire-and-forget pipeline)
/// GET  /{id}           -> get_by_id (poll)
/// POST /{id}/publish   -> publish
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(generation::list).post(generation::start))
        .route("/{id}", get(generation::get_by_id))
        .route("/{id}/publish", post(generation::publish))
}
