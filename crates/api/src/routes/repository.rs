//! Route definitions for the `/repositories` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::repository;
use crate::state::AppState;

/// Routes mounted at `/repositories`.
///
/// ```text
/// GET    /      -> list
/// POST   /      -> create
/// GET    /{id}  -> get_by_id
/// PUT    /{id}  -> update
/// DELETE /{id}  -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(repository::list).post(repository::create))
        .route(
            "/{id}",
            get(repository::get_by_id)
                .put(repository::update)
                .delete(repository::delete),
        )
}
