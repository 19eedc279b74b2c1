//! Route definitions for the public changelog site (no authentication).

use axum::routing::get;
use axum::Router;

use crate::handlers::public;
use crate::state::AppState;

/// Routes mounted at `/public/changelog`.
///
/// ```text
/// GET /{owner}/{name}            -> list_published
/// GET /{owner}/{name}/{version}  -> get_published_version
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{owner}/{name}", get(public::list_published))
        .route("/{owner}/{name}/{version}", get(public::get_published_version))
}
