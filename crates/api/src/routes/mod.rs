pub mod admin;
pub mod auth;
pub mod changelog;
pub mod dashboard;
pub mod generation;
pub mod health;
pub mod public;
pub mod repository;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                              login (public)
/// /auth/refresh                            refresh (public)
/// /auth/logout                             logout (requires auth)
///
/// /admin/users                             list, create (admin only)
///
/// /repositories                            list, create
/// /repositories/{id}                       get, update, delete
///
/// /generations                             list, start (202)
/// /generations/{id}                        poll snapshot
/// /generations/{id}/publish                assemble changelog document
///
/// /changelogs                              list
/// /changelogs/{id}                         get (with content), update, delete
/// /changelogs/{id}/status                  workflow transition (POST)
///
/// /dashboard/summary                       aggregate counts (GET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Authentication routes (login, refresh, logout).
        .nest("/auth", auth::router())
        // Admin user management.
        .nest("/admin", admin::router())
        // Tracked repository management.
        .nest("/repositories", repository::router())
        // Generation lifecycle: start, poll, publish.
        .nest("/generations", generation::router())
        // Changelog document CRUD and workflow.
        .nest("/changelogs", changelog::router())
        // Internal dashboard widgets.
        .nest("/dashboard", dashboard::router())
}

/// Build the unauthenticated public site route tree.
///
/// ```text
/// /public/changelog/{owner}/{name}            published headers
/// /public/changelog/{owner}/{name}/{version}  one published document
/// ```
pub fn public_routes() -> Router<AppState> {
    Router::new().nest("/public/changelog", public::router())
}
