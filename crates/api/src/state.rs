use std::sync::Arc;

use shipnotes_core::clients::CommitSource;
use shipnotes_pipeline::GenerationOrchestrator;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: shipnotes_db::DbPool,
    /// Server configuration (accessed by middleware and handlers).
    pub config: Arc<ServerConfig>,
    /// Drives changelog generations; holds the injected clients.
    pub orchestrator: Arc<GenerationOrchestrator>,
    /// Source-control client, used directly for repository validation.
    pub commit_source: Arc<dyn CommitSource>,
}
