//! Error type for the synchronous pipeline contracts.
//!
//! Background stage failures never surface through this type: they are
//! captured inside the spawned task and reflected only in the record's
//! status (see `orchestrator`).

use shipnotes_core::error::CoreError;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// A domain-level error (validation, not-found, precondition).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}
