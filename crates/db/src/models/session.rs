//! Refresh-token session model and DTOs.

use serde::Serialize;
use sqlx::FromRow;

use shipnotes_core::types::{DbId, Timestamp};

/// A session row from the `sessions` table. Only the SHA-256 hash of the
/// refresh token is stored; the plaintext never touches the database.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Session {
    pub id: DbId,
    pub user_id: DbId,
    #[serde(skip_serializing)]
    pub refresh_token_hash: String,
    pub expires_at: Timestamp,
    pub revoked_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// Input for creating a new session row.
#[derive(Debug, Clone)]
pub struct CreateSession {
    pub user_id: DbId,
    pub refresh_token_hash: String,
    pub expires_at: Timestamp,
}
