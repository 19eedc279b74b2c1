//! Raw commit data as returned by the source-control client.

use serde::{Deserialize, Serialize};

use crate::types::Timestamp;

/// A single commit fetched from the source-control host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Commit {
    /// Full commit SHA.
    pub sha: String,
    /// Full commit message (subject + body).
    pub message: String,
    /// Author display name.
    pub author_name: String,
    /// Author email, when the host exposes one.
    pub author_email: Option<String>,
    /// Author timestamp (UTC).
    pub authored_at: Timestamp,
}

impl Commit {
    /// First line of the commit message.
    pub fn subject(&self) -> &str {
        self.message.lines().next().unwrap_or("")
    }
}
