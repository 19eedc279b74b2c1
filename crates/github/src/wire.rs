//! Wire DTOs for the subset of the GitHub REST API this client uses.

use serde::Deserialize;

use shipnotes_core::commit::Commit;
use shipnotes_core::types::Timestamp;

/// One element of `GET /repos/{owner}/{repo}/commits`.
#[derive(Debug, Deserialize)]
pub struct RestCommit {
    pub sha: String,
    pub commit: RestCommitDetail,
}

#[derive(Debug, Deserialize)]
pub struct RestCommitDetail {
    pub message: String,
    pub author: Option<RestCommitAuthor>,
}

#[derive(Debug, Deserialize)]
pub struct RestCommitAuthor {
    pub name: Option<String>,
    pub email: Option<String>,
    pub date: Option<Timestamp>,
}

impl RestCommit {
    /// Convert to the domain [`Commit`].
    ///
    /// GitHub occasionally omits author details (e.g. commits with unmapped
    /// authors); those fields fall back to empty-ish defaults rather than
    /// dropping the commit.
    pub fn into_commit(self) -> Commit {
        let author = self.commit.author;
        let (author_name, author_email, authored_at) = match author {
            Some(a) => (
                a.name.unwrap_or_else(|| "unknown".to_string()),
                a.email,
                a.date.unwrap_or_else(chrono::Utc::now),
            ),
            None => ("unknown".to_string(), None, chrono::Utc::now()),
        };
        Commit {
            sha: self.sha,
            message: self.commit.message,
            author_name,
            author_email,
            authored_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rest_commit_converts_with_full_author() {
        let raw = r#"{
            "sha": "abc",
            "commit": {
                "message": "feat: add thing",
                "author": { "name": "Ada", "email": "ada@example.com", "date": "2025-01-03T10:00:00Z" }
            }
        }"#;
        let rest: RestCommit = serde_json::from_str(raw).unwrap();
        let commit = rest.into_commit();
        assert_eq!(commit.sha, "abc");
        assert_eq!(commit.author_name, "Ada");
        assert_eq!(commit.author_email.as_deref(), Some("ada@example.com"));
    }

    #[test]
    fn rest_commit_tolerates_missing_author() {
        let raw = r#"{ "sha": "abc", "commit": { "message": "m" } }"#;
        let rest: RestCommit = serde_json::from_str(raw).unwrap();
        let commit = rest.into_commit();
        assert_eq!(commit.author_name, "unknown");
        assert!(commit.author_email.is_none());
    }
}
