//! HTTP client for listing repositories and commits.

use async_trait::async_trait;
use reqwest::StatusCode;

use shipnotes_core::clients::{ClientError, CommitSource};
use shipnotes_core::commit::Commit;
use shipnotes_core::types::Timestamp;

use crate::wire::RestCommit;

/// Page size for commit listing. GitHub caps `per_page` at 100.
const PER_PAGE: usize = 100;

/// Hard ceiling on pages fetched per range, to bound a single generation's
/// upstream load on pathological date ranges.
const MAX_PAGES: usize = 20;

/// Client for the GitHub REST API (v3).
///
/// Holds the base URL and token; construct once at startup and share via
/// `Arc` as a [`CommitSource`].
pub struct GithubClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl GithubClient {
    /// Create a new client.
    ///
    /// * `base_url` - API root, e.g. `https://api.github.com` (no trailing
    ///   slash). Overridable for GitHub Enterprise or test servers.
    /// * `token`    - personal access token with repo read scope.
    pub fn new(base_url: String, token: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    /// API root URL (e.g. `https://api.github.com`).
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.http
            .get(format!("{}{path}", self.base_url))
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", "shipnotes")
    }
}

#[async_trait]
impl CommitSource for GithubClient {
    async fn repository_exists(&self, owner: &str, name: &str) -> Result<bool, ClientError> {
        let response = self
            .get(&format!("/repos/{owner}/{name}"))
            .send()
            .await
            .map_err(|e| ClientError::Connection(e.to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(false),
            status if status.is_success() => Ok(true),
            status => Err(ClientError::Api {
                status: status.as_u16(),
                message: format!("repository lookup for {owner}/{name} failed"),
            }),
        }
    }

    async fn list_commits(
        &self,
        owner: &str,
        name: &str,
        branch: &str,
        since: Timestamp,
        until: Timestamp,
    ) -> Result<Vec<Commit>, ClientError> {
        let mut commits: Vec<Commit> = Vec::new();

        for page in 1..=MAX_PAGES {
            let response = self
                .get(&format!("/repos/{owner}/{name}/commits"))
                .query(&[
                    ("sha", branch.to_string()),
                    ("since", since.to_rfc3339()),
                    ("until", until.to_rfc3339()),
                    ("per_page", PER_PAGE.to_string()),
                    ("page", page.to_string()),
                ])
                .send()
                .await
                .map_err(|e| ClientError::Connection(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                return Err(ClientError::Api {
                    status: status.as_u16(),
                    message: format!("commit listing for {owner}/{name}@{branch} failed"),
                });
            }

            let page_commits: Vec<RestCommit> = response
                .json()
                .await
                .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;

            let page_len = page_commits.len();
            commits.extend(page_commits.into_iter().map(RestCommit::into_commit));

            if page_len < PER_PAGE {
                break;
            }
            if page == MAX_PAGES {
                tracing::warn!(
                    owner,
                    name,
                    branch,
                    max_pages = MAX_PAGES,
                    "Commit listing truncated at page ceiling",
                );
            }
        }

        // GitHub returns newest first; the pipeline wants oldest first.
        commits.reverse();

        tracing::debug!(
            owner,
            name,
            branch,
            count = commits.len(),
            "Fetched commits from GitHub",
        );

        Ok(commits)
    }
}
