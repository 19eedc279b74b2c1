//! HTTP client for an OpenAI-compatible chat-completions API.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use shipnotes_core::analysis::CommitAnalysis;
use shipnotes_core::clients::{ChangelogModel, ClientError, ModelCompletion};
use shipnotes_core::commit::Commit;
use shipnotes_core::options::GenerationOptions;

use crate::prompt;

/// Sampling temperature for both calls. Low, because the output is parsed
/// as data, not read as prose.
const TEMPERATURE: f32 = 0.2;

/// Client for a chat-completions endpoint.
///
/// Holds the base URL, API key, and model name; construct once at startup
/// and share via `Arc` as a [`ChangelogModel`].
pub struct LlmClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl LlmClient {
    /// Create a new client.
    ///
    /// * `base_url` - API root, e.g. `https://api.openai.com/v1` (no
    ///   trailing slash).
    /// * `api_key`  - bearer token for the API.
    /// * `model`    - model name submitted with every request.
    pub fn new(base_url: String, api_key: String, model: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model,
        }
    }

    /// Model name submitted with every request.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Submit one chat completion and return the raw text plus usage.
    async fn complete(&self, system: &str, user: &str) -> Result<ModelCompletion, ClientError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage { role: "system", content: system },
                ChatMessage { role: "user", content: user },
            ],
            temperature: TEMPERATURE,
        };

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ClientError::Connection(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Api {
                status: status.as_u16(),
                message: "chat completion request failed".to_string(),
            });
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;

        let text = body
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| {
                ClientError::InvalidResponse("completion contained no choices".to_string())
            })?;

        let usage = body.usage.unwrap_or_default();

        tracing::debug!(
            model = %body.model,
            prompt_tokens = usage.prompt_tokens,
            completion_tokens = usage.completion_tokens,
            "Model completion received",
        );

        Ok(ModelCompletion {
            text,
            model: body.model,
            prompt_tokens: usage.prompt_tokens,
            completion_tokens: usage.completion_tokens,
        })
    }
}

#[async_trait]
impl ChangelogModel for LlmClient {
    async fn categorize_commits(&self, commits: &[Commit]) -> Result<ModelCompletion, ClientError> {
        self.complete(
            prompt::CATEGORIZE_SYSTEM,
            &prompt::categorization_prompt(commits),
        )
        .await
    }

    async fn synthesize_changelog(
        &self,
        analyses: &[CommitAnalysis],
        options: &GenerationOptions,
        repository_name: &str,
    ) -> Result<ModelCompletion, ClientError> {
        self.complete(
            prompt::SYNTHESIZE_SYSTEM,
            &prompt::synthesis_prompt(analyses, options, repository_name),
        )
        .await
    }
}

// ---------------------------------------------------------------------------
// Wire DTOs
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    model: String,
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}

#[derive(Debug, Default, Deserialize)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}
