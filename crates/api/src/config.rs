use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields except the secrets have sensible defaults suitable for
/// local development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// JWT token configuration (secret, expiry durations).
    pub jwt: JwtConfig,
    /// Source-control API root (default: `https://api.github.com`).
    pub github_base_url: String,
    /// Personal access token for the source-control API.
    pub github_token: String,
    /// Language-model API root (default: `https://api.openai.com/v1`).
    pub llm_base_url: String,
    /// API key for the language-model API.
    pub llm_api_key: String,
    /// Model name submitted with every completion request.
    pub llm_model: String,
    /// Deadline applied to each outbound pipeline call, in seconds
    /// (default: `120`).
    pub stage_deadline_secs: u64,
    /// Age in minutes after which a silent `processing` generation is
    /// swept to `failed`. `0` disables the watchdog (default: `30`).
    pub stale_generation_mins: i64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Required | Default                     |
    /// |-------------------------|----------|-----------------------------|
    /// | `HOST`                  | no       | `0.0.0.0`                   |
    /// | `PORT`                  | no       | `3000`                      |
    /// | `CORS_ORIGINS`          | no       | `http://localhost:5173`     |
    /// | `REQUEST_TIMEOUT_SECS`  | no       | `30`                        |
    /// | `GITHUB_BASE_URL`       | no       | `https://api.github.com`    |
    /// | `GITHUB_TOKEN`          | **yes**  | --                          |
    /// | `LLM_BASE_URL`          | no       | `https://api.openai.com/v1` |
    /// | `LLM_API_KEY`           | **yes**  | --                          |
    /// | `LLM_MODEL`             | no       | `gpt-4o-mini`               |
    /// | `STAGE_DEADLINE_SECS`   | no       | `120`                       |
    /// | `STALE_GENERATION_MINS` | no       | `30`                        |
    ///
    /// JWT settings are loaded by [`JwtConfig::from_env`].
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let github_base_url = std::env::var("GITHUB_BASE_URL")
            .unwrap_or_else(|_| "https://api.github.com".into());
        let github_token =
            std::env::var("GITHUB_TOKEN").expect("GITHUB_TOKEN must be set in the environment");

        let llm_base_url = std::env::var("LLM_BASE_URL")
            .unwrap_or_else(|_| "https://api.openai.com/v1".into());
        let llm_api_key =
            std::env::var("LLM_API_KEY").expect("LLM_API_KEY must be set in the environment");
        let llm_model = std::env::var("LLM_MODEL").unwrap_or_else(|_| "gpt-4o-mini".into());

        let stage_deadline_secs: u64 = std::env::var("STAGE_DEADLINE_SECS")
            .unwrap_or_else(|_| "120".into())
            .parse()
            .expect("STAGE_DEADLINE_SECS must be a valid u64");

        let stale_generation_mins: i64 = std::env::var("STALE_GENERATION_MINS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("STALE_GENERATION_MINS must be a valid i64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            jwt: JwtConfig::from_env(),
            github_base_url,
            github_token,
            llm_base_url,
            llm_api_key,
            llm_model,
            stage_deadline_secs,
            stale_generation_mins,
        }
    }
}
