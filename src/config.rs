use std::time::Duration;

use crate::error::PipelineError;

pub const TOKEN_VAR: &str = "GITHUB_TOKEN";
pub const DEFAULT_ENDPOINT: &str = "https://models.github.ai/inference";
pub const DEFAULT_MODEL: &str = "meta/Meta-Llama-3-8B-Instruct";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Settings read from the process environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub token: Option<String>,
    pub endpoint: String,
    pub model: String,
    pub request_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let timeout_secs = lookup("REQUEST_TIMEOUT_SECS")
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        Self {
            token: lookup(TOKEN_VAR).filter(|t| !t.trim().is_empty()),
            endpoint: lookup("GITHUB_MODELS_ENDPOINT")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            model: lookup("GITHUB_MODELS_MODEL")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            request_timeout: Duration::from_secs(timeout_secs),
        }
    }

    pub fn require_token(&self) -> Result<&str, PipelineError> {
        self.token.as_deref().ok_or_else(|| {
            PipelineError::Configuration(format!(
                "{TOKEN_VAR} environment variable is not set. Please set it with your GitHub Personal Access Token."
            ))
        })
    }
}
