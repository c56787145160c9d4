use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{info, error};
use uuid::Uuid;

use crate::error::PipelineError;
use crate::models::{ChatCompletionRequest, RawResponse};

const MAX_LOGGED_BODY: usize = 1000;

/// Narrow view of a chat-completions vendor.
#[async_trait]
pub trait ChatCompletionClient: Send + Sync {
    async fn post_chat_completion(
        &self,
        token: &str,
        request: &ChatCompletionRequest,
    ) -> Result<RawResponse, PipelineError>;

    /// True when the vendor considers the response an error.
    fn is_unexpected(&self, response: &RawResponse) -> bool {
        !(200..300).contains(&response.status)
    }
}

// Keeps log lines readable when the model returns a whole page of markup
pub fn truncate_for_log(text: &str, max: usize) -> String {
    if text.len() <= max {
        return text.to_string();
    }
    let mut cut = max;
    while !text.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}...[truncated {} chars]", &text[..cut], text[cut..].chars().count())
}

pub struct GitHubModelsClient {
    client: Client,
    base_url: String,
}

impl GitHubModelsClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, PipelineError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PipelineError::Configuration(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl ChatCompletionClient for GitHubModelsClient {
    async fn post_chat_completion(
        &self,
        token: &str,
        request: &ChatCompletionRequest,
    ) -> Result<RawResponse, PipelineError> {
        let url = self.completions_url();
        let request_id = Uuid::new_v4();

        info!(%request_id, "🔗 Making request to: {}", url);

        let response = self.client
            .post(&url)
            .bearer_auth(token)
            .header("x-ms-client-request-id", request_id.to_string())
            .json(request)
            .send()
            .await
            .map_err(|e| {
                error!(%request_id, "❌ Transport error: {}", e);
                PipelineError::RemoteCall {
                    status: e.status().map(|s| s.as_u16()),
                    message: e.to_string(),
                    body: None,
                }
            })?;

        let status = response.status();
        info!(%request_id, "📥 Received response status: {}", status);

        let body = response.text().await.map_err(|e| PipelineError::RemoteCall {
            status: Some(status.as_u16()),
            message: format!("failed to read response body: {e}"),
            body: None,
        })?;

        info!("📥 Raw response: {}", truncate_for_log(&body, MAX_LOGGED_BODY));

        Ok(RawResponse { status: status.as_u16(), body })
    }
}
