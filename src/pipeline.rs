use chrono::Utc;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, error};

use crate::config::Config;
use crate::error::PipelineError;
use crate::extract::extract_artifacts;
use crate::inference::{truncate_for_log, ChatCompletionClient};
use crate::models::{ChatCompletionResponse, GenerationReport, RawResponse};
use crate::output::{persist_artifacts, CSS_FILE, HTML_FILE};
use crate::prompt::build_request;
use crate::vision::ImageDescriber;

pub struct GenerationPipeline {
    config: Config,
    client: Arc<dyn ChatCompletionClient>,
    describer: Arc<dyn ImageDescriber>,
    image_path: PathBuf,
    output_dir: PathBuf,
}

impl GenerationPipeline {
    pub fn new(
        config: Config,
        client: Arc<dyn ChatCompletionClient>,
        describer: Arc<dyn ImageDescriber>,
        image_path: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            config,
            client,
            describer,
            image_path: image_path.into(),
            output_dir: output_dir.into(),
        }
    }

    /// Runs the whole flow once: describe, prompt, call, extract, write.
    pub async fn generate(&self) -> Result<GenerationReport, PipelineError> {
        let token = self.config.require_token()?;
        info!("🔑 Using token: {}...", token.chars().take(4).collect::<String>());
        info!("🤖 Using model: {}", self.config.model);

        let description = self.describer
            .describe_image(&self.image_path)
            .await
            .map_err(|e| PipelineError::Description(e.to_string()))?;

        let request = build_request(&description, &self.config.model);

        info!("📤 Sending request with image description...");
        let response = self.client
            .post_chat_completion(token, &request)
            .await
            .map_err(|e| {
                log_remote_error(&e);
                e
            })?;

        if self.client.is_unexpected(&response) {
            let e = PipelineError::RemoteCall {
                status: Some(response.status),
                message: format!("API returned unexpected status: {}", response.status),
                body: Some(response.body),
            };
            log_remote_error(&e);
            return Err(e);
        }

        let content = first_completion_text(&response)?;
        info!("✅ Received completion ({} chars)", content.len());

        let artifacts = extract_artifacts(&content);
        let (html, css) = persist_artifacts(&self.output_dir, artifacts).await;

        let report = GenerationReport {
            model: self.config.model.clone(),
            html,
            css,
            finished_at: Utc::now(),
        };

        if report.html_written() || report.css_written() {
            info!("🎉 Successfully generated files!");
        }
        if report.html_written() { info!("📄 {}", HTML_FILE); }
        if report.css_written() { info!("🎨 {}", CSS_FILE); }

        Ok(report)
    }
}

fn log_remote_error(e: &PipelineError) {
    if let PipelineError::RemoteCall { status, message, body } = e {
        error!("❌ Error making API request:");
        error!("- Status: {}", status.map(|s| s.to_string()).unwrap_or_else(|| "N/A".into()));
        error!("- Message: {}", message);
        error!("- Response body: {}", body.as_deref().map(|b| truncate_for_log(b, 1000)).unwrap_or_else(|| "No response body".into()));
    }
}

/// Text of the first choice. Missing, empty or blank content is an error.
pub fn first_completion_text(response: &RawResponse) -> Result<String, PipelineError> {
    let parsed: ChatCompletionResponse = serde_json::from_str(&response.body)
        .map_err(|e| PipelineError::ResponseShape(format!("parse error: {}: {}", e, truncate_for_log(&response.body, 200))))?;

    let first = parsed.choices
        .into_iter()
        .next()
        .ok_or_else(|| PipelineError::ResponseShape("No choices returned in the response".into()))?;

    first.message
        .and_then(|m| m.content)
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| PipelineError::ResponseShape("first choice has no message content".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ChatCompletionRequest;
    use crate::vision::StaticSketchDescriber;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::path::Path;
    use std::time::Duration;

    struct MockChatClient {
        response: RawResponse,
        calls: Mutex<Vec<(String, ChatCompletionRequest)>>,
    }

    impl MockChatClient {
        fn replying(status: u16, body: serde_json::Value) -> Arc<Self> {
            Arc::new(Self {
                response: RawResponse { status, body: body.to_string() },
                calls: Mutex::new(Vec::new()),
            })
        }

        fn with_content(content: &str) -> Arc<Self> {
            Self::replying(200, json!({"choices": [{"message": {"role": "assistant", "content": content}}]}))
        }

        fn call_count(&self) -> usize {
            self.calls.lock().len()
        }
    }

    #[async_trait]
    impl ChatCompletionClient for MockChatClient {
        async fn post_chat_completion(
            &self,
            token: &str,
            request: &ChatCompletionRequest,
        ) -> Result<RawResponse, PipelineError> {
            self.calls.lock().push((token.to_string(), request.clone()));
            Ok(self.response.clone())
        }
    }

    struct UnreachableClient;

    #[async_trait]
    impl ChatCompletionClient for UnreachableClient {
        async fn post_chat_completion(
            &self,
            _token: &str,
            _request: &ChatCompletionRequest,
        ) -> Result<RawResponse, PipelineError> {
            Err(PipelineError::RemoteCall { status: None, message: "connection refused".into(), body: None })
        }
    }

    fn config(token: Option<&str>) -> Config {
        Config {
            token: token.map(str::to_string),
            endpoint: "http://localhost".into(),
            model: "meta/Meta-Llama-3-8B-Instruct".into(),
            request_timeout: Duration::from_secs(5),
        }
    }

    fn pipeline(client: Arc<dyn ChatCompletionClient>, token: Option<&str>, out: &Path) -> GenerationPipeline {
        GenerationPipeline::new(config(token), client, Arc::new(StaticSketchDescriber), "sketch.jpg", out)
    }

    fn read(dir: &Path, name: &str) -> String {
        std::fs::read_to_string(dir.join(name)).unwrap()
    }

    #[tokio::test]
    async fn missing_token_aborts_before_network() {
        let dir = tempfile::tempdir().unwrap();
        let client = MockChatClient::with_content("HTML:\n<p>x</p>");

        let err = pipeline(client.clone(), None, dir.path()).generate().await.unwrap_err();

        assert!(matches!(err, PipelineError::Configuration(_)));
        assert_eq!(client.call_count(), 0);
        assert!(!dir.path().join(HTML_FILE).exists());
    }

    #[tokio::test]
    async fn labeled_response_writes_both_files() {
        let dir = tempfile::tempdir().unwrap();
        let client = MockChatClient::with_content(
            "HTML:\n<!DOCTYPE html><html><body>Hi</body></html>\nCSS:\nbody{color:red;}",
        );

        let report = pipeline(client.clone(), Some("ghp_test"), dir.path()).generate().await.unwrap();

        assert!(report.html_written());
        assert!(report.css_written());
        assert!(!report.has_failures());
        assert_eq!(read(dir.path(), HTML_FILE), "<!DOCTYPE html>\n<html><body>Hi</body></html>");
        assert_eq!(read(dir.path(), CSS_FILE), "body{color:red;}");
    }

    #[tokio::test]
    async fn request_uses_token_and_configured_model() {
        let dir = tempfile::tempdir().unwrap();
        let client = MockChatClient::with_content("<html></html>");

        pipeline(client.clone(), Some("ghp_test"), dir.path()).generate().await.unwrap();

        let calls = client.calls.lock();
        assert_eq!(calls.len(), 1);
        let (token, request) = &calls[0];
        assert_eq!(token, "ghp_test");
        assert_eq!(request.model, "meta/Meta-Llama-3-8B-Instruct");
        assert!(request.messages[1].content.contains("three columns of feature cards"));
    }

    #[tokio::test]
    async fn empty_choices_is_a_shape_error() {
        let dir = tempfile::tempdir().unwrap();
        let client = MockChatClient::replying(200, json!({"choices": []}));

        let err = pipeline(client, Some("t"), dir.path()).generate().await.unwrap_err();

        assert!(matches!(err, PipelineError::ResponseShape(_)));
        assert!(!dir.path().join(HTML_FILE).exists());
        assert!(!dir.path().join(CSS_FILE).exists());
    }

    #[tokio::test]
    async fn blank_content_is_a_shape_error() {
        let dir = tempfile::tempdir().unwrap();
        let client = MockChatClient::with_content("   \n");

        let err = pipeline(client, Some("t"), dir.path()).generate().await.unwrap_err();

        assert!(matches!(err, PipelineError::ResponseShape(_)));
    }

    #[tokio::test]
    async fn unexpected_status_is_a_remote_error() {
        let dir = tempfile::tempdir().unwrap();
        let client = MockChatClient::replying(401, json!({"error": {"code": "unauthorized"}}));

        let err = pipeline(client, Some("t"), dir.path()).generate().await.unwrap_err();

        match err {
            PipelineError::RemoteCall { status, body, .. } => {
                assert_eq!(status, Some(401));
                assert!(body.unwrap().contains("unauthorized"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(!dir.path().join(HTML_FILE).exists());
    }

    #[tokio::test]
    async fn transport_failure_propagates() {
        let dir = tempfile::tempdir().unwrap();

        let err = pipeline(Arc::new(UnreachableClient), Some("t"), dir.path()).generate().await.unwrap_err();

        assert!(matches!(err, PipelineError::RemoteCall { status: None, .. }));
    }

    #[tokio::test]
    async fn prose_response_writes_html_only() {
        let dir = tempfile::tempdir().unwrap();
        let prose = "I cannot produce code for this request, but the layout has a header and footer.";
        let client = MockChatClient::with_content(prose);

        let report = pipeline(client, Some("t"), dir.path()).generate().await.unwrap();

        assert!(report.html_written());
        assert!(!report.css_written());
        assert_eq!(read(dir.path(), HTML_FILE), format!("<!DOCTYPE html>\n{prose}"));
        assert!(!dir.path().join(CSS_FILE).exists());
    }

    #[tokio::test]
    async fn rerun_produces_identical_files() {
        let dir = tempfile::tempdir().unwrap();
        let client = MockChatClient::with_content(
            "HTML:\n<main>Hi</main>\nCSS:\n<style>main{display:grid;}</style>",
        );
        let runner = pipeline(client, Some("t"), dir.path());

        runner.generate().await.unwrap();
        let first = (read(dir.path(), HTML_FILE), read(dir.path(), CSS_FILE));
        runner.generate().await.unwrap();
        let second = (read(dir.path(), HTML_FILE), read(dir.path(), CSS_FILE));

        assert_eq!(first, second);
        assert_eq!(first.1, "main{display:grid;}");
    }

    #[test]
    fn malformed_body_is_a_shape_error() {
        let raw = RawResponse { status: 200, body: "<html>gateway</html>".into() };
        assert!(matches!(first_completion_text(&raw), Err(PipelineError::ResponseShape(_))));
    }
}
