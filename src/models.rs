use serde::{Serialize, Deserialize};
use chrono::{DateTime, Utc};
use std::path::PathBuf;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: "system".into(), content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user".into(), content: content.into() }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ChatCompletionRequest {
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub top_p: f32,
    pub max_tokens: u32,
    pub model: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub content: Option<String>, // null for tool-call-only replies
}

/// Status and body as received from the transport, before any shape checks.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedArtifacts {
    pub html: Option<String>,
    pub css: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ArtifactOutcome {
    Written(PathBuf),
    Skipped,
    Failed(String),
}

impl ArtifactOutcome {
    pub fn is_written(&self) -> bool {
        matches!(self, ArtifactOutcome::Written(_))
    }
}

#[derive(Debug, Clone)]
pub struct GenerationReport {
    pub model: String,
    pub html: ArtifactOutcome,
    pub css: ArtifactOutcome,
    pub finished_at: DateTime<Utc>,
}

impl GenerationReport {
    pub fn html_written(&self) -> bool { self.html.is_written() }

    pub fn css_written(&self) -> bool { self.css.is_written() }

    pub fn has_failures(&self) -> bool {
        matches!(self.html, ArtifactOutcome::Failed(_)) || matches!(self.css, ArtifactOutcome::Failed(_))
    }
}
