use std::path::{Path, PathBuf};
use tracing::{info, error};

use crate::error::PipelineError;
use crate::extract::strip_leading_doctype;
use crate::models::{ArtifactOutcome, ExtractedArtifacts};

pub const HTML_FILE: &str = "index.html";
pub const CSS_FILE: &str = "styles.css";

pub fn render_html(html: &str) -> String {
    format!("<!DOCTYPE html>\n{}", strip_leading_doctype(html))
}

/// Overwrites `dir/name` with `contents`.
pub async fn write_artifact(dir: &Path, name: &str, contents: &str) -> Result<PathBuf, PipelineError> {
    let path = dir.join(name);
    tokio::fs::write(&path, contents)
        .await
        .map_err(|source| PipelineError::FileWrite { path: path.clone(), source })?;
    info!("💾 Successfully saved {}", path.display());
    Ok(path)
}

async fn persist_one(dir: &Path, name: &str, contents: Option<String>) -> ArtifactOutcome {
    let Some(contents) = contents else {
        info!("⏭️ Nothing extracted for {}, skipping", name);
        return ArtifactOutcome::Skipped;
    };
    match write_artifact(dir, name, &contents).await {
        Ok(path) => ArtifactOutcome::Written(path),
        Err(e) => {
            error!("❌ Error saving {}: {}", name, e);
            ArtifactOutcome::Failed(e.to_string())
        }
    }
}

/// Writes each non-empty artifact. A failed write never stops the other one.
pub async fn persist_artifacts(dir: &Path, artifacts: ExtractedArtifacts) -> (ArtifactOutcome, ArtifactOutcome) {
    let html = persist_one(dir, HTML_FILE, artifacts.html.as_deref().map(render_html)).await;
    let css = persist_one(dir, CSS_FILE, artifacts.css).await;
    (html, css)
}
