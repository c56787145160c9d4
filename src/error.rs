use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("remote call failed (status={}): {message}", .status.map(|s| s.to_string()).unwrap_or_else(|| "N/A".into()))]
    RemoteCall {
        status: Option<u16>,
        message: String,
        body: Option<String>,
    },

    #[error("image description failed: {0}")]
    Description(String),

    #[error("unexpected response shape: {0}")]
    ResponseShape(String),

    #[error("failed to write {}: {source}", .path.display())]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
