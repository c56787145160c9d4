mod config;
mod error;
mod extract;
mod inference;
mod models;
mod output;
mod pipeline;
mod prompt;
mod vision;

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Config;
use crate::inference::GitHubModelsClient;
use crate::pipeline::GenerationPipeline;
use crate::vision::StaticSketchDescriber;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(default_value = "contoso_layout_sketch.jpg", help = "Path to the website sketch image")]
    image: PathBuf,

    #[arg(long, default_value = ".", help = "Directory that receives index.html and styles.css")]
    output_dir: PathBuf,

    #[arg(long, help = "Model identifier, overrides GITHUB_MODELS_MODEL")]
    model: Option<String>,

    #[arg(long, help = "Inference endpoint base URL, overrides GITHUB_MODELS_ENDPOINT")]
    endpoint: Option<String>,
}

const EXIT_FATAL: u8 = 1;
const EXIT_PARTIAL: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    let args = Args::parse();

    let pipeline = match build_pipeline(args, Config::from_env()).await {
        Ok(pipeline) => pipeline,
        Err(e) => {
            tracing::error!("❌ Startup failed: {:#}", e);
            return ExitCode::from(EXIT_FATAL);
        }
    };

    match pipeline.generate().await {
        Ok(report) if report.has_failures() => {
            tracing::error!(html = ?report.html, css = ?report.css, "⚠️ Some files could not be written");
            ExitCode::from(EXIT_PARTIAL)
        }
        Ok(report) => {
            tracing::info!(model = %report.model, finished_at = %report.finished_at, "✅ Done");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("❌ The sample encountered an error: {}", e);
            ExitCode::from(EXIT_FATAL)
        }
    }
}

async fn build_pipeline(args: Args, mut config: Config) -> anyhow::Result<GenerationPipeline> {
    // no token, no side effects
    config.require_token()?;

    if let Some(model) = args.model {
        config.model = model;
    }
    if let Some(endpoint) = args.endpoint {
        config.endpoint = endpoint;
    }

    tokio::fs::create_dir_all(&args.output_dir)
        .await
        .with_context(|| format!("creating output directory {}", args.output_dir.display()))?;

    let client = GitHubModelsClient::new(config.endpoint.clone(), config.request_timeout)
        .context("building inference client")?;
    tracing::info!(endpoint = %config.endpoint, "Using inference endpoint");

    Ok(GenerationPipeline::new(
        config,
        Arc::new(client),
        Arc::new(StaticSketchDescriber),
        args.image,
        args.output_dir,
    ))
}
