//! Analyze command - one-shot analysis of a local log file

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use tracing::info;

use crate::api::types::AnalyzeLogsResponse;
use crate::config::AppConfig;
use crate::domain::InputFormat;
use crate::infrastructure::logging::init_logging;

#[derive(Args, Clone, Debug)]
pub struct AnalyzeArgs {
    /// JSON or JSONL log file
    #[arg(long)]
    pub file: PathBuf,

    /// Incident description to rank the logs against
    #[arg(long)]
    pub prompt: String,

    /// Input layout: auto, json or jsonl
    #[arg(long, default_value = "auto")]
    pub format: InputFormat,
}

/// Print the analysis report as pretty JSON on stdout
pub async fn run(args: AnalyzeArgs) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;
    init_logging(&config.logging);

    let prompt = args.prompt.trim();
    if prompt.is_empty() {
        anyhow::bail!("Prompt cannot be empty");
    }

    let content = tokio::fs::read(&args.file)
        .await
        .with_context(|| format!("Failed to read {}", args.file.display()))?;
    info!(file = %args.file.display(), bytes = content.len(), "Analyzing log file");

    let service = crate::create_analysis_service(&config)?;
    let result = service.analyze(&content, prompt, args.format).await?;

    let report = serde_json::to_string_pretty(&AnalyzeLogsResponse::from(result))?;
    println!("{}", report);

    Ok(())
}
