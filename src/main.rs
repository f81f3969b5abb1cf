//! # Topic News Digest
//!
//! Collects news articles about one topic from several outlets, merges
//! duplicate stories across outlets, asks an LLM for a structured digest
//! (entities, narrative summary, timeline) and writes a Markdown report.
//!
//! ## Usage
//!
//! ```sh
//! topic_news_digest "OpenAI" -o reports/openai.md
//! ```
//!
//! ## Architecture
//!
//! 1. **Collection**: each outlet is searched in a fixed order and every hit
//!    fetched one at a time, with a politeness delay between fetches
//! 2. **Consolidation**: TF-IDF cosine similarity groups near-duplicate
//!    stories; each group keeps its first article and merges the others'
//!    URLs and source labels into it
//! 3. **Summary**: one LLM call over the consolidated set, validated against
//!    the expected JSON shape (missing fields become `"na"`)
//! 4. **Output**: Markdown report, optional JSON sidecar, `reports.md` index

use awful_aj::config::load_config;
use awful_aj::{config_dir, template};
use chrono::Local;
use clap::Parser;
use std::error::Error;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod api;
mod cli;
mod config;
mod consolidate;
mod error;
mod models;
mod outputs;
mod pipeline;
mod prompts;
mod similarity;
mod sources;
mod summary;
mod utils;

use api::LlmSummarizer;
use cli::Cli;
use config::DigestConfig;
use models::SENTINEL;
use outputs::json::DigestExport;
use outputs::markdown::MarkdownRenderer;
use outputs::{indexes, json};
use pipeline::{Pipeline, RunOutcome};
use sources::{OutletSource, build_client};
use utils::{default_report_path, ensure_writable_dir, slugify};

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("topic_news_digest starting up");

    // Parse CLI
    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    // ---- Pipeline config ----
    let mut digest_config = match &args.digest_config {
        Some(path) => DigestConfig::load(path).await?,
        None => DigestConfig::default(),
    };
    if let Some(outlets) = &args.sources {
        digest_config = digest_config.with_outlets(outlets);
    }
    if let Some(max) = args.max_articles {
        digest_config = digest_config.with_max_articles(max);
    }
    let order: Vec<&str> = digest_config
        .sources
        .iter()
        .map(|s| s.outlet.label())
        .collect();
    info!(?order, "Source order");

    // ---- Output location, checked before any network work ----
    let run_date = Local::now().date_naive().to_string();
    let output_path = args
        .output
        .clone()
        .unwrap_or_else(|| default_report_path(&args.topic, &run_date));
    let report_dir = match output_path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    if let Err(e) = ensure_writable_dir(&report_dir).await {
        error!(
            path = %report_dir.display(),
            error = %e,
            "Report directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    // ---- Load LLM template & config ----
    let template = template::load_template(&args.template).await?;
    info!(template = %args.template, "Loaded template");
    let conf_file = match &args.config {
        Some(path) => path.clone(),
        None => config_dir()?.join("config.yaml"),
    };
    let config_path = conf_file.to_string_lossy();
    let llm_config = load_config(&config_path)?;
    info!(%config_path, "Loaded configuration");

    // ---- Collaborators ----
    let client = build_client(digest_config.request_timeout())?;
    let outlets: Vec<OutletSource> = digest_config
        .sources
        .iter()
        .map(|s| OutletSource::new(s, client.clone()))
        .collect();
    let summarizer = LlmSummarizer::new(llm_config, template, digest_config.llm_max_retries);
    let renderer = match &args.report_template {
        Some(path) => MarkdownRenderer::from_file(path).await?,
        None => MarkdownRenderer::builtin(),
    };

    // ---- Run ----
    let pipeline = Pipeline::new(outlets, summarizer, renderer);
    let report = match pipeline.run(&args.topic, &output_path).await? {
        RunOutcome::NoContent => {
            warn!(topic = %args.topic, "No content found; no report written");
            return Ok(());
        }
        RunOutcome::Written(report) => report,
    };

    // ---- JSON sidecar ----
    if let Some(json_dir) = &args.json_output_dir {
        let export = DigestExport {
            query: &args.topic,
            generated_date: &run_date,
            report_path: &report.path,
            summary: &report.summary,
            articles: &report.articles,
        };
        if let Err(e) = json::write_digest(&export, json_dir, &slugify(&args.topic)).await {
            error!(error = %e, "Failed to write JSON sidecar");
        }
    }

    // ---- Index update ----
    let report_filename = file_name(&report.path);
    if let Err(e) =
        indexes::update_reports_index(&report_dir, &run_date, &args.topic, &report_filename).await
    {
        error!(error = %e, "Failed to update reports.md index");
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        articles = report.articles.len(),
        digest_topic = report.summary.topic.value().map(String::as_str).unwrap_or(SENTINEL),
        path = %report.path.display(),
        "Execution complete"
    );

    Ok(())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
