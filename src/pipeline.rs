//! The collection pipeline: fetch → consolidate → summarize → render → persist.
//!
//! Everything outside the consolidation core sits behind a capability trait:
//!
//! - [`ArticleSource`]: one outlet, listing candidates and fetching bodies
//! - [`Summarizer`]: turns the consolidated set into raw summary text
//! - [`Renderer`]: turns a validated summary plus articles into a document
//!
//! Sources are queried strictly one after another, in the order given, and
//! each article body is fetched one at a time with the source's politeness
//! delay in between. Consolidation is order-sensitive, so that order is part
//! of the output contract.

use crate::consolidate::consolidate;
use crate::error::PipelineError;
use crate::models::{ArticleBody, ArticleRecord, CandidateLink, StructuredSummary};
use crate::summary::validate_summary;
use futures::stream::{self, StreamExt};
use std::error::Error;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{debug, error, info, instrument, warn};

/// One news outlet.
pub trait ArticleSource {
    /// Label written into each record's `source`, e.g. `"CNN"`.
    fn label(&self) -> &str;

    /// How many articles to ask this source for.
    fn max_articles(&self) -> usize;

    /// Pause between two consecutive body fetches.
    fn fetch_delay(&self) -> Duration;

    /// Search the outlet for `topic`. Each outlet applies `limit` its own way.
    async fn list_candidates(
        &self,
        topic: &str,
        limit: usize,
    ) -> Result<Vec<CandidateLink>, Box<dyn Error>>;

    /// Extract body text and publish date. Empty content means extraction failed.
    async fn fetch_body(&self, url: &str) -> Result<ArticleBody, Box<dyn Error>>;
}

/// Produces the raw (unvalidated) structured summary text.
pub trait Summarizer {
    async fn summarize(
        &self,
        topic: &str,
        articles: &[ArticleRecord],
    ) -> Result<String, Box<dyn Error>>;
}

/// Renders the final document.
pub trait Renderer {
    fn render(
        &self,
        summary: &StructuredSummary,
        articles: &[ArticleRecord],
    ) -> Result<String, Box<dyn Error>>;
}

/// What a finished run produced.
#[derive(Debug)]
pub enum RunOutcome {
    /// The report was written.
    Written(RunReport),
    /// No source returned any usable article; nothing was summarized or written.
    NoContent,
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub path: PathBuf,
    pub summary: StructuredSummary,
    pub articles: Vec<ArticleRecord>,
}

pub struct Pipeline<S, Z, R> {
    sources: Vec<S>,
    summarizer: Z,
    renderer: R,
}

impl<S, Z, R> Pipeline<S, Z, R>
where
    S: ArticleSource,
    Z: Summarizer,
    R: Renderer,
{
    pub fn new(sources: Vec<S>, summarizer: Z, renderer: R) -> Self {
        Self {
            sources,
            summarizer,
            renderer,
        }
    }

    /// Run the whole pipeline for `topic` and write the report to `output`.
    ///
    /// Only a failure to render or persist the report is an error; every
    /// other problem is logged and recovered from.
    #[instrument(level = "info", skip(self, output), fields(output = %output.display()))]
    pub async fn run(&self, topic: &str, output: &Path) -> Result<RunOutcome, PipelineError> {
        let t0 = Instant::now();

        let collected = self.collect(topic).await;
        if collected.is_empty() {
            warn!(topic, "No content found from any source");
            return Ok(RunOutcome::NoContent);
        }

        let articles = consolidate(collected);

        let summary = match self.summarizer.summarize(topic, &articles).await {
            Ok(raw) => validate_summary(&raw),
            Err(e) => {
                error!(error = %e, "Summarizer failed; using sentinel summary");
                StructuredSummary::sentinel()
            }
        };

        let document = self
            .renderer
            .render(&summary, &articles)
            .map_err(|e| PipelineError::Render(e.to_string()))?;

        tokio::fs::write(output, document)
            .await
            .map_err(|source| PipelineError::Persist {
                path: output.to_path_buf(),
                source,
            })?;

        info!(
            path = %output.display(),
            articles = articles.len(),
            elapsed_ms = t0.elapsed().as_millis() as u128,
            "Wrote report"
        );

        Ok(RunOutcome::Written(RunReport {
            path: output.to_path_buf(),
            summary,
            articles,
        }))
    }

    /// Query every source in order and concatenate their usable articles.
    pub async fn collect(&self, topic: &str) -> Vec<ArticleRecord> {
        let mut all = Vec::new();
        for source in &self.sources {
            let records = collect_from_source(source, topic).await;
            if records.is_empty() {
                warn!(source = source.label(), "Source returned no articles; skipping");
            } else {
                info!(source = source.label(), count = records.len(), "Collected articles");
            }
            all.extend(records);
        }
        info!(count = all.len(), "Total articles collected");
        all
    }
}

/// List one source's candidates, then fetch each body in turn.
#[instrument(level = "info", skip_all, fields(source = source.label()))]
async fn collect_from_source<S: ArticleSource>(source: &S, topic: &str) -> Vec<ArticleRecord> {
    let candidates = match source.list_candidates(topic, source.max_articles()).await {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "Listing failed; source unavailable");
            return Vec::new();
        }
    };
    info!(count = candidates.len(), "Found candidate articles");

    let delay = source.fetch_delay();
    stream::iter(candidates.into_iter().enumerate())
        .then(|(i, candidate)| async move {
            if i > 0 && !delay.is_zero() {
                sleep(delay).await;
            }
            match source.fetch_body(&candidate.url).await {
                Ok(body) if !body.content.is_empty() => {
                    debug!(url = %candidate.url, bytes = body.content.len(), "Fetched article");
                    Some(ArticleRecord::new(
                        candidate.title,
                        candidate.url,
                        body.content,
                        body.publish_date,
                        source.label(),
                    ))
                }
                Ok(_) => {
                    warn!(url = %candidate.url, "Article body could not be extracted; dropping");
                    None
                }
                Err(e) => {
                    warn!(url = %candidate.url, error = %e, "Article fetch failed; dropping");
                    None
                }
            }
        })
        .filter_map(std::future::ready)
        .collect()
        .await
}
