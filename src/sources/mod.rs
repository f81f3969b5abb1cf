//! News outlets that can be searched for a topic.
//!
//! Each outlet module is split the same way: a `search_url` builder, a pure
//! `parse_search_results` over the search page HTML and a pure
//! `parse_article` over an article page. [`OutletSource`] wires those to a
//! shared `reqwest` client and implements [`ArticleSource`].
//!
//! | Outlet | Module | Default cap | Delay | Cap semantics |
//! |--------|--------|-------------|-------|---------------|
//! | CNN | [`cnn`] | 5 | 3 s | search `size = cap`, first 10 headlines, titles > 10 chars |
//! | AP News | [`apnews`] | 100 | 2 s | stop at cap |
//! | BBC News | [`bbc`] | 100 | 3 s | stop at cap |
//! | Reuters | [`reuters`] | 5 | 3 s | first `cap` headlines, titles > 10 chars |

pub mod apnews;
pub mod bbc;
pub mod cnn;
pub mod reuters;

use crate::config::SourceConfig;
use crate::error::ConfigError;
use crate::models::{ArticleBody, CandidateLink};
use crate::pipeline::ArticleSource;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use reqwest::Client;
use scraper::ElementRef;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/140.0.0.0 Safari/537.36";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outlet {
    Cnn,
    ApNews,
    BbcNews,
    Reuters,
}

impl Outlet {
    /// Label stamped on every record from this outlet.
    pub fn label(self) -> &'static str {
        match self {
            Outlet::Cnn => "CNN",
            Outlet::ApNews => "AP News",
            Outlet::BbcNews => "BBC News",
            Outlet::Reuters => "Reuters",
        }
    }

    pub fn default_max_articles(self) -> usize {
        match self {
            Outlet::Cnn | Outlet::Reuters => 5,
            Outlet::ApNews | Outlet::BbcNews => 100,
        }
    }

    pub fn default_fetch_delay(self) -> Duration {
        match self {
            Outlet::ApNews => Duration::from_secs(2),
            Outlet::Cnn | Outlet::BbcNews | Outlet::Reuters => Duration::from_secs(3),
        }
    }
}

impl fmt::Display for Outlet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Outlet {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect();
        match key.as_str() {
            "cnn" => Ok(Outlet::Cnn),
            "ap" | "apnews" => Ok(Outlet::ApNews),
            "bbc" | "bbcnews" => Ok(Outlet::BbcNews),
            "reuters" => Ok(Outlet::Reuters),
            _ => Err(ConfigError::UnknownOutlet(s.to_string())),
        }
    }
}

/// Build the HTTP client shared by every outlet.
pub fn build_client(timeout: Duration) -> reqwest::Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
}

/// An [`Outlet`] fetched over HTTP.
#[derive(Debug, Clone)]
pub struct OutletSource {
    outlet: Outlet,
    client: Client,
    max_articles: usize,
    fetch_delay: Duration,
}

impl OutletSource {
    pub fn new(config: &SourceConfig, client: Client) -> Self {
        Self {
            outlet: config.outlet,
            client,
            max_articles: config.max_articles(),
            fetch_delay: config.fetch_delay(),
        }
    }

    #[instrument(level = "debug", skip(self))]
    async fn get_html(&self, url: &str) -> Result<String, Box<dyn Error>> {
        let html = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        debug!(bytes = html.len(), "Downloaded page");
        Ok(html)
    }
}

impl ArticleSource for OutletSource {
    fn label(&self) -> &str {
        self.outlet.label()
    }

    fn max_articles(&self) -> usize {
        self.max_articles
    }

    fn fetch_delay(&self) -> Duration {
        self.fetch_delay
    }

    #[instrument(level = "info", skip(self), fields(outlet = %self.outlet))]
    async fn list_candidates(
        &self,
        topic: &str,
        limit: usize,
    ) -> Result<Vec<CandidateLink>, Box<dyn Error>> {
        let url = match self.outlet {
            Outlet::Cnn => cnn::search_url(topic, limit),
            Outlet::ApNews => apnews::search_url(topic),
            Outlet::BbcNews => bbc::search_url(topic),
            Outlet::Reuters => reuters::search_url(topic),
        };
        let html = self.get_html(&url).await?;
        Ok(match self.outlet {
            Outlet::Cnn => cnn::parse_search_results(&html),
            Outlet::ApNews => apnews::parse_search_results(&html, limit),
            Outlet::BbcNews => bbc::parse_search_results(&html, limit),
            Outlet::Reuters => reuters::parse_search_results(&html, limit),
        })
    }

    #[instrument(level = "info", skip(self), fields(outlet = %self.outlet))]
    async fn fetch_body(&self, url: &str) -> Result<ArticleBody, Box<dyn Error>> {
        let html = self.get_html(url).await?;
        let body = match self.outlet {
            Outlet::Cnn => cnn::parse_article(&html),
            Outlet::ApNews => apnews::parse_article(&html),
            Outlet::BbcNews => bbc::parse_article(&html),
            Outlet::Reuters => reuters::parse_article(&html),
        };
        debug!(bytes = body.content.len(), date = %body.publish_date, "Parsed article");
        Ok(body)
    }
}

/// Normalize an ISO-8601 timestamp to `YYYY-MM-DD`. Anything unparseable
/// becomes an empty string.
pub fn normalize_publish_date(raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return String::new();
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.format("%Y-%m-%d").to_string();
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return dt.format("%Y-%m-%d").to_string();
    }
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return d.format("%Y-%m-%d").to_string();
    }
    debug!(raw, "Unrecognized publish timestamp");
    String::new()
}

/// Text of an element with each text node trimmed, joined by single spaces.
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Resolve a possibly relative `href` against an outlet's base URL.
pub(crate) fn absolute_url(base: &str, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    Url::parse(base)
        .and_then(|b| b.join(href))
        .ok()
        .map(|u| u.to_string())
}

/// Join the text of every matched paragraph into one body string.
pub(crate) fn join_paragraphs<'a>(paragraphs: impl Iterator<Item = ElementRef<'a>>) -> String {
    paragraphs
        .map(element_text)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
