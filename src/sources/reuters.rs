//! Reuters search and article extraction.
//!
//! The cap truncates the headline list before the short-title filter runs,
//! so a search can yield fewer than `limit` candidates.

use super::{absolute_url, element_text, join_paragraphs, normalize_publish_date};
use crate::models::{ArticleBody, CandidateLink};
use once_cell::sync::Lazy;
use scraper::{Html, Selector};

const BASE_URL: &str = "https://www.reuters.com";
const MIN_TITLE_CHARS: usize = 10;

static HEADLINE: Lazy<Selector> = Lazy::new(|| Selector::parse("h3.search-result-title").unwrap());
static LINK: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());
static PARAGRAPH: Lazy<Selector> =
    Lazy::new(|| Selector::parse("p.article-body__content__text").unwrap());
static PUBLISHED: Lazy<Selector> =
    Lazy::new(|| Selector::parse("meta[name=\"article:published_time\"]").unwrap());

pub fn search_url(topic: &str) -> String {
    format!("{BASE_URL}/site-search/?query={}", urlencoding::encode(topic))
}

pub fn parse_search_results(html: &str, limit: usize) -> Vec<CandidateLink> {
    let document = Html::parse_document(html);
    document
        .select(&HEADLINE)
        .take(limit)
        .filter_map(|h| h.select(&LINK).next())
        .filter_map(|a| {
            let title = element_text(a);
            if title.chars().count() <= MIN_TITLE_CHARS {
                return None;
            }
            let url = absolute_url(BASE_URL, a.value().attr("href")?)?;
            Some(CandidateLink { title, url })
        })
        .collect()
}

pub fn parse_article(html: &str) -> ArticleBody {
    let document = Html::parse_document(html);
    ArticleBody {
        content: join_paragraphs(document.select(&PARAGRAPH)),
        publish_date: document
            .select(&PUBLISHED)
            .next()
            .and_then(|m| m.value().attr("content"))
            .map(normalize_publish_date)
            .unwrap_or_default(),
    }
}
