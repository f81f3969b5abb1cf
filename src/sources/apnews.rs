//! AP News search and article extraction.

use super::{absolute_url, element_text, join_paragraphs, normalize_publish_date};
use crate::models::{ArticleBody, CandidateLink};
use once_cell::sync::Lazy;
use scraper::{Html, Selector};

const BASE_URL: &str = "https://apnews.com";

static PROMO_TITLE: Lazy<Selector> = Lazy::new(|| Selector::parse("div.PagePromo-title").unwrap());
static LINK: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());
static PARAGRAPH: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.RichTextStoryBody p").unwrap());
static PUBLISHED: Lazy<Selector> =
    Lazy::new(|| Selector::parse("meta[property=\"article:published_time\"]").unwrap());

pub fn search_url(topic: &str) -> String {
    format!("{BASE_URL}/search?q={}", urlencoding::encode(topic))
}

/// One link per promo card, stopping once `limit` links are collected.
pub fn parse_search_results(html: &str, limit: usize) -> Vec<CandidateLink> {
    let document = Html::parse_document(html);
    document
        .select(&PROMO_TITLE)
        .filter_map(|card| card.select(&LINK).next())
        .filter_map(|a| {
            let url = absolute_url(BASE_URL, a.value().attr("href")?)?;
            Some(CandidateLink {
                title: element_text(a),
                url,
            })
        })
        .take(limit)
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
