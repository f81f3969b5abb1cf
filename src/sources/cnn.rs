//! CNN search and article extraction.
//!
//! The search endpoint takes the page size directly, so the cap is passed as
//! `size`; the results page is then trimmed to its first ten headline
//! elements, keeping headlines longer than ten characters.

use super::{absolute_url, element_text, join_paragraphs, normalize_publish_date};
use crate::models::{ArticleBody, CandidateLink};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

const BASE_URL: &str = "https://edition.cnn.com";
const HEADLINE_SCAN: usize = 10;
const MIN_TITLE_CHARS: usize = 10;

static HEADLINE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("span[class*=\"headline\"], a[class*=\"headline\"]").unwrap());
static PARAGRAPH: Lazy<Selector> =
    Lazy::new(|| Selector::parse("p.paragraph-elevate.vossi-paragraph").unwrap());
static TIMESTAMP: Lazy<Selector> =
    Lazy::new(|| Selector::parse("span.timestamp__time-since[data-first-publish]").unwrap());

pub fn search_url(topic: &str, size: usize) -> String {
    format!(
        "{BASE_URL}/search?q={}&from=0&size={size}&page=1&sort=newest&types=article",
        urlencoding::encode(topic)
    )
}

pub fn parse_search_results(html: &str) -> Vec<CandidateLink> {
    let document = Html::parse_document(html);
    document
        .select(&HEADLINE)
        .take(HEADLINE_SCAN)
        .filter_map(|headline| {
            let title = element_text(headline);
            if title.chars().count() <= MIN_TITLE_CHARS {
                return None;
            }
            let url = enclosing_link(headline)
                .and_then(|a| a.value().attr("href"))
                .and_then(|href| absolute_url(BASE_URL, href))
                .unwrap_or_default();
            Some(CandidateLink { title, url })
        })
        .collect()
}

/// The nearest `<a>` strictly above `element`.
fn enclosing_link(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|a| a.value().name() == "a")
}

pub fn parse_article(html: &str) -> ArticleBody {
    let document = Html::parse_document(html);
    let content = join_paragraphs(document.select(&PARAGRAPH));
    let publish_date = document
        .select(&TIMESTAMP)
        .next()
        .and_then(|t| t.value().attr("data-first-publish"))
        .map(normalize_publish_date)
        .unwrap_or_default();
    ArticleBody {
        content,
        publish_date,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_url_encodes_topic_and_size() {
        assert_eq!(
            search_url("Open AI", 5),
            "https://edition.cnn.com/search?q=Open%20AI&from=0&size=5&page=1&sort=newest&types=article"
        );
    }

    #[test]
    fn test_parse_search_results_filters_short_titles() {
        let html = r#"
            <div class="container">
              <a href="/2025/11/03/tech/openai-deal/index.html">
                <span class="container__headline-text">OpenAI signs a cloud deal</span>
              </a>
              <a href="/short"><span class="container__headline-text">Short</span></a>
              <span class="container__headline-text">A headline without any link</span>
            </div>"#;
        let links = parse_search_results(html);
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].title, "OpenAI signs a cloud deal");
        assert_eq!(
            links[0].url,
            "https://edition.cnn.com/2025/11/03/tech/openai-deal/index.html"
        );
        assert_eq!(links[1].url, "");
    }

    #[test]
    fn test_parse_search_results_scans_only_first_ten() {
        let items: String = (0..15)
            .map(|i| format!(r#"<a href="/s/{i}"><span class="headline">Story number {i:02} today</span></a>"#))
            .collect();
        assert_eq!(parse_search_results(&items).len(), 10);
    }

    #[test]
    fn test_parse_article_extracts_body_and_date() {
        let html = r#"
            <span class="timestamp__time-since" data-first-publish="2025-11-03T14:05:00.000Z">2 hours ago</span>
            <p class="paragraph-elevate inline-placeholder vossi-paragraph">First paragraph.</p>
            <p class="other">Ad copy.</p>
            <p class="paragraph-elevate inline-placeholder vossi-paragraph"> Second paragraph. </p>"#;
        let body = parse_article(html);
        assert_eq!(body.content, "First paragraph. Second paragraph.");
        assert_eq!(body.publish_date, "2025-11-03");
    }

    #[test]
    fn test_parse_article_without_markup_is_empty() {
        let body = parse_article("<html><body><p>Cookie banner</p></body></html>");
        assert_eq!(body, ArticleBody::default());
    }
}
