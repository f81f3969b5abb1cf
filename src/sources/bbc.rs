//! BBC News search and article extraction.
//!
//! BBC class names are generated (`ssrcss-…`) and change between deploys;
//! the selectors below match the markup current when they were written.

use super::{absolute_url, element_text, join_paragraphs, normalize_publish_date};
use crate::models::{ArticleBody, CandidateLink};
use once_cell::sync::Lazy;
use scraper::{Html, Selector};

const BASE_URL: &str = "https://www.bbc.co.uk";

static LIST_ITEM: Lazy<Selector> = Lazy::new(|| Selector::parse("li").unwrap());
static PROMO_LINK: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a.ssrcss-163mj99-PromoLink[href]").unwrap());
static PROMO_HEADLINE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("p.ssrcss-1b1mki6-PromoHeadline").unwrap());
static PARAGRAPH: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("div[data-component=\"text-block\"] p.ssrcss-1q0x1qg-Paragraph").unwrap()
});
static TIMESTAMP: Lazy<Selector> =
    Lazy::new(|| Selector::parse("time[data-testid=\"timestamp\"][datetime]").unwrap());

pub fn search_url(topic: &str) -> String {
    format!("{BASE_URL}/search?q={}", urlencoding::encode(topic))
}

/// Walk the result list items, taking the promo link of each, until `limit`.
pub fn parse_search_results(html: &str, limit: usize) -> Vec<CandidateLink> {
    let document = Html::parse_document(html);
    document
        .select(&LIST_ITEM)
        .filter_map(|item| item.select(&PROMO_LINK).next())
        .filter_map(|link| {
            let url = absolute_url(BASE_URL, link.value().attr("href")?)?;
            let title = link
                .select(&PROMO_HEADLINE)
                .next()
                .map(element_text)
                .unwrap_or_default();
            Some(CandidateLink { title, url })
        })
        .take(limit)
        .collect()
}

pub fn parse_article(html: &str) -> ArticleBody {
    let document = Html::parse_document(html);
    ArticleBody {
        content: join_paragraphs(document.select(&PARAGRAPH)),
        publish_date: document
            .select(&TIMESTAMP)
            .next()
            .and_then(|t| t.value().attr("datetime"))
            .map(normalize_publish_date)
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search_results() {
        let html = r#"
            <ul>
              <li><a class="ssrcss-163mj99-PromoLink" href="https://www.bbc.co.uk/news/articles/c1">
                    <p class="ssrcss-1b1mki6-PromoHeadline"><span>Storm warning issued</span></p></a></li>
              <li><span>Navigation item</span></li>
              <li><a class="ssrcss-163mj99-PromoLink" href="/news/articles/c2"></a></li>
            </ul>"#;
        let links = parse_search_results(html, 100);
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].title, "Storm warning issued");
        assert_eq!(links[1].url, "https://www.bbc.co.uk/news/articles/c2");
        assert_eq!(links[1].title, "");
        assert_eq!(parse_search_results(html, 1).len(), 1);
    }

    #[test]
    fn test_parse_article() {
        let html = r#"
            <time data-testid="timestamp" datetime="2025-10-30T07:15:00.000Z">30 October</time>
            <div data-component="text-block"><p class="ssrcss-1q0x1qg-Paragraph">Heavy rain fell.</p></div>
            <div data-component="image-block"><p class="ssrcss-1q0x1qg-Paragraph">Caption</p></div>
            <div data-component="text-block"><p class="ssrcss-1q0x1qg-Paragraph">Roads closed.</p></div>"#;
        let body = parse_article(html);
        assert_eq!(body.content, "Heavy rain fell. Roads closed.");
        assert_eq!(body.publish_date, "2025-10-30");
    }
}
