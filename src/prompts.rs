//! Prompt text for the topic digest.

use crate::models::ArticleRecord;
use serde::Serialize;

const DIGEST_PROMPT: &str = r#"You are a news analyst. Read the articles below, all collected for the same news topic, and extract structured information from them.

## Topic
{topic}

## Articles (JSON)
{articles}

## Instructions

1. topic: a precise name for the core event, 3 to 5 words in English.
2. entities: four lists of names taken from the articles.
   - organizations: companies, agencies, institutions, with their full names
   - people: named individuals, including officials and experts
   - locations: countries, cities and other named places
   - key_terms: 5 to 8 representative terms, policies or products
3. summary: 150 to 250 words. Open with an overview, list the major developments as a numbered list with concrete facts and figures, and close with the likely impact.
4. timeline: 4 to 6 milestone events in chronological order, each with a date (YYYY-MM-DD), a short event title and a one-sentence description.

Use only information from the articles. Stay neutral. Return empty lists for entity groups with nothing to report.

## Output
Reply with a single JSON object and nothing else:

{
  "topic": "...",
  "entities": {
    "organizations": ["..."],
    "people": ["..."],
    "locations": ["..."],
    "key_terms": ["..."]
  },
  "summary": "...",
  "timeline": [
    {"date": "YYYY-MM-DD", "event": "...", "description": "..."}
  ]
}
"#;

/// The slice of an article the model gets to see.
#[derive(Serialize)]
struct PromptArticle<'a> {
    title: &'a str,
    source: &'a str,
    publish_date: &'a str,
    urls: &'a [String],
    content: &'a str,
}

/// Build the digest prompt for `topic` over the consolidated `articles`.
pub fn digest_prompt(
    topic: &str,
    articles: &[ArticleRecord],
) -> Result<String, serde_json::Error> {
    let listed: Vec<PromptArticle<'_>> = articles
        .iter()
        .map(|a| PromptArticle {
            title: &a.title,
            source: &a.source,
            publish_date: &a.publish_date,
            urls: &a.urls,
            content: &a.content,
        })
        .collect();
    let articles_json = serde_json::to_string_pretty(&listed)?;
    Ok(DIGEST_PROMPT
        .replace("{topic}", topic)
        .replace("{articles}", &articles_json))
}
