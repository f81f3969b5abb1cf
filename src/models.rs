//! Data models flowing through the digest pipeline.
//!
//! - [`ArticleRecord`]: one fetched article, later a cluster representative
//! - [`CandidateLink`] / [`ArticleBody`]: the two halves an outlet returns
//! - [`StructuredSummary`]: the validated LLM digest, possibly sentinel-filled
//!
//! Summary field names are snake_case because that is the JSON shape the LLM
//! is prompted to produce.

use serde::{Deserialize, Serialize, Serializer};

/// Placeholder written into any summary field the LLM failed to provide.
pub const SENTINEL: &str = "na";

/// A single news article as collected from an outlet.
///
/// After consolidation a record may stand for a whole cluster of duplicate
/// stories: `urls` then lists every member URL (own URL first) and `source`
/// every contributing outlet label, joined with `", "`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ArticleRecord {
    /// Headline as listed by the outlet.
    pub title: String,
    /// URL of this particular fetched instance.
    pub url: String,
    /// Extracted body text. Empty means extraction failed.
    pub content: String,
    /// Publication date as `YYYY-MM-DD`, or empty when unknown.
    pub publish_date: String,
    /// Outlet label, or a comma-joined list of labels after merging.
    pub source: String,
    /// Every URL judged to be the same story, in discovery order.
    pub urls: Vec<String>,
}

impl ArticleRecord {
    pub fn new(
        title: impl Into<String>,
        url: impl Into<String>,
        content: impl Into<String>,
        publish_date: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        let url = url.into();
        Self {
            title: title.into(),
            urls: vec![url.clone()],
            url,
            content: content.into(),
            publish_date: publish_date.into(),
            source: source.into(),
        }
    }

    /// Text the similarity engine compares: title and body.
    pub fn similarity_text(&self) -> String {
        format!("{} {}", self.title, self.content)
    }

    pub fn has_content(&self) -> bool {
        !self.content.is_empty()
    }
}

/// A search hit from an outlet, before its body has been fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateLink {
    pub title: String,
    pub url: String,
}

/// Body text and publish date extracted from one article page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleBody {
    pub content: String,
    pub publish_date: String,
}

/// A summary field that is either a real value or the `"na"` sentinel.
///
/// The sentinel always serializes as the bare string `"na"`, even for fields
/// whose real shape is an object or a list.
#[derive(Debug, Clone, PartialEq)]
pub enum Field<T> {
    Value(T),
    Sentinel,
}

impl<T> Field<T> {
    pub fn value(&self) -> Option<&T> {
        match self {
            Field::Value(v) => Some(v),
            Field::Sentinel => None,
        }
    }

    pub fn is_sentinel(&self) -> bool {
        matches!(self, Field::Sentinel)
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Field<U> {
        match self {
            Field::Value(v) => Field::Value(f(v)),
            Field::Sentinel => Field::Sentinel,
        }
    }
}

impl<T: Serialize> Serialize for Field<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Field::Value(v) => v.serialize(serializer),
            Field::Sentinel => serializer.serialize_str(SENTINEL),
        }
    }
}

/// Named entities grouped by kind. Missing groups decode as empty lists.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Entities {
    #[serde(default)]
    pub organizations: Vec<String>,
    #[serde(default)]
    pub people: Vec<String>,
    #[serde(default)]
    pub locations: Vec<String>,
    #[serde(default)]
    pub key_terms: Vec<String>,
}

/// One milestone on the story timeline.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct TimelineEvent {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub event: String,
    #[serde(default)]
    pub description: String,
}

/// The structured digest of a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructuredSummary {
    pub topic: Field<String>,
    pub entities: Field<Entities>,
    pub summary: Field<String>,
    pub timeline: Field<Vec<TimelineEvent>>,
}

impl StructuredSummary {
    /// Every field set to the sentinel.
    pub fn sentinel() -> Self {
        Self {
            topic: Field::Sentinel,
            entities: Field::Sentinel,
            summary: Field::Sentinel,
            timeline: Field::Sentinel,
        }
    }

    pub fn is_sentinel(&self) -> bool {
        self.topic.is_sentinel()
            && self.entities.is_sentinel()
            && self.summary.is_sentinel()
            && self.timeline.is_sentinel()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_seeds_urls_with_own_url() {
        let article = ArticleRecord::new(
            "Title",
            "https://example.com/a",
            "Body",
            "2025-05-06",
            "CNN",
        );
        assert_eq!(article.urls, vec!["https://example.com/a".to_string()]);
        assert!(article.has_content());
    }

    #[test]
    fn test_similarity_text_joins_title_and_content() {
        let article = ArticleRecord::new("Rates rise", "u", "The bank moved.", "", "S1");
        assert_eq!(article.similarity_text(), "Rates rise The bank moved.");
    }

    #[test]
    fn test_empty_content_is_not_content() {
        let article = ArticleRecord::new("Title", "u", "", "", "S1");
        assert!(!article.has_content());
    }

    #[test]
    fn test_sentinel_summary_serializes_every_field_as_na() {
        let json = serde_json::to_value(StructuredSummary::sentinel()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "topic": "na",
                "entities": "na",
                "summary": "na",
                "timeline": "na"
            })
        );
    }

    #[test]
    fn test_field_value_serializes_inner_shape() {
        let summary = StructuredSummary {
            topic: Field::Value("Firm X funding".to_string()),
            entities: Field::Value(Entities {
                organizations: vec!["Firm X".to_string()],
                ..Default::default()
            }),
            summary: Field::Value("Raised money.".to_string()),
            timeline: Field::Sentinel,
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["entities"]["organizations"][0], "Firm X");
        assert_eq!(json["entities"]["people"], serde_json::json!([]));
        assert_eq!(json["timeline"], "na");
        assert!(!summary.is_sentinel());
    }

    #[test]
    fn test_timeline_event_tolerates_missing_keys() {
        let event: TimelineEvent = serde_json::from_str(r#"{"date": "2024-01-15"}"#).unwrap();
        assert_eq!(event.date, "2024-01-15");
        assert_eq!(event.event, "");
    }
}
