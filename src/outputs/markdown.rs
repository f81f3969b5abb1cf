//! Markdown report rendering.
//!
//! The report is a fixed template with `{{placeholder}}` slots:
//!
//! | Placeholder | Filled with |
//! |-------------|-------------|
//! | `{{topic}}` | summary topic |
//! | `{{generated_date}}` | local date and time of the run |
//! | `{{article_count}}` | number of consolidated articles |
//! | `{{summary}}` | narrative summary |
//! | `{{entities}}` | one bullet per entity group |
//! | `{{timeline}}` | one bullet per timeline event |
//! | `{{articles}}` | one section per article with merged sources and URLs |
//!
//! Sentinel fields render as `na`.

use crate::models::{ArticleRecord, Entities, Field, SENTINEL, StructuredSummary, TimelineEvent};
use crate::pipeline::Renderer;
use chrono::Local;
use itertools::Itertools;
use std::error::Error;
use std::fmt::Write;
use std::path::Path;
use tracing::{debug, info, instrument};

const BUILTIN_TEMPLATE: &str = include_str!("../../templates/report.md");

#[derive(Debug, Clone)]
pub struct MarkdownRenderer {
    template: String,
    generated_date: String,
}

impl MarkdownRenderer {
    /// Renderer using the bundled `templates/report.md`.
    pub fn builtin() -> Self {
        Self::with_template(BUILTIN_TEMPLATE)
    }

    pub fn with_template(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            generated_date: Local::now().format("%Y-%m-%d %H:%M").to_string(),
        }
    }

    /// Load a custom template from disk.
    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub async fn from_file(path: &Path) -> Result<Self, Box<dyn Error>> {
        let template = tokio::fs::read_to_string(path).await?;
        info!(bytes = template.len(), "Loaded report template");
        Ok(Self::with_template(template))
    }

    /// Pin the generation timestamp shown in the report.
    pub fn generated_on(mut self, generated_date: impl Into<String>) -> Self {
        self.generated_date = generated_date.into();
        self
    }
}

impl Renderer for MarkdownRenderer {
    fn render(
        &self,
        summary: &StructuredSummary,
        articles: &[ArticleRecord],
    ) -> Result<String, Box<dyn Error>> {
        let slots = [
            ("{{topic}}", text_or_na(&summary.topic)),
            ("{{generated_date}}", self.generated_date.clone()),
            ("{{article_count}}", articles.len().to_string()),
            ("{{summary}}", text_or_na(&summary.summary)),
            ("{{entities}}", entities_md(&summary.entities)?),
            ("{{timeline}}", timeline_md(&summary.timeline)?),
            ("{{articles}}", articles_md(articles)?),
        ];

        let mut out = self.template.clone();
        for (placeholder, value) in slots {
            out = out.replace(placeholder, &value);
        }
        debug!(bytes = out.len(), "Rendered Markdown report");
        Ok(out)
    }
}

fn text_or_na(field: &Field<String>) -> String {
    match field {
        Field::Value(s) if !s.trim().is_empty() => s.trim().to_string(),
        _ => SENTINEL.to_string(),
    }
}

fn entities_md(entities: &Field<Entities>) -> Result<String, std::fmt::Error> {
    let Field::Value(e) = entities else {
        return Ok(SENTINEL.to_string());
    };
    let mut md = String::new();
    for (label, names) in [
        ("Organizations", &e.organizations),
        ("People", &e.people),
        ("Locations", &e.locations),
        ("Key terms", &e.key_terms),
    ] {
        let joined = if names.is_empty() {
            "none".to_string()
        } else {
            names.iter().join(", ")
        };
        writeln!(md, "- **{}**: {}", label, joined)?;
    }
    Ok(md.trim_end().to_string())
}

fn timeline_md(timeline: &Field<Vec<TimelineEvent>>) -> Result<String, std::fmt::Error> {
    let events = match timeline {
        Field::Value(events) if !events.is_empty() => events,
        Field::Value(_) => return Ok("No dated events.".to_string()),
        Field::Sentinel => return Ok(SENTINEL.to_string()),
    };
    let mut md = String::new();
    for event in events {
        write!(md, "- **{}**: {}", event.date, event.event)?;
        if !event.description.is_empty() {
            write!(md, ". {}", event.description)?;
        }
        writeln!(md)?;
    }
    Ok(md.trim_end().to_string())
}

fn articles_md(articles: &[ArticleRecord]) -> Result<String, std::fmt::Error> {
    let mut md = String::new();
    for (i, article) in articles.iter().enumerate() {
        writeln!(md, "### {}. [{}]({})\n", i + 1, article.title, article.url)?;
        let date = if article.publish_date.is_empty() {
            "date unknown"
        } else {
            article.publish_date.as_str()
        };
        writeln!(md, "*{}* · {}\n", article.source, date)?;
        if article.urls.len() > 1 {
            writeln!(md, "Also reported at:\n")?;
            for url in article.urls.iter().skip(1) {
                writeln!(md, "- <{}>", url)?;
            }
            writeln!(md)?;
        }
    }
    Ok(md.trim_end().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn merged_article() -> ArticleRecord {
        let mut a = ArticleRecord::new(
            "Firm X raises funding",
            "https://s1.example/firm-x",
            "Firm X raised $10M.",
            "2025-05-06",
            "S1, S2",
        );
        a.urls.push("https://s2.example/firm-x".to_string());
        a
    }

    fn full_summary() -> StructuredSummary {
        StructuredSummary {
            topic: Field::Value("Firm X funding".to_string()),
            entities: Field::Value(Entities {
                organizations: vec!["Firm X".to_string(), "Acme Ventures".to_string()],
                people: vec![],
                locations: vec!["Berlin".to_string()],
                key_terms: vec!["Series A".to_string()],
            }),
            summary: Field::Value("Firm X raised $10M.".to_string()),
            timeline: Field::Value(vec![TimelineEvent {
                date: "2025-05-01".to_string(),
                event: "Round closes".to_string(),
                description: "Investors commit.".to_string(),
            }]),
        }
    }

    #[test]
    fn test_builtin_template_renders_every_section() {
        let renderer = MarkdownRenderer::builtin().generated_on("2025-05-06 09:00");
        let md = renderer.render(&full_summary(), &[merged_article()]).unwrap();

        assert!(md.starts_with("# Firm X funding\n"));
        assert!(md.contains("*Generated 2025-05-06 09:00 from 1 consolidated articles.*"));
        assert!(md.contains("- **Organizations**: Firm X, Acme Ventures"));
        assert!(md.contains("- **People**: none"));
        assert!(md.contains("- **2025-05-01**: Round closes. Investors commit."));
        assert!(md.contains("### 1. [Firm X raises funding](https://s1.example/firm-x)"));
        assert!(md.contains("*S1, S2* · 2025-05-06"));
        assert!(md.contains("- <https://s2.example/firm-x>"));
        assert!(!md.contains("{{"));
    }

    #[test]
    fn test_sentinel_summary_renders_na() {
        let renderer = MarkdownRenderer::builtin().generated_on("2025-05-06 09:00");
        let md = renderer
            .render(&StructuredSummary::sentinel(), &[merged_article()])
            .unwrap();
        assert!(md.starts_with("# na\n"));
        assert!(md.contains("## Summary\n\nna\n"));
        assert!(md.contains("## Key Entities\n\nna\n"));
        assert!(md.contains("## Timeline\n\nna\n"));
    }

    #[test]
    fn test_custom_template() {
        let renderer = MarkdownRenderer::with_template("{{topic}} / {{article_count}}");
        let md = renderer.render(&full_summary(), &[]).unwrap();
        assert_eq!(md, "Firm X funding / 0");
    }

    #[test]
    fn test_single_source_article_has_no_also_reported_block() {
        let article = ArticleRecord::new("Rain", "https://s1.example/rain", "Rain.", "", "S1");
        let md = articles_md(&[article]).unwrap();
        assert!(md.contains("*S1* · date unknown"));
        assert!(!md.contains("Also reported at"));
    }

    #[tokio::test]
    async fn test_from_file_loads_template() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.md");
        std::fs::write(&path, "Topic: {{topic}}").unwrap();
        let renderer = MarkdownRenderer::from_file(&path).await.unwrap();
        let md = renderer.render(&full_summary(), &[]).unwrap();
        assert_eq!(md, "Topic: Firm X funding");
    }
}
