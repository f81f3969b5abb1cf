//! Command-line interface definitions.
//!
//! Every option can also come from an environment variable.

use crate::sources::Outlet;
use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for a digest run.
///
/// # Examples
///
/// ```sh
/// # Default sources (CNN, then AP News), report under ./reports
/// topic_news_digest "OpenAI"
///
/// # Explicit output, all four outlets, three articles each
/// topic_news_digest "OpenAI" -o openai.md --sources cnn,ap_news,bbc_news,reuters --max-articles 3
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Topic to search every outlet for
    pub topic: String,

    /// Where to write the Markdown report (default: reports/<topic>_<date>.md)
    #[arg(short, long, env = "DIGEST_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Optional path to the awful_aj config.yaml holding the LLM endpoint
    #[arg(short, long, env = "DIGEST_LLM_CONFIG")]
    pub config: Option<PathBuf>,

    /// Optional path to the pipeline YAML (sources, caps, delays, retries)
    #[arg(long, env = "DIGEST_CONFIG")]
    pub digest_config: Option<PathBuf>,

    /// awful_aj chat template used for the digest request
    #[arg(long, env = "DIGEST_TEMPLATE", default_value = "news_digest")]
    pub template: String,

    /// Custom Markdown report template
    #[arg(long, env = "DIGEST_REPORT_TEMPLATE")]
    pub report_template: Option<PathBuf>,

    /// Comma-separated outlet order, overriding the configured sources
    #[arg(long, env = "DIGEST_SOURCES", value_delimiter = ',')]
    pub sources: Option<Vec<Outlet>>,

    /// Article cap applied to every source
    #[arg(long, env = "DIGEST_MAX_ARTICLES")]
    pub max_articles: Option<usize>,

    /// Optional directory for a JSON copy of the digest
    #[arg(short, long, env = "DIGEST_JSON_OUTPUT_DIR")]
    pub json_output_dir: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from(["topic_news_digest", "OpenAI"]);

        assert_eq!(cli.topic, "OpenAI");
        assert_eq!(cli.template, "news_digest");
        assert!(cli.output.is_none());
        assert!(cli.sources.is_none());
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from([
            "topic_news_digest",
            "Firm X",
            "-o",
            "/tmp/firm-x.md",
            "-j",
            "/tmp/json",
        ]);

        assert_eq!(cli.output, Some(PathBuf::from("/tmp/firm-x.md")));
        assert_eq!(cli.json_output_dir, Some(PathBuf::from("/tmp/json")));
    }

    #[test]
    fn test_cli_source_list() {
        let cli = Cli::parse_from([
            "topic_news_digest",
            "OpenAI",
            "--sources",
            "reuters,cnn",
            "--max-articles",
            "3",
        ]);

        assert_eq!(cli.sources, Some(vec![Outlet::Reuters, Outlet::Cnn]));
        assert_eq!(cli.max_articles, Some(3));
    }

    #[test]
    fn test_cli_rejects_unknown_outlet() {
        assert!(Cli::try_parse_from(["topic_news_digest", "OpenAI", "--sources", "fox"]).is_err());
    }
}
