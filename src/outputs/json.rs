//! JSON sidecar for a finished report.
//!
//! Files are grouped by run date:
//! ```text
//! json_output_dir/
//! └── 2025-05-06/
//!     ├── openai.json
//!     └── firm-x.json
//! ```

use crate::models::{ArticleRecord, StructuredSummary};
use serde::Serialize;
use std::error::Error;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, instrument};

/// What the sidecar holds: the query, the validated digest and the
/// consolidated articles with their merged provenance.
#[derive(Debug, Serialize)]
pub struct DigestExport<'a> {
    pub query: &'a str,
    pub generated_date: &'a str,
    pub report_path: &'a Path,
    pub summary: &'a StructuredSummary,
    pub articles: &'a [ArticleRecord],
}

/// Write `export` to `{json_output_dir}/{date}/{slug}.json` and return the path.
#[instrument(level = "info", skip_all, fields(json_output_dir = %json_output_dir.display(), %slug))]
pub async fn write_digest(
    export: &DigestExport<'_>,
    json_output_dir: &Path,
    slug: &str,
) -> Result<PathBuf, Box<dyn Error>> {
    let json = serde_json::to_string_pretty(export)?;

    let full_json_dir = json_output_dir.join(export.generated_date);
    info!(full_json_dir = %full_json_dir.display(), "Ensuring JSON directory exists");
    if let Err(e) = fs::create_dir_all(&full_json_dir).await {
        error!(full_json_dir = %full_json_dir.display(), error = %e, "Failed to create JSON dir");
        return Err(e.into());
    }

    let output_json_filename = full_json_dir.join(format!("{slug}.json"));
    fs::write(&output_json_filename, json).await?;
    info!(path = %output_json_filename.display(), "Wrote JSON sidecar");

    Ok(output_json_filename)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_digest_groups_by_date() {
        let dir = tempfile::tempdir().unwrap();
        let articles = vec![ArticleRecord::new("T", "https://a.example/1", "Body", "", "CNN")];
        let summary = StructuredSummary::sentinel();
        let export = DigestExport {
            query: "Firm X",
            generated_date: "2025-05-06",
            report_path: Path::new("reports/firm-x_2025-05-06.md"),
            summary: &summary,
            articles: &articles,
        };

        let path = write_digest(&export, dir.path(), "firm-x").await.unwrap();
        assert_eq!(path, dir.path().join("2025-05-06").join("firm-x.json"));

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["query"], "Firm X");
        assert_eq!(value["summary"]["timeline"], "na");
        assert_eq!(value["articles"][0]["urls"][0], "https://a.example/1");
        assert_eq!(value["report_path"], "reports/firm-x_2025-05-06.md");
    }
}
