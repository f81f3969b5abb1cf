//! The `reports.md` index kept next to generated reports.
//!
//! ```text
//! # Topic Reports
//!
//! - **2025-05-06**
//!     - [OpenAI](./openai_2025-05-06.md)
//!     - [Firm X](./firm-x_2025-05-06.md)
//! ```
//!
//! Newer dates are inserted at the top; rerunning a topic on the same day
//! does not add a second entry.

use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

const INDEX_FILE: &str = "reports.md";
const INDEX_HEADER: &str = "# Topic Reports";

/// Add `report_filename` under `date` in `{report_dir}/reports.md`.
#[instrument(level = "info", skip_all, fields(report_dir = %report_dir.display(), %date, file = %report_filename))]
pub async fn update_reports_index(
    report_dir: &Path,
    date: &str,
    topic: &str,
    report_filename: &str,
) -> Result<(), Box<dyn Error>> {
    let index_path = report_dir.join(INDEX_FILE);
    let content = if fs::try_exists(&index_path).await? {
        fs::read_to_string(&index_path).await?
    } else {
        format!("{INDEX_HEADER}\n")
    };

    let updated = insert_entry(&content, date, topic, report_filename);
    fs::write(&index_path, updated).await?;
    info!(path = %index_path.display(), "Updated reports index");
    Ok(())
}

fn insert_entry(content: &str, date: &str, topic: &str, report_filename: &str) -> String {
    let date_heading = format!("- **{}**", date);
    let entry = format!("    - [{}](./{})", topic, report_filename);
    let entry_suffix = format!("](./{})", report_filename);

    let mut lines: Vec<String> = content.lines().map(|l| l.to_string()).collect();

    if let Some(i) = lines.iter().position(|l| l.trim() == date_heading) {
        let mut j = i + 1;
        while j < lines.len() && lines[j].starts_with("    - ") {
            if lines[j].trim_end().ends_with(&entry_suffix) {
                return lines.join("\n") + "\n";
            }
            j += 1;
        }
        lines.insert(j, entry);
    } else if let Some(pos) = lines.iter().position(|l| l.starts_with(INDEX_HEADER)) {
        let insert_at = pos + 1;
        lines.insert(insert_at, String::new());
        lines.insert(insert_at + 1, date_heading);
        lines.insert(insert_at + 2, entry);
    } else {
        lines.push(date_heading);
        lines.push(entry);
    }

    // Collapse the blank lines the header insertion can stack up.
    lines.dedup_by(|a, b| a.is_empty() && b.is_empty());
    lines.join("\n") + "\n"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_entry_into_new_index() {
        let out = insert_entry("# Topic Reports\n", "2025-05-06", "OpenAI", "openai_2025-05-06.md");
        assert_eq!(
            out,
            "# Topic Reports\n\n- **2025-05-06**\n    - [OpenAI](./openai_2025-05-06.md)\n"
        );
    }

    #[test]
    fn test_insert_entry_appends_under_existing_date() {
        let first = insert_entry("# Topic Reports\n", "2025-05-06", "OpenAI", "openai_2025-05-06.md");
        let second = insert_entry(&first, "2025-05-06", "Firm X", "firm-x_2025-05-06.md");
        assert_eq!(
            second,
            "# Topic Reports\n\n- **2025-05-06**\n    - [OpenAI](./openai_2025-05-06.md)\n    - [Firm X](./firm-x_2025-05-06.md)\n"
        );
    }

    #[test]
    fn test_insert_entry_puts_new_dates_first() {
        let first = insert_entry("# Topic Reports\n", "2025-05-06", "OpenAI", "openai_2025-05-06.md");
        let second = insert_entry(&first, "2025-05-07", "OpenAI", "openai_2025-05-07.md");
        let lines: Vec<&str> = second.lines().collect();
        assert_eq!(lines[2], "- **2025-05-07**");
        assert_eq!(lines[5], "- **2025-05-06**");
    }

    #[test]
    fn test_insert_entry_is_idempotent() {
        let first = insert_entry("# Topic Reports\n", "2025-05-06", "OpenAI", "openai_2025-05-06.md");
        let again = insert_entry(&first, "2025-05-06", "OpenAI", "openai_2025-05-06.md");
        assert_eq!(first, again);
    }

    #[tokio::test]
    async fn test_update_reports_index_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        update_reports_index(dir.path(), "2025-05-06", "OpenAI", "openai_2025-05-06.md")
            .await
            .unwrap();
        update_reports_index(dir.path(), "2025-05-06", "Firm X", "firm-x_2025-05-06.md")
            .await
            .unwrap();
        let content = std::fs::read_to_string(dir.path().join("reports.md")).unwrap();
        assert!(content.starts_with("# Topic Reports\n\n- **2025-05-06**\n"));
        assert_eq!(content.matches("    - [").count(), 2);
    }
}
