//! Output generation: the Markdown report, its JSON sidecar and the index.
//!
//! # Submodules
//!
//! - [`markdown`]: renders the structured summary and articles into a report
//! - [`json`]: writes the same data as JSON for other tools
//! - [`indexes`]: keeps `reports.md` listing every generated report
//!
//! # Output Structure
//!
//! ```text
//! reports/
//! ├── openai_2025-05-06.md   # Report
//! ├── firm-x_2025-05-06.md
//! └── reports.md             # Index
//!
//! json_output_dir/
//! └── 2025-05-06/
//!     ├── openai.json
//!     └── firm-x.json
//! ```

pub mod indexes;
pub mod json;
pub mod markdown;
