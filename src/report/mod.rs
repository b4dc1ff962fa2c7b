//! @ai:module:intent Report generation for session results
//! @ai:module:layer infrastructure
//! @ai:module:public_api ReportGenerator, JsonReporter, MarkdownReporter

pub mod json_report;
pub mod markdown_report;

pub use json_report::{JsonReporter, JsonReporterTrait};
pub use markdown_report::{MarkdownReporter, MarkdownReporterTrait};

use crate::error::Result;
use crate::metrics::SessionResults;
use std::path::{Path, PathBuf};

/// @ai:intent Combined report generator
pub struct ReportGenerator {
    json: JsonReporter,
    markdown: MarkdownReporter,
}

impl ReportGenerator {
    /// @ai:intent Create a new report generator
    /// @ai:effects pure
    pub fn new() -> Self {
        Self {
            json: JsonReporter::new(),
            markdown: MarkdownReporter::new(),
        }
    }

    /// @ai:intent Write the results file and its Markdown summary next to it
    /// @ai:post the summary is results_path with a .md extension
    /// @ai:effects fs:write
    pub fn generate_all(&self, results: &SessionResults, results_path: &Path) -> Result<PathBuf> {
        self.json.generate(results, results_path)?;

        let summary_path = results_path.with_extension("md");
        self.markdown.generate(results, &summary_path)?;

        tracing::info!(
            "Results written to {} (summary {})",
            results_path.display(),
            summary_path.display()
        );
        Ok(summary_path)
    }

    /// @ai:intent Regenerate the Markdown summary into a directory
    /// @ai:effects fs:write
    pub fn generate_summary(&self, results: &SessionResults, output_dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(output_dir)?;

        let summary_path = output_dir.join("results.md");
        self.markdown.generate(results, &summary_path)?;

        tracing::info!("Summary generated at {}", summary_path.display());
        Ok(summary_path)
    }
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::SessionInfo;
    use tempfile::TempDir;

    #[test]
    fn test_generate_all_writes_json_and_markdown() {
        let temp = TempDir::new().unwrap();
        let results_path = temp.path().join("example_results.json");
        let results = SessionResults::new(SessionInfo::default());

        let summary = ReportGenerator::new()
            .generate_all(&results, &results_path)
            .unwrap();

        assert!(results_path.exists());
        assert_eq!(summary, temp.path().join("example_results.md"));
        assert!(summary.exists());
    }
}
