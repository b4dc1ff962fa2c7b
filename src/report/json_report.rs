//! @ai:module:intent JSON results file generation
//! @ai:module:layer infrastructure
//! @ai:module:public_api JsonReporter
//! @ai:module:stateless true

use crate::error::Result;
use crate::metrics::SessionResults;
use std::path::Path;

/// @ai:intent Trait for JSON report generation
pub trait JsonReporterTrait: Send + Sync {
    /// @ai:intent Write session results as JSON
    fn generate(&self, results: &SessionResults, output_path: &Path) -> Result<()>;
}

/// @ai:intent Writes the session results file
pub struct JsonReporter;

impl JsonReporter {
    /// @ai:intent Create a new JSON reporter
    /// @ai:effects pure
    pub fn new() -> Self {
        Self
    }
}

impl Default for JsonReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonReporterTrait for JsonReporter {
    /// @ai:intent Generate JSON report to file
    /// @ai:effects fs:write
    fn generate(&self, results: &SessionResults, output_path: &Path) -> Result<()> {
        if let Some(parent) = output_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(results)?;
        std::fs::write(output_path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::Key;
    use crate::planner::SessionInfo;
    use tempfile::TempDir;

    #[test]
    fn test_generate_json_report() {
        let reporter = JsonReporter::new();
        let temp = TempDir::new().unwrap();
        let output = temp.path().join("nested").join("example_results.json");

        let key = Key::new("nbody", "Java", "default-java");
        let mut info = SessionInfo::default();
        info.n_proc_execs = 1;
        info.non_skipped_keys.insert(key.clone());

        let mut results = SessionResults::new(info);
        results.record_success(&key, vec![0.000403]);

        reporter.generate(&results, &output).unwrap();
        assert!(output.exists());

        let content = std::fs::read_to_string(&output).unwrap();
        assert!(content.contains("\"nbody:Java:default-java\""));
        assert!(content.contains("0.000403"));
        assert!(content.contains("\"n_proc_execs\": 1"));
    }
}
