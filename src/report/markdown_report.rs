//! @ai:module:intent Markdown summary of a benchmark session
//! @ai:module:layer infrastructure
//! @ai:module:public_api MarkdownReporter
//! @ai:module:stateless true

use crate::error::Result;
use crate::metrics::{KeySummary, MetricsAggregator, MetricsAggregatorTrait, SessionResults};
use std::fmt::Write as FmtWrite;
use std::path::Path;

/// @ai:intent Trait for Markdown report generation
pub trait MarkdownReporterTrait: Send + Sync {
    /// @ai:intent Generate Markdown report from results
    fn generate(&self, results: &SessionResults, output_path: &Path) -> Result<()>;
}

/// @ai:intent Generates Markdown reports from session results
pub struct MarkdownReporter {
    aggregator: MetricsAggregator,
}

impl MarkdownReporter {
    /// @ai:intent Create a new Markdown reporter
    /// @ai:effects pure
    pub fn new() -> Self {
        Self {
            aggregator: MetricsAggregator::new(),
        }
    }

    /// @ai:intent Format an optional timing in seconds
    /// @ai:effects pure
    fn format_timing(value: Option<f64>) -> String {
        match value {
            Some(v) => format!("{:.6}", v),
            None => "-".to_string(),
        }
    }

    /// @ai:intent Session header with planned and completed counts
    /// @ai:effects pure
    fn write_summary(output: &mut String, results: &SessionResults) -> std::fmt::Result {
        let session = &results.session;

        writeln!(output, "# Benchmark Session Results")?;
        writeln!(output)?;
        writeln!(output, "**Started:** {}", results.started_at)?;

        if let Some(finished) = &results.finished_at {
            writeln!(output, "**Finished:** {}", finished)?;
        }

        if results.dry_run {
            writeln!(output, "**Dry run:** no benchmarks were executed")?;
        }

        writeln!(output)?;
        writeln!(output, "| | Count |")?;
        writeln!(output, "|---|---|")?;
        writeln!(output, "| Keys | {} |", session.total_keys())?;
        writeln!(output, "| Skipped keys | {} |", session.skipped_keys.len())?;
        writeln!(output, "| Planned process executions | {} |", session.n_proc_execs)?;
        writeln!(output, "| Planned in-process iterations | {} |", session.n_in_proc_iters)?;
        writeln!(output, "| Successful executions | {} |", results.total_executions())?;
        writeln!(output, "| Failed executions | {} |", results.total_failures())?;
        writeln!(output)?;
        Ok(())
    }

    /// @ai:intent Table of per-key statistics
    /// @ai:effects pure
    fn write_key_table(output: &mut String, summaries: &[KeySummary]) -> std::fmt::Result {
        writeln!(output, "## Results by Key")?;
        writeln!(output)?;
        writeln!(output, "| Key | Executions | Failures | Iterations | Mean (s) | Min (s) | Max (s) |")?;
        writeln!(output, "|-----|------------|----------|------------|----------|---------|---------|")?;

        for s in summaries {
            writeln!(
                output,
                "| {} | {} | {} | {} | {} | {} | {} |",
                s.key,
                s.executions,
                s.failures,
                s.iterations,
                Self::format_timing(s.mean),
                Self::format_timing(s.min),
                Self::format_timing(s.max)
            )?;
        }

        writeln!(output)?;
        Ok(())
    }

    /// @ai:intent Full diagnostics of every failed execution
    /// @ai:effects pure
    fn write_failures(output: &mut String, results: &SessionResults) -> std::fmt::Result {
        if results.total_failures() == 0 {
            return Ok(());
        }

        writeln!(output, "## Failures")?;
        writeln!(output)?;

        for (key, data) in &results.data {
            for failure in &data.failures {
                writeln!(output, "### {} (execution {})", key, failure.execution + 1)?;
                writeln!(output)?;
                writeln!(output, "```")?;
                write!(output, "{}", failure.message)?;
                writeln!(output, "```")?;
                writeln!(output)?;
            }
        }

        Ok(())
    }

    /// @ai:effects pure
    fn write_skipped(output: &mut String, results: &SessionResults) -> std::fmt::Result {
        if results.session.skipped_keys.is_empty() {
            return Ok(());
        }

        writeln!(output, "## Skipped Keys")?;
        writeln!(output)?;

        for key in &results.session.skipped_keys {
            writeln!(output, "- `{}`", key)?;
        }

        writeln!(output)?;
        Ok(())
    }

    /// @ai:intent Render the whole report
    /// @ai:effects pure
    pub fn render(&self, results: &SessionResults) -> Result<String> {
        let summaries = self.aggregator.summarize(results);
        let mut content = String::new();

        Self::write_summary(&mut content, results)?;
        Self::write_key_table(&mut content, &summaries)?;
        Self::write_failures(&mut content, results)?;
        Self::write_skipped(&mut content, results)?;

        Ok(content)
    }
}

impl Default for MarkdownReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownReporterTrait for MarkdownReporter {
    /// @ai:intent Generate Markdown report to file
    /// @ai:effects fs:write
    fn generate(&self, results: &SessionResults, output_path: &Path) -> Result<()> {
        let content = self.render(results)?;
        std::fs::write(output_path, content)?;
        Ok(())
    }
}
