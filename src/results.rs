//! @ai:module:intent Validate benchmark subprocess output into timing measurements
//! @ai:module:layer domain
//! @ai:module:public_api ExecutionResult, ExecutionFailed, FailureKind, check_and_parse_execution_results, format_raw_exec_results
//! @ai:module:stateless true

use serde::{Deserialize, Serialize};
use std::fmt;

const SEPARATOR_WIDTH: usize = 50;

const FAILURE_HEADER: &str = "Benchmark returned non-zero or didn't emit JSON list.";

/// @ai:intent Why a benchmark invocation was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    NonZeroExit,
    MalformedOutput,
}

impl FailureKind {
    /// @ai:intent Convert kind to string representation
    /// @ai:effects pure
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::NonZeroExit => "non_zero_exit",
            FailureKind::MalformedOutput => "malformed_output",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// @ai:intent A rejected benchmark invocation with its full captured context
/// @ai:effects pure
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionFailed {
    pub kind: FailureKind,
    pub return_code: i32,
    pub stdout: String,
    pub stderr: String,
    /// Description of the JSON error when stdout could not be parsed
    pub parse_error: Option<String>,
}

impl ExecutionFailed {
    /// @ai:intent Render the diagnostic message with verbatim stdout/stderr blocks
    /// @ai:post never truncates stdout or stderr
    /// @ai:effects pure
    pub fn message(&self) -> String {
        let sep = "-".repeat(SEPARATOR_WIDTH);
        let mut msg = String::from(FAILURE_HEADER);

        match &self.parse_error {
            Some(err) => msg.push_str(&format!(" Exception string: {err}\n")),
            None => msg.push(' '),
        }

        msg.push_str(&format!("return code: {}\n", self.return_code));
        msg.push_str(&format!("stdout:\n{sep}\n{}\n{sep}\n\n", self.stdout));
        msg.push_str(&format!("stderr:\n{sep}\n{}\n{sep}\n", self.stderr));
        msg
    }
}

impl fmt::Display for ExecutionFailed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

impl std::error::Error for ExecutionFailed {}

/// @ai:intent Outcome of validating one process-execution
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionResult {
    Success(Vec<f64>),
    Failure(ExecutionFailed),
}

impl ExecutionResult {
    /// @ai:effects pure
    pub fn is_success(&self) -> bool {
        matches!(self, ExecutionResult::Success(_))
    }

    /// @ai:intent Convert to a standard Result for `?` propagation
    /// @ai:effects pure
    pub fn into_result(self) -> Result<Vec<f64>, ExecutionFailed> {
        match self {
            ExecutionResult::Success(values) => Ok(values),
            ExecutionResult::Failure(failure) => Err(failure),
        }
    }
}

/// @ai:intent Validate a subprocess's output triple
/// @ai:pre stdout and stderr are the complete captured streams
/// @ai:post Success only if return_code == 0 and stdout is a JSON array of numbers
/// @ai:example ("[0.000403]", "", 0) -> Success([0.000403])
/// @ai:example ("[0.000403]", "", 1) -> Failure(NonZeroExit)
/// @ai:example ("[0.000403[", "", 0) -> Failure(MalformedOutput)
/// @ai:effects pure
pub fn check_and_parse_execution_results(
    stdout: &str,
    stderr: &str,
    return_code: i32,
) -> ExecutionResult {
    let parse_error = match serde_json::from_str::<Vec<f64>>(stdout) {
        Ok(values) if return_code == 0 => return ExecutionResult::Success(values),
        Ok(_) => None,
        Err(e) => Some(e.to_string()),
    };

    let kind = if return_code != 0 {
        FailureKind::NonZeroExit
    } else {
        FailureKind::MalformedOutput
    };

    ExecutionResult::Failure(ExecutionFailed {
        kind,
        return_code,
        stdout: stdout.to_string(),
        stderr: stderr.to_string(),
        parse_error,
    })
}

/// @ai:intent Round raw timings to 6 decimal places
/// @ai:post result.len() == raw.len(), order preserved
/// @ai:example ([]) -> []
/// @ai:example ([1.33333344444, 4.555555666]) -> [1.333333, 4.555556]
/// @ai:effects pure
pub fn format_raw_exec_results(raw: &[f64]) -> Vec<f64> {
    raw.iter().map(|v| round_to(*v, 6)).collect()
}

/// @ai:intent Round the exact binary value once to the given number of decimals
/// @ai:post 0.8270365 (stored just below the tie) -> 0.827036
/// @ai:effects pure
fn round_to(value: f64, decimals: usize) -> f64 {
    // scaling first would round twice and push near-ties upwards
    format!("{value:.decimals$}").parse().unwrap_or(value)
}
