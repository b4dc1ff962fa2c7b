//! @ai:module:intent vmbench benchmark harness library
//! @ai:module:layer application
//! @ai:module:public_api config, key, skip, planner, results, shell, runner, metrics, report

pub mod config;
pub mod error;
pub mod key;
pub mod metrics;
pub mod planner;
pub mod report;
pub mod results;
pub mod runner;
pub mod shell;
pub mod skip;

pub use config::{results_path, SessionConfig};
pub use error::{HarnessError, Result};
pub use key::{Key, SkipRule};
pub use metrics::{MetricsAggregator, SessionResults};
pub use planner::{build_schedule, get_session_info, SessionInfo};
pub use report::ReportGenerator;
pub use results::{check_and_parse_execution_results, format_raw_exec_results, ExecutionFailed, ExecutionResult};
pub use runner::{create_executor, BenchmarkExecutor, RunOptions};
pub use shell::{run_shell_cmd, ShellOutput, ShellRunnerTrait, SystemShell};
pub use skip::SkipMatcher;
