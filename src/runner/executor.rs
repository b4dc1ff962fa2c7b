//! @ai:module:intent Sequential execution of a planned benchmark session
//! @ai:module:layer application
//! @ai:module:public_api BenchmarkExecutor, RunOptions, create_executor
//! @ai:module:stateless false

use crate::config::SessionConfig;
use crate::error::Result;
use crate::metrics::{FailureRecord, SessionResults};
use crate::planner::{build_schedule, get_session_info, Job, SessionInfo};
use crate::results::{check_and_parse_execution_results, format_raw_exec_results, ExecutionResult};
use crate::shell::{ShellRunnerTrait, SystemShell};
use std::collections::BTreeMap;
use std::sync::Arc;

/// @ai:intent Options controlling a session run
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Log the commands that would run without executing them
    pub dry_run: bool,
}

/// @ai:intent Executes scheduled benchmark jobs one process at a time
pub struct BenchmarkExecutor<S: ShellRunnerTrait> {
    shell: Arc<S>,
    config: SessionConfig,
    options: RunOptions,
}

impl<S: ShellRunnerTrait> BenchmarkExecutor<S> {
    /// @ai:intent Create a new benchmark executor
    /// @ai:effects pure
    pub fn new(shell: Arc<S>, config: SessionConfig, options: RunOptions) -> Self {
        Self {
            shell,
            config,
            options,
        }
    }

    /// @ai:intent Run the audit commands, terminating on any failure
    /// @ai:effects io
    pub fn run_audit(&self) -> Result<BTreeMap<String, String>> {
        let mut audit = BTreeMap::new();

        for (name, command) in &self.config.audit {
            if self.options.dry_run {
                tracing::info!("[DRY RUN] audit {}: {}", name, command);
                continue;
            }

            tracing::info!("Collecting audit '{}'", name);
            let output = self.shell.run(command, true)?;
            audit.insert(name.clone(), output.stdout);
        }

        Ok(audit)
    }

    /// @ai:intent Run one process execution and validate its output
    /// @ai:post the benchmark subprocess is never treated as fatal
    /// @ai:effects io
    pub fn execute_job(&self, job: &Job) -> Result<ExecutionResult> {
        let command = self.config.render_command(&job.key, job.iterations)?;
        let output = self.shell.run(&command, false)?;

        Ok(check_and_parse_execution_results(
            &output.stdout,
            &output.stderr,
            output.return_code,
        ))
    }

    /// @ai:intent Execute a whole planned session and collect the results
    /// @ai:pre info was produced from this executor's config
    /// @ai:post a failing execution is recorded and the session continues
    /// @ai:effects io
    pub fn execute_all(&self, info: &SessionInfo) -> Result<SessionResults> {
        let schedule = build_schedule(&self.config, info)?;
        let mut results = SessionResults::new(info.clone());
        results.dry_run = self.options.dry_run;
        results.audit = self.run_audit()?;

        let total = schedule.len();

        for (i, job) in schedule.iter().enumerate() {
            if self.options.dry_run {
                let command = self.config.render_command(&job.key, job.iterations)?;
                tracing::info!("[DRY RUN] [{}/{}] {}: {}", i + 1, total, job.key, command);
                continue;
            }

            tracing::info!(
                "[{}/{}] Executing {} (execution {}/{}, {} iterations)",
                i + 1,
                total,
                job.key,
                job.execution + 1,
                job.of,
                job.iterations
            );

            match self.execute_job(job)? {
                ExecutionResult::Success(raw) => {
                    results.record_success(&job.key, format_raw_exec_results(&raw));
                }
                ExecutionResult::Failure(failure) => {
                    tracing::error!(
                        "{} failed (execution {}):\n{}",
                        job.key,
                        job.execution + 1,
                        failure
                    );
                    let record = FailureRecord::from_failure(job.execution, &failure);
                    results.record_failure(&job.key, record);
                }
            }
        }

        results.finish();

        tracing::info!(
            "Session finished: {} executions succeeded, {} failed",
            results.total_executions(),
            results.total_failures()
        );

        Ok(results)
    }

    /// @ai:intent Plan and execute the configured session
    /// @ai:effects io
    pub fn run_session(&self) -> Result<SessionResults> {
        let info = get_session_info(&self.config)?;
        self.execute_all(&info)
    }
}

/// @ai:intent Create an executor backed by the system shell
/// @ai:effects pure
pub fn create_executor(config: SessionConfig, options: RunOptions) -> BenchmarkExecutor<SystemShell> {
    BenchmarkExecutor::new(Arc::new(SystemShell::new()), config, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::Key;
    use crate::results::FailureKind;
    use crate::shell::{MockShellRunner, ShellOutput};
    use pretty_assertions::assert_eq;

    const CONFIG: &str = r#"
n_executions = 2
n_iterations = 3
skip = ["*:PyPy:no-jit"]

[audit]
kernel = "uname -r"

[benchmarks.nbody]
param = 100

[vms.PyPy]
command = "pypy runner.py"

[vms.PyPy.variants.default-python]
[vms.PyPy.variants.no-jit]
env = { PYPY_GC_MAX = "1GB" }
"#;

    fn output(stdout: &str, stderr: &str, return_code: i32) -> ShellOutput {
        ShellOutput {
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
            return_code,
        }
    }

    fn executor(mock: Arc<MockShellRunner>, dry_run: bool) -> BenchmarkExecutor<MockShellRunner> {
        let config = SessionConfig::from_toml_str(CONFIG).unwrap();
        BenchmarkExecutor::new(mock, config, RunOptions { dry_run })
    }

    #[test]
    fn test_execute_all_records_rounded_timings() {
        let mock = Arc::new(MockShellRunner::new(output(
            "[0.1234567, 0.2, 0.3]",
            "[iterations_runner.py] iteration 3/3",
            0,
        )));
        mock.push_response(output("5.4.0", "", 0));

        let results = executor(mock.clone(), false).run_session().unwrap();
        let key = Key::new("nbody", "PyPy", "default-python");

        assert_eq!(results.audit["kernel"], "5.4.0");
        assert_eq!(
            results.data[&key].executions,
            vec![vec![0.123457, 0.2, 0.3], vec![0.123457, 0.2, 0.3]]
        );
        assert!(results.finished_at.is_some());
        assert_eq!(
            mock.commands(),
            vec![
                "uname -r",
                "pypy runner.py nbody 3 100",
                "pypy runner.py nbody 3 100",
            ]
        );
    }

    #[test]
    fn test_only_audit_commands_are_fatal() {
        let mock = Arc::new(MockShellRunner::new(output("", "Segmentation fault", 139)));
        mock.push_response(output("5.4.0", "", 0));

        let results = executor(mock.clone(), false).run_session().unwrap();
        let calls = mock.calls();

        assert_eq!(calls[0], ("uname -r".to_string(), true));
        assert_eq!(calls.len(), 3);
        assert!(calls[1..].iter().all(|(_, fatal)| !fatal));
        assert_eq!(results.total_failures(), 2);
    }

    #[test]
    fn test_failed_execution_is_recorded_and_session_continues() {
        let mock = Arc::new(MockShellRunner::new(output("[1.0, 1.0, 1.0]", "", 0)));
        mock.push_response(output("", "", 0));
        mock.push_response(output("Traceback", "ZeroDivisionError", 1));

        let results = executor(mock.clone(), false).run_session().unwrap();
        let key = Key::new("nbody", "PyPy", "default-python");
        let recorded = &results.data[&key];

        assert_eq!(recorded.executions.len(), 1);
        assert_eq!(recorded.failures.len(), 1);

        let failure = &recorded.failures[0];
        assert_eq!(failure.execution, 0);
        assert_eq!(failure.kind, FailureKind::NonZeroExit);
        assert_eq!(failure.return_code, 1);
        assert!(failure.message.contains("Traceback"));
        assert!(failure.message.contains("ZeroDivisionError"));
    }

    #[test]
    fn test_dry_run_executes_nothing() {
        let mock = Arc::new(MockShellRunner::new(output("[1.0]", "", 0)));

        let results = executor(mock.clone(), true).run_session().unwrap();

        assert!(mock.commands().is_empty());
        assert!(results.dry_run);
        assert!(results.data.is_empty());
        assert_eq!(results.session.n_proc_execs, 2);
    }

    #[test]
    fn test_skipped_keys_are_never_run() {
        let mock = Arc::new(MockShellRunner::new(output("[1.0, 2.0, 3.0]", "", 0)));

        let results = executor(mock.clone(), false).run_session().unwrap();

        assert!(!mock.commands().iter().any(|c| c.contains("PYPY_GC_MAX")));
        assert!(results
            .session
            .skipped_keys
            .contains(&Key::new("nbody", "PyPy", "no-jit")));
    }
}
