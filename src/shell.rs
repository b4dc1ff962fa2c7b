//! @ai:module:intent Synchronous shell command execution with captured output
//! @ai:module:layer infrastructure
//! @ai:module:public_api ShellRunnerTrait, SystemShell, ShellOutput, MockShellRunner, run_shell_cmd, fatal
//! @ai:module:stateless true

use crate::error::Result;
use std::collections::VecDeque;
use std::process::Command;
use std::sync::Mutex;

/// Return code reported when the child was terminated by a signal.
pub const SIGNALLED_RETURN_CODE: i32 = -1;

/// @ai:intent Captured (stdout, stderr, return code) of one command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellOutput {
    pub stdout: String,
    pub stderr: String,
    pub return_code: i32,
}

impl ShellOutput {
    /// @ai:effects pure
    pub fn success(&self) -> bool {
        self.return_code == 0
    }
}

/// @ai:intent Trait for running shell commands
pub trait ShellRunnerTrait: Send + Sync {
    /// @ai:intent Run a command to completion and capture both streams
    /// @ai:post the child has been reaped when this returns
    fn run(&self, command: &str, fatal_on_nonzero: bool) -> Result<ShellOutput>;
}

/// @ai:intent Runs commands through the platform shell (`sh -c`)
pub struct SystemShell;

impl SystemShell {
    /// @ai:intent Create a new system shell runner
    /// @ai:effects pure
    pub fn new() -> Self {
        Self
    }
}

impl Default for SystemShell {
    fn default() -> Self {
        Self::new()
    }
}

impl ShellRunnerTrait for SystemShell {
    /// @ai:effects io
    fn run(&self, command: &str, fatal_on_nonzero: bool) -> Result<ShellOutput> {
        run_shell_cmd(command, fatal_on_nonzero)
    }
}

/// @ai:intent Execute a command via `sh -c`, trimming whitespace from both streams
/// @ai:pre command is trusted harness or benchmark input
/// @ai:post exits the process if fatal_on_nonzero and the command failed
/// @ai:example ("echo example text", true) -> ("example text", "", 0)
/// @ai:effects io
pub fn run_shell_cmd(command: &str, fatal_on_nonzero: bool) -> Result<ShellOutput> {
    tracing::debug!("Running shell command: {}", command);

    // output() waits for the child and drains both pipes
    let output = Command::new("sh").arg("-c").arg(command).output()?;

    let result = ShellOutput {
        stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        return_code: output.status.code().unwrap_or(SIGNALLED_RETURN_CODE),
    };

    if fatal_on_nonzero && !result.success() {
        fatal(&format!(
            "Shell command failed: '{}'\nreturn code: {}\nstdout: {}\nstderr: {}",
            command, result.return_code, result.stdout, result.stderr
        ));
    }

    Ok(result)
}

/// @ai:intent Log an unrecoverable harness error and terminate
/// @ai:effects io, process:exit
pub fn fatal(msg: &str) -> ! {
    tracing::error!("{}", msg);
    eprintln!("vmbench: fatal: {msg}");
    std::process::exit(1)
}

/// @ai:intent Mock shell for testing, replays queued outputs and records calls
pub struct MockShellRunner {
    responses: Mutex<VecDeque<ShellOutput>>,
    fallback: ShellOutput,
    calls: Mutex<Vec<(String, bool)>>,
}

impl MockShellRunner {
    /// @ai:intent Create a mock that answers every command with the same output
    /// @ai:effects pure
    pub fn new(fallback: ShellOutput) -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            fallback,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// @ai:intent Queue an output returned before the fallback is used
    /// @ai:effects state:write
    pub fn push_response(&self, output: ShellOutput) {
        if let Ok(mut responses) = self.responses.lock() {
            responses.push_back(output);
        }
    }

    /// @ai:intent Commands received so far, in call order
    /// @ai:effects state:read
    pub fn commands(&self) -> Vec<String> {
        self.calls().into_iter().map(|(command, _)| command).collect()
    }

    /// @ai:intent (command, fatal_on_nonzero) pairs received so far, in call order
    /// @ai:effects state:read
    pub fn calls(&self) -> Vec<(String, bool)> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl ShellRunnerTrait for MockShellRunner {
    /// @ai:effects state:write
    fn run(&self, command: &str, fatal_on_nonzero: bool) -> Result<ShellOutput> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((command.to_string(), fatal_on_nonzero));
        }

        let queued = self
            .responses
            .lock()
            .ok()
            .and_then(|mut responses| responses.pop_front());

        Ok(queued.unwrap_or_else(|| self.fallback.clone()))
    }
}
