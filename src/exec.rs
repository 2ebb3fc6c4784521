//! Single-invocation process runner
//!
//! Runs one test executable with at most one selector argument, blocking
//! until it exits, and classifies the result. Execution is behind the
//! [`Invoker`] trait so the driver can be exercised without spawning real
//! processes.

use std::path::Path;
use std::process::{Command, ExitStatus};

/// Classification of one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Process ran to completion and exited 0.
    Success,
    /// Process ran to completion and exited non-zero.
    Failure,
    /// Process could not be started or run to completion at all,
    /// e.g. a missing shared dependency.
    LaunchError,
}

impl Outcome {
    pub fn is_success(self) -> bool {
        self == Outcome::Success
    }
}

/// Captured result of one invocation.
///
/// Created per invocation and consumed immediately by the driver; nothing
/// here outlives the reporting of that single invocation.
#[derive(Debug)]
pub struct InvocationResult {
    pub outcome: Outcome,
    /// Full captured standard output, always surfaced to the caller.
    pub stdout: String,
    /// Full captured standard error, surfaced only on non-success.
    pub stderr: String,
}

/// Runs one test executable and captures its output.
pub trait Invoker {
    /// Invoke `executable`, passing `selector` as the single extra argument
    /// when present. Blocks until the process exits. A single invocation is
    /// authoritative: no retries.
    fn run(&self, executable: &Path, selector: Option<&str>) -> InvocationResult;
}

/// Spawns the executable as a child process via [`std::process::Command`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessInvoker;

impl Invoker for ProcessInvoker {
    fn run(&self, executable: &Path, selector: Option<&str>) -> InvocationResult {
        let mut command = Command::new(executable);
        if let Some(selector) = selector {
            command.arg(selector);
        }

        match command.output() {
            Ok(output) => {
                let outcome = if output.status.success() {
                    Outcome::Success
                } else if is_launch_failure(output.status) {
                    Outcome::LaunchError
                } else {
                    Outcome::Failure
                };
                InvocationResult {
                    outcome,
                    stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                }
            }
            Err(err) => InvocationResult {
                outcome: Outcome::LaunchError,
                stdout: String::new(),
                stderr: format!("could not start {}: {}\n", executable.display(), err),
            },
        }
    }
}

/// Maps OS-specific "started but never actually ran" exit statuses to a
/// launch failure.
///
/// On Windows a missing DLL surfaces as STATUS_DLL_NOT_FOUND; on Unix the
/// dynamic loader exits 127 when a shared object cannot be resolved.
#[cfg(windows)]
fn is_launch_failure(status: ExitStatus) -> bool {
    const STATUS_DLL_NOT_FOUND: i32 = 0xC000_0135_u32 as i32;
    status.code() == Some(STATUS_DLL_NOT_FOUND)
}

#[cfg(not(windows))]
fn is_launch_failure(status: ExitStatus) -> bool {
    status.code() == Some(127)
}

// ============================================================================
// Tests
// ============================================================================
