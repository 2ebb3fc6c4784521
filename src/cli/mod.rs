//! CLI module for the gauntlet harness
//!
//! ## Usage
//!
//! `gauntlet <BASE_DIR> [--manifest FILE]`
//!
//! `BASE_DIR` is the directory the configured test executables were built
//! into. The manifest defaults to `gauntlet.toml` in the working directory.
//!
//! ## Exit codes
//!
//! - `0` — every configured invocation succeeded
//! - `1` — at least one invocation failed or could not be launched
//! - `2` — usage error (clap) or configuration error (bad manifest,
//!   missing executable); kept distinct from `1` so pipelines can tell a
//!   broken setup apart from failing tests
//!
//! ## Design
//!
//! The CLI uses clap for argument parsing with derive macros. Command
//! functions return `CliResult<T>` instead of calling `process::exit`.
//! Only the top-level `run()` function handles errors and exits.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

use std::fmt;
use std::path::PathBuf;
use std::process;

use clap::Parser;

use crate::driver::{self, ConsoleReporter};
use crate::exec::ProcessInvoker;
use crate::manifest::{DEFAULT_MANIFEST_NAME, Manifest};

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const FAILURE: ExitCode = ExitCode(1);
    /// Setup problems: bad usage or bad configuration, never a test outcome.
    pub const CONFIG: ExitCode = ExitCode(2);
}

/// Error type for CLI operations.
///
/// Contains a user-facing message and an exit code. The CLI entry point
/// catches these errors, prints the message, and exits with the code.
#[derive(Debug)]
pub struct CliError {
    /// User-facing error message (already formatted for display)
    pub message: String,
    /// Exit code to return to the shell
    pub exit_code: ExitCode,
}

impl CliError {
    /// Create a new CLI error with a message and exit code.
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    /// Create a configuration error (exit code 2).
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::CONFIG)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Clap CLI definition
// ============================================================================

/// Run pre-built test executables and aggregate their pass/fail results
#[derive(Parser, Debug)]
#[command(name = "gauntlet")]
#[command(version = VERSION)]
#[command(about = "Run pre-built test executables and aggregate their pass/fail results", long_about = None)]
pub struct Cli {
    /// Directory containing the built test executables
    #[arg(value_name = "BASE_DIR")]
    pub base_dir: PathBuf,

    /// Manifest listing the executables and test cases to run
    #[arg(
        short,
        long,
        value_name = "FILE",
        default_value = DEFAULT_MANIFEST_NAME
    )]
    pub manifest: PathBuf,
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called. All command
/// implementations return `CliResult` and errors are handled here. Clap
/// itself reports usage errors on stderr and exits 2 before we get here.
pub fn run() {
    let cli = Cli::parse();

    match execute(cli) {
        Ok(exit_code) => {
            if exit_code.0 != 0 {
                process::exit(exit_code.0);
            }
        }
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

/// Execute one harness run and return its exit code.
fn execute(cli: Cli) -> CliResult<ExitCode> {
    let manifest = Manifest::load(&cli.manifest).map_err(|e| CliError::config(format!("error: {e}")))?;

    tracing::debug!(
        executables = manifest.executables.len(),
        base_dir = %cli.base_dir.display(),
        "starting run"
    );

    let invoker = ProcessInvoker;
    let mut reporter = ConsoleReporter;
    let summary = driver::run_all(&cli.base_dir, &manifest, &invoker, &mut reporter)
        .map_err(|e| CliError::config(format!("error: {e}")))?;

    match summary.final_exit_code() {
        0 => Ok(ExitCode::SUCCESS),
        _ => Ok(ExitCode::FAILURE),
    }
}

// ============================================================================
// Tests
// ============================================================================
