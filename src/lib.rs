#![forbid(unsafe_code)]
//! Gauntlet test-execution harness
//!
//! Gauntlet runs a configured set of pre-built test executables, optionally
//! restricting each invocation to a named test case, and folds every outcome
//! into a single pass/fail exit code for build pipelines.
//!
//! The harness treats test binaries as opaque: each one is expected to accept
//! at most one argument (a test-case selector) and signal its result through
//! its exit status. Which binaries run, and with which selectors, comes from
//! a TOML manifest (see [`manifest`]).
//!
//! ## Panic Policy
//!
//! This codebase follows explicit error handling:
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`.
//!   The `cli` module enforces `#![deny(clippy::unwrap_used)]`.
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.

pub mod cli;
pub mod driver;
pub mod exec;
pub mod manifest;

pub use driver::{ConsoleReporter, Reporter, RunSummary, run_all};
pub use exec::{InvocationResult, Invoker, Outcome, ProcessInvoker};
pub use manifest::{ExecutableSpec, Manifest, ManifestError};
