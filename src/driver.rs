//! Harness driver: resolves executables, iterates test cases, aggregates
//!
//! The driver owns the orchestration policy:
//!
//! - every configured executable is resolved before the first invocation
//!   (a missing binary is a setup problem and aborts the whole run),
//! - invocations happen strictly in configured order, one at a time,
//! - test failures never stop the run; every configured (executable, case)
//!   pair is attempted and the aggregate is surfaced at the end.
//!
//! ## Reporter Trait
//!
//! Reporting is separated from execution via the [`Reporter`] trait, so the
//! orchestration logic can be tested without touching the real streams and
//! alternative output formats stay possible.

use std::path::{Path, PathBuf};

use crate::exec::{InvocationResult, Invoker, Outcome};
use crate::manifest::{ExecutableSpec, Manifest, ManifestError};

// ============================================================================
// Result aggregation
// ============================================================================

/// Run-wide pass/fail aggregate.
///
/// One per run. The failure flag accumulates by logical OR: once any
/// invocation fails, the run is failed, no matter how many others succeed.
#[derive(Debug, Default)]
pub struct RunSummary {
    any_failed: bool,
    invocations: usize,
    failures: usize,
}

impl RunSummary {
    /// Record the outcome of one invocation.
    pub fn record(&mut self, succeeded: bool) {
        self.invocations += 1;
        if !succeeded {
            self.any_failed = true;
            self.failures += 1;
        }
    }

    /// Total invocations recorded so far.
    pub fn invocations(&self) -> usize {
        self.invocations
    }

    /// Failed invocations recorded so far.
    pub fn failures(&self) -> usize {
        self.failures
    }

    /// Process exit code for the run: 0 if nothing failed, 1 otherwise.
    pub fn final_exit_code(&self) -> i32 {
        if self.any_failed { 1 } else { 0 }
    }
}

// ============================================================================
// Reporting
// ============================================================================

/// Receives per-invocation results and the closing summary.
pub trait Reporter {
    /// Called immediately after each invocation completes, in invocation
    /// order.
    fn on_invocation_complete(
        &mut self,
        executable: &str,
        selector: Option<&str>,
        result: &InvocationResult,
    );

    /// Called once after the last invocation.
    fn on_run_complete(&mut self, summary: &RunSummary);
}

/// Default console reporter.
///
/// Invocation stdout goes to stdout unconditionally; invocation stderr and
/// the harness's own failure notes go to stderr, and only on non-success.
#[derive(Debug, Default)]
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn on_invocation_complete(
        &mut self,
        executable: &str,
        selector: Option<&str>,
        result: &InvocationResult,
    ) {
        print!("{}", result.stdout);

        if !result.outcome.is_success() {
            eprint!("{}", result.stderr);

            let verdict = match result.outcome {
                Outcome::LaunchError => "FAILED TO LAUNCH",
                _ => "FAILED",
            };
            match selector {
                Some(case) => {
                    eprintln!("\x1b[31m{verdict}\x1b[0m: case '{case}' in {executable}");
                }
                None => eprintln!("\x1b[31m{verdict}\x1b[0m: {executable}"),
            }
        }
    }

    fn on_run_complete(&mut self, summary: &RunSummary) {
        if summary.failures() > 0 {
            eprintln!(
                "====== \x1b[31m{} of {} invocation(s) failed\x1b[0m ======",
                summary.failures(),
                summary.invocations()
            );
        } else {
            eprintln!(
                "====== \x1b[32m{} invocation(s) passed\x1b[0m ======",
                summary.invocations()
            );
        }
    }
}

// ============================================================================
// Driver
// ============================================================================

/// Run every configured (executable, case) pair, in configured order.
///
/// Resolution happens up front for all executables; any missing file aborts
/// the run before a single invocation is attempted. After that, invocations
/// proceed to the end regardless of individual failures, and every outcome
/// is recorded in the returned [`RunSummary`].
pub fn run_all(
    base_dir: &Path,
    manifest: &Manifest,
    invoker: &dyn Invoker,
    reporter: &mut dyn Reporter,
) -> Result<RunSummary, ManifestError> {
    // Fail fast: a non-resolvable executable is a configuration error,
    // not a test failure, so nothing runs until everything resolves.
    let mut resolved: Vec<(&ExecutableSpec, PathBuf)> =
        Vec::with_capacity(manifest.executables.len());
    for spec in &manifest.executables {
        let path = spec.resolve(base_dir)?;
        tracing::debug!(executable = %spec.name, path = %path.display(), "resolved");
        resolved.push((spec, path));
    }

    let mut summary = RunSummary::default();
    for (spec, path) in &resolved {
        // Each entry runs its own case list; duplicate names stay distinct.
        if spec.cases.is_empty() {
            run_one(invoker, reporter, &mut summary, &spec.name, path, None);
        } else {
            for case in &spec.cases {
                run_one(
                    invoker,
                    reporter,
                    &mut summary,
                    &spec.name,
                    path,
                    Some(case.as_str()),
                );
            }
        }
    }

    reporter.on_run_complete(&summary);
    Ok(summary)
}

/// One blocking invocation, reported and recorded immediately.
fn run_one(
    invoker: &dyn Invoker,
    reporter: &mut dyn Reporter,
    summary: &mut RunSummary,
    name: &str,
    path: &Path,
    selector: Option<&str>,
) {
    let result = invoker.run(path, selector);
    reporter.on_invocation_complete(name, selector, &result);
    summary.record(result.outcome.is_success());
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::manifest::ExecutableSpec;
    use proptest::prelude::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// Scripted invoker: records call order, answers from a per-call table.
    #[derive(Default)]
    struct FakeInvoker {
        calls: RefCell<Vec<(String, Option<String>)>>,
        // (executable file name, selector) -> outcome; defaults to Success
        outcomes: HashMap<(String, Option<String>), Outcome>,
    }

    impl FakeInvoker {
        fn failing(executable: &str, selector: Option<&str>, outcome: Outcome) -> Self {
            let mut outcomes = HashMap::new();
            outcomes.insert(
                (executable.to_string(), selector.map(String::from)),
                outcome,
            );
            Self {
                calls: RefCell::new(Vec::new()),
                outcomes,
            }
        }

        fn calls(&self) -> Vec<(String, Option<String>)> {
            self.calls.borrow().clone()
        }
    }

    impl Invoker for FakeInvoker {
        fn run(&self, executable: &Path, selector: Option<&str>) -> InvocationResult {
            let name = executable
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("")
                .to_string();
            self.calls
                .borrow_mut()
                .push((name.clone(), selector.map(String::from)));

            let outcome = self
                .outcomes
                .get(&(name, selector.map(String::from)))
                .copied()
                .unwrap_or(Outcome::Success);
            InvocationResult {
                outcome,
                stdout: format!("ran {:?}\n", selector),
                stderr: String::new(),
            }
        }
    }

    /// Collects reporter events without touching the real streams.
    #[derive(Default)]
    struct RecordingReporter {
        completed: Vec<(String, Option<String>, Outcome)>,
        summary_failures: Option<usize>,
    }

    impl Reporter for RecordingReporter {
        fn on_invocation_complete(
            &mut self,
            executable: &str,
            selector: Option<&str>,
            result: &InvocationResult,
        ) {
            self.completed.push((
                executable.to_string(),
                selector.map(String::from),
                result.outcome,
            ));
        }

        fn on_run_complete(&mut self, summary: &RunSummary) {
            self.summary_failures = Some(summary.failures());
        }
    }

    /// Base dir with one empty file per executable name, so resolution
    /// succeeds without anything actually being runnable.
    fn base_dir_with(names: &[&str]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for name in names {
            let spec = ExecutableSpec::new(*name, vec![]);
            std::fs::write(dir.path().join(spec.file_name()), b"").unwrap();
        }
        dir
    }

    fn manifest(entries: &[(&str, &[&str])]) -> Manifest {
        Manifest {
            executables: entries
                .iter()
                .map(|(name, cases)| {
                    ExecutableSpec::new(*name, cases.iter().map(|c| c.to_string()).collect())
                })
                .collect(),
        }
    }

    #[test]
    fn test_invocation_order_is_configured_order() {
        let dir = base_dir_with(&["a", "b"]);
        let manifest = manifest(&[("a", &["x", "y"]), ("b", &[])]);
        let invoker = FakeInvoker::default();
        let mut reporter = RecordingReporter::default();

        let summary = run_all(dir.path(), &manifest, &invoker, &mut reporter).unwrap();

        let a = ExecutableSpec::new("a", vec![]).file_name();
        let b = ExecutableSpec::new("b", vec![]).file_name();
        assert_eq!(
            invoker.calls(),
            vec![
                (a.clone(), Some("x".to_string())),
                (a, Some("y".to_string())),
                (b, None),
            ]
        );
        assert_eq!(summary.invocations(), 3);
        assert_eq!(summary.final_exit_code(), 0);
    }

    #[test]
    fn test_duplicate_executable_names_each_run_their_own_cases() {
        let dir = base_dir_with(&["dup"]);
        // Two entries for the same binary: both case lists must run, in order.
        let manifest = manifest(&[("dup", &["x"]), ("dup", &["y"])]);
        let invoker = FakeInvoker::default();
        let mut reporter = RecordingReporter::default();

        let summary = run_all(dir.path(), &manifest, &invoker, &mut reporter).unwrap();

        let selectors: Vec<_> = invoker.calls().into_iter().map(|(_, s)| s).collect();
        assert_eq!(selectors, vec![Some("x".to_string()), Some("y".to_string())]);
        assert_eq!(summary.invocations(), 2);
    }

    #[test]
    fn test_empty_case_list_runs_once_unfiltered() {
        let dir = base_dir_with(&["solo"]);
        let manifest = manifest(&[("solo", &[])]);
        let invoker = FakeInvoker::default();
        let mut reporter = RecordingReporter::default();

        run_all(dir.path(), &manifest, &invoker, &mut reporter).unwrap();

        assert_eq!(invoker.calls().len(), 1);
        assert_eq!(invoker.calls()[0].1, None);
    }

    #[test]
    fn test_one_failure_fails_the_run_but_not_the_rest() {
        let dir = base_dir_with(&["a", "b"]);
        let manifest = manifest(&[("a", &["x", "y"]), ("b", &[])]);
        let a = ExecutableSpec::new("a", vec![]).file_name();
        let invoker = FakeInvoker::failing(&a, Some("x"), Outcome::Failure);
        let mut reporter = RecordingReporter::default();

        let summary = run_all(dir.path(), &manifest, &invoker, &mut reporter).unwrap();

        // continue-on-error: all three still attempted
        assert_eq!(invoker.calls().len(), 3);
        assert_eq!(summary.failures(), 1);
        assert_eq!(summary.final_exit_code(), 1);
        assert_eq!(reporter.summary_failures, Some(1));
    }

    #[test]
    fn test_launch_error_counts_as_failure() {
        let dir = base_dir_with(&["a"]);
        let manifest = manifest(&[("a", &[])]);
        let a = ExecutableSpec::new("a", vec![]).file_name();
        let invoker = FakeInvoker::failing(&a, None, Outcome::LaunchError);
        let mut reporter = RecordingReporter::default();

        let summary = run_all(dir.path(), &manifest, &invoker, &mut reporter).unwrap();
        assert_eq!(summary.final_exit_code(), 1);
    }

    #[test]
    fn test_missing_executable_aborts_before_any_invocation() {
        let dir = base_dir_with(&["a"]);
        // "b" is configured but its file was never created
        let manifest = manifest(&[("a", &["x"]), ("b", &[])]);
        let invoker = FakeInvoker::default();
        let mut reporter = RecordingReporter::default();

        let err = run_all(dir.path(), &manifest, &invoker, &mut reporter).unwrap_err();

        assert!(matches!(err, ManifestError::MissingExecutable { .. }));
        assert!(invoker.calls().is_empty());
        assert!(reporter.completed.is_empty());
    }

    #[test]
    fn test_reporter_sees_every_invocation_in_order() {
        let dir = base_dir_with(&["a"]);
        let manifest = manifest(&[("a", &["x", "y"])]);
        let invoker = FakeInvoker::default();
        let mut reporter = RecordingReporter::default();

        run_all(dir.path(), &manifest, &invoker, &mut reporter).unwrap();

        let selectors: Vec<_> = reporter.completed.iter().map(|(_, s, _)| s.clone()).collect();
        assert_eq!(selectors, vec![Some("x".to_string()), Some("y".to_string())]);
    }

    proptest! {
        /// Aggregation is a monotonic OR: the exit code is 0 exactly when
        /// every recorded outcome succeeded, in any order and any count.
        #[test]
        fn prop_exit_code_is_zero_iff_all_succeeded(outcomes in proptest::collection::vec(any::<bool>(), 0..64)) {
            let mut summary = RunSummary::default();
            for &succeeded in &outcomes {
                summary.record(succeeded);
            }
            let expected = if outcomes.iter().all(|&s| s) { 0 } else { 1 };
            prop_assert_eq!(summary.final_exit_code(), expected);
            prop_assert_eq!(summary.invocations(), outcomes.len());
        }
    }
}
