//! Harness manifest: which executables to run, and with which test cases
//!
//! The manifest is static configuration, analogous to a build-time list of
//! test targets. It is never computed by probing the binaries. Format:
//!
//! ```toml
//! [[executable]]
//! name = "lowlevel_test"
//! cases = ["test_vector", "test_matrix"]
//!
//! [[executable]]
//! name = "smoke"        # no cases: invoked once with no selector
//! ```
//!
//! Executable order and case order are preserved; the driver runs them in
//! exactly this order.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// File-name suffix appended to every executable name on this platform.
pub const EXE_SUFFIX: &str = if cfg!(windows) { ".exe" } else { "" };

/// Manifest file name looked up in the working directory when `--manifest`
/// is not given.
pub const DEFAULT_MANIFEST_NAME: &str = "gauntlet.toml";

/// Configuration errors. These abort the whole run before any invocation;
/// a broken manifest is a setup problem, not a test outcome.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read manifest '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse manifest '{path}': {message}")]
    Parse { path: PathBuf, message: String },

    #[error("test executable '{name}' not found (expected a file at {expected})")]
    MissingExecutable { name: String, expected: PathBuf },
}

/// One configured test binary: a logical name plus the ordered test-case
/// selectors to pass to it.
#[derive(Debug, Clone, Deserialize)]
pub struct ExecutableSpec {
    /// Logical executable name, without the platform suffix.
    pub name: String,
    /// Selectors to run, in order. Empty means one unfiltered invocation.
    #[serde(default)]
    pub cases: Vec<String>,
}

impl ExecutableSpec {
    pub fn new(name: impl Into<String>, cases: Vec<String>) -> Self {
        Self {
            name: name.into(),
            cases,
        }
    }

    /// Platform file name for this executable (`name` plus [`EXE_SUFFIX`]).
    pub fn file_name(&self) -> String {
        format!("{}{}", self.name, EXE_SUFFIX)
    }

    /// Resolve this executable under `base_dir`.
    ///
    /// The resolved path must be an existing regular file; anything else is
    /// a configuration error, distinct from a test failure.
    pub fn resolve(&self, base_dir: &Path) -> Result<PathBuf, ManifestError> {
        let path = base_dir.join(self.file_name());
        if path.is_file() {
            Ok(path)
        } else {
            Err(ManifestError::MissingExecutable {
                name: self.name.clone(),
                expected: path,
            })
        }
    }
}

/// The full harness configuration: an ordered list of executables.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Manifest {
    #[serde(default, rename = "executable")]
    pub executables: Vec<ExecutableSpec>,
}

impl Manifest {
    /// Load and parse a manifest file.
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let content = fs::read_to_string(path).map_err(|source| ManifestError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|err| ManifestError::Parse {
            path: path.to_path_buf(),
            message: err.to_string(),
        })
    }

    /// Test cases configured for `name`.
    ///
    /// An executable with no configuration yields an empty slice — absence
    /// is equivalent to "run once, unfiltered", never an error.
    pub fn cases_for(&self, name: &str) -> &[String] {
        self.executables
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.cases.as_slice())
            .unwrap_or(&[])
    }
}

// ============================================================================
// Tests
// ============================================================================
