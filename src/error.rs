//! Error taxonomy for the harness.
//!
//! Discovery and extraction errors abort suite construction. Execution errors
//! and mismatches are scoped to a single test case.

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// The fixture directory could not be listed.
#[derive(Debug, Error)]
#[error("cannot discover fixtures in {}: {source}", .dir.display())]
pub struct DiscoveryError {
    pub dir: PathBuf,
    #[source]
    pub source: io::Error,
}

/// A discovered fixture could not be read.
#[derive(Debug, Error)]
#[error("cannot read fixture {}: {source}", .path.display())]
pub struct FixtureReadError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

/// The target executable could not be run to completion.
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("failed to spawn `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to set up output capture: {0}")]
    Capture(#[source] io::Error),

    #[error("failed waiting for `{program}`: {source}")]
    Wait {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("`{program}` did not finish within {}ms and was killed", .timeout.as_millis())]
    TimedOut { program: String, timeout: Duration },

    #[error("target command is empty")]
    EmptyCommand,
}

/// One line whose expected text was not found in the actual output line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineMismatch {
    /// Zero-based index into the output.
    pub index: usize,
    pub expected: String,
    pub actual: String,
}

impl fmt::Display for LineMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "line {}: expected the line {:?} to include {:?}",
            self.index + 1,
            self.actual,
            self.expected
        )
    }
}

/// Observed output did not satisfy the annotations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Mismatch {
    #[error("wrong number of output lines: expected {expected}, got {actual}")]
    OutputCountMismatch { expected: usize, actual: usize },

    #[error("{}", join_lines(.0))]
    OutputContentMismatch(Vec<LineMismatch>),
}

fn join_lines(mismatches: &[LineMismatch]) -> String {
    mismatches
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Why a single registered test did not pass.
#[derive(Debug, Error)]
pub enum CaseFailure {
    /// Harness or environment problem, not interpreter behaviour.
    #[error(transparent)]
    Execution(#[from] ExecutionError),

    #[error("{mismatch}\n=== exit status ===\n{status}\n=== captured output ===\n{output}")]
    Mismatch {
        mismatch: Mismatch,
        status: String,
        output: String,
    },

    #[error("process exited with {status}\n=== captured output ===\n{output}")]
    ExitStatus { status: String, output: String },
}

impl CaseFailure {
    /// True when the failure says something about the interpreter rather than the harness.
    pub fn is_test_failure(&self) -> bool {
        !matches!(self, CaseFailure::Execution(_))
    }
}

/// Suite construction failed; no tests were registered for it.
#[derive(Debug, Error)]
pub enum SuiteError {
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error("suite `{suite}`: {} unreadable fixture(s)\n{}", .errors.len(), join_errors(.errors))]
    UnreadableFixtures {
        suite: String,
        errors: Vec<FixtureReadError>,
    },

    #[error(
        "suite `{suite}`: fixtures {} and {} both register as `{name}`",
        .first.display(),
        .second.display()
    )]
    NameCollision {
        suite: String,
        name: String,
        first: PathBuf,
        second: PathBuf,
    },
}

fn join_errors(errors: &[FixtureReadError]) -> String {
    errors
        .iter()
        .map(|e| format!("  {e}"))
        .collect::<Vec<_>>()
        .join("\n")
}
