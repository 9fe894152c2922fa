//! Console reporter: runs registered tests one after another and tallies them.

use std::io::{self, Write};

use tracing::debug;

use crate::suite::RegisteredTest;

/// Tally of one run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Report {
    /// Tests selected by the filter.
    pub total: usize,
    pub passed: usize,
    /// Output did not match, or the exit status was rejected.
    pub failed: usize,
    /// The target could not be run at all.
    pub errored: usize,
    /// Tests left out by the filter.
    pub skipped: usize,
}

impl Report {
    pub fn success(&self) -> bool {
        self.failed == 0 && self.errored == 0
    }
}

/// Runs every test whose full name contains `filter`, writing one line per test to `out`.
pub fn run_tests<W: Write>(
    tests: &[RegisteredTest],
    filter: Option<&str>,
    verbose: bool,
    out: &mut W,
) -> io::Result<Report> {
    let mut report = Report::default();
    for test in tests {
        let name = test.full_name();
        if let Some(f) = filter {
            if !name.contains(f) {
                report.skipped += 1;
                continue;
            }
        }
        report.total += 1;
        if verbose {
            writeln!(out, "[RUN ] {name}")?;
        }
        match test.run() {
            Ok(()) => {
                report.passed += 1;
                writeln!(out, "[PASS] {name}")?;
            }
            Err(e) if e.is_test_failure() => {
                report.failed += 1;
                writeln!(out, "[FAIL] {name}: {e}")?;
            }
            Err(e) => {
                report.errored += 1;
                writeln!(out, "[ERR ] {name}: {e}")?;
            }
        }
    }
    debug!(?report, "run finished");

    write!(out, "\n{}/{} tests passed", report.passed, report.total)?;
    if report.errored > 0 {
        write!(out, ", {} could not run", report.errored)?;
    }
    if report.skipped > 0 {
        write!(out, " ({} filtered out)", report.skipped)?;
    }
    writeln!(out, ".")?;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CaseFailure, ExecutionError, Mismatch};

    fn fake(name: &str, outcome: fn() -> Result<(), CaseFailure>) -> RegisteredTest {
        RegisteredTest {
            suite: "atoms".into(),
            name: name.into(),
            body: Box::new(outcome),
        }
    }

    fn fixtures() -> Vec<RegisteredTest> {
        vec![
            fake("test_ok", || Ok(())),
            fake("test_bad", || {
                Err(CaseFailure::Mismatch {
                    mismatch: Mismatch::OutputCountMismatch {
                        expected: 2,
                        actual: 3,
                    },
                    status: "exit status: 0".into(),
                    output: "1\n2\n3".into(),
                })
            }),
            fake("test_broken", || Err(ExecutionError::EmptyCommand.into())),
        ]
    }

    #[test]
    fn tallies_pass_fail_and_error_separately() {
        let mut out = Vec::new();
        let report = run_tests(&fixtures(), None, false, &mut out).unwrap();
        assert_eq!(
            report,
            Report {
                total: 3,
                passed: 1,
                failed: 1,
                errored: 1,
                skipped: 0
            }
        );
        assert!(!report.success());

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("[PASS] atoms::test_ok"));
        assert!(text.contains("[FAIL] atoms::test_bad: wrong number of output lines: expected 2, got 3"));
        assert!(text.contains("[ERR ] atoms::test_broken: target command is empty"));
        assert!(text.contains("1/3 tests passed, 1 could not run."));
        assert!(!text.contains("[RUN ]"));
    }

    #[test]
    fn filter_selects_by_full_name() {
        let mut out = Vec::new();
        let report = run_tests(&fixtures(), Some("atoms::test_ok"), true, &mut out).unwrap();
        assert_eq!(report.total, 1);
        assert_eq!(report.skipped, 2);
        assert!(report.success());
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("[RUN ] atoms::test_ok"));
        assert!(text.contains("1/1 tests passed (2 filtered out)."));
    }

    #[test]
    fn no_tests_is_a_success() {
        let mut out = Vec::new();
        let report = run_tests(&[], None, false, &mut out).unwrap();
        assert!(report.success());
        assert_eq!(report.total, 0);
    }
}
