//! Builds suites from fixture directories and turns their cases into runnable tests.
//!
//! Building (discovery and annotation extraction) happens eagerly and can fail
//! with a [`SuiteError`]. Running happens later, once per registered test.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::info;

use crate::case::TestCase;
use crate::compare::compare;
use crate::config::{HarnessConfig, DEFAULT_SUITES};
use crate::error::{CaseFailure, FixtureReadError, SuiteError};
use crate::executor;
use crate::fixtures;

/// A suite name and the directory its fixtures live in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuiteSpec {
    pub name: String,
    pub dir: PathBuf,
}

impl SuiteSpec {
    /// Parses `NAME` (directory `root/NAME`) or `NAME=DIR` (relative `DIR` is joined to `root`).
    pub fn parse(arg: &str, root: &Path) -> Result<Self, String> {
        let (name, dir) = match arg.split_once('=') {
            Some((name, dir)) => (name, PathBuf::from(dir)),
            None => (arg, PathBuf::from(arg)),
        };
        if name.is_empty() {
            return Err(format!("suite `{arg}` has an empty name"));
        }
        if dir.as_os_str().is_empty() {
            return Err(format!("suite `{name}` has an empty directory"));
        }
        Ok(Self {
            name: name.to_owned(),
            dir: root.join(dir),
        })
    }

    /// The reference suites, each in a same-named directory under `root`.
    pub fn defaults(root: &Path) -> Vec<Self> {
        DEFAULT_SUITES
            .iter()
            .map(|name| Self {
                name: (*name).to_owned(),
                dir: root.join(name),
            })
            .collect()
    }
}

/// A named, ordered group of test cases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suite {
    name: String,
    cases: Vec<TestCase>,
}

impl Suite {
    /// Discovers the fixtures in `dir` and extracts their annotations.
    ///
    /// Every fixture is read even when some fail, and all read failures are
    /// reported together. Two fixtures deriving the same test name are an error.
    pub fn build(name: &str, dir: &Path) -> Result<Self, SuiteError> {
        let paths = fixtures::discover(dir)?;

        let mut cases = Vec::with_capacity(paths.len());
        let mut errors: Vec<FixtureReadError> = Vec::new();
        for path in &paths {
            match TestCase::from_fixture(path) {
                Ok(case) => cases.push(case),
                Err(err) => errors.push(err),
            }
        }
        if !errors.is_empty() {
            return Err(SuiteError::UnreadableFixtures {
                suite: name.to_owned(),
                errors,
            });
        }

        let mut seen: HashMap<&str, &Path> = HashMap::new();
        for case in &cases {
            if let Some(first) = seen.insert(case.name(), case.fixture()) {
                return Err(SuiteError::NameCollision {
                    suite: name.to_owned(),
                    name: case.name().to_owned(),
                    first: first.to_path_buf(),
                    second: case.fixture().to_path_buf(),
                });
            }
        }

        info!(suite = name, dir = %dir.display(), cases = cases.len(), "built suite");
        Ok(Self {
            name: name.to_owned(),
            cases,
        })
    }

    pub fn from_spec(spec: &SuiteSpec) -> Result<Self, SuiteError> {
        Self::build(&spec.name, &spec.dir)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cases(&self) -> &[TestCase] {
        &self.cases
    }

    /// One runnable test per case, in case order, all sharing `config`.
    pub fn register(&self, config: &Arc<HarnessConfig>) -> Vec<RegisteredTest> {
        self.cases
            .iter()
            .map(|case| {
                let config = Arc::clone(config);
                let case = case.clone();
                RegisteredTest {
                    suite: self.name.clone(),
                    name: case.name().to_owned(),
                    body: Box::new(move || check_case(&config, &case)),
                }
            })
            .collect()
    }
}

pub type TestFn = Box<dyn Fn() -> Result<(), CaseFailure> + Send + Sync>;

/// A test ready to hand to a reporter: its group, its name and its body.
pub struct RegisteredTest {
    pub suite: String,
    pub name: String,
    pub body: TestFn,
}

impl RegisteredTest {
    /// `suite::name`.
    pub fn full_name(&self) -> String {
        format!("{}::{}", self.suite, self.name)
    }

    pub fn run(&self) -> Result<(), CaseFailure> {
        (self.body)()
    }
}

impl fmt::Debug for RegisteredTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredTest")
            .field("suite", &self.suite)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Runs the target on `case`'s fixture and checks the output against its annotations.
pub fn check_case(config: &HarnessConfig, case: &TestCase) -> Result<(), CaseFailure> {
    let output = executor::run(config, case.fixture())?;
    if let Err(mismatch) = compare(case.expected(), output.lines.as_slice()) {
        return Err(CaseFailure::Mismatch {
            mismatch,
            status: output.status.to_string(),
            output: output.text(),
        });
    }
    if config.fail_on_nonzero_exit && !output.status.success() {
        return Err(CaseFailure::ExitStatus {
            status: output.status.to_string(),
            output: output.text(),
        });
    }
    Ok(())
}

/// Builds every suite, stopping at the first one that fails.
pub fn build_all(specs: &[SuiteSpec]) -> Result<Vec<Suite>, SuiteError> {
    specs.iter().map(Suite::from_spec).collect()
}

/// Registers the tests of every suite, suite by suite.
pub fn register_all(suites: &[Suite], config: &Arc<HarnessConfig>) -> Vec<RegisteredTest> {
    suites.iter().flat_map(|s| s.register(config)).collect()
}
