use std::path::{Path, PathBuf};

use crate::annotation;
use crate::error::FixtureReadError;

/// One fixture and the output it expects. Built at discovery time, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    name: String,
    fixture: PathBuf,
    expected: Vec<String>,
}

impl TestCase {
    pub fn new(name: impl Into<String>, fixture: impl Into<PathBuf>, expected: Vec<String>) -> Self {
        Self {
            name: name.into(),
            fixture: fixture.into(),
            expected,
        }
    }

    /// Reads `fixture` and builds its case, naming it after the file stem.
    pub fn from_fixture(fixture: &Path) -> Result<Self, FixtureReadError> {
        let expected = annotation::extract(fixture)?;
        Ok(Self::new(derive_name(fixture), fixture, expected))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fixture(&self) -> &Path {
        &self.fixture
    }

    pub fn expected(&self) -> &[String] {
        &self.expected
    }
}

/// `test_` followed by the file stem, with anything outside `[A-Za-z0-9_]` mapped to `_`.
pub fn derive_name(fixture: &Path) -> String {
    let stem = fixture
        .file_stem()
        .map(|s| s.to_string_lossy())
        .unwrap_or_default();
    let mut name = String::with_capacity(stem.len() + 5);
    name.push_str("test_");
    name.extend(stem.chars().map(|c| {
        if c.is_ascii_alphanumeric() || c == '_' {
            c
        } else {
            '_'
        }
    }));
    name
}
