//! Line-by-line containment check of captured output against annotations.

use crate::error::{LineMismatch, Mismatch};

/// Checks that `actual` has exactly as many lines as `expected` and that each
/// expected line appears somewhere inside the actual line at the same index.
///
/// A count mismatch is reported on its own; per-line checks only run once the
/// counts agree, and then every offending line is reported.
pub fn compare<E, A>(expected: &[E], actual: &[A]) -> Result<(), Mismatch>
where
    E: AsRef<str>,
    A: AsRef<str>,
{
    if expected.len() != actual.len() {
        return Err(Mismatch::OutputCountMismatch {
            expected: expected.len(),
            actual: actual.len(),
        });
    }

    let mismatches: Vec<LineMismatch> = expected
        .iter()
        .zip(actual)
        .enumerate()
        .filter(|(_, (e, a))| !a.as_ref().contains(e.as_ref()))
        .map(|(index, (e, a))| LineMismatch {
            index,
            expected: e.as_ref().to_owned(),
            actual: a.as_ref().to_owned(),
        })
        .collect();

    if mismatches.is_empty() {
        Ok(())
    } else {
        Err(Mismatch::OutputContentMismatch(mismatches))
    }
}
