//! Expected-output annotations embedded in fixtures.
//!
//! An annotation is any line containing `;OUTPUT: `; everything after the
//! first occurrence of the marker, up to the line terminator, is one expected
//! output line.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use crate::error::FixtureReadError;

pub const MARKER: &str = ";OUTPUT: ";

/// Returns the annotation body of `line`, if it carries one.
pub fn parse_line(line: &str) -> Option<&str> {
    line.find(MARKER).map(|at| &line[at + MARKER.len()..])
}

/// Streams `reader` line by line and collects annotation bodies in order.
pub fn extract_from_reader<R: BufRead>(mut reader: R) -> io::Result<Vec<String>> {
    let mut expected = Vec::new();
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        let line = String::from_utf8_lossy(strip_terminator(&buf));
        if let Some(body) = parse_line(&line) {
            expected.push(body.to_owned());
        }
    }
    Ok(expected)
}

/// Reads the fixture at `path` and returns its expected output lines.
pub fn extract(path: &Path) -> Result<Vec<String>, FixtureReadError> {
    let wrap = |source| FixtureReadError {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(wrap)?;
    extract_from_reader(BufReader::new(file)).map_err(wrap)
}

fn strip_terminator(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}
