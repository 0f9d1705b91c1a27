//! Line parser for `go test -coverprofile` output.
//!
//! A profile optionally opens with `mode: set|count|atomic`; every other
//! non-blank line is one basic block:
//!
//! ```text
//! <file>:<startLine>.<startCol>,<endLine>.<endCol> <numStatements> <count>
//! ```
//!
//! Block positions always carry both ends. A bare line number is rejected.

use std::str::FromStr;

use regex::{Captures, Regex};

use crate::error::{CoverError, Result};
use crate::model::{CoverageRecord, Span};

const BLOCK_PATTERN: &str =
    r"^([A-Za-z0-9/\\._\-]+):(\d+)\.(\d+),(\d+)\.(\d+) (\d+) (\d+)$";

const MODE_PREFIX: &str = "mode:";

/// Go coverage profile line parser. Owns its compiled matcher.
#[derive(Debug, Clone)]
pub struct ProfileParser {
    block: Regex,
}

impl Default for ProfileParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ProfileParser {
    pub fn new() -> Self {
        Self {
            // The pattern is a constant; failing to compile it is a bug.
            block: Regex::new(BLOCK_PATTERN).expect("block pattern is valid"),
        }
    }

    /// Blank lines and mode declarations carry no coverage data.
    pub fn is_skippable(&self, line: &str) -> bool {
        let line = line.trim();
        line.is_empty() || line.starts_with(MODE_PREFIX)
    }

    /// Parse one data line. `number` is the 1-based position in the
    /// profile and only used for error reporting.
    pub fn parse_line(&self, number: usize, line: &str) -> Result<CoverageRecord> {
        let text = line.trim();
        let fail = |reason: &str| CoverError::Format {
            line: number,
            content: text.to_string(),
            reason: reason.to_string(),
        };

        let caps = self.block.captures(text).ok_or_else(|| {
            fail("expected <file>:<startLine>.<startCol>,<endLine>.<endCol> <statements> <count>")
        })?;

        let span = Span {
            start_line: field(&caps, 2).ok_or_else(|| fail("start line out of range"))?,
            start_col: field(&caps, 3).ok_or_else(|| fail("start column out of range"))?,
            end_line: field(&caps, 4).ok_or_else(|| fail("end line out of range"))?,
            end_col: field(&caps, 5).ok_or_else(|| fail("end column out of range"))?,
        };
        Ok(CoverageRecord {
            file: caps[1].to_string(),
            span,
            statements: field(&caps, 6).ok_or_else(|| fail("statement count out of range"))?,
            hits: field(&caps, 7).ok_or_else(|| fail("hit count out of range"))?,
        })
    }
}

/// The pattern only lets digits through, so a failed parse means overflow.
fn field<T: FromStr>(caps: &Captures<'_>, index: usize) -> Option<T> {
    caps.get(index)?.as_str().parse().ok()
}
