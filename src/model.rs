//! In-memory representation of a Go coverage profile while it is being
//! aggregated, and the Codacy report shape it is turned into.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Integer coverage percentage, floored, 0 when there is nothing to cover.
#[must_use]
pub fn percentage(covered: u128, total: u128) -> u32 {
    if total == 0 {
        0
    } else {
        // covered <= total, so the quotient is at most 100
        (covered * 100 / total) as u32
    }
}

/// Source positions of one basic block: `startLine.startCol,endLine.endCol`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start_line: u32,
    pub start_col: u32,
    pub end_line: u32,
    pub end_col: u32,
}

impl Span {
    /// Every line the block touches, both ends included.
    pub fn lines(&self) -> std::ops::RangeInclusive<u32> {
        self.start_line..=self.end_line
    }
}

/// A single data line of the profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverageRecord {
    pub file: String,
    pub span: Span,
    pub statements: u64,
    pub hits: u64,
}

/// Running totals for one source file.
#[derive(Debug, Clone, Default)]
pub struct FileCoverage {
    pub statements: u64,
    pub covered_statements: u64,
    pub hits: u64,
    pub lines: BTreeMap<u32, u64>,
}

impl FileCoverage {
    /// Fold one record into the totals. Fails instead of wrapping when a
    /// sum no longer fits.
    pub fn add(&mut self, record: &CoverageRecord) -> std::result::Result<(), &'static str> {
        self.statements = self
            .statements
            .checked_add(record.statements)
            .ok_or("statement total overflows")?;
        if record.hits > 0 {
            self.covered_statements += record.statements;
        }
        self.hits = self
            .hits
            .checked_add(record.hits)
            .ok_or("hit total overflows")?;

        for line in record.span.lines() {
            let entry = self.lines.entry(line).or_insert(0);
            *entry = entry
                .checked_add(record.hits)
                .ok_or("line hit count overflows")?;
        }
        Ok(())
    }

    #[must_use]
    pub fn percentage(&self) -> u32 {
        percentage(self.covered_statements.into(), self.statements.into())
    }
}

/// The payload Codacy expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub total: u32,
    pub file_reports: Vec<FileReport>,
}

/// Per-file entry of a [`Report`]. Line numbers become string keys in JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileReport {
    pub filename: String,
    pub total: u32,
    pub coverage: BTreeMap<u32, u64>,
}

impl Report {
    pub fn to_json(&self) -> crate::error::Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn to_json_pretty(&self) -> crate::error::Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }
}
