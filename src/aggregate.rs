//! Folds a coverage profile into per-file totals and builds the report.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::debug;

use crate::error::{CoverError, Result};
use crate::model::{percentage, CoverageRecord, FileCoverage, FileReport, Report};
use crate::profile::ProfileParser;

/// Accumulates records for one conversion.
#[derive(Debug, Default)]
pub struct Aggregator {
    parser: ProfileParser,
    files: BTreeMap<String, FileCoverage>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a single record to its file's totals.
    pub fn add(&mut self, record: &CoverageRecord) -> std::result::Result<(), &'static str> {
        self.files
            .entry(record.file.clone())
            .or_default()
            .add(record)
    }

    /// Consume a whole profile. Stops at the first bad line.
    pub fn read_profile(&mut self, reader: &mut dyn BufRead) -> Result<()> {
        let mut buf = Vec::new();
        let mut number = 0;
        let mut skipped = 0usize;
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            number += 1;

            let raw_line = std::str::from_utf8(&buf).map_err(|_| CoverError::Format {
                line: number,
                content: String::from_utf8_lossy(&buf).trim_end().to_string(),
                reason: "invalid UTF-8".to_string(),
            })?;

            if self.parser.is_skippable(raw_line) {
                skipped += 1;
                continue;
            }

            let record = self.parser.parse_line(number, raw_line)?;
            self.add(&record).map_err(|reason| CoverError::Format {
                line: number,
                content: raw_line.trim().to_string(),
                reason: reason.to_string(),
            })?;
        }
        debug!(lines = number, skipped, files = self.files.len(), "read profile");
        Ok(())
    }

    /// Compute percentages. The overall figure comes from the summed
    /// statement counts, not from the per-file percentages.
    pub fn finish(self) -> Report {
        let mut statements: u128 = 0;
        let mut covered: u128 = 0;
        let mut file_reports = Vec::with_capacity(self.files.len());

        for (filename, file) in self.files {
            statements += u128::from(file.statements);
            covered += u128::from(file.covered_statements);
            let total = file.percentage();
            debug!(
                file = %filename,
                statements = file.statements,
                covered = file.covered_statements,
                hits = file.hits,
                total,
                "file coverage"
            );
            file_reports.push(FileReport {
                filename,
                total,
                coverage: file.lines,
            });
        }

        Report {
            total: percentage(covered, statements),
            file_reports,
        }
    }
}

/// Read and aggregate the profile at `path`.
pub fn build_report(path: &Path) -> Result<Report> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut aggregator = Aggregator::new();
    aggregator.read_profile(&mut reader)?;
    Ok(aggregator.finish())
}

/// Convert the profile at `path` into Codacy JSON.
pub fn generate_report(path: &Path) -> Result<Vec<u8>> {
    build_report(path)?.to_json()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aggregate(input: &[u8]) -> Result<Report> {
        let mut aggregator = Aggregator::new();
        aggregator.read_profile(&mut &*input)?;
        Ok(aggregator.finish())
    }

    #[test]
    fn test_disjoint_spans() {
        let input = b"mode: count\n\
            example.com/pkg/f.go:1.1,3.10 2 5\n\
            example.com/pkg/f.go:6.1,7.10 1 0\n";
        let report = aggregate(input).unwrap();

        assert_eq!(report.file_reports.len(), 1);
        let file = &report.file_reports[0];
        assert_eq!(file.filename, "example.com/pkg/f.go");
        assert_eq!(
            file.coverage,
            BTreeMap::from([(1, 5), (2, 5), (3, 5), (6, 0), (7, 0)])
        );
        // 2 of 3 statements hit
        assert_eq!(file.total, 66);
        assert_eq!(report.total, 66);
    }

    #[test]
    fn test_ninety_one_percent() {
        let input = b"a.go:1.1,2.1 11 1\na.go:4.1,4.9 1 0\n";
        let report = aggregate(input).unwrap();
        assert_eq!(report.file_reports[0].total, 91);
        assert_eq!(report.total, 91);
    }

    #[test]
    fn test_zero_statements() {
        let report = aggregate(b"a.go:1.1,2.1 0 3\n").unwrap();
        assert_eq!(report.file_reports[0].total, 0);
        assert_eq!(report.total, 0);
        assert_eq!(report.file_reports[0].coverage[&2], 3);
    }

    #[test]
    fn test_total_uses_summed_statements() {
        let input = b"a.go:1.1,1.9 10 1\nb.go:1.1,1.9 10 0\n";
        let report = aggregate(input).unwrap();
        assert_eq!(report.total, 50);

        // Unequal sizes: a mean of per-file percentages would give 50.
        let input = b"a.go:1.1,1.9 1 1\nb.go:1.1,1.9 3 0\n";
        let report = aggregate(input).unwrap();
        assert_eq!(report.file_reports[0].total, 100);
        assert_eq!(report.file_reports[1].total, 0);
        assert_eq!(report.total, 25);
    }

    #[test]
    fn test_skips_blank_and_mode_lines_anywhere() {
        let input = b"\nmode: set\na.go:1.1,1.9 1 1\n\n   \nmode: set\na.go:2.1,2.9 1 0";
        let report = aggregate(input).unwrap();
        assert_eq!(report.file_reports.len(), 1);
        assert_eq!(report.file_reports[0].coverage.len(), 2);
        assert_eq!(report.total, 50);
    }

    #[test]
    fn test_empty_profile() {
        let report = aggregate(b"mode: atomic\n").unwrap();
        assert_eq!(
            report.to_json().unwrap(),
            br#"{"total":0,"fileReports":[]}"#.to_vec()
        );
    }

    #[test]
    fn test_bad_line_aborts_with_position() {
        let input = b"mode: set\na.go:1.1,1.9 1 1\nfile:16.sdvsfbvs\na.go:2.1,2.9 1 1\n";
        match aggregate(input).unwrap_err() {
            CoverError::Format { line, .. } => assert_eq!(line, 3),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_accumulated_overflow_is_format_error() {
        let input = b"a.go:1.1,1.9 18446744073709551615 1\na.go:2.1,2.9 1 1\n";
        match aggregate(input).unwrap_err() {
            CoverError::Format { line, reason, .. } => {
                assert_eq!(line, 2);
                assert_eq!(reason, "statement total overflows");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_reversed_span_counts_statements_only() {
        let input = b"a.go:9.1,3.1 2 4\na.go:10.1,10.9 2 0\n";
        let report = aggregate(input).unwrap();
        let file = &report.file_reports[0];
        assert_eq!(file.coverage, BTreeMap::from([(10, 0)]));
        assert_eq!(file.total, 50);
    }

    #[test]
    fn test_hit_statements_never_exceed_total() {
        let input = b"a.go:1.1,1.9 4 9\na.go:1.1,1.9 4 2\na.go:3.1,3.9 4 0\n";
        let report = aggregate(input).unwrap();
        let file = &report.file_reports[0];
        assert_eq!(file.total, 66);
        assert_eq!(file.coverage[&1], 11);
    }
}
