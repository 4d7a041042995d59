// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Report sinks consume a completed results matrix.

use std::fmt::Write as _;
use std::path::PathBuf;

use fuzzrace_core::{ResultsMatrix, TimingSpan};

use crate::metrics::format_duration;
use crate::reporter::ReportError;

/// Placeholder shown for an absent duration.
pub const ABSENT: &str = "—";

/// What a sink produced.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportOutput {
    /// Rendered text, ready to print.
    Text(String),
    /// A file written to disk.
    File(PathBuf),
}

/// Consumer of a results matrix.
///
/// Implementations must treat absent cells as gaps, never as zero.
pub trait ReportSink {
    fn emit(&self, matrix: &ResultsMatrix) -> Result<ReportOutput, ReportError>;
}

/// Console table: one row per variant, one column per iteration count.
#[derive(Debug, Default, Clone)]
pub struct TableSink;

impl TableSink {
    pub fn new() -> Self {
        Self
    }

    /// Render the matrix to a string.
    pub fn render(&self, matrix: &ResultsMatrix) -> String {
        let counts = matrix.iteration_counts();
        let name_width = matrix
            .rows()
            .iter()
            .map(|r| r.variant.as_str().chars().count())
            .max()
            .unwrap_or(0)
            .max("Variant".len());

        let cells: Vec<Vec<String>> = matrix
            .rows()
            .iter()
            .map(|row| {
                row.cells
                    .iter()
                    .map(|cell| cell.map(format_duration).unwrap_or_else(|| ABSENT.to_string()))
                    .collect()
            })
            .collect();

        let col_widths: Vec<usize> = counts
            .iter()
            .enumerate()
            .map(|(col, n)| {
                cells
                    .iter()
                    .map(|row| row[col].chars().count())
                    .max()
                    .unwrap_or(0)
                    .max(n.to_string().len())
            })
            .collect();

        let span = match matrix.span() {
            TimingSpan::Total => "total",
            TimingSpan::RunOnly => "run only",
        };

        let mut out = String::new();
        let _ = writeln!(
            out,
            "Fuzzer benchmark (prng_seed {}, {} timing)",
            matrix.prng_seed(),
            span
        );

        let rule_len = name_width + col_widths.iter().map(|w| w + 3).sum::<usize>() + 2;
        let rule = "─".repeat(rule_len);
        let _ = writeln!(out, "{}", rule);

        let _ = write!(out, "  {:<width$}", "Variant", width = name_width);
        for (n, w) in counts.iter().zip(&col_widths) {
            let _ = write!(out, " │ {:>width$}", n, width = *w);
        }
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", rule);

        for (row, row_cells) in matrix.rows().iter().zip(&cells) {
            let _ = write!(out, "  {:<width$}", row.variant.as_str(), width = name_width);
            for (cell, w) in row_cells.iter().zip(&col_widths) {
                let pad = w.saturating_sub(cell.chars().count());
                let _ = write!(out, " │ {}{}", " ".repeat(pad), cell);
            }
            let _ = writeln!(out);
        }
        let _ = writeln!(out, "{}", rule);

        for (col, n) in counts.iter().enumerate() {
            match matrix.fastest(col) {
                Some((id, d)) => {
                    let _ = writeln!(out, "  fastest at {}: {} ({})", n, id, format_duration(d));
                }
                None => {
                    let _ = writeln!(out, "  fastest at {}: {}", n, ABSENT);
                }
            }
        }

        out
    }
}

impl ReportSink for TableSink {
    fn emit(&self, matrix: &ResultsMatrix) -> Result<ReportOutput, ReportError> {
        Ok(ReportOutput::Text(self.render(matrix)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fuzzrace_core::{InvocationKind, MatrixRow, VariantId};
    use std::time::Duration;

    fn matrix() -> ResultsMatrix {
        let mut matrix = ResultsMatrix::new(12345, TimingSpan::Total, vec![1000, 100000]);
        matrix
            .push_row(MatrixRow {
                variant: VariantId::new("python").unwrap(),
                kind: InvocationKind::DirectInterpret,
                cells: vec![Some(Duration::from_millis(40)), None],
            })
            .unwrap();
        matrix
            .push_row(MatrixRow {
                variant: VariantId::new("c").unwrap(),
                kind: InvocationKind::CompileThenRun,
                cells: vec![Some(Duration::from_millis(120)), Some(Duration::from_millis(300))],
            })
            .unwrap();
        matrix
    }

    #[test]
    fn test_table_shows_absent_marker() {
        let text = TableSink::new().render(&matrix());
        let python_line = text
            .lines()
            .find(|l| l.trim_start().starts_with("python"))
            .unwrap();
        assert!(python_line.contains("40.00ms"));
        assert!(python_line.contains(ABSENT));
        assert!(!python_line.contains("0.00μs"));
    }

    #[test]
    fn test_table_header_and_fastest() {
        let text = TableSink::new().render(&matrix());
        assert!(text.contains("prng_seed 12345"));
        assert!(text.contains("100000"));
        assert!(text.contains("fastest at 1000: python (40.00ms)"));
        assert!(text.contains("fastest at 100000: c (300.00ms)"));
    }

    #[test]
    fn test_all_absent_column() {
        let mut matrix = ResultsMatrix::new(1, TimingSpan::RunOnly, vec![10]);
        matrix
            .push_row(MatrixRow {
                variant: VariantId::new("java").unwrap(),
                kind: InvocationKind::CompileThenRun,
                cells: vec![None],
            })
            .unwrap();

        let output = TableSink::new().emit(&matrix).unwrap();
        let ReportOutput::Text(text) = output else {
            panic!("expected text output");
        };
        assert!(text.contains("run only"));
        assert!(text.contains(&format!("fastest at 10: {}", ABSENT)));
    }
}
