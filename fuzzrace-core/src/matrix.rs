// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Results matrix: one row of optional durations per variant, index-aligned
//! with the iteration counts of the run.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::TimingSpan;
use crate::error::{FuzzraceError, FuzzraceResult};
use crate::registry::InvocationKind;
use crate::types::VariantId;

/// Measurements for one variant. `None` marks an absent duration, which is
/// distinct from a zero duration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixRow {
    pub variant: VariantId,
    pub kind: InvocationKind,
    pub cells: Vec<Option<Duration>>,
}

impl MatrixRow {
    pub fn new(variant: VariantId, kind: InvocationKind) -> Self {
        Self {
            variant,
            kind,
            cells: Vec::new(),
        }
    }

    /// Number of cells holding a measurement.
    pub fn present_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Iterate `(iterations, duration)` pairs that hold a measurement.
    pub fn present<'a>(
        &'a self,
        iteration_counts: &'a [u64],
    ) -> impl Iterator<Item = (u64, Duration)> + 'a {
        iteration_counts
            .iter()
            .zip(self.cells.iter())
            .filter_map(|(&n, cell)| cell.map(|d| (n, d)))
    }
}

/// Complete benchmark output handed to a report sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultsMatrix {
    prng_seed: i64,
    span: TimingSpan,
    iteration_counts: Vec<u64>,
    rows: Vec<MatrixRow>,
}

impl ResultsMatrix {
    pub fn new(prng_seed: i64, span: TimingSpan, iteration_counts: Vec<u64>) -> Self {
        Self {
            prng_seed,
            span,
            iteration_counts,
            rows: Vec::new(),
        }
    }

    /// Append a row. The row must have one cell per iteration count and a
    /// variant id not already present.
    pub fn push_row(&mut self, row: MatrixRow) -> FuzzraceResult<()> {
        if row.cells.len() != self.iteration_counts.len() {
            return Err(FuzzraceError::MisalignedRow {
                variant: row.variant,
                expected: self.iteration_counts.len(),
                actual: row.cells.len(),
            });
        }
        if self.get(&row.variant).is_some() {
            return Err(FuzzraceError::VariantAlreadyExists(row.variant));
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn prng_seed(&self) -> i64 {
        self.prng_seed
    }

    pub fn span(&self) -> TimingSpan {
        self.span
    }

    pub fn iteration_counts(&self) -> &[u64] {
        &self.iteration_counts
    }

    /// Rows in registration order.
    pub fn rows(&self) -> &[MatrixRow] {
        &self.rows
    }

    pub fn get(&self, variant: &VariantId) -> Option<&MatrixRow> {
        self.rows.iter().find(|r| &r.variant == variant)
    }

    pub fn variant_count(&self) -> usize {
        self.rows.len()
    }

    /// Total number of present cells across all rows.
    pub fn present_count(&self) -> usize {
        self.rows.iter().map(MatrixRow::present_count).sum()
    }

    /// Fastest present measurement in column `col`, if any.
    pub fn fastest(&self, col: usize) -> Option<(&VariantId, Duration)> {
        self.rows
            .iter()
            .filter_map(|r| r.cells.get(col).copied().flatten().map(|d| (&r.variant, d)))
            .min_by_key(|(_, d)| *d)
    }

    /// True when every cell holds a measurement.
    pub fn is_complete(&self) -> bool {
        self.rows.iter().all(|r| r.cells.iter().all(Option::is_some))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, cells: Vec<Option<Duration>>) -> MatrixRow {
        MatrixRow {
            variant: VariantId::new(name).unwrap(),
            kind: InvocationKind::DirectInterpret,
            cells,
        }
    }

    #[test]
    fn test_push_row_alignment() {
        let mut matrix = ResultsMatrix::new(1, TimingSpan::Total, vec![10, 20]);

        let short = row("py", vec![Some(Duration::from_millis(1))]);
        assert!(matches!(
            matrix.push_row(short),
            Err(FuzzraceError::MisalignedRow {
                expected: 2,
                actual: 1,
                ..
            })
        ));

        matrix
            .push_row(row("py", vec![Some(Duration::from_millis(1)), None]))
            .unwrap();
        assert!(matrix.push_row(row("py", vec![None, None])).is_err());
        assert_eq!(matrix.variant_count(), 1);
    }

    #[test]
    fn test_present_and_complete() {
        let mut matrix = ResultsMatrix::new(1, TimingSpan::Total, vec![10, 20, 30]);
        let ms = Duration::from_millis;
        matrix
            .push_row(row("c", vec![Some(ms(1)), Some(ms(2)), Some(ms(3))]))
            .unwrap();
        matrix
            .push_row(row("java", vec![None, Some(ms(5)), None]))
            .unwrap();

        assert_eq!(matrix.present_count(), 4);
        assert!(!matrix.is_complete());

        let java = matrix.get(&VariantId::new("java").unwrap()).unwrap();
        let present: Vec<_> = java.present(matrix.iteration_counts()).collect();
        assert_eq!(present, vec![(20, ms(5))]);
    }

    #[test]
    fn test_fastest_skips_absent_cells() {
        let mut matrix = ResultsMatrix::new(1, TimingSpan::Total, vec![10, 20, 30]);
        let ms = Duration::from_millis;
        matrix
            .push_row(row("c", vec![Some(ms(9)), Some(ms(2)), None]))
            .unwrap();
        matrix
            .push_row(row("python", vec![Some(ms(4)), None, None]))
            .unwrap();

        let name = |col| matrix.fastest(col).map(|(id, d)| (id.as_str().to_string(), d));
        assert_eq!(name(0), Some(("python".to_string(), ms(4))));
        assert_eq!(name(1), Some(("c".to_string(), ms(2))));
        assert_eq!(name(2), None);
        assert_eq!(name(3), None);
    }

    #[test]
    fn test_absent_is_not_zero() {
        let mut matrix = ResultsMatrix::new(1, TimingSpan::Total, vec![0]);
        matrix
            .push_row(row("zero", vec![Some(Duration::ZERO)]))
            .unwrap();
        assert!(matrix.is_complete());
        assert_eq!(matrix.present_count(), 1);
    }
}
