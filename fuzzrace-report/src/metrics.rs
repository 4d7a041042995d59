// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Serializable report document built from a results matrix.

use chrono::{DateTime, Utc};
use fuzzrace_core::{InvocationKind, ResultsMatrix, TimingSpan};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use sysinfo::System;
use uuid::Uuid;

/// System information captured at benchmark time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemInfo {
    /// Operating system name
    pub os: String,
    /// OS version
    pub os_version: String,
    /// Kernel version (Linux)
    pub kernel_version: Option<String>,
    /// CPU model name
    pub cpu_model: String,
    /// Number of CPU cores
    pub cpu_cores: usize,
    /// Total system memory in bytes
    pub memory_bytes: u64,
    /// Hostname
    pub hostname: String,
}

impl SystemInfo {
    /// Collect current system information.
    pub fn collect() -> Self {
        let mut sys = System::new_all();
        sys.refresh_all();

        Self {
            os: System::name().unwrap_or_else(|| "Unknown".to_string()),
            os_version: System::os_version().unwrap_or_else(|| "Unknown".to_string()),
            kernel_version: System::kernel_version(),
            cpu_model: sys
                .cpus()
                .first()
                .map(|cpu| cpu.brand().to_string())
                .unwrap_or_else(|| "Unknown".to_string()),
            cpu_cores: sys.cpus().len(),
            memory_bytes: sys.total_memory(),
            hostname: System::host_name().unwrap_or_else(|| "Unknown".to_string()),
        }
    }
}

/// Format a duration in human-readable form (auto-selects μs/ms/s).
pub fn format_duration(duration: Duration) -> String {
    let ns = duration.as_nanos();
    if ns < 1_000_000 {
        format!("{:.2}μs", ns as f64 / 1_000.0)
    } else if ns < 1_000_000_000 {
        format!("{:.2}ms", ns as f64 / 1_000_000.0)
    } else {
        format!("{:.3}s", duration.as_secs_f64())
    }
}

/// One variant's row as stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariantSeries {
    pub variant: String,
    pub kind: InvocationKind,
    /// Seconds per iteration count; `null` for an absent duration.
    pub durations_secs: Vec<Option<f64>>,
}

/// Complete benchmark report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkReport {
    /// Unique id of this run
    pub run_id: Uuid,
    /// Suite identifier
    pub benchmark_suite: String,
    /// Framework version
    pub version: String,
    /// Timestamp when the report was built
    pub timestamp: DateTime<Utc>,
    /// System information
    pub system_info: SystemInfo,
    pub prng_seed: i64,
    pub span: TimingSpan,
    /// Iteration counts, in run order
    pub iteration_counts: Vec<u64>,
    pub variants: Vec<VariantSeries>,
}

impl BenchmarkReport {
    /// Build a report from a completed matrix.
    pub fn from_matrix(matrix: &ResultsMatrix) -> Self {
        let variants = matrix
            .rows()
            .iter()
            .map(|row| VariantSeries {
                variant: row.variant.to_string(),
                kind: row.kind,
                durations_secs: row
                    .cells
                    .iter()
                    .map(|cell| cell.map(|d| d.as_secs_f64()))
                    .collect(),
            })
            .collect();

        Self {
            run_id: Uuid::new_v4(),
            benchmark_suite: "fuzzrace".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: Utc::now(),
            system_info: SystemInfo::collect(),
            prng_seed: matrix.prng_seed(),
            span: matrix.span(),
            iteration_counts: matrix.iteration_counts().to_vec(),
            variants,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fuzzrace_core::{MatrixRow, VariantId};

    fn sample_matrix() -> ResultsMatrix {
        let mut matrix = ResultsMatrix::new(12345, TimingSpan::Total, vec![1000, 5000]);
        matrix
            .push_row(MatrixRow {
                variant: VariantId::new("c").unwrap(),
                kind: InvocationKind::CompileThenRun,
                cells: vec![Some(Duration::from_millis(20)), Some(Duration::from_millis(90))],
            })
            .unwrap();
        matrix
            .push_row(MatrixRow {
                variant: VariantId::new("python").unwrap(),
                kind: InvocationKind::DirectInterpret,
                cells: vec![Some(Duration::from_millis(10)), None],
            })
            .unwrap();
        matrix
    }

    #[test]
    fn test_duration_format() {
        assert_eq!(format_duration(Duration::from_nanos(1500)), "1.50μs");
        assert_eq!(format_duration(Duration::from_micros(1500)), "1.50ms");
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.500s");
    }

    #[test]
    fn test_report_from_matrix() {
        let report = BenchmarkReport::from_matrix(&sample_matrix());
        assert_eq!(report.prng_seed, 12345);
        assert_eq!(report.iteration_counts, vec![1000, 5000]);
        assert_eq!(report.variants.len(), 2);
        assert_eq!(report.variants[1].durations_secs, vec![Some(0.01), None]);
    }

    #[test]
    fn test_report_serialization() {
        let report = BenchmarkReport::from_matrix(&sample_matrix());
        let json = serde_json::to_string_pretty(&report).unwrap();
        assert!(json.contains("\"compile-then-run\""));
        assert!(json.contains("null"));
        assert!(json.contains("iteration_counts"));
    }

    #[test]
    fn test_system_info_collect() {
        let info = SystemInfo::collect();
        assert!(!info.os.is_empty());
        assert!(info.cpu_cores > 0);
    }
}
