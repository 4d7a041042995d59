// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! fuzzrace Report Sinks
//!
//! Turns a completed results matrix into output:
//! - Console table with absent cells shown as gaps
//! - Timestamped JSON reports for later plotting
//! - Host metadata captured alongside each run

pub mod metrics;
pub mod reporter;
pub mod sink;

pub use metrics::{format_duration, BenchmarkReport, SystemInfo, VariantSeries};
pub use reporter::{JsonReporter, ReportError};
pub use sink::{ReportOutput, ReportSink, TableSink, ABSENT};
