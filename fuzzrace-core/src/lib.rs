// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! fuzzrace Core Library
//!
//! Benchmarks functionally identical fuzzer implementations against each
//! other. Provides the deterministic mutation kernel, the variant registry,
//! the process runner, and the orchestrator that builds the results matrix.

pub mod config;
pub mod error;
pub mod kernel;
pub mod matrix;
pub mod orchestrator;
pub mod registry;
pub mod runner;
pub mod types;

// Re-export commonly used types
pub use config::{BenchmarkConfig, Config, ConfigLoader, TimingSpan};
pub use error::{FuzzraceError, FuzzraceResult, HardValidationError, KernelError};
pub use kernel::{KernelArgs, Mutator, SeedBuffer, SeedFile};
pub use matrix::{MatrixRow, ResultsMatrix};
pub use orchestrator::Orchestrator;
pub use registry::{Invocation, InvocationKind, VariantDescriptor, VariantRegistry};
pub use runner::{CellRunner, Outcome, ProcessRunner, RunRequest, RunResult};
pub use types::{ToolName, VariantId};
