// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Custom error types for fuzzrace.
//!
//! Explicit enum error types only. No `Box<dyn Error>`, no `anyhow::Result`.
//! Per-cell runner failures are not errors at all: they are carried as
//! [`Outcome`](crate::runner::Outcome) data inside a `RunResult`.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::VariantId;

/// Top-level error type for the harness library.
#[derive(Debug, Error)]
pub enum FuzzraceError {
    // =========================================================================
    // Configuration Errors - Fail-Fast on Invalid Config
    // =========================================================================
    #[error("Hard validation error: {0}")]
    HardValidation(#[from] HardValidationError),

    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    #[error("Configuration parse error: {message}")]
    ConfigParse { message: String },

    // =========================================================================
    // Registry Errors
    // =========================================================================
    #[error("Variant not found: {0}")]
    VariantNotFound(VariantId),

    #[error("Variant already registered: {0}")]
    VariantAlreadyExists(VariantId),

    // =========================================================================
    // Results Matrix Errors
    // =========================================================================
    #[error("Row for {variant} has {actual} cells, expected {expected}")]
    MisalignedRow {
        variant: VariantId,
        expected: usize,
        actual: usize,
    },

    // =========================================================================
    // Kernel Errors
    // =========================================================================
    #[error("Kernel error: {0}")]
    Kernel(#[from] KernelError),

    // =========================================================================
    // System Errors
    // =========================================================================
    #[error("IO error: {context} - {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// Hard validation errors reject a configuration before any variant runs.
#[derive(Debug, Error)]
pub enum HardValidationError {
    #[error("Missing required field: {field} in {context}")]
    MissingRequiredField {
        field: &'static str,
        context: String,
    },

    #[error("Invalid field value: {field} = {value} - {reason}")]
    InvalidFieldValue {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("Duplicate variant ID: {id}")]
    DuplicateVariantId { id: String },

    #[error("Schema validation failed: {message}")]
    SchemaValidation { message: String },
}

/// Errors raised by the mutation kernel. Each one terminates only the
/// invocation that hit it.
#[derive(Debug, Error)]
pub enum KernelError {
    #[error("Invalid argument: {reason}")]
    InvalidArgument { reason: String },

    #[error("Seed file {path}: {source}")]
    SeedFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write mutated buffer: {source}")]
    Output {
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias using FuzzraceError.
pub type FuzzraceResult<T> = Result<T, FuzzraceError>;
