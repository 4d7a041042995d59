// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Reference fuzzer.
//!
//! `fuzzer <prng_seed> <iterations>` mutates the seed buffer in `./_seed_`
//! and writes the result to stdout as raw bytes. Diagnostics go to stderr.

use fuzzrace_core::{KernelError, SeedFile};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: fuzzer <prng_seed> <iterations>";

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let seed_file = SeedFile::in_dir(".");
    if let Err(e) = fuzzrace_core::kernel::run_cli(std::env::args_os().skip(1), &seed_file) {
        tracing::error!(error = %e, "fuzzer failed");
        if matches!(e, KernelError::InvalidArgument { .. }) {
            eprintln!("{}", USAGE);
        }
        std::process::exit(1);
    }
}
