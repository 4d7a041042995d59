// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `fuzzrace validate` command - Validate configuration file.

use fuzzrace_core::{ConfigLoader, TimingSpan};

use super::list::describe;

pub async fn execute(file: &str) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(file = %file, "Validating configuration");

    match ConfigLoader::load_file(file) {
        Ok(config) => {
            let registry = config.registry()?;
            let benchmark = &config.benchmark;

            println!("✓ Configuration is valid");
            println!();
            println!("Benchmark Settings:");
            println!("  PRNG Seed:          {}", benchmark.prng_seed);
            println!("  Iteration Counts:   {:?}", benchmark.iteration_counts);
            println!("  Cell Timeout:       {}ms", benchmark.timeout.as_millis());
            println!(
                "  Timing Span:        {}",
                match benchmark.span {
                    TimingSpan::Total => "total",
                    TimingSpan::RunOnly => "run only",
                }
            );
            println!("  Working Directory:  {}", benchmark.workdir.display());
            println!();

            let source = if config.variants.is_some() {
                "configured"
            } else {
                "built-in"
            };
            println!("Variants ({}, {}):", registry.len(), source);
            for descriptor in registry.iter() {
                println!(
                    "  - {} ({}: {})",
                    descriptor.id,
                    descriptor.kind(),
                    describe(&descriptor.invocation)
                );
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("✗ Configuration validation failed:");
            eprintln!("  {}", e);
            std::process::exit(1);
        }
    }
}
