// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `fuzzrace run` command - Benchmark every variant.
//!
//! Loads the configuration, applies command-line overrides, runs the
//! full matrix and hands it to the report sinks.

use std::path::Path;

use fuzzrace_core::{Config, ConfigLoader, Orchestrator, ProcessRunner, VariantId};
use fuzzrace_report::{JsonReporter, ReportOutput, ReportSink, TableSink};

/// Command-line values that take precedence over the configuration file.
#[derive(Debug, Default)]
pub struct Overrides {
    pub seed: Option<i64>,
    pub iterations: Option<Vec<u64>>,
    pub only: Vec<String>,
}

/// Load the config, or fall back to defaults when the file is absent and
/// iteration counts were given on the command line.
fn load_config(
    config_path: &str,
    overrides: &Overrides,
) -> Result<Config, Box<dyn std::error::Error>> {
    if !Path::new(config_path).exists() {
        if let Some(counts) = &overrides.iterations {
            tracing::info!(
                config = %config_path,
                "Configuration file not found, using built-in defaults"
            );
            return Ok(Config::with_iteration_counts(counts.clone())?);
        }
    }
    Ok(ConfigLoader::load_file(config_path)?)
}

pub async fn execute(
    config_path: &str,
    overrides: Overrides,
    output_dir: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = load_config(config_path, &overrides)?;

    if let Some(seed) = overrides.seed {
        config.benchmark.prng_seed = seed;
    }
    if let Some(counts) = overrides.iterations {
        config.set_iteration_counts(counts)?;
    }

    let mut registry = config.registry()?;
    if !overrides.only.is_empty() {
        let keep = overrides
            .only
            .iter()
            .map(|id| VariantId::new(id.as_str()))
            .collect::<Result<Vec<_>, _>>()?;
        registry.retain_ids(&keep)?;
    }

    let benchmark = &config.benchmark;
    tracing::info!(
        config = %config_path,
        workdir = %benchmark.workdir.display(),
        variants = registry.len(),
        iteration_counts = ?benchmark.iteration_counts,
        "Starting fuzzer benchmark"
    );

    let runner = ProcessRunner::new(&benchmark.workdir).with_timeout(benchmark.timeout);
    let matrix = Orchestrator::new(runner)
        .with_span(benchmark.span)
        .run_all(benchmark.prng_seed, &benchmark.iteration_counts, &registry)
        .await;

    if let ReportOutput::Text(table) = TableSink::new().emit(&matrix)? {
        println!();
        print!("{}", table);
    }

    if let Some(dir) = output_dir {
        let reporter = JsonReporter::new(dir)?;
        if let ReportOutput::File(path) = reporter.emit(&matrix)? {
            println!();
            println!("Report saved to {}", path.display());
        }
    }

    Ok(())
}
