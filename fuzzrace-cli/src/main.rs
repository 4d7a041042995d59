// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! fuzzrace CLI
//!
//! Command-line interface for benchmarking fuzzer implementations.

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

/// fuzzrace - Cross-language fuzzer benchmark harness
#[derive(Parser)]
#[command(name = "fuzzrace")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "fuzzrace.yaml")]
    pub config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run every variant at every iteration count
    Run {
        /// Override the PRNG seed passed to every variant (signed 64-bit)
        #[arg(long, allow_negative_numbers = true)]
        seed: Option<i64>,

        /// Override iteration counts (comma separated, run in the given order)
        #[arg(long, value_delimiter = ',')]
        iterations: Option<Vec<u64>>,

        /// Only run the named variants
        #[arg(long, value_delimiter = ',')]
        only: Vec<String>,

        /// Directory for JSON reports
        #[arg(short, long, default_value = "data")]
        output: String,

        /// Skip writing the JSON report
        #[arg(long)]
        no_json: bool,
    },

    /// List configured variants
    List,

    /// Validate a configuration file
    Validate {
        /// Path to the configuration file
        file: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG wins over the verbosity flag
    let log_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run {
            seed,
            iterations,
            only,
            output,
            no_json,
        } => {
            let overrides = commands::run::Overrides {
                seed,
                iterations,
                only,
            };
            let output = (!no_json).then_some(output);
            commands::run::execute(&cli.config, overrides, output.as_deref()).await
        }
        Commands::List => commands::list::execute(&cli.config).await,
        Commands::Validate { file } => commands::validate::execute(&file).await,
    }
}
