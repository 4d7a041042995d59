// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `fuzzrace list` command - List variants.
//!
//! Lists the variants from the configuration file, or the built-in
//! variants when no configuration file exists.

use std::path::Path;

use fuzzrace_core::{ConfigLoader, Invocation, VariantRegistry};

/// One-line description of how a variant is invoked.
pub fn describe(invocation: &Invocation) -> String {
    match invocation {
        Invocation::DirectInterpret {
            interpreter,
            program,
        } => format!("{} {}", interpreter, program.display()),
        Invocation::CompileThenRun {
            compiler,
            artifact,
            launcher,
            ..
        } => match launcher {
            Some(launcher) => format!("{} → {} {}", compiler, launcher, artifact.display()),
            None => format!("{} → ./{}", compiler, artifact.display()),
        },
        Invocation::BuildToolManaged {
            tool,
            args,
            project_dir,
        } => format!("{} {} (in {})", tool, args.join(" "), project_dir.display()),
    }
}

pub async fn execute(config_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let registry = if Path::new(config_path).exists() {
        ConfigLoader::load_file(config_path)?.registry()?
    } else {
        tracing::debug!(config = %config_path, "No configuration file, listing built-in variants");
        VariantRegistry::builtin().clone()
    };

    if registry.is_empty() {
        println!("No variants registered.");
        return Ok(());
    }

    println!("╔══════════════════════════════════════════════════════════════════════════════╗");
    println!("║                               FUZZER VARIANTS                                ║");
    println!("╠══════════════╦════════════════════╦══════════════════════════════════════════╣");
    println!("║ ID           ║ Kind               ║ Invocation                               ║");
    println!("╠══════════════╬════════════════════╬══════════════════════════════════════════╣");

    for descriptor in registry.iter() {
        println!(
            "║ {:<12} ║ {:<18} ║ {:<40} ║",
            descriptor.id.as_str(),
            descriptor.kind().to_string(),
            describe(&descriptor.invocation)
        );
    }

    println!("╚══════════════╩════════════════════╩══════════════════════════════════════════╝");
    println!();
    println!("Total: {} variant(s)", registry.len());

    Ok(())
}
