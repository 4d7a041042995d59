// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! YAML configuration parser with strict schema validation.
//!
//! Any invalid field results in a HardValidationError before a single
//! variant is invoked.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{FuzzraceError, FuzzraceResult, HardValidationError};
use crate::registry::{Invocation, VariantDescriptor, VariantRegistry};
use crate::types::{ToolName, VariantId};

/// Upper bound on a single cell's timeout: one day.
const MAX_TIMEOUT_MS: u64 = 86_400_000;

/// Which elapsed span goes into the results matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimingSpan {
    /// Build start to run end (equal to the run span for non-compiled variants).
    #[default]
    Total,
    /// Run step only.
    #[serde(alias = "run")]
    RunOnly,
}

/// Raw benchmark section as parsed from YAML (before validation).
#[derive(Debug, Deserialize)]
struct RawBenchmarkConfig {
    #[serde(default = "default_prng_seed")]
    prng_seed: i64,
    #[serde(default)]
    iteration_counts: Vec<u64>,
    #[serde(default = "default_timeout_ms")]
    timeout_ms: u64,
    #[serde(default)]
    span: TimingSpan,
    #[serde(default = "default_workdir")]
    workdir: String,
}

fn default_prng_seed() -> i64 {
    12345
}

fn default_timeout_ms() -> u64 {
    600_000 // 10 minutes
}

fn default_workdir() -> String {
    ".".to_string()
}

/// Raw variant entry, tagged by invocation kind.
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
enum RawVariant {
    DirectInterpret {
        id: String,
        interpreter: String,
        program: String,
    },
    CompileThenRun {
        id: String,
        compiler: String,
        #[serde(default)]
        compile_args: Vec<String>,
        program: String,
        artifact: String,
        #[serde(default)]
        launcher: Option<String>,
    },
    BuildToolManaged {
        id: String,
        tool: String,
        #[serde(default)]
        args: Vec<String>,
        #[serde(default = "default_workdir")]
        project_dir: String,
    },
}

impl RawVariant {
    fn id(&self) -> &str {
        match self {
            Self::DirectInterpret { id, .. }
            | Self::CompileThenRun { id, .. }
            | Self::BuildToolManaged { id, .. } => id,
        }
    }
}

/// Raw root configuration file.
#[derive(Debug, Deserialize)]
struct RawConfig {
    benchmark: RawBenchmarkConfig,
    #[serde(default)]
    variants: Option<Vec<RawVariant>>,
}

/// Validated benchmark parameters.
#[derive(Debug, Clone)]
pub struct BenchmarkConfig {
    /// Signed 64-bit seed passed verbatim to every variant. Values above
    /// `i64::MAX` are rejected; the kernel reads a negative seed as the
    /// `u64` with the same bits, so `-1` selects the same stream as
    /// `u64::MAX`.
    pub prng_seed: i64,
    pub iteration_counts: Vec<u64>,
    pub timeout: Duration,
    pub span: TimingSpan,
    pub workdir: PathBuf,
}

/// Complete validated configuration.
#[derive(Debug)]
pub struct Config {
    pub benchmark: BenchmarkConfig,
    /// Explicit variants; `None` means the built-in registry.
    pub variants: Option<Vec<VariantDescriptor>>,
}

impl Config {
    /// Defaults for every benchmark field, built-in variants.
    pub fn with_iteration_counts(iteration_counts: Vec<u64>) -> FuzzraceResult<Self> {
        let raw = RawBenchmarkConfig {
            prng_seed: default_prng_seed(),
            iteration_counts,
            timeout_ms: default_timeout_ms(),
            span: TimingSpan::default(),
            workdir: default_workdir(),
        };
        Ok(Self {
            benchmark: ConfigLoader::validate_benchmark(raw)?,
            variants: None,
        })
    }

    /// Replace the iteration counts, keeping the non-empty rule.
    pub fn set_iteration_counts(&mut self, iteration_counts: Vec<u64>) -> FuzzraceResult<()> {
        if iteration_counts.is_empty() {
            return Err(HardValidationError::MissingRequiredField {
                field: "iteration_counts",
                context: "command line".to_string(),
            }
            .into());
        }
        self.benchmark.iteration_counts = iteration_counts;
        Ok(())
    }

    /// Registry described by this configuration.
    pub fn registry(&self) -> FuzzraceResult<VariantRegistry> {
        match &self.variants {
            Some(variants) => VariantRegistry::from_descriptors(variants.iter().cloned()),
            None => Ok(VariantRegistry::builtin().clone()),
        }
    }
}

/// Configuration loader with strict validation.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load and validate configuration from a YAML file.
    pub fn load_file(path: impl AsRef<Path>) -> FuzzraceResult<Config> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(FuzzraceError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| FuzzraceError::Io {
            context: "reading config file",
            source: e,
        })?;

        Self::load_string(&content)
    }

    /// Load and validate configuration from a YAML string.
    pub fn load_string(content: &str) -> FuzzraceResult<Config> {
        let raw: RawConfig =
            serde_yaml::from_str(content).map_err(|e| FuzzraceError::ConfigParse {
                message: format!("YAML parse error: {}", e),
            })?;

        Self::validate(raw)
    }

    fn validate(raw: RawConfig) -> FuzzraceResult<Config> {
        let benchmark = Self::validate_benchmark(raw.benchmark)?;

        let variants = match raw.variants {
            None => None,
            Some(raw_variants) => {
                if raw_variants.is_empty() {
                    return Err(HardValidationError::SchemaValidation {
                        message: "`variants` is present but empty; omit it to use the built-in variants".to_string(),
                    }
                    .into());
                }

                let mut seen_ids = HashSet::new();
                let mut variants = Vec::with_capacity(raw_variants.len());
                for (index, raw_variant) in raw_variants.into_iter().enumerate() {
                    if !seen_ids.insert(raw_variant.id().to_string()) {
                        return Err(HardValidationError::DuplicateVariantId {
                            id: raw_variant.id().to_string(),
                        }
                        .into());
                    }
                    variants.push(Self::validate_variant(raw_variant, index)?);
                }
                Some(variants)
            }
        };

        Ok(Config {
            benchmark,
            variants,
        })
    }

    fn validate_benchmark(raw: RawBenchmarkConfig) -> FuzzraceResult<BenchmarkConfig> {
        if raw.iteration_counts.is_empty() {
            return Err(HardValidationError::MissingRequiredField {
                field: "iteration_counts",
                context: "benchmark section".to_string(),
            }
            .into());
        }

        if raw.timeout_ms == 0 || raw.timeout_ms > MAX_TIMEOUT_MS {
            return Err(HardValidationError::InvalidFieldValue {
                field: "timeout_ms",
                value: raw.timeout_ms.to_string(),
                reason: format!("Must be between 1 and {}", MAX_TIMEOUT_MS),
            }
            .into());
        }

        if raw.workdir.trim().is_empty() {
            return Err(HardValidationError::InvalidFieldValue {
                field: "workdir",
                value: raw.workdir,
                reason: "Working directory cannot be empty".to_string(),
            }
            .into());
        }

        Ok(BenchmarkConfig {
            prng_seed: raw.prng_seed,
            iteration_counts: raw.iteration_counts,
            timeout: Duration::from_millis(raw.timeout_ms),
            span: raw.span,
            workdir: PathBuf::from(raw.workdir),
        })
    }

    fn validate_variant(raw: RawVariant, index: usize) -> FuzzraceResult<VariantDescriptor> {
        let context = format!("variant at index {}", index);

        let id = VariantId::new(raw.id()).map_err(|mut e| {
            if let HardValidationError::InvalidFieldValue { ref mut field, .. } = e {
                *field = "id";
            }
            e
        })?;

        let invocation = match raw {
            RawVariant::DirectInterpret {
                interpreter,
                program,
                ..
            } => Invocation::DirectInterpret {
                interpreter: ToolName::new(interpreter)?,
                program: required_path("program", program, &context)?,
            },
            RawVariant::CompileThenRun {
                compiler,
                compile_args,
                program,
                artifact,
                launcher,
                ..
            } => Invocation::CompileThenRun {
                compiler: ToolName::new(compiler)?,
                compile_args,
                program: required_path("program", program, &context)?,
                artifact: required_path("artifact", artifact, &context)?,
                launcher: launcher.map(ToolName::new).transpose()?,
            },
            RawVariant::BuildToolManaged {
                tool,
                args,
                project_dir,
                ..
            } => Invocation::BuildToolManaged {
                tool: ToolName::new(tool)?,
                args,
                project_dir: required_path("project_dir", project_dir, &context)?,
            },
        };

        Ok(VariantDescriptor::new(id, invocation))
    }
}

fn required_path(
    field: &'static str,
    value: String,
    context: &str,
) -> Result<PathBuf, HardValidationError> {
    if value.trim().is_empty() {
        return Err(HardValidationError::MissingRequiredField {
            field,
            context: context.to_string(),
        });
    }
    Ok(PathBuf::from(value))
}
