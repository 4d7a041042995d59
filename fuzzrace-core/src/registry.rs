// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Variant descriptor registry.
//!
//! Maps each variant identifier to its invocation recipe. The registry keeps
//! registration order, which is the order the orchestrator walks variants in.
//! It is built once at startup and only read afterwards.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::error::{FuzzraceError, FuzzraceResult};
use crate::types::{ToolName, VariantId};

/// Placeholder in compile arguments replaced by the program path.
pub const PROGRAM_PLACEHOLDER: &str = "{program}";
/// Placeholder in compile arguments replaced by the artifact path.
pub const ARTIFACT_PLACEHOLDER: &str = "{artifact}";

/// Shape of a recipe, without its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InvocationKind {
    DirectInterpret,
    CompileThenRun,
    BuildToolManaged,
}

impl InvocationKind {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::DirectInterpret => "direct-interpret",
            Self::CompileThenRun => "compile-then-run",
            Self::BuildToolManaged => "build-tool-managed",
        }
    }
}

impl fmt::Display for InvocationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How a variant is invoked. Paths are relative to the benchmark working
/// directory unless absolute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Invocation {
    /// `interpreter program <seed> <iterations>`
    DirectInterpret {
        interpreter: ToolName,
        program: PathBuf,
    },

    /// `compiler compile_args...`, then `[launcher] artifact <seed> <iterations>`.
    CompileThenRun {
        compiler: ToolName,
        compile_args: Vec<String>,
        program: PathBuf,
        artifact: PathBuf,
        launcher: Option<ToolName>,
    },

    /// `tool args... <seed> <iterations>` run from `project_dir`.
    BuildToolManaged {
        tool: ToolName,
        args: Vec<String>,
        project_dir: PathBuf,
    },
}

impl Invocation {
    pub fn kind(&self) -> InvocationKind {
        match self {
            Self::DirectInterpret { .. } => InvocationKind::DirectInterpret,
            Self::CompileThenRun { .. } => InvocationKind::CompileThenRun,
            Self::BuildToolManaged { .. } => InvocationKind::BuildToolManaged,
        }
    }

    /// The executable that must be on `PATH` for the first step.
    pub fn primary_tool(&self) -> &ToolName {
        match self {
            Self::DirectInterpret { interpreter, .. } => interpreter,
            Self::CompileThenRun { compiler, .. } => compiler,
            Self::BuildToolManaged { tool, .. } => tool,
        }
    }

    /// Program locator: source file, or project directory for build tools.
    pub fn program(&self) -> &Path {
        match self {
            Self::DirectInterpret { program, .. } => program,
            Self::CompileThenRun { program, .. } => program,
            Self::BuildToolManaged { project_dir, .. } => project_dir,
        }
    }

    /// Build artifact locator, if the recipe produces one.
    pub fn artifact(&self) -> Option<&Path> {
        match self {
            Self::CompileThenRun { artifact, .. } => Some(artifact),
            _ => None,
        }
    }
}

/// Substitute `{program}` and `{artifact}` in compile arguments.
pub fn expand_compile_args(args: &[String], program: &Path, artifact: &Path) -> Vec<String> {
    let program = program.to_string_lossy();
    let artifact = artifact.to_string_lossy();
    args.iter()
        .map(|arg| {
            arg.replace(PROGRAM_PLACEHOLDER, &program)
                .replace(ARTIFACT_PLACEHOLDER, &artifact)
        })
        .collect()
}

/// One registered implementation. Immutable once registered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantDescriptor {
    pub id: VariantId,
    pub invocation: Invocation,
}

impl VariantDescriptor {
    pub fn new(id: VariantId, invocation: Invocation) -> Self {
        Self { id, invocation }
    }

    pub fn kind(&self) -> InvocationKind {
        self.invocation.kind()
    }
}

/// Ordered registry of variants.
#[derive(Debug, Clone, Default)]
pub struct VariantRegistry {
    variants: Vec<VariantDescriptor>,
}

impl VariantRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            variants: Vec::new(),
        }
    }

    /// Build a registry from descriptors, in order.
    pub fn from_descriptors(
        descriptors: impl IntoIterator<Item = VariantDescriptor>,
    ) -> FuzzraceResult<Self> {
        let mut registry = Self::new();
        for descriptor in descriptors {
            registry.register(descriptor)?;
        }
        Ok(registry)
    }

    /// Register a variant. Fails if the id is already taken.
    pub fn register(&mut self, descriptor: VariantDescriptor) -> FuzzraceResult<()> {
        if self.contains(&descriptor.id) {
            return Err(FuzzraceError::VariantAlreadyExists(descriptor.id));
        }

        tracing::debug!(
            variant = %descriptor.id,
            kind = %descriptor.kind(),
            "Registered variant"
        );
        self.variants.push(descriptor);
        Ok(())
    }

    pub fn get(&self, id: &VariantId) -> FuzzraceResult<&VariantDescriptor> {
        self.variants
            .iter()
            .find(|d| &d.id == id)
            .ok_or_else(|| FuzzraceError::VariantNotFound(id.clone()))
    }

    pub fn contains(&self, id: &VariantId) -> bool {
        self.variants.iter().any(|d| &d.id == id)
    }

    /// Iterate in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &VariantDescriptor> {
        self.variants.iter()
    }

    pub fn ids(&self) -> Vec<VariantId> {
        self.variants.iter().map(|d| d.id.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    /// Keep only the named variants, preserving registration order.
    /// Unknown ids are rejected before anything is removed.
    pub fn retain_ids(&mut self, keep: &[VariantId]) -> FuzzraceResult<()> {
        if let Some(unknown) = keep.iter().find(|id| !self.contains(id)) {
            return Err(FuzzraceError::VariantNotFound(unknown.clone()));
        }
        self.variants.retain(|d| keep.contains(&d.id));
        Ok(())
    }

    /// Process-wide registry of the stock implementations.
    pub fn builtin() -> &'static VariantRegistry {
        static BUILTIN: OnceLock<VariantRegistry> = OnceLock::new();
        BUILTIN.get_or_init(builtin_registry)
    }
}

fn tool(name: &str) -> ToolName {
    ToolName::new(name).unwrap_or_else(|e| unreachable!("builtin tool name {name}: {e}"))
}

fn id(name: &str) -> VariantId {
    VariantId::new(name).unwrap_or_else(|e| unreachable!("builtin variant id {name}: {e}"))
}

fn builtin_registry() -> VariantRegistry {
    let descriptors = [
        VariantDescriptor::new(
            id("python"),
            Invocation::DirectInterpret {
                interpreter: tool("python3"),
                program: PathBuf::from("fuzzer.py"),
            },
        ),
        VariantDescriptor::new(
            id("c"),
            Invocation::CompileThenRun {
                compiler: tool("gcc"),
                compile_args: vec![
                    "-O2".to_string(),
                    "-o".to_string(),
                    ARTIFACT_PLACEHOLDER.to_string(),
                    PROGRAM_PLACEHOLDER.to_string(),
                ],
                program: PathBuf::from("fuzzer.c"),
                artifact: PathBuf::from("fuzzer"),
                launcher: None,
            },
        ),
        VariantDescriptor::new(
            id("javascript"),
            Invocation::DirectInterpret {
                interpreter: tool("node"),
                program: PathBuf::from("fuzzer.js"),
            },
        ),
        VariantDescriptor::new(
            id("typescript"),
            Invocation::CompileThenRun {
                compiler: tool("tsc"),
                compile_args: vec![PROGRAM_PLACEHOLDER.to_string()],
                program: PathBuf::from("fuzzer.ts"),
                artifact: PathBuf::from("fuzzer.js"),
                launcher: Some(tool("node")),
            },
        ),
        VariantDescriptor::new(
            id("java"),
            Invocation::CompileThenRun {
                compiler: tool("javac"),
                compile_args: vec![PROGRAM_PLACEHOLDER.to_string()],
                program: PathBuf::from("Fuzzer.java"),
                artifact: PathBuf::from("Fuzzer"),
                launcher: Some(tool("java")),
            },
        ),
        VariantDescriptor::new(
            id("rust"),
            Invocation::BuildToolManaged {
                tool: tool("cargo"),
                args: vec![
                    "run".to_string(),
                    "--release".to_string(),
                    "--quiet".to_string(),
                    "--".to_string(),
                ],
                project_dir: PathBuf::from("rust_fuzzer"),
            },
        ),
        VariantDescriptor::new(
            id("scala"),
            Invocation::BuildToolManaged {
                tool: tool("scala-cli"),
                args: vec![
                    "run".to_string(),
                    "fuzzer.scala".to_string(),
                    "--".to_string(),
                ],
                project_dir: PathBuf::from("."),
            },
        ),
        VariantDescriptor::new(
            id("julia"),
            Invocation::DirectInterpret {
                interpreter: tool("julia"),
                program: PathBuf::from("fuzzer.jl"),
            },
        ),
    ];

    let mut registry = VariantRegistry::new();
    for descriptor in descriptors {
        // Ids above are distinct literals.
        if let Err(e) = registry.register(descriptor) {
            unreachable!("builtin registry: {e}");
        }
    }
    registry
}
