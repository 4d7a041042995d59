// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Process runner: executes one variant recipe and times it.
//!
//! Every failure mode is folded into [`RunResult::outcome`]; `run` has no
//! error path, which is what lets the orchestrator keep going after any cell.

mod process;

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::config::TimingSpan;
use crate::registry::{expand_compile_args, Invocation, VariantDescriptor};
use crate::types::ToolName;

use process::{execute, resolve, Step, StepError, StepOutput};

/// Maximum number of stderr bytes echoed into diagnostics.
const STDERR_EXCERPT_LEN: usize = 512;

/// Result classification of one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Success,
    BuildFailed,
    RunFailed,
    ToolMissing,
}

impl Outcome {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::BuildFailed => "build_failed",
            Self::RunFailed => "run_failed",
            Self::ToolMissing => "tool_missing",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One benchmark cell to execute.
#[derive(Debug, Clone, Copy)]
pub struct RunRequest<'a> {
    pub descriptor: &'a VariantDescriptor,
    pub prng_seed: i64,
    pub iterations: u64,
}

impl<'a> RunRequest<'a> {
    pub fn new(descriptor: &'a VariantDescriptor, prng_seed: i64, iterations: u64) -> Self {
        Self {
            descriptor,
            prng_seed,
            iterations,
        }
    }

    /// Positional arguments passed to every variant: `<prng_seed> <iterations>`.
    pub fn args(&self) -> [String; 2] {
        [self.prng_seed.to_string(), self.iterations.to_string()]
    }
}

/// Everything observed while running one cell.
#[derive(Debug, Clone)]
pub struct RunResult {
    pub outcome: Outcome,
    /// Build start to run end. `None` if the cell did not get that far.
    pub total: Option<Duration>,
    /// Run step only.
    pub run_only: Option<Duration>,
    /// Build step only (compile-then-run).
    pub build: Option<Duration>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    /// `None` when no process exited normally (missing tool, timeout, signal).
    pub exit_code: Option<i32>,
    pub timed_out: bool,
    /// Harness-side explanation for non-success outcomes.
    pub diagnostic: Option<String>,
}

impl RunResult {
    fn failed(outcome: Outcome, diagnostic: impl Into<String>) -> Self {
        Self {
            outcome,
            total: None,
            run_only: None,
            build: None,
            stdout: Vec::new(),
            stderr: Vec::new(),
            exit_code: None,
            timed_out: false,
            diagnostic: Some(diagnostic.into()),
        }
    }

    /// Duration for the requested span.
    pub fn duration(&self, span: TimingSpan) -> Option<Duration> {
        match span {
            TimingSpan::Total => self.total,
            TimingSpan::RunOnly => self.run_only,
        }
    }

    /// Duration to record in the matrix: present only on success.
    pub fn measured(&self, span: TimingSpan) -> Option<Duration> {
        if self.outcome.is_success() {
            self.duration(span)
        } else {
            None
        }
    }

    /// CRC-32 of the captured stdout, for comparing variant outputs.
    pub fn stdout_fingerprint(&self) -> u32 {
        crc32fast::hash(&self.stdout)
    }

    /// Lossy decode of stderr, for display only.
    pub fn stderr_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }

    /// First few hundred bytes of stderr, lossily decoded and trimmed.
    pub fn stderr_excerpt(&self) -> String {
        let end = self.stderr.len().min(STDERR_EXCERPT_LEN);
        String::from_utf8_lossy(&self.stderr[..end]).trim().to_string()
    }
}

/// Executes cells. Implemented by [`ProcessRunner`]; tests substitute
/// scripted runners.
#[allow(async_fn_in_trait)]
pub trait CellRunner {
    async fn run(&self, request: &RunRequest<'_>) -> RunResult;
}

/// Runs variants as child processes from a shared working directory.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    workdir: PathBuf,
    timeout: Option<Duration>,
}

impl ProcessRunner {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
            timeout: None,
        }
    }

    /// Bound each cell's wall time. Expiry yields a failed outcome.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    fn remaining(&self, start: Instant) -> Option<Duration> {
        self.timeout.map(|limit| limit.saturating_sub(start.elapsed()))
    }

    async fn run_direct(
        &self,
        interpreter: &ToolName,
        program: &Path,
        args: [String; 2],
    ) -> RunResult {
        let step = Step::new(interpreter.as_str(), &self.workdir).arg(program).args(args);
        let start = Instant::now();
        match execute(&step, self.remaining(start)).await {
            Ok(output) => single_step_result(output),
            Err(e) => step_failure(e, Outcome::RunFailed, Outcome::ToolMissing),
        }
    }

    async fn run_compiled(
        &self,
        compiler: &ToolName,
        compile_args: &[String],
        program: &Path,
        artifact: &Path,
        launcher: Option<&ToolName>,
        args: [String; 2],
    ) -> RunResult {
        let start = Instant::now();

        let build_step = Step::new(compiler.as_str(), &self.workdir)
            .args(expand_compile_args(compile_args, program, artifact));
        let build = match execute(&build_step, self.remaining(start)).await {
            Ok(output) => output,
            Err(e) => return step_failure(e, Outcome::BuildFailed, Outcome::ToolMissing),
        };

        if !build.status.success() {
            return RunResult {
                outcome: Outcome::BuildFailed,
                total: None,
                run_only: None,
                build: Some(build.elapsed),
                stdout: build.stdout,
                stderr: build.stderr,
                exit_code: build.status.code(),
                timed_out: false,
                diagnostic: Some(format!("build step exited with {}", build.status)),
            };
        }

        // A missing launcher is a missing tool; a missing artifact after a
        // successful build is a run failure.
        let (run_step, not_found) = match launcher {
            Some(launcher) => (
                Step::new(launcher.as_str(), &self.workdir).arg(artifact).args(args),
                Outcome::ToolMissing,
            ),
            None => (
                Step::new(resolve(&self.workdir, artifact), &self.workdir).args(args),
                Outcome::RunFailed,
            ),
        };

        let run = match execute(&run_step, self.remaining(start)).await {
            Ok(output) => output,
            Err(e) => {
                let mut result = step_failure(e, Outcome::RunFailed, not_found);
                result.build = Some(build.elapsed);
                return result;
            }
        };
        let total = start.elapsed();

        let outcome = if run.status.success() {
            Outcome::Success
        } else {
            Outcome::RunFailed
        };
        RunResult {
            outcome,
            total: Some(total),
            run_only: Some(run.elapsed),
            build: Some(build.elapsed),
            exit_code: run.status.code(),
            diagnostic: (!outcome.is_success())
                .then(|| format!("run step exited with {}", run.status)),
            stdout: run.stdout,
            stderr: run.stderr,
            timed_out: false,
        }
    }

    async fn run_build_tool(
        &self,
        tool: &ToolName,
        tool_args: &[String],
        project_dir: &Path,
        args: [String; 2],
    ) -> RunResult {
        let project_dir = resolve(&self.workdir, project_dir);
        let step = Step::new(tool.as_str(), project_dir).args(tool_args).args(args);
        let start = Instant::now();
        match execute(&step, self.remaining(start)).await {
            Ok(output) => single_step_result(output),
            Err(e) => step_failure(e, Outcome::RunFailed, Outcome::ToolMissing),
        }
    }
}

impl CellRunner for ProcessRunner {
    async fn run(&self, request: &RunRequest<'_>) -> RunResult {
        let args = request.args();
        match &request.descriptor.invocation {
            Invocation::DirectInterpret {
                interpreter,
                program,
            } => self.run_direct(interpreter, program, args).await,
            Invocation::CompileThenRun {
                compiler,
                compile_args,
                program,
                artifact,
                launcher,
            } => {
                self.run_compiled(
                    compiler,
                    compile_args,
                    program,
                    artifact,
                    launcher.as_ref(),
                    args,
                )
                .await
            }
            Invocation::BuildToolManaged {
                tool,
                args: tool_args,
                project_dir,
            } => self.run_build_tool(tool, tool_args, project_dir, args).await,
        }
    }
}

/// Result of a recipe that is a single process (interpreted or build tool).
fn single_step_result(output: StepOutput) -> RunResult {
    let outcome = if output.status.success() {
        Outcome::Success
    } else {
        Outcome::RunFailed
    };
    RunResult {
        outcome,
        total: Some(output.elapsed),
        run_only: Some(output.elapsed),
        build: None,
        exit_code: output.status.code(),
        diagnostic: (!outcome.is_success()).then(|| format!("exited with {}", output.status)),
        stdout: output.stdout,
        stderr: output.stderr,
        timed_out: false,
    }
}

/// Map a step that never produced an exit status.
fn step_failure(error: StepError, failed: Outcome, not_found: Outcome) -> RunResult {
    let outcome = match error {
        StepError::NotFound { .. } => not_found,
        _ => failed,
    };
    let mut result = RunResult::failed(outcome, error.to_string());
    result.timed_out = matches!(error, StepError::TimedOut { .. });
    result
}
