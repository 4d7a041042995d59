// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Single external process step.
//!
//! Spawns one command with piped stdout/stderr, waits for it under an
//! optional deadline, and reports the captured bytes with the elapsed wall
//! time. The child gets its own process group so that a timed-out step can be
//! killed together with anything it spawned (JVMs, cargo's rustc, ...).

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::process::Command;

/// A command to run. The working directory applies to the child only; the
/// harness process never changes its own.
#[derive(Debug, Clone)]
pub(crate) struct Step {
    pub program: OsString,
    pub args: Vec<OsString>,
    pub cwd: PathBuf,
}

impl Step {
    pub fn new(program: impl Into<OsString>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: cwd.into(),
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Command line for log messages.
    pub fn display(&self) -> String {
        std::iter::once(&self.program)
            .chain(self.args.iter())
            .map(|s| s.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Completed step, whatever its exit status.
#[derive(Debug)]
pub(crate) struct StepOutput {
    pub status: ExitStatus,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub elapsed: Duration,
}

/// Reasons a step produced no exit status.
#[derive(Debug, Error)]
pub(crate) enum StepError {
    /// The executable is not on PATH (or not at the given path).
    #[error("'{program}' not found on PATH")]
    NotFound { program: String },

    /// The working directory does not exist.
    #[error("working directory {} does not exist", .path.display())]
    MissingWorkdir { path: PathBuf },

    /// Any other spawn or wait failure.
    #[error("'{program}' failed: {source}")]
    Io {
        program: String,
        #[source]
        source: io::Error,
    },

    /// The deadline expired; the process group was killed.
    #[error("'{program}' timed out after {limit:?}")]
    TimedOut { program: String, limit: Duration },
}

/// Run a step to completion, or until `limit` elapses.
pub(crate) async fn execute(
    step: &Step,
    limit: Option<Duration>,
) -> Result<StepOutput, StepError> {
    let program = step.program.to_string_lossy().into_owned();

    // chdir failures surface as ENOENT from spawn, which would be
    // indistinguishable from a missing tool.
    if !step.cwd.is_dir() {
        return Err(StepError::MissingWorkdir {
            path: step.cwd.clone(),
        });
    }

    let mut std_command = std::process::Command::new(&step.program);
    std_command
        .args(&step.args)
        .current_dir(&step.cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        std_command.process_group(0);
    }

    let mut command = Command::from(std_command);
    command.kill_on_drop(true);

    tracing::debug!(command = %step.display(), cwd = %step.cwd.display(), "Spawning step");

    let start = Instant::now();
    let child = command.spawn().map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => StepError::NotFound {
            program: program.clone(),
        },
        _ => StepError::Io {
            program: program.clone(),
            source: e,
        },
    })?;
    let pid = child.id();

    let waited = match limit {
        Some(limit) => match tokio::time::timeout(limit, child.wait_with_output()).await {
            Ok(result) => result,
            Err(_) => {
                // The child itself was killed when its future was dropped.
                kill_process_group(pid);
                return Err(StepError::TimedOut { program, limit });
            }
        },
        None => child.wait_with_output().await,
    };
    let elapsed = start.elapsed();

    let output = waited.map_err(|e| StepError::Io {
        program: program.clone(),
        source: e,
    })?;

    Ok(StepOutput {
        status: output.status,
        stdout: output.stdout,
        stderr: output.stderr,
        elapsed,
    })
}

#[cfg(unix)]
fn kill_process_group(pid: Option<u32>) {
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    let Some(pid) = pid else {
        return;
    };
    let Ok(raw) = i32::try_from(pid) else {
        return;
    };

    if let Err(e) = killpg(Pid::from_raw(raw), Signal::SIGKILL) {
        // ESRCH: the group already exited.
        tracing::debug!(pid, error = %e, "killpg after timeout");
    }
}

#[cfg(not(unix))]
fn kill_process_group(_pid: Option<u32>) {}

/// Resolve `path` against `base` unless it is already absolute. The result
/// is made absolute so it means the same thing inside a child whose working
/// directory differs from ours.
pub(crate) fn resolve(base: &Path, path: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    };
    std::path::absolute(&joined).unwrap_or(joined)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_captures_binary_stdout() {
        let dir = TempDir::new().unwrap();
        let step = Step::new("sh", dir.path())
            .arg("-c")
            .arg(r"printf '\000\377\200'; printf 'oops' >&2; exit 3");

        let output = execute(&step, None).await.unwrap();
        assert_eq!(output.stdout, vec![0x00, 0xff, 0x80]);
        assert_eq!(output.stderr, b"oops");
        assert_eq!(output.status.code(), Some(3));
    }

    #[tokio::test]
    async fn test_missing_program() {
        let dir = TempDir::new().unwrap();
        let step = Step::new("fuzzrace-no-such-tool-7f3a", dir.path());

        let err = execute(&step, None).await.unwrap_err();
        assert!(matches!(err, StepError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_missing_workdir_is_not_reported_as_missing_tool() {
        let dir = TempDir::new().unwrap();
        let step = Step::new("sh", dir.path().join("gone")).arg("-c").arg("true");

        let err = execute(&step, None).await.unwrap_err();
        assert!(matches!(err, StepError::MissingWorkdir { .. }));
    }

    #[tokio::test]
    async fn test_timeout() {
        let dir = TempDir::new().unwrap();
        let step = Step::new("sh", dir.path()).arg("-c").arg("sleep 5");

        let start = Instant::now();
        let err = execute(&step, Some(Duration::from_millis(200)))
            .await
            .unwrap_err();
        assert!(matches!(err, StepError::TimedOut { .. }));
        assert!(start.elapsed() < Duration::from_secs(4));
    }

    #[tokio::test]
    async fn test_timeout_kills_whole_process_group() {
        let dir = TempDir::new().unwrap();
        let marker = dir.path().join("marker");
        let step = Step::new("sh", dir.path())
            .arg("-c")
            .arg("(sleep 1; touch marker) & sleep 5");

        let err = execute(&step, Some(Duration::from_millis(200)))
            .await
            .unwrap_err();
        assert!(matches!(err, StepError::TimedOut { .. }));

        // The backgrounded grandchild would have created the marker by now.
        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert!(!marker.exists());
    }

    #[test]
    fn test_step_error_messages() {
        let err = StepError::NotFound {
            program: "gcc".to_string(),
        };
        assert_eq!(err.to_string(), "'gcc' not found on PATH");
        assert!(std::error::Error::source(&err).is_none());

        let err = StepError::Io {
            program: "javac".to_string(),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(err.to_string(), "'javac' failed: denied");
        assert!(std::error::Error::source(&err).is_some());

        let err = StepError::MissingWorkdir {
            path: PathBuf::from("/no/such/dir"),
        };
        assert_eq!(err.to_string(), "working directory /no/such/dir does not exist");
    }

    #[tokio::test]
    async fn test_child_cwd_does_not_leak() {
        let dir = TempDir::new().unwrap();
        let before = std::env::current_dir().unwrap();

        let step = Step::new("sh", dir.path()).arg("-c").arg("pwd");
        let output = execute(&step, None).await.unwrap();

        let reported = String::from_utf8_lossy(&output.stdout).trim().to_string();
        assert_eq!(
            Path::new(&reported).canonicalize().unwrap(),
            dir.path().canonicalize().unwrap()
        );
        assert_eq!(std::env::current_dir().unwrap(), before);
    }

    #[test]
    fn test_resolve() {
        assert_eq!(
            resolve(Path::new("/work"), Path::new("fuzzer")),
            PathBuf::from("/work/fuzzer")
        );
        assert_eq!(
            resolve(Path::new("/work"), Path::new("/opt/fuzzer")),
            PathBuf::from("/opt/fuzzer")
        );
    }
}
