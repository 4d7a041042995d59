// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Tests for the `fuzzrace` operator commands.

#![cfg(unix)]

use std::process::{Command, Output};

use tempfile::TempDir;

fn fuzzrace(dir: &TempDir, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_fuzzrace"))
        .args(args)
        .current_dir(dir.path())
        .output()
        .expect("Failed to spawn fuzzrace")
}

#[test]
fn test_list_builtin_variants() {
    let temp_dir = TempDir::new().unwrap();
    let output = fuzzrace(&temp_dir, &["list"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for id in ["python", "c", "javascript", "typescript", "java", "rust", "scala", "julia"] {
        assert!(stdout.contains(id), "missing {}", id);
    }
    assert!(stdout.contains("Total: 8 variant(s)"));
}

#[test]
fn test_validate_rejects_bad_config() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(
        temp_dir.path().join("bad.yaml"),
        "benchmark:\n  iteration_counts: [10]\n  timeout_ms: 0\n",
    )
    .unwrap();

    let output = fuzzrace(&temp_dir, &["validate", "bad.yaml"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("timeout_ms"));
}

#[test]
fn test_run_writes_table_and_report() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(
        temp_dir.path().join("fuzzer.sh"),
        "[ -f _seed_ ] || printf 'InitialSeedData' > _seed_\ncat _seed_\n",
    )
    .unwrap();
    std::fs::write(
        temp_dir.path().join("fuzzrace.yaml"),
        r#"
benchmark:
  iteration_counts: [10, 20]
  timeout_ms: 30000
variants:
  - id: shell
    kind: direct-interpret
    interpreter: sh
    program: fuzzer.sh
  - id: ghost
    kind: direct-interpret
    interpreter: fuzzrace-no-such-interpreter
    program: fuzzer.ghost
"#,
    )
    .unwrap();

    let output = fuzzrace(&temp_dir, &["run", "--iterations", "5", "--seed", "-1"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("prng_seed -1"));
    let ghost = stdout
        .lines()
        .find(|l| l.trim_start().starts_with("ghost"))
        .unwrap();
    assert!(ghost.contains("—"));

    let reports: Vec<_> = std::fs::read_dir(temp_dir.path().join("data"))
        .unwrap()
        .collect();
    assert_eq!(reports.len(), 1);
}

#[test]
fn test_run_rejects_unknown_variant() {
    let temp_dir = TempDir::new().unwrap();
    let output = fuzzrace(
        &temp_dir,
        &["run", "--iterations", "5", "--only", "cobol", "--no-json"],
    );
    assert!(!output.status.success());
    assert!(!temp_dir.path().join("data").exists());
}
