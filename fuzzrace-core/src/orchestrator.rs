// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Benchmark orchestrator.
//!
//! Walks {variant × iteration count} strictly in sequence, delegates every
//! cell to a [`CellRunner`], and records either the measured duration or an
//! absent marker. A failed cell is recorded once and never retried, and it
//! never stops the remaining cells from running.

use crate::config::TimingSpan;
use crate::matrix::{MatrixRow, ResultsMatrix};
use crate::registry::VariantRegistry;
use crate::runner::{CellRunner, RunRequest, RunResult};

/// Drives a runner over a registry.
pub struct Orchestrator<R> {
    runner: R,
    span: TimingSpan,
}

impl<R: CellRunner> Orchestrator<R> {
    pub fn new(runner: R) -> Self {
        Self {
            runner,
            span: TimingSpan::default(),
        }
    }

    /// Select which span is recorded. The same span is used for every variant.
    pub fn with_span(mut self, span: TimingSpan) -> Self {
        self.span = span;
        self
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Run every cell and build the results matrix.
    ///
    /// Variants are visited in registration order and iteration counts in
    /// exactly the order given. Every row has `iteration_counts.len()` cells.
    pub async fn run_all(
        &self,
        prng_seed: i64,
        iteration_counts: &[u64],
        registry: &VariantRegistry,
    ) -> ResultsMatrix {
        let mut matrix = ResultsMatrix::new(prng_seed, self.span, iteration_counts.to_vec());

        tracing::info!(
            variants = registry.len(),
            cells = registry.len() * iteration_counts.len(),
            prng_seed,
            span = ?self.span,
            "Starting benchmark run"
        );

        for descriptor in registry.iter() {
            let mut row = MatrixRow::new(descriptor.id.clone(), descriptor.kind());

            for &iterations in iteration_counts {
                let request = RunRequest::new(descriptor, prng_seed, iterations);
                tracing::info!(
                    variant = %descriptor.id,
                    kind = %descriptor.kind(),
                    iterations,
                    "Running cell"
                );

                let result = self.runner.run(&request).await;
                self.log_result(&request, &result);
                row.cells.push(result.measured(self.span));
            }

            if let Err(e) = matrix.push_row(row) {
                // Registry ids are unique and the row has one cell per count.
                tracing::error!(variant = %descriptor.id, error = %e, "Dropped result row");
            }
        }

        tracing::info!(
            present = matrix.present_count(),
            total = matrix.variant_count() * iteration_counts.len(),
            "Benchmark run complete"
        );

        matrix
    }

    fn log_result(&self, request: &RunRequest<'_>, result: &RunResult) {
        let variant = &request.descriptor.id;

        match result.measured(self.span) {
            Some(elapsed) => {
                tracing::info!(
                    variant = %variant,
                    iterations = request.iterations,
                    elapsed_ms = elapsed.as_secs_f64() * 1000.0,
                    build_ms = result.build.map(|b| b.as_secs_f64() * 1000.0),
                    stdout_len = result.stdout.len(),
                    stdout_crc32 = %format!("{:08x}", result.stdout_fingerprint()),
                    "Cell succeeded"
                );
            }
            None => {
                tracing::warn!(
                    variant = %variant,
                    iterations = request.iterations,
                    outcome = %result.outcome,
                    exit_code = ?result.exit_code,
                    timed_out = result.timed_out,
                    diagnostic = result.diagnostic.as_deref().unwrap_or(""),
                    stderr = %result.stderr_excerpt(),
                    "Cell failed, recording absent duration"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{Invocation, VariantDescriptor};
    use crate::runner::Outcome;
    use crate::types::{ToolName, VariantId};
    use std::cell::RefCell;
    use std::path::PathBuf;
    use std::time::Duration;

    /// Fails every cell of the named variant; succeeds elsewhere with a
    /// duration equal to the iteration count in microseconds.
    struct ScriptedRunner {
        failing: &'static str,
        calls: RefCell<Vec<(String, u64)>>,
    }

    impl CellRunner for ScriptedRunner {
        async fn run(&self, request: &RunRequest<'_>) -> RunResult {
            let name = request.descriptor.id.as_str().to_string();
            self.calls.borrow_mut().push((name.clone(), request.iterations));

            let ok = name != self.failing;
            let elapsed = Duration::from_micros(request.iterations);
            RunResult {
                outcome: if ok { Outcome::Success } else { Outcome::ToolMissing },
                total: ok.then_some(elapsed * 2),
                run_only: ok.then_some(elapsed),
                build: None,
                stdout: Vec::new(),
                stderr: Vec::new(),
                exit_code: ok.then_some(0),
                timed_out: false,
                diagnostic: None,
            }
        }
    }

    fn registry(names: &[&str]) -> VariantRegistry {
        VariantRegistry::from_descriptors(names.iter().map(|name| {
            VariantDescriptor::new(
                VariantId::new(*name).unwrap(),
                Invocation::DirectInterpret {
                    interpreter: ToolName::new("sh").unwrap(),
                    program: PathBuf::from("x.sh"),
                },
            )
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_isolation_and_alignment() {
        let runner = ScriptedRunner {
            failing: "java",
            calls: RefCell::new(Vec::new()),
        };
        let orchestrator = Orchestrator::new(runner);
        let counts = [1000, 10, 500];

        let matrix = orchestrator
            .run_all(7, &counts, &registry(&["c", "java", "python"]))
            .await;

        assert_eq!(matrix.iteration_counts(), &counts);
        for row in matrix.rows() {
            assert_eq!(row.cells.len(), counts.len());
        }

        let java = matrix.get(&VariantId::new("java").unwrap()).unwrap();
        assert!(java.cells.iter().all(Option::is_none));

        let python = matrix.get(&VariantId::new("python").unwrap()).unwrap();
        assert_eq!(
            python.cells,
            vec![
                Some(Duration::from_micros(2000)),
                Some(Duration::from_micros(20)),
                Some(Duration::from_micros(1000)),
            ]
        );
    }

    #[tokio::test]
    async fn test_cell_order_and_no_retries() {
        let runner = ScriptedRunner {
            failing: "b",
            calls: RefCell::new(Vec::new()),
        };
        let orchestrator = Orchestrator::new(runner);
        orchestrator.run_all(1, &[3, 1], &registry(&["b", "a"])).await;

        let calls = orchestrator.runner().calls.borrow().clone();
        let expected: Vec<(String, u64)> = vec![
            ("b".to_string(), 3),
            ("b".to_string(), 1),
            ("a".to_string(), 3),
            ("a".to_string(), 1),
        ];
        assert_eq!(calls, expected);
    }

    #[tokio::test]
    async fn test_run_only_span() {
        let runner = ScriptedRunner {
            failing: "",
            calls: RefCell::new(Vec::new()),
        };
        let orchestrator = Orchestrator::new(runner).with_span(TimingSpan::RunOnly);
        let matrix = orchestrator.run_all(1, &[40], &registry(&["c"])).await;

        assert_eq!(matrix.span(), TimingSpan::RunOnly);
        assert_eq!(
            matrix.rows()[0].cells,
            vec![Some(Duration::from_micros(40))]
        );
    }

    #[tokio::test]
    async fn test_empty_registry() {
        let runner = ScriptedRunner {
            failing: "",
            calls: RefCell::new(Vec::new()),
        };
        let matrix = Orchestrator::new(runner)
            .run_all(1, &[10], &VariantRegistry::new())
            .await;
        assert_eq!(matrix.variant_count(), 0);
        assert!(matrix.is_complete());
    }
}
