//! Run orchestration: the trial loop and everything it owns.
//!
//! The detector drives N trials, feeds each report to the aggregator,
//! scores the final state, and persists the result document. Iteration
//! failures are dropped, never retried: re-running a trial would break
//! the one-physical-trial semantics the score formula depends on.

use crate::engine::aggregate::Aggregator;
use crate::engine::score::classify;
use crate::engine::trial::TrialRunner;
use crate::errors::ConfigError;
use crate::model::{ResultDocument, RunMetadata};
use crate::report::json::{default_output_path, write_document};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Pause between consecutive sequential trials, letting file handles
/// and ports from the previous run settle.
const PAUSE_BETWEEN_TRIALS: Duration = Duration::from_millis(500);

/// Tunables for one detection run.
#[derive(Debug, Clone)]
pub struct RunPolicy {
    /// Number of trials to attempt. A target, not a guarantee: dropped
    /// iterations reduce the data without failing the run.
    pub iterations: usize,
    /// Concurrent trials. 1 reproduces the strictly sequential
    /// reference behavior.
    pub parallel: usize,
    /// Hard bound on a single trial.
    pub trial_timeout: Duration,
    /// Runner command prefix, e.g. `["python3", "-m", "pytest"]`.
    pub runner: Vec<String>,
    /// Pause between sequential trials.
    pub pause: Duration,
}

impl Default for RunPolicy {
    fn default() -> Self {
        Self {
            iterations: 5,
            parallel: 1,
            trial_timeout: Duration::from_secs(300),
            runner: vec!["python3".into(), "-m".into(), "pytest".into()],
            pause: PAUSE_BETWEEN_TRIALS,
        }
    }
}

/// Orchestrates one detection run over a suite.
#[derive(Debug)]
pub struct Detector {
    pub test_path: PathBuf,
    pub output_file: PathBuf,
    pub policy: RunPolicy,
}

impl Detector {
    /// Validate configuration and resolve the output location.
    ///
    /// Fails fast, before any trial runs: a missing suite path, a zero
    /// iteration count, or an empty runner command is a fatal
    /// [`ConfigError`]. When no explicit output file is given, a
    /// timestamped name under `results_dir` is chosen.
    pub fn new(
        test_path: impl Into<PathBuf>,
        output_file: Option<PathBuf>,
        results_dir: impl Into<PathBuf>,
        policy: RunPolicy,
    ) -> Result<Self, ConfigError> {
        let test_path = test_path.into();
        if !test_path.exists() {
            return Err(ConfigError::TestPathNotFound {
                path: test_path.display().to_string(),
            });
        }
        if policy.iterations == 0 {
            return Err(ConfigError::InvalidIterations {
                value: policy.iterations,
            });
        }
        if policy.runner.is_empty() {
            return Err(ConfigError::EmptyRunnerCommand);
        }

        let output_file =
            output_file.unwrap_or_else(|| default_output_path(&results_dir.into()));

        Ok(Self {
            test_path,
            output_file,
            policy,
        })
    }

    /// Drive the full run: trial loop, scoring, persistence.
    ///
    /// Individual trial failures are logged and dropped. A persistence
    /// failure is logged too; the in-memory document is still returned
    /// so in-process consumers keep working, but callers that need the
    /// durable artifact must check the output file exists.
    pub async fn run(&self) -> anyhow::Result<ResultDocument> {
        let metadata = RunMetadata {
            timestamp: chrono::Utc::now().to_rfc3339(),
            iterations: self.policy.iterations,
            test_path: self.test_path.display().to_string(),
            output_file: self.output_file.display().to_string(),
        };

        tracing::info!(
            iterations = self.policy.iterations,
            parallel = self.policy.parallel,
            path = %self.test_path.display(),
            "starting flaky-test detection"
        );

        let scratch = tempfile::tempdir()?;
        let trial = TrialRunner::new(
            self.test_path.clone(),
            self.policy.runner.clone(),
            self.policy.trial_timeout,
        );

        let mut aggregator = Aggregator::new();
        if self.policy.parallel <= 1 {
            self.run_sequential(&trial, scratch.path(), &mut aggregator)
                .await;
        } else {
            self.run_parallel(&trial, scratch.path(), &mut aggregator)
                .await?;
        }

        let mut tests = aggregator.into_tests();
        let summary = classify(&mut tests, self.policy.iterations);
        tracing::info!(
            total = summary.total_tests,
            flaky = summary.flaky_tests,
            stability = summary.suite_stability_percentage,
            "detection finished"
        );

        let document = ResultDocument {
            metadata,
            tests,
            summary,
        };

        match write_document(&document, &self.output_file) {
            Ok(()) => {
                tracing::info!(path = %self.output_file.display(), "results saved");
            }
            Err(e) => {
                tracing::error!(
                    path = %self.output_file.display(),
                    error = %e,
                    "failed to persist results; in-memory document is still available"
                );
            }
        }

        Ok(document)
    }

    async fn run_sequential(
        &self,
        trial: &TrialRunner,
        scratch: &Path,
        aggregator: &mut Aggregator,
    ) {
        for iteration in 0..self.policy.iterations {
            tracing::info!(
                iteration = iteration + 1,
                total = self.policy.iterations,
                "starting trial"
            );
            let report_path = scratch.join(format!("report_{iteration}.json"));
            match trial.run_once(&report_path).await {
                Ok(report) => aggregator.absorb(&report, iteration),
                Err(e) => {
                    tracing::error!(iteration = iteration + 1, error = %e, "trial dropped");
                }
            }
            if iteration + 1 < self.policy.iterations {
                tokio::time::sleep(self.policy.pause).await;
            }
        }
    }

    /// Bounded-parallel trial execution.
    ///
    /// Trials run concurrently under a semaphore, but reports are
    /// absorbed only here, after sorting by iteration index, so the
    /// aggregate state has a single writer and a deterministic order.
    async fn run_parallel(
        &self,
        trial: &TrialRunner,
        scratch: &Path,
        aggregator: &mut Aggregator,
    ) -> anyhow::Result<()> {
        let sem = Arc::new(Semaphore::new(self.policy.parallel));
        let mut join_set = JoinSet::new();

        for iteration in 0..self.policy.iterations {
            let permit = sem.clone().acquire_owned().await?;
            let trial = trial.clone();
            let report_path = scratch.join(format!("report_{iteration}.json"));
            join_set.spawn(async move {
                let _permit = permit;
                tracing::info!(iteration = iteration + 1, "starting trial");
                (iteration, trial.run_once(&report_path).await)
            });
        }

        let mut outcomes = Vec::with_capacity(self.policy.iterations);
        while let Some(res) = join_set.join_next().await {
            match res {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => tracing::error!(error = %e, "trial task failed"),
            }
        }

        outcomes.sort_by_key(|(iteration, _)| *iteration);
        for (iteration, result) in outcomes {
            match result {
                Ok(report) => aggregator.absorb(&report, iteration),
                Err(e) => {
                    tracing::error!(iteration = iteration + 1, error = %e, "trial dropped");
                }
            }
        }

        Ok(())
    }
}
