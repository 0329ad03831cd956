//! One isolated execution of the target suite.
//!
//! Each trial is an independent OS process: state a test mutates in
//! one run (globals, temp files) cannot leak into the next. The runner
//! writes a JSON report to a per-iteration scratch path; the trial
//! wrapper parses it leniently and removes the scratch file on every
//! exit path so artifacts never accumulate across iterations.

use crate::errors::{TrialError, TrialResult};
use crate::model::{TrialCase, TrialReport};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

/// Executes single trials of a suite with a fixed runner command.
#[derive(Debug, Clone)]
pub struct TrialRunner {
    /// Suite file or directory handed to the runner.
    pub suite_path: PathBuf,
    /// Command prefix, e.g. `["python3", "-m", "pytest"]`. Report and
    /// suite arguments are appended per trial.
    pub runner: Vec<String>,
    /// Hard bound on one trial; the child is killed on expiry.
    pub timeout: Duration,
}

impl TrialRunner {
    pub fn new(suite_path: PathBuf, runner: Vec<String>, timeout: Duration) -> Self {
        Self {
            suite_path,
            runner,
            timeout,
        }
    }

    /// Run the suite once, writing the runner's report to
    /// `report_path`, and return the parsed report.
    ///
    /// Every failure mode (spawn, timeout, missing or malformed
    /// report) surfaces as a [`TrialError`]; an empty report is never
    /// silently returned as success. The scratch file is removed
    /// whether or not parsing succeeded.
    pub async fn run_once(&self, report_path: &Path) -> TrialResult<TrialReport> {
        let outcome = match timeout(self.timeout, self.execute(report_path)).await {
            Ok(Ok(())) => parse_report(report_path),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(TrialError::Timeout {
                seconds: self.timeout.as_secs(),
            }),
        };

        if report_path.exists() {
            if let Err(e) = std::fs::remove_file(report_path) {
                tracing::warn!(
                    path = %report_path.display(),
                    error = %e,
                    "failed to remove scratch report"
                );
            }
        }

        outcome
    }

    async fn execute(&self, report_path: &Path) -> TrialResult<()> {
        let Some((program, prefix)) = self.runner.split_first() else {
            return Err(TrialError::Spawn {
                command: String::new(),
                message: "empty runner command".into(),
            });
        };

        let mut cmd = Command::new(program);
        cmd.args(prefix)
            .arg("-v")
            .arg("--json-report")
            .arg(format!("--json-report-file={}", report_path.display()))
            .arg("--no-header")
            .arg(&self.suite_path)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = cmd.spawn().map_err(|e| TrialError::Spawn {
            command: self.runner.join(" "),
            message: e.to_string(),
        })?;

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| TrialError::Wait {
                message: e.to_string(),
            })?;

        // A failing suite exits non-zero but still writes its report;
        // only the report decides per-test outcomes.
        tracing::debug!(exit = ?output.status.code(), "runner exited");
        Ok(())
    }
}

// Lenient boundary shape for the runner's JSON report. Unknown fields
// are ignored; absent ones default so a sparse report still parses.
#[derive(Debug, Deserialize)]
struct RawReport {
    #[serde(default)]
    tests: Option<Vec<RawCase>>,
}

#[derive(Debug, Deserialize)]
struct RawCase {
    #[serde(default)]
    nodeid: String,
    #[serde(default)]
    outcome: String,
    #[serde(default)]
    call: Option<RawPhase>,
}

#[derive(Debug, Deserialize)]
struct RawPhase {
    #[serde(default)]
    longrepr: Option<String>,
}

impl RawCase {
    fn into_case(self) -> Option<TrialCase> {
        if self.nodeid.is_empty() {
            return None;
        }
        let passed = self.outcome == "passed";
        let detail = self
            .call
            .and_then(|phase| phase.longrepr)
            .filter(|text| !text.is_empty());
        Some(TrialCase {
            id: self.nodeid,
            passed,
            detail,
        })
    }
}

/// Parse a runner report file into a [`TrialReport`].
///
/// A report without a `tests` section is an iteration failure: it is
/// indistinguishable from a runner misfire. A present-but-empty
/// `tests` array is a valid report of zero tests. Entries with no
/// node id are skipped.
fn parse_report(report_path: &Path) -> TrialResult<TrialReport> {
    if !report_path.exists() {
        return Err(TrialError::ReportMissing {
            path: report_path.display().to_string(),
        });
    }

    let bytes = std::fs::read(report_path).map_err(|e| TrialError::ReportUnreadable {
        path: report_path.display().to_string(),
        message: e.to_string(),
    })?;

    let raw: RawReport =
        serde_json::from_slice(&bytes).map_err(|e| TrialError::ReportParse {
            message: e.to_string(),
        })?;

    let Some(cases) = raw.tests else {
        return Err(TrialError::MissingTestsSection {
            path: report_path.display().to_string(),
        });
    };

    Ok(TrialReport {
        cases: cases.into_iter().filter_map(RawCase::into_case).collect(),
    })
}
