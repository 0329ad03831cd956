//! Data model for detection runs.
//!
//! A run produces one [`ResultDocument`]: run metadata, a map of test
//! identity to [`TestRecord`], and the derived [`SuiteSummary`]. The
//! document is the sole contract consumed by downstream tooling
//! (insight generation, dashboards), so field names and shapes are
//! stable.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One parsed per-trial report from the external runner.
///
/// Cases keep the runner's own ordering; malformed entries are dropped
/// at the parse boundary and never reach the aggregation path.
#[derive(Debug, Clone, PartialEq)]
pub struct TrialReport {
    pub cases: Vec<TrialCase>,
}

/// Outcome of one test case in one trial.
#[derive(Debug, Clone, PartialEq)]
pub struct TrialCase {
    /// Stable identity string from the runner (its node id).
    pub id: String,
    /// True only for an outcome of exactly `passed`.
    pub passed: bool,
    /// Failure detail text, when the runner captured any.
    pub detail: Option<String>,
}

/// Failure detail captured for one failing trial of one test.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogEntry {
    /// Zero-based index of the trial that failed.
    pub iteration: usize,
    pub log: String,
}

/// Cumulative state for one test identity across all trials of a run.
///
/// Created lazily the first time an identity is observed, accumulated
/// by the aggregator, finalized by the scorer. Invariant:
/// `results.len() == passes + failures` at all times.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TestRecord {
    pub id: String,
    pub module: String,
    pub name: String,
    /// Outcome per observed trial, in absorption order.
    pub results: Vec<bool>,
    pub passes: usize,
    pub failures: usize,
    pub flaky: bool,
    pub flaky_score: f64,
    pub always_passes: bool,
    pub always_fails: bool,
    /// Entries exist only for failing trials that carried detail text.
    pub logs: Vec<LogEntry>,
}

impl TestRecord {
    /// Fresh record for an identity, with module and display name
    /// derived from the runner's `::`-separated node id.
    pub fn new(id: &str) -> Self {
        let (module, name) = split_identity(id);
        Self {
            id: id.to_string(),
            module,
            name,
            results: Vec::new(),
            passes: 0,
            failures: 0,
            flaky: false,
            flaky_score: 0.0,
            always_passes: false,
            always_fails: false,
            logs: Vec::new(),
        }
    }

    /// Append one trial outcome, keeping the pass/fail counters in
    /// step with the outcome sequence.
    pub fn record_outcome(&mut self, passed: bool) {
        self.results.push(passed);
        if passed {
            self.passes += 1;
        } else {
            self.failures += 1;
        }
    }

    /// Whether this record observed every configured iteration.
    pub fn has_complete_data(&self, iterations: usize) -> bool {
        self.results.len() >= iterations
    }
}

/// Module and display name from a runner node id.
///
/// `tests/test_cart.py::test_checkout` splits into the file part and
/// the final segment; an id without a separator is its own name.
pub fn split_identity(id: &str) -> (String, String) {
    let module = id.split("::").next().unwrap_or_default().to_string();
    let name = if id.contains("::") {
        id.rsplit("::").next().unwrap_or(id).to_string()
    } else {
        id.to_string()
    };
    (module, name)
}

/// Suite-level counts over fully-observed tests, derived once by the
/// scorer and never mutated directly.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SuiteSummary {
    pub total_tests: usize,
    pub flaky_tests: usize,
    pub stable_tests: usize,
    pub always_pass: usize,
    pub always_fail: usize,
    pub suite_stability_percentage: f64,
}

/// Run provenance captured when orchestration starts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunMetadata {
    /// RFC 3339 start timestamp.
    pub timestamp: String,
    /// Configured trial count (a target, not a guarantee).
    pub iterations: usize,
    pub test_path: String,
    pub output_file: String,
}

/// The persisted artifact of one orchestrated run.
///
/// Immutable after scoring, written exactly once. Tests are keyed by
/// identity in a `BTreeMap` so serialization order is deterministic.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResultDocument {
    pub metadata: RunMetadata,
    pub tests: BTreeMap<String, TestRecord>,
    pub summary: SuiteSummary,
}

impl ResultDocument {
    /// Tests classified flaky, in identity order.
    pub fn flaky_tests(&self) -> impl Iterator<Item = &TestRecord> {
        self.tests.values().filter(|t| t.flaky)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_identity_module_and_name() {
        let (module, name) = split_identity("tests/test_cart.py::test_checkout");
        assert_eq!(module, "tests/test_cart.py");
        assert_eq!(name, "test_checkout");
    }

    #[test]
    fn split_identity_nested_class() {
        let (module, name) = split_identity("tests/test_api.py::TestAuth::test_login");
        assert_eq!(module, "tests/test_api.py");
        assert_eq!(name, "test_login");
    }

    #[test]
    fn split_identity_without_separator() {
        let (module, name) = split_identity("standalone");
        assert_eq!(module, "standalone");
        assert_eq!(name, "standalone");
    }

    #[test]
    fn record_outcome_keeps_counters_in_step() {
        let mut record = TestRecord::new("t.py::test_a");
        record.record_outcome(true);
        record.record_outcome(false);
        record.record_outcome(true);
        assert_eq!(record.results, vec![true, false, true]);
        assert_eq!(record.passes, 2);
        assert_eq!(record.failures, 1);
        assert_eq!(record.results.len(), record.passes + record.failures);
    }

    #[test]
    fn has_complete_data_tracks_iteration_target() {
        let mut record = TestRecord::new("t.py::test_a");
        for _ in 0..4 {
            record.record_outcome(true);
        }
        assert!(!record.has_complete_data(5));
        record.record_outcome(true);
        assert!(record.has_complete_data(5));
    }

    #[test]
    fn document_serializes_with_stable_field_names() {
        let mut tests = BTreeMap::new();
        tests.insert("t.py::test_a".to_string(), TestRecord::new("t.py::test_a"));
        let doc = ResultDocument {
            metadata: RunMetadata {
                timestamp: "2025-01-01T00:00:00+00:00".into(),
                iterations: 5,
                test_path: "tests/".into(),
                output_file: "results/run.json".into(),
            },
            tests,
            summary: SuiteSummary::default(),
        };
        let v: serde_json::Value = serde_json::to_value(&doc).unwrap();
        assert!(v["metadata"]["timestamp"].is_string());
        assert_eq!(v["metadata"]["iterations"], 5);
        let record = &v["tests"]["t.py::test_a"];
        for field in [
            "id",
            "module",
            "name",
            "results",
            "passes",
            "failures",
            "flaky",
            "flaky_score",
            "always_passes",
            "always_fails",
            "logs",
        ] {
            assert!(
                record.get(field).is_some(),
                "missing field {field} in serialized record"
            );
        }
        for field in [
            "total_tests",
            "flaky_tests",
            "stable_tests",
            "always_pass",
            "always_fail",
            "suite_stability_percentage",
        ] {
            assert!(
                v["summary"].get(field).is_some(),
                "missing field {field} in serialized summary"
            );
        }
    }
}
