//! Flakiness classification and suite statistics.
//!
//! Pure and deterministic: the same record set always scores the same
//! way, so re-running the scorer is free of side effects and safe.
//! Runs once per orchestrated run, after the trial loop has finished.

use crate::model::{SuiteSummary, TestRecord};
use std::collections::BTreeMap;

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Flakiness score over a completed outcome split.
///
/// `0.0` for uniform outcomes (all pass or all fail); otherwise
/// `2 * min(passes, failures) / total`, rounded to 4 decimals. The
/// score measures how close the split is to a coin flip, not the raw
/// failure rate: `1.0` exactly at 50/50, approaching `0.0` as the
/// split becomes lopsided.
pub fn flakiness(passes: usize, failures: usize) -> f64 {
    let total = passes + failures;
    if total == 0 || passes == 0 || failures == 0 {
        return 0.0;
    }
    round4(2.0 * passes.min(failures) as f64 / total as f64)
}

/// Classify every fully-observed record and derive the suite summary.
///
/// A record that missed one or more iterations has partial data: it is
/// warned about, keeps its classification defaults, and is excluded
/// from every summary counter. Tests observed fewer times than
/// configured must not be conflated with tests that never failed.
///
/// The stability percentage excludes always-failing tests from the
/// numerator while counting them in the denominator, so a persistently
/// broken test drags the suite down even though it is not flaky.
pub fn classify(tests: &mut BTreeMap<String, TestRecord>, iterations: usize) -> SuiteSummary {
    let mut total_tests = 0usize;
    let mut flaky_tests = 0usize;
    let mut stable_tests = 0usize;
    let mut always_pass = 0usize;
    let mut always_fail = 0usize;

    for (id, record) in tests.iter_mut() {
        if !record.has_complete_data(iterations) {
            tracing::warn!(
                test_id = %id,
                observed = record.results.len(),
                expected = iterations,
                "test was not observed in all iterations; excluded from classification"
            );
            continue;
        }

        total_tests += 1;
        let total = record.results.len();
        record.flaky = record.passes > 0 && record.passes < total;
        record.flaky_score = flakiness(record.passes, record.failures);
        record.always_passes = record.passes == total;
        record.always_fails = record.failures == total;

        if record.flaky {
            flaky_tests += 1;
        } else {
            stable_tests += 1;
            if record.always_passes {
                always_pass += 1;
            } else if record.always_fails {
                always_fail += 1;
            }
        }
    }

    let suite_stability_percentage = if total_tests > 0 {
        round2(100.0 * (stable_tests - always_fail) as f64 / total_tests as f64)
    } else {
        100.0
    };

    SuiteSummary {
        total_tests,
        flaky_tests,
        stable_tests,
        always_pass,
        always_fail,
        suite_stability_percentage,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_with(id: &str, outcomes: &[bool]) -> TestRecord {
        let mut record = TestRecord::new(id);
        for &passed in outcomes {
            record.record_outcome(passed);
        }
        record
    }

    fn suite(records: Vec<TestRecord>) -> BTreeMap<String, TestRecord> {
        records.into_iter().map(|r| (r.id.clone(), r)).collect()
    }

    #[test]
    fn flakiness_is_zero_for_uniform_outcomes() {
        assert_eq!(flakiness(5, 0), 0.0);
        assert_eq!(flakiness(0, 5), 0.0);
        assert_eq!(flakiness(0, 0), 0.0);
    }

    #[test]
    fn flakiness_is_one_at_even_split() {
        assert_eq!(flakiness(2, 2), 1.0);
        assert_eq!(flakiness(5, 5), 1.0);
    }

    #[test]
    fn flakiness_three_passes_two_failures_is_point_eight() {
        assert_eq!(flakiness(3, 2), 0.8);
    }

    #[test]
    fn flakiness_rounds_to_four_decimals() {
        // 2 * 1 / 3 = 0.6666...
        assert_eq!(flakiness(1, 2), 0.6667);
        // 2 * 1 / 6 = 0.3333...
        assert_eq!(flakiness(1, 5), 0.3333);
    }

    #[test]
    fn flakiness_grows_toward_even_split() {
        let scores: Vec<f64> = (1..=5).map(|p| flakiness(p, 10 - p)).collect();
        for pair in scores.windows(2) {
            assert!(pair[0] < pair[1], "expected increasing scores: {scores:?}");
        }
    }

    #[test]
    fn classify_marks_mixed_outcomes_flaky() {
        let mut tests = suite(vec![record_with(
            "t.py::test_toggle",
            &[true, false, true, false, true],
        )]);
        let summary = classify(&mut tests, 5);

        let record = &tests["t.py::test_toggle"];
        assert!(record.flaky);
        assert_eq!(record.passes, 3);
        assert_eq!(record.failures, 2);
        assert_eq!(record.flaky_score, 0.8);
        assert!(!record.always_passes);
        assert!(!record.always_fails);
        assert_eq!(summary.flaky_tests, 1);
        assert_eq!(summary.stable_tests, 0);
    }

    #[test]
    fn classify_always_failing_is_stable_but_lowers_stability() {
        let mut tests = suite(vec![record_with("t.py::test_broken", &[false; 5])]);
        let summary = classify(&mut tests, 5);

        let record = &tests["t.py::test_broken"];
        assert!(!record.flaky);
        assert_eq!(record.flaky_score, 0.0);
        assert!(record.always_fails);
        assert_eq!(summary.always_fail, 1);
        assert_eq!(summary.stable_tests, 1);
        assert_eq!(summary.suite_stability_percentage, 0.0);
    }

    #[test]
    fn classify_mixed_suite_stability_percentage() {
        let mut tests = suite(vec![
            record_with("t.py::test_flaky", &[true, false, true, false, true]),
            record_with("t.py::test_solid", &[true; 5]),
            record_with("t.py::test_broken", &[false; 5]),
        ]);
        let summary = classify(&mut tests, 5);

        assert_eq!(summary.total_tests, 3);
        assert_eq!(summary.flaky_tests, 1);
        assert_eq!(summary.stable_tests, 2);
        assert_eq!(summary.always_pass, 1);
        assert_eq!(summary.always_fail, 1);
        // 100 * (2 - 1) / 3
        assert_eq!(summary.suite_stability_percentage, 33.33);
    }

    #[test]
    fn classify_excludes_partial_records_from_summary() {
        let mut tests = suite(vec![
            record_with("t.py::test_partial", &[true, true, true, true]),
            record_with("t.py::test_full", &[true; 5]),
        ]);
        let summary = classify(&mut tests, 5);

        assert_eq!(summary.total_tests, 1);
        assert_eq!(summary.always_pass, 1);
        let partial = &tests["t.py::test_partial"];
        assert!(!partial.flaky);
        assert_eq!(partial.flaky_score, 0.0);
        assert!(!partial.always_passes, "partial data must not classify");
        // Accumulated state is preserved for downstream inspection.
        assert_eq!(partial.results.len(), 4);
        assert_eq!(partial.passes, 4);
    }

    #[test]
    fn classify_empty_suite_is_fully_stable() {
        let mut tests = BTreeMap::new();
        let summary = classify(&mut tests, 5);
        assert_eq!(summary.total_tests, 0);
        assert_eq!(summary.suite_stability_percentage, 100.0);
    }

    #[test]
    fn classify_is_idempotent() {
        let mut tests = suite(vec![
            record_with("t.py::test_flaky", &[true, false, true, false, true]),
            record_with("t.py::test_solid", &[true; 5]),
        ]);
        let first = classify(&mut tests, 5);
        let snapshot = tests.clone();
        let second = classify(&mut tests, 5);

        assert_eq!(first, second);
        assert_eq!(snapshot, tests);
    }
}
