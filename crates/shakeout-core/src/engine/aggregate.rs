//! Cross-trial outcome aggregation.
//!
//! The aggregator is the single writer of per-test state during a run.
//! The orchestrator feeds it one report at a time with a unique,
//! monotonically increasing iteration index; no deduplication happens
//! here.

use crate::model::{LogEntry, TestRecord, TrialReport};
use std::collections::BTreeMap;

/// Accumulates per-identity outcome state across trials.
///
/// Records are keyed by identity in a `BTreeMap` so downstream
/// serialization and iteration order are deterministic.
#[derive(Debug, Default)]
pub struct Aggregator {
    tests: BTreeMap<String, TestRecord>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one trial's report into the cumulative state.
    ///
    /// New identities get a fresh record; every case appends its
    /// outcome and bumps the matching counter. Failure detail becomes
    /// a log entry tagged with the trial's index; passing cases never
    /// produce log text.
    pub fn absorb(&mut self, report: &TrialReport, iteration: usize) {
        for case in &report.cases {
            let record = self
                .tests
                .entry(case.id.clone())
                .or_insert_with(|| TestRecord::new(&case.id));
            record.record_outcome(case.passed);
            if !case.passed {
                if let Some(detail) = &case.detail {
                    record.logs.push(LogEntry {
                        iteration,
                        log: detail.clone(),
                    });
                }
            }
        }
    }

    /// Number of distinct identities observed so far.
    pub fn len(&self) -> usize {
        self.tests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }

    /// Consume the aggregator, yielding the final record set for
    /// scoring.
    pub fn into_tests(self) -> BTreeMap<String, TestRecord> {
        self.tests
    }
}
