//! Flaky-test detection engine.
//!
//! This crate runs a test suite repeatedly in isolated subprocesses,
//! aggregates per-test outcomes across trials, and scores each test for
//! flakiness. It provides:
//!
//! - Subprocess trial execution with JSON report parsing
//! - Outcome aggregation keyed by stable test identity
//! - Deterministic flakiness scoring and suite stability metrics
//! - Persisted result documents plus optional AI-assisted insights
//!
//! # Quick Start
//!
//! ```no_run
//! use shakeout_core::engine::{Detector, RunPolicy};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let detector = Detector::new("tests/", None, "results", RunPolicy::default())?;
//! let document = detector.run().await?;
//! for record in document.flaky_tests() {
//!     println!("{} flaked with score {:.2}", record.id, record.flaky_score);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Iteration failures are tolerated: a trial that cannot produce a
//! parseable report is dropped, the affected tests keep whatever
//! outcomes other trials produced, and tests with incomplete data are
//! excluded from classification rather than misclassified.

pub mod engine;
pub mod errors;
pub mod insights;
pub mod model;
pub mod report;

pub use engine::{Detector, RunPolicy};
pub use errors::{ConfigError, TrialError};
pub use model::{ResultDocument, TestRecord};
