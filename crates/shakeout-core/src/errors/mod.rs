//! Error types for detection runs.
//!
//! Two families with very different blast radius: [`ConfigError`]
//! aborts orchestration before any trial runs, while [`TrialError`]
//! is recovered locally by dropping the affected iteration.

/// Fatal setup problems. Nothing has executed when one of these is
/// raised.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The suite location does not exist on disk.
    #[error("test path not found: {path}")]
    TestPathNotFound { path: String },

    /// Iteration count must be at least 1.
    #[error("invalid iteration count: {value}")]
    InvalidIterations { value: usize },

    /// The runner command prefix resolved to nothing.
    #[error("runner command is empty")]
    EmptyRunnerCommand,
}

/// One trial failed to produce a usable report. The orchestrator logs
/// these and moves on; they never propagate out of the run loop.
#[derive(Debug, thiserror::Error)]
pub enum TrialError {
    /// The runner process could not be started.
    #[error("failed to spawn runner `{command}`: {message}")]
    Spawn { command: String, message: String },

    /// The runner started but its exit could not be observed.
    #[error("runner did not complete: {message}")]
    Wait { message: String },

    /// The trial exceeded the configured bound and was killed.
    #[error("trial exceeded timeout of {seconds}s")]
    Timeout { seconds: u64 },

    /// The runner exited without writing its report file.
    #[error("report file not found: {path}")]
    ReportMissing { path: String },

    /// The report file exists but could not be read.
    #[error("failed to read report {path}: {message}")]
    ReportUnreadable { path: String, message: String },

    /// The report file is not valid JSON.
    #[error("report is not valid JSON: {message}")]
    ReportParse { message: String },

    /// The report parsed but carries no per-test section, which is
    /// indistinguishable from a runner misfire and must not be
    /// mistaken for an empty suite.
    #[error("report has no tests section: {path}")]
    MissingTestsSection { path: String },
}

impl TrialError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// Result type for single-trial execution.
pub type TrialResult<T> = Result<T, TrialError>;
