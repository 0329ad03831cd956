//! Trial execution and aggregation pipeline.

pub mod aggregate;
pub mod runner;
pub mod score;
pub mod trial;

pub use aggregate::Aggregator;
pub use runner::{Detector, RunPolicy};
pub use score::{classify, flakiness};
pub use trial::TrialRunner;
