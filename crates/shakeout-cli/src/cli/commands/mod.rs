pub mod dispatch;
pub mod insights;
pub mod run;

pub use dispatch::dispatch;
