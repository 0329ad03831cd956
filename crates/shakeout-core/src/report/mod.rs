//! Result persistence and console rendering.

pub mod console;
pub mod json;

pub use console::print_summary;
pub use json::{default_output_path, insights_path, read_document, write_document};
