//! Output of mined projects.
//!
//! A finished [`Project`](crate::github::Project) is written as pretty JSON,
//! either to any writer or to a file whose missing parent directories are
//! created first. A one-line [`ProjectSummary`] is printed by the CLI.

mod json;
mod output;
mod summary;

pub use json::write_project_json;
pub use output::{create_output_file, write_project_file};
pub use summary::ProjectSummary;
