//! Pretty JSON formatter for mined projects.

use std::io::Write;

use crate::github::error::MiningError;
use crate::github::models::Project;

/// Writes the project as a pretty-printed JSON document followed by a newline.
///
/// # Errors
///
/// Returns [`MiningError::Io`] if serialisation or writing fails.
pub fn write_project_json<W: Write>(writer: &mut W, project: &Project) -> Result<(), MiningError> {
    serde_json::to_writer_pretty(&mut *writer, project).map_err(|e| MiningError::Io {
        message: format!("JSON serialization failed: {e}"),
    })?;
    writeln!(writer).map_err(|e| io_error(&e))?;
    writer.flush().map_err(|e| io_error(&e))
}

/// Converts an I/O error to a [`MiningError::Io`].
fn io_error(error: &std::io::Error) -> MiningError {
    MiningError::Io {
        message: error.to_string(),
    }
}
