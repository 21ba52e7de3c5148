//! Output file creation with capability-scoped directory access.

use camino::Utf8Path;
use cap_std::ambient_authority;
use cap_std::fs_utf8::{Dir, File};

use crate::github::error::MiningError;
use crate::github::models::Project;

use super::json::write_project_json;

/// Writes the project as pretty JSON to `path`, replacing any existing file.
///
/// # Errors
///
/// Returns [`MiningError::Io`] when the file cannot be created or written.
pub fn write_project_file(path: &Utf8Path, project: &Project) -> Result<(), MiningError> {
    let mut file = create_output_file(path)?;
    write_project_json(&mut file, project)?;
    tracing::debug!(%path, "wrote project JSON");
    Ok(())
}

/// Creates (or truncates) `path`, creating missing parent directories.
///
/// # Errors
///
/// Returns [`MiningError::Io`] when `path` has no file name or a directory
/// or the file cannot be created.
pub fn create_output_file(path: &Utf8Path) -> Result<File, MiningError> {
    let parent = path.parent().unwrap_or_else(|| Utf8Path::new("."));
    let file_name = path.file_name().ok_or_else(|| MiningError::Io {
        message: format!("invalid output path '{path}': no file name"),
    })?;

    let (dir, rel_parent) = if parent.as_str().is_empty() || parent == Utf8Path::new(".") {
        (open_ambient(".")?, Utf8Path::new("."))
    } else if parent.is_absolute() {
        let rel = parent.strip_prefix("/").map_err(|_| MiningError::Io {
            message: format!("failed to normalise output directory '{parent}'"),
        })?;
        (open_ambient("/")?, rel)
    } else {
        (open_ambient(".")?, parent)
    };

    let target_dir = if rel_parent.as_str().is_empty() || rel_parent == Utf8Path::new(".") {
        dir
    } else {
        dir.create_dir_all(rel_parent)
            .map_err(|error| MiningError::Io {
                message: format!("failed to create output directory '{parent}': {error}"),
            })?;
        dir.open_dir(rel_parent).map_err(|error| MiningError::Io {
            message: format!("failed to open output directory '{parent}': {error}"),
        })?
    };

    target_dir
        .create(file_name)
        .map_err(|error| MiningError::Io {
            message: format!("failed to create output file '{path}': {error}"),
        })
}

fn open_ambient(path: &str) -> Result<Dir, MiningError> {
    Dir::open_ambient_dir(path, ambient_authority()).map_err(|error| MiningError::Io {
        message: format!("failed to open directory '{path}': {error}"),
    })
}
