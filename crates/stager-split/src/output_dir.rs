//! Output directory reset.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{Result, SplitError};

/// Default output directory: a sibling directory named after the source stem.
pub fn default_output_dir(source: &Path) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    source
        .parent()
        .unwrap_or_else(|| Path::new(""))
        .join(stem)
}

/// Destroys `dir` if it exists and creates it empty.
///
/// Returns whether a previous directory was removed.
pub fn prepare_output_dir(dir: &Path) -> Result<bool> {
    let existed = dir.exists();
    if existed {
        fs::remove_dir_all(dir).map_err(|e| SplitError::DirectoryRemove {
            path: dir.to_path_buf(),
            source: e,
        })?;
        info!(dir = %dir.display(), "removed existing output directory");
    }
    fs::create_dir_all(dir).map_err(|e| SplitError::DirectoryCreate {
        path: dir.to_path_buf(),
        source: e,
    })?;
    info!(dir = %dir.display(), "created output directory");
    Ok(existed)
}

/// Rejects an output directory that holds `source`, since recreating it
/// would delete the input.
pub fn ensure_source_outside(output_dir: &Path, source: &Path) -> Result<()> {
    let output = match fs::canonicalize(output_dir) {
        Ok(path) => path,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => {
            return Err(SplitError::DirectoryRead {
                path: output_dir.to_path_buf(),
                source: e,
            });
        }
    };
    let source_abs = fs::canonicalize(source).map_err(|e| SplitError::read(source, e))?;
    if source_abs.starts_with(&output) {
        return Err(SplitError::OutputContainsSource {
            output_dir: output_dir.to_path_buf(),
            source_path: source.to_path_buf(),
        });
    }
    Ok(())
}
