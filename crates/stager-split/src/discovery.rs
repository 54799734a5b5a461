//! Input resolution.

use std::path::{Path, PathBuf};

use crate::error::{Result, SplitError};

/// Lists all CSV files in a directory.
///
/// Returns files sorted by filename.
pub fn list_csv_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|e| SplitError::DirectoryRead {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut files = Vec::new();
    for entry_result in entries {
        let entry = entry_result.map_err(|e| SplitError::DirectoryRead {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();
        if path.is_file() && is_csv(&path) {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Resolves a user-supplied path to one CSV file.
///
/// A file is returned as is. A directory resolves to its first CSV file by
/// name.
pub fn resolve_csv_path(path: &Path) -> Result<PathBuf> {
    if path.is_file() {
        return Ok(path.to_path_buf());
    }
    if path.is_dir() {
        return list_csv_files(path)?
            .into_iter()
            .next()
            .ok_or_else(|| SplitError::NoCsvFiles {
                path: path.to_path_buf(),
            });
    }
    if path.exists() {
        Err(SplitError::InvalidInputPath {
            path: path.to_path_buf(),
        })
    } else {
        Err(SplitError::FileNotFound {
            path: path.to_path_buf(),
        })
    }
}

/// Case-insensitive `.csv` extension check.
fn is_csv(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}
