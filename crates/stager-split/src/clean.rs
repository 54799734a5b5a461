//! NUL-byte stripping ahead of text decoding.
//!
//! Exported spreadsheets and database dumps regularly carry stray `0x00`
//! bytes that break CSV parsers and warehouse loaders alike. The cleaner
//! works on raw bytes in fixed-size blocks so memory stays bounded and
//! malformed text never reaches a decoder before the NULs are gone.

use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::error::{Result, SplitError};
use crate::options::SplitOptions;

/// Outcome of a cleaning pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanReport {
    /// Path of the cleaned copy.
    pub path: PathBuf,
    /// Bytes read from the source.
    pub bytes_read: u64,
    /// Bytes written to the cleaned copy.
    pub bytes_written: u64,
}

impl CleanReport {
    pub fn nul_bytes_removed(&self) -> u64 {
        self.bytes_read - self.bytes_written
    }
}

/// Path of the cleaned copy: a sibling of `source` named `file_name`.
pub fn cleaned_path_for(source: &Path, file_name: &str) -> PathBuf {
    source
        .parent()
        .unwrap_or_else(|| Path::new(""))
        .join(file_name)
}

/// Resolves the cleaned copy's path, refusing one that is `source` itself.
pub(crate) fn clean_target(source: &Path, options: &SplitOptions) -> Result<PathBuf> {
    let target = cleaned_path_for(source, &options.cleaned_file_name);
    if same_file(source, &target) {
        return Err(SplitError::CleanTargetIsSource { path: target });
    }
    Ok(target)
}

/// Writes a NUL-free copy of `source` next to it, overwriting any previous copy.
pub fn clean_file(source: &Path, options: &SplitOptions) -> Result<CleanReport> {
    options.validate()?;
    let target = clean_target(source, options)?;

    info!(
        source = %source.display(),
        target = %target.display(),
        "cleaning CSV"
    );

    let mut input = File::open(source).map_err(|e| SplitError::read(source, e))?;
    let output = File::create(&target).map_err(|e| SplitError::write(&target, e))?;
    let mut output = BufWriter::new(output);

    let (bytes_read, bytes_written) =
        strip_nul_bytes(&mut input, &mut output, options.clean_block_size).map_err(|e| {
            match e {
                StripError::Read(e) => SplitError::read(source, e),
                StripError::Write(e) => SplitError::write(&target, e),
            }
        })?;
    output.flush().map_err(|e| SplitError::write(&target, e))?;

    let report = CleanReport {
        path: target,
        bytes_read,
        bytes_written,
    };
    debug!(
        bytes_read,
        bytes_written,
        nul_bytes_removed = report.nul_bytes_removed(),
        "CSV cleaned"
    );
    Ok(report)
}

/// Which side of the copy failed.
#[derive(Debug, Error)]
pub enum StripError {
    /// Reading a block from the source failed.
    #[error("failed to read block: {0}")]
    Read(#[source] io::Error),

    /// Writing a cleaned block failed.
    #[error("failed to write block: {0}")]
    Write(#[source] io::Error),
}

/// Copies `reader` to `writer` block by block, dropping every `0x00` byte.
///
/// Returns `(bytes_read, bytes_written)`.
pub fn strip_nul_bytes<R: Read, W: Write>(
    reader: &mut R,
    writer: &mut W,
    block_size: usize,
) -> std::result::Result<(u64, u64), StripError> {
    let mut block = vec![0u8; block_size.max(1)];
    let mut bytes_read = 0u64;
    let mut bytes_written = 0u64;

    loop {
        let n = match reader.read(&mut block) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(StripError::Read(e)),
        };
        bytes_read += n as u64;
        for run in block[..n].split(|&b| b == 0) {
            if run.is_empty() {
                continue;
            }
            writer.write_all(run).map_err(StripError::Write)?;
            bytes_written += run.len() as u64;
        }
    }

    Ok((bytes_read, bytes_written))
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn strip(input: &[u8], block_size: usize) -> Vec<u8> {
        let mut out = Vec::new();
        strip_nul_bytes(&mut Cursor::new(input), &mut out, block_size).unwrap();
        out
    }

    #[test]
    fn test_strip_removes_nul_bytes() {
        assert_eq!(strip(b"a\0b,\0\0c\n", 1024), b"ab,c\n");
    }

    #[test]
    fn test_strip_across_block_boundaries() {
        assert_eq!(strip(b"\0a\0b\0c\0", 2), b"abc");
        assert_eq!(strip(b"\0\0\0", 1), b"");
    }

    #[test]
    fn test_strip_counts() {
        let mut out = Vec::new();
        let (read, written) =
            strip_nul_bytes(&mut Cursor::new(b"x\0y".to_vec()), &mut out, 8).unwrap();
        assert_eq!((read, written), (3, 2));
    }

    #[test]
    fn test_strip_error_display() {
        let err = StripError::Write(io::Error::other("disk full"));
        assert_eq!(err.to_string(), "failed to write block: disk full");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_cleaned_path_is_sibling() {
        let path = cleaned_path_for(Path::new("/data/in/sales_2024.csv"), "records_clean.csv");
        assert_eq!(path, PathBuf::from("/data/in/records_clean.csv"));

        let path = cleaned_path_for(Path::new("sales.csv"), "records_clean.csv");
        assert_eq!(path, PathBuf::from("records_clean.csv"));
    }
}
