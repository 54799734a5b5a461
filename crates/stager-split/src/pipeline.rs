//! Clean, sniff, and split one source file end to end.

use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{info, info_span};

use crate::chunk_writer::PartNaming;
use crate::clean::{CleanReport, clean_file, clean_target};
use crate::error::{Result, SplitError};
use crate::options::SplitOptions;
use crate::output_dir::{ensure_source_outside, prepare_output_dir};
use crate::split::{SplitReport, split_csv};

/// Everything a full split run produced.
#[derive(Debug, Clone)]
pub struct SplitOutcome {
    pub source: PathBuf,
    pub output_dir: PathBuf,
    /// Whether an existing output directory was destroyed.
    pub replaced_output_dir: bool,
    pub clean: CleanReport,
    pub split: SplitReport,
}

/// Recreates `output_dir`, writes the NUL-free copy next to `source`, and
/// splits it into parts named after `source`.
///
/// All argument checks happen before any file is created or removed. The
/// cleaned copy is left on disk.
pub fn clean_and_split(
    source: &Path,
    output_dir: &Path,
    options: &SplitOptions,
) -> Result<SplitOutcome> {
    let span = info_span!("split_source", source = %source.display());
    let _guard = span.enter();

    options.validate()?;
    if !source.is_file() {
        return Err(SplitError::FileNotFound {
            path: source.to_path_buf(),
        });
    }
    ensure_source_outside(output_dir, source)?;
    clean_target(source, options)?;

    let start = Instant::now();
    let replaced_output_dir = prepare_output_dir(output_dir)?;
    let clean = clean_file(source, options)?;
    let naming = PartNaming::from_path(source);
    let split = split_csv(&clean.path, output_dir, &naming, options)?;

    info!(
        parts = split.part_count(),
        rows = split.total_rows,
        nul_bytes_removed = clean.nul_bytes_removed(),
        duration_ms = start.elapsed().as_millis(),
        "source split"
    );

    Ok(SplitOutcome {
        source: source.to_path_buf(),
        output_dir: output_dir.to_path_buf(),
        replaced_output_dir,
        clean,
        split,
    })
}
