//! CSV preparation for bulk warehouse loads.
//!
//! This crate turns one (possibly multi-gigabyte) CSV export into a set of
//! size-bounded part files that a stage upload can take one by one.
//!
//! # Pipeline
//!
//! - **Clean**: copy the source with every NUL byte removed
//! - **Sniff**: infer the field delimiter from the first 2048 characters
//! - **Split**: stream rows into `{base}_part{N}{ext}` files, each starting
//!   with the header, rolling over before a part outgrows the ceiling
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use stager_split::{SplitOptions, clean_and_split, default_output_dir};
//!
//! let source = Path::new("exports/sales_2024.csv");
//! let options = SplitOptions::default().with_max_part_mib(100);
//! let outcome = clean_and_split(source, &default_output_dir(source), &options)?;
//! println!("{} parts", outcome.split.part_count());
//! ```

mod chunk_writer;
mod clean;
mod discovery;
mod error;
mod options;
mod output_dir;
mod pipeline;
mod sniff;
mod split;
mod text;

// === Error Types ===
pub use error::{Result, SniffError, SplitError};

// === Configuration ===
pub use options::{
    CLEANED_FILE_NAME, DEFAULT_CLEAN_BLOCK_SIZE, DEFAULT_MAX_PART_MIB, DEFAULT_SAMPLE_CHARS, MIB,
    SplitOptions, check_encoding, encoding_for_label,
};

// === Pipeline Stages ===
pub use chunk_writer::{ChunkWriter, PartLayout, PartNaming, PartSummary};
pub use clean::{CleanReport, StripError, clean_file, cleaned_path_for, strip_nul_bytes};
pub use sniff::{Sniffer, guess_delimiter};
pub use split::{SplitReport, split_csv, split_file};
pub use text::{approx_record_size, decode_field};

// === Input / Output ===
pub use discovery::{list_csv_files, resolve_csv_path};
pub use output_dir::{default_output_dir, ensure_source_outside, prepare_output_dir};
pub use pipeline::{SplitOutcome, clean_and_split};
