//! Streaming CSV splitter.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use csv::{ByteRecord, ReaderBuilder};
use tracing::{debug, info, trace};

use crate::chunk_writer::{ChunkWriter, PartLayout, PartNaming, PartSummary};
use crate::error::{Result, SniffError, SplitError};
use crate::options::SplitOptions;
use crate::sniff::Sniffer;
use crate::text::{decode_field, flatten_newlines};

/// Result of splitting one file.
#[derive(Debug, Clone)]
pub struct SplitReport {
    /// File that was read.
    pub input: PathBuf,
    /// Detected field delimiter.
    pub delimiter: u8,
    /// Header row replicated into every part.
    pub header: Vec<String>,
    /// Parts in sequence order.
    pub parts: Vec<PartSummary>,
    /// Data rows written across all parts.
    pub total_rows: u64,
}

impl SplitReport {
    pub fn part_count(&self) -> usize {
        self.parts.len()
    }
}

/// Splits `input` into parts named after `input` itself.
pub fn split_file(input: &Path, output_dir: &Path, options: &SplitOptions) -> Result<SplitReport> {
    split_csv(input, output_dir, &PartNaming::from_path(input), options)
}

/// Splits `input` into header-carrying parts under `output_dir`.
///
/// The delimiter is sniffed from the head of the file. Undecodable bytes are
/// replaced, never fatal. Line feeds inside data fields become spaces. Parts
/// roll over before a record would push the approximate size past
/// `options.max_part_bytes`.
pub fn split_csv(
    input: &Path,
    output_dir: &Path,
    naming: &PartNaming,
    options: &SplitOptions,
) -> Result<SplitReport> {
    options.validate()?;
    let encoding = options.encoding;

    let file = File::open(input).map_err(|e| SplitError::read(input, e))?;
    let mut reader = BufReader::new(file);

    let delimiter = Sniffer::from_options(options)
        .sniff(&mut reader)
        .map_err(|e| match e {
            SniffError::Io(source) => SplitError::read(input, source),
            SniffError::Undetectable => SplitError::DelimiterUndetectable {
                path: input.to_path_buf(),
            },
        })?;
    info!(
        input = %input.display(),
        delimiter = %(delimiter as char).escape_default(),
        "detected delimiter"
    );

    let mut csv_reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .quote(b'"')
        .from_reader(reader);

    let mut record = ByteRecord::new();
    let has_header = csv_reader
        .read_byte_record(&mut record)
        .map_err(|e| SplitError::csv(input, e))?;
    if !has_header {
        return Err(SplitError::EmptyCsv {
            path: input.to_path_buf(),
        });
    }
    let header: Vec<String> = record
        .iter()
        .map(|field| decode_field(encoding, field))
        .collect();
    debug!(columns = header.len(), "read header");

    let layout = PartLayout {
        output_dir: output_dir.to_path_buf(),
        naming: naming.clone(),
        delimiter,
        encoding,
        max_part_bytes: options.max_part_bytes,
    };
    let mut writer = ChunkWriter::create(layout, header.clone())?;

    let mut total_rows = 0u64;
    let mut fields: Vec<String> = Vec::with_capacity(header.len());
    while csv_reader
        .read_byte_record(&mut record)
        .map_err(|e| SplitError::csv(input, e))?
    {
        fields.clear();
        fields.extend(
            record
                .iter()
                .map(|field| flatten_newlines(decode_field(encoding, field))),
        );
        writer.write_row(&fields)?;
        total_rows += 1;
        trace!(row = total_rows, part = writer.sequence(), "wrote row");
    }

    let parts = writer.close()?;
    info!(
        parts = parts.len(),
        rows = total_rows,
        output_dir = %output_dir.display(),
        "split complete"
    );

    Ok(SplitReport {
        input: input.to_path_buf(),
        delimiter,
        header,
        parts,
        total_rows,
    })
}
