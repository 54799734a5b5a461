//! Size-bounded part files with a replicated header.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use csv::{QuoteStyle, Terminator, Writer, WriterBuilder};
use encoding_rs::Encoding;
use tracing::{debug, info};

use crate::error::{Result, SplitError};
use crate::text::{approx_record_size, encode_field};

/// File naming for the parts of one source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartNaming {
    /// Source stem up to the first underscore.
    pub base: String,
    /// Source extension including the dot, or empty.
    pub extension: String,
}

impl PartNaming {
    /// `sales_2024_q1.csv` → base `sales`, extension `.csv`.
    pub fn from_path(path: &Path) -> Self {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let base = stem.split('_').next().unwrap_or_default().to_string();
        let extension = path
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();
        Self { base, extension }
    }

    /// `{base}_part{sequence}{extension}`
    pub fn file_name(&self, sequence: u32) -> String {
        format!("{}_part{}{}", self.base, sequence, self.extension)
    }
}

/// A finished part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartSummary {
    /// 1-based sequence number.
    pub sequence: u32,
    pub path: PathBuf,
    /// Data rows, header excluded.
    pub rows: u64,
    /// Accumulated approximate size, header included.
    pub approx_bytes: u64,
}

/// Layout of the parts being written.
#[derive(Debug, Clone)]
pub struct PartLayout {
    pub output_dir: PathBuf,
    pub naming: PartNaming,
    pub delimiter: u8,
    pub encoding: &'static Encoding,
    pub max_part_bytes: u64,
}

struct OpenPart {
    sequence: u32,
    path: PathBuf,
    writer: Writer<BufWriter<File>>,
    size: u64,
    rows: u64,
}

/// Writes records into consecutive parts, rolling over before a record
/// would push the running approximate size past the ceiling.
///
/// At most one part is open at a time. A record larger than the ceiling on
/// its own still goes whole into the current part.
pub struct ChunkWriter {
    layout: PartLayout,
    header: Vec<String>,
    header_size: u64,
    sequence: u32,
    current: Option<OpenPart>,
    finished: Vec<PartSummary>,
}

impl ChunkWriter {
    /// Creates the writer and opens part 1 with the header.
    pub fn create(layout: PartLayout, header: Vec<String>) -> Result<Self> {
        let header_size = approx_record_size(layout.encoding, &header);
        let mut writer = Self {
            layout,
            header,
            header_size,
            sequence: 0,
            current: None,
            finished: Vec::new(),
        };
        writer.open_part()?;
        Ok(writer)
    }

    /// Opens the next part and writes the header to it.
    ///
    /// Any open part is closed first.
    pub fn open_part(&mut self) -> Result<()> {
        if let Some(part) = self.current.take() {
            self.finish(part)?;
        }
        self.current = Some(self.start_part()?);
        Ok(())
    }

    /// Writes one record, rolling over first if it would overflow the part.
    ///
    /// A part that holds no record yet always takes the next one, so no part
    /// is left with a header alone.
    pub fn write_row(&mut self, record: &[String]) -> Result<()> {
        let row_size = approx_record_size(self.layout.encoding, record);
        let max = self.layout.max_part_bytes;
        let mut part = match self.current.take() {
            Some(part) if part.rows == 0 || part.size + row_size <= max => part,
            Some(full) => {
                self.finish(full)?;
                self.start_part()?
            }
            None => self.start_part()?,
        };

        write_fields(&mut part.writer, self.layout.encoding, record)
            .map_err(|e| SplitError::csv(&part.path, e))?;
        part.size += row_size;
        part.rows += 1;
        self.current = Some(part);
        Ok(())
    }

    /// True while a part is open for writing.
    pub fn is_open(&self) -> bool {
        self.current.is_some()
    }

    /// Sequence number of the most recently opened part.
    pub fn sequence(&self) -> u32 {
        self.sequence
    }

    /// Flushes and closes the open part, returning every finished part.
    pub fn close(mut self) -> Result<Vec<PartSummary>> {
        if let Some(part) = self.current.take() {
            self.finish(part)?;
        }
        Ok(std::mem::take(&mut self.finished))
    }

    fn start_part(&mut self) -> Result<OpenPart> {
        self.sequence += 1;
        let path = self
            .layout
            .output_dir
            .join(self.layout.naming.file_name(self.sequence));
        let file = File::create(&path).map_err(|e| SplitError::write(&path, e))?;
        // Rows keep their own field count; ragged rows pass through as read.
        let mut writer = WriterBuilder::new()
            .flexible(true)
            .delimiter(self.layout.delimiter)
            .quote(b'"')
            .quote_style(QuoteStyle::Necessary)
            .terminator(Terminator::Any(b'\n'))
            .from_writer(BufWriter::new(file));

        write_fields(&mut writer, self.layout.encoding, &self.header)
            .map_err(|e| SplitError::csv(&path, e))?;

        info!(part = %path.display(), sequence = self.sequence, "opened part");
        Ok(OpenPart {
            sequence: self.sequence,
            path,
            writer,
            size: self.header_size,
            rows: 0,
        })
    }

    /// Flushes a part and drops its handle.
    fn finish(&mut self, mut part: OpenPart) -> Result<()> {
        part.writer
            .flush()
            .map_err(|e| SplitError::write(&part.path, e))?;
        debug!(
            sequence = part.sequence,
            rows = part.rows,
            approx_bytes = part.size,
            "closed part"
        );
        self.finished.push(PartSummary {
            sequence: part.sequence,
            path: part.path,
            rows: part.rows,
            approx_bytes: part.size,
        });
        Ok(())
    }
}

fn write_fields(
    writer: &mut Writer<BufWriter<File>>,
    encoding: &'static Encoding,
    fields: &[String],
) -> csv::Result<()> {
    writer.write_record(fields.iter().map(|field| encode_field(encoding, field)))
}
