//! Table schema inference from the head of a CSV file.

use std::fs::File;
use std::io::{BufReader, Cursor};
use std::path::{Path, PathBuf};

use csv::{ByteRecord, ReaderBuilder, WriterBuilder};
use encoding_rs::{Encoding, UTF_8};
use polars::prelude::{CsvReadOptions, SerReader};
use serde::Serialize;
use stager_split::{
    SniffError, SplitError, Sniffer, check_encoding, decode_field, resolve_csv_path,
};
use tracing::{debug, info};

use crate::error::{Result, SchemaError};
use crate::types::{WarehouseType, source_type_name, warehouse_type_for};

/// Rows read for type inference unless configured otherwise.
pub const DEFAULT_SAMPLE_ROWS: usize = 100;

/// Options for [`infer_table_schema`].
#[derive(Debug, Clone, Copy)]
pub struct SchemaOptions {
    /// Data rows (after the header) used for type inference.
    pub sample_rows: usize,
    /// Encoding of the source file.
    pub encoding: &'static Encoding,
}

impl Default for SchemaOptions {
    fn default() -> Self {
        Self {
            sample_rows: DEFAULT_SAMPLE_ROWS,
            encoding: UTF_8,
        }
    }
}

impl SchemaOptions {
    #[must_use]
    pub fn with_sample_rows(mut self, rows: usize) -> Self {
        self.sample_rows = rows;
        self
    }

    #[must_use]
    pub fn with_encoding(mut self, encoding: &'static Encoding) -> Self {
        self.encoding = encoding;
        self
    }
}

/// One column of the inferred table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnSchema {
    pub name: String,
    /// Inferred source type name, e.g. `int64` or `object`.
    pub source_type: String,
    pub warehouse_type: WarehouseType,
}

/// Warehouse table layout inferred for a source CSV.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableSchema {
    /// Table name: the source file stem.
    pub table_name: String,
    /// Stage name: `{table_name}_stage`.
    pub stage_name: String,
    #[serde(skip)]
    pub source: PathBuf,
    pub delimiter: char,
    /// Data rows the types were inferred from.
    pub sampled_rows: usize,
    pub columns: Vec<ColumnSchema>,
}

/// Derives the table name from a source path.
pub fn table_name_for(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Derives the stage name from a table name.
pub fn stage_name_for(table_name: &str) -> String {
    format!("{table_name}_stage")
}

/// Infers the target table schema of the CSV at `path`.
///
/// `path` may be a file or a directory (its first CSV file is used). The
/// delimiter is sniffed, then the header and the first
/// `options.sample_rows` rows are decoded and handed to polars for type
/// inference. Date-like text is not parsed, so it stays `object`. Each
/// inferred dtype is mapped through
/// [`TYPE_MAPPING`](crate::TYPE_MAPPING).
pub fn infer_table_schema(path: &Path, options: &SchemaOptions) -> Result<TableSchema> {
    if options.sample_rows == 0 {
        return Err(SchemaError::InvalidOptions {
            reason: "sample rows must be at least 1".to_string(),
        });
    }
    check_encoding(options.encoding)?;
    let source = resolve_csv_path(path)?;

    let file = File::open(&source).map_err(|e| SplitError::read(&source, e))?;
    let mut reader = BufReader::new(file);
    let delimiter = Sniffer::new()
        .encoding(options.encoding)
        .sniff(&mut reader)
        .map_err(|e| match e {
            SniffError::Io(e) => SchemaError::FileRead {
                path: source.clone(),
                source: e,
            },
            SniffError::Undetectable => SplitError::DelimiterUndetectable {
                path: source.clone(),
            }
            .into(),
        })?;
    debug!(
        source = %source.display(),
        delimiter = %(delimiter as char).escape_default(),
        "detected delimiter"
    );

    let sample = read_sample(&source, reader, delimiter, options)?;
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(options.sample_rows))
        .map_parse_options(|parse| parse.with_truncate_ragged_lines(true))
        .into_reader_with_file_handle(Cursor::new(sample))
        .finish()
        .map_err(|e| SchemaError::CsvParse {
            path: source.clone(),
            message: e.to_string(),
        })?;

    let columns: Vec<ColumnSchema> = df
        .get_columns()
        .iter()
        .map(|column| {
            let source_type = source_type_name(column.dtype());
            ColumnSchema {
                name: column.name().to_string(),
                source_type: source_type.to_string(),
                warehouse_type: warehouse_type_for(source_type),
            }
        })
        .collect();

    let table_name = table_name_for(&source);
    info!(
        table = %table_name,
        columns = columns.len(),
        sampled_rows = df.height(),
        "inferred table schema"
    );

    Ok(TableSchema {
        stage_name: stage_name_for(&table_name),
        table_name,
        source,
        delimiter: delimiter as char,
        sampled_rows: df.height(),
        columns,
    })
}

/// Re-encodes the header and the sampled rows as comma-separated UTF-8.
fn read_sample(
    path: &Path,
    reader: BufReader<File>,
    delimiter: u8,
    options: &SchemaOptions,
) -> Result<Vec<u8>> {
    let csv_error = |source: csv::Error| SchemaError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut csv_reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(reader);
    let mut writer = WriterBuilder::new().flexible(true).from_writer(Vec::new());

    let mut record = ByteRecord::new();
    let mut rows = 0usize;
    while rows <= options.sample_rows {
        if !csv_reader.read_byte_record(&mut record).map_err(csv_error)? {
            break;
        }
        let fields: Vec<String> = record
            .iter()
            .map(|field| decode_field(options.encoding, field))
            .collect();
        writer.write_record(&fields).map_err(csv_error)?;
        rows += 1;
    }
    if rows == 0 {
        return Err(SchemaError::EmptyCsv {
            path: path.to_path_buf(),
        });
    }

    writer
        .into_inner()
        .map_err(|e| csv_error(csv::Error::from(e.into_error())))
}
