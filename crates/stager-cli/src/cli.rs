//! CLI argument definitions for csv-stager.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use encoding_rs::Encoding;
use stager_schema::DEFAULT_SAMPLE_ROWS;
use stager_split::encoding_for_label;

#[derive(Parser)]
#[command(
    name = "csv-stager",
    version,
    about = "Split large CSV exports into size-bounded parts for a warehouse stage",
    long_about = "Split large CSV exports into size-bounded parts for a warehouse stage.\n\n\
                  Strips NUL bytes, detects the delimiter, and writes parts that each\n\
                  carry the header row. Can also infer the target table schema."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Clean a CSV file and split it into header-carrying parts.
    Split(SplitArgs),

    /// Infer the warehouse table schema of a CSV file.
    Schema(SchemaArgs),
}

#[derive(Parser)]
pub struct SplitArgs {
    /// CSV file, or a directory whose first CSV file is used.
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Maximum part size in MiB.
    #[arg(
        short = 's',
        long = "size-part",
        value_name = "MIB",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub size_part: u64,

    /// Output directory, recreated on every run (default: <PATH parent>/<PATH stem>).
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Source text encoding label (e.g. utf-8, latin1, windows-1252).
    #[arg(long = "encoding", value_name = "LABEL", default_value = "utf-8", value_parser = parse_encoding)]
    pub encoding: &'static Encoding,
}

#[derive(Parser)]
pub struct SchemaArgs {
    /// CSV file, or a directory whose first CSV file is used.
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Number of data rows used for type inference.
    #[arg(
        long = "rows",
        value_name = "N",
        default_value_t = DEFAULT_SAMPLE_ROWS as u64,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub rows: u64,

    /// Source text encoding label.
    #[arg(long = "encoding", value_name = "LABEL", default_value = "utf-8", value_parser = parse_encoding)]
    pub encoding: &'static Encoding,

    /// Print the schema as JSON instead of a table.
    #[arg(long = "json")]
    pub json: bool,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

fn parse_encoding(label: &str) -> Result<&'static Encoding, String> {
    encoding_for_label(label).map_err(|e| e.to_string())
}
