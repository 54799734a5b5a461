use anyhow::{Context, Result};
use stager_schema::{SchemaOptions, TableSchema, infer_table_schema};
use stager_split::{
    SplitOptions, SplitOutcome, clean_and_split, default_output_dir, resolve_csv_path,
};
use tracing::info;

use crate::cli::{SchemaArgs, SplitArgs};

pub fn run_split(args: &SplitArgs) -> Result<SplitOutcome> {
    let source = resolve_csv_path(&args.path)
        .with_context(|| format!("resolve input {}", args.path.display()))?;
    let output_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| default_output_dir(&source));
    let options = SplitOptions::default()
        .with_max_part_mib(args.size_part)
        .with_encoding(args.encoding);
    info!(
        source = %source.display(),
        output_dir = %output_dir.display(),
        max_part_mib = args.size_part,
        encoding = args.encoding.name(),
        "starting split"
    );
    clean_and_split(&source, &output_dir, &options)
        .with_context(|| format!("split {}", source.display()))
}

pub fn run_schema(args: &SchemaArgs) -> Result<TableSchema> {
    let rows = usize::try_from(args.rows).context("--rows does not fit in memory")?;
    let options = SchemaOptions::default()
        .with_sample_rows(rows)
        .with_encoding(args.encoding);
    infer_table_schema(&args.path, &options)
        .with_context(|| format!("infer schema of {}", args.path.display()))
}
