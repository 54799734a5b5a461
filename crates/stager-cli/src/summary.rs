//! Console rendering of split and schema results.

use std::path::Path;

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use stager_schema::TableSchema;
use stager_split::{MIB, SplitOutcome};

/// Renders the run header lines printed above the parts table.
pub fn split_overview(outcome: &SplitOutcome) -> String {
    let split = &outcome.split;
    let mut lines = vec![
        format!("Source: {}", outcome.source.display()),
        format!("Cleaned copy: {}", outcome.clean.path.display()),
        format!("NUL bytes removed: {}", outcome.clean.nul_bytes_removed()),
        format!("Delimiter: {}", describe_delimiter(split.delimiter)),
        format!("Output: {}", outcome.output_dir.display()),
    ];
    if outcome.replaced_output_dir {
        lines.push("Existing output directory was replaced".to_string());
    }
    lines.join("\n")
}

/// Builds the per-part table with a closing total row.
pub fn parts_table(outcome: &SplitOutcome) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Part"),
        header_cell("File"),
        header_cell("Rows"),
        header_cell("Approx. size"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);

    let mut total_bytes = 0u64;
    for part in &outcome.split.parts {
        total_bytes += part.approx_bytes;
        table.add_row(vec![
            Cell::new(part.sequence),
            Cell::new(file_name(&part.path)),
            Cell::new(part.rows),
            Cell::new(format_size(part.approx_bytes)),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        dim_cell(format!("{} parts", outcome.split.part_count())),
        Cell::new(outcome.split.total_rows).add_attribute(Attribute::Bold),
        Cell::new(format_size(total_bytes)).add_attribute(Attribute::Bold),
    ]);
    table
}

pub fn print_split_summary(outcome: &SplitOutcome) {
    println!("{}", split_overview(outcome));
    println!("{}", parts_table(outcome));
}

/// Builds the column table for an inferred schema.
pub fn schema_table(schema: &TableSchema) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("#"),
        header_cell("Column"),
        header_cell("Inferred"),
        header_cell("Warehouse type"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    for (index, column) in schema.columns.iter().enumerate() {
        table.add_row(vec![
            dim_cell(index + 1),
            Cell::new(&column.name),
            dim_cell(&column.source_type),
            Cell::new(column.warehouse_type).fg(Color::Green),
        ]);
    }
    table
}

pub fn print_schema_summary(schema: &TableSchema) {
    println!("Table: {}", schema.table_name);
    println!("Stage: {}", schema.stage_name);
    println!("Source: {}", schema.source.display());
    println!(
        "Delimiter: {} ({} rows sampled)",
        describe_delimiter(schema.delimiter as u8),
        schema.sampled_rows
    );
    println!("{}", schema_table(schema));
}

/// Pretty JSON rendering of a schema for collaborators.
pub fn render_schema_json(schema: &TableSchema) -> serde_json::Result<String> {
    serde_json::to_string_pretty(schema)
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

/// Human-readable delimiter name.
pub fn describe_delimiter(delimiter: u8) -> String {
    match delimiter {
        b',' => "comma (,)".to_string(),
        b';' => "semicolon (;)".to_string(),
        b'\t' => "tab (\\t)".to_string(),
        b'|' => "pipe (|)".to_string(),
        b' ' => "space".to_string(),
        other => format!("'{}'", (other as char).escape_default()),
    }
}

/// Formats a byte count in MiB once it reaches one MiB.
pub fn format_size(bytes: u64) -> String {
    if bytes >= MIB {
        format!("{:.1} MiB", bytes as f64 / MIB as f64)
    } else {
        format!("{bytes} B")
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
