//! Integration tests for table schema inference.

use std::fs;
use std::path::PathBuf;

use stager_schema::{SchemaError, SchemaOptions, WarehouseType, infer_table_schema};
use stager_split::SplitError;
use tempfile::TempDir;

fn write_source(dir: &TempDir, name: &str, contents: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("write source");
    path
}

fn types_of(schema: &stager_schema::TableSchema) -> Vec<(&str, WarehouseType)> {
    schema
        .columns
        .iter()
        .map(|c| (c.name.as_str(), c.warehouse_type))
        .collect()
}

#[test]
fn infers_warehouse_types_per_column() {
    let dir = TempDir::new().unwrap();
    let source = write_source(
        &dir,
        "orders.csv",
        b"id,price,paid,customer\n1,9.5,true,Ana\n2,12.25,false,Luis\n3,7.0,true,Marta\n",
    );

    let schema = infer_table_schema(&source, &SchemaOptions::default()).unwrap();

    assert_eq!(schema.table_name, "orders");
    assert_eq!(schema.stage_name, "orders_stage");
    assert_eq!(schema.delimiter, ',');
    assert_eq!(schema.sampled_rows, 3);
    assert_eq!(
        types_of(&schema),
        vec![
            ("id", WarehouseType::Number),
            ("price", WarehouseType::Float),
            ("paid", WarehouseType::Boolean),
            ("customer", WarehouseType::String),
        ]
    );
    assert_eq!(schema.columns[0].source_type, "int64");
    assert_eq!(schema.columns[3].source_type, "object");
}

#[test]
fn iso_dates_stay_text() {
    let dir = TempDir::new().unwrap();
    let source = write_source(
        &dir,
        "visits.csv",
        b"visit;day\n1;2024-01-15\n2;2024-02-29\n",
    );

    let schema = infer_table_schema(&source, &SchemaOptions::default()).unwrap();

    assert_eq!(schema.delimiter, ';');
    assert_eq!(
        types_of(&schema),
        vec![
            ("visit", WarehouseType::Number),
            ("day", WarehouseType::String)
        ]
    );
    assert_eq!(schema.columns[1].source_type, "object");
}

#[test]
fn encodings_reusing_ascii_bytes_are_rejected() {
    let dir = TempDir::new().unwrap();
    let source = write_source(&dir, "jp.csv", b"id|name\n1|\x83|\x83e\x83g\n");
    let options = SchemaOptions::default().with_encoding(encoding_rs::SHIFT_JIS);

    let result = infer_table_schema(&source, &options);

    assert!(matches!(
        result,
        Err(SchemaError::Split(SplitError::UnsupportedEncoding { .. }))
    ));
}

#[test]
fn only_sampled_rows_drive_inference() {
    let dir = TempDir::new().unwrap();
    let mut contents = String::from("code,label\n");
    for i in 0..5 {
        contents.push_str(&format!("{i},row {i}\n"));
    }
    contents.push_str("not-a-number,late row\n");
    let source = write_source(&dir, "codes.csv", contents.as_bytes());

    let schema =
        infer_table_schema(&source, &SchemaOptions::default().with_sample_rows(5)).unwrap();

    assert_eq!(schema.sampled_rows, 5);
    assert_eq!(schema.columns[0].warehouse_type, WarehouseType::Number);

    let schema = infer_table_schema(&source, &SchemaOptions::default()).unwrap();
    assert_eq!(schema.sampled_rows, 6);
    assert_eq!(schema.columns[0].warehouse_type, WarehouseType::String);
}

#[test]
fn directory_input_uses_first_csv() {
    let dir = TempDir::new().unwrap();
    write_source(&dir, "b_second.csv", b"x,y\n1,2\n");
    write_source(&dir, "a_first.csv", b"name,city\nAna,Lima\n");
    write_source(&dir, "notes.txt", b"ignored");

    let schema = infer_table_schema(dir.path(), &SchemaOptions::default()).unwrap();

    assert_eq!(schema.table_name, "a_first");
    assert_eq!(schema.source, dir.path().join("a_first.csv"));
}

#[test]
fn single_byte_encoded_headers_are_decoded() {
    let dir = TempDir::new().unwrap();
    let source = write_source(&dir, "latin.csv", b"a\xf1o,ciudad\n2024,C\xe1diz\n");
    let options =
        SchemaOptions::default().with_encoding(encoding_rs::Encoding::for_label(b"latin1").unwrap());

    let schema = infer_table_schema(&source, &options).unwrap();

    assert_eq!(schema.columns[0].name, "año");
    assert_eq!(schema.columns[0].warehouse_type, WarehouseType::Number);
}

#[test]
fn schema_serializes_for_collaborators() {
    let dir = TempDir::new().unwrap();
    let source = write_source(&dir, "t.csv", b"id,name\n1,a\n");

    let schema = infer_table_schema(&source, &SchemaOptions::default()).unwrap();
    let json = serde_json::to_value(&schema).unwrap();

    assert_eq!(json["table_name"], "t");
    assert_eq!(json["columns"][0]["warehouse_type"], "NUMBER");
    assert!(json.get("source").is_none());
}

#[test]
fn missing_inputs_report_split_errors() {
    let dir = TempDir::new().unwrap();

    let result = infer_table_schema(&dir.path().join("nope.csv"), &SchemaOptions::default());
    assert!(matches!(
        result,
        Err(SchemaError::Split(SplitError::FileNotFound { .. }))
    ));

    let result = infer_table_schema(dir.path(), &SchemaOptions::default());
    assert!(matches!(
        result,
        Err(SchemaError::Split(SplitError::NoCsvFiles { .. }))
    ));
}
