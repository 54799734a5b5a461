//! Integration tests for CSV splitting.

use std::fs;
use std::path::{Path, PathBuf};

use stager_split::{
    MIB, PartNaming, SplitError, SplitOptions, clean_and_split, split_csv, split_file,
};
use tempfile::TempDir;

fn write_source(dir: &TempDir, name: &str, contents: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("write source");
    path
}

fn file_names(paths: &[PathBuf]) -> Vec<String> {
    paths
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect()
}

fn parse(path: &Path) -> Vec<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)
        .expect("open part");
    reader
        .records()
        .map(|r| r.expect("record").iter().map(str::to_string).collect())
        .collect()
}

#[test]
fn small_source_fits_one_part() {
    let dir = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let source = write_source(&dir, "data.csv", b"id,name\n1,a\n2,b\n3,c\n");

    let report = split_file(&source, out.path(), &SplitOptions::default()).unwrap();

    assert_eq!(report.part_count(), 1);
    assert_eq!(report.total_rows, 3);
    assert_eq!(report.delimiter, b',');
    assert_eq!(report.header, vec!["id", "name"]);
    let paths: Vec<PathBuf> = report.parts.iter().map(|p| p.path.clone()).collect();
    assert_eq!(file_names(&paths), vec!["data_part1.csv"]);
    assert_eq!(
        fs::read_to_string(&paths[0]).unwrap(),
        "id,name\n1,a\n2,b\n3,c\n"
    );
}

#[test]
fn tight_threshold_gives_one_row_per_part() {
    let dir = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let source = write_source(&dir, "data.csv", b"id,name\n1,a\n2,b\n3,c\n");
    // Header "id,name" is 7 bytes, each row 3: room for exactly one row.
    let options = SplitOptions::default().with_max_part_bytes(10);

    let report = split_file(&source, out.path(), &options).unwrap();

    assert_eq!(report.part_count(), 3);
    let expected = ["1,a", "2,b", "3,c"];
    for (i, part) in report.parts.iter().enumerate() {
        assert_eq!(part.sequence as usize, i + 1);
        assert_eq!(part.rows, 1);
        assert_eq!(
            part.path.file_name().unwrap().to_string_lossy(),
            format!("data_part{}.csv", i + 1)
        );
        assert_eq!(
            fs::read_to_string(&part.path).unwrap(),
            format!("id,name\n{}\n", expected[i])
        );
    }
}

#[test]
fn one_byte_over_the_ceiling_starts_a_second_part() {
    let dir = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();

    // header (10) + row 1 + row 2 == 1 MiB + 1 in approximate size.
    let header = "id,payload";
    let row1_size = MIB as usize - header.len() - 100;
    let row1 = format!("1,{}", "A".repeat(row1_size - 2));
    let row2 = format!("2,{}", "B".repeat(101 - 2));
    assert_eq!(header.len() + row1.len() + row2.len(), MIB as usize + 1);

    let contents = format!("{header}\n{row1}\n{row2}\n");
    let source = write_source(&dir, "big.csv", contents.as_bytes());
    let options = SplitOptions::default().with_max_part_mib(1);

    let report = split_file(&source, out.path(), &options).unwrap();

    assert_eq!(report.part_count(), 2);
    assert_eq!(report.parts[0].rows, 1);
    assert_eq!(report.parts[0].approx_bytes, MIB - 100);
    assert_eq!(report.parts[1].rows, 1);
    let second = parse(&report.parts[1].path);
    assert_eq!(second[0], vec!["id", "payload"]);
    assert_eq!(second[1][0], "2");
}

#[test]
fn headers_rows_and_order_survive_splitting() {
    let dir = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let mut contents = String::from("id;city;note\n");
    for i in 0..200 {
        contents.push_str(&format!("{i};City {i};\"note {i}; quoted\"\n"));
    }
    let source = write_source(&dir, "cities_export.csv", contents.as_bytes());
    let options = SplitOptions::default().with_max_part_bytes(512);

    let report = split_file(&source, out.path(), &options).unwrap();

    assert_eq!(report.delimiter, b';');
    assert!(report.part_count() > 1);
    assert_eq!(report.total_rows, 200);

    let mut ids = Vec::new();
    for part in &report.parts {
        assert!(part.rows > 0);
        assert!(part.path.to_string_lossy().contains("cities_part"));
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b';')
            .from_path(&part.path)
            .unwrap();
        let header: Vec<String> = reader.headers().unwrap().iter().map(str::to_string).collect();
        assert_eq!(header, vec!["id", "city", "note"]);
        for record in reader.records() {
            let record = record.unwrap();
            assert_eq!(record[2], format!("note {}; quoted", &record[0]));
            ids.push(record[0].parse::<u32>().unwrap());
        }
    }
    assert_eq!(ids, (0..200).collect::<Vec<_>>());
    assert_eq!(
        report.parts.iter().map(|p| p.rows).sum::<u64>(),
        report.total_rows
    );
}

#[test]
fn embedded_newlines_become_spaces() {
    let dir = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let source = write_source(
        &dir,
        "notes.csv",
        b"id,comment\n1,\"first line\nsecond line\"\n2,plain\n",
    );

    let report = split_file(&source, out.path(), &SplitOptions::default()).unwrap();

    assert_eq!(
        fs::read_to_string(&report.parts[0].path).unwrap(),
        "id,comment\n1,first line second line\n2,plain\n"
    );
}

#[test]
fn header_only_source_gives_one_header_only_part() {
    let dir = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let source = write_source(&dir, "empty.csv", b"id,name,city\n");

    let report = split_file(&source, out.path(), &SplitOptions::default()).unwrap();

    assert_eq!(report.part_count(), 1);
    assert_eq!(report.total_rows, 0);
    assert_eq!(
        fs::read_to_string(&report.parts[0].path).unwrap(),
        "id,name,city\n"
    );
}

#[test]
fn crlf_input_written_with_unix_line_endings() {
    let dir = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let source = write_source(&dir, "win.csv", b"a,b\r\n1,2\r\n3,4\r\n");

    let report = split_file(&source, out.path(), &SplitOptions::default()).unwrap();

    assert_eq!(
        fs::read_to_string(&report.parts[0].path).unwrap(),
        "a,b\n1,2\n3,4\n"
    );
}

#[test]
fn undecodable_bytes_are_replaced() {
    let dir = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let source = write_source(&dir, "bad.csv", b"a,b\n1,x\xffy\n");

    let report = split_file(&source, out.path(), &SplitOptions::default()).unwrap();

    assert_eq!(
        fs::read_to_string(&report.parts[0].path).unwrap(),
        "a,b\n1,x\u{fffd}y\n"
    );
}

#[test]
fn single_byte_encoding_round_trips() {
    let dir = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let source = write_source(&dir, "latin.csv", b"nombre,ciudad\nJos\xe9,C\xe1diz\n");
    let options = SplitOptions::default()
        .with_encoding_label("latin1")
        .unwrap();

    let report = split_file(&source, out.path(), &options).unwrap();

    assert_eq!(report.total_rows, 1);
    assert_eq!(
        fs::read(&report.parts[0].path).unwrap(),
        b"nombre,ciudad\nJos\xe9,C\xe1diz\n"
    );
}

#[test]
fn splitting_is_deterministic() {
    let dir = TempDir::new().unwrap();
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();
    let mut contents = String::from("k,v\n");
    for i in 0..100 {
        contents.push_str(&format!("{i},\"value, {i}\"\n"));
    }
    let source = write_source(&dir, "kv.csv", contents.as_bytes());
    let options = SplitOptions::default().with_max_part_bytes(200);

    let a = split_file(&source, first.path(), &options).unwrap();
    let b = split_file(&source, second.path(), &options).unwrap();

    assert_eq!(a.part_count(), b.part_count());
    for (pa, pb) in a.parts.iter().zip(&b.parts) {
        assert_eq!(pa.path.file_name(), pb.path.file_name());
        assert_eq!(fs::read(&pa.path).unwrap(), fs::read(&pb.path).unwrap());
    }
}

#[test]
fn undetectable_delimiter_is_fatal() {
    let dir = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let source = write_source(&dir, "names.csv", b"name\nalice\nbob\ncarol\n");

    let result = split_file(&source, out.path(), &SplitOptions::default());

    assert!(matches!(
        result,
        Err(SplitError::DelimiterUndetectable { .. })
    ));
}

#[test]
fn explicit_naming_overrides_input_name() {
    let dir = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let cleaned = write_source(&dir, "records_clean.csv", b"a,b\n1,2\n");
    let naming = PartNaming::from_path(Path::new("orders_2024.csv"));

    let report = split_csv(&cleaned, out.path(), &naming, &SplitOptions::default()).unwrap();

    let paths: Vec<PathBuf> = report.parts.iter().map(|p| p.path.clone()).collect();
    assert_eq!(file_names(&paths), vec!["orders_part1.csv"]);
}

#[test]
fn clean_and_split_replaces_output_directory() {
    let dir = TempDir::new().unwrap();
    let source = write_source(&dir, "data_raw.csv", b"id,na\0me\n1,a\0\n2,b\n");
    let output_dir = dir.path().join("data_raw");
    fs::create_dir_all(&output_dir).unwrap();
    fs::write(output_dir.join("stale.csv"), "old").unwrap();

    let outcome = clean_and_split(&source, &output_dir, &SplitOptions::default()).unwrap();

    assert!(outcome.replaced_output_dir);
    assert!(!output_dir.join("stale.csv").exists());
    assert_eq!(outcome.clean.path, dir.path().join("records_clean.csv"));
    assert_eq!(outcome.clean.nul_bytes_removed(), 2);
    assert!(outcome.clean.path.exists());

    let paths: Vec<PathBuf> = outcome.split.parts.iter().map(|p| p.path.clone()).collect();
    assert_eq!(file_names(&paths), vec!["data_part1.csv"]);
    assert_eq!(
        fs::read_to_string(&paths[0]).unwrap(),
        "id,name\n1,a\n2,b\n"
    );
}

#[test]
fn clean_and_split_validates_before_touching_files() {
    let dir = TempDir::new().unwrap();
    let output_dir = dir.path().join("out");
    fs::create_dir_all(&output_dir).unwrap();
    fs::write(output_dir.join("keep.csv"), "keep").unwrap();

    let missing = dir.path().join("missing.csv");
    let result = clean_and_split(&missing, &output_dir, &SplitOptions::default());
    assert!(matches!(result, Err(SplitError::FileNotFound { .. })));

    let source = write_source(&dir, "data.csv", b"a,b\n1,2\n");
    let options = SplitOptions::default().with_max_part_bytes(0);
    let result = clean_and_split(&source, &output_dir, &options);
    assert!(matches!(result, Err(SplitError::InvalidOptions { .. })));

    let result = clean_and_split(&source, dir.path(), &SplitOptions::default());
    assert!(matches!(
        result,
        Err(SplitError::OutputContainsSource { .. })
    ));

    assert!(output_dir.join("keep.csv").exists());
    assert!(!dir.path().join("records_clean.csv").exists());
}

#[test]
fn ragged_rows_are_written_unchanged() {
    let dir = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let mut contents = String::from("id,name,city\n");
    for i in 0..20 {
        contents.push_str(&format!("{i},name{i},city{i}\n"));
    }
    contents.push_str("20,trailing,extra,field\n21,short\n");
    let source = write_source(&dir, "ragged.csv", contents.as_bytes());

    let report = split_file(&source, out.path(), &SplitOptions::default()).unwrap();

    assert_eq!(report.total_rows, 22);
    let written = fs::read_to_string(&report.parts[0].path).unwrap();
    assert_eq!(written, contents);
    assert!(written.ends_with("19,name19,city19\n20,trailing,extra,field\n21,short\n"));
}

#[test]
fn refused_clean_target_leaves_output_directory_alone() {
    let dir = TempDir::new().unwrap();
    let source = write_source(&dir, "records_clean.csv", b"a,b\n1,2\n");
    let output_dir = dir.path().join("out");
    fs::create_dir_all(&output_dir).unwrap();
    fs::write(output_dir.join("keep.csv"), "keep").unwrap();

    let result = clean_and_split(&source, &output_dir, &SplitOptions::default());

    let err = result.unwrap_err();
    assert!(matches!(err, SplitError::CleanTargetIsSource { .. }));
    assert!(err.is_invalid_input());
    assert!(output_dir.join("keep.csv").exists());
    assert_eq!(fs::read(&source).unwrap(), b"a,b\n1,2\n");
}

#[test]
fn encodings_reusing_ascii_bytes_fail_before_any_output() {
    let dir = TempDir::new().unwrap();
    // "ポテト" in Shift_JIS: the trail byte of ポ is '|'.
    let source = write_source(&dir, "menu.csv", b"id|name\n1|\x83|\x83e\x83g\n");
    let output_dir = dir.path().join("menu");
    let options = SplitOptions::default().with_encoding(encoding_rs::SHIFT_JIS);

    let result = clean_and_split(&source, &output_dir, &options);

    assert!(matches!(
        result,
        Err(SplitError::UnsupportedEncoding { .. })
    ));
    assert!(!output_dir.exists());
    assert!(!dir.path().join("records_clean.csv").exists());

    let result = split_file(&source, dir.path(), &options);
    assert!(matches!(
        result,
        Err(SplitError::UnsupportedEncoding { .. })
    ));
}
