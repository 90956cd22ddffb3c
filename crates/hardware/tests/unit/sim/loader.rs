//! # Trace Loader Tests

use std::io::Write;

use cachesim_core::common::Operation;
use cachesim_core::common::error::TraceError;
use cachesim_core::sim::{TraceEntry, TraceOp, load_trace, parse_trace};
use pretty_assertions::assert_eq;

#[test]
fn parses_reads_and_writes() {
    let json = r#"[
        { "address": 4660, "op": "write", "value": 171 },
        { "address": 4660, "op": "read" },
        { "address": 0, "op": "W", "value": 1 },
        { "address": 1, "op": "r" }
    ]"#;
    let trace = parse_trace(json).unwrap();
    assert_eq!(
        trace,
        vec![
            TraceEntry::write(0x1234, 0xAB),
            TraceEntry::read(0x1234),
            TraceEntry::write(0, 1),
            TraceEntry::read(1),
        ]
    );
    assert_eq!(trace[0].operation(), Operation::Write(0xAB));
    assert_eq!(trace[1].operation(), Operation::Read);
}

#[test]
fn entries_serialize_back_to_lowercase_ops() {
    let json = serde_json::to_string(&TraceEntry::write(16, 2)).unwrap();
    assert_eq!(json, r#"{"address":16,"op":"write","value":2}"#);
    assert_eq!(TraceEntry::read(3).op, TraceOp::Read);
}

#[test]
fn rejects_out_of_range_values() {
    let json = r#"[{ "address": 1, "op": "write", "value": 256 }]"#;
    assert!(matches!(parse_trace(json), Err(TraceError::Parse(_))));
}

#[test]
fn loads_from_a_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"[{{ "address": 64, "op": "read" }}]"#).unwrap();

    let trace = load_trace(file.path()).unwrap();
    assert_eq!(trace, vec![TraceEntry::read(64)]);
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = load_trace(dir.path().join("absent.json"));
    assert!(matches!(result, Err(TraceError::Io(_))));
}
