use calc_core::history::{HistoryError, HistoryRecord, HistoryStore, MAX_HISTORY};

fn calc(expr: &str, result: f64) -> HistoryRecord {
    HistoryRecord::Calc {
        expr: expr.to_string(),
        result,
    }
}

#[test]
fn test_missing_file_is_empty_history() {
    let dir = tempfile::tempdir().unwrap();
    let store = HistoryStore::open(dir.path().join("calc_history.json")).unwrap();
    assert!(store.history().is_empty());
}

#[test]
fn test_records_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("calc_history.json");

    let mut store = HistoryStore::open(&path).unwrap();
    store.record(calc("2+2*3", 8.0)).unwrap();
    store.record(calc("50%", 0.5)).unwrap();

    let reopened = HistoryStore::open(&path).unwrap();
    let entries = reopened.history().recent(10);
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].record, calc("50%", 0.5));
    assert_eq!(entries[1].record, calc("2+2*3", 8.0));
}

#[test]
fn test_file_never_exceeds_capacity() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("calc_history.json");

    let mut store = HistoryStore::open(&path).unwrap();
    for i in 0..(MAX_HISTORY + 10) {
        store.record(calc(&format!("{}+0", i), i as f64)).unwrap();
    }

    let text = std::fs::read_to_string(&path).unwrap();
    let raw: Vec<serde_json::Value> = serde_json::from_str(&text).unwrap();
    assert_eq!(raw.len(), MAX_HISTORY);
    assert_eq!(raw[0]["expr"], "59+0");
    assert_eq!(raw[MAX_HISTORY - 1]["expr"], "10+0");
}

#[test]
fn test_reads_existing_file_layout() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("calc_history.json");
    std::fs::write(
        &path,
        r#"[
  {"type": "calc", "expr": "2+2", "result": 4, "at": "2024-05-01T10:00:02.000000"},
  {"type": "compound", "inputs": {"P": 1000.0, "rate_percent": 7.5, "T": 1.0, "n": 4},
   "result": {"ci": 77.13, "total": 1077.13}, "at": "2024-05-01T10:00:01.000000"},
  {"type": "simple", "inputs": {"P": 1000.0, "R": 7.5, "T": 1.0},
   "result": {"si": 75.0, "total": 1075.0}, "at": "2024-05-01T10:00:00.000000"}
]"#,
    )
    .unwrap();

    let store = HistoryStore::open(&path).unwrap();
    let entries = store.history().recent(10);
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].record, calc("2+2", 4.0));
    assert!(matches!(entries[1].record, HistoryRecord::Compound { .. }));
    assert!(matches!(entries[2].record, HistoryRecord::Simple { .. }));
    assert_eq!(entries[2].at, "2024-05-01T10:00:00.000000");
}

#[test]
fn test_corrupt_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("calc_history.json");
    std::fs::write(&path, "{ not json").unwrap();

    assert!(HistoryStore::open(&path).is_err());
}

#[test]
fn test_clear_empties_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("calc_history.json");

    let mut store = HistoryStore::open(&path).unwrap();
    store.record(calc("1", 1.0)).unwrap();
    store.clear().unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert_eq!(text.trim(), "[]");
    assert!(HistoryStore::open(&path).unwrap().history().is_empty());
}

#[test]
fn test_infinite_result_does_not_break_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("calc_history.json");

    let mut store = HistoryStore::open(&path).unwrap();
    store.record(calc("2+2", 4.0)).unwrap();
    let err = store.record(calc("1e308*10", f64::INFINITY)).unwrap_err();
    assert!(matches!(err, HistoryError::NonFinite(_)));
    store.record(calc("3*3", 9.0)).unwrap();

    let reopened = HistoryStore::open(&path).unwrap();
    let entries = reopened.history().recent(10);
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].record, calc("3*3", 9.0));
    assert_eq!(entries[1].record, calc("2+2", 4.0));
}

