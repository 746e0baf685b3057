//! The JSON and SQLite forms of a dataset load to the same insights

use rusqlite::{params, Connection};
use std::fs;

use lectio_core::{validate, Canon, InsightDataset, Lens};

const JSON: &str = r#"[
    {"id": "rom-8-28-theology", "book_id": 45, "chapter": 8, "verse_start": 28, "verse_end": 28,
     "insight_type": "theology", "title": "All things", "content": "God works all things together for good.",
     "sources": [{"type": "crossReference", "reference": "Genesis 50:20", "description": "Joseph"}],
     "is_interpretive": true, "content_version": 2, "prompt_version": "v1.1",
     "model_version": "gpt-4o", "created_at": "2025-02-01T00:00:00"},
    {"id": "rom-8-28-question", "book_id": 45, "chapter": 8, "verse_start": 28, "verse_end": 30,
     "insight_type": "reflection", "title": "Reflect", "content": "Where have you seen hardship turned to good?",
     "sources": [], "is_interpretive": false, "content_version": 1, "prompt_version": "v1.0",
     "model_version": "gpt-4o", "created_at": "2025-01-01T00:00:00"}
]"#;

fn write_sqlite(path: &std::path::Path) {
    let conn = Connection::open(path).unwrap();
    conn.execute(
        "CREATE TABLE commentary_insights (
            id TEXT PRIMARY KEY, book_id INTEGER, chapter INTEGER, verse_start INTEGER,
            verse_end INTEGER, insight_type TEXT, title TEXT, content TEXT, sources TEXT,
            content_version INTEGER, prompt_version TEXT, model_version TEXT,
            created_at TEXT, is_interpretive INTEGER
        )",
        [],
    )
    .unwrap();
    let insert = "INSERT INTO commentary_insights VALUES (?1, 45, 8, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, 'gpt-4o', ?10, ?11)";
    conn.execute(
        insert,
        params![
            "rom-8-28-theology",
            28,
            28,
            "theology",
            "All things",
            "God works all things together for good.",
            r#"[{"type":"crossReference","reference":"Genesis 50:20","description":"Joseph"}]"#,
            2,
            "v1.1",
            "2025-02-01T00:00:00",
            1
        ],
    )
    .unwrap();
    conn.execute(
        insert,
        params![
            "rom-8-28-question",
            28,
            30,
            "Reflection",
            "Reflect",
            "Where have you seen hardship turned to good?",
            "[]",
            1,
            "v1.0",
            "2025-01-01T00:00:00",
            0
        ],
    )
    .unwrap();
}

#[test]
fn test_json_and_sqlite_load_identically() {
    let dir = tempfile::tempdir().unwrap();
    let json_path = dir.path().join("insights.json");
    let sqlite_path = dir.path().join("insights.sqlite");
    fs::write(&json_path, JSON).unwrap();
    write_sqlite(&sqlite_path);

    let from_json = InsightDataset::load(&json_path).unwrap();
    let from_sqlite = InsightDataset::load(&sqlite_path).unwrap();
    assert_eq!(from_json.len(), 2);
    assert_eq!(from_json, from_sqlite);
    assert_eq!(from_json.insights()[1].lens, Lens::Question);
}

#[test]
fn test_loaded_dataset_passes_checks() {
    let canon = Canon::standard();
    let dataset = InsightDataset::from_json_str(JSON).unwrap();
    let report = validate(&canon, dataset.insights());
    assert!(report.is_ok(), "{:?}", report.errors);
    assert!(report.warnings.is_empty());
}
