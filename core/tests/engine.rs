//! Engine facade: upload, analyze, fetch results, delete.

use serde_json::{json, Value};
use std::sync::Arc;
use std::thread;
use subsiguard_core::{
    engine::{GuardEngine, PREVIEW_ROWS},
    ingest::RawRow,
    rules::ReasonCode,
    GuardError,
};

fn row(i: usize) -> RawRow {
    let state = if i % 2 == 0 { "Odisha" } else { "Assam" };
    let v = json!({
        "beneficiary_id": format!("BEN-{i:04}"),
        "name": format!("Person {i}"),
        "aadhaar": format!("{:012}", 500_000_000_000u64 + i as u64),
        "income": 50_000 + (i as u64) * 750,
        "location_state": state,
        "subsidy_type": "Fertilizer",
        "amount": 1_200.0 + i as f64,
        "claim_date": format!("2024-02-{:02}", 1 + i % 28),
        "distributor_id": format!("D-{i}"),
    });
    match v {
        Value::Object(map) => map,
        _ => unreachable!(),
    }
}

fn rows(n: usize) -> Vec<RawRow> {
    (0..n).map(row).collect()
}

#[test]
fn upload_returns_preview_and_count() {
    let engine = GuardEngine::build_test().unwrap();
    let receipt = engine.upload(&rows(25)).unwrap();
    assert_eq!(receipt.total_rows, 25);
    assert_eq!(receipt.preview.len(), PREVIEW_ROWS);
    assert_eq!(receipt.preview[0].beneficiary_id, "BEN-0000");
    assert!(uuid_like(&receipt.file_id), "file id {}", receipt.file_id);
}

#[test]
fn analyze_then_fetch_results() {
    let engine = GuardEngine::build_test().unwrap();
    let mut data = rows(20);
    let shared = data[2]["aadhaar"].clone();
    data[7].insert("aadhaar".into(), shared);
    let receipt = engine.upload(&data).unwrap();

    let result = engine.analyze(&receipt.file_id).unwrap();
    assert_eq!(result.total_records, 20);
    assert_eq!(result.flagged_count, result.flagged_records.len());
    assert!(result
        .flagged_records
        .iter()
        .any(|f| f.record.beneficiary_id == "BEN-0007"
            && f.verdict.reasons.contains(&ReasonCode::DuplicateIdentity)));

    let fetched = engine.results(&receipt.file_id).unwrap();
    assert_eq!(fetched, result, "stored result must round-trip unchanged");
}

#[test]
fn flagged_record_serializes_flat() {
    let engine = GuardEngine::build_test().unwrap();
    let mut data = rows(5);
    data[1].insert("beneficiary_id".into(), json!("BEN-0000"));
    let receipt = engine.upload(&data).unwrap();
    let result = engine.analyze(&receipt.file_id).unwrap();

    let v = serde_json::to_value(&result.flagged_records[0]).unwrap();
    assert_eq!(v["beneficiary_id"], "BEN-0000");
    assert!(v["fraud_score"].is_number());
    assert_eq!(v["is_fraud"], true);
    assert_eq!(v["reasons"][0], "DUPLICATE_BENEFICIARY");
    assert_eq!(v["claim_date"], "2024-02-01");
}

#[test]
fn unknown_file_id_is_not_found() {
    let engine = GuardEngine::build_test().unwrap();
    assert!(matches!(
        engine.analyze("missing"),
        Err(GuardError::FileNotFound { .. })
    ));
    assert!(matches!(
        engine.results("missing"),
        Err(GuardError::ResultsNotFound { .. })
    ));
}

#[test]
fn results_before_analysis_are_not_found() {
    let engine = GuardEngine::build_test().unwrap();
    let receipt = engine.upload(&rows(3)).unwrap();
    assert!(matches!(
        engine.results(&receipt.file_id),
        Err(GuardError::ResultsNotFound { .. })
    ));
}

#[test]
fn schema_error_stores_nothing() {
    let engine = GuardEngine::build_test().unwrap();
    let mut data = rows(4);
    for r in &mut data {
        r.remove("distributor_id");
    }
    match engine.upload(&data) {
        Err(GuardError::Schema { field, .. }) => assert_eq!(field, "distributor_id"),
        other => panic!("expected schema error, got {other:?}"),
    }
    assert!(engine.file_ids().unwrap().is_empty());
}

#[test]
fn delete_removes_upload_and_results() {
    let engine = GuardEngine::build_test().unwrap();
    let first = engine.upload(&rows(3)).unwrap().file_id;
    let second = engine.upload(&rows(4)).unwrap().file_id;
    engine.analyze(&first).unwrap();

    assert_eq!(engine.file_ids().unwrap(), vec![first.clone(), second.clone()]);
    assert!(engine.delete(&first).unwrap());
    assert!(!engine.delete(&first).unwrap(), "second delete finds nothing");
    assert!(engine.results(&first).is_err());
    assert_eq!(engine.file_ids().unwrap(), vec![second]);
}

#[test]
fn empty_upload_analyzes_to_zero_summary() {
    let engine = GuardEngine::build_test().unwrap();
    let receipt = engine.upload(&[]).unwrap();
    let result = engine.analyze(&receipt.file_id).unwrap();
    assert_eq!(result.total_records, 0);
    assert_eq!(result.leakage_percent, 0.0);
    assert!(result.flagged_records.is_empty());
}

#[test]
fn concurrent_callers_share_one_engine() {
    let engine = Arc::new(GuardEngine::build_test().unwrap());
    let handles: Vec<_> = (0..4)
        .map(|t| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                let receipt = engine.upload(&rows(10 + t)).unwrap();
                let result = engine.analyze(&receipt.file_id).unwrap();
                assert_eq!(result.total_records, 10 + t);
                receipt.file_id
            })
        })
        .collect();
    let ids: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(engine.file_ids().unwrap().len(), 4);
    for id in ids {
        assert!(engine.results(&id).is_ok());
    }
}

fn uuid_like(s: &str) -> bool {
    s.len() == 36 && s.chars().filter(|&c| c == '-').count() == 4
}

#[test]
fn file_backed_store_survives_reopen() {
    use subsiguard_core::store::AnalysisStore;

    let path = std::env::temp_dir().join(format!("subsiguard-{}.db", uuid::Uuid::new_v4()));
    let path_str = path.to_str().unwrap().to_string();
    let file_id = {
        let engine = GuardEngine::new(
            AnalysisStore::open(&path_str).unwrap(),
            Default::default(),
        );
        engine.store.migrate().unwrap();
        let receipt = engine.upload(&rows(6)).unwrap();
        engine.analyze(&receipt.file_id).unwrap();
        receipt.file_id
    };

    let store = AnalysisStore::open(&path_str).unwrap();
    store.migrate().unwrap();
    let dataset = store.get_data(&file_id).unwrap().expect("upload persisted");
    assert_eq!(dataset.len(), 6);
    assert!(store.get_results(&file_id).unwrap().is_some());
    drop(store);

    for suffix in ["", "-wal", "-shm"] {
        std::fs::remove_file(format!("{path_str}{suffix}")).ok();
    }
}

#[test]
fn memory_path_opens_like_the_runner_default() {
    use subsiguard_core::store::AnalysisStore;

    let store = AnalysisStore::open(":memory:").unwrap();
    store.migrate().unwrap();
    assert!(store.all_file_ids().unwrap().is_empty());
}
