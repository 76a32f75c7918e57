//! Streaming extraction against small synthetic GOLD/Aurum files.

use std::path::PathBuf;

use chrono::NaiveDate;
use cprd_extract::{ExtractError, extract_events, extract_events_tagged, reconcile};
use cprd_model::{CodeList, CodeListEntry, RecordKind, SourceDatabase};
use tempfile::TempDir;

fn code_list(database: SourceDatabase, codes: &[&str]) -> CodeList {
    let mut list = CodeList::new(database, RecordKind::Diagnosis);
    for code in codes {
        list.push(CodeListEntry {
            code_id: (*code).to_string(),
            description: String::new(),
            primary_only: false,
            category: None,
        });
    }
    list
}

fn write_gold_parts(dir: &TempDir) -> Vec<PathBuf> {
    let part1 = dir.path().join("gold_clinical_part1.txt");
    std::fs::write(
        &part1,
        "patid\teventdate\tsysdate\tmedcode\n\
         12345\t01/02/2015\t02/02/2015\t100\n\
         12345\t05/03/2016\t05/03/2016\t100\n\
         67890\t10/04/2017\t11/04/2017\t200\n\
         67890\t10/04/2017\t11/04/2017\t999\n",
    )
    .unwrap();
    let part2 = dir.path().join("gold_clinical_part2.txt");
    std::fs::write(
        &part2,
        "patid\teventdate\tsysdate\tmedcode\n\
         11111\t20/05/2018\t21/05/2018\t100\n",
    )
    .unwrap();
    vec![part1, part2]
}

#[test]
fn extraction_joins_on_the_code_column_many_to_many() {
    let dir = TempDir::new().unwrap();
    let files = write_gold_parts(&dir);
    let list = code_list(SourceDatabase::Gold, &["100", "200"]);

    let events =
        extract_events(&files, &list, SourceDatabase::Gold, RecordKind::Diagnosis).unwrap();
    // 999 is not in the list; code 100 matches three rows across two files.
    assert_eq!(events.len(), 4);
    assert_eq!(events.iter().filter(|e| e.code_id == "100").count(), 3);
    assert!(events.iter().all(|e| e.patient_id.as_str().ends_with("-G")));
}

#[test]
fn extraction_is_idempotent_across_runs() {
    let dir = TempDir::new().unwrap();
    let files = write_gold_parts(&dir);
    let list = code_list(SourceDatabase::Gold, &["100", "200"]);

    let first =
        extract_events(&files, &list, SourceDatabase::Gold, RecordKind::Diagnosis).unwrap();
    let second =
        extract_events(&files, &list, SourceDatabase::Gold, RecordKind::Diagnosis).unwrap();
    assert_eq!(first, second);
}

#[test]
fn aurum_files_join_on_the_id_suffixed_column() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("aurum_observation_part1.txt");
    std::fs::write(
        &path,
        "patid\tobsdate\tenterdate\tmedcodeid\n\
         12345\t01/02/2015\t02/02/2015\t900001\n",
    )
    .unwrap();
    let list = code_list(SourceDatabase::Aurum, &["900001"]);

    let events = extract_events(
        &[path],
        &list,
        SourceDatabase::Aurum,
        RecordKind::Diagnosis,
    )
    .unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].patient_id.as_str(), "12345-A");
}

#[test]
fn gold_file_without_gold_columns_aborts() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("gold_clinical_part1.txt");
    std::fs::write(&path, "patid\tobsdate\tenterdate\tmedcodeid\n").unwrap();
    let list = code_list(SourceDatabase::Gold, &["100"]);

    let err = extract_events(
        &[path],
        &list,
        SourceDatabase::Gold,
        RecordKind::Diagnosis,
    )
    .unwrap_err();
    assert!(matches!(err, ExtractError::Ingest(_)));
}

#[test]
fn unknown_database_tag_fails_fast() {
    let list = code_list(SourceDatabase::Gold, &["100"]);
    let err = extract_events_tagged(&[], &list, "vision", "diagnosis").unwrap_err();
    assert!(matches!(err, ExtractError::Model(_)));
}

#[test]
fn extraction_then_reconciliation_produces_unique_dated_events() {
    let dir = TempDir::new().unwrap();
    let files = write_gold_parts(&dir);
    let list = code_list(SourceDatabase::Gold, &["200"]);

    let events =
        extract_events(&files, &list, SourceDatabase::Gold, RecordKind::Diagnosis).unwrap();
    let cleaned = reconcile(
        &events,
        NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2023, 6, 1).unwrap(),
    );
    assert_eq!(cleaned.len(), 1);
    assert_eq!(
        cleaned[0].event_date,
        NaiveDate::from_ymd_opt(2017, 4, 10)
    );
}
