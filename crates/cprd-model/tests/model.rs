use std::collections::HashSet;

use chrono::NaiveDate;
use cprd_model::{
    PatientEvent, PatientId, RecordKind, SourceDatabase, VocabEntry, Vocabulary,
};

#[test]
fn vocab_entry_lowercases_for_matching_and_keeps_original() {
    let entry = VocabEntry::new("E117.", "Manic-Depressive Psychosis", SourceDatabase::Gold);
    assert_eq!(entry.description, "manic-depressive psychosis");
    assert_eq!(entry.original_description, "Manic-Depressive Psychosis");
}

#[test]
fn vocabulary_reports_retired_codes() {
    let mut vocab = Vocabulary::new(SourceDatabase::Gold);
    vocab
        .entries
        .push(VocabEntry::new("1", "schizophrenia", SourceDatabase::Gold));
    assert!(vocab.contains_code("1"));
    assert!(!vocab.contains_code("2"));
}

#[test]
fn identical_events_collapse_in_a_set() {
    let event = PatientEvent {
        patient_id: PatientId::new("42", SourceDatabase::Aurum),
        code_id: "100".into(),
        event_date: NaiveDate::from_ymd_opt(2015, 3, 1),
        entry_date: NaiveDate::from_ymd_opt(2015, 3, 2),
        database: SourceDatabase::Aurum,
        kind: RecordKind::Diagnosis,
    };
    let set: HashSet<PatientEvent> = [event.clone(), event].into_iter().collect();
    assert_eq!(set.len(), 1);
}

#[test]
fn composite_ids_from_colliding_raw_ids_stay_distinct() {
    let ids: HashSet<PatientId> = [
        PatientId::new("12345", SourceDatabase::Gold),
        PatientId::new("12345", SourceDatabase::Aurum),
    ]
    .into_iter()
    .collect();
    assert_eq!(ids.len(), 2);
}
