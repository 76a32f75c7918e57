use std::collections::HashSet;
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{info, info_span, trace, warn};

use cprd_cli::logging::redact_value;

use cprd_codelist::{
    CodeListDiff, RuleFile, classify, diff_against_previous, match_medications,
    read_code_list_ids, write_code_list, write_excluded_products,
};
use cprd_extract::{extract_events, reconcile};
use cprd_ingest::{
    discover_part_files, load_diagnosis_dictionary, load_product_dictionary, load_reference_dir,
};
use cprd_model::{CodeList, CodeListEntry, PatientEvent, RecordKind, SourceDatabase};

use crate::cli::{DiagListArgs, DiffArgs, ExtractArgs, MedListArgs};
use crate::config::StudyConfig;
use crate::summary::{
    print_code_list_summary, print_diff, print_extract_summary, print_match_report,
};

pub fn run_diag_list(args: &DiagListArgs) -> Result<()> {
    let database: SourceDatabase = args.database.into();
    let span = info_span!("diag-list", database = %database);
    let _guard = span.enter();
    let started = Instant::now();

    let vocab = load_diagnosis_dictionary(&args.dictionary, database)
        .with_context(|| format!("load dictionary: {}", args.dictionary.display()))?;
    let rules = RuleFile::load(&args.rules)
        .with_context(|| format!("load rules: {}", args.rules.display()))?;
    let compiled = rules.compile().context("compile rule patterns")?;

    let list = classify(&vocab, &compiled);
    info!(
        dictionary_terms = vocab.len(),
        retained = list.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "classified dictionary"
    );

    write_code_list(&args.out, &list)
        .with_context(|| format!("write code list: {}", args.out.display()))?;
    print_code_list_summary(&list);

    if let Some(previous) = &args.previous {
        let diff = diff_against_written(previous, &list, &vocab_codes(&vocab))?;
        print_diff(&diff);
    }
    Ok(())
}

pub fn run_med_list(args: &MedListArgs) -> Result<()> {
    let database: SourceDatabase = args.database.into();
    let span = info_span!("med-list", database = %database);
    let _guard = span.enter();

    let vocab = load_product_dictionary(&args.dictionary, database)
        .with_context(|| format!("load product dictionary: {}", args.dictionary.display()))?;
    let reference = load_reference_dir(&args.reference)
        .with_context(|| format!("load medication reference: {}", args.reference.display()))?;
    if reference.is_empty() {
        warn!(dir = %args.reference.display(), "medication reference directory yielded no rows");
    }

    let matches = match_medications(&vocab, &reference);
    let list = matches.to_code_list(&vocab);
    write_code_list(&args.out, &list)
        .with_context(|| format!("write code list: {}", args.out.display()))?;

    let excluded_out = args
        .excluded_out
        .clone()
        .unwrap_or_else(|| args.out.with_extension("excluded"));
    write_excluded_products(&excluded_out, &matches.excluded)
        .with_context(|| format!("write excluded products: {}", excluded_out.display()))?;

    info!(
        products = vocab.len(),
        retained = list.len(),
        excluded = matches.excluded.len(),
        "matched medication reference against product dictionary"
    );
    print_match_report(&matches.report, matches.excluded.len());
    print_code_list_summary(&list);
    Ok(())
}

pub fn run_diff(args: &DiffArgs) -> Result<()> {
    let diff = diff_lists(args)?;
    print_diff(&diff);
    Ok(())
}

fn diff_lists(args: &DiffArgs) -> Result<CodeListDiff> {
    let database: SourceDatabase = args.database.into();
    let kind: RecordKind = args.kind.into();
    let previous = read_code_list_ids(&args.previous)
        .with_context(|| format!("read previous list: {}", args.previous.display()))?;
    let new_ids = read_code_list_ids(&args.new)
        .with_context(|| format!("read new list: {}", args.new.display()))?;
    let current = dictionary_codes(&args.dictionary, database, kind)?;

    let mut new_list = CodeList::new(database, kind);
    for code_id in new_ids {
        new_list.push(CodeListEntry {
            code_id,
            description: String::new(),
            primary_only: false,
            category: None,
        });
    }
    Ok(diff_against_previous(&previous, &new_list, &current))
}

/// Current dictionary code ids for the given kind; diagnosis and
/// medication lists diff against different master dictionaries.
fn dictionary_codes(
    path: &Path,
    database: SourceDatabase,
    kind: RecordKind,
) -> Result<HashSet<String>> {
    let codes = match kind {
        RecordKind::Diagnosis => load_diagnosis_dictionary(path, database)
            .with_context(|| format!("load dictionary: {}", path.display()))?
            .iter()
            .map(|e| e.code_id.clone())
            .collect(),
        RecordKind::Medication => load_product_dictionary(path, database)
            .with_context(|| format!("load product dictionary: {}", path.display()))?
            .iter()
            .map(|e| e.code_id.clone())
            .collect(),
    };
    Ok(codes)
}

pub fn run_extract(args: &ExtractArgs) -> Result<()> {
    let database: SourceDatabase = args.database.into();
    let kind: RecordKind = args.kind.into();
    let span = info_span!("extract", database = %database, kind = %kind);
    let _guard = span.enter();
    let started = Instant::now();

    let config = StudyConfig::load(&args.config)?;
    let code_ids = read_code_list_ids(&args.code_list)
        .with_context(|| format!("read code list: {}", args.code_list.display()))?;
    let mut list = CodeList::new(database, kind);
    for code_id in code_ids {
        list.push(CodeListEntry {
            code_id,
            description: String::new(),
            primary_only: false,
            category: None,
        });
    }
    anyhow::ensure!(!list.is_empty(), "code list {} is empty", args.code_list.display());

    let files = discover_part_files(&args.delivery, database, kind)
        .with_context(|| format!("discover part files: {}", args.delivery.display()))?;
    anyhow::ensure!(
        !files.is_empty(),
        "no {database} {kind} part files found in {}",
        args.delivery.display()
    );

    let raw = extract_events(&files, &list, database, kind)
        .context("extract code-matched events")?;
    let cleaned = reconcile(&raw, config.earliest, config.latest);
    let patients: HashSet<&str> = cleaned.iter().map(|e| e.patient_id.as_str()).collect();
    for event in &cleaned {
        // Row-level values are PHI; redacted unless --log-data was given.
        trace!(
            patient = redact_value(event.patient_id.as_str()),
            code = %event.code_id,
            event_date = ?event.event_date,
            "retained event"
        );
    }

    write_events(&args.out, &cleaned)
        .with_context(|| format!("write events: {}", args.out.display()))?;
    info!(
        files = files.len(),
        raw_events = raw.len(),
        events = cleaned.len(),
        patients = patients.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "extraction complete"
    );
    print_extract_summary(raw.len(), cleaned.len(), patients.len());
    Ok(())
}

fn vocab_codes(vocab: &cprd_model::Vocabulary) -> HashSet<String> {
    vocab.iter().map(|e| e.code_id.clone()).collect()
}

fn diff_against_written(
    previous: &Path,
    new_list: &CodeList,
    current_vocab: &HashSet<String>,
) -> Result<CodeListDiff> {
    let previous_ids = read_code_list_ids(previous)
        .with_context(|| format!("read previous list: {}", previous.display()))?;
    Ok(diff_against_previous(&previous_ids, new_list, current_vocab))
}

/// Tab-delimited patient-event output, dates in ISO form, empty when null.
fn write_events(path: &Path, events: &[PatientEvent]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_path(path)
        .with_context(|| format!("open {}", path.display()))?;
    writer.write_record(["patid", "code", "event_date", "entry_date", "database", "kind"])?;
    for event in events {
        let event_date = date_field(event.event_date);
        let entry_date = date_field(event.entry_date);
        writer.write_record([
            event.patient_id.as_str(),
            event.code_id.as_str(),
            event_date.as_str(),
            entry_date.as_str(),
            event.database.as_str(),
            event.kind.as_str(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn date_field(date: Option<chrono::NaiveDate>) -> String {
    date.map(|d| d.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{DatabaseArg, KindArg};
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    fn aurum_product_dictionary(dir: &TempDir) -> PathBuf {
        write(
            dir,
            "aurum_product.txt",
            "prodcodeid\tproductname\ttermfromemis\tdrugsubstancename\tformulation\trouteofadministration\tsubstancestrength\tbnfchapter\n\
             100\tMetformin 500mg tablets\t\tmetformin\t\t\t500mg\t\n\
             200\tOzempic 1mg pen\t\tsemaglutide\t\t\t1mg\t\n",
        )
    }

    #[test]
    fn medication_lists_diff_through_the_product_dictionary() {
        let dir = TempDir::new().unwrap();
        let dictionary = aurum_product_dictionary(&dir);
        // 300 was on the previous list but is retired from the dictionary.
        let previous = write(&dir, "previous.txt", "code\n100\n300\n");
        let new = write(&dir, "new.txt", "code\n100\n200\n");

        let args = DiffArgs {
            previous,
            new,
            dictionary,
            database: DatabaseArg::Aurum,
            kind: KindArg::Medication,
        };
        let diff = diff_lists(&args).unwrap();
        assert_eq!(diff.added, vec!["200".to_string()]);
        assert!(diff.missing.is_empty());
    }

    #[test]
    fn diffing_a_product_dictionary_as_diagnosis_aborts() {
        let dir = TempDir::new().unwrap();
        let dictionary = aurum_product_dictionary(&dir);
        let previous = write(&dir, "previous.txt", "code\n100\n");
        let new = write(&dir, "new.txt", "code\n100\n");

        let args = DiffArgs {
            previous,
            new,
            dictionary,
            database: DatabaseArg::Aurum,
            kind: KindArg::Diagnosis,
        };
        let err = diff_lists(&args).unwrap_err();
        assert!(format!("{err:#}").contains("medcodeid"));
    }

    #[test]
    fn extract_writes_suffixed_patient_ids() {
        let dir = TempDir::new().unwrap();
        write(
            &dir,
            "gold_clinical_part1.txt",
            "patid\teventdate\tsysdate\tmedcode\n\
             12345\t01/02/2015\t02/02/2015\t100\n\
             12345\t01/02/2015\t02/02/2015\t999\n",
        );
        let code_list = write(&dir, "smi_gold.txt", "code\n100\n");
        let config = write(
            &dir,
            "study.toml",
            "earliest = \"1900-01-01\"\nlatest = \"2023-06-01\"\n",
        );
        let out = dir.path().join("events.txt");

        let args = ExtractArgs {
            delivery: dir.path().to_path_buf(),
            database: DatabaseArg::Gold,
            kind: KindArg::Diagnosis,
            code_list,
            config,
            out: out.clone(),
        };
        run_extract(&args).unwrap();

        let written = std::fs::read_to_string(&out).unwrap();
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines.len(), 2, "header plus the one code-matched row");
        assert!(lines[1].starts_with("12345-G\t100\t2015-02-01"));
    }
}
