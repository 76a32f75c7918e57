//! Date reconciliation over extracted events.
//!
//! CPRD extracts carry two textual dates per row: a primary clinical date
//! and a secondary system entry date, both in day/month/year form. Known
//! data-entry defaults (dates near 1900) and out-of-window values are
//! cleaned with the ordered rules below; bad dates are data, not errors.

use std::collections::HashSet;

use chrono::NaiveDate;
use tracing::info;

use cprd_model::PatientEvent;

use crate::extractor::RawEvent;

/// Textual date format of CPRD extracts.
pub const CPRD_DATE_FORMAT: &str = "%d/%m/%Y";

/// Parse an extract date; empty or unparsable values are null.
pub fn parse_cprd_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(trimmed, CPRD_DATE_FORMAT).ok()
}

/// Primary dates before this are treated as data-entry defaults, not real
/// events.
fn implausible_primary_before() -> NaiveDate {
    NaiveDate::from_ymd_opt(1910, 1, 1).unwrap()
}

/// A secondary date after this is recent enough to substitute for an
/// implausible primary.
fn plausible_secondary_after() -> NaiveDate {
    NaiveDate::from_ymd_opt(1990, 1, 1).unwrap()
}

/// Reconcile event dates against the study window, then collapse exact
/// duplicate rows (overlapping source files and repeated joins produce
/// genuine duplicates).
///
/// Rules, applied in order per event:
/// 1. parse both dates; unparsable -> null;
/// 2. any date strictly before `earliest` -> null;
/// 3. primary date strictly after `latest` -> null (system entry may
///    legitimately postdate the window, so the secondary is not bounded
///    above);
/// 4. primary before 1910 with a post-1990 secondary -> substitute the
///    secondary for the primary;
/// 5. null primary -> coalesce from the secondary;
/// 6. drop events whose primary is still null or beyond `latest`.
pub fn reconcile(events: &[RawEvent], earliest: NaiveDate, latest: NaiveDate) -> Vec<PatientEvent> {
    let input = events.len();
    let mut seen: HashSet<PatientEvent> = HashSet::new();
    let mut cleaned = Vec::new();

    for event in events {
        let mut primary = parse_cprd_date(&event.event_date);
        let mut secondary = parse_cprd_date(&event.entry_date);

        primary = primary.filter(|d| *d >= earliest);
        secondary = secondary.filter(|d| *d >= earliest);
        primary = primary.filter(|d| *d <= latest);

        if let (Some(p), Some(s)) = (primary, secondary)
            && p < implausible_primary_before()
            && s > plausible_secondary_after()
        {
            primary = Some(s);
        }
        if primary.is_none() {
            primary = secondary;
        }
        let Some(event_date) = primary else {
            continue;
        };
        if event_date > latest {
            continue;
        }

        let cleaned_event = PatientEvent {
            patient_id: event.patient_id.clone(),
            code_id: event.code_id.clone(),
            event_date: Some(event_date),
            entry_date: secondary,
            database: event.database,
            kind: event.kind,
        };
        if seen.insert(cleaned_event.clone()) {
            cleaned.push(cleaned_event);
        }
    }

    info!(input, retained = cleaned.len(), "reconciled event dates");
    cleaned
}

#[cfg(test)]
mod tests {
    use super::*;
    use cprd_model::{PatientId, RecordKind, SourceDatabase};

    fn raw(event_date: &str, entry_date: &str) -> RawEvent {
        RawEvent {
            patient_id: PatientId::new("1", SourceDatabase::Gold),
            code_id: "100".into(),
            event_date: event_date.into(),
            entry_date: entry_date.into(),
            database: SourceDatabase::Gold,
            kind: RecordKind::Diagnosis,
        }
    }

    fn window() -> (NaiveDate, NaiveDate) {
        (
            NaiveDate::from_ymd_opt(1900, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2023, 6, 1).unwrap(),
        )
    }

    #[test]
    fn implausible_primary_is_replaced_by_plausible_secondary() {
        let (earliest, latest) = window();
        let cleaned = reconcile(&[raw("01/01/1901", "15/06/2010")], earliest, latest);
        assert_eq!(cleaned.len(), 1);
        assert_eq!(
            cleaned[0].event_date,
            NaiveDate::from_ymd_opt(2010, 6, 15)
        );
    }

    #[test]
    fn future_primary_beyond_window_drops_the_event() {
        let (earliest, latest) = window();
        let cleaned = reconcile(&[raw("15/06/2030", "")], earliest, latest);
        assert!(cleaned.is_empty());
    }

    #[test]
    fn null_primary_coalesces_from_secondary() {
        let (earliest, latest) = window();
        let cleaned = reconcile(&[raw("", "02/03/2015")], earliest, latest);
        assert_eq!(cleaned.len(), 1);
        assert_eq!(cleaned[0].event_date, NaiveDate::from_ymd_opt(2015, 3, 2));
    }

    #[test]
    fn unparsable_dates_drop_the_event_without_error() {
        let (earliest, latest) = window();
        let cleaned = reconcile(&[raw("not-a-date", "also bad")], earliest, latest);
        assert!(cleaned.is_empty());
    }

    #[test]
    fn secondary_is_not_bounded_above_by_the_window() {
        // Entry date after the window end is kept as metadata; the event
        // survives on its in-window primary date.
        let (earliest, latest) = window();
        let cleaned = reconcile(&[raw("01/05/2023", "01/09/2023")], earliest, latest);
        assert_eq!(cleaned.len(), 1);
        assert_eq!(
            cleaned[0].entry_date,
            NaiveDate::from_ymd_opt(2023, 9, 1)
        );
    }

    #[test]
    fn exact_duplicates_collapse() {
        let (earliest, latest) = window();
        let cleaned = reconcile(
            &[raw("01/05/2015", "02/05/2015"), raw("01/05/2015", "02/05/2015")],
            earliest,
            latest,
        );
        assert_eq!(cleaned.len(), 1);
    }

    #[test]
    fn pre_window_dates_are_nulled_then_dropped() {
        let (earliest, latest) = window();
        let cleaned = reconcile(&[raw("01/01/1899", "")], earliest, latest);
        assert!(cleaned.is_empty());
    }
}
