use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::database::{PatientId, RecordKind, SourceDatabase};

/// One matching row from a patient-record extract.
///
/// Created by the cohort extractor, mutated once by the date reconciler
/// (date substitution), and only ever removed by exact-duplicate collapse.
/// Both dates are nullable before reconciliation; afterwards `event_date`
/// is always populated for surviving events.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PatientEvent {
    pub patient_id: PatientId,
    pub code_id: String,
    /// Primary clinical date (event/observation/issue date).
    pub event_date: Option<NaiveDate>,
    /// Secondary system date (database entry date).
    pub entry_date: Option<NaiveDate>,
    pub database: SourceDatabase,
    pub kind: RecordKind,
}
