use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ModelError;

/// The two CPRD primary-care database products.
///
/// GOLD and Aurum hold the same conceptual data (diagnoses, drug issues)
/// under different schemas; column names and code dictionaries differ, so
/// most of the pipeline is parameterised by this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceDatabase {
    Gold,
    Aurum,
}

impl SourceDatabase {
    /// Canonical display name as used in CPRD documentation.
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceDatabase::Gold => "GOLD",
            SourceDatabase::Aurum => "Aurum",
        }
    }

    /// Single-letter suffix appended to raw patient IDs when merging the
    /// two databases, guaranteeing global uniqueness of composite IDs.
    pub fn id_suffix(&self) -> char {
        match self {
            SourceDatabase::Gold => 'G',
            SourceDatabase::Aurum => 'A',
        }
    }
}

impl fmt::Display for SourceDatabase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SourceDatabase {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gold" => Ok(SourceDatabase::Gold),
            "aurum" => Ok(SourceDatabase::Aurum),
            _ => Err(ModelError::UnknownDatabase { tag: s.to_string() }),
        }
    }
}

/// The kind of clinical record a file or code list refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    /// Clinical/observation records carrying diagnosis codes (medcodes).
    Diagnosis,
    /// Therapy/drug-issue records carrying product codes (prodcodes).
    Medication,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Diagnosis => "diagnosis",
            RecordKind::Medication => "medication",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RecordKind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "diagnosis" | "clinical" | "observation" => Ok(RecordKind::Diagnosis),
            "medication" | "therapy" | "drugissue" => Ok(RecordKind::Medication),
            _ => Err(ModelError::UnknownRecordKind { tag: s.to_string() }),
        }
    }
}

/// Column names of a patient-record extract for one (database, kind) pair.
///
/// The conceptual layout is identical across the four combinations but every
/// column is named differently in at least one of them; Aurum code columns
/// carry an `id` suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceColumns {
    pub patient: &'static str,
    pub code: &'static str,
    /// Primary clinical date (event/observation/issue date).
    pub event_date: &'static str,
    /// Secondary system date (when the record entered the database).
    pub entry_date: &'static str,
}

/// Resolve the extract column names for a (database, kind) pair.
pub fn source_columns(database: SourceDatabase, kind: RecordKind) -> SourceColumns {
    match (database, kind) {
        (SourceDatabase::Gold, RecordKind::Diagnosis) => SourceColumns {
            patient: "patid",
            code: "medcode",
            event_date: "eventdate",
            entry_date: "sysdate",
        },
        (SourceDatabase::Gold, RecordKind::Medication) => SourceColumns {
            patient: "patid",
            code: "prodcode",
            event_date: "eventdate",
            entry_date: "sysdate",
        },
        (SourceDatabase::Aurum, RecordKind::Diagnosis) => SourceColumns {
            patient: "patid",
            code: "medcodeid",
            event_date: "obsdate",
            entry_date: "enterdate",
        },
        (SourceDatabase::Aurum, RecordKind::Medication) => SourceColumns {
            patient: "patid",
            code: "prodcodeid",
            event_date: "issuedate",
            entry_date: "enterdate",
        },
    }
}

/// Globally unique patient identifier across merged databases.
///
/// Raw CPRD patient IDs are numeric and independently assigned per database,
/// so the same number can occur in both. The composite form is
/// `<raw>-G` for GOLD and `<raw>-A` for Aurum.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatientId(String);

impl PatientId {
    pub fn new(raw: &str, database: SourceDatabase) -> Self {
        Self(format!("{}-{}", raw.trim(), database.id_suffix()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PatientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
