//! Cohort extraction: code-list-driven streaming over patient-record
//! extract files, followed by date reconciliation and deduplication.

pub mod dates;
pub mod error;
pub mod extractor;

pub use dates::{CPRD_DATE_FORMAT, parse_cprd_date, reconcile};
pub use error::{ExtractError, Result};
pub use extractor::{RawEvent, extract_events, extract_events_tagged};
