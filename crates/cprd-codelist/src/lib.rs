//! Code-list curation: rule-based classification of diagnosis
//! vocabularies, whole-word medication matching, list differencing and
//! tab-delimited list output.

pub mod classify;
pub mod diff;
pub mod error;
pub mod medications;
pub mod rules;
pub mod wordmatch;
pub mod writer;

pub use classify::classify;
pub use diff::{CodeListDiff, diff_against_previous, diff_code_ids};
pub use error::{CodelistError, Result};
pub use medications::{MatchReport, MatchedProduct, MedicationMatches, match_medications};
pub use rules::{CompiledRules, ExceptionRule, RuleFile, SubtypeRule};
pub use wordmatch::{contains_whole_word, strip_punctuation, title_case};
pub use writer::{read_code_list_ids, write_code_list, write_excluded_products};
