//! Code-list differencing for human review of list evolution.

use std::collections::HashSet;

use cprd_model::CodeList;

/// Result of comparing a new code list against a previous version.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeListDiff {
    /// Codes in the new list that the previous list lacked.
    pub added: Vec<String>,
    /// Codes from the previous list missing from the new one, restricted to
    /// codes still present in the current dictionary. Codes retired from
    /// the dictionary entirely can no longer be recorded, so they are not
    /// reported.
    pub missing: Vec<String>,
}

/// Pure set comparison of previous/new code-id sets against the current
/// dictionary codes. Output is sorted for stable review reports.
pub fn diff_code_ids(
    previous: &HashSet<String>,
    new: &HashSet<String>,
    current_vocab: &HashSet<String>,
) -> CodeListDiff {
    let mut added: Vec<String> = new.difference(previous).cloned().collect();
    let mut missing: Vec<String> = previous
        .difference(new)
        .filter(|code| current_vocab.contains(*code))
        .cloned()
        .collect();
    added.sort();
    missing.sort();
    CodeListDiff { added, missing }
}

/// Compare a freshly built list against a previous set of code ids.
pub fn diff_against_previous(
    previous_ids: &[String],
    new_list: &CodeList,
    current_vocab_codes: &HashSet<String>,
) -> CodeListDiff {
    let previous: HashSet<String> = previous_ids.iter().cloned().collect();
    let new: HashSet<String> = new_list.code_ids().map(str::to_string).collect();
    diff_code_ids(&previous, &new, current_vocab_codes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(ids: &[&str]) -> HashSet<String> {
        ids.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn missing_excludes_codes_retired_from_the_dictionary() {
        // Previous {A,B,C}, new {B,C,D}, dictionary {A,B,C,D,E}:
        // missing must be exactly {A}.
        let diff = diff_code_ids(
            &set(&["A", "B", "C"]),
            &set(&["B", "C", "D"]),
            &set(&["A", "B", "C", "D", "E"]),
        );
        assert_eq!(diff.missing, vec!["A".to_string()]);
        assert_eq!(diff.added, vec!["D".to_string()]);
    }

    #[test]
    fn retired_codes_drop_out_of_the_missing_report() {
        // "Z" was in the previous list but is gone from the dictionary.
        let diff = diff_code_ids(&set(&["A", "Z"]), &set(&["A"]), &set(&["A"]));
        assert!(diff.missing.is_empty());
        assert!(diff.added.is_empty());
    }
}
