//! Plain-text matching helpers for medication names.
//!
//! Whole-word containment here means: the needle occurs as a substring
//! bounded on both sides by a non-alphanumeric character or the string
//! boundary. This stops keyword "met" from matching "Metformin" while
//! letting "metformin" match "Metformin 500mg tablets".

/// Whole-word containment over already-lowercased text.
///
/// Callers lowercase once up front; needles from the medication reference
/// are lowercased at load time.
pub fn contains_whole_word(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    for (start, _) in haystack.match_indices(needle) {
        let end = start + needle.len();
        let boundary_before = haystack[..start]
            .chars()
            .next_back()
            .is_none_or(|c| !c.is_alphanumeric());
        let boundary_after = haystack[end..]
            .chars()
            .next()
            .is_none_or(|c| !c.is_alphanumeric());
        if boundary_before && boundary_after {
            return true;
        }
    }
    false
}

/// Lowercase and replace punctuation with spaces, collapsing runs of
/// whitespace. Used to build the concatenated search text for formulation
/// inference and the final precision filter.
pub fn strip_punctuation(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last_space = true;
    for c in text.chars() {
        if c.is_alphanumeric() {
            out.extend(c.to_lowercase());
            last_space = false;
        } else if !last_space {
            out.push(' ');
            last_space = true;
        }
    }
    while out.ends_with(' ') {
        out.pop();
    }
    out
}

/// Title-case a keyword for output labels ("semaglutide" -> "Semaglutide").
pub fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_word_rejects_substring_hits() {
        assert!(!contains_whole_word("metformin 500mg tablets", "met"));
        assert!(contains_whole_word("metformin 500mg tablets", "metformin"));
    }

    #[test]
    fn whole_word_accepts_punctuation_boundaries() {
        assert!(contains_whole_word("ozempic, 1mg pen", "ozempic"));
        assert!(contains_whole_word("co-codamol", "codamol"));
        assert!(contains_whole_word("insulin", "insulin"));
    }

    #[test]
    fn whole_word_rejects_digit_boundaries() {
        // "b12" should not be a whole-word hit for "b1".
        assert!(!contains_whole_word("vitamin b12", "b1"));
    }

    #[test]
    fn strip_punctuation_collapses_and_lowercases() {
        assert_eq!(
            strip_punctuation("Ozempic 1mg/0.74ml  (pen)"),
            "ozempic 1mg 0 74ml pen"
        );
        assert_eq!(strip_punctuation("--"), "");
    }

    #[test]
    fn title_case_capitalizes_first_letter_only() {
        assert_eq!(title_case("semaglutide"), "Semaglutide");
        assert_eq!(title_case(""), "");
    }
}
