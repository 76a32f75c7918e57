//! Rule-based classification of diagnosis vocabularies.
//!
//! Inclusion is evaluated first, exclusion second; a code excluded within a
//! pass is never reinstated. The `regex` engine has no lookaround, so
//! contextual exceptions ("exclude `depressive`, but not after `manic-`")
//! are implemented as an explicit span check over exclusion matches.

use tracing::info;

use cprd_model::{CodeList, CodeListEntry, RecordKind, Vocabulary};

use crate::rules::{CompiledRules, ExcludeRule};

/// Classify a vocabulary against compiled rules, producing a code list.
///
/// An empty vocabulary yields an empty list. Manual exclusions are applied
/// last, regardless of pattern outcome.
pub fn classify(vocab: &Vocabulary, rules: &CompiledRules) -> CodeList {
    let mut list = CodeList::new(vocab.database, RecordKind::Diagnosis);
    for entry in vocab.iter() {
        if !rules.include.is_match(&entry.description) {
            continue;
        }
        if let Some(exclude) = &rules.exclude
            && is_excluded(exclude, &entry.description)
        {
            continue;
        }
        let category = subtype_label(rules, &entry.description);
        let primary_only = rules
            .primary_only
            .as_ref()
            .is_some_and(|re| re.is_match(&entry.description));
        list.push(CodeListEntry {
            code_id: entry.code_id.clone(),
            description: entry.original_description.clone(),
            primary_only,
            category,
        });
    }
    for code_id in &rules.manual_exclusions {
        list.remove(code_id);
    }
    info!(
        database = %vocab.database,
        vocabulary = vocab.len(),
        retained = list.len(),
        "classified vocabulary"
    );
    list
}

/// True when the description carries at least one exclusion match that no
/// contextual exception waives.
fn is_excluded(rule: &ExcludeRule, description: &str) -> bool {
    for found in rule.regex.find_iter(description) {
        let matched = found.as_str().to_lowercase();
        let before = &description[..found.start()];
        let after = &description[found.end()..];
        let waived = rule.exceptions.iter().any(|ex| {
            if ex.term != matched {
                return false;
            }
            ex.allowed_before.iter().any(|ctx| before.ends_with(ctx))
                || ex.allowed_after.iter().any(|ctx| after.starts_with(ctx))
        });
        if !waived {
            return true;
        }
    }
    false
}

/// First subtype rule matching the description wins; the default label
/// applies when none match.
fn subtype_label(rules: &CompiledRules, description: &str) -> Option<String> {
    for (pattern, label) in &rules.subtypes {
        if pattern.is_match(description) {
            return Some(label.clone());
        }
    }
    rules.default_subtype.clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cprd_model::{SourceDatabase, VocabEntry};

    use crate::rules::RuleFile;

    fn smi_rules() -> CompiledRules {
        let file: RuleFile = toml::from_str(
            r#"
            include = "schizo|bipolar|manic|psychosis|psychotic"
            exclude = "depressive|non-organic psychosis"

            [[exceptions]]
            term = "depressive"
            allowed_before = ["manic-", "schizoaffective disorder, "]

            [[subtypes]]
            pattern = "schizo"
            label = "Schizophrenia"

            [[subtypes]]
            pattern = "bipolar|manic"
            label = "Bipolar disorder"

            default_subtype = "Other psychoses"
            "#,
        )
        .unwrap();
        file.compile().unwrap()
    }

    fn vocab(entries: &[(&str, &str)]) -> Vocabulary {
        let mut vocab = Vocabulary::new(SourceDatabase::Gold);
        for (code, desc) in entries {
            vocab
                .entries
                .push(VocabEntry::new(*code, desc, SourceDatabase::Gold));
        }
        vocab
    }

    #[test]
    fn excluded_word_with_allowed_prefix_is_kept() {
        let vocab = vocab(&[
            ("1", "Manic-depressive psychosis"),
            ("2", "Depressive psychosis"),
        ]);
        let list = classify(&vocab, &smi_rules());
        assert!(list.contains("1"));
        assert!(!list.contains("2"));
    }

    #[test]
    fn first_subtype_rule_wins() {
        // "schizoaffective disorder, manic type" matches both subtype rules;
        // the schizo rule is declared first.
        let vocab = vocab(&[("1", "Schizoaffective disorder, manic type")]);
        let list = classify(&vocab, &smi_rules());
        assert_eq!(
            list.entries()[0].category.as_deref(),
            Some("Schizophrenia")
        );
    }

    #[test]
    fn default_subtype_applies_when_no_rule_matches() {
        let vocab = vocab(&[("1", "Psychotic episode NOS")]);
        let list = classify(&vocab, &smi_rules());
        assert_eq!(
            list.entries()[0].category.as_deref(),
            Some("Other psychoses")
        );
    }

    #[test]
    fn empty_vocabulary_yields_empty_list() {
        let vocab = Vocabulary::new(SourceDatabase::Aurum);
        let list = classify(&vocab, &smi_rules());
        assert!(list.is_empty());
    }
}
