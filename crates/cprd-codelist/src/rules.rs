//! Classification rules as data.
//!
//! Curation rules live in TOML files so a list can be rebuilt and reviewed
//! without touching code. A rule file carries the inclusion/exclusion
//! patterns, contextual exceptions to the exclusion, ordered subtype rules,
//! an optional primary-diagnosis-only pattern and a set of manual code
//! exclusions for known mapping errors.
//!
//! Example:
//!
//! ```toml
//! include = "schizo|bipolar|manic|psychosis|psychotic"
//! exclude = "depressive|history of"
//!
//! [[exceptions]]
//! term = "depressive"
//! allowed_before = ["manic-", "schizoaffective disorder, "]
//!
//! [[subtypes]]
//! pattern = "schizo"
//! label = "Schizophrenia"
//!
//! default_subtype = "Other psychoses"
//! manual_exclusions = ["94662"]
//! ```

use std::collections::HashSet;
use std::path::Path;

use regex::{Regex, RegexBuilder};
use serde::Deserialize;

use crate::error::{CodelistError, Result};

/// One contextual exception to the exclusion pattern.
///
/// An exclusion match is waived when the matched text equals `term` and the
/// surrounding text carries one of the allowed contexts: the text before
/// the match ends with an `allowed_before` literal, or the text after it
/// starts with an `allowed_after` literal.
#[derive(Debug, Clone, Deserialize)]
pub struct ExceptionRule {
    pub term: String,
    #[serde(default)]
    pub allowed_before: Vec<String>,
    #[serde(default)]
    pub allowed_after: Vec<String>,
}

/// One subtype-tagging rule; rules are evaluated in declaration order and
/// the first match wins.
#[derive(Debug, Clone, Deserialize)]
pub struct SubtypeRule {
    pub pattern: String,
    pub label: String,
}

/// A diagnosis rule file, as deserialized from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct RuleFile {
    pub include: String,
    #[serde(default)]
    pub exclude: Option<String>,
    #[serde(default)]
    pub exceptions: Vec<ExceptionRule>,
    #[serde(default)]
    pub subtypes: Vec<SubtypeRule>,
    #[serde(default)]
    pub default_subtype: Option<String>,
    /// Codes matching this pattern count solely as primary diagnoses.
    #[serde(default)]
    pub primary_only: Option<String>,
    #[serde(default)]
    pub manual_exclusions: Vec<String>,
}

impl RuleFile {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| CodelistError::RulesRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        toml::from_str(&text).map_err(|e| CodelistError::RulesParse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Compile every pattern up front; any invalid pattern aborts the run
    /// before classification starts.
    pub fn compile(&self) -> Result<CompiledRules> {
        let include = compile_pattern(&self.include)?;
        let exclude = match &self.exclude {
            Some(pattern) => Some(ExcludeRule {
                regex: compile_pattern(pattern)?,
                exceptions: self
                    .exceptions
                    .iter()
                    .map(|e| CompiledException {
                        term: e.term.to_lowercase(),
                        allowed_before: lowercase_all(&e.allowed_before),
                        allowed_after: lowercase_all(&e.allowed_after),
                    })
                    .collect(),
            }),
            None => None,
        };
        let subtypes = self
            .subtypes
            .iter()
            .map(|rule| Ok((compile_pattern(&rule.pattern)?, rule.label.clone())))
            .collect::<Result<Vec<_>>>()?;
        let primary_only = self
            .primary_only
            .as_deref()
            .map(compile_pattern)
            .transpose()?;
        Ok(CompiledRules {
            include,
            exclude,
            subtypes,
            default_subtype: self.default_subtype.clone(),
            primary_only,
            manual_exclusions: self.manual_exclusions.iter().cloned().collect(),
        })
    }
}

fn lowercase_all(values: &[String]) -> Vec<String> {
    values.iter().map(|v| v.to_lowercase()).collect()
}

fn compile_pattern(pattern: &str) -> Result<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| CodelistError::PatternCompile {
            pattern: pattern.to_string(),
            source: e,
        })
}

/// The exclusion pattern with its compiled contextual exceptions.
#[derive(Debug, Clone)]
pub struct ExcludeRule {
    pub regex: Regex,
    pub exceptions: Vec<CompiledException>,
}

#[derive(Debug, Clone)]
pub struct CompiledException {
    pub term: String,
    pub allowed_before: Vec<String>,
    pub allowed_after: Vec<String>,
}

/// A rule file with all patterns compiled, ready for classification.
#[derive(Debug, Clone)]
pub struct CompiledRules {
    pub include: Regex,
    pub exclude: Option<ExcludeRule>,
    pub subtypes: Vec<(Regex, String)>,
    pub default_subtype: Option<String>,
    pub primary_only: Option<Regex>,
    pub manual_exclusions: HashSet<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_file_parses_from_toml() {
        let toml = r#"
            include = "schizo|bipolar"
            exclude = "depressive"

            [[exceptions]]
            term = "depressive"
            allowed_before = ["manic-"]

            [[subtypes]]
            pattern = "schizo"
            label = "Schizophrenia"

            default_subtype = "Other psychoses"
            manual_exclusions = ["94662"]
        "#;
        let rules: RuleFile = toml::from_str(toml).unwrap();
        let compiled = rules.compile().unwrap();
        assert!(compiled.include.is_match("schizoaffective disorder"));
        assert_eq!(compiled.subtypes.len(), 1);
        assert!(compiled.manual_exclusions.contains("94662"));
    }

    #[test]
    fn invalid_pattern_is_fatal() {
        let rules = RuleFile {
            include: "(unclosed".into(),
            exclude: None,
            exceptions: Vec::new(),
            subtypes: Vec::new(),
            default_subtype: None,
            primary_only: None,
            manual_exclusions: Vec::new(),
        };
        let err = rules.compile().unwrap_err();
        assert!(matches!(err, CodelistError::PatternCompile { .. }));
    }

    #[test]
    fn patterns_compile_case_insensitive() {
        let rules = RuleFile {
            include: "BIPOLAR".into(),
            exclude: None,
            exceptions: Vec::new(),
            subtypes: Vec::new(),
            default_subtype: None,
            primary_only: None,
            manual_exclusions: Vec::new(),
        };
        let compiled = rules.compile().unwrap();
        assert!(compiled.include.is_match("bipolar affective disorder"));
    }
}
