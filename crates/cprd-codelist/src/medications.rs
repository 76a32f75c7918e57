//! Medication matching against a product dictionary.
//!
//! Matching runs in two stages. Field-level whole-word matching of brand
//! names and ingredient keywords generates candidates and accumulates the
//! keyword families each product belongs to. A final precision filter
//! re-scans the concatenated, punctuation-stripped product text against the
//! full keyword list and is the authoritative retention gate; candidates it
//! rejects land in an excluded list for audit rather than in the output.
//! In between, missing formulation and route fields are inferred from the
//! product text, never overwriting values the dictionary already carries.

use tracing::{debug, info};

use cprd_model::{
    CodeList, CodeListEntry, MedicationRef, ProductEntry, ProductVocabulary, RecordKind,
};

use crate::wordmatch::{contains_whole_word, strip_punctuation, title_case};

/// Ordered formulation-inference rules; the first cue found in the product
/// text wins. Applied only when the dictionary formulation is null.
const FORMULATION_RULES: &[(&[&str], &str)] = &[
    (&["tablet", "tablets", "tab", "tabs", "pill", "pills"], "Tablet"),
    (&["capsule", "capsules", "cap", "caps"], "Capsule"),
    (
        &["injection", "inj", "vial", "vials", "syringe", "pen", "prefilled"],
        "Solution for injection",
    ),
    (
        &["oral solution", "oral suspension", "syrup", "elixir", "liquid"],
        "Oral solution",
    ),
    (&["powder", "sachet", "sachets", "granules"], "Powder"),
    (&["suppository", "suppositories"], "Suppository"),
];

/// Route-inference rules keyed on formulation; null-only, first match wins.
const ROUTE_RULES: &[(&str, &str)] = &[
    ("Tablet", "Oral"),
    ("Oral solution", "Oral"),
    ("Capsule", "Oral"),
    ("Powder", "Oral"),
    ("Solution for injection", "Intramuscular"),
    ("Suppository", "Rectal"),
];

/// A product retained by the matcher, with the keyword families it matched.
#[derive(Debug, Clone)]
pub struct MatchedProduct {
    /// The product entry, with inferred formulation/route/ingredient filled.
    pub product: ProductEntry,
    /// Matched ingredient keywords, deduplicated, in insertion order.
    /// Combination products may carry several.
    pub keywords: Vec<String>,
}

impl MatchedProduct {
    /// Title-cased, "/"-joined label for the medication column.
    pub fn label(&self) -> String {
        self.keywords
            .iter()
            .map(|k| title_case(k))
            .collect::<Vec<_>>()
            .join("/")
    }
}

/// Per-keyword matched-product counts, in reference order, for review.
#[derive(Debug, Clone, Default)]
pub struct MatchReport {
    pub counts: Vec<(String, usize)>,
}

/// Full matcher output: retained products, the precision-filter reject list
/// and the per-keyword report.
#[derive(Debug, Clone)]
pub struct MedicationMatches {
    pub matched: Vec<MatchedProduct>,
    pub excluded: Vec<ProductEntry>,
    pub report: MatchReport,
}

impl MedicationMatches {
    /// Collapse the retained products into a code list, one entry per code,
    /// tagged with the "/"-joined medication label.
    pub fn to_code_list(&self, vocab: &ProductVocabulary) -> CodeList {
        let mut list = CodeList::new(vocab.database, RecordKind::Medication);
        for matched in &self.matched {
            list.push(CodeListEntry {
                code_id: matched.product.code_id.clone(),
                description: matched.product.product_name.clone(),
                primary_only: false,
                category: Some(matched.label()),
            });
        }
        list
    }
}

struct Candidate {
    product: ProductEntry,
    name_lc: String,
    term_lc: String,
    ingredient_lc: String,
    keywords: Vec<String>,
}

impl Candidate {
    fn new(product: &ProductEntry) -> Self {
        Self {
            name_lc: product.product_name.to_lowercase(),
            term_lc: product.term.as_deref().unwrap_or("").to_lowercase(),
            ingredient_lc: product.ingredient.as_deref().unwrap_or("").to_lowercase(),
            product: product.clone(),
            keywords: Vec::new(),
        }
    }

    /// Whole-word hit in any of the three searchable fields.
    fn any_field_contains(&self, needle: &str) -> bool {
        contains_whole_word(&self.name_lc, needle)
            || contains_whole_word(&self.term_lc, needle)
            || contains_whole_word(&self.ingredient_lc, needle)
    }

    fn add_keyword(&mut self, keyword: &str) {
        if !self.keywords.iter().any(|k| k == keyword) {
            self.keywords.push(keyword.to_string());
        }
    }
}

/// Concatenated, punctuation-stripped search text for inference and the
/// precision filter. Built after the ingredient fallback so a backfilled
/// ingredient participates in the final scan.
fn search_text(product: &ProductEntry) -> String {
    strip_punctuation(&format!(
        "{} {} {}",
        product.product_name,
        product.term.as_deref().unwrap_or(""),
        product.ingredient.as_deref().unwrap_or("")
    ))
}

/// Match a product vocabulary against the medication reference.
pub fn match_medications(
    vocab: &ProductVocabulary,
    reference: &[MedicationRef],
) -> MedicationMatches {
    // Expand reference rows to (keyword, brand) attempts; every keyword is
    // also searched standalone so rows without brand synonyms still match.
    let mut attempts: Vec<(&str, Option<&str>)> = Vec::new();
    for row in reference {
        attempts.push((row.keyword.as_str(), None));
        for brand in &row.brands {
            attempts.push((row.keyword.as_str(), Some(brand.as_str())));
        }
    }

    let mut candidates: Vec<Candidate> = vocab.iter().map(Candidate::new).collect();
    for (keyword, brand) in &attempts {
        for candidate in &mut candidates {
            let brand_hit = brand.is_some_and(|b| candidate.any_field_contains(b));
            let keyword_hit = candidate.any_field_contains(keyword);
            if brand_hit || keyword_hit {
                candidate.add_keyword(keyword);
            }
        }
    }

    let all_keywords: Vec<&str> = reference.iter().map(|r| r.keyword.as_str()).collect();

    let mut matched = Vec::new();
    let mut excluded = Vec::new();
    for candidate in candidates {
        if candidate.keywords.is_empty() {
            continue;
        }
        let mut entry = MatchedProduct {
            product: candidate.product,
            keywords: candidate.keywords,
        };
        // Null ingredients are backfilled with the matched keyword label
        // before the final scan, so dictionaries that leave the substance
        // column empty still pass the precision filter on the keyword.
        if entry.product.ingredient.is_none() {
            entry.product.ingredient = Some(entry.label());
        }
        let search_text = search_text(&entry.product);
        infer_formulation(&mut entry.product, &search_text);
        infer_route(&mut entry.product);

        // Authoritative retention gate: the field-level pass above is
        // candidate generation only.
        let confirmed = all_keywords
            .iter()
            .any(|k| contains_whole_word(&search_text, k));
        if !confirmed {
            debug!(code = %entry.product.code_id, "precision filter rejected candidate");
            excluded.push(entry.product);
            continue;
        }
        matched.push(entry);
    }

    let report = MatchReport {
        counts: reference
            .iter()
            .map(|row| {
                let count = matched
                    .iter()
                    .filter(|m| m.keywords.iter().any(|k| k == &row.keyword))
                    .count();
                (row.keyword.clone(), count)
            })
            .collect(),
    };

    info!(
        products = vocab.len(),
        matched = matched.len(),
        excluded = excluded.len(),
        "matched medication vocabulary"
    );

    MedicationMatches {
        matched,
        excluded,
        report,
    }
}

fn infer_formulation(product: &mut ProductEntry, search_text: &str) {
    if product.formulation.is_some() {
        return;
    }
    for (cues, formulation) in FORMULATION_RULES {
        if cues.iter().any(|cue| contains_whole_word(search_text, cue)) {
            product.formulation = Some((*formulation).to_string());
            return;
        }
    }
}

fn infer_route(product: &mut ProductEntry) {
    if product.route.is_some() {
        return;
    }
    let Some(formulation) = product.formulation.as_deref() else {
        return;
    };
    for (from, route) in ROUTE_RULES {
        if formulation.eq_ignore_ascii_case(from) {
            product.route = Some((*route).to_string());
            return;
        }
    }
}
