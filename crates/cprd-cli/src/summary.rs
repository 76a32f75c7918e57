//! Console summary tables for code lists, diffs, and extraction runs.

use std::collections::BTreeMap;

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use cprd_codelist::{CodeListDiff, MatchReport};
use cprd_model::CodeList;

pub fn print_code_list_summary(list: &CodeList) {
    println!(
        "Code list: {} {} ({} codes)",
        list.database,
        list.kind,
        list.len()
    );
    let mut by_category: BTreeMap<String, usize> = BTreeMap::new();
    let mut primary_only = 0usize;
    for entry in list.entries() {
        let label = entry
            .category
            .clone()
            .unwrap_or_else(|| "(uncategorized)".to_string());
        *by_category.entry(label).or_default() += 1;
        if entry.primary_only {
            primary_only += 1;
        }
    }
    let mut table = Table::new();
    table.set_header(vec![header_cell("Category"), header_cell("Codes")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for (category, count) in &by_category {
        table.add_row(vec![Cell::new(category), Cell::new(count)]);
    }
    table.add_row(vec![
        Cell::new("TOTAL").add_attribute(Attribute::Bold),
        Cell::new(list.len()).add_attribute(Attribute::Bold),
    ]);
    println!("{table}");
    if primary_only > 0 {
        println!("{primary_only} codes flagged primary-only");
    }
}

pub fn print_match_report(report: &MatchReport, excluded: usize) {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Drug class"), header_cell("Products")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    let mut total = 0usize;
    for (class, count) in &report.counts {
        total += count;
        table.add_row(vec![Cell::new(class), Cell::new(count)]);
    }
    table.add_row(vec![
        Cell::new("TOTAL").add_attribute(Attribute::Bold),
        Cell::new(total).add_attribute(Attribute::Bold),
    ]);
    println!("{table}");
    if excluded > 0 {
        println!("{excluded} candidate products held back by the precision filter (review the excluded list)");
    }
}

pub fn print_diff(diff: &CodeListDiff) {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Change"), header_cell("Code")]);
    apply_table_style(&mut table);
    for code in &diff.added {
        table.add_row(vec![Cell::new("added").fg(Color::Green), Cell::new(code)]);
    }
    for code in &diff.missing {
        table.add_row(vec![Cell::new("missing").fg(Color::Red), Cell::new(code)]);
    }
    if diff.added.is_empty() && diff.missing.is_empty() {
        println!("No changes against the previous version.");
    } else {
        println!("{table}");
        println!(
            "{} added, {} missing (missing counts only codes still in the current dictionary)",
            diff.added.len(),
            diff.missing.len()
        );
    }
}

pub fn print_extract_summary(raw: usize, reconciled: usize, patients: usize) {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Stage"), header_cell("Rows")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    table.add_row(vec![Cell::new("code-matched events"), Cell::new(raw)]);
    table.add_row(vec![Cell::new("after date reconciliation"), Cell::new(reconciled)]);
    table.add_row(vec![Cell::new("distinct patients"), Cell::new(patients)]);
    println!("{table}");
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(100);
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}
