// src/ir/eq.rs
//! Explicit equality predicates used by the diff engine (spec §4.2).
//!
//! Identifiers, type tokens, charset/collate, constraint kinds, and
//! referential actions compare case-insensitively; free-form expressions
//! (check expressions, generation expressions) are trimmed before
//! comparison. Every field enumerated in the IR (spec §3) is compared
//! here so that `compute_column_modification` can enumerate exactly
//! which fields differ.

use super::column::{Column, GenerationStorage};
use super::constraint::Constraint;
use super::index::{Index, IndexColumn};

pub fn ci_eq(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

pub fn opt_ci_eq(a: &Option<String>, b: &Option<String>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => ci_eq(a, b),
        _ => false,
    }
}

pub fn trimmed_eq(a: &str, b: &str) -> bool {
    a.trim() == b.trim()
}

pub fn opt_trimmed_eq(a: &Option<String>, b: &Option<String>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => trimmed_eq(a, b),
        (Some(a), None) => a.trim().is_empty(),
        (None, Some(b)) => b.trim().is_empty(),
    }
}

/// Field-by-field column equality. Returns the list of field names that
/// differ (empty means the columns are equal).
pub fn column_diff_fields(old: &Column, new: &Column) -> Vec<&'static str> {
    let mut diffs = Vec::new();
    if !ci_eq(&old.raw_type, &new.raw_type) {
        diffs.push("raw_type");
    }
    if old.normalized_type != new.normalized_type {
        diffs.push("normalized_type");
    }
    if old.nullable != new.nullable {
        diffs.push("nullable");
    }
    if old.primary_key != new.primary_key {
        diffs.push("primary_key");
    }
    if old.auto_increment != new.auto_increment {
        diffs.push("auto_increment");
    }
    if !opt_trimmed_eq(&old.default, &new.default) {
        diffs.push("default");
    }
    if !opt_trimmed_eq(&old.on_update, &new.on_update) {
        diffs.push("on_update");
    }
    if !opt_ci_eq(&old.charset, &new.charset) {
        diffs.push("charset");
    }
    if !opt_ci_eq(&old.collate, &new.collate) {
        diffs.push("collate");
    }
    if old.comment != new.comment {
        diffs.push("comment");
    }
    if old.is_generated != new.is_generated {
        diffs.push("is_generated");
    }
    if !opt_trimmed_eq(&old.generation_expression, &new.generation_expression) {
        diffs.push("generation_expression");
    }
    if old.generation_storage != new.generation_storage {
        diffs.push("generation_storage");
    }
    if old.mysql != new.mysql {
        diffs.push("mysql");
    }
    diffs
}

pub fn columns_equal(old: &Column, new: &Column) -> bool {
    column_diff_fields(old, new).is_empty()
}

fn generation_storage_matches(a: Option<GenerationStorage>, b: Option<GenerationStorage>) -> bool {
    a == b
}

/// Weighted similarity score used by the column-rename heuristic
/// (spec §4.2 step 1). Equal names score 0 to prevent self-matches.
pub fn rename_score(removed: &Column, added: &Column) -> u32 {
    if removed.name_eq(&added.name) {
        return 0;
    }
    let mut score = 0u32;
    if trimmed_eq(&removed.raw_type, &added.raw_type) {
        score += 4;
    }
    if removed.normalized_type == added.normalized_type {
        score += 2;
    }
    if removed.nullable == added.nullable {
        score += 1;
    }
    if removed.auto_increment == added.auto_increment {
        score += 1;
    }
    if removed.primary_key == added.primary_key {
        score += 1;
    }
    if opt_trimmed_eq(&removed.default, &added.default) {
        score += 1;
    }
    if opt_ci_eq(&removed.charset, &added.charset) {
        score += 1;
    }
    if opt_ci_eq(&removed.collate, &added.collate) {
        score += 1;
    }
    if removed.is_generated == added.is_generated {
        score += 1;
    }
    if opt_trimmed_eq(&removed.generation_expression, &added.generation_expression) {
        score += 1;
    }
    if generation_storage_matches(removed.generation_storage, added.generation_storage) {
        score += 1;
    }
    if removed.comment == added.comment {
        score += 1;
    }
    score
}

/// Evidence predicates required alongside the score threshold (spec
/// §4.2 step 2).
pub fn rename_evidence(removed: &Column, added: &Column) -> bool {
    shares_alphanumeric_token(&removed.name, &added.name)
        || (non_empty_and_equal(&removed.comment, &added.comment))
        || (removed.is_generated
            && added.is_generated
            && opt_trimmed_eq(&removed.generation_expression, &added.generation_expression)
            && removed.generation_expression.is_some())
}

fn non_empty_and_equal(a: &Option<String>, b: &Option<String>) -> bool {
    matches!((a, b), (Some(a), Some(b)) if !a.is_empty() && a == b)
}

fn tokenize(name: &str) -> Vec<String> {
    name.to_ascii_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|t| t.len() >= 3)
        .map(|t| t.to_string())
        .collect()
}

fn shares_alphanumeric_token(a: &str, b: &str) -> bool {
    let ta = tokenize(a);
    let tb = tokenize(b);
    ta.iter().any(|t| tb.contains(t))
}

pub fn constraints_equal(old: &Constraint, new: &Constraint) -> bool {
    constraint_diff_fields(old, new).is_empty()
}

pub fn constraint_diff_fields(old: &Constraint, new: &Constraint) -> Vec<&'static str> {
    let mut diffs = Vec::new();
    if old.kind != new.kind {
        diffs.push("kind");
    }
    if !string_vec_ci_eq(&old.columns, &new.columns) {
        diffs.push("columns");
    }
    if !opt_ci_eq(&old.referenced_table, &new.referenced_table) {
        diffs.push("referenced_table");
    }
    if !string_vec_ci_eq(&old.referenced_columns, &new.referenced_columns) {
        diffs.push("referenced_columns");
    }
    if old.on_delete != new.on_delete {
        diffs.push("on_delete");
    }
    if old.on_update != new.on_update {
        diffs.push("on_update");
    }
    if !opt_trimmed_eq(&old.check_expression, &new.check_expression) {
        diffs.push("check_expression");
    }
    if old.enforced != new.enforced {
        diffs.push("enforced");
    }
    diffs
}

fn string_vec_ci_eq(a: &[String], b: &[String]) -> bool {
    a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| ci_eq(x, y))
}

pub fn indexes_equal(old: &Index, new: &Index) -> bool {
    index_diff_fields(old, new).is_empty()
}

pub fn index_diff_fields(old: &Index, new: &Index) -> Vec<&'static str> {
    let mut diffs = Vec::new();
    if old.unique != new.unique {
        diffs.push("unique");
    }
    if old.kind != new.kind {
        diffs.push("kind");
    }
    if !index_columns_eq(&old.columns, &new.columns) {
        diffs.push("columns");
    }
    if old.visibility != new.visibility {
        diffs.push("visibility");
    }
    if old.comment != new.comment {
        diffs.push("comment");
    }
    diffs
}

fn index_columns_eq(a: &[IndexColumn], b: &[IndexColumn]) -> bool {
    a.len() == b.len()
        && a.iter().zip(b.iter()).all(|(x, y)| {
            ci_eq(&x.name, &y.name) && x.prefix_length == y.prefix_length && x.order == y.order
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::column::Column;

    #[test]
    fn rename_score_matches_spec_s5() {
        let mut removed = Column::new("user_name", "VARCHAR(50)");
        removed.nullable = false;
        removed.comment = Some("login".to_string());

        let mut added = Column::new("login_name", "VARCHAR(50)");
        added.nullable = false;
        added.comment = Some("login".to_string());

        let score = rename_score(&removed, &added);
        assert!(score >= 9, "score {score} should clear the rename threshold");
        assert!(rename_evidence(&removed, &added));
    }

    #[test]
    fn equal_names_score_zero() {
        let col = Column::new("id", "INT");
        assert_eq!(rename_score(&col, &col.clone()), 0);
    }
}
