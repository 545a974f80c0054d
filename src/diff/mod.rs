// src/diff/mod.rs
//! Structural schema diff engine (spec §4.2, component C3).
//!
//! `diff()` is a total function: given two validated `Database`
//! values it always produces a `SchemaDiff`, never an error. Matching
//! is case-insensitive by name wherever the IR itself is
//! case-insensitive (spec §3), and every list in the result is sorted
//! into a deterministic order so that two diffs of equal schemas
//! compare equal regardless of declaration order (spec §8 property 1).

use serde::Serialize;

use crate::ir::{Column, Constraint, Database, Index, Table, Timestamps, eq};

/// Everything that differs between an old and a new `Database`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct SchemaDiff {
    pub tables_added: Vec<Table>,
    pub tables_removed: Vec<Table>,
    pub tables_modified: Vec<TableDiff>,
}

impl SchemaDiff {
    pub fn is_empty(&self) -> bool {
        self.tables_added.is_empty()
            && self.tables_removed.is_empty()
            && self.tables_modified.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableDiff {
    pub name: String,
    pub columns: ColumnDiffList,
    pub constraints: ConstraintDiffList,
    pub indexes: IndexDiffList,
    pub option_changes: Vec<TableOptionChange>,
    pub comment_change: Option<(Option<String>, Option<String>)>,
    pub timestamps_change: Option<(Option<Timestamps>, Option<Timestamps>)>,
}

impl TableDiff {
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
            && self.constraints.is_empty()
            && self.indexes.is_empty()
            && self.option_changes.is_empty()
            && self.comment_change.is_none()
            && self.timestamps_change.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ColumnDiffList {
    pub added: Vec<Column>,
    pub removed: Vec<Column>,
    pub renamed: Vec<ColumnRename>,
    pub modified: Vec<ColumnModification>,
}

impl ColumnDiffList {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty()
            && self.removed.is_empty()
            && self.renamed.is_empty()
            && self.modified.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnRename {
    pub old: Column,
    pub new: Column,
    pub score: u32,
    /// Non-rename field changes carried along with the rename itself.
    pub changed_fields: Vec<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnModification {
    pub old: Column,
    pub new: Column,
    pub changed_fields: Vec<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ConstraintDiffList {
    pub added: Vec<Constraint>,
    pub removed: Vec<Constraint>,
    pub changed: Vec<ConstraintChange>,
}

impl ConstraintDiffList {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConstraintChange {
    pub old: Constraint,
    pub new: Constraint,
    pub changed_fields: Vec<&'static str>,
    /// Set when the constraint itself is unchanged but must be dropped
    /// and recreated because a column it depends on was modified.
    pub rebuild_only: bool,
    pub rebuild_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct IndexDiffList {
    pub added: Vec<Index>,
    pub removed: Vec<Index>,
    pub changed: Vec<IndexChange>,
}

impl IndexDiffList {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexChange {
    pub old: Index,
    pub new: Index,
    pub changed_fields: Vec<&'static str>,
    pub rebuild_only: bool,
    pub rebuild_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableOptionChange {
    pub key: String,
    pub old: Option<String>,
    pub new: Option<String>,
}

/// Minimum weighted score (spec §4.2 step 1) before a removed/added
/// column pair is even considered a rename candidate.
const RENAME_SCORE_THRESHOLD: u32 = 9;

/// Compute the structural diff between two schemas.
pub fn diff(old: &Database, new: &Database) -> SchemaDiff {
    let mut tables_added = Vec::new();
    let mut tables_removed = Vec::new();
    let mut tables_modified = Vec::new();

    for new_table in &new.tables {
        match old.find_table(&new_table.name) {
            None => tables_added.push(new_table.clone()),
            Some(old_table) => {
                let table_diff = diff_table(old_table, new_table);
                if !table_diff.is_empty() {
                    tables_modified.push(table_diff);
                }
            }
        }
    }
    for old_table in &old.tables {
        if new.find_table(&old_table.name).is_none() {
            tables_removed.push(old_table.clone());
        }
    }

    tables_added.sort_by(|a, b| a.name.to_ascii_lowercase().cmp(&b.name.to_ascii_lowercase()));
    tables_removed.sort_by(|a, b| a.name.to_ascii_lowercase().cmp(&b.name.to_ascii_lowercase()));
    tables_modified.sort_by(|a, b| a.name.to_ascii_lowercase().cmp(&b.name.to_ascii_lowercase()));

    SchemaDiff {
        tables_added,
        tables_removed,
        tables_modified,
    }
}

fn diff_table(old: &Table, new: &Table) -> TableDiff {
    let columns = diff_columns(old, new);
    let constraints = diff_constraints(old, new, &columns);
    let indexes = diff_indexes(old, new, &columns);
    let option_changes = diff_options(old, new);

    let comment_change = if old.comment != new.comment {
        Some((old.comment.clone(), new.comment.clone()))
    } else {
        None
    };

    let timestamps_change = if old.timestamps != new.timestamps {
        Some((old.timestamps.clone(), new.timestamps.clone()))
    } else {
        None
    };

    TableDiff {
        name: new.name.clone(),
        columns,
        constraints,
        indexes,
        option_changes,
        comment_change,
        timestamps_change,
    }
}

fn diff_columns(old: &Table, new: &Table) -> ColumnDiffList {
    let mut removed: Vec<Column> = Vec::new();
    let mut modified = Vec::new();

    for old_col in &old.columns {
        match new.find_column(&old_col.name) {
            Some(new_col) => {
                let fields = eq::column_diff_fields(old_col, new_col);
                if !fields.is_empty() {
                    modified.push(ColumnModification {
                        old: old_col.clone(),
                        new: new_col.clone(),
                        changed_fields: fields,
                    });
                }
            }
            None => removed.push(old_col.clone()),
        }
    }

    let mut added: Vec<Column> = new
        .columns
        .iter()
        .filter(|c| old.find_column(&c.name).is_none())
        .cloned()
        .collect();

    // Rename detection (spec §4.2 steps 1-2): greedily pair the
    // highest-scoring (removed, added) candidate above the threshold
    // that also carries rename evidence, until no candidates remain.
    let mut renamed = Vec::new();
    loop {
        let mut best: Option<(usize, usize, u32)> = None;
        for (ri, r) in removed.iter().enumerate() {
            for (ai, a) in added.iter().enumerate() {
                let score = eq::rename_score(r, a);
                if score < RENAME_SCORE_THRESHOLD {
                    continue;
                }
                if !eq::rename_evidence(r, a) {
                    continue;
                }
                if best.is_none_or(|(_, _, best_score)| score > best_score) {
                    best = Some((ri, ai, score));
                }
            }
        }
        let Some((ri, ai, score)) = best else { break };
        let old_col = removed.remove(ri);
        let new_col = added.remove(ai);
        let changed_fields = eq::column_diff_fields(&old_col, &new_col);
        renamed.push(ColumnRename {
            old: old_col,
            new: new_col,
            score,
            changed_fields,
        });
    }

    removed.sort_by(|a, b| a.name.to_ascii_lowercase().cmp(&b.name.to_ascii_lowercase()));
    added.sort_by(|a, b| a.name.to_ascii_lowercase().cmp(&b.name.to_ascii_lowercase()));
    modified.sort_by(|a, b| a.old.name.to_ascii_lowercase().cmp(&b.old.name.to_ascii_lowercase()));
    renamed.sort_by(|a, b| a.old.name.to_ascii_lowercase().cmp(&b.old.name.to_ascii_lowercase()));

    ColumnDiffList {
        added,
        removed,
        renamed,
        modified,
    }
}

/// A column name, as it would read in the new schema (post-rename),
/// that was structurally modified — used to flag dependent
/// constraints/indexes for rebuild.
fn modified_column_names(columns: &ColumnDiffList) -> Vec<String> {
    let mut names: Vec<String> = columns
        .modified
        .iter()
        .map(|m| m.new.name.to_ascii_lowercase())
        .chain(columns.renamed.iter().map(|r| r.new.name.to_ascii_lowercase()))
        .chain(columns.removed.iter().map(|c| c.name.to_ascii_lowercase()))
        .collect();
    names.sort();
    names.dedup();
    names
}

fn diff_constraints(old: &Table, new: &Table, columns: &ColumnDiffList) -> ConstraintDiffList {
    let dependents = modified_column_names(columns);
    let mut removed = Vec::new();
    let mut changed = Vec::new();

    let find_by_key = |key: &str, list: &[Constraint]| list.iter().find(|c| c.match_key() == key);

    for old_c in &old.constraints {
        let key = old_c.match_key();
        match find_by_key(&key, &new.constraints) {
            Some(new_c) => {
                let fields = eq::constraint_diff_fields(old_c, new_c);
                let touches_modified = new_c
                    .columns
                    .iter()
                    .any(|c| dependents.contains(&c.to_ascii_lowercase()));
                if !fields.is_empty() {
                    changed.push(ConstraintChange {
                        old: old_c.clone(),
                        new: new_c.clone(),
                        changed_fields: fields,
                        rebuild_only: false,
                        rebuild_reason: None,
                    });
                } else if touches_modified {
                    changed.push(ConstraintChange {
                        old: old_c.clone(),
                        new: new_c.clone(),
                        changed_fields: Vec::new(),
                        rebuild_only: true,
                        rebuild_reason: Some(
                            "depends on a column that was modified".to_string(),
                        ),
                    });
                }
            }
            None => removed.push(old_c.clone()),
        }
    }

    let mut added: Vec<Constraint> = new
        .constraints
        .iter()
        .filter(|c| find_by_key(&c.match_key(), &old.constraints).is_none())
        .cloned()
        .collect();

    removed.sort_by(|a, b| a.match_key().cmp(&b.match_key()));
    added.sort_by(|a, b| a.match_key().cmp(&b.match_key()));
    changed.sort_by(|a, b| a.new.match_key().cmp(&b.new.match_key()));

    ConstraintDiffList {
        added,
        removed,
        changed,
    }
}

fn diff_indexes(old: &Table, new: &Table, columns: &ColumnDiffList) -> IndexDiffList {
    let dependents = modified_column_names(columns);
    let mut removed = Vec::new();
    let mut changed = Vec::new();

    let find_by_key = |key: &str, list: &[Index]| list.iter().find(|i| i.match_key() == key);

    for old_i in &old.indexes {
        let key = old_i.match_key();
        match find_by_key(&key, &new.indexes) {
            Some(new_i) => {
                let fields = eq::index_diff_fields(old_i, new_i);
                let touches_modified = new_i
                    .columns
                    .iter()
                    .any(|c| dependents.contains(&c.name.to_ascii_lowercase()));
                if !fields.is_empty() {
                    changed.push(IndexChange {
                        old: old_i.clone(),
                        new: new_i.clone(),
                        changed_fields: fields,
                        rebuild_only: false,
                        rebuild_reason: None,
                    });
                } else if touches_modified {
                    changed.push(IndexChange {
                        old: old_i.clone(),
                        new: new_i.clone(),
                        changed_fields: Vec::new(),
                        rebuild_only: true,
                        rebuild_reason: Some(
                            "depends on a column that was modified".to_string(),
                        ),
                    });
                }
            }
            None => removed.push(old_i.clone()),
        }
    }

    let mut added: Vec<Index> = new
        .indexes
        .iter()
        .filter(|i| find_by_key(&i.match_key(), &old.indexes).is_none())
        .cloned()
        .collect();

    removed.sort_by(|a, b| a.match_key().cmp(&b.match_key()));
    added.sort_by(|a, b| a.match_key().cmp(&b.match_key()));
    changed.sort_by(|a, b| a.new.match_key().cmp(&b.new.match_key()));

    IndexDiffList {
        added,
        removed,
        changed,
    }
}

fn diff_options(old: &Table, new: &Table) -> Vec<TableOptionChange> {
    let old_flat = old.options.flatten();
    let new_flat = new.options.flatten();

    let mut keys: Vec<&String> = old_flat.keys().chain(new_flat.keys()).collect();
    keys.sort();
    keys.dedup();

    let mut changes = Vec::new();
    for key in keys {
        let old_v = old_flat.get(key).cloned();
        let new_v = new_flat.get(key).cloned();
        if old_v != new_v {
            changes.push(TableOptionChange {
                key: key.clone(),
                old: old_v,
                new: new_v,
            });
        }
    }
    changes
}
