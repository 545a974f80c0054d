// src/planner/mod.rs
//! Migration planner (spec §4.6, component C6).
//!
//! `plan_migration` is deterministic and total: it never returns an
//! error. Anything it cannot safely resolve becomes an `Unresolved`
//! operation in the output `Migration` rather than a failure.

use std::collections::HashSet;
use std::hash::Hasher;

use fnv::FnvHasher;
use serde::Serialize;

use crate::dialect::{Generator, MigrationOptions};
use crate::diff::{ColumnModification, SchemaDiff, TableDiff};
use crate::ir::{Column, Constraint, ConstraintKind};
use crate::risk::{self, Severity};

/// One step of a planned migration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Operation {
    Sql {
        forward_sql: String,
        rollback_sql: Option<String>,
        risk: Option<&'static str>,
    },
    Note(String),
    Breaking(String),
    Unresolved(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Migration {
    pub operations: Vec<Operation>,
}

impl Migration {
    pub fn is_empty(&self) -> bool {
        !self.operations.iter().any(|op| matches!(op, Operation::Sql { forward_sql, .. } if !forward_sql.trim().is_empty()))
    }

    /// Forward migration file (spec §6 bit-exact contract).
    pub fn render_forward(&self) -> String {
        let mut out = String::new();
        out.push_str("-- smf migration\n-- Review before running in production.\n\n");

        render_message_section(&mut out, "BREAKING CHANGES (manual review required)", self.messages(|op| {
            matches!(op, Operation::Breaking(_))
        }));
        render_message_section(&mut out, "UNRESOLVED (cannot auto-generate safely)", self.messages(|op| {
            matches!(op, Operation::Unresolved(_))
        }));
        render_message_section(&mut out, "NOTES", self.messages(|op| matches!(op, Operation::Note(_))));

        out.push_str("-- SQL\n");
        let sql_lines: Vec<&str> = self
            .operations
            .iter()
            .filter_map(|op| match op {
                Operation::Sql { forward_sql, .. } if !forward_sql.trim().is_empty() => Some(forward_sql.as_str()),
                _ => None,
            })
            .collect();
        if sql_lines.is_empty() {
            out.push_str("-- No SQL statements generated.\n");
        } else {
            for stmt in sql_lines {
                out.push_str(&ensure_semicolon(stmt));
                out.push('\n');
            }
        }
        out.push('\n');

        let rollback_lines: Vec<&str> = self
            .operations
            .iter()
            .rev()
            .filter_map(|op| match op {
                Operation::Sql { rollback_sql: Some(r), .. } if !r.trim().is_empty() => Some(r.as_str()),
                _ => None,
            })
            .collect();
        if !rollback_lines.is_empty() {
            out.push_str("-- ROLLBACK SQL (run separately)\n");
            for stmt in rollback_lines {
                out.push_str(&format!("-- {}\n", ensure_semicolon(stmt)));
            }
        }

        out
    }

    /// Rollback migration file (spec §6 bit-exact contract).
    pub fn render_rollback(&self) -> String {
        let mut out = String::new();
        out.push_str("-- smf rollback\n-- Run to revert the migration (review carefully).\n\n-- SQL\n");

        let rollback_lines: Vec<&str> = self
            .operations
            .iter()
            .rev()
            .filter_map(|op| match op {
                Operation::Sql { rollback_sql: Some(r), .. } if !r.trim().is_empty() => Some(r.as_str()),
                _ => None,
            })
            .collect();

        if rollback_lines.is_empty() {
            out.push_str("-- No SQL statements generated.\n");
        } else {
            for stmt in rollback_lines {
                out.push_str(&ensure_semicolon(stmt));
                out.push('\n');
            }
        }
        out
    }

    fn messages<'a>(&'a self, matcher: impl Fn(&Operation) -> bool + 'a) -> Vec<&'a str> {
        self.operations
            .iter()
            .filter(|op| matcher(op))
            .map(|op| match op {
                Operation::Note(m) | Operation::Breaking(m) | Operation::Unresolved(m) => m.as_str(),
                Operation::Sql { .. } => unreachable!(),
            })
            .collect()
    }
}

fn render_message_section(out: &mut String, header: &str, messages: Vec<&str>) {
    if messages.is_empty() {
        return;
    }
    out.push_str(&format!("-- {header}\n"));
    for message in messages {
        for line in message.replace("\r\n", "\n").split('\n') {
            if !line.trim().is_empty() {
                out.push_str(&format!("-- - {line}\n"));
            }
        }
    }
    out.push('\n');
}

fn ensure_semicolon(stmt: &str) -> String {
    let trimmed = stmt.trim_end();
    if trimmed.ends_with(';') { trimmed.to_string() } else { format!("{trimmed};") }
}

/// `safe_backup_name(base) = trim(base) + "__smf_backup_" + hex(fnv1a_64(trim(base)))`,
/// truncated so the total never exceeds 64 bytes (spec §4.6).
pub fn safe_backup_name(base: &str) -> String {
    let trimmed = base.trim();
    let mut hasher = FnvHasher::default();
    hasher.write(trimmed.as_bytes());
    let suffix = format!("__smf_backup_{:016x}", hasher.finish());

    let full_len = trimmed.len() + suffix.len();
    if full_len <= 64 {
        return format!("{trimmed}{suffix}");
    }
    let max_base_len = 64usize.saturating_sub(suffix.len());
    let truncated = truncate_at_char_boundary(trimmed, max_base_len);
    format!("{truncated}{suffix}")
}

fn truncate_at_char_boundary(s: &str, max_len: usize) -> &str {
    if s.len() <= max_len {
        return s;
    }
    let mut end = max_len;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

fn renamed_column(column: &Column, new_name: &str) -> Column {
    let mut renamed = column.clone();
    renamed.name = new_name.to_string();
    renamed
}

struct Pending {
    ops: Vec<Operation>,
    deferred_fk: Vec<(String, Option<String>)>,
}

/// Assemble a full `Migration` from a `SchemaDiff`, options, and a
/// dialect generator (spec §4.6).
pub fn plan_migration(diff: &SchemaDiff, options: &MigrationOptions, generator: &dyn Generator) -> Migration {
    let mut ops = Vec::new();

    // Phase 1: risk analysis.
    let breaking_changes = risk::analyze(diff);
    for change in &breaking_changes {
        let formatted = format!("[{}] {}.{}: {}", change.severity.as_str(), change.table, change.object, change.description);
        match change.severity {
            Severity::Breaking | Severity::Critical => ops.push(Operation::Breaking(formatted)),
            Severity::Warning => ops.push(Operation::Note(formatted)),
            Severity::Info => {}
        }
    }

    // Phase 2: recommendations.
    append_recommendations(diff, &mut ops);

    // Phase 3: safe-mode note.
    if !options.include_unsafe {
        ops.push(Operation::Note(
            "safe mode is on: destructive drops are rewritten as renames to `<base>__smf_backup_<hash>` instead of being applied"
                .to_string(),
        ));
    }

    let mut pending = Pending { ops, deferred_fk: Vec::new() };

    // Phase 4: added tables.
    for table in &diff.tables_added {
        let (create_stmt, _fk_preview) = generator.create_table(table);
        pending.ops.push(Operation::Sql {
            forward_sql: create_stmt,
            rollback_sql: Some(generator.drop_table(table)),
            risk: None,
        });
        for index in &table.indexes {
            pending.ops.push(Operation::Sql {
                forward_sql: generator.add_index(&table.name, index),
                rollback_sql: generator.drop_index(&table.name, index),
                risk: None,
            });
        }
        for constraint in table.constraints.iter().filter(|c| c.kind == ConstraintKind::ForeignKey) {
            push_fk(&mut pending, generator, &table.name, constraint);
        }
    }

    // Phase 5: modified tables, in the diff's deterministic order.
    for table_diff in &diff.tables_modified {
        plan_table(table_diff, options, generator, &mut pending);
    }

    // Phase 6: deferred FK batch.
    if !pending.deferred_fk.is_empty() {
        pending.ops.push(Operation::Note(
            "foreign keys added after table creation to avoid dependency issues".to_string(),
        ));
        let deferred: Vec<(String, Option<String>)> = pending.deferred_fk.drain(..).collect();
        for (forward, rollback) in deferred {
            pending.ops.push(Operation::Sql { forward_sql: forward, rollback_sql: rollback, risk: None });
        }
    }

    // Phase 7: removed tables.
    for table in &diff.tables_removed {
        if options.include_unsafe {
            pending.ops.push(Operation::Sql {
                forward_sql: generator.drop_table(table),
                rollback_sql: Some(format!("-- cannot auto-restore dropped table `{}`", table.name)),
                risk: None,
            });
        } else {
            let backup = safe_backup_name(&table.name);
            pending.ops.push(Operation::Sql {
                forward_sql: generator.rename_table(&table.name, &backup),
                rollback_sql: Some(generator.rename_table(&backup, &table.name)),
                risk: None,
            });
        }
    }

    // Phase 8: lock-time note.
    let needs_lock_note = pending.ops.iter().any(|op| match op {
        Operation::Sql { forward_sql, .. } => {
            let s = forward_sql.trim_start();
            s.starts_with("ALTER TABLE") || s.starts_with("CREATE INDEX") || s.starts_with("DROP INDEX")
        }
        _ => false,
    });
    if needs_lock_note {
        pending.ops.push(Operation::Note(
            "some statements may take table locks; consider an online-DDL tool for large tables".to_string(),
        ));
    }

    // Phase 9: dedupe.
    Migration { operations: dedupe(pending.ops) }
}

fn push_fk(pending: &mut Pending, generator: &dyn Generator, table: &str, constraint: &Constraint) {
    let forward = generator.add_constraint(table, constraint);
    let rollback = generator.drop_constraint(table, constraint);
    if rollback.is_none() {
        pending.ops.push(Operation::Unresolved(format!(
            "cannot automatically roll back unnamed foreign key on {table}; drop it manually if reverting"
        )));
    }
    pending.deferred_fk.push((forward, rollback));
}

fn plan_table(table_diff: &TableDiff, options: &MigrationOptions, generator: &dyn Generator, pending: &mut Pending) {
    let table = &table_diff.name;

    // 5.1 Drop modified and removed constraints (FK re-creations deferred).
    for constraint in &table_diff.constraints.removed {
        drop_constraint_op(pending, generator, table, constraint, constraint);
    }
    for change in &table_diff.constraints.changed {
        drop_constraint_op(pending, generator, table, &change.old, &change.old);
    }

    // 5.2 Drop modified and removed indexes.
    for index in &table_diff.indexes.removed {
        pending.ops.push(Operation::Sql {
            forward_sql: generator.drop_index(table, index).unwrap_or_default(),
            rollback_sql: Some(generator.add_index(table, index)),
            risk: None,
        });
    }
    for change in &table_diff.indexes.changed {
        pending.ops.push(Operation::Sql {
            forward_sql: generator.drop_index(table, &change.old).unwrap_or_default(),
            rollback_sql: Some(generator.add_index(table, &change.old)),
            risk: None,
        });
    }

    // 5.3 Renames before any add/modify/drop touches the same columns.
    for rename in &table_diff.columns.renamed {
        pending.ops.push(Operation::Sql {
            forward_sql: generator.change_column(table, &rename.old.name, &rename.new),
            rollback_sql: Some(generator.change_column(table, &rename.new.name, &rename.old)),
            risk: None,
        });
    }

    // 5.4 Add, then modify, then (safe-mode-aware) drop columns.
    for added in &table_diff.columns.added {
        pending.ops.push(Operation::Sql {
            forward_sql: generator.add_column(table, added),
            rollback_sql: Some(generator.drop_column(table, &added.name)),
            risk: None,
        });
    }
    for modification in &table_diff.columns.modified {
        plan_column_modification(table, modification, generator, pending);
    }
    for removed in &table_diff.columns.removed {
        if options.include_unsafe {
            pending.ops.push(Operation::Sql {
                forward_sql: generator.drop_column(table, &removed.name),
                rollback_sql: Some(generator.add_column(table, removed)),
                risk: None,
            });
        } else {
            let backup = safe_backup_name(&removed.name);
            let backup_column = renamed_column(removed, &backup);
            pending.ops.push(Operation::Sql {
                forward_sql: generator.change_column(table, &removed.name, &backup_column),
                rollback_sql: Some(generator.change_column(table, &backup, removed)),
                risk: None,
            });
        }
    }

    // 5.5 Table option changes.
    if !table_diff.option_changes.is_empty() {
        let forward = generator.table_option_statement(table, &table_diff.option_changes, true);
        let rollback = generator.table_option_statement(table, &table_diff.option_changes, false);
        if let Some(forward) = forward {
            pending.ops.push(Operation::Sql { forward_sql: forward, rollback_sql: rollback, risk: None });
        }
    }

    // 5.6 Create modified and added indexes.
    for index in &table_diff.indexes.added {
        pending.ops.push(Operation::Sql {
            forward_sql: generator.add_index(table, index),
            rollback_sql: generator.drop_index(table, index),
            risk: None,
        });
    }
    for change in &table_diff.indexes.changed {
        pending.ops.push(Operation::Sql {
            forward_sql: generator.add_index(table, &change.new),
            rollback_sql: generator.drop_index(table, &change.new),
            risk: None,
        });
    }

    // 5.7 Add modified and added non-FK constraints; FK adds deferred.
    for constraint in &table_diff.constraints.added {
        if constraint.kind == ConstraintKind::ForeignKey {
            push_fk(pending, generator, table, constraint);
        } else {
            add_constraint_op(pending, generator, table, constraint);
        }
    }
    for change in &table_diff.constraints.changed {
        if change.new.kind == ConstraintKind::ForeignKey {
            push_fk(pending, generator, table, &change.new);
        } else {
            add_constraint_op(pending, generator, table, &change.new);
        }
    }
}

fn drop_constraint_op(
    pending: &mut Pending,
    generator: &dyn Generator,
    table: &str,
    lookup: &Constraint,
    rollback_target: &Constraint,
) {
    match generator.drop_constraint(table, lookup) {
        Some(forward) => {
            pending.ops.push(Operation::Sql {
                forward_sql: forward,
                rollback_sql: Some(generator.add_constraint(table, rollback_target)),
                risk: None,
            });
        }
        None => {
            pending.ops.push(Operation::Unresolved(format!(
                "cannot automatically drop unnamed {} constraint on {table}",
                lookup.kind.as_str()
            )));
        }
    }
}

fn add_constraint_op(pending: &mut Pending, generator: &dyn Generator, table: &str, constraint: &Constraint) {
    let forward = generator.add_constraint(table, constraint);
    let rollback = generator.drop_constraint(table, constraint);
    if rollback.is_none() {
        pending.ops.push(Operation::Unresolved(format!(
            "cannot automatically roll back unnamed {} constraint on {table}",
            constraint.kind.as_str()
        )));
    }
    pending.ops.push(Operation::Sql { forward_sql: forward, rollback_sql: rollback, risk: None });
}

fn plan_column_modification(
    table: &str,
    modification: &ColumnModification,
    generator: &dyn Generator,
    pending: &mut Pending,
) {
    pending.ops.push(Operation::Sql {
        forward_sql: generator.modify_column(table, &modification.new),
        rollback_sql: Some(generator.modify_column(table, &modification.old)),
        risk: None,
    });
}

fn append_recommendations(diff: &SchemaDiff, ops: &mut Vec<Operation>) {
    let mut took_backup_note = false;

    for table in &diff.tables_removed {
        if !took_backup_note {
            ops.push(Operation::Note("take a backup before applying this migration".to_string()));
            took_backup_note = true;
        }
        let _ = table;
    }

    for table_diff in &diff.tables_modified {
        for rename in &table_diff.columns.renamed {
            ops.push(Operation::Note(format!(
                "column rename {} -> {} on {} is handled as CHANGE COLUMN; verify application queries reference the new name",
                rename.old.name, rename.new.name, table_diff.name
            )));
        }

        if !table_diff.columns.removed.is_empty() && !took_backup_note {
            ops.push(Operation::Note("take a backup before applying this migration".to_string()));
            took_backup_note = true;
        }

        for added in &table_diff.columns.added {
            if !added.nullable && added.default.is_none() && !added.is_generated {
                ops.push(Operation::Note(format!(
                    "adding NOT NULL column {}.{} without a default: add it nullable, backfill, then alter to NOT NULL in three separate migrations",
                    table_diff.name, added.name
                )));
            }
        }

        for modification in &table_diff.columns.modified {
            if modification.changed_fields.contains(&"nullable")
                && modification.old.nullable
                && !modification.new.nullable
            {
                ops.push(Operation::Note(format!(
                    "{}.{} becomes NOT NULL: backfill existing NULL values before applying",
                    table_diff.name, modification.new.name
                )));
            }
            if modification.changed_fields.contains(&"raw_type") {
                let (old_base, old_len) = crate::ir::column::parse_type_parts(&modification.old.raw_type);
                let (new_base, new_len) = crate::ir::column::parse_type_parts(&modification.new.raw_type);
                let length_shrink = old_base == new_base
                    && matches!((old_len, new_len), (Some(ol), Some(nl)) if nl < ol);
                if length_shrink {
                    ops.push(Operation::Note(format!(
                        "{}.{}: check that existing values fit within the new length before applying",
                        table_diff.name, modification.new.name
                    )));
                } else {
                    ops.push(Operation::Note(format!(
                        "{}.{}: validate that existing values can be cast to the new type before applying",
                        table_diff.name, modification.new.name
                    )));
                }
            }
        }
    }
}

fn dedupe(ops: Vec<Operation>) -> Vec<Operation> {
    let mut seen_messages: HashSet<(u8, String)> = HashSet::new();
    let mut seen_rollbacks: HashSet<String> = HashSet::new();
    let mut out = Vec::with_capacity(ops.len());

    for mut op in ops {
        let keep = match &op {
            Operation::Note(m) => seen_messages.insert((0, m.clone())),
            Operation::Breaking(m) => seen_messages.insert((1, m.clone())),
            Operation::Unresolved(m) => seen_messages.insert((2, m.clone())),
            Operation::Sql { .. } => true,
        };
        if !keep {
            continue;
        }
        if let Operation::Sql { rollback_sql: Some(r), .. } = &mut op {
            if !r.is_empty() && !seen_rollbacks.insert(r.clone()) {
                if let Operation::Sql { rollback_sql, .. } = &mut op {
                    *rollback_sql = None;
                }
            }
        }
        out.push(op);
    }
    out
}
