// src/risk.rs
//! Breaking-change risk analyzer (spec §4.4, component C4).
//!
//! A pure pass over a `SchemaDiff` that never gates planning — it only
//! annotates. The planner decides what to do; this module only says
//! how risky each element is.

use serde::Serialize;

use crate::diff::{ColumnModification, SchemaDiff, TableDiff};
use crate::ir::column::parse_type_parts;
use crate::ir::ConstraintKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Severity {
    Info,
    Warning,
    Breaking,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Breaking => "BREAKING",
            Self::Critical => "CRITICAL",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ObjectType {
    Table,
    Column,
    Constraint,
    Index,
    Option,
}

impl ObjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Table => "table",
            Self::Column => "column",
            Self::Constraint => "constraint",
            Self::Index => "index",
            Self::Option => "option",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BreakingChange {
    pub severity: Severity,
    pub description: String,
    pub table: String,
    pub object: String,
    pub object_type: ObjectType,
}

impl BreakingChange {
    fn new(
        severity: Severity,
        description: impl Into<String>,
        table: impl Into<String>,
        object: impl Into<String>,
        object_type: ObjectType,
    ) -> Self {
        Self {
            severity,
            description: description.into(),
            table: table.into(),
            object: object.into(),
            object_type,
        }
    }
}

const LENGTH_SENSITIVE: &[&str] = &["varchar", "char", "varbinary", "binary"];

/// Type widening chains, from narrowest to widest. A change from one
/// member to a later member in the same chain is widening; the
/// reverse is narrowing.
const WIDENING_CHAINS: &[&[&str]] = &[
    &["tinyint", "smallint", "mediumint", "int", "integer", "bigint"],
    &["float", "double", "decimal"],
    &["varchar", "text", "mediumtext", "longtext"],
];

/// Pairs that are never compatible regardless of chain position.
/// Checked in the direction listed; the reverse direction is also
/// treated as incompatible.
const INCOMPATIBLE_PAIRS: &[(&str, &str)] = &[
    ("int", "varchar"),
    ("bigint", "varchar"),
    ("datetime", "int"),
    ("timestamp", "int"),
    ("blob", "text"),
    ("json", "varchar"),
];

enum TypeClass {
    LengthOnly,
    Widening,
    Narrowing,
    Incompatible,
    Unrelated,
}

fn chain_position(base: &str) -> Option<(usize, usize)> {
    for (chain_idx, chain) in WIDENING_CHAINS.iter().enumerate() {
        if let Some(pos) = chain.iter().position(|t| *t == base) {
            return Some((chain_idx, pos));
        }
    }
    None
}

fn is_incompatible_pair(a: &str, b: &str) -> bool {
    INCOMPATIBLE_PAIRS
        .iter()
        .any(|(x, y)| (*x == a && *y == b) || (*x == b && *y == a))
}

fn classify_type_change(old_raw: &str, new_raw: &str) -> TypeClass {
    let (old_base, _) = parse_type_parts(old_raw);
    let (new_base, _) = parse_type_parts(new_raw);

    if old_base == new_base && LENGTH_SENSITIVE.contains(&old_base.as_str()) {
        return TypeClass::LengthOnly;
    }

    if is_incompatible_pair(&old_base, &new_base) {
        return TypeClass::Incompatible;
    }

    match (chain_position(&old_base), chain_position(&new_base)) {
        (Some((oc, op)), Some((nc, np))) if oc == nc => {
            if np > op {
                TypeClass::Widening
            } else if np < op {
                TypeClass::Narrowing
            } else {
                TypeClass::LengthOnly
            }
        }
        _ => TypeClass::Unrelated,
    }
}

fn analyze_type_change(table: &str, column: &str, old_raw: &str, new_raw: &str) -> Option<BreakingChange> {
    let (old_base, old_len) = parse_type_parts(old_raw);
    let (new_base, new_len) = parse_type_parts(new_raw);

    match classify_type_change(old_raw, new_raw) {
        TypeClass::LengthOnly => match (old_len, new_len) {
            (Some(ol), Some(nl)) if nl < ol => Some(BreakingChange::new(
                Severity::Breaking,
                format!("length shrinks from {old_base}({ol}) to {new_base}({nl}), may truncate data"),
                table,
                column,
                ObjectType::Column,
            )),
            (Some(ol), Some(nl)) if nl > ol => Some(BreakingChange::new(
                Severity::Info,
                format!("length increases from {old_base}({ol}) to {new_base}({nl})"),
                table,
                column,
                ObjectType::Column,
            )),
            (None, Some(_)) => Some(BreakingChange::new(
                Severity::Info,
                format!("length specified on {new_base} where none was set before"),
                table,
                column,
                ObjectType::Column,
            )),
            _ => None,
        },
        TypeClass::Widening => Some(BreakingChange::new(
            Severity::Info,
            format!("type widens from {old_base} to {new_base}"),
            table,
            column,
            ObjectType::Column,
        )),
        TypeClass::Narrowing => Some(BreakingChange::new(
            Severity::Critical,
            format!("type narrows from {old_base} to {new_base}, data may not fit"),
            table,
            column,
            ObjectType::Column,
        )),
        TypeClass::Incompatible => Some(BreakingChange::new(
            Severity::Critical,
            format!("type change from {old_base} to {new_base} is not generally convertible"),
            table,
            column,
            ObjectType::Column,
        )),
        TypeClass::Unrelated => Some(BreakingChange::new(
            Severity::Breaking,
            format!("type changes from {old_base} to {new_base}"),
            table,
            column,
            ObjectType::Column,
        )),
    }
}

/// Run the risk analyzer over a `SchemaDiff`, in the diff's own
/// (already-sorted) traversal order.
pub fn analyze(diff: &SchemaDiff) -> Vec<BreakingChange> {
    let mut out = Vec::new();

    for table in &diff.tables_removed {
        out.push(BreakingChange::new(
            Severity::Critical,
            "table will be dropped - all data will be lost",
            &table.name,
            &table.name,
            ObjectType::Table,
        ));
    }

    for table_diff in &diff.tables_modified {
        analyze_table(table_diff, &mut out);
    }

    out
}

fn analyze_table(table_diff: &TableDiff, out: &mut Vec<BreakingChange>) {
    let table = &table_diff.name;

    for rename in &table_diff.columns.renamed {
        out.push(BreakingChange::new(
            Severity::Breaking,
            format!(
                "column rename {} -> {} handled as CHANGE COLUMN",
                rename.old.name, rename.new.name
            ),
            table,
            &rename.new.name,
            ObjectType::Column,
        ));
    }

    for removed in &table_diff.columns.removed {
        out.push(BreakingChange::new(
            Severity::Critical,
            "column will be dropped - all data in it will be lost",
            table,
            &removed.name,
            ObjectType::Column,
        ));
    }

    for added in &table_diff.columns.added {
        if !added.nullable && added.default.is_none() && !added.is_generated {
            out.push(BreakingChange::new(
                Severity::Breaking,
                "adding NOT NULL column without a default will fail against existing rows",
                table,
                &added.name,
                ObjectType::Column,
            ));
        }
    }

    for modification in &table_diff.columns.modified {
        analyze_column_modification(table, modification, out);
    }

    for constraint in &table_diff.constraints.added {
        out.push(BreakingChange::new(
            Severity::Breaking,
            format!(
                "adding {} constraint may be violated by existing data",
                constraint.kind.as_str()
            ),
            table,
            constraint.name.clone().unwrap_or_else(|| constraint.match_key()),
            ObjectType::Constraint,
        ));
    }

    for constraint in &table_diff.constraints.removed {
        let severity = match constraint.kind {
            ConstraintKind::PrimaryKey => Severity::Critical,
            ConstraintKind::ForeignKey | ConstraintKind::Unique => Severity::Warning,
            ConstraintKind::Check => Severity::Info,
        };
        out.push(BreakingChange::new(
            severity,
            format!("removing {} constraint", constraint.kind.as_str()),
            table,
            constraint.name.clone().unwrap_or_else(|| constraint.match_key()),
            ObjectType::Constraint,
        ));
    }

    for change in &table_diff.constraints.changed {
        if change.rebuild_only {
            continue;
        }
        out.push(BreakingChange::new(
            Severity::Warning,
            format!("{} constraint modified", change.new.kind.as_str()),
            table,
            change.new.name.clone().unwrap_or_else(|| change.new.match_key()),
            ObjectType::Constraint,
        ));
    }

    for index in &table_diff.indexes.added {
        let severity = if index.unique { Severity::Breaking } else { Severity::Info };
        out.push(BreakingChange::new(
            severity,
            "index added",
            table,
            index.name.clone().unwrap_or_else(|| index.match_key()),
            ObjectType::Index,
        ));
    }

    for index in &table_diff.indexes.removed {
        out.push(BreakingChange::new(
            Severity::Info,
            "index removed",
            table,
            index.name.clone().unwrap_or_else(|| index.match_key()),
            ObjectType::Index,
        ));
    }

    for change in &table_diff.indexes.changed {
        if change.rebuild_only {
            continue;
        }
        let gains_unique = change.new.unique && !change.old.unique;
        let severity = if gains_unique { Severity::Breaking } else { Severity::Warning };
        out.push(BreakingChange::new(
            severity,
            "index modified",
            table,
            change.new.name.clone().unwrap_or_else(|| change.new.match_key()),
            ObjectType::Index,
        ));
    }

    for option in &table_diff.option_changes {
        let severity = match option.key.as_str() {
            "ENGINE" => Severity::Breaking,
            "CHARSET" | "COLLATE" => Severity::Warning,
            _ => Severity::Info,
        };
        out.push(BreakingChange::new(
            severity,
            format!("table option {} changed", option.key),
            table,
            &option.key,
            ObjectType::Option,
        ));
    }
}

fn analyze_column_modification(table: &str, modification: &ColumnModification, out: &mut Vec<BreakingChange>) {
    let name = &modification.new.name;
    let fields = &modification.changed_fields;

    if fields.contains(&"raw_type") {
        if let Some(change) =
            analyze_type_change(table, name, &modification.old.raw_type, &modification.new.raw_type)
        {
            out.push(change);
        }
    }

    if fields.contains(&"nullable") && modification.old.nullable && !modification.new.nullable {
        out.push(BreakingChange::new(
            Severity::Breaking,
            "column becomes NOT NULL; existing NULLs will fail",
            table,
            name,
            ObjectType::Column,
        ));
    }

    if fields.contains(&"is_generated") || fields.contains(&"generation_expression") {
        out.push(BreakingChange::new(
            Severity::Breaking,
            "generated-column definition changed",
            table,
            name,
            ObjectType::Column,
        ));
    }

    if fields.contains(&"primary_key") {
        out.push(BreakingChange::new(
            Severity::Breaking,
            "primary key flag changed on column",
            table,
            name,
            ObjectType::Column,
        ));
    }

    if fields.contains(&"charset") || fields.contains(&"collate") {
        let both_non_empty = modification.old.charset.is_some()
            && modification.new.charset.is_some()
            || modification.old.collate.is_some() && modification.new.collate.is_some();
        if both_non_empty {
            out.push(BreakingChange::new(
                Severity::Warning,
                "charset/collation changed",
                table,
                name,
                ObjectType::Column,
            ));
        }
    }

    if fields.contains(&"default") {
        out.push(BreakingChange::new(
            Severity::Warning,
            "default value changed",
            table,
            name,
            ObjectType::Column,
        ));
    }

    if fields.contains(&"comment") {
        out.push(BreakingChange::new(
            Severity::Info,
            "comment changed",
            table,
            name,
            ObjectType::Column,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::diff;
    use crate::ir::{Column, Database, Table};

    fn db_with(table: Table) -> Database {
        let mut db = Database::new("test");
        db.tables.push(table);
        db
    }

    #[test]
    fn removed_table_is_critical() {
        let old = db_with(Table::new("logs"));
        let new = Database::new("test");
        let d = diff(&old, &new);
        let changes = analyze(&d);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].severity, Severity::Critical);
    }

    #[test]
    fn varchar_length_grow_is_info_and_shrink_is_breaking() {
        let mut t1 = Table::new("users");
        t1.columns.push(Column::new("name", "VARCHAR(64)"));
        let mut grow = t1.clone();
        grow.columns[0].raw_type = "VARCHAR(128)".to_string();

        let grown_diff = diff(&db_with(t1.clone()), &db_with(grow));
        let grown_changes = analyze(&grown_diff);
        assert_eq!(grown_changes.len(), 1);
        assert_eq!(grown_changes[0].severity, Severity::Info);

        let mut shrink = t1.clone();
        shrink.columns[0].raw_type = "VARCHAR(32)".to_string();
        let shrink_diff = diff(&db_with(t1), &db_with(shrink));
        let shrink_changes = analyze(&shrink_diff);
        assert_eq!(shrink_changes.len(), 1);
        assert_eq!(shrink_changes[0].severity, Severity::Breaking);
    }

    #[test]
    fn int_widening_is_info_narrowing_is_critical() {
        let mut t1 = Table::new("users");
        t1.columns.push(Column::new("counter", "TINYINT"));
        let mut widened = t1.clone();
        widened.columns[0].raw_type = "BIGINT".to_string();

        let changes = analyze(&diff(&db_with(t1.clone()), &db_with(widened)));
        assert_eq!(changes[0].severity, Severity::Info);

        let mut narrowed = t1.clone();
        narrowed.columns[0].raw_type = "BIGINT".to_string();
        let back_changes = analyze(&diff(&db_with(narrowed), &db_with(t1)));
        assert_eq!(back_changes[0].severity, Severity::Critical);
    }

    #[test]
    fn adding_not_null_column_without_default_is_breaking() {
        let t1 = Table::new("users");
        let mut t2 = t1.clone();
        let mut email = Column::new("email", "VARCHAR(255)");
        email.nullable = false;
        t2.columns.push(email);

        let changes = analyze(&diff(&db_with(t1), &db_with(t2)));
        assert!(changes.iter().any(|c| c.severity == Severity::Breaking));
    }

    #[test]
    fn rebuild_only_constraint_produces_no_entry() {
        let mut t1 = Table::new("users");
        t1.columns.push(Column::new("email", "VARCHAR(100)"));
        t1.indexes.push(crate::ir::Index::new(
            Some("idx_email".to_string()),
            vec![crate::ir::IndexColumn::new("email")],
        ));
        let mut t2 = t1.clone();
        t2.columns[0].raw_type = "VARCHAR(255)".to_string();

        let d = diff(&db_with(t1), &db_with(t2));
        let changes = analyze(&d);
        assert!(!changes.iter().any(|c| c.object_type == ObjectType::Index));
    }
}
