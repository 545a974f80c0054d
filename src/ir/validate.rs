// src/ir/validate.rs
//! IR validator (spec §4.1, component C2).
//!
//! A pure function over a `Database` that returns the first violation
//! encountered, walking tables in declaration order and, within a
//! table, columns -> constraints -> indexes -> timestamps -> name
//! rules. The validator is idempotent: re-validating a validated
//! `Database` never errors (spec §8 property 3).

use std::collections::HashSet;

use regex::Regex;

use crate::error::{Error, Result};

use super::constraint::ConstraintKind;
use super::database::{Database, NamingRules};
use super::table::Table;

/// Validate a `Database` against the invariants in spec §3.
pub fn validate(db: &Database) -> Result<()> {
    let mut seen_tables: HashSet<String> = HashSet::new();
    for table in &db.tables {
        let lower = table.name.to_ascii_lowercase();
        if !seen_tables.insert(lower) {
            return Err(Error::DuplicateTableName(table.name.clone()));
        }
        validate_table(table, db.naming_rules.as_ref())?;
    }
    Ok(())
}

fn validate_table(table: &Table, naming_rules: Option<&NamingRules>) -> Result<()> {
    if table.columns.is_empty() {
        return Err(Error::EmptyTable(table.name.clone()));
    }

    validate_columns(table)?;
    validate_primary_key(table)?;
    validate_constraints(table)?;
    validate_indexes(table)?;
    validate_timestamps(table)?;

    if let Some(rules) = naming_rules {
        check_name_rule("table", &table.name, rules)?;
        for column in &table.columns {
            check_name_rule("column", &column.name, rules)?;
        }
    }

    Ok(())
}

fn validate_columns(table: &Table) -> Result<()> {
    let mut seen: HashSet<String> = HashSet::new();
    for column in &table.columns {
        let lower = column.name.to_ascii_lowercase();
        if !seen.insert(lower) {
            return Err(Error::DuplicateColumnName {
                table: table.name.clone(),
                column: column.name.clone(),
            });
        }
    }
    Ok(())
}

/// At most one PRIMARY KEY per table; it may not be encoded both via a
/// column flag and a table-level constraint (spec §3 invariant 2).
fn validate_primary_key(table: &Table) -> Result<()> {
    let pk_constraints = table.primary_key_constraints().len();
    let pk_flagged = !table.columns_with_pk_flag().is_empty();

    if pk_constraints > 1 {
        return Err(Error::MultiplePrimaryKeys(table.name.clone()));
    }
    if pk_constraints == 1 && pk_flagged {
        return Err(Error::MultiplePrimaryKeys(table.name.clone()));
    }
    Ok(())
}

fn validate_constraints(table: &Table) -> Result<()> {
    let mut seen_names: HashSet<String> = HashSet::new();

    for constraint in &table.constraints {
        if let Some(name) = &constraint.name {
            let trimmed = name.trim();
            if !trimmed.is_empty() {
                let lower = trimmed.to_ascii_lowercase();
                if !seen_names.insert(lower) {
                    return Err(Error::DuplicateConstraintName {
                        table: table.name.clone(),
                        name: name.clone(),
                    });
                }
            }
        }

        if constraint.kind != ConstraintKind::Check {
            for column in &constraint.columns {
                if table.find_column(column).is_none() {
                    return Err(Error::MissingColumnReference {
                        table: table.name.clone(),
                        object: constraint
                            .name
                            .clone()
                            .unwrap_or_else(|| constraint.kind.as_str().to_string()),
                        column: column.clone(),
                    });
                }
            }
        }

        if constraint.kind == ConstraintKind::ForeignKey {
            let referenced_table_ok = constraint
                .referenced_table
                .as_ref()
                .is_some_and(|t| !t.trim().is_empty());
            let arity_ok = !constraint.referenced_columns.is_empty()
                && constraint.referenced_columns.len() == constraint.columns.len();

            if !referenced_table_ok || !arity_ok {
                return Err(Error::InvalidForeignKey {
                    table: table.name.clone(),
                    constraint: constraint
                        .name
                        .clone()
                        .unwrap_or_else(|| constraint.match_key()),
                });
            }
        }
    }

    Ok(())
}

fn validate_indexes(table: &Table) -> Result<()> {
    let mut seen_names: HashSet<String> = HashSet::new();

    for index in &table.indexes {
        if let Some(name) = &index.name {
            let trimmed = name.trim();
            if !trimmed.is_empty() {
                let lower = trimmed.to_ascii_lowercase();
                if !seen_names.insert(lower) {
                    return Err(Error::DuplicateIndexName {
                        table: table.name.clone(),
                        name: name.clone(),
                    });
                }
            }
        }

        for col in &index.columns {
            if table.find_column(&col.name).is_none() {
                return Err(Error::MissingColumnReference {
                    table: table.name.clone(),
                    object: index.name.clone().unwrap_or_else(|| index.match_key()),
                    column: col.name.clone(),
                });
            }
        }
    }

    Ok(())
}

fn validate_timestamps(table: &Table) -> Result<()> {
    if let Some(ts) = &table.timestamps
        && ts.created_column.eq_ignore_ascii_case(&ts.updated_column)
    {
        return Err(Error::InvalidTimestampsConfig(table.name.clone()));
    }
    Ok(())
}

fn check_name_rule(kind: &'static str, name: &str, rules: &NamingRules) -> Result<()> {
    if let Some(max_len) = rules.max_length
        && name.len() > max_len
    {
        return Err(Error::NameRuleViolation {
            kind,
            name: name.to_string(),
            reason: format!("exceeds max length {max_len}"),
        });
    }
    if let Some(pattern) = &rules.pattern {
        let re = Regex::new(pattern)
            .map_err(|e| Error::NameRuleViolation {
                kind,
                name: name.to_string(),
                reason: format!("invalid naming pattern {pattern:?}: {e}"),
            })?;
        if !re.is_match(name) {
            return Err(Error::NameRuleViolation {
                kind,
                name: name.to_string(),
                reason: format!("does not match pattern {pattern:?}"),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Column, Constraint, ConstraintKind, Database, Index, IndexColumn, Table, Timestamps};

    fn simple_users_table() -> Table {
        let mut table = Table::new("users");
        let mut id = Column::new("id", "INT");
        id.primary_key = true;
        table.columns.push(id);
        table
    }

    #[test]
    fn validates_minimal_schema() {
        let mut db = Database::new("test");
        db.tables.push(simple_users_table());
        assert!(validate(&db).is_ok());
    }

    #[test]
    fn idempotent_on_already_valid_schema() {
        let mut db = Database::new("test");
        db.tables.push(simple_users_table());
        validate(&db).unwrap();
        assert!(validate(&db).is_ok());
    }

    #[test]
    fn rejects_duplicate_table_names() {
        let mut db = Database::new("test");
        db.tables.push(simple_users_table());
        db.tables.push(Table::new("USERS"));
        assert!(matches!(validate(&db), Err(Error::DuplicateTableName(_))));
    }

    #[test]
    fn rejects_duplicate_column_names() {
        let mut table = Table::new("users");
        table.columns.push(Column::new("id", "INT"));
        table.columns.push(Column::new("ID", "INT"));
        let mut db = Database::new("test");
        db.tables.push(table);
        assert!(matches!(validate(&db), Err(Error::DuplicateColumnName { .. })));
    }

    #[test]
    fn rejects_pk_flag_and_pk_constraint_together() {
        let mut table = simple_users_table();
        table
            .constraints
            .push(Constraint::primary_key(vec!["id".to_string()]));
        let mut db = Database::new("test");
        db.tables.push(table);
        assert!(matches!(validate(&db), Err(Error::MultiplePrimaryKeys(_))));
    }

    #[test]
    fn rejects_constraint_referencing_missing_column() {
        let mut table = simple_users_table();
        table
            .constraints
            .push(Constraint::primary_key(vec!["nope".to_string()]));
        let mut db = Database::new("test");
        db.tables.push(table);
        assert!(matches!(
            validate(&db),
            Err(Error::MissingColumnReference { .. })
        ));
    }

    #[test]
    fn rejects_fk_without_referenced_table() {
        let mut table = simple_users_table();
        table.columns.push(Column::new("org_id", "INT"));
        table.constraints.push(Constraint {
            name: Some("fk_org".to_string()),
            kind: ConstraintKind::ForeignKey,
            columns: vec!["org_id".to_string()],
            referenced_table: None,
            referenced_columns: vec![],
            on_delete: None,
            on_update: None,
            check_expression: None,
            enforced: true,
        });
        let mut db = Database::new("test");
        db.tables.push(table);
        assert!(matches!(validate(&db), Err(Error::InvalidForeignKey { .. })));
    }

    #[test]
    fn rejects_index_on_missing_column() {
        let mut table = simple_users_table();
        table
            .indexes
            .push(Index::new(None, vec![IndexColumn::new("nope")]));
        let mut db = Database::new("test");
        db.tables.push(table);
        assert!(matches!(
            validate(&db),
            Err(Error::MissingColumnReference { .. })
        ));
    }

    #[test]
    fn rejects_timestamps_with_colliding_columns() {
        let mut table = simple_users_table();
        table.timestamps = Some(Timestamps {
            created_column: "ts".to_string(),
            updated_column: "TS".to_string(),
        });
        let mut db = Database::new("test");
        db.tables.push(table);
        assert!(matches!(
            validate(&db),
            Err(Error::InvalidTimestampsConfig(_))
        ));
    }

    #[test]
    fn rejects_empty_table() {
        let mut db = Database::new("test");
        db.tables.push(Table::new("empty"));
        assert!(matches!(validate(&db), Err(Error::EmptyTable(_))));
    }

    #[test]
    fn enforces_name_length_rule() {
        let mut db = Database::new("test");
        db.naming_rules = Some(NamingRules {
            max_length: Some(5),
            pattern: None,
        });
        db.tables.push(Table::new("this_name_is_too_long"));
        assert!(matches!(
            validate(&db),
            Err(Error::NameRuleViolation { .. })
        ));
    }
}
