// src/dialect/mod.rs
//! Dialect registry and generator contract (spec §4.5/§5, components
//! C5/C7).
//!
//! The registry is the one piece of process-wide mutable state in the
//! crate (spec §9): a reader/writer lock guards a map from dialect tag
//! to factory. Lookup invokes the factory fresh each time so that
//! callers never share mutable generator state (spec §5).

pub mod mysql;

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use parking_lot::RwLock;
use tracing::debug;

use crate::diff::{SchemaDiff, TableDiff, TableOptionChange};
use crate::error::{Error, Result};
use crate::ir::{Column, Constraint, Index, Table};
use crate::planner::Migration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransactionMode {
    None,
    #[default]
    Single,
    PerStatement,
}

/// Core configuration surface (spec §4.5). CLI flags map onto this at
/// the edge; the core itself only ever sees a `MigrationOptions`.
#[derive(Debug, Clone)]
pub struct MigrationOptions {
    pub dialect: String,
    pub include_drops: bool,
    pub include_unsafe: bool,
    pub transaction_mode: TransactionMode,
    pub preserve_foreign_keys: bool,
    pub defer_foreign_key_check: bool,
}

impl Default for MigrationOptions {
    fn default() -> Self {
        Self {
            dialect: "mysql".to_string(),
            include_drops: true,
            include_unsafe: false,
            transaction_mode: TransactionMode::default(),
            preserve_foreign_keys: true,
            defer_foreign_key_check: true,
        }
    }
}

/// Per-dialect DDL generator (spec §4.5, component C7).
///
/// The six methods named directly in spec §4.5 are `generate_migration`,
/// `create_table`, `drop_table`, `alter_table`, `quote_identifier`, and
/// `quote_string`. The remaining methods are a granular elaboration of
/// `alter_table`: the planner (§4.6) needs per-statement control to
/// interleave a single table's changes with the cross-table deferred-FK
/// batch, so it calls these directly instead of the coarse
/// `alter_table` convenience.
pub trait Generator: Send + Sync {
    fn dialect(&self) -> &'static str;

    /// Assemble a full `Migration` from a diff (delegates to the
    /// shared planner, passing itself as the statement formatter).
    fn generate_migration(&self, diff: &SchemaDiff, options: &MigrationOptions) -> Migration;

    /// `CREATE TABLE` statement, plus any FK-bearing constraint ADD
    /// statements that should be applied later (deferred FK batch).
    fn create_table(&self, table: &Table) -> (String, Vec<String>);

    fn drop_table(&self, table: &Table) -> String;

    /// Coarse convenience: every forward statement for a table's
    /// changes in intra-table order, ignoring cross-table FK deferral.
    fn alter_table(&self, table_diff: &TableDiff, options: &MigrationOptions) -> Vec<String>;

    fn quote_identifier(&self, name: &str) -> String;

    fn quote_string(&self, value: &str) -> String;

    fn add_column(&self, table: &str, column: &Column) -> String;
    fn drop_column(&self, table: &str, column_name: &str) -> String;
    fn modify_column(&self, table: &str, column: &Column) -> String;
    fn change_column(&self, table: &str, old_name: &str, new_column: &Column) -> String;
    fn rename_table(&self, old_name: &str, new_name: &str) -> String;
    fn add_constraint(&self, table: &str, constraint: &Constraint) -> String;
    /// `None` when the constraint is unnamed and cannot be dropped
    /// automatically (spec §9 open question).
    fn drop_constraint(&self, table: &str, constraint: &Constraint) -> Option<String>;
    fn add_index(&self, table: &str, index: &Index) -> String;
    /// `None` for unnamed indexes.
    fn drop_index(&self, table: &str, index: &Index) -> Option<String>;
    /// `None` when there is nothing to re-emit. `use_new` selects
    /// forward (new values) vs. rollback (old values) direction.
    fn table_option_statement(&self, table: &str, changes: &[TableOptionChange], use_new: bool) -> Option<String>;
}

type Factory = Arc<dyn Fn() -> Box<dyn Generator> + Send + Sync>;

struct DialectRegistry {
    factories: RwLock<HashMap<String, Factory>>,
}

impl DialectRegistry {
    fn with_builtins() -> Self {
        let registry = Self {
            factories: RwLock::new(HashMap::new()),
        };
        registry.register("mysql", Arc::new(|| Box::new(mysql::MySqlGenerator) as Box<dyn Generator>));
        registry.register("mariadb", Arc::new(|| Box::new(mysql::MySqlGenerator) as Box<dyn Generator>));
        registry.register("tidb", Arc::new(|| Box::new(mysql::MySqlGenerator) as Box<dyn Generator>));
        registry
    }

    fn register(&self, tag: &str, factory: Factory) {
        debug!(dialect = tag, "registering dialect generator");
        self.factories.write().insert(tag.to_ascii_lowercase(), factory);
    }

    fn lookup(&self, tag: &str) -> Result<Box<dyn Generator>> {
        let key = tag.to_ascii_lowercase();
        debug!(dialect = %key, "looking up dialect generator");
        self.factories
            .read()
            .get(&key)
            .map(|factory| factory())
            .ok_or_else(|| Error::UnknownDialect(tag.to_string()))
    }
}

static REGISTRY: LazyLock<DialectRegistry> = LazyLock::new(DialectRegistry::with_builtins);

/// Register a dialect generator factory. Re-registration of an
/// existing tag replaces it (last write wins, spec §5).
pub fn register(tag: &str, factory: Factory) {
    REGISTRY.register(tag, factory);
}

/// Look up a dialect by tag, constructing a fresh generator instance.
pub fn lookup(tag: &str) -> Result<Box<dyn Generator>> {
    REGISTRY.lookup(tag)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mysql_is_registered_by_default() {
        assert_eq!(lookup("mysql").unwrap().dialect(), "mysql");
        assert_eq!(lookup("MySQL").unwrap().dialect(), "mysql");
    }

    #[test]
    fn tidb_aliases_to_mysql_generator() {
        assert_eq!(lookup("tidb").unwrap().dialect(), "mysql");
    }

    #[test]
    fn unknown_dialect_errors() {
        assert!(matches!(lookup("postgresql"), Err(Error::UnknownDialect(_))));
    }

    #[test]
    fn reregistration_replaces_factory() {
        register("mysql", Arc::new(|| Box::new(mysql::MySqlGenerator) as Box<dyn Generator>));
        assert_eq!(lookup("mysql").unwrap().dialect(), "mysql");
    }
}
