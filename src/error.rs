// src/error.rs
//! Crate-wide error type.
//!
//! The IR validator and the dialect registry are the only parts of the
//! core that fail (see spec §7): the diff engine and the migration
//! planner are total functions over their inputs and never return `Err`.
//! Problems the planner cannot safely resolve are encoded as
//! `Unresolved` operations in the `Migration` instead.

use thiserror::Error;

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Registry lookup with a tag that has no registered generator.
    #[error("unknown dialect: {0}")]
    UnknownDialect(String),

    /// Case-insensitive table name collision within a `Database`.
    #[error("duplicate table name: {0}")]
    DuplicateTableName(String),

    /// Case-insensitive column name collision within a `Table`.
    #[error("duplicate column name: {table}.{column}")]
    DuplicateColumnName { table: String, column: String },

    /// Case-insensitive constraint name collision within a `Table`.
    #[error("duplicate constraint name: {table}.{name}")]
    DuplicateConstraintName { table: String, name: String },

    /// Case-insensitive index name collision within a `Table`.
    #[error("duplicate index name: {table}.{name}")]
    DuplicateIndexName { table: String, name: String },

    /// More than one PRIMARY KEY, or a PK encoded both as a column flag
    /// and as a table-level constraint.
    #[error("table {0} declares more than one primary key")]
    MultiplePrimaryKeys(String),

    /// A constraint or index references a column that does not exist.
    #[error("{table}.{object} references nonexistent column {column}")]
    MissingColumnReference {
        table: String,
        object: String,
        column: String,
    },

    /// A foreign key has no referenced table, or arity does not match.
    #[error("table {table} constraint {constraint}: invalid foreign key")]
    InvalidForeignKey { table: String, constraint: String },

    /// Column-level `REFERENCES` shorthand not of the form `table.column`.
    #[error("table {table}.{column}: invalid references syntax: {value}")]
    InvalidReferencesSyntax {
        table: String,
        column: String,
        value: String,
    },

    /// `created_column`/`updated_column` collide in a `Timestamps` config.
    #[error("table {0}: timestamps created_column and updated_column must differ")]
    InvalidTimestampsConfig(String),

    /// A name exceeds the configured max length or fails the allowed pattern.
    #[error("{kind} name {name:?} violates naming rule: {reason}")]
    NameRuleViolation {
        kind: &'static str,
        name: String,
        reason: String,
    },

    /// A table with zero columns.
    #[error("table {0} has no columns")]
    EmptyTable(String),

    /// A feature named by the CLI surface that the core intentionally
    /// does not implement (e.g. `apply` against a live database).
    #[error("not implemented: {0}")]
    NotImplemented(String),

    /// Best-effort SQL DDL front-end could not parse a statement.
    #[error("could not parse SQL DDL statement: {0}")]
    SqlParse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
