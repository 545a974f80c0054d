// src/ir/mod.rs
//! The canonical, dialect-agnostic schema intermediate representation
//! (spec §3, component C1).
//!
//! Ownership is tree-shaped: a `Database` owns its `Table`s, each
//! `Table` owns its `Column`s, `Constraint`s, and `Index`es. Foreign key
//! targets are names, resolved only at validation/generation time — the
//! IR never holds cross-entity pointers (spec §9).

pub mod column;
pub mod constraint;
pub mod database;
pub mod eq;
pub mod index;
pub mod options;
pub mod table;
mod validate;

pub use column::{Column, GenerationStorage, MySqlColumnExtra, NormalizedType};
pub use constraint::{Constraint, ConstraintKind, ReferentialAction};
pub use database::{Database, NamingRules};
pub use index::{Index, IndexColumn, IndexKind, IndexVisibility, SortOrder};
pub use options::TableOptions;
pub use table::{Table, Timestamps};
pub use validate::validate;
