// src/frontend/mod.rs
//! Schema readers that produce an `ir::Database`.
//!
//! Both front-ends are convenience call paths into the same
//! `Database` + `validate()` entry point the core exposes. Neither
//! performs semantic validation itself — that is `ir::validate`'s job
//! (spec §3/C2). A front-end's only responsibility is structural
//! parsing: turning a document into the right shape, or failing with
//! `Error::SqlParse`/`Error::TomlParse` when it cannot.

pub mod sql_ddl;
pub mod toml_schema;

use std::path::Path;

use crate::error::{Error, Result};
use crate::ir::Database;

/// Load a `Database` from a file, dispatching on extension: `.toml`
/// goes through the declarative reader, anything else is treated as
/// SQL DDL.
pub fn load_schema_file(path: &Path) -> Result<Database> {
    let source = std::fs::read_to_string(path)?;
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("toml") => toml_schema::parse(&source),
        Some(ext) if ext.eq_ignore_ascii_case("sql") => sql_ddl::parse(&source),
        _ => Err(Error::SqlParse(format!(
            "cannot determine schema format for {}: expected a .toml or .sql extension",
            path.display()
        ))),
    }
}
