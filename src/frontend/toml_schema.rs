// src/frontend/toml_schema.rs
//! Declarative TOML schema reader.
//!
//! A document is a direct structural mapping onto `ir::Database`:
//!
//! ```toml
//! name = "app"
//! dialect = "mysql"
//!
//! [[tables]]
//! name = "users"
//!
//! [[tables.columns]]
//! name = "id"
//! raw_type = "BIGINT UNSIGNED"
//! normalized_type = "int"
//! nullable = false
//! primary_key = true
//! auto_increment = true
//!
//! [[tables.indexes]]
//! name = "idx_email"
//! unique = true
//! [[tables.indexes.columns]]
//! name = "email"
//! ```
//!
//! This reader performs no semantic checking: duplicate names, dangling
//! foreign keys, and the rest of spec §3's invariants are the
//! validator's job, not this one's.

use crate::error::Result;
use crate::ir::Database;

/// Parse a TOML document into a `Database`. Purely structural: the
/// result is not validated.
pub fn parse(source: &str) -> Result<Database> {
    let db: Database = toml::from_str(source)?;
    Ok(db)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir;

    #[test]
    fn parses_minimal_table() {
        let source = r#"
            name = "app"

            [[tables]]
            name = "users"

            [[tables.columns]]
            name = "id"
            raw_type = "BIGINT UNSIGNED"
            normalized_type = "int"
            nullable = false
            primary_key = true
            auto_increment = true
            is_generated = false
        "#;
        let db = parse(source).unwrap();
        assert_eq!(db.name, "app");
        assert_eq!(db.tables.len(), 1);
        let table = &db.tables[0];
        assert_eq!(table.name, "users");
        assert_eq!(table.columns.len(), 1);
        assert!(table.columns[0].primary_key);
    }

    #[test]
    fn parses_constraints_and_indexes() {
        let source = r#"
            name = "app"

            [[tables]]
            name = "orders"

            [[tables.columns]]
            name = "id"
            raw_type = "BIGINT UNSIGNED"
            normalized_type = "int"
            nullable = false
            primary_key = false
            auto_increment = true
            is_generated = false

            [[tables.columns]]
            name = "user_id"
            raw_type = "BIGINT UNSIGNED"
            normalized_type = "int"
            nullable = false
            primary_key = false
            auto_increment = false
            is_generated = false

            [[tables.constraints]]
            name = "fk_orders_user"
            kind = "FOREIGN KEY"
            columns = ["user_id"]
            referenced_table = "users"
            referenced_columns = ["id"]

            [[tables.indexes]]
            name = "idx_user_id"
            [[tables.indexes.columns]]
            name = "user_id"
        "#;
        let db = parse(source).unwrap();
        let table = &db.tables[0];
        assert_eq!(table.constraints.len(), 1);
        assert_eq!(table.constraints[0].kind, ir::ConstraintKind::ForeignKey);
        assert_eq!(table.indexes.len(), 1);
    }

    #[test]
    fn malformed_toml_is_an_error() {
        let result = parse("name = \"app\"\n[[tables]\nname = \"broken\"");
        assert!(result.is_err());
    }
}
