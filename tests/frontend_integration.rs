// tests/frontend_integration.rs

//! Exercises the public schema-loading entry point against both
//! supported file extensions, including the TOML fixture-file path
//! through `tempfile`.

use std::io::Write;

use smf::frontend::load_schema_file;

#[test]
fn loads_and_validates_a_toml_schema_file() {
    let mut file = tempfile::NamedTempFile::with_suffix(".toml").unwrap();
    writeln!(
        file,
        r#"
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

        [[tables.columns]]
        name = "email"
        raw_type = "VARCHAR(255)"
        normalized_type = "string"
        nullable = false
        primary_key = false
        auto_increment = false
        is_generated = false
        "#
    )
    .unwrap();

    let db = load_schema_file(file.path()).unwrap();
    smf::ir::validate(&db).unwrap();
    assert_eq!(db.tables.len(), 1);
    assert_eq!(db.tables[0].columns.len(), 2);
}

#[test]
fn loads_a_sql_ddl_schema_file() {
    let mut file = tempfile::NamedTempFile::with_suffix(".sql").unwrap();
    writeln!(
        file,
        r#"
        CREATE TABLE users (
            id BIGINT UNSIGNED NOT NULL AUTO_INCREMENT,
            email VARCHAR(255) NOT NULL,
            PRIMARY KEY (id)
        );
        "#
    )
    .unwrap();

    let db = load_schema_file(file.path()).unwrap();
    smf::ir::validate(&db).unwrap();
    assert_eq!(db.tables.len(), 1);
    let table = &db.tables[0];
    assert_eq!(table.name, "users");
    assert!(table.find_column("email").is_some());
}

#[test]
fn unrecognized_extension_is_an_error() {
    let file = tempfile::NamedTempFile::with_suffix(".txt").unwrap();
    assert!(load_schema_file(file.path()).is_err());
}
