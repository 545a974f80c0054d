// tests/migration_scenarios.rs

//! End-to-end migration planning scenarios, exercised against the
//! public API: `diff::diff` -> `risk::analyze` ->
//! `Generator::generate_migration`.

mod common;

use smf::dialect::{self, MigrationOptions, TransactionMode};
use smf::ir::{Column, Constraint, Index, IndexColumn, NormalizedType};
use smf::risk::Severity;
use smf::{diff, ir, planner};

fn mysql_options(include_unsafe: bool) -> MigrationOptions {
    MigrationOptions {
        dialect: "mysql".to_string(),
        include_drops: true,
        include_unsafe,
        transaction_mode: TransactionMode::default(),
        preserve_foreign_keys: true,
        defer_foreign_key_check: true,
    }
}

#[test]
fn s1_identical_schemas_produce_no_op_migration() {
    let old = common::single_table_db("app", "users", "INT");
    let new = old.clone();

    ir::validate(&old).unwrap();
    ir::validate(&new).unwrap();

    let schema_diff = diff::diff(&old, &new);
    assert!(schema_diff.is_empty(), "identical schemas should diff to nothing");

    let generator = dialect::lookup("mysql").unwrap();
    let migration = generator.generate_migration(&schema_diff, &mysql_options(true));
    assert!(migration.render_forward().contains("-- No SQL statements generated."));
}

#[test]
fn s2_adding_not_null_column_without_default_is_breaking() {
    let old = common::single_table_db("app", "users", "INT");
    let mut new = old.clone();

    let mut email = Column::new("email", "VARCHAR(255)");
    email.normalized_type = NormalizedType::String;
    email.nullable = false;
    new.tables[0].columns.push(email);

    let schema_diff = diff::diff(&old, &new);
    let breaking = smf::risk::analyze(&schema_diff);
    assert!(
        breaking
            .iter()
            .any(|b| b.severity == Severity::Breaking && b.description.contains("NOT NULL")),
        "expected a breaking NOT NULL warning, got {breaking:?}"
    );

    let generator = dialect::lookup("mysql").unwrap();
    let migration = generator.generate_migration(&schema_diff, &mysql_options(true));
    let forward = migration.render_forward();
    assert!(forward.contains("ALTER TABLE `users` ADD COLUMN `email` VARCHAR(255) NOT NULL;"));
    let rollback = migration.render_rollback();
    assert!(rollback.contains("ALTER TABLE `users` DROP COLUMN `email`;"));
}

#[test]
fn s3_safe_mode_table_drop_renames_to_backup_instead_of_dropping() {
    let old = common::single_table_db("app", "logs", "INT");
    let new = ir::Database::new("app");

    let schema_diff = diff::diff(&old, &new);
    let breaking = smf::risk::analyze(&schema_diff);
    assert!(breaking.iter().any(|b| b.severity == Severity::Critical));

    let generator = dialect::lookup("mysql").unwrap();
    let migration = generator.generate_migration(&schema_diff, &mysql_options(false));
    let forward = migration.render_forward();

    let backup_name = planner::safe_backup_name("logs");
    assert!(forward.contains(&format!("RENAME TABLE `logs` TO `{backup_name}`;")));
    assert!(!forward.contains("DROP TABLE"));

    let rollback = migration.render_rollback();
    assert!(rollback.contains(&format!("RENAME TABLE `{backup_name}` TO `logs`;")));
}

#[test]
fn s4_fk_dependent_column_change_defers_foreign_key_readd_past_both_tables() {
    let old = common::users_and_orders_db("BIGINT UNSIGNED");
    let mut new = old.clone();
    for table in new.tables.iter_mut() {
        match table.name.as_str() {
            "users" => table.columns[0].raw_type = "BINARY(16)".to_string(),
            "orders" => table.columns[1].raw_type = "BINARY(16)".to_string(),
            _ => {}
        }
    }

    let schema_diff = diff::diff(&old, &new);
    let generator = dialect::lookup("mysql").unwrap();
    let migration = generator.generate_migration(&schema_diff, &mysql_options(true));
    let forward = migration.render_forward();

    let drop_fk = forward.find("DROP FOREIGN KEY `fk_orders_user`").expect("FK dropped");
    let modify_orders = forward
        .find("ALTER TABLE `orders` MODIFY COLUMN `user_id`")
        .expect("orders.user_id modified");
    let modify_users = forward
        .find("ALTER TABLE `users` MODIFY COLUMN `id`")
        .expect("users.id modified");
    let readd_fk = forward
        .find("ADD CONSTRAINT `fk_orders_user`")
        .expect("FK re-added");

    assert!(drop_fk < modify_orders, "FK must drop before the column it depends on changes");
    assert!(modify_orders < readd_fk, "FK re-add must come after both tables are modified");
    assert!(modify_users < readd_fk, "FK re-add must come after both tables are modified");
}

#[test]
fn s5_rename_heuristic_matches_type_compatible_same_comment_columns() {
    let mut old = ir::Database::new("app");
    let mut users = ir::Table::new("users");
    let mut user_name = Column::new("user_name", "VARCHAR(50)");
    user_name.normalized_type = NormalizedType::String;
    user_name.nullable = false;
    user_name.comment = Some("login".to_string());
    users.columns.push(user_name);
    old.tables.push(users);

    let mut new = ir::Database::new("app");
    let mut users_new = ir::Table::new("users");
    let mut login_name = Column::new("login_name", "VARCHAR(50)");
    login_name.normalized_type = NormalizedType::String;
    login_name.nullable = false;
    login_name.comment = Some("login".to_string());
    users_new.columns.push(login_name);
    new.tables.push(users_new);

    let schema_diff = diff::diff(&old, &new);
    let table_diff = schema_diff.tables_modified.iter().find(|t| t.name == "users").unwrap();
    assert_eq!(table_diff.columns.renamed.len(), 1);
    assert!(table_diff.columns.added.is_empty());
    assert!(table_diff.columns.removed.is_empty());

    let generator = dialect::lookup("mysql").unwrap();
    let migration = generator.generate_migration(&schema_diff, &mysql_options(true));
    assert!(migration.render_forward().contains("CHANGE COLUMN `user_name` `login_name`"));
}

#[test]
fn s6_varchar_length_grows_is_info_and_shrinks_is_breaking() {
    let mut old = ir::Database::new("app");
    let mut table = ir::Table::new("users");
    table.columns.push(Column::new("name", "VARCHAR(64)"));
    old.tables.push(table);

    let mut grown = old.clone();
    grown.tables[0].columns[0].raw_type = "VARCHAR(128)".to_string();
    let grow_diff = diff::diff(&old, &grown);
    let grow_risk = smf::risk::analyze(&grow_diff);
    assert!(grow_risk.iter().any(|b| b.severity == Severity::Info && b.description.contains("length increases")));
    assert!(!grow_risk.iter().any(|b| b.description.contains("type change")));
    let generator = dialect::lookup("mysql").unwrap();
    let grow_migration = generator.generate_migration(&grow_diff, &mysql_options(true));
    assert!(grow_migration.render_forward().contains("MODIFY COLUMN `name` VARCHAR(128)"));

    let mut shrunk = old.clone();
    shrunk.tables[0].columns[0].raw_type = "VARCHAR(32)".to_string();
    let shrink_diff = diff::diff(&old, &shrunk);
    let shrink_risk = smf::risk::analyze(&shrink_diff);
    assert!(shrink_risk.iter().any(|b| b.severity == Severity::Breaking && b.description.contains("length shrinks")));
    assert!(!shrink_risk.iter().any(|b| b.description.contains("type change")));
}

#[test]
fn rebuild_only_index_is_dropped_and_readded_without_a_breaking_note() {
    let mut old = ir::Database::new("app");
    let mut table = ir::Table::new("users");
    table.columns.push(Column::new("email", "VARCHAR(255)"));
    table.indexes.push(Index::new(Some("idx_email".to_string()), vec![IndexColumn::new("email")]));
    old.tables.push(table);

    let mut new = old.clone();
    new.tables[0].columns[0].raw_type = "VARCHAR(512)".to_string();

    let schema_diff = diff::diff(&old, &new);
    let table_diff = schema_diff.tables_modified.iter().find(|t| t.name == "users").unwrap();
    assert_eq!(table_diff.indexes.changed.len(), 1);
    assert!(table_diff.indexes.changed[0].rebuild_only);

    let breaking = smf::risk::analyze(&schema_diff);
    assert!(!breaking.iter().any(|b| b.object == "idx_email"));

    let generator = dialect::lookup("mysql").unwrap();
    let migration = generator.generate_migration(&schema_diff, &mysql_options(true));
    let forward = migration.render_forward();
    assert!(forward.contains("DROP INDEX `idx_email`"));
    assert!(forward.contains("ADD INDEX `idx_email`") || forward.contains("ADD KEY `idx_email`"));
}

#[test]
fn unnamed_foreign_key_cannot_be_dropped_and_surfaces_as_unresolved() {
    let unnamed_fk = Constraint {
        name: None,
        kind: ir::ConstraintKind::ForeignKey,
        columns: vec!["user_id".to_string()],
        referenced_table: Some("users".to_string()),
        referenced_columns: vec!["id".to_string()],
        on_delete: None,
        on_update: None,
        check_expression: None,
        enforced: true,
    };

    let mut old = ir::Database::new("app");
    let mut users = ir::Table::new("users");
    users.columns.push(Column::new("id", "BIGINT UNSIGNED"));
    old.tables.push(users.clone());

    let mut orders = ir::Table::new("orders");
    orders.columns.push(Column::new("user_id", "BIGINT UNSIGNED"));
    orders.constraints.push(unnamed_fk);
    old.tables.push(orders.clone());

    // The FK is removed while the table itself survives, so the
    // planner must go through `drop_constraint` for it rather than
    // dropping/renaming the whole table.
    let mut new = ir::Database::new("app");
    new.tables.push(users);
    orders.constraints.clear();
    new.tables.push(orders);

    let schema_diff = diff::diff(&old, &new);
    let generator = dialect::lookup("mysql").unwrap();
    let migration = generator.generate_migration(&schema_diff, &mysql_options(true));
    assert!(
        migration
            .operations
            .iter()
            .any(|op| matches!(op, planner::Operation::Unresolved(_))),
        "an unnamed FK cannot be dropped automatically and must surface as unresolved"
    );
}
