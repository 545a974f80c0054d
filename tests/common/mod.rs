// tests/common/mod.rs

//! Shared fixture builders for end-to-end migration scenario tests.

use smf::ir::{Column, Constraint, ConstraintKind, Database, NormalizedType, Table};

/// A one-table database: `users(id <pk>)`, `id` typed as given.
pub fn single_table_db(db_name: &str, table_name: &str, id_type: &str) -> Database {
    let mut id = Column::new("id", id_type);
    id.normalized_type = NormalizedType::Int;
    id.nullable = false;

    let mut table = Table::new(table_name);
    table.columns.push(id);
    table.constraints.push(Constraint::primary_key(vec!["id".to_string()]));

    let mut db = Database::new(db_name);
    db.tables.push(table);
    db
}

/// `users(id BIGINT UNSIGNED PRIMARY KEY)` / `orders(id ..., user_id ...,
/// CONSTRAINT fk_orders_user FOREIGN KEY(user_id) REFERENCES users(id))`
/// used by the FK-dependent-column-change scenario.
pub fn users_and_orders_db(id_type: &str) -> Database {
    let mut user_id = Column::new("id", id_type);
    user_id.normalized_type = NormalizedType::Int;
    user_id.nullable = false;

    let mut users = Table::new("users");
    users.columns.push(user_id);
    users.constraints.push(Constraint::primary_key(vec!["id".to_string()]));

    let mut order_id = Column::new("id", "BIGINT UNSIGNED");
    order_id.normalized_type = NormalizedType::Int;
    order_id.nullable = false;

    let mut order_user_id = Column::new("user_id", id_type);
    order_user_id.normalized_type = NormalizedType::Int;
    order_user_id.nullable = false;

    let fk = Constraint {
        name: Some("fk_orders_user".to_string()),
        kind: ConstraintKind::ForeignKey,
        columns: vec!["user_id".to_string()],
        referenced_table: Some("users".to_string()),
        referenced_columns: vec!["id".to_string()],
        on_delete: None,
        on_update: None,
        check_expression: None,
        enforced: true,
    };

    let mut orders = Table::new("orders");
    orders.columns.push(order_id);
    orders.columns.push(order_user_id);
    orders.constraints.push(Constraint::primary_key(vec!["id".to_string()]));
    orders.constraints.push(fk);

    let mut db = Database::new("app");
    db.tables.push(orders);
    db.tables.push(users);
    db
}
