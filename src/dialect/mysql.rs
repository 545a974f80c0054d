// src/dialect/mysql.rs
//! MySQL/MariaDB/TiDB DDL formatter (spec §4.7, component C7).
//!
//! `MySqlGenerator` is a zero-sized formatter: every method is a pure
//! function of its arguments, matching the "no mutable generator
//! state" rule in spec §5.

use crate::diff::{SchemaDiff, TableDiff, TableOptionChange};
use crate::ir::{Column, Constraint, ConstraintKind, Index, NormalizedType, Table};
use crate::planner::{self, Migration};

use super::{Generator, MigrationOptions};

const TEXT_FAMILY_TYPES: &[&str] = &[
    "char", "varchar", "tinytext", "text", "mediumtext", "longtext", "enum", "set",
];

#[derive(Debug, Clone, Copy)]
pub struct MySqlGenerator;

impl MySqlGenerator {
    pub fn quote_ident(&self, name: &str) -> String {
        format!("`{}`", name.replace('`', "``"))
    }

    pub fn quote_str(&self, value: &str) -> String {
        format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
    }

    /// Render `<ident> <type>` plus every attribute the column carries,
    /// in the exact order required by §4.7.
    pub fn column_definition(&self, column: &Column) -> String {
        let mut parts = vec![self.quote_ident(&column.name), self.format_type(column)];

        if column.is_generated && let Some(expr) = &column.generation_expression {
            let storage = match column.generation_storage {
                Some(crate::ir::GenerationStorage::Stored) => "STORED",
                _ => "VIRTUAL",
            };
            parts.push(format!("GENERATED ALWAYS AS ({expr}) {storage}"));
        }

        parts.push(if column.nullable { "NULL".to_string() } else { "NOT NULL".to_string() });

        if column.auto_increment {
            parts.push("AUTO_INCREMENT".to_string());
        }

        if let Some(mysql) = &column.mysql
            && let Some(bits) = mysql.auto_random_bits
        {
            parts.push(format!("AUTO_RANDOM({bits})"));
        }

        if self.emits_charset(column) {
            if let Some(charset) = &column.charset {
                parts.push(format!("CHARACTER SET {charset}"));
            }
            if let Some(collate) = &column.collate {
                parts.push(format!("COLLATE {collate}"));
            }
        }

        if let Some(default) = &column.default {
            parts.push(format!("DEFAULT {}", self.format_value(default)));
        }
        if let Some(on_update) = &column.on_update {
            parts.push(format!("ON UPDATE {}", self.format_value(on_update)));
        }

        if let Some(mysql) = &column.mysql {
            if let Some(fmt) = &mysql.column_format {
                parts.push(format!("COLUMN_FORMAT {fmt}"));
            }
            if let Some(storage) = &mysql.storage {
                parts.push(format!("STORAGE {storage}"));
            }
        }

        if let Some(comment) = &column.comment {
            parts.push(format!("COMMENT {}", self.quote_str(comment)));
        }

        parts.join(" ")
    }

    fn emits_charset(&self, column: &Column) -> bool {
        if column.normalized_type == NormalizedType::Binary || column.normalized_type == NormalizedType::Json {
            return false;
        }
        let (base, _) = crate::ir::column::parse_type_parts(&column.raw_type);
        TEXT_FAMILY_TYPES.contains(&base.as_str())
    }

    /// Strip a trailing `BINARY` attribute from binary/varbinary types
    /// (§4.7); the normalized type already encodes binary-ness.
    fn format_type(&self, column: &Column) -> String {
        let raw = column.raw_type.trim();
        if column.normalized_type == NormalizedType::Binary {
            let upper = raw.to_ascii_uppercase();
            if let Some(stripped) = upper.strip_suffix(" BINARY") {
                return raw[..stripped.len()].trim().to_string();
            }
        }
        raw.to_string()
    }

    /// Value formatting rules (§4.7): known unquoted tokens, bare
    /// numbers, parenthesized expressions, else single-quoted.
    fn format_value(&self, value: &str) -> String {
        let trimmed = value.trim();
        let upper = trimmed.to_ascii_uppercase();
        const KNOWN_TOKENS: &[&str] = &[
            "NULL",
            "CURRENT_TIMESTAMP",
            "CURRENT_DATE",
            "CURRENT_TIME",
            "NOW()",
            "TRUE",
            "FALSE",
        ];
        if KNOWN_TOKENS.contains(&upper.as_str()) {
            return upper;
        }
        if trimmed.parse::<f64>().is_ok() {
            return trimmed.to_string();
        }
        if trimmed.contains('(') {
            return trimmed.to_string();
        }
        self.quote_str(trimmed)
    }

    pub fn add_column(&self, table: &str, column: &Column) -> String {
        format!(
            "ALTER TABLE {} ADD COLUMN {};",
            self.quote_ident(table),
            self.column_definition(column)
        )
    }

    pub fn drop_column(&self, table: &str, column_name: &str) -> String {
        format!(
            "ALTER TABLE {} DROP COLUMN {};",
            self.quote_ident(table),
            self.quote_ident(column_name)
        )
    }

    pub fn modify_column(&self, table: &str, column: &Column) -> String {
        format!(
            "ALTER TABLE {} MODIFY COLUMN {};",
            self.quote_ident(table),
            self.column_definition(column)
        )
    }

    pub fn change_column(&self, table: &str, old_name: &str, new_column: &Column) -> String {
        format!(
            "ALTER TABLE {} CHANGE COLUMN {} {};",
            self.quote_ident(table),
            self.quote_ident(old_name),
            self.column_definition(new_column)
        )
    }

    pub fn rename_table(&self, old_name: &str, new_name: &str) -> String {
        format!("RENAME TABLE {} TO {};", self.quote_ident(old_name), self.quote_ident(new_name))
    }

    pub fn add_constraint(&self, table: &str, constraint: &Constraint) -> String {
        let cols = self.quoted_column_list(&constraint.columns);
        let body = match constraint.kind {
            ConstraintKind::PrimaryKey => format!("PRIMARY KEY ({cols})"),
            ConstraintKind::Unique => self.named(constraint, format!("UNIQUE ({cols})")),
            ConstraintKind::ForeignKey => {
                let ref_table = constraint.referenced_table.clone().unwrap_or_default();
                let ref_cols = self.quoted_column_list(&constraint.referenced_columns);
                let mut stmt = self.named(
                    constraint,
                    format!("FOREIGN KEY ({cols}) REFERENCES {} ({ref_cols})", self.quote_ident(&ref_table)),
                );
                if let Some(action) = constraint.on_delete {
                    stmt.push_str(&format!(" ON DELETE {}", action.as_str()));
                }
                if let Some(action) = constraint.on_update {
                    stmt.push_str(&format!(" ON UPDATE {}", action.as_str()));
                }
                stmt
            }
            ConstraintKind::Check => {
                let expr = constraint.check_expression.clone().unwrap_or_default();
                self.named(constraint, format!("CHECK ({expr})"))
            }
        };
        format!("ALTER TABLE {} ADD CONSTRAINT {body};", self.quote_ident(table))
    }

    fn named(&self, constraint: &Constraint, body: String) -> String {
        match &constraint.name {
            Some(name) if !name.trim().is_empty() => format!("{} {body}", self.quote_ident(name.trim())),
            _ => body,
        }
    }

    /// Drop statement for a constraint, per the dialect's DROP grammar
    /// (§4.7). Unnamed FK/UNIQUE/CHECK constraints cannot be dropped
    /// automatically and return `None`.
    pub fn drop_constraint(&self, table: &str, constraint: &Constraint) -> Option<String> {
        let table = self.quote_ident(table);
        match constraint.kind {
            ConstraintKind::PrimaryKey => Some(format!("ALTER TABLE {table} DROP PRIMARY KEY;")),
            ConstraintKind::ForeignKey => constraint
                .name
                .as_ref()
                .filter(|n| !n.trim().is_empty())
                .map(|n| format!("ALTER TABLE {table} DROP FOREIGN KEY {};", self.quote_ident(n.trim()))),
            ConstraintKind::Unique => constraint
                .name
                .as_ref()
                .filter(|n| !n.trim().is_empty())
                .map(|n| format!("ALTER TABLE {table} DROP INDEX {};", self.quote_ident(n.trim()))),
            ConstraintKind::Check => constraint
                .name
                .as_ref()
                .filter(|n| !n.trim().is_empty())
                .map(|n| format!("ALTER TABLE {table} DROP CHECK {};", self.quote_ident(n.trim()))),
        }
    }

    pub fn add_index(&self, table: &str, index: &Index) -> String {
        let kind = if index.unique { "UNIQUE INDEX" } else { "INDEX" };
        let name = index.name.clone().unwrap_or_else(|| index.match_key());
        let cols = index
            .columns
            .iter()
            .map(|c| {
                let mut s = self.quote_ident(&c.name);
                if let Some(len) = c.prefix_length {
                    s.push_str(&format!("({len})"));
                }
                if c.order == crate::ir::SortOrder::Desc {
                    s.push_str(" DESC");
                }
                s
            })
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "ALTER TABLE {} ADD {kind} {} ({cols}) USING {};",
            self.quote_ident(table),
            self.quote_ident(&name),
            index.kind.as_str()
        )
    }

    /// Unlike constraint drops, a secondary index always has a usable
    /// name: one we were given, or the one we synthesized in
    /// `add_index`. There is no unnamed-index case to refuse.
    pub fn drop_index(&self, table: &str, index: &Index) -> Option<String> {
        let name = index.name.clone().unwrap_or_else(|| index.match_key());
        Some(format!("ALTER TABLE {} DROP INDEX {};", self.quote_ident(table), self.quote_ident(&name)))
    }

    /// `None` when there is nothing to re-emit.
    pub fn table_option_statement(&self, table: &str, changes: &[TableOptionChange], use_new: bool) -> Option<String> {
        if changes.is_empty() {
            return None;
        }
        let mut fragments = Vec::new();
        for change in changes {
            let value = if use_new { &change.new } else { &change.old };
            let Some(value) = value else { continue };
            match change.key.as_str() {
                "ENGINE" => fragments.push(format!("ENGINE={value}")),
                "CHARSET" => fragments.push(format!("DEFAULT CHARSET={value}")),
                "COLLATE" => fragments.push(format!("DEFAULT COLLATE={value}")),
                "ROW_FORMAT" => fragments.push(format!("ROW_FORMAT={value}")),
                "COMMENT" => fragments.push(format!("COMMENT={}", self.quote_str(value))),
                "AUTO_INCREMENT" => fragments.push(format!("AUTO_INCREMENT={value}")),
                other => fragments.push(format!("{other}={value}")),
            }
        }
        if fragments.is_empty() {
            return None;
        }
        Some(format!("ALTER TABLE {} {};", self.quote_ident(table), fragments.join(" ")))
    }

    fn quoted_column_list(&self, columns: &[String]) -> String {
        columns.iter().map(|c| self.quote_ident(c)).collect::<Vec<_>>().join(", ")
    }
}

impl Generator for MySqlGenerator {
    fn dialect(&self) -> &'static str {
        "mysql"
    }

    fn generate_migration(&self, diff: &SchemaDiff, options: &MigrationOptions) -> Migration {
        planner::plan_migration(diff, options, self)
    }

    fn create_table(&self, table: &Table) -> (String, Vec<String>) {
        let mut lines: Vec<String> = table.columns.iter().map(|c| self.column_definition(c)).collect();

        let mut deferred_fk = Vec::new();
        for constraint in &table.constraints {
            if constraint.kind == ConstraintKind::ForeignKey {
                deferred_fk.push(self.add_constraint(&table.name, constraint));
                continue;
            }
            let cols = self.quoted_column_list(&constraint.columns);
            let body = match constraint.kind {
                ConstraintKind::PrimaryKey => format!("PRIMARY KEY ({cols})"),
                ConstraintKind::Unique => self.named(constraint, format!("UNIQUE ({cols})")),
                ConstraintKind::Check => {
                    let expr = constraint.check_expression.clone().unwrap_or_default();
                    self.named(constraint, format!("CHECK ({expr})"))
                }
                ConstraintKind::ForeignKey => unreachable!(),
            };
            lines.push(body);
        }

        let mut stmt = format!("CREATE TABLE {} (\n  {}\n)", self.quote_ident(&table.name), lines.join(",\n  "));
        if let Some(opts) = self.create_table_options(table) {
            stmt.push_str(&format!(" {opts}"));
        }
        stmt.push(';');

        (stmt, deferred_fk)
    }

    fn drop_table(&self, table: &Table) -> String {
        format!("DROP TABLE {};", self.quote_ident(&table.name))
    }

    fn alter_table(&self, table_diff: &TableDiff, options: &MigrationOptions) -> Vec<String> {
        let mut statements = Vec::new();
        for constraint in &table_diff.constraints.removed {
            if let Some(stmt) = self.drop_constraint(&table_diff.name, constraint) {
                statements.push(stmt);
            }
        }
        for index in &table_diff.indexes.removed {
            if let Some(stmt) = self.drop_index(&table_diff.name, index) {
                statements.push(stmt);
            }
        }
        for rename in &table_diff.columns.renamed {
            statements.push(self.change_column(&table_diff.name, &rename.old.name, &rename.new));
        }
        for added in &table_diff.columns.added {
            statements.push(self.add_column(&table_diff.name, added));
        }
        for modified in &table_diff.columns.modified {
            statements.push(self.modify_column(&table_diff.name, &modified.new));
        }
        for removed in &table_diff.columns.removed {
            if options.include_unsafe {
                statements.push(self.drop_column(&table_diff.name, &removed.name));
            }
        }
        if let Some(stmt) = self.table_option_statement(&table_diff.name, &table_diff.option_changes, true) {
            statements.push(stmt);
        }
        for index in &table_diff.indexes.added {
            statements.push(self.add_index(&table_diff.name, index));
        }
        for constraint in &table_diff.constraints.added {
            if constraint.kind != ConstraintKind::ForeignKey {
                statements.push(self.add_constraint(&table_diff.name, constraint));
            }
        }
        statements
    }

    fn quote_identifier(&self, name: &str) -> String {
        self.quote_ident(name)
    }

    fn quote_string(&self, value: &str) -> String {
        self.quote_str(value)
    }

    fn add_column(&self, table: &str, column: &Column) -> String {
        MySqlGenerator::add_column(self, table, column)
    }

    fn drop_column(&self, table: &str, column_name: &str) -> String {
        MySqlGenerator::drop_column(self, table, column_name)
    }

    fn modify_column(&self, table: &str, column: &Column) -> String {
        MySqlGenerator::modify_column(self, table, column)
    }

    fn change_column(&self, table: &str, old_name: &str, new_column: &Column) -> String {
        MySqlGenerator::change_column(self, table, old_name, new_column)
    }

    fn rename_table(&self, old_name: &str, new_name: &str) -> String {
        MySqlGenerator::rename_table(self, old_name, new_name)
    }

    fn add_constraint(&self, table: &str, constraint: &Constraint) -> String {
        MySqlGenerator::add_constraint(self, table, constraint)
    }

    fn drop_constraint(&self, table: &str, constraint: &Constraint) -> Option<String> {
        MySqlGenerator::drop_constraint(self, table, constraint)
    }

    fn add_index(&self, table: &str, index: &Index) -> String {
        MySqlGenerator::add_index(self, table, index)
    }

    fn drop_index(&self, table: &str, index: &Index) -> Option<String> {
        MySqlGenerator::drop_index(self, table, index)
    }

    fn table_option_statement(&self, table: &str, changes: &[TableOptionChange], use_new: bool) -> Option<String> {
        MySqlGenerator::table_option_statement(self, table, changes, use_new)
    }
}

impl MySqlGenerator {
    fn create_table_options(&self, table: &Table) -> Option<String> {
        let flat = table.options.flatten();
        if flat.is_empty() {
            return None;
        }
        let mut fragments = Vec::new();
        for (key, value) in &flat {
            match key.as_str() {
                "ENGINE" => fragments.push(format!("ENGINE={value}")),
                "CHARSET" => fragments.push(format!("DEFAULT CHARSET={value}")),
                "COLLATE" => fragments.push(format!("DEFAULT COLLATE={value}")),
                "ROW_FORMAT" => fragments.push(format!("ROW_FORMAT={value}")),
                "COMMENT" => fragments.push(format!("COMMENT={}", self.quote_str(value))),
                "AUTO_INCREMENT" => fragments.push(format!("AUTO_INCREMENT={value}")),
                other => fragments.push(format!("{other}={value}")),
            }
        }
        Some(fragments.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Column;

    #[test]
    fn quote_identifier_doubles_backticks() {
        let gen = MySqlGenerator;
        assert_eq!(gen.quote_ident("weird`name"), "`weird``name`");
    }

    #[test]
    fn quote_string_escapes_backslash_and_quote() {
        let gen = MySqlGenerator;
        assert_eq!(gen.quote_str("o'brien\\"), "'o\\'brien\\\\'");
    }

    #[test]
    fn format_value_recognizes_known_tokens() {
        let gen = MySqlGenerator;
        assert_eq!(gen.format_value("current_timestamp"), "CURRENT_TIMESTAMP");
        assert_eq!(gen.format_value("42"), "42");
        assert_eq!(gen.format_value("plain"), "'plain'");
    }

    #[test]
    fn charset_omitted_for_json_and_binary() {
        let gen = MySqlGenerator;
        let mut json_col = Column::new("payload", "JSON");
        json_col.normalized_type = NormalizedType::Json;
        json_col.charset = Some("utf8mb4".to_string());
        assert!(!gen.column_definition(&json_col).contains("CHARACTER SET"));

        let mut bin_col = Column::new("blob", "VARBINARY(16)");
        bin_col.normalized_type = NormalizedType::Binary;
        bin_col.charset = Some("binary".to_string());
        assert!(!gen.column_definition(&bin_col).contains("CHARACTER SET"));
    }

    #[test]
    fn charset_emitted_for_varchar() {
        let gen = MySqlGenerator;
        let mut col = Column::new("name", "VARCHAR(50)");
        col.charset = Some("utf8mb4".to_string());
        col.collate = Some("utf8mb4_unicode_ci".to_string());
        let def = gen.column_definition(&col);
        assert!(def.contains("CHARACTER SET utf8mb4"));
        assert!(def.contains("COLLATE utf8mb4_unicode_ci"));
    }

    #[test]
    fn strips_trailing_binary_attribute() {
        let gen = MySqlGenerator;
        let mut col = Column::new("data", "VARBINARY(16) BINARY");
        col.normalized_type = NormalizedType::Binary;
        assert_eq!(gen.format_type(&col), "VARBINARY(16)");
    }

    #[test]
    fn drop_unnamed_foreign_key_is_unresolvable() {
        let gen = MySqlGenerator;
        let fk = Constraint {
            name: None,
            kind: ConstraintKind::ForeignKey,
            columns: vec!["user_id".to_string()],
            referenced_table: Some("users".to_string()),
            referenced_columns: vec!["id".to_string()],
            on_delete: None,
            on_update: None,
            check_expression: None,
            enforced: true,
        };
        assert!(gen.drop_constraint("orders", &fk).is_none());
    }

    #[test]
    fn drop_primary_key_uses_fixed_grammar() {
        let gen = MySqlGenerator;
        let pk = Constraint::primary_key(vec!["id".to_string()]);
        assert_eq!(gen.drop_constraint("users", &pk).unwrap(), "ALTER TABLE `users` DROP PRIMARY KEY;");
    }
}
