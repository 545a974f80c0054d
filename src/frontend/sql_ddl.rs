// src/frontend/sql_ddl.rs
//! Best-effort MySQL `CREATE TABLE` reader.
//!
//! This is explicitly not a SQL grammar: it handles the practical
//! subset of `CREATE TABLE` used in real schemas (columns, inline and
//! out-of-line `PRIMARY KEY`/`UNIQUE`/`FOREIGN KEY`/`CHECK`, plain
//! indexes, and the common table options). Anything it cannot make
//! sense of becomes `Error::SqlParse` naming the offending statement
//! or clause rather than a best-guess silent misparse.

use crate::error::{Error, Result};
use crate::ir::{
    Column, Constraint, ConstraintKind, Database, GenerationStorage, Index, IndexColumn, IndexKind,
    ReferentialAction, Table,
};

/// Parse one or more `CREATE TABLE` statements into a `Database`. The
/// database itself carries no name in DDL, so it is named `"schema"`.
pub fn parse(source: &str) -> Result<Database> {
    let cleaned = strip_comments(source);
    let mut db = Database::new("schema");
    db.dialect = Some("mysql".to_string());

    for statement in split_statements(&cleaned) {
        let trimmed = statement.trim();
        if trimmed.is_empty() {
            continue;
        }
        if !starts_with_keyword(trimmed, "CREATE") {
            return Err(Error::SqlParse(format!(
                "expected a CREATE TABLE statement, found: {}",
                truncate_for_message(trimmed)
            )));
        }
        db.tables.push(parse_create_table(trimmed)?);
    }

    Ok(db)
}

fn truncate_for_message(s: &str) -> String {
    if s.len() > 80 { format!("{}...", &s[..80]) } else { s.to_string() }
}

fn strip_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let bytes = source.as_bytes();
    let mut i = 0;
    let mut in_single = false;
    let mut in_back = false;
    while i < bytes.len() {
        let c = bytes[i] as char;
        if !in_single && !in_back && c == '-' && bytes.get(i + 1) == Some(&b'-') {
            while i < bytes.len() && bytes[i] != b'\n' {
                i += 1;
            }
            continue;
        }
        if !in_single && !in_back && c == '/' && bytes.get(i + 1) == Some(&b'*') {
            i += 2;
            while i < bytes.len() && !(bytes[i] == b'*' && bytes.get(i + 1) == Some(&b'/')) {
                i += 1;
            }
            i += 2;
            continue;
        }
        if c == '\'' && !in_back {
            in_single = !in_single;
        } else if c == '`' && !in_single {
            in_back = !in_back;
        }
        out.push(c);
        i += 1;
    }
    out
}

/// Split on top-level `;` — ignoring separators inside quotes or
/// parens — so a literal inside a `DEFAULT` value can't truncate a
/// statement early.
fn split_statements(source: &str) -> Vec<String> {
    split_top_level(source, ';')
}

/// Split `s` on top-level occurrences of `sep`, skipping anything
/// nested inside `(...)`, `'...'`, or `` `...` ``.
fn split_top_level(s: &str, sep: char) -> Vec<String> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut in_single = false;
    let mut in_back = false;
    let mut current = String::new();

    for c in s.chars() {
        match c {
            '\'' if !in_back => in_single = !in_single,
            '`' if !in_single => in_back = !in_back,
            '(' if !in_single && !in_back => depth += 1,
            ')' if !in_single && !in_back => depth -= 1,
            _ => {}
        }
        if c == sep && depth == 0 && !in_single && !in_back {
            parts.push(std::mem::take(&mut current));
            continue;
        }
        current.push(c);
    }
    if !current.trim().is_empty() {
        parts.push(current);
    }
    parts
}

fn starts_with_keyword(s: &str, keyword: &str) -> bool {
    s.len() >= keyword.len() && s[..keyword.len()].eq_ignore_ascii_case(keyword)
}

/// Consume a backtick-quoted or bare identifier from the front of `s`,
/// returning the identifier and the remaining text.
fn take_ident(s: &str) -> Option<(String, &str)> {
    let trimmed = s.trim_start();
    if let Some(rest) = trimmed.strip_prefix('`') {
        let end = rest.find('`')?;
        return Some((rest[..end].to_string(), &rest[end + 1..]));
    }
    let end = trimmed.find(|c: char| c.is_whitespace() || c == '(' || c == ',').unwrap_or(trimmed.len());
    if end == 0 {
        return None;
    }
    Some((trimmed[..end].to_string(), &trimmed[end..]))
}

/// Given `s` trimmed to start with `(`, return the balanced inner
/// content and whatever follows the matching `)`.
fn extract_parenthesized(s: &str) -> Option<(String, &str)> {
    let trimmed = s.trim_start();
    let rest = trimmed.strip_prefix('(')?;
    let mut depth = 1i32;
    let mut in_single = false;
    let mut in_back = false;
    for (idx, c) in rest.char_indices() {
        match c {
            '\'' if !in_back => in_single = !in_single,
            '`' if !in_single => in_back = !in_back,
            '(' if !in_single && !in_back => depth += 1,
            ')' if !in_single && !in_back => {
                depth -= 1;
                if depth == 0 {
                    return Some((rest[..idx].to_string(), &rest[idx + 1..]));
                }
            }
            _ => {}
        }
    }
    None
}

/// Consume a value expression: a quoted string, a parenthesized
/// expression, or a bare token up to the next whitespace/comma.
fn take_value(s: &str) -> Option<(String, &str)> {
    let trimmed = s.trim_start();
    if let Some(rest) = trimmed.strip_prefix('\'') {
        let mut out = String::new();
        let mut chars = rest.char_indices().peekable();
        while let Some((idx, c)) = chars.next() {
            if c == '\'' {
                if rest[idx + 1..].starts_with('\'') {
                    out.push('\'');
                    chars.next();
                    continue;
                }
                return Some((format!("'{out}'"), &rest[idx + 1..]));
            }
            out.push(c);
        }
        None
    } else if trimmed.starts_with('(') {
        extract_parenthesized(trimmed).map(|(inner, rest)| (format!("({inner})"), rest))
    } else {
        let end = trimmed
            .find(|c: char| c.is_whitespace() || c == ',' || c == ')')
            .unwrap_or(trimmed.len());
        if end == 0 {
            return None;
        }
        Some((trimmed[..end].to_string(), &trimmed[end..]))
    }
}

fn eat_keyword<'a>(s: &'a str, keyword: &str) -> Option<&'a str> {
    let trimmed = s.trim_start();
    if starts_with_keyword(trimmed, keyword) {
        let after = &trimmed[keyword.len()..];
        if after.is_empty() || after.starts_with(|c: char| c.is_whitespace() || c == '(' || c == ',') {
            return Some(after);
        }
    }
    None
}

fn parse_referential_action(token: &str) -> ReferentialAction {
    match token.to_ascii_uppercase().as_str() {
        "CASCADE" => ReferentialAction::Cascade,
        "RESTRICT" => ReferentialAction::Restrict,
        "SET NULL" => ReferentialAction::SetNull,
        "SET DEFAULT" => ReferentialAction::SetDefault,
        _ => ReferentialAction::NoAction,
    }
}

fn columns_list(inner: &str) -> Vec<String> {
    split_top_level(inner, ',')
        .into_iter()
        .filter_map(|c| take_ident(c.trim()).map(|(name, _)| name))
        .collect()
}

fn index_columns(inner: &str) -> Vec<IndexColumn> {
    split_top_level(inner, ',')
        .into_iter()
        .filter_map(|c| {
            let trimmed = c.trim();
            let (name, rest) = take_ident(trimmed)?;
            let mut col = IndexColumn::new(name);
            let rest = rest.trim_start();
            if let Some(after) = rest.strip_prefix('(') {
                if let Some(close) = after.find(')') {
                    col.prefix_length = after[..close].trim().parse().ok();
                }
            }
            if rest.to_ascii_uppercase().contains("DESC") {
                col.order = crate::ir::SortOrder::Desc;
            }
            Some(col)
        })
        .collect()
}

fn parse_create_table(stmt: &str) -> Result<Table> {
    let mut rest = &stmt[6..]; // past "CREATE"
    rest = eat_keyword(rest, "TABLE")
        .ok_or_else(|| Error::SqlParse(format!("expected TABLE after CREATE in: {}", truncate_for_message(stmt))))?;
    if let Some(after) = eat_keyword(rest.trim_start(), "IF") {
        let after = eat_keyword(after, "NOT")
            .and_then(|a| eat_keyword(a, "EXISTS"))
            .ok_or_else(|| Error::SqlParse(format!("malformed IF NOT EXISTS in: {}", truncate_for_message(stmt))))?;
        rest = after;
    }
    let (name, rest) = take_ident(rest)
        .ok_or_else(|| Error::SqlParse(format!("missing table name in: {}", truncate_for_message(stmt))))?;
    let (body, options_text) = extract_parenthesized(rest)
        .ok_or_else(|| Error::SqlParse(format!("missing column list for table {name}")))?;

    let mut table = Table::new(name.clone());
    for item in split_top_level(&body, ',') {
        let item = item.trim();
        if item.is_empty() {
            continue;
        }
        parse_table_item(&mut table, item)?;
    }

    apply_table_options(&mut table, options_text);
    Ok(table)
}

fn parse_table_item(table: &mut Table, item: &str) -> Result<()> {
    let upper_prefix: String = item.chars().take(32).collect::<String>().to_ascii_uppercase();

    if upper_prefix.starts_with("PRIMARY KEY") {
        let rest = &item[item.to_ascii_uppercase().find("PRIMARY KEY").unwrap() + "PRIMARY KEY".len()..];
        let (inner, _) = extract_parenthesized(rest)
            .ok_or_else(|| Error::SqlParse(format!("malformed PRIMARY KEY clause: {item}")))?;
        table.constraints.push(Constraint::primary_key(columns_list(&inner)));
        return Ok(());
    }

    let (constraint_name, after_constraint) = if let Some(rest) = eat_keyword(item, "CONSTRAINT") {
        let rest = rest.trim_start();
        match take_ident(rest) {
            Some((n, r)) if !starts_with_keyword(rest, "FOREIGN") && !starts_with_keyword(rest, "UNIQUE") && !starts_with_keyword(rest, "CHECK") => {
                (Some(n), r)
            }
            _ => (None, rest),
        }
    } else {
        (None, item)
    };

    if starts_with_keyword(after_constraint.trim_start(), "FOREIGN") {
        return parse_foreign_key(table, constraint_name, after_constraint);
    }
    if starts_with_keyword(after_constraint.trim_start(), "UNIQUE") {
        return parse_unique(table, constraint_name, after_constraint);
    }
    if starts_with_keyword(after_constraint.trim_start(), "CHECK") {
        return parse_check(table, constraint_name, after_constraint);
    }
    if upper_prefix.starts_with("KEY") || upper_prefix.starts_with("INDEX") {
        return parse_index(table, item);
    }

    table.columns.push(parse_column(item)?);
    Ok(())
}

fn parse_foreign_key(table: &mut Table, name: Option<String>, text: &str) -> Result<()> {
    let rest = eat_keyword(text.trim_start(), "FOREIGN")
        .and_then(|r| eat_keyword(r, "KEY"))
        .ok_or_else(|| Error::SqlParse(format!("malformed FOREIGN KEY clause: {text}")))?;
    let (cols, rest) = extract_parenthesized(rest)
        .ok_or_else(|| Error::SqlParse(format!("missing FOREIGN KEY column list: {text}")))?;
    let rest = eat_keyword(rest.trim_start(), "REFERENCES")
        .ok_or_else(|| Error::SqlParse(format!("FOREIGN KEY missing REFERENCES: {text}")))?;
    let (ref_table, rest) = take_ident(rest)
        .ok_or_else(|| Error::SqlParse(format!("FOREIGN KEY missing referenced table: {text}")))?;
    let (ref_cols, mut rest) = extract_parenthesized(rest)
        .ok_or_else(|| Error::SqlParse(format!("FOREIGN KEY missing referenced columns: {text}")))?;

    let mut on_delete = None;
    let mut on_update = None;
    loop {
        let trimmed = rest.trim_start();
        if let Some(after) = eat_keyword(trimmed, "ON") {
            let after = after.trim_start();
            if let Some(after) = eat_keyword(after, "DELETE") {
                let (token, next) = take_action(after)?;
                on_delete = Some(parse_referential_action(&token));
                rest = next;
                continue;
            }
            if let Some(after) = eat_keyword(after, "UPDATE") {
                let (token, next) = take_action(after)?;
                on_update = Some(parse_referential_action(&token));
                rest = next;
                continue;
            }
        }
        break;
    }

    table.constraints.push(Constraint {
        name,
        kind: ConstraintKind::ForeignKey,
        columns: columns_list(&cols),
        referenced_table: Some(ref_table),
        referenced_columns: columns_list(&ref_cols),
        on_delete,
        on_update,
        check_expression: None,
        enforced: true,
    });
    Ok(())
}

fn take_action(s: &str) -> Result<(String, &str)> {
    let trimmed = s.trim_start();
    if let Some(after) = eat_keyword(trimmed, "SET") {
        if let Some(rest) = eat_keyword(after.trim_start(), "NULL") {
            return Ok(("SET NULL".to_string(), rest));
        }
        if let Some(rest) = eat_keyword(after.trim_start(), "DEFAULT") {
            return Ok(("SET DEFAULT".to_string(), rest));
        }
        return Err(Error::SqlParse(format!("malformed SET action in: {s}")));
    }
    if let Some(rest) = eat_keyword(trimmed, "NO") {
        if let Some(rest) = eat_keyword(rest.trim_start(), "ACTION") {
            return Ok(("NO ACTION".to_string(), rest));
        }
    }
    let end = trimmed.find(|c: char| c.is_whitespace() || c == ',').unwrap_or(trimmed.len());
    Ok((trimmed[..end].to_string(), &trimmed[end..]))
}

fn parse_unique(table: &mut Table, name: Option<String>, text: &str) -> Result<()> {
    let mut rest = eat_keyword(text.trim_start(), "UNIQUE")
        .ok_or_else(|| Error::SqlParse(format!("malformed UNIQUE clause: {text}")))?;
    rest = eat_keyword(rest.trim_start(), "KEY").or_else(|| eat_keyword(rest.trim_start(), "INDEX")).unwrap_or(rest);
    let mut name = name;
    let rest = rest.trim_start();
    let rest = if !rest.starts_with('(') {
        match take_ident(rest) {
            Some((n, r)) => {
                name = name.or(Some(n));
                r
            }
            None => rest,
        }
    } else {
        rest
    };
    let (cols, _) =
        extract_parenthesized(rest).ok_or_else(|| Error::SqlParse(format!("missing UNIQUE column list: {text}")))?;
    table.constraints.push(Constraint {
        name,
        kind: ConstraintKind::Unique,
        columns: columns_list(&cols),
        referenced_table: None,
        referenced_columns: Vec::new(),
        on_delete: None,
        on_update: None,
        check_expression: None,
        enforced: true,
    });
    Ok(())
}

fn parse_check(table: &mut Table, name: Option<String>, text: &str) -> Result<()> {
    let rest = eat_keyword(text.trim_start(), "CHECK")
        .ok_or_else(|| Error::SqlParse(format!("malformed CHECK clause: {text}")))?;
    let (expr, _) =
        extract_parenthesized(rest).ok_or_else(|| Error::SqlParse(format!("missing CHECK expression: {text}")))?;
    table.constraints.push(Constraint {
        name,
        kind: ConstraintKind::Check,
        columns: Vec::new(),
        referenced_table: None,
        referenced_columns: Vec::new(),
        on_delete: None,
        on_update: None,
        check_expression: Some(expr),
        enforced: true,
    });
    Ok(())
}

fn parse_index(table: &mut Table, item: &str) -> Result<()> {
    let rest = eat_keyword(item.trim_start(), "KEY").or_else(|| eat_keyword(item.trim_start(), "INDEX"));
    let mut rest = rest.ok_or_else(|| Error::SqlParse(format!("malformed index clause: {item}")))?;
    let mut name = None;
    let trimmed = rest.trim_start();
    if !trimmed.starts_with('(') {
        if let Some((n, r)) = take_ident(trimmed) {
            name = Some(n);
            rest = r;
        }
    }
    let (cols, rest) =
        extract_parenthesized(rest).ok_or_else(|| Error::SqlParse(format!("missing index column list: {item}")))?;
    let mut index = Index::new(name, index_columns(&cols));
    if rest.to_ascii_uppercase().contains("USING HASH") {
        index.kind = IndexKind::Hash;
    }
    table.indexes.push(index);
    Ok(())
}

/// Find the end of a type token such as `VARCHAR(255)` or
/// `DECIMAL(10, 2)`: the first whitespace/comma that is not nested
/// inside a parenthesized argument list.
fn type_token_end(rest: &str) -> usize {
    let mut depth = 0i32;
    for (idx, c) in rest.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth -= 1,
            c if depth == 0 && (c.is_whitespace() || c == ',') => return idx,
            _ => {}
        }
    }
    rest.len()
}

fn parse_column(item: &str) -> Result<Column> {
    let (name, rest) =
        take_ident(item).ok_or_else(|| Error::SqlParse(format!("missing column name in: {item}")))?;
    let rest = rest.trim_start();
    let type_end = type_token_end(rest);
    let mut raw_type = rest[..type_end].trim().to_string();
    let mut remainder = rest[type_end..].trim_start();

    // UNSIGNED / ZEROFILL suffixes belong to the type text.
    loop {
        if let Some(after) = eat_keyword(remainder, "UNSIGNED") {
            raw_type.push_str(" UNSIGNED");
            remainder = after.trim_start();
            continue;
        }
        if let Some(after) = eat_keyword(remainder, "ZEROFILL") {
            raw_type.push_str(" ZEROFILL");
            remainder = after.trim_start();
            continue;
        }
        break;
    }

    let mut column = Column::new(name, raw_type);
    column.normalized_type = normalize_type(&column.raw_type);

    loop {
        let trimmed = remainder.trim_start();
        if trimmed.is_empty() {
            break;
        }
        if let Some(after) = eat_keyword(trimmed, "NOT") {
            if let Some(after) = eat_keyword(after.trim_start(), "NULL") {
                column.nullable = false;
                remainder = after;
                continue;
            }
        }
        if let Some(after) = eat_keyword(trimmed, "NULL") {
            column.nullable = true;
            remainder = after;
            continue;
        }
        if let Some(after) = eat_keyword(trimmed, "AUTO_INCREMENT") {
            column.auto_increment = true;
            remainder = after;
            continue;
        }
        if let Some(after) = eat_keyword(trimmed, "PRIMARY") {
            if let Some(after) = eat_keyword(after.trim_start(), "KEY") {
                column.primary_key = true;
                remainder = after;
                continue;
            }
        }
        if let Some(after) = eat_keyword(trimmed, "DEFAULT") {
            let (value, after) = take_value(after.trim_start())
                .ok_or_else(|| Error::SqlParse(format!("malformed DEFAULT value: {item}")))?;
            column.default = Some(strip_outer_quotes(&value));
            remainder = after;
            continue;
        }
        if let Some(after) = eat_keyword(trimmed, "ON") {
            if let Some(after) = eat_keyword(after.trim_start(), "UPDATE") {
                let (value, after) = take_value(after.trim_start())
                    .ok_or_else(|| Error::SqlParse(format!("malformed ON UPDATE value: {item}")))?;
                column.on_update = Some(strip_outer_quotes(&value));
                remainder = after;
                continue;
            }
        }
        if let Some(after) = eat_keyword(trimmed, "CHARACTER") {
            if let Some(after) = eat_keyword(after.trim_start(), "SET") {
                let (value, after) = take_value(after.trim_start())
                    .ok_or_else(|| Error::SqlParse(format!("malformed CHARACTER SET value: {item}")))?;
                column.charset = Some(value);
                remainder = after;
                continue;
            }
        }
        if let Some(after) = eat_keyword(trimmed, "COLLATE") {
            let (value, after) = take_value(after.trim_start())
                .ok_or_else(|| Error::SqlParse(format!("malformed COLLATE value: {item}")))?;
            column.collate = Some(value);
            remainder = after;
            continue;
        }
        if let Some(after) = eat_keyword(trimmed, "COMMENT") {
            let (value, after) = take_value(after.trim_start())
                .ok_or_else(|| Error::SqlParse(format!("malformed COMMENT value: {item}")))?;
            column.comment = Some(strip_outer_quotes(&value));
            remainder = after;
            continue;
        }
        if let Some(after) = eat_keyword(trimmed, "GENERATED") {
            let after = eat_keyword(after.trim_start(), "ALWAYS")
                .and_then(|a| eat_keyword(a.trim_start(), "AS"))
                .ok_or_else(|| Error::SqlParse(format!("malformed GENERATED ALWAYS AS clause: {item}")))?;
            let (expr, after) = extract_parenthesized(after.trim_start())
                .ok_or_else(|| Error::SqlParse(format!("missing generated column expression: {item}")))?;
            column.is_generated = true;
            column.generation_expression = Some(expr);
            let after = after.trim_start();
            if let Some(rest) = eat_keyword(after, "STORED") {
                column.generation_storage = Some(GenerationStorage::Stored);
                remainder = rest;
            } else if let Some(rest) = eat_keyword(after, "VIRTUAL") {
                column.generation_storage = Some(GenerationStorage::Virtual);
                remainder = rest;
            } else {
                column.generation_storage = Some(GenerationStorage::Virtual);
                remainder = after;
            }
            continue;
        }
        // Unrecognized trailing token: best-effort, stop scanning rather
        // than erroring on dialect attributes this reader doesn't model.
        break;
    }

    Ok(column)
}

fn strip_outer_quotes(s: &str) -> String {
    if let Some(inner) = s.strip_prefix('\'').and_then(|r| r.strip_suffix('\'')) {
        inner.replace("''", "'")
    } else {
        s.to_string()
    }
}

pub(crate) fn normalize_type(raw_type: &str) -> crate::ir::NormalizedType {
    use crate::ir::NormalizedType;
    let (base, _) = crate::ir::column::parse_type_parts(raw_type);
    match base.as_str() {
        "tinyint" | "smallint" | "mediumint" | "int" | "integer" | "bigint" | "bigint unsigned" => NormalizedType::Int,
        "float" | "double" | "decimal" | "numeric" => NormalizedType::Float,
        "bool" | "boolean" => NormalizedType::Boolean,
        "date" | "datetime" | "timestamp" | "time" | "year" => NormalizedType::Datetime,
        "json" => NormalizedType::Json,
        "binary" | "varbinary" | "blob" | "tinyblob" | "mediumblob" | "longblob" => NormalizedType::Binary,
        "char" | "varchar" | "tinytext" | "text" | "mediumtext" | "longtext" | "enum" | "set" => NormalizedType::String,
        _ => NormalizedType::Unknown,
    }
}

fn apply_table_options(table: &mut Table, options_text: &str) {
    let normalized = options_text.replace("DEFAULT ", "").replace("default ", "");
    let mut rest = normalized.as_str();
    loop {
        let trimmed = rest.trim_start();
        if trimmed.is_empty() {
            break;
        }
        if let Some(value_part) = trimmed.strip_prefix("ENGINE=").or_else(|| trimmed.strip_prefix("engine=")) {
            let (value, after) = take_bare_or_quoted(value_part);
            table.options.engine = Some(value);
            rest = after;
        } else if let Some(value_part) =
            trimmed.strip_prefix("CHARSET=").or_else(|| trimmed.strip_prefix("charset="))
        {
            let (value, after) = take_bare_or_quoted(value_part);
            table.options.charset = Some(value);
            rest = after;
        } else if let Some(value_part) =
            trimmed.strip_prefix("COLLATE=").or_else(|| trimmed.strip_prefix("collate="))
        {
            let (value, after) = take_bare_or_quoted(value_part);
            table.options.collate = Some(value);
            rest = after;
        } else if let Some(value_part) =
            trimmed.strip_prefix("ROW_FORMAT=").or_else(|| trimmed.strip_prefix("row_format="))
        {
            let (value, after) = take_bare_or_quoted(value_part);
            table.options.row_format = Some(value);
            rest = after;
        } else if let Some(value_part) =
            trimmed.strip_prefix("AUTO_INCREMENT=").or_else(|| trimmed.strip_prefix("auto_increment="))
        {
            let (value, after) = take_bare_or_quoted(value_part);
            table.options.auto_increment = value.parse().ok();
            rest = after;
        } else if let Some(value_part) =
            trimmed.strip_prefix("COMMENT=").or_else(|| trimmed.strip_prefix("comment="))
        {
            let (value, after) = take_value(value_part).unwrap_or((String::new(), ""));
            table.options.comment = Some(strip_outer_quotes(&value));
            rest = after;
        } else {
            // Unrecognized table option: skip one whitespace-delimited token.
            let end = trimmed.find(char::is_whitespace).unwrap_or(trimmed.len());
            if end == 0 {
                break;
            }
            rest = &trimmed[end..];
        }
    }
}

fn take_bare_or_quoted(s: &str) -> (String, &str) {
    take_value(s).unwrap_or_else(|| (String::new(), s))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_basic_table_with_primary_key() {
        let sql = r#"
            CREATE TABLE `users` (
              `id` BIGINT UNSIGNED NOT NULL AUTO_INCREMENT,
              `email` VARCHAR(255) NOT NULL,
              `created_at` DATETIME DEFAULT CURRENT_TIMESTAMP,
              PRIMARY KEY (`id`)
            ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4;
        "#;
        let db = parse(sql).unwrap();
        assert_eq!(db.tables.len(), 1);
        let table = &db.tables[0];
        assert_eq!(table.name, "users");
        assert_eq!(table.columns.len(), 3);
        assert!(table.columns[0].auto_increment);
        assert!(!table.columns[0].nullable);
        assert_eq!(table.constraints.len(), 1);
        assert_eq!(table.constraints[0].kind, ConstraintKind::PrimaryKey);
        assert_eq!(table.options.engine.as_deref(), Some("InnoDB"));
        assert_eq!(table.options.charset.as_deref(), Some("utf8mb4"));
    }

    #[test]
    fn parses_foreign_key_with_referential_actions() {
        let sql = r#"
            CREATE TABLE `orders` (
              `id` BIGINT UNSIGNED NOT NULL,
              `user_id` BIGINT UNSIGNED NOT NULL,
              CONSTRAINT `fk_orders_user` FOREIGN KEY (`user_id`) REFERENCES `users` (`id`) ON DELETE CASCADE ON UPDATE RESTRICT
            );
        "#;
        let db = parse(sql).unwrap();
        let table = &db.tables[0];
        assert_eq!(table.constraints.len(), 1);
        let fk = &table.constraints[0];
        assert_eq!(fk.kind, ConstraintKind::ForeignKey);
        assert_eq!(fk.name.as_deref(), Some("fk_orders_user"));
        assert_eq!(fk.referenced_table.as_deref(), Some("users"));
        assert_eq!(fk.on_delete, Some(ReferentialAction::Cascade));
        assert_eq!(fk.on_update, Some(ReferentialAction::Restrict));
    }

    #[test]
    fn parses_unique_and_plain_indexes() {
        let sql = r#"
            CREATE TABLE `users` (
              `id` BIGINT UNSIGNED NOT NULL,
              `email` VARCHAR(255) NOT NULL,
              `status` VARCHAR(20) NOT NULL,
              UNIQUE KEY `idx_email` (`email`),
              KEY `idx_status` (`status`)
            );
        "#;
        let db = parse(sql).unwrap();
        let table = &db.tables[0];
        assert_eq!(table.constraints.len(), 1);
        assert_eq!(table.constraints[0].kind, ConstraintKind::Unique);
        assert_eq!(table.indexes.len(), 1);
        assert_eq!(table.indexes[0].name.as_deref(), Some("idx_status"));
    }

    #[test]
    fn parses_generated_column() {
        let sql = r#"
            CREATE TABLE `t` (
              `a` INT NOT NULL,
              `b` INT GENERATED ALWAYS AS (`a` * 2) STORED
            );
        "#;
        let db = parse(sql).unwrap();
        let col = &db.tables[0].columns[1];
        assert!(col.is_generated);
        assert_eq!(col.generation_expression.as_deref(), Some("`a` * 2"));
    }

    #[test]
    fn non_create_table_statement_is_sql_parse_error() {
        let result = parse("SELECT 1;");
        assert!(matches!(result, Err(Error::SqlParse(_))));
    }

    #[test]
    fn comments_are_stripped() {
        let sql = r#"
            -- users table
            CREATE TABLE `users` (
              /* primary key */
              `id` INT NOT NULL,
              PRIMARY KEY (`id`)
            );
        "#;
        let db = parse(sql).unwrap();
        assert_eq!(db.tables[0].columns.len(), 1);
    }
}
