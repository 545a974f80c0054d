// src/ir/column.rs
//! Column definitions in the canonical schema IR.

use serde::{Deserialize, Serialize};

/// Dialect-agnostic normalization of a column's raw type text.
///
/// This is a coarse bucket used by the diff engine and risk analyzer for
/// widening/narrowing decisions; the authoritative type text is always
/// `raw_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalizedType {
    String,
    Int,
    Float,
    Boolean,
    Datetime,
    Json,
    Uuid,
    Binary,
    Unknown,
}

impl NormalizedType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Int => "int",
            Self::Float => "float",
            Self::Boolean => "boolean",
            Self::Datetime => "datetime",
            Self::Json => "json",
            Self::Uuid => "uuid",
            Self::Binary => "binary",
            Self::Unknown => "unknown",
        }
    }
}

/// Storage mode of a generated column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GenerationStorage {
    Virtual,
    Stored,
}

/// MySQL/TiDB-specific column attributes. Additive and opaque to the
/// diff engine except via equality (spec §3).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MySqlColumnExtra {
    /// `COLUMN_FORMAT {FIXED|DYNAMIC|DEFAULT}`
    pub column_format: Option<String>,
    /// `STORAGE {DISK|MEMORY}`
    pub storage: Option<String>,
    /// TiDB `AUTO_RANDOM(n)` bit width, when set.
    pub auto_random_bits: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    /// Dialect-textual type, e.g. `"VARCHAR(255)"`.
    pub raw_type: String,
    pub normalized_type: NormalizedType,
    pub nullable: bool,
    pub primary_key: bool,
    pub auto_increment: bool,
    pub default: Option<String>,
    pub on_update: Option<String>,
    pub charset: Option<String>,
    pub collate: Option<String>,
    pub comment: Option<String>,
    pub is_generated: bool,
    pub generation_expression: Option<String>,
    pub generation_storage: Option<GenerationStorage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mysql: Option<MySqlColumnExtra>,
}

impl Column {
    pub fn new(name: impl Into<String>, raw_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            raw_type: raw_type.into(),
            normalized_type: NormalizedType::Unknown,
            nullable: true,
            primary_key: false,
            auto_increment: false,
            default: None,
            on_update: None,
            charset: None,
            collate: None,
            comment: None,
            is_generated: false,
            generation_expression: None,
            generation_storage: None,
            mysql: None,
        }
    }

    pub fn name_eq(&self, other: &str) -> bool {
        self.name.eq_ignore_ascii_case(other)
    }
}

/// Parse `(base, length)` out of a raw type token such as `VARCHAR(255)`.
///
/// Returns the lowercased base type and the length argument if present.
/// Used by the risk analyzer to decide whether a type change is really
/// just a length change on a length-sensitive base type (spec §4.4).
pub fn parse_type_parts(raw_type: &str) -> (String, Option<i64>) {
    let trimmed = raw_type.trim();
    match trimmed.find('(') {
        Some(open) => {
            let base = trimmed[..open].trim().to_ascii_lowercase();
            let rest = &trimmed[open + 1..];
            let close = rest.find(')').unwrap_or(rest.len());
            let inner = &rest[..close];
            // For types like decimal(10,2) take the first numeric component.
            let first = inner.split(',').next().unwrap_or("").trim();
            let len = first.parse::<i64>().ok();
            (base, len)
        }
        None => (trimmed.to_ascii_lowercase(), None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_length_from_varchar() {
        assert_eq!(parse_type_parts("VARCHAR(255)"), ("varchar".to_string(), Some(255)));
    }

    #[test]
    fn parses_decimal_precision_only() {
        assert_eq!(parse_type_parts("DECIMAL(10,2)"), ("decimal".to_string(), Some(10)));
    }

    #[test]
    fn parses_bare_type() {
        assert_eq!(parse_type_parts("BIGINT UNSIGNED"), ("bigint unsigned".to_string(), None));
    }

    #[test]
    fn name_eq_is_case_insensitive() {
        let col = Column::new("Email", "VARCHAR(255)");
        assert!(col.name_eq("email"));
        assert!(col.name_eq("EMAIL"));
    }
}
