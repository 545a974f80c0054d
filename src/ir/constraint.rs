// src/ir/constraint.rs
//! Table-level constraints in the canonical schema IR.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ConstraintKind {
    #[serde(rename = "PRIMARY KEY")]
    PrimaryKey,
    #[serde(rename = "FOREIGN KEY")]
    ForeignKey,
    Unique,
    Check,
}

impl ConstraintKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PrimaryKey => "PRIMARY KEY",
            Self::ForeignKey => "FOREIGN KEY",
            Self::Unique => "UNIQUE",
            Self::Check => "CHECK",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReferentialAction {
    Cascade,
    Restrict,
    #[serde(rename = "SET NULL")]
    SetNull,
    #[serde(rename = "SET DEFAULT")]
    SetDefault,
    #[serde(rename = "NO ACTION")]
    NoAction,
}

impl ReferentialAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cascade => "CASCADE",
            Self::Restrict => "RESTRICT",
            Self::SetNull => "SET NULL",
            Self::SetDefault => "SET DEFAULT",
            Self::NoAction => "NO ACTION",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constraint {
    pub name: Option<String>,
    pub kind: ConstraintKind,
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub referenced_table: Option<String>,
    #[serde(default)]
    pub referenced_columns: Vec<String>,
    #[serde(default)]
    pub on_delete: Option<ReferentialAction>,
    #[serde(default)]
    pub on_update: Option<ReferentialAction>,
    #[serde(default)]
    pub check_expression: Option<String>,
    #[serde(default = "default_true")]
    pub enforced: bool,
}

fn default_true() -> bool {
    true
}

impl Constraint {
    pub fn primary_key(columns: Vec<String>) -> Self {
        Self {
            name: None,
            kind: ConstraintKind::PrimaryKey,
            columns,
            referenced_table: None,
            referenced_columns: Vec::new(),
            on_delete: None,
            on_update: None,
            check_expression: None,
            enforced: true,
        }
    }

    /// Matching key used by the diff engine (spec §4.2): trimmed
    /// lowercased name if non-empty, else `kind:col1,col2,...`.
    pub fn match_key(&self) -> String {
        match &self.name {
            Some(name) if !name.trim().is_empty() => name.trim().to_ascii_lowercase(),
            _ => {
                let cols = self
                    .columns
                    .iter()
                    .map(|c| c.to_ascii_lowercase())
                    .collect::<Vec<_>>()
                    .join(",");
                format!("{}:{}", self.kind.as_str(), cols)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn match_key_prefers_name() {
        let c = Constraint {
            name: Some(" fk_orders_user ".to_string()),
            ..Constraint::primary_key(vec!["user_id".to_string()])
        };
        assert_eq!(c.match_key(), "fk_orders_user");
    }

    #[test]
    fn match_key_falls_back_to_kind_and_columns() {
        let c = Constraint::primary_key(vec!["Id".to_string(), "Tenant".to_string()]);
        assert_eq!(c.match_key(), "PRIMARY KEY:id,tenant");
    }
}
