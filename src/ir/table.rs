// src/ir/table.rs
//! Table definitions in the canonical schema IR.

use serde::{Deserialize, Serialize};

use super::column::Column;
use super::constraint::Constraint;
use super::index::Index;
use super::options::TableOptions;

/// Configuration for automatically managed `created_at`/`updated_at`
/// style columns (spec §3 invariant 5).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timestamps {
    pub created_column: String,
    pub updated_column: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub options: TableOptions,
    pub columns: Vec<Column>,
    #[serde(default)]
    pub constraints: Vec<Constraint>,
    #[serde(default)]
    pub indexes: Vec<Index>,
    #[serde(default)]
    pub timestamps: Option<Timestamps>,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            comment: None,
            options: TableOptions::default(),
            columns: Vec::new(),
            constraints: Vec::new(),
            indexes: Vec::new(),
            timestamps: None,
        }
    }

    pub fn name_eq(&self, other: &str) -> bool {
        self.name.eq_ignore_ascii_case(other)
    }

    pub fn find_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name_eq(name))
    }

    /// All PRIMARY KEY constraints, whether declared explicitly or
    /// synthesized from column-level `primary_key` flags by a front-end.
    pub fn primary_key_constraints(&self) -> Vec<&Constraint> {
        use super::constraint::ConstraintKind;
        self.constraints
            .iter()
            .filter(|c| c.kind == ConstraintKind::PrimaryKey)
            .collect()
    }

    pub fn columns_with_pk_flag(&self) -> Vec<&Column> {
        self.columns.iter().filter(|c| c.primary_key).collect()
    }
}
