// src/ir/database.rs
//! The top-level canonical schema IR value.

use serde::{Deserialize, Serialize};

use super::table::Table;

/// Optional naming rules applied to table and column names (spec §3
/// invariant 6).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamingRules {
    pub max_length: Option<usize>,
    /// Regex source; names must match this pattern in full.
    pub pattern: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Database {
    pub name: String,
    #[serde(default)]
    pub dialect: Option<String>,
    #[serde(default)]
    pub naming_rules: Option<NamingRules>,
    pub tables: Vec<Table>,
}

impl Database {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dialect: None,
            naming_rules: None,
            tables: Vec::new(),
        }
    }

    pub fn find_table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name_eq(name))
    }
}
