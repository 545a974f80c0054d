// src/ir/index.rs
//! Index definitions in the canonical schema IR.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum IndexKind {
    Btree,
    Hash,
    Fulltext,
    Spatial,
    Gin,
    Gist,
}

impl IndexKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Btree => "BTREE",
            Self::Hash => "HASH",
            Self::Fulltext => "FULLTEXT",
            Self::Spatial => "SPATIAL",
            Self::Gin => "GIN",
            Self::Gist => "GIST",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum IndexVisibility {
    Visible,
    Invisible,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexColumn {
    pub name: String,
    #[serde(default)]
    pub prefix_length: Option<u32>,
    #[serde(default = "default_asc")]
    pub order: SortOrder,
}

fn default_asc() -> SortOrder {
    SortOrder::Asc
}

impl IndexColumn {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prefix_length: None,
            order: SortOrder::Asc,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Index {
    pub name: Option<String>,
    #[serde(default)]
    pub unique: bool,
    #[serde(default = "default_btree")]
    pub kind: IndexKind,
    pub columns: Vec<IndexColumn>,
    #[serde(default = "default_visible")]
    pub visibility: IndexVisibility,
    #[serde(default)]
    pub comment: Option<String>,
}

fn default_btree() -> IndexKind {
    IndexKind::Btree
}

fn default_visible() -> IndexVisibility {
    IndexVisibility::Visible
}

impl Index {
    pub fn new(name: Option<String>, columns: Vec<IndexColumn>) -> Self {
        Self {
            name,
            unique: false,
            kind: IndexKind::Btree,
            columns,
            visibility: IndexVisibility::Visible,
            comment: None,
        }
    }

    /// Matching key used by the diff engine (spec §4.2).
    pub fn match_key(&self) -> String {
        match &self.name {
            Some(name) if !name.trim().is_empty() => name.trim().to_ascii_lowercase(),
            _ => {
                let cols = self
                    .columns
                    .iter()
                    .map(|c| c.name.to_ascii_lowercase())
                    .collect::<Vec<_>>()
                    .join(",");
                format!("idx:{}:{}:{}", self.unique, self.kind.as_str(), cols)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn match_key_unnamed_index_uses_columns() {
        let idx = Index::new(None, vec![IndexColumn::new("Email")]);
        assert_eq!(idx.match_key(), "idx:false:BTREE:email");
    }

    #[test]
    fn match_key_named_index_trims_and_lowercases() {
        let idx = Index::new(Some("  IDX_Email ".to_string()), vec![IndexColumn::new("email")]);
        assert_eq!(idx.match_key(), "idx_email");
    }
}
