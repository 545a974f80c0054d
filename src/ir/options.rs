// src/ir/options.rs
//! Table-level options and the option flattener (spec §4.3).
//!
//! The diff engine compares table options as a flat `{KEY -> value}`
//! string map rather than hand-rolling per-field comparisons for every
//! dialect's option set. Each dialect contributes its own keys to the
//! flattened map; this module implements the common fields plus the
//! MySQL/TiDB set, since MySQL is the only dialect this crate ships a
//! full generator for (spec §1).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableOptions {
    pub engine: Option<String>,
    pub charset: Option<String>,
    pub collate: Option<String>,
    pub auto_increment: Option<u64>,
    pub row_format: Option<String>,
    pub comment: Option<String>,
    pub tablespace: Option<String>,
    /// Dialect-specific options not promoted to a named field above
    /// (e.g. MySQL `SECONDARY_ENGINE`, TiDB `TTL`/`PLACEMENT_POLICY`,
    /// or opaque carry-through values such as `PACK_KEYS`/
    /// `STATS_PERSISTENT` — see spec §9 open question). Keys are
    /// upper-case canonical names.
    #[serde(default)]
    pub extra: BTreeMap<String, String>,
}

impl TableOptions {
    /// Flatten to the comparison domain used by the diff engine.
    ///
    /// Numeric zero values are emitted as `"0"` for options that are
    /// always compared (`AUTO_INCREMENT`); options that are merely
    /// absent are omitted rather than defaulted, so that "never set"
    /// and "explicitly zero" remain distinguishable to the comparator.
    pub fn flatten(&self) -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();
        if let Some(v) = &self.engine {
            map.insert("ENGINE".to_string(), v.to_ascii_uppercase());
        }
        if let Some(v) = &self.charset {
            map.insert("CHARSET".to_string(), v.to_ascii_lowercase());
        }
        if let Some(v) = &self.collate {
            map.insert("COLLATE".to_string(), v.to_ascii_lowercase());
        }
        if let Some(v) = self.auto_increment {
            map.insert("AUTO_INCREMENT".to_string(), v.to_string());
        }
        if let Some(v) = &self.row_format {
            map.insert("ROW_FORMAT".to_string(), v.to_ascii_uppercase());
        }
        if let Some(v) = &self.comment {
            map.insert("COMMENT".to_string(), v.clone());
        }
        if let Some(v) = &self.tablespace {
            map.insert("TABLESPACE".to_string(), v.clone());
        }
        for (k, v) in &self.extra {
            map.insert(k.to_ascii_uppercase(), v.clone());
        }
        map
    }
}
