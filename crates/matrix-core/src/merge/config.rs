//! The merged configuration accumulator

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::Result;
use crate::naming::{NameOverrides, is_partial_key, item_names_with};
use crate::options::GlobalOptions;
use crate::reference::ProductLeaf;

/// Global options table, meaningful at the config root only.
pub const GLOBAL_KEY: &str = "__config__";
/// End-of-life marker.
pub const EOL_KEY: &str = "eol";
/// Manual skip marker.
pub const SKIP_KEY: &str = "skip";
/// Free-text reason accompanying `skip`.
pub const REASON_KEY: &str = "reason";
/// Reason recorded when a skipped fragment gives none.
pub const DEFAULT_SKIP_REASON: &str = "No reason provided";

/// Whether a top-level fragment key is a directive rather than an entry.
pub fn is_reserved_key(key: &str) -> bool {
    matches!(key, GLOBAL_KEY | EOL_KEY | SKIP_KEY | REASON_KEY)
}

/// Fetch directives keyed by item name (or intermediate key), plus
/// the merged `__config__` table.
///
/// Entries are kept in key order so serializing the same merge twice gives
/// byte-identical output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MergedConfig {
    entries: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    global: Option<Value>,
}

impl MergedConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &Map<String, Value> {
        &self.entries
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The raw merged `__config__` table
    pub fn global(&self) -> Option<&Value> {
        self.global.as_ref()
    }

    /// The `__config__` table interpreted as [`GlobalOptions`]
    pub fn options(&self) -> Result<GlobalOptions> {
        GlobalOptions::from_value(self.global.as_ref())
    }

    /// Deep-merge a `__config__` table.
    pub fn merge_global(&mut self, value: &Value) {
        match self.global.as_mut() {
            Some(base) => deep_merge_value(base, value),
            None => self.global = Some(value.clone()),
        }
    }

    /// Merge one fragment's entries.
    ///
    /// Reserved keys are ignored. Two mappings under the same key merge
    /// recursively; anything else replaces the previous value. With a `leaf`,
    /// partial keys are expanded into that leaf's item names first.
    pub fn merge_fragment(&mut self, fragment: &Map<String, Value>, leaf: Option<&ProductLeaf>) {
        for (key, value) in fragment {
            if is_reserved_key(key) {
                continue;
            }

            if let Some(existing) = self.entries.get_mut(key) {
                if existing.is_object() && value.is_object() {
                    deep_merge_value(existing, value);
                    continue;
                }
            }

            match leaf {
                Some(leaf) if is_partial_key(key) => {
                    for name in item_names_with(leaf, &NameOverrides::variant(key)) {
                        tracing::trace!(%key, %name, "Expanded partial key");
                        self.entries.insert(name, value.clone());
                    }
                }
                _ => {
                    self.entries.insert(key.clone(), value.clone());
                }
            }
        }
    }

    /// Entries plus `__config__` as one table, the shape fetch engines read.
    pub fn to_value(&self) -> Value {
        let mut table = self.entries.clone();
        if let Some(global) = &self.global {
            table.insert(GLOBAL_KEY.to_string(), global.clone());
        }
        Value::Object(table)
    }
}

/// Deep merge two JSON values
///
/// If both values are objects, merge them recursively with `other` taking precedence.
/// Otherwise, `other` replaces `base`.
pub(crate) fn deep_merge_value(base: &mut Value, other: &Value) {
    match (base, other) {
        (Value::Object(base_map), Value::Object(other_map)) => {
            for (key, other_val) in other_map {
                if let Some(base_val) = base_map.get_mut(key) {
                    deep_merge_value(base_val, other_val);
                } else {
                    base_map.insert(key.clone(), other_val.clone());
                }
            }
        }
        (base, other) => {
            *base = other.clone();
        }
    }
}
