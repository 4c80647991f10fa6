//! Diffing baseline versions against fetched versions

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::naming::ItemName;
use crate::reference::ProductLeaf;
use crate::version;

/// A version string with optional back-references for reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRecord {
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
}

impl VersionRecord {
    /// A bare version, as returned by a fetch engine.
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            vendor: None,
            system: None,
            variant: None,
        }
    }

    /// A version attributed to a matrix leaf.
    pub fn for_leaf(leaf: &ProductLeaf, version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            vendor: Some(leaf.vendor.clone()),
            system: Some(leaf.system.clone()),
            variant: leaf.variant.clone(),
        }
    }
}

/// Versions keyed by item name.
pub type VersionMap = BTreeMap<ItemName, VersionRecord>;

/// Baseline and fetched version of one item. At least one side is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionPair {
    pub old: Option<VersionRecord>,
    pub new: Option<VersionRecord>,
}

/// Classification of a [`VersionPair`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    /// Fetched, but no baseline exists yet
    Added,
    /// Fetched version is newer than the baseline
    Updated,
    /// Baseline exists but nothing was fetched
    Missing,
    /// Fetched version is equal to or older than the baseline
    Unchanged,
}

impl std::fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Added => write!(f, "added"),
            Self::Updated => write!(f, "updated"),
            Self::Missing => write!(f, "missing"),
            Self::Unchanged => write!(f, "unchanged"),
        }
    }
}

impl VersionPair {
    pub fn kind(&self) -> ChangeKind {
        match (&self.old, &self.new) {
            (None, Some(_)) => ChangeKind::Added,
            (Some(_), None) => ChangeKind::Missing,
            (Some(old), Some(new)) if version::is_newer(&new.version, &old.version) => {
                ChangeKind::Updated
            }
            _ => ChangeKind::Unchanged,
        }
    }

    /// Whether this pair signals something to act on.
    pub fn is_update(&self) -> bool {
        matches!(self.kind(), ChangeKind::Added | ChangeKind::Updated)
    }
}

/// Options for [`diff`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffOptions {
    /// Emit pairs whose fetched version is not newer than the baseline
    pub include_unchanged: bool,
}

/// Reconcile baseline (`old`) and fetched (`new`) versions.
///
/// - in `new` only: `{old: None, new}`
/// - in both and `new` is newer: `{old, new}`
/// - in both otherwise: omitted unless `include_unchanged`
/// - in `old` only: `{old, new: None}`
pub fn diff(old: &VersionMap, new: &VersionMap, options: DiffOptions) -> BTreeMap<ItemName, VersionPair> {
    let mut result = BTreeMap::new();

    for (name, fetched) in new {
        match old.get(name) {
            None => {
                result.insert(
                    name.clone(),
                    VersionPair {
                        old: None,
                        new: Some(fetched.clone()),
                    },
                );
            }
            Some(baseline)
                if options.include_unchanged
                    || version::is_newer(&fetched.version, &baseline.version) =>
            {
                result.insert(
                    name.clone(),
                    VersionPair {
                        old: Some(baseline.clone()),
                        new: Some(fetched.clone()),
                    },
                );
            }
            Some(_) => {}
        }
    }

    for (name, baseline) in old {
        if !new.contains_key(name) {
            result.insert(
                name.clone(),
                VersionPair {
                    old: Some(baseline.clone()),
                    new: None,
                },
            );
        }
    }

    result
}
