//! Baseline generation from the reference tree

use crate::diff::{VersionMap, VersionRecord};
use crate::naming::item_names;
use crate::reference::ReferenceTree;

/// One record per item name of every leaf that carries a baseline version.
pub fn baseline<T: ReferenceTree + ?Sized>(tree: &T) -> VersionMap {
    let mut versions = VersionMap::new();
    for leaf in tree.leaves() {
        let Some(version) = leaf.baseline_version.as_deref() else {
            continue;
        };
        for name in item_names(leaf) {
            versions.insert(name, VersionRecord::for_leaf(leaf, version));
        }
    }
    versions
}
