//! Reference tree: the support matrix as a set of product leaves.
//!
//! The matrix is a directory hierarchy (`vendor/board/system/...`). A
//! directory is a leaf when it holds a product descriptor (`product.toml`,
//! `product.yaml`, `product.yml` or `product.json`):
//!
//! ```toml
//! vendor = "sifive"
//! system = "debian"
//! variant = "desktop"              # optional, "null" when absent
//! board_variants = ["unmatched"]   # optional
//! version = "12.5"                 # optional baseline
//! ```
//!
//! An optional `matrix.toml` at the root lists systems that are never
//! version-checked:
//!
//! ```toml
//! embedded = ["freertos", "zephyr"]
//! ```

use std::collections::{BTreeMap, BTreeSet, HashSet, VecDeque};

use matrix_fs::io::{self, EntryKind};
use matrix_fs::{DescriptorFile, FragmentStore, MATRIX_MANIFEST, NormalizedPath, is_reserved_dir};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Error, Result};

/// One trackable image of the support matrix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductLeaf {
    pub vendor: String,
    pub system: String,
    pub variant: Option<String>,
    pub board_variants: Vec<String>,
    /// Directory segments from the matrix root to this leaf
    pub path: Vec<String>,
    pub baseline_version: Option<String>,
    /// Leaves whose system is never version-checked
    pub is_embedded: bool,
}

/// Read access to the reference tree used by baseline generation and the
/// config tree merger.
pub trait ReferenceTree {
    /// Root directory of the reference tree on disk
    fn root(&self) -> &NormalizedPath;

    /// All leaves, sorted by path
    fn leaves(&self) -> &[ProductLeaf];

    /// Whether a system is never version-checked
    fn is_embedded(&self, system: &str) -> bool;

    /// The leaf located exactly at `path`, if any
    fn leaf_at(&self, path: &[String]) -> Option<&ProductLeaf> {
        self.leaves().iter().find(|leaf| leaf.path == path)
    }

    /// Whether every leaf at or below `prefix` is embedded.
    ///
    /// True when no leaf lives there at all: such a directory has nothing
    /// to configure.
    fn all_embedded_under(&self, prefix: &[String]) -> bool {
        self.leaves()
            .iter()
            .filter(|leaf| leaf.path.starts_with(prefix))
            .all(|leaf| leaf.is_embedded)
    }
}

#[derive(Debug, Default, Deserialize)]
struct MatrixManifest {
    #[serde(default)]
    embedded: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ProductDescriptor {
    vendor: String,
    system: String,
    #[serde(default)]
    variant: Option<String>,
    #[serde(default)]
    board_variants: Vec<String>,
    #[serde(default, deserialize_with = "version_string")]
    version: Option<String>,
}

/// Unquoted versions (`version: 22.04`, `version = 12`) arrive as numbers.
fn version_string<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Option<String>, D::Error> {
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(version)) => Ok(Some(version)),
        Some(Value::Number(version)) => Ok(Some(version.to_string())),
        Some(other) => Err(de::Error::custom(format!(
            "invalid version {other}, expected a string or a number"
        ))),
    }
}

/// In-memory index of the matrix tree.
#[derive(Debug, Clone)]
pub struct MatrixIndex {
    root: NormalizedPath,
    leaves: Vec<ProductLeaf>,
    by_path: BTreeMap<Vec<String>, usize>,
    embedded: BTreeSet<String>,
}

impl MatrixIndex {
    /// Build an index from already-known leaves.
    ///
    /// Each leaf's `is_embedded` flag is recomputed from `embedded`.
    pub fn from_leaves(
        root: NormalizedPath,
        leaves: impl IntoIterator<Item = ProductLeaf>,
        embedded: impl IntoIterator<Item = String>,
    ) -> Self {
        let embedded: BTreeSet<String> = embedded.into_iter().collect();
        let mut leaves: Vec<ProductLeaf> = leaves
            .into_iter()
            .map(|mut leaf| {
                leaf.is_embedded = embedded.contains(&leaf.system);
                leaf
            })
            .collect();
        leaves.sort_by(|a, b| a.path.cmp(&b.path));

        let by_path = leaves
            .iter()
            .enumerate()
            .map(|(i, leaf)| (leaf.path.clone(), i))
            .collect();

        Self {
            root,
            leaves,
            by_path,
            embedded,
        }
    }

    /// Scan a matrix directory for product descriptors.
    ///
    /// Reserved directories are not entered and symlink cycles are visited
    /// once. A malformed descriptor is an error: the matrix is the source of
    /// truth for the whole run.
    pub fn load(root: &NormalizedPath) -> Result<Self> {
        if !root.is_dir() {
            return Err(Error::MatrixNotFound {
                path: root.to_native(),
            });
        }
        let store = FragmentStore::new();

        let manifest_path = root.join(MATRIX_MANIFEST);
        let manifest: MatrixManifest = if manifest_path.is_file() {
            store.load(&manifest_path)?
        } else {
            MatrixManifest::default()
        };

        let mut leaves = Vec::new();
        let mut visited = HashSet::new();
        let mut pending = VecDeque::from([(root.clone(), Vec::<String>::new())]);

        while let Some((dir, rel)) = pending.pop_front() {
            if !visited.insert(dir.canonical()) {
                tracing::warn!(%dir, "Matrix directory already visited, skipping cycle");
                continue;
            }

            if let Some(descriptor) = DescriptorFile::find_in(&dir.to_native()) {
                let path = dir.join(descriptor.as_str());
                tracing::debug!(%path, "Loading product descriptor");
                let parsed: ProductDescriptor = store.load(&path)?;
                if parsed.vendor.is_empty() || parsed.system.is_empty() {
                    return Err(Error::InvalidDescriptor {
                        path: path.to_native(),
                        message: "vendor and system must not be empty".into(),
                    });
                }
                leaves.push(ProductLeaf {
                    vendor: parsed.vendor,
                    system: parsed.system,
                    variant: parsed.variant,
                    board_variants: parsed.board_variants,
                    path: rel.clone(),
                    baseline_version: parsed.version,
                    is_embedded: false,
                });
            }

            for (name, kind) in io::list_dir(&dir)? {
                if kind != EntryKind::Dir || is_reserved_dir(&name) {
                    continue;
                }
                let mut child_rel = rel.clone();
                child_rel.push(name.clone());
                pending.push_back((dir.join(&name), child_rel));
            }
        }

        tracing::debug!(leaves = leaves.len(), "Indexed matrix");
        Ok(Self::from_leaves(root.clone(), leaves, manifest.embedded))
    }

    /// Systems configured as embedded
    pub fn embedded_systems(&self) -> &BTreeSet<String> {
        &self.embedded
    }
}

impl ReferenceTree for MatrixIndex {
    fn root(&self) -> &NormalizedPath {
        &self.root
    }

    fn leaves(&self) -> &[ProductLeaf] {
        &self.leaves
    }

    fn is_embedded(&self, system: &str) -> bool {
        self.embedded.contains(system)
    }

    fn leaf_at(&self, path: &[String]) -> Option<&ProductLeaf> {
        self.by_path.get(path).map(|&i| &self.leaves[i])
    }
}
