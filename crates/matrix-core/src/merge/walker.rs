//! Lock-step traversal of the config and reference trees

use std::collections::{BTreeSet, HashSet, VecDeque};

use matrix_fs::io::{self, EntryKind};
use matrix_fs::{ConfigFile, FragmentStore, NormalizedPath, is_reserved_dir};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::config::{DEFAULT_SKIP_REASON, EOL_KEY, GLOBAL_KEY, MergedConfig, REASON_KEY, SKIP_KEY};
use crate::reference::ReferenceTree;
use crate::{Error, Result};

/// A directory excluded on purpose, with the reason its fragment gives.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ManualSkip {
    pub path: NormalizedPath,
    pub reason: String,
}

/// Result of one merge run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MergeOutcome {
    pub config: MergedConfig,
    /// Unrecognized, empty or malformed files, config directories missing
    /// for configurable matrix directories, and directories with nothing
    /// configured anywhere below them
    pub skipped: BTreeSet<NormalizedPath>,
    pub manually_skipped: BTreeSet<ManualSkip>,
}

/// One pending directory pair of the traversal.
#[derive(Debug, Clone)]
struct PendingDir {
    config_dir: NormalizedPath,
    reference_dir: NormalizedPath,
    /// Segments from the roots, identical on both sides
    rel: Vec<String>,
}

/// What a directory's fragment amounted to.
enum Fragment {
    /// Nothing usable, nothing recorded beyond `skipped`
    Unusable,
    /// Merged into the accumulator
    Merged,
    /// `eol` or `skip`: stop here
    Pruned,
}

/// Folds the fragments of a configuration tree into one [`MergedConfig`],
/// guided by the reference tree.
///
/// Traversal is breadth-first with sorted listings, so parents merge before
/// children and siblings merge in name order. Running it twice over
/// unchanged trees yields identical outcomes.
pub struct ConfigTreeMerger<'a, T: ReferenceTree + ?Sized> {
    config_root: NormalizedPath,
    tree: &'a T,
    store: FragmentStore,
}

impl<'a, T: ReferenceTree + ?Sized> ConfigTreeMerger<'a, T> {
    pub fn new(config_root: NormalizedPath, tree: &'a T) -> Self {
        Self {
            config_root,
            tree,
            store: FragmentStore::new(),
        }
    }

    /// Walk both trees and merge every reachable fragment.
    ///
    /// Only a missing config root or an unreadable directory is an error;
    /// bad fragments are logged and end up in `skipped`.
    pub fn merge(&self) -> Result<MergeOutcome> {
        if !self.config_root.is_dir() {
            return Err(Error::ConfigNotFound {
                path: self.config_root.to_native(),
            });
        }

        let mut queue = VecDeque::from([PendingDir {
            config_dir: self.config_root.clone(),
            reference_dir: self.tree.root().clone(),
            rel: Vec::new(),
        }]);
        let mut visited = HashSet::new();
        let mut state = MergeOutcome::default();

        while let Some(dir) = queue.pop_front() {
            if !visited.insert(dir.reference_dir.canonical()) {
                tracing::warn!(dir = %dir.reference_dir, "Matrix directory reached twice, not descending again");
                continue;
            }
            let (next, children) = self.visit(state, &dir)?;
            state = next;
            queue.extend(children);
        }

        tracing::debug!(
            entries = state.config.len(),
            skipped = state.skipped.len(),
            manually_skipped = state.manually_skipped.len(),
            "Merged config tree"
        );
        Ok(state)
    }

    /// Process one directory pair, returning the updated state and the
    /// child pairs to visit.
    fn visit(&self, mut state: MergeOutcome, dir: &PendingDir) -> Result<(MergeOutcome, Vec<PendingDir>)> {
        tracing::debug!(config = %dir.config_dir, "Visiting");

        let mut recognized = Vec::new();
        let mut clutter = Vec::new();
        for (name, kind) in io::list_dir(&dir.config_dir)? {
            if kind != EntryKind::File {
                continue;
            }
            match ConfigFile::from_file_name(&name) {
                Some(file) => recognized.push(file),
                None => clutter.push(dir.config_dir.join(&name)),
            }
        }
        recognized.sort();

        let mut files = recognized.into_iter();
        let fragment = match files.next() {
            Some(file) => self.apply_fragment(&mut state, dir, file),
            None => Fragment::Unusable,
        };
        if let Fragment::Pruned = fragment {
            return Ok((state, Vec::new()));
        }

        for extra in files {
            let path = dir.config_dir.join(extra.as_str());
            tracing::warn!(%path, "Another config file takes precedence in this directory, ignoring");
            state.skipped.insert(path);
        }
        state.skipped.extend(clutter);

        let children = self.children(&mut state, dir)?;

        if !matches!(fragment, Fragment::Merged) && children.is_empty() {
            state.skipped.insert(dir.config_dir.clone());
        }
        Ok((state, children))
    }

    fn apply_fragment(&self, state: &mut MergeOutcome, dir: &PendingDir, file: ConfigFile) -> Fragment {
        let path = dir.config_dir.join(file.as_str());

        let value = match self.store.load_value(&path, file.format()) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!(%path, error = %e, "Failed to parse config file");
                state.skipped.insert(path);
                return Fragment::Unusable;
            }
        };

        let leaf = self.tree.leaf_at(&dir.rel);
        if leaf.is_some_and(|leaf| leaf.is_embedded) {
            tracing::debug!(%path, "Embedded system, not merging");
            return Fragment::Unusable;
        }

        let table = match value {
            Value::Object(table) if !table.is_empty() => table,
            _ => {
                tracing::warn!(%path, "Config file is empty, skipping");
                state.skipped.insert(path);
                return Fragment::Unusable;
            }
        };

        if flag(&table, EOL_KEY) {
            tracing::debug!(%path, "End of life, pruning subtree");
            return Fragment::Pruned;
        }
        if flag(&table, SKIP_KEY) {
            let reason = table
                .get(REASON_KEY)
                .and_then(Value::as_str)
                .filter(|r| !r.is_empty())
                .unwrap_or(DEFAULT_SKIP_REASON)
                .to_string();
            tracing::info!(%path, %reason, "Skipping config");
            state.manually_skipped.insert(ManualSkip {
                path: dir.config_dir.clone(),
                reason,
            });
            return Fragment::Pruned;
        }

        if let Some(global) = table.get(GLOBAL_KEY) {
            if dir.rel.is_empty() {
                state.config.merge_global(global);
            } else {
                tracing::warn!(%path, "{GLOBAL_KEY} is only honoured at the config root, ignoring");
            }
        }
        state.config.merge_fragment(&table, leaf);
        Fragment::Merged
    }

    /// Configurable reference subdirectories whose config counterpart
    /// exists. Missing counterparts are recorded in `skipped`.
    fn children(&self, state: &mut MergeOutcome, dir: &PendingDir) -> Result<Vec<PendingDir>> {
        let mut children = Vec::new();

        for (name, kind) in io::list_dir(&dir.reference_dir)? {
            if kind != EntryKind::Dir || is_reserved_dir(&name) {
                continue;
            }
            let mut rel = dir.rel.clone();
            rel.push(name.clone());

            if self.tree.all_embedded_under(&rel) {
                tracing::trace!(dir = %dir.reference_dir.join(&name), "Nothing to check below, not descending");
                continue;
            }

            let config_dir = dir.config_dir.join(&name);
            if !config_dir.is_dir() {
                tracing::debug!(%config_dir, "No config directory");
                state.skipped.insert(config_dir);
                continue;
            }

            children.push(PendingDir {
                config_dir,
                reference_dir: dir.reference_dir.join(&name),
                rel,
            });
        }
        Ok(children)
    }
}

fn flag(table: &Map<String, Value>, key: &str) -> bool {
    table.get(key).and_then(Value::as_bool).unwrap_or(false)
}
