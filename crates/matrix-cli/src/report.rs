//! Markdown update report

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write;

use matrix_core::{ChangeKind, ItemName, ManualSkip, VersionPair};
use matrix_fs::NormalizedPath;

const NO_VERSION: &str = "-";

/// Everything that goes into one report.
#[derive(Debug)]
pub struct Report<'a> {
    pub updates: &'a BTreeMap<ItemName, VersionPair>,
    pub skipped: &'a BTreeSet<NormalizedPath>,
    pub manually_skipped: &'a BTreeSet<ManualSkip>,
    /// Paths are shown relative to this directory when below it
    pub config_root: &'a NormalizedPath,
}

impl Report<'_> {
    pub fn render(&self) -> String {
        let mut out = String::from("# Update Report\n\n");

        out.push_str("## New Versions Found\n\n");
        let rows: Vec<_> = self
            .updates
            .iter()
            .filter(|(_, pair)| pair.kind() != ChangeKind::Missing)
            .collect();
        if rows.is_empty() {
            out.push_str("No new versions found.\n");
        } else {
            out.push_str("| Product Triple | Old Version | New Version |\n");
            out.push_str("| --- | --- | --- |\n");
            for (name, pair) in rows {
                let old = pair.old.as_ref().map_or(NO_VERSION, |r| r.version.as_str());
                let new = pair.new.as_ref().map_or(NO_VERSION, |r| r.version.as_str());
                let _ = writeln!(out, "| {} | {} | {} |", name, old, new);
            }
        }

        out.push_str("\n## Skipped Products\n\n");
        if self.skipped.is_empty() {
            out.push_str("None.\n");
        } else {
            out.push_str("These products have no usable config. Add one to check them.\n\n");
            out.push_str("| Path |\n");
            out.push_str("| --- |\n");
            for path in self.skipped {
                let _ = writeln!(out, "| `{}` |", self.display(path));
            }
        }

        out.push_str("\n## Manually Skipped\n\n");
        if self.manually_skipped.is_empty() {
            out.push_str("None.\n");
        } else {
            out.push_str("| Path | Reason |\n");
            out.push_str("| --- | --- |\n");
            for skip in self.manually_skipped {
                let _ = writeln!(
                    out,
                    "| `{}` | {} |",
                    self.display(&skip.path),
                    skip.reason.replace('|', "\\|").replace('\n', " ")
                );
            }
        }

        out
    }

    fn display<'p>(&self, path: &'p NormalizedPath) -> &'p str {
        let root = self.config_root.as_str().trim_end_matches('/');
        path.as_str()
            .strip_prefix(root)
            .and_then(|rest| rest.strip_prefix('/'))
            .filter(|rest| !rest.is_empty())
            .unwrap_or(path.as_str())
    }
}
