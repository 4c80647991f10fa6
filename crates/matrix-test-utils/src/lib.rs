//! Shared test utilities for the matrix workspace.
//!
//! Dev-dependency only. [`TreeFixture`] lays out a matrix tree and its
//! shadow configuration tree side by side in a temporary directory:
//!
//! ```text
//! <tmp>/matrix/...    product descriptors, matrix.toml
//! <tmp>/configs/...   config fragments
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use matrix_fs::NormalizedPath;
use tempfile::TempDir;

/// Attributes of a product descriptor to write.
#[derive(Debug, Clone)]
pub struct Product<'a> {
    vendor: &'a str,
    system: &'a str,
    variant: Option<&'a str>,
    boards: &'a [&'a str],
    version: Option<&'a str>,
}

impl<'a> Product<'a> {
    pub fn new(vendor: &'a str, system: &'a str) -> Self {
        Self {
            vendor,
            system,
            variant: None,
            boards: &[],
            version: None,
        }
    }

    pub fn variant(mut self, variant: &'a str) -> Self {
        self.variant = Some(variant);
        self
    }

    pub fn boards(mut self, boards: &'a [&'a str]) -> Self {
        self.boards = boards;
        self
    }

    pub fn version(mut self, version: &'a str) -> Self {
        self.version = Some(version);
        self
    }

    fn to_toml(&self) -> String {
        let mut out = format!("vendor = \"{}\"\nsystem = \"{}\"\n", self.vendor, self.system);
        if let Some(variant) = self.variant {
            out.push_str(&format!("variant = \"{variant}\"\n"));
        }
        if !self.boards.is_empty() {
            let boards = self
                .boards
                .iter()
                .map(|b| format!("\"{b}\""))
                .collect::<Vec<_>>()
                .join(", ");
            out.push_str(&format!("board_variants = [{boards}]\n"));
        }
        if let Some(version) = self.version {
            out.push_str(&format!("version = \"{version}\"\n"));
        }
        out
    }
}

/// A temporary matrix tree plus configuration tree.
///
/// # Example
///
/// ```rust,no_run
/// use matrix_test_utils::{Product, TreeFixture};
///
/// let tree = TreeFixture::new();
/// tree.product("sifive/unmatched/debian", Product::new("sifive", "debian").version("12"));
/// tree.config("sifive/unmatched/debian", "config.yaml", "null:\n  source: manual\n");
/// ```
pub struct TreeFixture {
    temp_dir: TempDir,
}

impl Default for TreeFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeFixture {
    /// Create empty `matrix/` and `configs/` roots.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("matrix")).unwrap();
        fs::create_dir_all(temp_dir.path().join("configs")).unwrap();
        Self { temp_dir }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn matrix_path(&self) -> PathBuf {
        self.root().join("matrix")
    }

    pub fn config_path(&self) -> PathBuf {
        self.root().join("configs")
    }

    pub fn matrix_root(&self) -> NormalizedPath {
        NormalizedPath::new(self.matrix_path())
    }

    pub fn config_root(&self) -> NormalizedPath {
        NormalizedPath::new(self.config_path())
    }

    /// The normalized path of `rel` under the config root, as the merger
    /// records it.
    pub fn config_entry(&self, rel: &str) -> NormalizedPath {
        if rel.is_empty() {
            self.config_root()
        } else {
            self.config_root().join(rel)
        }
    }

    /// Create a matrix directory without a descriptor.
    pub fn matrix_dir(&self, rel: &str) -> &Self {
        fs::create_dir_all(self.matrix_path().join(rel)).unwrap();
        self
    }

    /// Write `product.toml` into a matrix directory.
    pub fn product(&self, rel: &str, product: Product<'_>) -> &Self {
        let dir = self.matrix_path().join(rel);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("product.toml"), product.to_toml()).unwrap();
        self
    }

    /// Write `matrix.toml` listing embedded systems.
    pub fn embedded(&self, systems: &[&str]) -> &Self {
        let list = systems
            .iter()
            .map(|s| format!("\"{s}\""))
            .collect::<Vec<_>>()
            .join(", ");
        fs::write(
            self.matrix_path().join("matrix.toml"),
            format!("embedded = [{list}]\n"),
        )
        .unwrap();
        self
    }

    /// Create a config directory without any file.
    pub fn config_dir(&self, rel: &str) -> &Self {
        fs::create_dir_all(self.config_path().join(rel)).unwrap();
        self
    }

    /// Write a file into a config directory.
    pub fn config(&self, rel: &str, file: &str, content: &str) -> &Self {
        let dir = self.config_path().join(rel);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(file), content).unwrap();
        self
    }
}
