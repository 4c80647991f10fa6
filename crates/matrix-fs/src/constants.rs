//! Reserved file and directory names of the matrix and configuration trees.

use std::path::Path;

use crate::fragment::FragmentFormat;

/// Directory names never treated as part of the product hierarchy.
///
/// Covers version control, CI automation, report documentation assets and
/// local tool environments that live alongside the matrix data.
pub const RESERVED_DIRS: &[&str] = &[
    ".",
    "..",
    ".git",
    ".github",
    ".venv",
    "assets",
    "report-template",
];

/// Name of the optional options file at the matrix root.
pub const MATRIX_MANIFEST: &str = "matrix.toml";

/// Whether a directory name is excluded from traversal.
pub fn is_reserved_dir(name: &str) -> bool {
    RESERVED_DIRS.contains(&name)
}

/// A recognized configuration fragment file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConfigFile {
    /// `config.yaml`
    Yaml,
    /// `config.yml`
    Yml,
    /// `config.toml`
    Toml,
    /// `config.json`
    Json,
}

impl ConfigFile {
    /// All recognized names, in precedence order.
    pub const ALL: [ConfigFile; 4] = [Self::Yaml, Self::Yml, Self::Toml, Self::Json];

    /// Get the file name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Yaml => "config.yaml",
            Self::Yml => "config.yml",
            Self::Toml => "config.toml",
            Self::Json => "config.json",
        }
    }

    /// Match a bare file name against the recognized names.
    pub fn from_file_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.as_str() == name)
    }

    /// The parser used for this file.
    pub fn format(&self) -> FragmentFormat {
        match self {
            Self::Yaml | Self::Yml => FragmentFormat::Yaml,
            Self::Toml => FragmentFormat::Toml,
            Self::Json => FragmentFormat::Json,
        }
    }
}

impl AsRef<Path> for ConfigFile {
    fn as_ref(&self) -> &Path {
        Path::new(self.as_str())
    }
}

impl std::fmt::Display for ConfigFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A recognized product descriptor file name in the matrix tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DescriptorFile {
    Toml,
    Yaml,
    Yml,
    Json,
}

impl DescriptorFile {
    /// All recognized names, in precedence order.
    pub const ALL: [DescriptorFile; 4] = [Self::Toml, Self::Yaml, Self::Yml, Self::Json];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Toml => "product.toml",
            Self::Yaml => "product.yaml",
            Self::Yml => "product.yml",
            Self::Json => "product.json",
        }
    }

    /// Find the first descriptor present in `dir`.
    pub fn find_in(dir: &Path) -> Option<Self> {
        Self::ALL.into_iter().find(|d| dir.join(d.as_str()).is_file())
    }
}

impl std::fmt::Display for DescriptorFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
