//! Filesystem layer for the support-matrix update checker
//!
//! Provides normalized paths, the reserved file and directory names of the
//! matrix and configuration trees, and format-agnostic fragment loading.

pub mod constants;
pub mod error;
pub mod fragment;
pub mod io;
pub mod path;

pub use constants::{ConfigFile, DescriptorFile, MATRIX_MANIFEST, RESERVED_DIRS, is_reserved_dir};
pub use error::{Error, Result};
pub use fragment::{FragmentFormat, FragmentStore, to_toml_string};
pub use io::EntryKind;
pub use path::NormalizedPath;
