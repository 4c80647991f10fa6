//! Config tree merging
//!
//! The configuration tree shadows the matrix tree directory for directory.
//! Each directory may hold one fragment (`config.yaml`, `config.yml`,
//! `config.toml` or `config.json`); fragments are folded parent-before-child
//! into one [`MergedConfig`], so deeper directories override shallower ones.
//!
//! # Reserved keys
//!
//! - `__config__` - global fetch options, honoured at the root only
//! - `eol: true` - drop the directory and everything below it silently
//! - `skip: true` - drop the directory and everything below it, listing it
//!   with its `reason` in [`MergeOutcome::manually_skipped`]
//!
//! # Partial keys
//!
//! In a directory that is a product leaf, a key with fewer than three
//! hyphens is shorthand for "this leaf, with that variant" and expands to one
//! full item name per board variant. Keys with three or more hyphens are
//! taken verbatim.

mod config;
mod walker;

pub use config::{
    DEFAULT_SKIP_REASON, EOL_KEY, GLOBAL_KEY, MergedConfig, REASON_KEY, SKIP_KEY, is_reserved_key,
};
pub use walker::{ConfigTreeMerger, ManualSkip, MergeOutcome};
