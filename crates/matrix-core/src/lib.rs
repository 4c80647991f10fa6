//! Core of the support-matrix update checker
//!
//! This crate decides, for every product leaf of the support matrix, which
//! upstream version checks apply and whether what came back is newer than
//! the recorded baseline:
//!
//! - **Item naming**: the canonical `vendor-board-system-variant` keys that
//!   join baselines, merged configuration and fetch results
//! - **Config tree merging**: walks the matrix and configuration trees in
//!   lock-step and folds per-directory fragments into one configuration
//! - **Version comparison**: vendor-aware normalization on top of semver
//!   ordering, with a loose fallback for non-semver strings
//! - **Diffing**: reconciles baseline and fetched versions
//!
//! Fetching itself happens behind the [`FetchEngine`] trait.
//!
//! ```text
//!   matrix tree ──> MatrixIndex ──> baseline ──────────────┐
//!        │                                                 v
//!        └──> ConfigTreeMerger ──> MergedConfig ──> FetchEngine ──> diff
//!   config tree ──┘
//! ```

pub mod baseline;
pub mod diff;
pub mod error;
pub mod fetch;
pub mod merge;
pub mod naming;
pub mod options;
pub mod reference;
pub mod version;

pub use baseline::baseline;
pub use diff::{ChangeKind, DiffOptions, VersionMap, VersionPair, VersionRecord, diff};
pub use error::{Error, Result};
pub use fetch::{FetchEngine, FetchOutcome};
pub use merge::{ConfigTreeMerger, ManualSkip, MergeOutcome, MergedConfig};
pub use naming::{ItemName, NameOverrides, item_names, item_names_with};
pub use options::GlobalOptions;
pub use reference::{MatrixIndex, ProductLeaf, ReferenceTree};
pub use version::{compare, is_newer, is_older, is_same, normalize};
