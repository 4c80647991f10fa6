//! Boundary to the external version-fetch engine

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::diff::{VersionMap, VersionRecord};
use crate::merge::MergedConfig;
use crate::naming::ItemName;

/// What a fetch engine reports back.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchOutcome {
    /// Latest upstream version per item
    pub versions: BTreeMap<ItemName, String>,
    /// At least one configured item could not be checked
    pub has_failures: bool,
}

impl FetchOutcome {
    /// Fetched versions as records for [`crate::diff::diff`].
    pub fn to_records(&self) -> VersionMap {
        self.versions
            .iter()
            .map(|(name, version)| (name.clone(), VersionRecord::new(version.as_str())))
            .collect()
    }
}

/// Checks upstream versions for every entry of a merged configuration.
///
/// Implementations own concurrency, rate limiting and transport. From the
/// caller's side this is one synchronous call.
pub trait FetchEngine {
    type Error: std::error::Error + Send + Sync + 'static;

    /// `baseline` is provided so engines that track "old" versions
    /// themselves can be seeded with it.
    fn fetch(&self, config: &MergedConfig, baseline: &VersionMap) -> Result<FetchOutcome, Self::Error>;
}
