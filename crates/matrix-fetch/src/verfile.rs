//! nvchecker version files
//!
//! Current nvchecker writes `{"version": 2, "data": {name: {"version": ..}}}`;
//! older releases wrote a flat `{name: version}` object. Both are read, only
//! the current layout is written.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{FetchError, Result};

const FORMAT_VERSION: u32 = 2;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Entry {
    version: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum VersionFile {
    Current {
        version: u32,
        data: BTreeMap<String, Entry>,
    },
    Legacy(BTreeMap<String, String>),
}

/// Render versions in the current layout.
pub fn render(versions: &BTreeMap<String, String>) -> Result<String> {
    let file = VersionFile::Current {
        version: FORMAT_VERSION,
        data: versions
            .iter()
            .map(|(name, version)| (name.clone(), Entry { version: version.clone() }))
            .collect(),
    };
    serde_json::to_string_pretty(&file).map_err(|e| FetchError::Serialize(e.to_string()))
}

/// Parse either layout into a flat name-to-version map.
pub fn parse(content: &str, path: &Path) -> Result<BTreeMap<String, String>> {
    let file: VersionFile = serde_json::from_str(content).map_err(|e| FetchError::ParseOutput {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    Ok(match file {
        VersionFile::Current { version, data } => {
            if version != FORMAT_VERSION {
                tracing::warn!(version, path = %path.display(), "Unknown version file format, reading anyway");
            }
            data.into_iter().map(|(name, entry)| (name, entry.version)).collect()
        }
        VersionFile::Legacy(map) => map,
    })
}
