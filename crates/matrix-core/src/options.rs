//! Global fetch options from the root `__config__` table

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{Error, Result};

fn default_max_concurrency() -> usize {
    20
}

fn default_http_timeout() -> u64 {
    20
}

/// Options handed to the fetch engine alongside the merged entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalOptions {
    /// Upper bound on simultaneous upstream requests
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Per-request timeout in seconds
    #[serde(default = "default_http_timeout")]
    pub http_timeout: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub httplib: Option<String>,

    /// Path to an API key file, relative to the config root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyfile: Option<String>,

    /// Per-source settings, passed through untouched
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub source: Map<String, Value>,
}

impl Default for GlobalOptions {
    fn default() -> Self {
        Self {
            max_concurrency: default_max_concurrency(),
            http_timeout: default_http_timeout(),
            proxy: None,
            httplib: None,
            keyfile: None,
            source: Map::new(),
        }
    }
}

impl GlobalOptions {
    /// Interpret a merged `__config__` value. `None` gives the defaults.
    pub fn from_value(value: Option<&Value>) -> Result<Self> {
        match value {
            None | Some(Value::Null) => Ok(Self::default()),
            Some(value) => serde_json::from_value(value.clone()).map_err(Error::InvalidOptions),
        }
    }
}
