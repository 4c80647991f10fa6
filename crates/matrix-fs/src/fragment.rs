//! Format-agnostic fragment loading
//!
//! Every configuration fragment and product descriptor is read into a
//! `serde_json::Value`, whatever its on-disk format, so merging and key
//! classification work on one dynamic representation.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{Error, NormalizedPath, Result, io};

/// On-disk serialization format of a fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentFormat {
    Yaml,
    Toml,
    Json,
}

impl FragmentFormat {
    /// Detect the format from a file extension.
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_lowercase().as_str() {
            "yaml" | "yml" => Some(Self::Yaml),
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Yaml => "YAML",
            Self::Toml => "TOML",
            Self::Json => "JSON",
        }
    }
}

/// Reads fragments and descriptors from disk.
#[derive(Debug, Default, Clone, Copy)]
pub struct FragmentStore;

impl FragmentStore {
    pub fn new() -> Self {
        Self
    }

    /// Load a file as a dynamic value using an explicit format.
    ///
    /// Whitespace-only files load as `Value::Null` in every format.
    pub fn load_value(&self, path: &NormalizedPath, format: FragmentFormat) -> Result<Value> {
        let content = io::read_text(path)?;
        parse_str(&content, format).map_err(|message| Error::ConfigParse {
            path: path.to_native(),
            format: format.name().into(),
            message,
        })
    }

    /// Load a file into a typed structure, detecting the format from its
    /// extension. A blank file deserializes like an empty table.
    pub fn load<T: DeserializeOwned>(&self, path: &NormalizedPath) -> Result<T> {
        let extension = path.extension().unwrap_or("");
        let format =
            FragmentFormat::from_extension(extension).ok_or_else(|| Error::UnsupportedFormat {
                extension: extension.to_string(),
            })?;
        let value = match self.load_value(path, format)? {
            Value::Null => Value::Object(serde_json::Map::new()),
            value => value,
        };
        serde_json::from_value(value).map_err(|e| Error::ConfigParse {
            path: path.to_native(),
            format: format.name().into(),
            message: e.to_string(),
        })
    }
}

fn parse_str(content: &str, format: FragmentFormat) -> std::result::Result<Value, String> {
    if content.trim().is_empty() {
        return Ok(Value::Null);
    }
    match format {
        FragmentFormat::Yaml => serde_yaml::from_str(content).map_err(|e| e.to_string()),
        FragmentFormat::Toml => toml::from_str(content).map_err(|e| e.to_string()),
        FragmentFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
    }
}

/// Render a value as TOML.
pub fn to_toml_string(path: &NormalizedPath, value: &Value) -> Result<String> {
    toml::to_string_pretty(value).map_err(|e| Error::ConfigSerialize {
        path: path.to_native(),
        format: "TOML".into(),
        message: e.to_string(),
    })
}
