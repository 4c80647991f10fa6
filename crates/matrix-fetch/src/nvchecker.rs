//! Running nvchecker as a subprocess

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Command;

use matrix_core::merge::GLOBAL_KEY;
use matrix_core::{FetchEngine, FetchOutcome, MergedConfig, VersionMap};
use serde_json::{Map, Value};

use crate::error::{FetchError, Result};
use crate::verfile;

/// Exit code nvchecker uses with `--failures` when some entries failed.
const FAILURES_EXIT_CODE: i32 = 3;

const CONFIG_FILE: &str = "nvchecker.toml";
const OLDVER_FILE: &str = "old_ver.json";
const NEWVER_FILE: &str = "new_ver.json";

/// Fetch engine that shells out to `nvchecker`.
#[derive(Debug, Clone)]
pub struct NvcheckerEngine {
    program: PathBuf,
    /// Relative `keyfile` paths resolve against this directory
    config_root: Option<PathBuf>,
}

impl Default for NvcheckerEngine {
    fn default() -> Self {
        Self::new("nvchecker")
    }
}

impl NvcheckerEngine {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            config_root: None,
        }
    }

    pub fn with_config_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config_root = Some(root.into());
        self
    }

    /// Build the nvchecker configuration document.
    ///
    /// Only table entries are fetch directives; other top-level values are
    /// intermediate keys and are left out.
    pub fn build_document(&self, config: &MergedConfig, oldver: &Path, newver: &Path) -> Result<Value> {
        let options = config.options()?;
        let mut global = match serde_json::to_value(&options) {
            Ok(Value::Object(map)) => map,
            Ok(_) => Map::new(),
            Err(e) => return Err(FetchError::Serialize(e.to_string())),
        };
        global.insert("oldver".into(), Value::String(oldver.display().to_string()));
        global.insert("newver".into(), Value::String(newver.display().to_string()));
        if let (Some(keyfile), Some(root)) = (&options.keyfile, &self.config_root) {
            let resolved = root.join(keyfile);
            global.insert("keyfile".into(), Value::String(resolved.display().to_string()));
        }

        let mut document = Map::new();
        document.insert(GLOBAL_KEY.to_string(), Value::Object(global));
        for (name, entry) in config.entries() {
            if entry.is_object() {
                document.insert(name.clone(), entry.clone());
            } else {
                tracing::warn!(%name, "Not a fetch directive, leaving it out of the nvchecker config");
            }
        }
        Ok(Value::Object(document))
    }

    fn run(&self, config_path: &Path, working_dir: &Path) -> Result<bool> {
        tracing::debug!(program = %self.program.display(), config = %config_path.display(), "Running nvchecker");
        let output = Command::new(&self.program)
            .current_dir(working_dir)
            .arg("-c")
            .arg(config_path)
            .arg("--failures")
            .output()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => FetchError::ProgramNotFound {
                    program: self.program.clone(),
                },
                _ => FetchError::Io(e),
            })?;

        if output.status.success() {
            return Ok(false);
        }
        let code = output.status.code().unwrap_or(-1);
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        if code == FAILURES_EXIT_CODE {
            tracing::warn!(%stderr, "nvchecker reported failures");
            Ok(true)
        } else {
            Err(FetchError::CommandFailed { code, stderr })
        }
    }
}

impl FetchEngine for NvcheckerEngine {
    type Error = FetchError;

    fn fetch(&self, config: &MergedConfig, baseline: &VersionMap) -> Result<FetchOutcome> {
        let scratch = tempfile::TempDir::new()?;
        let oldver = scratch.path().join(OLDVER_FILE);
        let newver = scratch.path().join(NEWVER_FILE);
        let config_path = scratch.path().join(CONFIG_FILE);

        let old: BTreeMap<String, String> = baseline
            .iter()
            .map(|(name, record)| (name.clone(), record.version.clone()))
            .collect();
        fs::write(&oldver, verfile::render(&old)?)?;

        let document = self.build_document(config, &oldver, &newver)?;
        let rendered =
            toml::to_string_pretty(&document).map_err(|e| FetchError::Serialize(e.to_string()))?;
        fs::write(&config_path, rendered)?;

        let has_failures = self.run(&config_path, scratch.path())?;

        let versions = if newver.is_file() {
            verfile::parse(&fs::read_to_string(&newver)?, &newver)?
        } else {
            tracing::warn!("nvchecker wrote no new version file");
            BTreeMap::new()
        };

        tracing::info!(fetched = versions.len(), has_failures, "Fetched upstream versions");
        Ok(FetchOutcome {
            versions,
            has_failures,
        })
    }
}
