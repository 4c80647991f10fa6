use matrix_core::{FetchEngine, MergedConfig, VersionMap, VersionRecord};
use matrix_fetch::{FetchError, NvcheckerEngine};
use pretty_assertions::assert_eq;
use serde_json::{Map, Value, json};
use std::path::Path;

fn table(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("not a table: {other}"),
    }
}

fn merged() -> MergedConfig {
    let mut config = MergedConfig::new();
    config.merge_global(&json!({"max_concurrency": 4, "keyfile": "keys.toml"}));
    config.merge_fragment(
        &table(json!({
            "sifive-unmatched-debian-null": {"source": "regex", "url": "https://example.org"},
            "loose": "not a directive",
        })),
        None,
    );
    config
}

#[test]
fn test_document_carries_options_and_directives_only() {
    let engine = NvcheckerEngine::new("nvchecker").with_config_root("/srv/configs");

    let document = engine
        .build_document(&merged(), Path::new("/tmp/old.json"), Path::new("/tmp/new.json"))
        .unwrap();

    assert_eq!(
        document,
        json!({
            "__config__": {
                "max_concurrency": 4,
                "http_timeout": 20,
                "keyfile": "/srv/configs/keys.toml",
                "oldver": "/tmp/old.json",
                "newver": "/tmp/new.json",
            },
            "sifive-unmatched-debian-null": {"source": "regex", "url": "https://example.org"},
        })
    );
}

#[test]
fn test_missing_program_is_reported() {
    let engine = NvcheckerEngine::new("/nonexistent/bin/nvchecker-xyz");

    let err = engine.fetch(&merged(), &VersionMap::new()).unwrap_err();

    assert!(matches!(err, FetchError::ProgramNotFound { .. }), "{err}");
}

#[cfg(unix)]
mod fake_program {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    /// A stand-in for nvchecker: writes a fixed new version file to the
    /// path named in the config and exits with `code`.
    fn fake_nvchecker(dir: &Path, code: i32) -> std::path::PathBuf {
        let script = dir.join("nvchecker");
        let body = format!(
            r#"#!/bin/sh
cfg="$2"
newver=$(sed -n "s/^newver = [\"']\(.*\)[\"']$/\1/p" "$cfg")
printf '{{"version": 2, "data": {{"sifive-unmatched-debian-null": {{"version": "13.0"}}}}}}' > "$newver"
exit {code}
"#
        );
        fs::write(&script, body).unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
        script
    }

    fn baseline() -> VersionMap {
        [(
            "sifive-unmatched-debian-null".to_string(),
            VersionRecord::new("12.5"),
        )]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_reads_back_new_versions() {
        let bin = TempDir::new().unwrap();
        let engine = NvcheckerEngine::new(fake_nvchecker(bin.path(), 0));

        let outcome = engine.fetch(&merged(), &baseline()).unwrap();

        assert!(!outcome.has_failures);
        assert_eq!(outcome.versions["sifive-unmatched-debian-null"], "13.0");
    }

    #[test]
    fn test_exit_code_three_flags_failures() {
        let bin = TempDir::new().unwrap();
        let engine = NvcheckerEngine::new(fake_nvchecker(bin.path(), 3));

        let outcome = engine.fetch(&merged(), &baseline()).unwrap();

        assert!(outcome.has_failures);
        assert_eq!(outcome.versions.len(), 1);
    }

    #[test]
    fn test_other_exit_codes_are_errors() {
        let bin = TempDir::new().unwrap();
        let engine = NvcheckerEngine::new(fake_nvchecker(bin.path(), 1));

        let err = engine.fetch(&merged(), &baseline()).unwrap_err();

        assert!(matches!(err, FetchError::CommandFailed { code: 1, .. }), "{err}");
    }
}
