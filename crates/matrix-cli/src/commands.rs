//! Check and merge command implementations

use std::path::Path;

use colored::Colorize;

use matrix_core::{
    ConfigTreeMerger, DiffOptions, FetchEngine, MatrixIndex, MergeOutcome, baseline, diff,
};
use matrix_fetch::NvcheckerEngine;
use matrix_fs::NormalizedPath;

use crate::cli::CheckArgs;
use crate::error::{CliError, Result};
use crate::report::Report;

/// Counts from one `check` run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CheckSummary {
    /// Added or updated items
    pub updates: usize,
    pub skipped: usize,
    pub manually_skipped: usize,
}

/// Load the matrix index and merge the configuration tree against it.
fn load_and_merge(matrix: &Path, configs: &Path) -> Result<(MatrixIndex, MergeOutcome)> {
    let index = MatrixIndex::load(&NormalizedPath::new(matrix))?;
    let outcome = ConfigTreeMerger::new(NormalizedPath::new(configs), &index).merge()?;
    tracing::debug!(
        entries = outcome.config.len(),
        skipped = outcome.skipped.len(),
        manually_skipped = outcome.manually_skipped.len(),
        "Merged configuration"
    );
    Ok((index, outcome))
}

/// Run the check command with nvchecker as fetch engine.
pub fn run_check(matrix: &Path, configs: &Path, args: &CheckArgs) -> Result<CheckSummary> {
    let engine = NvcheckerEngine::new(&args.nvchecker).with_config_root(configs);
    run_check_with(matrix, configs, args, &engine)
}

/// Run the check command against any fetch engine.
///
/// A fetch that reports failures aborts the run before the report is
/// written.
pub fn run_check_with<E>(matrix: &Path, configs: &Path, args: &CheckArgs, engine: &E) -> Result<CheckSummary>
where
    E: FetchEngine,
    CliError: From<E::Error>,
{
    println!("{} Checking upstream versions...", "=>".blue().bold());

    let (index, outcome) = load_and_merge(matrix, configs)?;
    let baseline = baseline(&index);

    let fetched = engine.fetch(&outcome.config, &baseline)?;
    if fetched.has_failures {
        tracing::error!("Fetch engine reported failures");
        return Err(CliError::FetchFailed);
    }

    let options = DiffOptions {
        include_unchanged: args.include_unchanged,
    };
    let pairs = diff(&baseline, &fetched.to_records(), options);

    let mut updates = 0;
    for (name, pair) in &pairs {
        let old = pair.old.as_ref().map(|r| r.version.as_str());
        let new = pair.new.as_ref().map(|r| r.version.as_str());
        if pair.is_update() {
            updates += 1;
            tracing::info!(%name, old = old.unwrap_or("-"), new = new.unwrap_or("-"), "New version found");
        } else {
            tracing::debug!(%name, kind = %pair.kind(), ?old, ?new, "No update");
        }
    }
    if updates > 0 {
        tracing::info!("Update available");
    }

    let config_root = NormalizedPath::new(configs);
    let rendered = Report {
        updates: &pairs,
        skipped: &outcome.skipped,
        manually_skipped: &outcome.manually_skipped,
        config_root: &config_root,
    }
    .render();
    let report_path = NormalizedPath::new(&args.report);
    matrix_fs::io::write_text(&report_path, &rendered)?;

    if updates > 0 {
        println!(
            "{} {} update(s) available. Report written to {}",
            "UPDATE".yellow().bold(),
            updates,
            report_path.as_str().cyan()
        );
    } else {
        println!(
            "{} Everything is up to date. Report written to {}",
            "OK".green().bold(),
            report_path.as_str().cyan()
        );
    }

    Ok(CheckSummary {
        updates,
        skipped: outcome.skipped.len(),
        manually_skipped: outcome.manually_skipped.len(),
    })
}

/// Run the merge command
///
/// Prints the merged configuration to stdout and a skip summary to stderr.
pub fn run_merge(matrix: &Path, configs: &Path, json: bool) -> Result<()> {
    let (_, outcome) = load_and_merge(matrix, configs)?;
    println!("{}", render_merged(&outcome, json)?);

    eprintln!(
        "{} {} entries, {} skipped, {} manually skipped",
        "=>".blue().bold(),
        outcome.config.len(),
        outcome.skipped.len(),
        outcome.manually_skipped.len()
    );
    for path in &outcome.skipped {
        eprintln!("   {} {}", "-".yellow(), path.as_str().dimmed());
    }
    for skip in &outcome.manually_skipped {
        eprintln!("   {} {}: {}", "!".yellow(), skip.path.as_str().cyan(), skip.reason);
    }
    Ok(())
}

fn render_merged(outcome: &MergeOutcome, json: bool) -> Result<String> {
    let value = outcome.config.to_value();
    if json {
        serde_json::to_string_pretty(&value)
            .map_err(|e| CliError::user(format!("Failed to render merged config: {}", e)))
    } else {
        Ok(matrix_fs::to_toml_string(&NormalizedPath::new("<merged>"), &value)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::BTreeMap;

    use matrix_core::{FetchOutcome, MergedConfig, VersionMap};
    use matrix_test_utils::{Product, TreeFixture};

    /// Engine returning canned versions and remembering what it was asked.
    struct CannedEngine {
        versions: BTreeMap<String, String>,
        has_failures: bool,
        seen: RefCell<Option<(usize, usize)>>,
    }

    impl CannedEngine {
        fn new(versions: &[(&str, &str)], has_failures: bool) -> Self {
            Self {
                versions: versions
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
                has_failures,
                seen: RefCell::new(None),
            }
        }
    }

    impl FetchEngine for CannedEngine {
        type Error = std::io::Error;

        fn fetch(&self, config: &MergedConfig, baseline: &VersionMap) -> std::io::Result<FetchOutcome> {
            *self.seen.borrow_mut() = Some((config.len(), baseline.len()));
            Ok(FetchOutcome {
                versions: self.versions.clone(),
                has_failures: self.has_failures,
            })
        }
    }

    fn fixture() -> TreeFixture {
        let fx = TreeFixture::new();
        fx.product("acme/linux", Product::new("acme", "linux").version("1.0"))
            .product("acme/bsd", Product::new("acme", "bsd").version("2.0"))
            .config("acme/linux", "config.toml", "[acme-generic-linux-null]\nsource = \"github\"\n")
            .config("acme/bsd", "config.toml", "skip = true\nreason = \"Dropped upstream\"\n");
        fx
    }

    fn args(fx: &TreeFixture) -> CheckArgs {
        CheckArgs {
            report: fx.root().join("report.md"),
            ..CheckArgs::default()
        }
    }

    #[test]
    fn check_writes_report_with_updates() {
        let fx = fixture();
        let args = args(&fx);
        let engine = CannedEngine::new(&[("acme-generic-linux-null", "1.1")], false);

        let summary = run_check_with(&fx.matrix_path(), &fx.config_path(), &args, &engine).unwrap();

        assert_eq!(summary.updates, 1);
        assert_eq!(summary.manually_skipped, 1);
        assert_eq!(*engine.seen.borrow(), Some((1, 2)));

        let report = std::fs::read_to_string(&args.report).unwrap();
        assert!(report.contains("| acme-generic-linux-null | 1.0 | 1.1 |"));
        assert!(report.contains("| `acme/bsd` | Dropped upstream |"));
        assert!(!report.contains("acme-generic-bsd-null |"));
    }

    #[test]
    fn check_without_updates_still_writes_report() {
        let fx = fixture();
        let args = args(&fx);
        let engine = CannedEngine::new(&[("acme-generic-linux-null", "1.0")], false);

        let summary = run_check_with(&fx.matrix_path(), &fx.config_path(), &args, &engine).unwrap();

        assert_eq!(summary.updates, 0);
        let report = std::fs::read_to_string(&args.report).unwrap();
        assert!(report.contains("No new versions found."));
    }

    #[test]
    fn include_unchanged_lists_equal_versions() {
        let fx = fixture();
        let args = CheckArgs {
            include_unchanged: true,
            ..args(&fx)
        };
        let engine = CannedEngine::new(&[("acme-generic-linux-null", "1.0")], false);

        let summary = run_check_with(&fx.matrix_path(), &fx.config_path(), &args, &engine).unwrap();

        assert_eq!(summary.updates, 0);
        let report = std::fs::read_to_string(&args.report).unwrap();
        assert!(report.contains("| acme-generic-linux-null | 1.0 | 1.0 |"));
    }

    #[test]
    fn fetch_failures_abort_before_report() {
        let fx = fixture();
        let args = args(&fx);
        let engine = CannedEngine::new(&[("acme-generic-linux-null", "9.9")], true);

        let result = run_check_with(&fx.matrix_path(), &fx.config_path(), &args, &engine);

        assert!(matches!(result, Err(CliError::FetchFailed)));
        assert!(!args.report.exists());
    }

    #[test]
    fn missing_config_root_is_an_error() {
        let fx = TreeFixture::new();
        fx.product("acme/linux", Product::new("acme", "linux"));
        let engine = CannedEngine::new(&[], false);

        let result = run_check_with(
            &fx.matrix_path(),
            &fx.root().join("nowhere"),
            &args(&fx),
            &engine,
        );

        assert!(matches!(result, Err(CliError::Core(_))));
        assert!(engine.seen.borrow().is_none());
    }

    #[test]
    fn merged_config_renders_as_toml_and_json() {
        let fx = fixture();
        let (_, outcome) = load_and_merge(&fx.matrix_path(), &fx.config_path()).unwrap();

        let toml = render_merged(&outcome, false).unwrap();
        assert!(toml.contains("[acme-generic-linux-null]"));
        assert!(toml.contains("source = \"github\""));

        let json: serde_json::Value = serde_json::from_str(&render_merged(&outcome, true).unwrap()).unwrap();
        assert_eq!(json["acme-generic-linux-null"]["source"], "github");
    }
}
