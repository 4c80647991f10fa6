//! Tests for matrix indexing and baseline generation

use matrix_core::{
    ConfigTreeMerger, Error, MatrixIndex, ReferenceTree, baseline, item_names,
};
use matrix_test_utils::{Product, TreeFixture};
use pretty_assertions::assert_eq;
use std::fs;

fn segs(path: &str) -> Vec<String> {
    path.split('/').map(String::from).collect()
}

#[test]
fn test_load_discovers_leaves_in_path_order() {
    let tree = TreeFixture::new();
    tree.embedded(&["zephyr"])
        .product("thead/lpi4a/debian", Product::new("thead", "debian").version("12"))
        .product(
            "sifive/unmatched/ubuntu",
            Product::new("sifive", "ubuntu")
                .variant("server")
                .boards(&["unmatched"])
                .version("24.04"),
        )
        .product("sifive/unmatched/zephyr", Product::new("sifive", "zephyr"))
        .matrix_dir(".git/objects");

    let index = MatrixIndex::load(&tree.matrix_root()).unwrap();

    let paths: Vec<_> = index.leaves().iter().map(|l| l.path.join("/")).collect();
    assert_eq!(
        paths,
        vec!["sifive/unmatched/ubuntu", "sifive/unmatched/zephyr", "thead/lpi4a/debian"]
    );

    let ubuntu = index.leaf_at(&segs("sifive/unmatched/ubuntu")).unwrap();
    assert_eq!(ubuntu.variant.as_deref(), Some("server"));
    assert_eq!(ubuntu.board_variants, vec!["unmatched"]);
    assert_eq!(ubuntu.baseline_version.as_deref(), Some("24.04"));
    assert!(!ubuntu.is_embedded);

    assert!(index.leaf_at(&segs("sifive/unmatched/zephyr")).unwrap().is_embedded);
    assert!(index.is_embedded("zephyr"));
    assert!(!index.is_embedded("debian"));
}

#[test]
fn test_descriptor_in_yaml_is_accepted() {
    let tree = TreeFixture::new();
    tree.matrix_dir("milkv/duo/buildroot");
    fs::write(
        tree.matrix_path().join("milkv/duo/buildroot/product.yaml"),
        "vendor: milkv\nsystem: buildroot\nvariant: null\nversion: \"1.0.9\"\n",
    )
    .unwrap();

    let index = MatrixIndex::load(&tree.matrix_root()).unwrap();

    assert_eq!(index.leaves().len(), 1);
    assert_eq!(index.leaves()[0].variant, None);
}

#[test]
fn test_unquoted_versions_are_read_as_strings() {
    let tree = TreeFixture::new();
    tree.matrix_dir("canonical/visionfive2/ubuntu")
        .matrix_dir("sifive/unmatched/debian");
    fs::write(
        tree.matrix_path().join("canonical/visionfive2/ubuntu/product.yaml"),
        "vendor: canonical\nsystem: ubuntu\nversion: 22.04\n",
    )
    .unwrap();
    fs::write(
        tree.matrix_path().join("sifive/unmatched/debian/product.toml"),
        "vendor = \"sifive\"\nsystem = \"debian\"\nversion = 12\n",
    )
    .unwrap();

    let index = MatrixIndex::load(&tree.matrix_root()).unwrap();

    let ubuntu = index.leaf_at(&segs("canonical/visionfive2/ubuntu")).unwrap();
    assert_eq!(ubuntu.baseline_version.as_deref(), Some("22.04"));
    let debian = index.leaf_at(&segs("sifive/unmatched/debian")).unwrap();
    assert_eq!(debian.baseline_version.as_deref(), Some("12"));
}

#[test]
fn test_non_scalar_version_is_an_error() {
    let tree = TreeFixture::new();
    tree.matrix_dir("sifive/unmatched/debian");
    fs::write(
        tree.matrix_path().join("sifive/unmatched/debian/product.toml"),
        "vendor = \"sifive\"\nsystem = \"debian\"\nversion = [1, 2]\n",
    )
    .unwrap();

    let err = MatrixIndex::load(&tree.matrix_root()).unwrap_err();

    assert!(matches!(err, Error::Fs(_)), "{err}");
}

#[test]
fn test_descriptor_without_system_is_an_error() {
    let tree = TreeFixture::new();
    tree.matrix_dir("bad");
    fs::write(tree.matrix_path().join("bad/product.toml"), "vendor = \"x\"\nsystem = \"\"\n").unwrap();

    let result = MatrixIndex::load(&tree.matrix_root());

    assert!(matches!(result, Err(Error::InvalidDescriptor { .. })));
}

#[test]
fn test_missing_matrix_root_is_an_error() {
    let tree = TreeFixture::new();
    let result = MatrixIndex::load(&matrix_fs::NormalizedPath::new(tree.root().join("absent")));
    assert!(matches!(result, Err(Error::MatrixNotFound { .. })));
}

#[cfg(unix)]
#[test]
fn test_symlink_cycle_terminates() {
    let tree = TreeFixture::new();
    tree.product("sifive/unmatched/debian", Product::new("sifive", "debian").version("12"))
        .config("sifive/unmatched/debian", "config.yaml", "a-b-c-d: 1\n");
    std::os::unix::fs::symlink(
        tree.matrix_path().join("sifive"),
        tree.matrix_path().join("sifive/unmatched/loop"),
    )
    .unwrap();

    let index = MatrixIndex::load(&tree.matrix_root()).unwrap();
    assert_eq!(index.leaves().len(), 1);

    let outcome = ConfigTreeMerger::new(tree.config_root(), &index).merge().unwrap();
    assert!(outcome.config.get("a-b-c-d").is_some());
}

#[test]
fn test_baseline_and_merged_keys_share_a_namespace() {
    let tree = TreeFixture::new();
    tree.product(
        "sifive/unmatched/debian",
        Product::new("sifive", "debian")
            .variant("desktop")
            .boards(&["unmatched", "hifive"])
            .version("12.5"),
    )
    .config("sifive/unmatched/debian", "config.yaml", "desktop:\n  source: regex\n");

    let index = MatrixIndex::load(&tree.matrix_root()).unwrap();
    let outcome = ConfigTreeMerger::new(tree.config_root(), &index).merge().unwrap();
    let old = baseline(&index);

    let merged: Vec<_> = outcome.config.entries().keys().cloned().collect();
    let baseline_keys: Vec<_> = old.keys().cloned().collect();
    assert_eq!(merged, baseline_keys);

    let mut names = item_names(&index.leaves()[0]);
    names.sort();
    assert_eq!(names, baseline_keys);
}
