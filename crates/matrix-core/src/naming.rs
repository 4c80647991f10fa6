//! Item naming
//!
//! An item name is the flat key `{vendor}-{board_variant}-{system}-{variant}`.
//! One product leaf yields one name per board variant, so baselines, merged
//! configuration keys and fetch results must all be produced through this
//! module or their joins silently miss.

use crate::reference::ProductLeaf;

/// Canonical lookup key for one tracked image.
pub type ItemName = String;

/// Variant token used when a leaf declares none.
pub const DEFAULT_VARIANT: &str = "null";

/// Board variant used when a leaf declares none.
pub const GENERIC_BOARD: &str = "generic";

/// Fragment keys with fewer hyphens than this are partial specifiers.
const FULL_KEY_HYPHENS: usize = 3;

/// Attributes substituted for the leaf's own when generating names.
///
/// Empty strings and empty lists count as "not overridden".
#[derive(Debug, Clone, Copy, Default)]
pub struct NameOverrides<'a> {
    pub vendor: Option<&'a str>,
    pub system: Option<&'a str>,
    pub variant: Option<&'a str>,
    pub board_variants: Option<&'a [String]>,
}

impl<'a> NameOverrides<'a> {
    /// Override only the variant.
    pub fn variant(variant: &'a str) -> Self {
        Self {
            variant: Some(variant),
            ..Self::default()
        }
    }
}

/// Generate the item names of a leaf, one per board variant.
pub fn item_names(leaf: &ProductLeaf) -> Vec<ItemName> {
    item_names_with(leaf, &NameOverrides::default())
}

/// Generate item names with some attributes substituted.
pub fn item_names_with(leaf: &ProductLeaf, overrides: &NameOverrides<'_>) -> Vec<ItemName> {
    let vendor = non_empty(overrides.vendor).unwrap_or(leaf.vendor.as_str());
    let system = non_empty(overrides.system).unwrap_or(leaf.system.as_str());
    let variant = non_empty(overrides.variant)
        .or(non_empty(leaf.variant.as_deref()))
        .unwrap_or(DEFAULT_VARIANT);
    let boards = overrides
        .board_variants
        .filter(|b| !b.is_empty())
        .unwrap_or(leaf.board_variants.as_slice());

    if boards.is_empty() {
        return vec![format!("{vendor}-{GENERIC_BOARD}-{system}-{variant}")];
    }
    boards
        .iter()
        .map(|board| format!("{vendor}-{board}-{system}-{variant}"))
        .collect()
}

/// Whether a fragment key is shorthand to be expanded against a leaf.
pub fn is_partial_key(key: &str) -> bool {
    key.matches('-').count() < FULL_KEY_HYPHENS
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn leaf(variant: Option<&str>, boards: &[&str]) -> ProductLeaf {
        ProductLeaf {
            vendor: "sifive".into(),
            system: "debian".into(),
            variant: variant.map(String::from),
            board_variants: boards.iter().map(|b| b.to_string()).collect(),
            path: vec!["sifive".into(), "unmatched".into(), "debian".into()],
            baseline_version: Some("12".into()),
            is_embedded: false,
        }
    }

    #[test]
    fn no_board_variants_yields_generic() {
        assert_eq!(item_names(&leaf(None, &[])), vec!["sifive-generic-debian-null"]);
    }

    #[test]
    fn one_name_per_board_variant_in_order() {
        assert_eq!(
            item_names(&leaf(Some("desktop"), &["unmatched", "hifive"])),
            vec!["sifive-unmatched-debian-desktop", "sifive-hifive-debian-desktop"]
        );
    }

    #[test]
    fn names_are_stable_across_calls() {
        let l = leaf(Some("minimal"), &["a", "b", "c"]);
        assert_eq!(item_names(&l), item_names(&l));
    }

    #[test]
    fn empty_variant_falls_back_to_null() {
        assert_eq!(item_names(&leaf(Some(""), &[])), vec!["sifive-generic-debian-null"]);
    }

    #[test]
    fn variant_override_regenerates_every_board() {
        let l = leaf(Some("desktop"), &["unmatched", "hifive"]);
        assert_eq!(
            item_names_with(&l, &NameOverrides::variant("server")),
            vec!["sifive-unmatched-debian-server", "sifive-hifive-debian-server"]
        );
    }

    #[test]
    fn empty_overrides_are_ignored() {
        let l = leaf(None, &["unmatched"]);
        let overrides = NameOverrides {
            vendor: Some(""),
            board_variants: Some(&[]),
            ..NameOverrides::default()
        };
        assert_eq!(item_names_with(&l, &overrides), vec!["sifive-unmatched-debian-null"]);
    }

    #[rstest]
    #[case("debian", true)]
    #[case("server-edition", true)]
    #[case("a-b-c", true)]
    #[case("sifive-unmatched-debian-null", false)]
    #[case("a-b-c-d-e", false)]
    fn partial_key_detection(#[case] key: &str, #[case] partial: bool) {
        assert_eq!(is_partial_key(key), partial);
    }
}
