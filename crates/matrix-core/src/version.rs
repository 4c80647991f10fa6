//! Version comparison with vendor-aware normalization.
//!
//! Upstream version strings are inconsistent: `V2.0`, `2.0 SP1`, `1.0 rc1`,
//! `2023.09.01`. Both operands go through the same pipeline before they are
//! ordered:
//!
//! 1. lower-case everything
//! 2. spaces become hyphens
//! 3. one leading `v` is dropped
//! 4. every `-sp<digits>` service-pack suffix becomes `+sp<digits>`, so
//!    `2.0-sp1` sorts above `2.0` instead of below it like a pre-release
//!
//! Normalized strings that read as semver (one to three numeric components,
//! optional pre-release and build parts) are ordered by their
//! [`semver::Version`] core first. Ties are broken by suffix: a pre-release
//! sorts below a bare release, which sorts below a build (service pack).
//! Suffixes of the same kind compare token-wise, digit runs as numbers, so
//! `rc10` is above `rc9` and `sp10` above `sp2`. Anything else falls back to
//! a loose token-wise comparison that never fails.
//!
//! ```
//! use matrix_core::version::{compare, is_newer};
//! use std::cmp::Ordering;
//!
//! assert_eq!(compare("V2.0", "2.0"), Ordering::Equal);
//! assert!(is_newer("2.0-SP1", "2.0"));
//! assert_eq!(compare("1.0 rc1", "1.0-rc1"), Ordering::Equal);
//! ```

use std::cmp::Ordering;
use std::sync::LazyLock;

use regex::Regex;
use semver::{BuildMetadata, Prerelease, Version};

static SERVICE_PACK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-sp(\d+)").expect("Invalid service pack regex"));

/// Apply the normalization pipeline to one version string.
pub fn normalize(version: &str) -> String {
    let lowered = version.to_lowercase().replace(' ', "-");
    let stripped = lowered.strip_prefix('v').unwrap_or(lowered.as_str());
    SERVICE_PACK.replace_all(stripped, "+sp$1").into_owned()
}

/// Three-way comparison of two version strings after normalization.
pub fn compare(a: &str, b: &str) -> Ordering {
    let (a, b) = (normalize(a), normalize(b));
    match (parse_semver(&a), parse_semver(&b)) {
        (Some(a), Some(b)) => a.cmp(&b),
        _ => loose_cmp(&a, &b),
    }
}

/// Whether `a` is newer than `b`.
pub fn is_newer(a: &str, b: &str) -> bool {
    compare(a, b) == Ordering::Greater
}

/// Whether `a` is older than `b`.
pub fn is_older(a: &str, b: &str) -> bool {
    compare(a, b) == Ordering::Less
}

/// Whether `a` and `b` denote the same version.
pub fn is_same(a: &str, b: &str) -> bool {
    compare(a, b) == Ordering::Equal
}

/// A normalized string that reads as semver.
///
/// Pre-release and build parts are validated as semver identifiers but kept
/// as text, since semver orders alphanumeric identifiers lexically.
#[derive(Debug)]
struct SemverParts<'a> {
    core: Version,
    pre: Option<&'a str>,
    build: Option<&'a str>,
}

impl Ord for SemverParts<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.core
            .cmp(&other.core)
            .then_with(|| match (self.pre, other.pre) {
                (None, None) => Ordering::Equal,
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (Some(a), Some(b)) => tokens_cmp(&tokenize(a), &tokenize(b)),
            })
            .then_with(|| match (self.build, other.build) {
                (None, None) => Ordering::Equal,
                (Some(_), None) => Ordering::Greater,
                (None, Some(_)) => Ordering::Less,
                (Some(a), Some(b)) => tokens_cmp(&tokenize(a), &tokenize(b)),
            })
    }
}

impl PartialOrd for SemverParts<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for SemverParts<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SemverParts<'_> {}

/// Read a normalized string as semver, padding missing minor/patch with 0.
fn parse_semver(s: &str) -> Option<SemverParts<'_>> {
    let (rest, build) = match s.split_once('+') {
        Some((rest, build)) => (rest, Some(build)),
        None => (s, None),
    };
    let (core, pre) = match rest.split_once('-') {
        Some((core, pre)) => (core, Some(pre)),
        None => (rest, None),
    };

    let numbers = core
        .split('.')
        .map(|part| {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                None
            } else {
                part.parse::<u64>().ok()
            }
        })
        .collect::<Option<Vec<_>>>()?;
    if numbers.is_empty() || numbers.len() > 3 {
        return None;
    }

    if let Some(pre) = pre {
        Prerelease::new(pre).ok()?;
    }
    if let Some(build) = build {
        BuildMetadata::new(build).ok()?;
    }
    Some(SemverParts {
        core: Version::new(
            numbers[0],
            numbers.get(1).copied().unwrap_or(0),
            numbers.get(2).copied().unwrap_or(0),
        ),
        pre: pre.filter(|p| !p.is_empty()),
        build: build.filter(|b| !b.is_empty()),
    })
}

#[derive(Debug, PartialEq, Eq)]
enum Token<'a> {
    Num(&'a str),
    Text(&'a str),
}

impl Ord for Token<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Token::Num(a), Token::Num(b)) => numeric_cmp(a, b),
            (Token::Text(a), Token::Text(b)) => a.cmp(b),
            (Token::Num(_), Token::Text(_)) => Ordering::Greater,
            (Token::Text(_), Token::Num(_)) => Ordering::Less,
        }
    }
}

impl PartialOrd for Token<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Compare digit strings of any length without overflow.
fn numeric_cmp(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Split into maximal digit / non-digit runs, dropping separators.
fn tokenize(s: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut start = None;
    let mut digits = false;

    for (i, c) in s.char_indices() {
        let separator = matches!(c, '.' | '-' | '_' | '+' | '~');
        let is_digit = c.is_ascii_digit();
        if let Some(from) = start {
            if separator || is_digit != digits {
                let run = &s[from..i];
                tokens.push(if digits { Token::Num(run) } else { Token::Text(run) });
                start = None;
            }
        }
        if !separator && start.is_none() {
            start = Some(i);
            digits = is_digit;
        }
    }
    if let Some(from) = start {
        let run = &s[from..];
        tokens.push(if digits { Token::Num(run) } else { Token::Text(run) });
    }
    tokens
}

/// Token-wise comparison; trailing zero components do not count.
fn tokens_cmp(a: &[Token<'_>], b: &[Token<'_>]) -> Ordering {
    for i in 0..a.len().max(b.len()) {
        let ordering = match (a.get(i), b.get(i)) {
            (Some(x), Some(y)) => x.cmp(y),
            (Some(x), None) => trailing_cmp(x),
            (None, Some(y)) => trailing_cmp(y).reverse(),
            (None, None) => Ordering::Equal,
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

fn trailing_cmp(token: &Token<'_>) -> Ordering {
    match token {
        Token::Num(n) if n.bytes().all(|b| b == b'0') => Ordering::Equal,
        _ => Ordering::Greater,
    }
}

/// Suffix kinds ranked the way semver ranks them against a bare release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Suffix {
    Pre,
    None,
    Build,
}

fn split_suffix(s: &str) -> (&str, Suffix, &str) {
    match s.find(['-', '+']) {
        Some(idx) => {
            let kind = if s.as_bytes()[idx] == b'-' { Suffix::Pre } else { Suffix::Build };
            (&s[..idx], kind, &s[idx + 1..])
        }
        None => (s, Suffix::None, ""),
    }
}

fn loose_cmp(a: &str, b: &str) -> Ordering {
    let (a_core, a_kind, a_tail) = split_suffix(a);
    let (b_core, b_kind, b_tail) = split_suffix(b);
    tokens_cmp(&tokenize(a_core), &tokenize(b_core))
        .then_with(|| a_kind.cmp(&b_kind))
        .then_with(|| tokens_cmp(&tokenize(a_tail), &tokenize(b_tail)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("V2.0", "2.0")]
    #[case("1.0 RC1", "1.0-rc1")]
    #[case("2.0-SP1", "2.0+sp1")]
    #[case("v1.0-sp2-sp3", "1.0+sp2+sp3")]
    #[case("vv1", "v1")]
    fn normalization(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize(input), expected);
    }

    #[rstest]
    #[case("V2.0", "2.0", Ordering::Equal)]
    #[case("2.0-SP1", "2.0", Ordering::Greater)]
    #[case("1.0 rc1", "1.0-rc1", Ordering::Equal)]
    #[case("2.0-sp1", "2.0-sp2", Ordering::Less)]
    #[case("2.0-SP10", "2.0-SP2", Ordering::Greater)]
    #[case("2.0-sp9", "2.0-sp10", Ordering::Less)]
    #[case("1.0-rc10", "1.0-rc9", Ordering::Greater)]
    #[case("1.0-rc1", "1.0-sp1", Ordering::Less)]
    #[case("1.0-rc2+sp1", "1.0-rc2", Ordering::Greater)]
    #[case("2.0-rc1", "2.0", Ordering::Less)]
    #[case("2.1", "2.0-sp5", Ordering::Greater)]
    #[case("6.6.1", "6.10", Ordering::Less)]
    #[case("2.0", "2.0.0", Ordering::Equal)]
    #[case("2023.09.01", "2023.10.01", Ordering::Less)]
    #[case("1.2.3.4", "1.2.3", Ordering::Greater)]
    #[case("1.2.3.0", "1.2.3", Ordering::Equal)]
    #[case("12-20240101", "12-20231201", Ordering::Greater)]
    #[case("1.0.0.1", "1.0.0.1-beta", Ordering::Greater)]
    #[case("r1234", "r999", Ordering::Greater)]
    #[case("99999999999999999999999.1", "99999999999999999999999.0", Ordering::Greater)]
    fn ordering(#[case] a: &str, #[case] b: &str, #[case] expected: Ordering) {
        assert_eq!(compare(a, b), expected, "{a} vs {b}");
        assert_eq!(compare(b, a), expected.reverse(), "{b} vs {a}");
    }

    #[test]
    fn predicates_follow_compare() {
        assert!(is_newer("1.1", "1.0"));
        assert!(is_older("1.0", "1.1"));
        assert!(is_same("v1.0", "1.0"));
        assert!(!is_newer("1.0", "1.0"));
    }

    #[test]
    fn garbage_does_not_panic() {
        for s in ["", "-", "+", "...", "v", "🦀", "sp-sp1", "1..2"] {
            let _ = compare(s, "1.0");
            let _ = compare("1.0", s);
        }
    }

    #[test]
    fn tokenizer_splits_runs() {
        assert_eq!(
            tokenize("r12b.3"),
            vec![Token::Text("r"), Token::Num("12"), Token::Text("b"), Token::Num("3")]
        );
    }
}
