//! Postal address canonicalisation for equality matching.
//!
//! Normalisation is deliberately lossy: it only folds case, whitespace and a
//! fixed set of street-suffix spellings. It does not validate addresses or
//! separate unit numbers, so distinct jobs at textually similar addresses can
//! collide and typos can prevent a match.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

/// Full-word suffix spellings and their abbreviations.
const SUFFIXES: [(&str, &str); 10] = [
    ("street", "st"),
    ("road", "rd"),
    ("avenue", "ave"),
    ("drive", "dr"),
    ("lane", "ln"),
    ("court", "ct"),
    ("circle", "cir"),
    ("parkway", "pkwy"),
    ("place", "pl"),
    ("boulevard", "blvd"),
];

#[expect(clippy::expect_used, reason = "patterns are built from literals")]
fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("address pattern should compile")
}

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| compile(r"\s+"));

static SUFFIX_WORDS: LazyLock<Regex> = LazyLock::new(|| {
    let alternation = SUFFIXES
        .iter()
        .map(|(long, _)| *long)
        .collect::<Vec<_>>()
        .join("|");
    compile(&format!(r"\b(?:{alternation})\b"))
});

/// Canonicalises a free-form address for equality comparison.
///
/// Lower-cases, trims, collapses internal whitespace and abbreviates street
/// suffixes matched as whole words. The function is idempotent.
///
/// # Examples
///
/// ```
/// use jobflow::intake::domain::normalize_address;
///
/// assert_eq!(
///     normalize_address("  123  Main Street "),
///     normalize_address("123 main st"),
/// );
/// assert_eq!(normalize_address("9 Streeter Road"), "9 streeter rd");
/// ```
#[must_use]
pub fn normalize_address(address: &str) -> String {
    let lowered = address.trim().to_lowercase();
    let collapsed = WHITESPACE.replace_all(&lowered, " ");
    SUFFIX_WORDS
        .replace_all(&collapsed, |captures: &regex::Captures<'_>| {
            let word = captures.get(0).map_or("", |m| m.as_str());
            SUFFIXES
                .iter()
                .find(|(long, _)| *long == word)
                .map_or(word, |(_, short)| *short)
                .to_owned()
        })
        .into_owned()
}

/// An address in canonical matching form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NormalizedAddress(String);

impl NormalizedAddress {
    /// Normalises `raw`, returning `None` when nothing is left.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = normalize_address(raw);
        if normalized.is_empty() {
            None
        } else {
            Some(Self(normalized))
        }
    }

    /// Returns `true` when `raw` normalises to this address.
    #[must_use]
    pub fn matches(&self, raw: &str) -> bool {
        normalize_address(raw) == self.0
    }

    /// Returns the canonical form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NormalizedAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
