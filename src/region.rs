// src/region.rs
//
// Region-key normalization. Both sources spell administrative regions
// inconsistently (stray whitespace, embedded administrative codes, split
// city/district pairs); everything funnels through `Normalizer::normalize`
// so that one logical region always yields one key.

use crate::error::{Result, StatError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Canonical join key for one administrative region.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionKey(String);

impl RegionKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RegionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Parenthesized administrative codes attached to a name, e.g. `전주시(4511000000)`.
static PAREN_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\([0-9]+\)").unwrap());

/// Tokens that are pure code noise: digits and punctuation, no letters.
static CODE_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9()\[\]\-,.]+$").unwrap());

/// Built-in alias table: raw city+district variants mapped to the compact
/// composite token the population registry uses. Extended per run from the
/// analysis config.
pub static DEFAULT_ALIASES: Lazy<BTreeMap<String, String>> = Lazy::new(|| {
    BTreeMap::from([
        ("전주시 덕진구".to_string(), "전주덕진구".to_string()),
        ("전주시 완산구".to_string(), "전주완산구".to_string()),
    ])
});

/// Strip code noise and collapse whitespace runs. `None` when nothing
/// label-like remains.
fn clean_label(raw: &str) -> Option<String> {
    let without_codes = PAREN_CODE.replace_all(raw, " ");
    let tokens: Vec<&str> = without_codes
        .split_whitespace()
        .filter(|t| !CODE_TOKEN.is_match(t))
        .collect();
    if tokens.is_empty() {
        None
    } else {
        Some(tokens.join(" "))
    }
}

/// Canonicalizes raw region labels. Pure: the output depends only on the
/// label and the alias table fixed at construction.
#[derive(Debug, Clone)]
pub struct Normalizer {
    aliases: BTreeMap<String, String>,
}

impl Normalizer {
    /// Build a normalizer over `aliases`. Every alias target must itself be
    /// a normalization fixed point, otherwise `normalize` would not be
    /// idempotent; violations are a config error.
    pub fn new(aliases: BTreeMap<String, String>) -> Result<Self> {
        for target in aliases.values() {
            let cleaned = clean_label(target)
                .ok_or_else(|| StatError::Config(format!("alias target `{target}` is empty after cleanup")))?;
            if cleaned != *target {
                return Err(StatError::Config(format!(
                    "alias target `{target}` is not in canonical form (cleans to `{cleaned}`)"
                )));
            }
            if let Some(next) = aliases.get(target) {
                if next != target {
                    return Err(StatError::Config(format!(
                        "alias target `{target}` is itself aliased to `{next}`"
                    )));
                }
            }
        }
        Ok(Self { aliases })
    }

    /// Normalizer with only the built-in alias table.
    pub fn with_defaults() -> Self {
        Self {
            aliases: DEFAULT_ALIASES.clone(),
        }
    }

    /// Canonicalize one raw label. Fails with `MissingRegion` when the label
    /// is empty or contains only code noise; callers drop such rows and
    /// count them rather than aborting.
    pub fn normalize(&self, raw: &str) -> Result<RegionKey> {
        let cleaned = clean_label(raw).ok_or_else(|| StatError::MissingRegion {
            label: raw.to_string(),
        })?;
        let canonical = match self.aliases.get(&cleaned) {
            Some(target) => target.clone(),
            None => cleaned,
        };
        Ok(RegionKey(canonical))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_variants_share_a_key() -> Result<()> {
        let n = Normalizer::with_defaults();
        let a = n.normalize("Jeonju Deokjin-gu")?;
        let b = n.normalize(" Jeonju  Deokjin-gu ")?;
        let c = n.normalize("\tJeonju Deokjin-gu\n")?;
        assert_eq!(a, b);
        assert_eq!(b, c);
        assert_eq!(a.as_str(), "Jeonju Deokjin-gu");
        Ok(())
    }

    #[test]
    fn normalize_is_idempotent() -> Result<()> {
        let n = Normalizer::with_defaults();
        for raw in [
            " Jeonju  Deokjin-gu ",
            "전주시 덕진구",
            "서울특별시 종로구(1111000000)",
            "완주군 123",
        ] {
            let once = n.normalize(raw)?;
            let twice = n.normalize(once.as_str())?;
            assert_eq!(once, twice, "not idempotent for {raw:?}");
        }
        Ok(())
    }

    #[test]
    fn code_noise_is_stripped() -> Result<()> {
        let n = Normalizer::with_defaults();
        assert_eq!(n.normalize("완주군 4571000000")?.as_str(), "완주군");
        assert_eq!(n.normalize("완주군(4571000000)")?.as_str(), "완주군");
        Ok(())
    }

    #[test]
    fn alias_collapses_city_district_pair() -> Result<()> {
        let n = Normalizer::with_defaults();
        assert_eq!(n.normalize("전주시 덕진구")?.as_str(), "전주덕진구");
        // the compact form is already canonical
        assert_eq!(n.normalize("전주덕진구")?.as_str(), "전주덕진구");
        Ok(())
    }

    #[test]
    fn empty_and_code_only_labels_fail() {
        let n = Normalizer::with_defaults();
        for raw in ["", "   ", "4511000000", "(123) - 456"] {
            match n.normalize(raw) {
                Err(StatError::MissingRegion { .. }) => {}
                other => panic!("expected MissingRegion for {raw:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn non_canonical_alias_target_is_rejected() {
        let aliases = BTreeMap::from([("a b".to_string(), " padded ".to_string())]);
        assert!(matches!(Normalizer::new(aliases), Err(StatError::Config(_))));

        let chained = BTreeMap::from([
            ("a".to_string(), "b".to_string()),
            ("b".to_string(), "c".to_string()),
        ]);
        assert!(matches!(Normalizer::new(chained), Err(StatError::Config(_))));
    }
}
