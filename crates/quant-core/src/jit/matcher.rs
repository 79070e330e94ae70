//! Used-class matching for flat rules

use crate::selector::{VariantSet, normalize};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

/// Inclusion policy for flat rules
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Match on the base utility, ignoring variant prefixes on both sides
    #[default]
    Flex,
    /// Base and the colon-joined prefix list must both match
    Strict,
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchMode::Flex => f.write_str("flex"),
            MatchMode::Strict => f.write_str("strict"),
        }
    }
}

impl FromStr for MatchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "flex" => Ok(MatchMode::Flex),
            "strict" => Ok(MatchMode::Strict),
            other => Err(format!("unknown match mode '{other}' (expected flex or strict)")),
        }
    }
}

/// Selectors indexed by base utility
///
/// Each base maps to the set of prefix keys (`"md:hover"`, or `""` for an
/// unprefixed selector) it was seen with. Only the leading run of known
/// variants counts as prefix, so `btn:hover` keeps its pseudo suffix.
#[derive(Debug, Clone, Default)]
struct SelectorIndex {
    by_base: HashMap<String, HashSet<String>>,
}

impl SelectorIndex {
    fn insert(&mut self, selector: &str, variants: &VariantSet) {
        let (prefixes, base) = variants.split(selector);
        self.by_base
            .entry(base.to_string())
            .or_default()
            .insert(prefixes.join(":"));
    }

    fn contains_base(&self, base: &str) -> bool {
        self.by_base.contains_key(base)
    }

    fn contains(&self, base: &str, prefix_key: &str) -> bool {
        self.by_base
            .get(base)
            .is_some_and(|prefixes| prefixes.contains(prefix_key))
    }
}

fn trimmed<I, S>(selectors: I) -> impl Iterator<Item = String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    selectors
        .into_iter()
        .map(|s| s.as_ref().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Used classes indexed for matching
///
/// Besides the known-variant split, every class also contributes its last
/// colon segment, so flex mode ignores prefixes it has never heard of
/// (`aria-checked:bg-red` still selects `bg-red`).
#[derive(Debug, Clone, Default)]
pub struct UsageIndex {
    selectors: SelectorIndex,
    tails: HashSet<String>,
}

impl UsageIndex {
    pub fn build<I, S>(used: I, variants: &VariantSet) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut index = Self::default();
        for class in trimmed(used) {
            index.selectors.insert(&class, variants);
            index.tails.insert(normalize(&class).to_string());
        }
        index
    }

    /// Number of distinct bases
    pub fn len(&self) -> usize {
        self.selectors.by_base.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selectors.by_base.is_empty()
    }

    /// Flex lookup: a known-variant base or a fully stripped class
    pub fn contains_base(&self, base: &str) -> bool {
        self.selectors.contains_base(base) || self.tails.contains(base)
    }

    fn contains(&self, base: &str, prefix_key: &str) -> bool {
        self.selectors.contains(base, prefix_key)
    }
}

/// Decides which flat-rule selectors are in use
#[derive(Debug, Clone)]
pub struct Matcher {
    mode: MatchMode,
    variants: VariantSet,
    index: UsageIndex,
}

impl Matcher {
    pub fn new<I, S>(used: I, mode: MatchMode, variants: VariantSet) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let index = UsageIndex::build(used, &variants);
        Self {
            mode,
            variants,
            index,
        }
    }

    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    pub fn variants(&self) -> &VariantSet {
        &self.variants
    }

    pub fn index(&self) -> &UsageIndex {
        &self.index
    }

    /// Base utility of a rule selector, as rendered
    pub fn base<'s>(&self, selector: &'s str) -> &'s str {
        self.variants.split(selector.trim()).1
    }

    pub fn matches(&self, selector: &str) -> bool {
        let (prefixes, base) = self.variants.split(selector.trim());
        match self.mode {
            MatchMode::Flex => self.index.contains_base(base),
            MatchMode::Strict => self.index.contains(base, &prefixes.join(":")),
        }
    }
}

/// Rule selectors indexed for the reverse question: is a used class produced
/// by any rule?
///
/// `covers(class)` holds exactly when a [`Matcher`] built over `[class]`
/// would keep at least one of the indexed rules.
#[derive(Debug, Clone)]
pub struct RuleIndex {
    mode: MatchMode,
    variants: VariantSet,
    rules: SelectorIndex,
}

impl RuleIndex {
    pub fn new<I, S>(selectors: I, mode: MatchMode, variants: VariantSet) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut rules = SelectorIndex::default();
        for selector in trimmed(selectors) {
            rules.insert(&selector, &variants);
        }
        Self {
            mode,
            variants,
            rules,
        }
    }

    pub fn covers(&self, class: &str) -> bool {
        let class = class.trim();
        let (prefixes, base) = self.variants.split(class);
        match self.mode {
            MatchMode::Flex => {
                self.rules.contains_base(base) || self.rules.contains_base(normalize(class))
            }
            MatchMode::Strict => self.rules.contains(base, &prefixes.join(":")),
        }
    }
}

/// One-shot match against the built-in variant set
pub fn match_selector<S: AsRef<str>>(selector: &str, used: &[S], mode: MatchMode) -> bool {
    Matcher::new(used, mode, VariantSet::standard()).matches(selector)
}
