//! Utility-selector helpers: variant splitting and normalization
//!
//! A utility selector is a colon-separated list of segments. Every segment
//! but the last is a variant prefix (`md`, `hover`, `[&>*]`), the last is the
//! base utility. Colons inside `[...]` or `(...)` do not split.

use std::collections::BTreeSet;

/// Variants understood out of the box
pub const KNOWN_VARIANTS: &[&str] = &[
    "sm",
    "md",
    "lg",
    "xl",
    "2xl",
    "hover",
    "focus",
    "focus-within",
    "focus-visible",
    "active",
    "visited",
    "disabled",
    "first",
    "last",
    "odd",
    "even",
    "dark",
    "group-hover",
    "peer-hover",
    "motion-safe",
    "motion-reduce",
    "print",
];

/// Split a selector into its colon-separated segments, ignoring colons nested
/// in brackets or parentheses
pub fn split_segments(selector: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (idx, ch) in selector.char_indices() {
        match ch {
            '[' | '(' => depth += 1,
            ']' | ')' => depth = depth.saturating_sub(1),
            ':' if depth == 0 => {
                segments.push(&selector[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    segments.push(&selector[start..]);
    segments
}

/// Prefix segments and base of a selector
///
/// `md:hover:bg-red` splits into `(["md", "hover"], "bg-red")`.
pub fn split_variants(selector: &str) -> (Vec<&str>, &str) {
    let mut segments = split_segments(selector);
    let base = segments.pop().unwrap_or_default();
    (segments, base)
}

/// The last segment of a selector, with every prefix stripped
///
/// Flex matching indexes used classes by this, whether or not their
/// prefixes are known variants.
pub fn normalize(selector: &str) -> &str {
    split_variants(selector).1
}

/// Set of variant names accepted as selector prefixes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantSet {
    names: BTreeSet<String>,
}

impl VariantSet {
    /// The built-in variants
    pub fn standard() -> Self {
        Self {
            names: KNOWN_VARIANTS.iter().map(|v| v.to_string()).collect(),
        }
    }

    /// Add project-specific variants
    pub fn extend<I, S>(&mut self, extra: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.names.extend(extra.into_iter().map(Into::into));
    }

    pub fn with_extra<I, S>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extend(extra);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// A prefix segment is accepted if it is a known variant or an arbitrary
    /// `[...]` variant
    pub fn accepts(&self, segment: &str) -> bool {
        self.contains(segment) || segment.ends_with(']')
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Split the leading run of accepted variants off a selector
    ///
    /// Unlike [`split_variants`] the remainder keeps any later segments, so a
    /// composed pseudo suffix survives: `md:btn:hover` gives
    /// `(["md"], "btn:hover")`. The last segment is never treated as a prefix.
    pub fn split<'s>(&self, selector: &'s str) -> (Vec<&'s str>, &'s str) {
        let segments = split_segments(selector);
        let mut prefixes = Vec::new();
        let mut consumed = 0;

        for segment in &segments[..segments.len() - 1] {
            if !self.accepts(segment) {
                break;
            }
            prefixes.push(*segment);
            consumed += segment.len() + 1;
        }

        (prefixes, &selector[consumed..])
    }
}

impl Default for VariantSet {
    fn default() -> Self {
        Self::standard()
    }
}
