//! Class-name extraction from markup and template sources

use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

/// Template interpolations removed before matching
static INTERPOLATIONS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"\$\{[^}]+\}").expect("valid regex"),
        Regex::new(r"\{\{[^}]+\}\}").expect("valid regex"),
    ]
});

static NEWLINES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n+").expect("valid regex"));

const QUOTED_GROUPS: &[usize] = &[1, 2, 3];
const FIRST_GROUP: &[usize] = &[1];

/// Attribute patterns and the capture groups that may hold the class list
static CLASS_PATTERNS: LazyLock<Vec<(Regex, &'static [usize])>> = LazyLock::new(|| {
    vec![
        // class="…" / className='…' / className={`…`}
        (
            Regex::new(r#"(?:class|className)\s*=\s*\{?\s*(?:"([^"]*)"|'([^']*)'|`([^`]*)`)"#)
                .expect("valid regex"),
            QUOTED_GROUPS,
        ),
        // Vue/Alpine bindings :class="…" / @class="…"
        (
            Regex::new(r#"[:@]class\s*=\s*"([^"]*)""#).expect("valid regex"),
            FIRST_GROUP,
        ),
        (
            Regex::new(r#"v-bind:class\s*=\s*"([^"]*)""#).expect("valid regex"),
            FIRST_GROUP,
        ),
        // Svelte class:name directive
        (
            Regex::new(r"class:\s*([A-Za-z0-9_-]+)").expect("valid regex"),
            FIRST_GROUP,
        ),
    ]
});

/// Strip interpolations and fold newlines so attributes spanning lines match
pub fn clean_source(raw: &str) -> String {
    let mut cleaned = raw.to_string();
    for pattern in INTERPOLATIONS.iter() {
        cleaned = pattern.replace_all(&cleaned, "").into_owned();
    }
    NEWLINES.replace_all(&cleaned, " ").into_owned()
}

/// Distinct class names found in `raw`, sorted
pub fn extract_classes(raw: &str) -> Vec<String> {
    let cleaned = clean_source(raw);
    let mut found = BTreeSet::new();

    for (pattern, groups) in CLASS_PATTERNS.iter() {
        for caps in pattern.captures_iter(&cleaned) {
            let Some(value) = groups.iter().find_map(|&group| caps.get(group)) else {
                continue;
            };
            found.extend(value.as_str().split_whitespace().map(str::to_string));
        }
    }

    found.into_iter().collect()
}
