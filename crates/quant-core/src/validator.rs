//! Semantic validation of a parsed stylesheet
//!
//! Validation never fails: every finding becomes a [`Diagnostic`] and the
//! full set is returned as a [`ValidationResult`]. Nested rules are checked
//! under their resolved selector (`btn { &:hover {} }` is checked as
//! `btn:hover`); their extra segments are pseudo suffixes, so only top-level
//! selectors get the variant check.

use crate::ast::{self, AtRule, Declaration, Node, Rule, StyleSheet, Visitor};
use crate::catalog::PropertyCatalog;
use crate::diagnostics::{Diagnostic, ValidationResult};
use crate::selector::{self, VariantSet};
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::debug;

/// At-rules with built-in meaning
pub const ALLOWED_AT_RULES: &[&str] = &["media", "supports", "layer", "variants", "theme"];

const KEYWORDS: &[&str] = &[
    "auto", "inherit", "initial", "unset", "revert", "none", "block", "inline", "flex", "grid",
    "relative", "absolute", "fixed", "sticky", "bold", "normal", "center",
];

const NAMED_COLORS: &[&str] = &[
    "transparent", "currentcolor", "black", "white", "red", "green", "blue", "yellow",
    "orange", "purple", "pink", "gray", "grey", "silver", "maroon", "navy", "teal", "olive",
    "lime", "aqua", "fuchsia", "cyan", "magenta", "brown", "gold", "indigo", "violet",
];

static HEX_COLOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#([0-9a-fA-F]{3,8})$").expect("valid regex"));
static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?\d+(\.\d+)?$").expect("valid regex"));
static LENGTH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?\d+(\.\d+)?(px|rem|em|vh|vw|%|ch|ex|cm|mm|in|pt|pc)$").expect("valid regex")
});
static COLOR_FUNCTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(rgb|rgba|hsl|hsla)\(.+\)$").expect("valid regex"));
static VAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^var\(.+\)$").expect("valid regex"));
static URL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^url\((.+)\)$").expect("valid regex"));
static FUNCTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z-]+\(.+\)$").expect("valid regex"));
static UTILITY_SELECTOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9:_\-\[\]()/.'%!,#]+$").expect("valid regex"));
static PROPERTY_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z-]+$").expect("valid regex"));
static COLOR_PROPERTY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(color|background|border-color|outline-color)$").expect("valid regex")
});
static LENGTH_PROPERTY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(width|height|margin|padding|gap|left|right|top|bottom|border-radius|min-|max-|letter-spacing|line-height)",
    )
    .expect("valid regex")
});
static JAVASCRIPT_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)^\s*['"]?\s*javascript:"#).expect("valid regex"));
static EXPRESSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bexpression\s*\(").expect("valid regex"));

/// Validate a stylesheet against the built-in variant set
pub fn validate(sheet: &StyleSheet, catalog: &PropertyCatalog) -> ValidationResult {
    Validator::new(catalog).validate(sheet)
}

/// Stylesheet validator
pub struct Validator<'a> {
    catalog: &'a PropertyCatalog,
    variants: VariantSet,
}

impl<'a> Validator<'a> {
    pub fn new(catalog: &'a PropertyCatalog) -> Self {
        Self {
            catalog,
            variants: VariantSet::standard(),
        }
    }

    pub fn with_variants(mut self, variants: VariantSet) -> Self {
        self.variants = variants;
        self
    }

    pub fn validate(&self, sheet: &StyleSheet) -> ValidationResult {
        let mut collector = Collector {
            validator: self,
            diagnostics: Vec::new(),
        };
        ast::walk(sheet, &mut collector);

        let result = ValidationResult::from_diagnostics(collector.diagnostics);
        debug!("Validation finished: {}", result.summary());
        result
    }

    fn check_selector(&self, rule: &Rule, selector: &str, nested: bool, out: &mut Vec<Diagnostic>) {
        let selector = selector.trim();
        let diag = |d: Diagnostic| d.with_selector(selector);

        if selector.is_empty() {
            out.push(diag(Diagnostic::error("Q001", "Empty selector", rule.loc)));
            return;
        }

        if !UTILITY_SELECTOR.is_match(selector) {
            out.push(diag(Diagnostic::warning(
                "Q002",
                "Selector contains suspicious characters",
                rule.loc,
            )));
        }

        if !nested {
            let (prefixes, _) = selector::split_variants(selector);
            for variant in prefixes {
                if !self.variants.accepts(variant) {
                    out.push(diag(
                        Diagnostic::warning("Q006", format!("Unknown variant '{variant}'"), rule.loc)
                            .with_hint("declare custom variants under `variants` in the config file"),
                    ));
                }
            }
        }

        if selector.contains(',') {
            out.push(diag(Diagnostic::warning(
                "Q003",
                "Comma-separated selectors are not supported",
                rule.loc,
            )));
        }

        let opens = selector.matches('[').count();
        let closes = selector.matches(']').count();
        if opens != closes {
            out.push(diag(Diagnostic::error(
                "Q004",
                "Unbalanced brackets in selector",
                rule.loc,
            )));
        }
    }

    fn check_declarations(&self, rule: &Rule, out: &mut Vec<Diagnostic>) {
        let mut seen = HashSet::new();

        for decl in &rule.declarations {
            let property = decl.property.trim();
            let value = decl.value.trim();

            if property.is_empty() {
                out.push(Diagnostic::error("Q101", "Empty property", decl.loc));
                continue;
            }

            let is_custom = property.starts_with("--");
            let is_unknown =
                !is_custom && PROPERTY_NAME.is_match(property) && !self.catalog.contains(property);
            if is_unknown {
                out.push(
                    Diagnostic::warning("Q102", format!("Unknown property '{property}'"), decl.loc)
                        .with_property(property),
                );
            }

            if value.is_empty() {
                out.push(
                    Diagnostic::error("Q103", format!("Empty value for '{property}'"), decl.loc)
                        .with_property(property),
                );
                continue;
            }

            if !is_custom && !is_unknown && !is_plausible_value(property, value) {
                out.push(
                    Diagnostic::warning(
                        "Q104",
                        format!("Possibly invalid value '{value}' for '{property}'"),
                        decl.loc,
                    )
                    .with_property(property)
                    .with_value(value),
                );
            }

            if !seen.insert(property) {
                out.push(
                    Diagnostic::info(
                        "Q105",
                        format!("Duplicate property '{property}'; the last one wins"),
                        decl.loc,
                    )
                    .with_property(property),
                );
            }

            self.check_unsafe_value(decl, value, out);
        }
    }

    fn check_unsafe_value(&self, decl: &Declaration, value: &str, out: &mut Vec<Diagnostic>) {
        let javascript_url = URL
            .captures(value)
            .and_then(|caps| caps.get(1))
            .is_some_and(|arg| JAVASCRIPT_URL.is_match(arg.as_str()));
        if javascript_url {
            out.push(
                Diagnostic::error("Q191", "javascript: URLs are not allowed", decl.loc)
                    .with_value(value),
            );
        }
        if EXPRESSION.is_match(value) {
            out.push(
                Diagnostic::error("Q190", "expression() is not allowed", decl.loc).with_value(value),
            );
        }
    }

    fn check_at_rule(&self, at_rule: &AtRule, out: &mut Vec<Diagnostic>) {
        let name = at_rule.name.as_str();
        if !ALLOWED_AT_RULES.contains(&name) {
            out.push(Diagnostic::warning(
                "Q301",
                format!("@{name} is not supported"),
                at_rule.loc,
            ));
        }
        if matches!(name, "media" | "supports") && at_rule.prelude.trim().is_empty() {
            out.push(Diagnostic::error(
                "Q302",
                format!("@{name} requires a condition"),
                at_rule.loc,
            ));
        }
    }
}

struct Collector<'v, 'a> {
    validator: &'v Validator<'a>,
    diagnostics: Vec<Diagnostic>,
}

impl Visitor for Collector<'_, '_> {
    fn visit_rule(&mut self, rule: &Rule, parents: &[&Node]) {
        let nested = parents.iter().any(|node| matches!(node, Node::Rule(_)));
        let selector = effective_selector(rule, parents);
        self.validator
            .check_selector(rule, &selector, nested, &mut self.diagnostics);
        self.validator.check_declarations(rule, &mut self.diagnostics);
    }

    fn visit_at_rule(&mut self, at_rule: &AtRule, _parents: &[&Node]) {
        self.validator.check_at_rule(at_rule, &mut self.diagnostics);
    }
}

/// Resolve a rule's selector against its enclosing rules
fn effective_selector(rule: &Rule, parents: &[&Node]) -> String {
    let parent = parents
        .iter()
        .filter_map(|node| match node {
            Node::Rule(r) => Some(r.selector.as_str()),
            Node::AtRule(_) => None,
        })
        .fold(None::<String>, |acc, sel| match acc {
            Some(outer) => Some(ast::resolve_child_selector(&outer, sel)),
            None => Some(sel.to_string()),
        });

    match parent {
        Some(parent) => ast::resolve_child_selector(&parent, &rule.selector),
        None => rule.selector.clone(),
    }
}

/// Heuristic plausibility of a declaration value
///
/// The whole value is tried first; multi-part values (`1rem 2rem`) pass when
/// every top-level part does.
fn is_plausible_value(property: &str, value: &str) -> bool {
    if is_plausible_part(property, value) {
        return true;
    }
    let parts = split_top_level(value);
    parts.len() > 1 && parts.iter().all(|part| is_plausible_part(property, part))
}

fn is_plausible_part(property: &str, part: &str) -> bool {
    let color_like = COLOR_PROPERTY.is_match(property);
    let length_like = LENGTH_PROPERTY.is_match(property);

    VAR.is_match(part)
        || (color_like
            && (HEX_COLOR.is_match(part)
                || COLOR_FUNCTION.is_match(part)
                || NAMED_COLORS.contains(&part.to_ascii_lowercase().as_str())))
        || (length_like && (LENGTH.is_match(part) || NUMBER.is_match(part)))
        || (property == "content" && is_quoted(part))
        || URL.is_match(part)
        || KEYWORDS.contains(&part)
        || FUNCTION.is_match(part)
}

fn is_quoted(value: &str) -> bool {
    let mut chars = value.chars();
    match (chars.next(), chars.next_back()) {
        (Some(first @ ('"' | '\'')), Some(last)) => first == last,
        _ => false,
    }
}

/// Split on whitespace outside parentheses
fn split_top_level(value: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = None;

    for (idx, ch) in value.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            c if c.is_whitespace() && depth == 0 => {
                if let Some(s) = start.take() {
                    parts.push(&value[s..idx]);
                }
                continue;
            }
            _ => {}
        }
        if start.is_none() {
            start = Some(idx);
        }
    }
    if let Some(s) = start {
        parts.push(&value[s..]);
    }
    parts
}
