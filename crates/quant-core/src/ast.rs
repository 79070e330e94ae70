//! Stylesheet AST and tree utilities
//!
//! The tree is a closed sum: a [`StyleSheet`] holds [`Node`]s, each either a
//! [`Rule`] (selector + declarations + nested children) or an [`AtRule`]
//! (name + prelude + optional block). Declarations only live inside rules.
//!
//! This module also hosts the rewrites that run between parsing and code
//! generation:
//! - [`expand_nesting`] resolves nested rules against their parent selector
//!   and promotes them to siblings,
//! - [`collect_flat_rules`] turns the tree into [`FlatRule`]s that remember
//!   their enclosing at-rules.

use crate::lexer::Position;
use serde::{Deserialize, Serialize};

/// Placeholder for the parent selector inside a nested rule
pub const PARENT_PLACEHOLDER: char = '&';

/// Source span of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Loc {
    pub start: Position,
    pub end: Position,
}

impl Loc {
    pub const fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }
}

/// Root of a parsed `.qs` file
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StyleSheet {
    pub body: Vec<Node>,
}

impl StyleSheet {
    pub fn new(body: Vec<Node>) -> Self {
        Self { body }
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

/// A statement: utility rule or at-rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Node {
    Rule(Rule),
    AtRule(AtRule),
}

impl Node {
    pub fn loc(&self) -> Loc {
        match self {
            Node::Rule(rule) => rule.loc,
            Node::AtRule(at_rule) => at_rule.loc,
        }
    }
}

impl From<Rule> for Node {
    fn from(rule: Rule) -> Self {
        Node::Rule(rule)
    }
}

impl From<AtRule> for Node {
    fn from(at_rule: AtRule) -> Self {
        Node::AtRule(at_rule)
    }
}

/// `selector { declarations; nested... }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub selector: String,
    pub declarations: Vec<Declaration>,
    /// Nested rules and at-rules; empty once nesting has been expanded
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
    pub loc: Loc,
}

impl Rule {
    pub fn new(selector: impl Into<String>, declarations: Vec<Declaration>) -> Self {
        Self {
            selector: selector.into(),
            declarations,
            children: Vec::new(),
            loc: Loc::default(),
        }
    }

    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    pub fn with_loc(mut self, loc: Loc) -> Self {
        self.loc = loc;
        self
    }
}

/// `@name prelude;` or `@name prelude { ... }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtRule {
    pub name: String,
    pub prelude: String,
    /// `None` for a bodiless at-rule terminated by `;`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block: Option<Vec<Node>>,
    pub loc: Loc,
}

impl AtRule {
    pub fn new(name: impl Into<String>, prelude: impl Into<String>, block: Option<Vec<Node>>) -> Self {
        Self {
            name: name.into(),
            prelude: prelude.into(),
            block,
            loc: Loc::default(),
        }
    }

    pub fn with_loc(mut self, loc: Loc) -> Self {
        self.loc = loc;
        self
    }

    pub fn context(&self) -> AtContext {
        AtContext {
            name: self.name.clone(),
            prelude: self.prelude.clone(),
        }
    }
}

/// `property: value [!important]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declaration {
    pub property: String,
    pub value: String,
    #[serde(default)]
    pub important: bool,
    pub loc: Loc,
}

impl Declaration {
    pub fn new(property: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            value: value.into(),
            important: false,
            loc: Loc::default(),
        }
    }

    pub fn with_loc(mut self, loc: Loc) -> Self {
        self.loc = loc;
        self
    }

    pub fn important(mut self) -> Self {
        self.important = true;
        self
    }
}

/// One enclosing at-rule of a flat rule
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AtContext {
    pub name: String,
    pub prelude: String,
}

/// A leaf rule together with the at-rules it must be re-emitted inside
///
/// `at_context` is ordered outer to inner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatRule {
    pub selector: String,
    pub declarations: Vec<Declaration>,
    pub at_context: Vec<AtContext>,
    pub loc: Loc,
}

/// Callbacks for [`walk`]
///
/// `parents` holds the ancestors of the visited node, outermost first.
pub trait Visitor {
    fn visit_rule(&mut self, _rule: &Rule, _parents: &[&Node]) {}

    fn visit_at_rule(&mut self, _at_rule: &AtRule, _parents: &[&Node]) {}
}

/// Depth-first, pre-order walk over every node of a stylesheet
pub fn walk<V: Visitor + ?Sized>(sheet: &StyleSheet, visitor: &mut V) {
    let mut stack: Vec<&Node> = Vec::new();
    for node in &sheet.body {
        walk_node(node, visitor, &mut stack);
    }
}

fn walk_node<'a, V: Visitor + ?Sized>(node: &'a Node, visitor: &mut V, stack: &mut Vec<&'a Node>) {
    match node {
        Node::Rule(rule) => {
            visitor.visit_rule(rule, stack);
            stack.push(node);
            for child in &rule.children {
                walk_node(child, visitor, stack);
            }
            stack.pop();
        }
        Node::AtRule(at_rule) => {
            visitor.visit_at_rule(at_rule, stack);
            stack.push(node);
            for child in at_rule.block.iter().flatten() {
                walk_node(child, visitor, stack);
            }
            stack.pop();
        }
    }
}

/// Resolve a nested selector against its parent
///
/// Every `&` is replaced by the parent selector. Without a placeholder the
/// child is composed onto the parent as a variant: `btn` + `hover` gives
/// `btn:hover`, `btn` + `:focus` gives `btn:focus`.
pub fn resolve_child_selector(parent: &str, child: &str) -> String {
    if child.contains(PARENT_PLACEHOLDER) {
        return child.replace(PARENT_PLACEHOLDER, parent);
    }
    if child.starts_with(':') {
        format!("{parent}{child}")
    } else {
        format!("{parent}:{child}")
    }
}

/// Expand nested rules into sibling rules with resolved selectors
///
/// Each rule is emitted without its children, followed by its children
/// resolved against the rule's own selector (and recursively expanded), in
/// declaration order. At-rules keep their position and are expanded
/// internally; rules inside an at-rule nested in a rule are still resolved
/// against that rule's selector.
pub fn expand_nesting(sheet: &StyleSheet) -> StyleSheet {
    let body = sheet
        .body
        .iter()
        .flat_map(|node| expand_node(node, None))
        .collect();
    StyleSheet::new(body)
}

fn expand_node(node: &Node, parent_selector: Option<&str>) -> Vec<Node> {
    match node {
        Node::Rule(rule) => {
            let selector = match parent_selector {
                Some(parent) => resolve_child_selector(parent, &rule.selector),
                None => rule.selector.clone(),
            };
            expand_rule(rule, selector)
        }
        Node::AtRule(at_rule) => {
            let block = at_rule.block.as_ref().map(|block| {
                block
                    .iter()
                    .flat_map(|child| expand_node(child, parent_selector))
                    .collect()
            });
            vec![Node::AtRule(AtRule {
                name: at_rule.name.clone(),
                prelude: at_rule.prelude.clone(),
                block,
                loc: at_rule.loc,
            })]
        }
    }
}

fn expand_rule(rule: &Rule, selector: String) -> Vec<Node> {
    let mut out = Vec::with_capacity(1 + rule.children.len());
    out.push(Node::Rule(Rule {
        selector: selector.clone(),
        declarations: rule.declarations.clone(),
        children: Vec::new(),
        loc: rule.loc,
    }));

    for child in &rule.children {
        out.extend(expand_node(child, Some(&selector)));
    }
    out
}

/// Collect every rule as a [`FlatRule`] carrying its at-rule ancestors
///
/// Intended to run on an expanded stylesheet. On a raw tree, nested children
/// are collected as-is (their selectors are not resolved).
pub fn collect_flat_rules(sheet: &StyleSheet) -> Vec<FlatRule> {
    let mut flat = Vec::new();
    let mut context = Vec::new();
    for node in &sheet.body {
        collect_node(node, &mut context, &mut flat);
    }
    flat
}

fn collect_node(node: &Node, context: &mut Vec<AtContext>, flat: &mut Vec<FlatRule>) {
    match node {
        Node::Rule(rule) => {
            flat.push(FlatRule {
                selector: rule.selector.clone(),
                declarations: rule.declarations.clone(),
                at_context: context.clone(),
                loc: rule.loc,
            });
            for child in &rule.children {
                collect_node(child, context, flat);
            }
        }
        Node::AtRule(at_rule) => {
            context.push(at_rule.context());
            for child in at_rule.block.iter().flatten() {
                collect_node(child, context, flat);
            }
            context.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Re-wrap a flat rule in one at-rule per context entry, outermost first
    fn rewrap(flat: &FlatRule) -> Node {
        let rule = Rule {
            selector: flat.selector.clone(),
            declarations: flat.declarations.clone(),
            children: Vec::new(),
            loc: flat.loc,
        };

        flat.at_context.iter().rev().fold(Node::Rule(rule), |inner, ctx| {
            Node::AtRule(AtRule {
                name: ctx.name.clone(),
                prelude: ctx.prelude.clone(),
                block: Some(vec![inner]),
                loc: flat.loc,
            })
        })
    }

    fn rule(selector: &str, property: &str, value: &str) -> Rule {
        Rule::new(selector, vec![Declaration::new(property, value)])
    }

    fn selectors(sheet: &StyleSheet) -> Vec<String> {
        collect_flat_rules(sheet)
            .into_iter()
            .map(|r| r.selector)
            .collect()
    }

    #[test]
    fn test_resolve_with_placeholder() {
        assert_eq!(resolve_child_selector("btn", "&:hover"), "btn:hover");
        assert_eq!(resolve_child_selector("btn", "md:&"), "md:btn");
        assert_eq!(resolve_child_selector("a:b", "&-&"), "a:b-a:b");
    }

    #[test]
    fn test_resolve_without_placeholder() {
        assert_eq!(resolve_child_selector("btn", "hover"), "btn:hover");
        assert_eq!(resolve_child_selector("btn", ":focus"), "btn:focus");
    }

    #[test]
    fn test_expand_promotes_children_in_order() {
        let sheet = StyleSheet::new(vec![
            rule("btn", "color", "red")
                .with_children(vec![
                    rule("&:hover", "color", "blue")
                        .with_children(vec![rule("active", "color", "green").into()])
                        .into(),
                    rule(":focus", "outline", "none").into(),
                ])
                .into(),
            rule("card", "padding", "1rem").into(),
        ]);

        let expanded = expand_nesting(&sheet);
        assert_eq!(
            selectors(&expanded),
            vec![
                "btn",
                "btn:hover",
                "btn:hover:active",
                "btn:focus",
                "card"
            ]
        );
        assert!(expanded.body.iter().all(|n| match n {
            Node::Rule(r) => r.children.is_empty(),
            Node::AtRule(_) => true,
        }));
    }

    #[test]
    fn test_expand_keeps_at_rules_in_place() {
        let sheet = StyleSheet::new(vec![
            AtRule::new(
                "media",
                "(min-width: 768px)",
                Some(vec![
                    rule("btn", "color", "red")
                        .with_children(vec![rule("&:hover", "color", "blue").into()])
                        .into(),
                ]),
            )
            .into(),
        ]);

        let expanded = expand_nesting(&sheet);
        assert_eq!(expanded.body.len(), 1);
        let Node::AtRule(media) = &expanded.body[0] else {
            panic!("expected at-rule");
        };
        assert_eq!(media.block.as_ref().map(Vec::len), Some(2));
    }

    #[test]
    fn test_at_rule_inside_rule_resolves_against_rule() {
        let sheet = StyleSheet::new(vec![
            rule("btn", "color", "red")
                .with_children(vec![
                    AtRule::new(
                        "media",
                        "print",
                        Some(vec![rule("&:hover", "color", "black").into()]),
                    )
                    .into(),
                ])
                .into(),
        ]);

        let flat = collect_flat_rules(&expand_nesting(&sheet));
        assert_eq!(flat.len(), 2);
        assert_eq!(flat[1].selector, "btn:hover");
        assert_eq!(flat[1].at_context[0].prelude, "print");
    }

    #[test]
    fn test_flat_rules_carry_context_outer_to_inner() {
        let sheet = StyleSheet::new(vec![
            AtRule::new(
                "media",
                "screen",
                Some(vec![
                    AtRule::new(
                        "supports",
                        "(display: grid)",
                        Some(vec![
                            AtRule::new("layer", "utilities", Some(vec![rule("grid", "display", "grid").into()]))
                                .into(),
                        ]),
                    )
                    .into(),
                ]),
            )
            .into(),
            rule("flex", "display", "flex").into(),
        ]);

        let flat = collect_flat_rules(&sheet);
        assert_eq!(flat.len(), 2);
        let names: Vec<_> = flat[0].at_context.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["media", "supports", "layer"]);
        assert!(flat[1].at_context.is_empty());
    }

    #[test]
    fn test_rewrapping_reproduces_depth() {
        let flat = FlatRule {
            selector: "grid".to_string(),
            declarations: vec![Declaration::new("display", "grid")],
            at_context: vec![
                AtContext {
                    name: "media".to_string(),
                    prelude: "screen".to_string(),
                },
                AtContext {
                    name: "supports".to_string(),
                    prelude: "(display: grid)".to_string(),
                },
            ],
            loc: Loc::default(),
        };

        let sheet = StyleSheet::new(vec![rewrap(&flat)]);
        assert_eq!(collect_flat_rules(&sheet), vec![flat]);
    }

    #[test]
    fn test_expansion_is_idempotent() {
        let sheet = StyleSheet::new(vec![
            rule("btn", "color", "red")
                .with_children(vec![rule("hover", "color", "blue").into()])
                .into(),
        ]);
        let once = expand_nesting(&sheet);
        let twice = expand_nesting(&once);
        assert_eq!(once, twice);
        assert_eq!(collect_flat_rules(&once), collect_flat_rules(&twice));
    }

    #[derive(Default)]
    struct Recorder {
        events: Vec<(String, usize)>,
    }

    impl Visitor for Recorder {
        fn visit_rule(&mut self, rule: &Rule, parents: &[&Node]) {
            self.events.push((rule.selector.clone(), parents.len()));
        }

        fn visit_at_rule(&mut self, at_rule: &AtRule, parents: &[&Node]) {
            self.events.push((format!("@{}", at_rule.name), parents.len()));
        }
    }

    #[test]
    fn test_walk_reports_parents() {
        let sheet = StyleSheet::new(vec![
            AtRule::new(
                "media",
                "print",
                Some(vec![
                    rule("btn", "color", "red")
                        .with_children(vec![rule("&:hover", "color", "blue").into()])
                        .into(),
                ]),
            )
            .into(),
        ]);

        let mut recorder = Recorder::default();
        walk(&sheet, &mut recorder);
        assert_eq!(
            recorder.events,
            vec![
                ("@media".to_string(), 0),
                ("btn".to_string(), 1),
                ("&:hover".to_string(), 2),
            ]
        );
    }
}
