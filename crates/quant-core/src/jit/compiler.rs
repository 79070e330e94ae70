//! Flat rule → CSS text generation

use super::matcher::{MatchMode, Matcher};
use crate::ast::{AtContext, Declaration, FlatRule};
use crate::selector::VariantSet;
use tracing::debug;

/// Just-in-time compiler: keeps used flat rules and renders them
#[derive(Debug, Clone)]
pub struct JitCompiler {
    mode: MatchMode,
    variants: VariantSet,
}

impl JitCompiler {
    pub fn new(mode: MatchMode) -> Self {
        Self {
            mode,
            variants: VariantSet::standard(),
        }
    }

    pub fn with_variants(mut self, variants: VariantSet) -> Self {
        self.variants = variants;
        self
    }

    /// Render every flat rule whose selector is in use, in input order
    pub fn compile<S: AsRef<str>>(&self, rules: &[FlatRule], used: &[S]) -> Vec<String> {
        let matcher = Matcher::new(used, self.mode, self.variants.clone());

        let output: Vec<String> = rules
            .iter()
            .filter(|rule| matcher.matches(&rule.selector))
            .map(|rule| render_flat_rule(rule, matcher.base(&rule.selector)))
            .collect();

        debug!(
            "JIT kept {} of {} rules ({} mode, {} used classes)",
            output.len(),
            rules.len(),
            self.mode,
            used.len()
        );
        output
    }
}

impl Default for JitCompiler {
    fn default() -> Self {
        Self::new(MatchMode::default())
    }
}

/// Compile with the built-in variant set
pub fn compile_jit<S: AsRef<str>>(rules: &[FlatRule], used: &[S], mode: MatchMode) -> Vec<String> {
    JitCompiler::new(mode).compile(rules, used)
}

/// Render one rule as `.<base>{prop:value;...}` inside its at-rule wrappers
pub fn render_flat_rule(rule: &FlatRule, base: &str) -> String {
    let mut css = String::new();

    for ctx in &rule.at_context {
        css.push_str(&open_at_rule(ctx));
    }

    css.push('.');
    css.push_str(base);
    css.push('{');
    for decl in &rule.declarations {
        css.push_str(&render_declaration(decl));
    }
    css.push('}');

    css.push_str(&"}".repeat(rule.at_context.len()));
    css
}

/// `@name prelude{`; an empty prelude still keeps the separating space
fn open_at_rule(ctx: &AtContext) -> String {
    format!("@{} {}{{", ctx.name, ctx.prelude.trim())
}

fn render_declaration(decl: &Declaration) -> String {
    if decl.important {
        format!("{}:{}!important;", decl.property, decl.value)
    } else {
        format!("{}:{};", decl.property, decl.value)
    }
}
