//! Build orchestration
//!
//! [`BuildPipeline`] ties the collaborators together:
//!
//! ```text
//! source ─┐
//!         ├─ hash both ── fresh record? ── yes ─▶ cached rules
//! usage ──┘                    │
//!                              no
//!                              ▼
//!          lex → parse → expand → flatten → match/render ─▶ save record
//! ```
//!
//! Writing the stylesheet is left to the caller (see [`crate::jit::Emitter`]).

use crate::ast::{FlatRule, collect_flat_rules, expand_nesting};
use crate::catalog::PropertyCatalog;
use crate::diagnostics::ValidationResult;
use crate::jit::{CacheStore, JitCache, JitCompiler, MatchMode, RuleIndex, hash_source, hash_used};
use crate::parser::{ParseError, ParseResult, parse};
use crate::scanner::ProjectScanner;
use crate::selector::VariantSet;
use crate::validator::Validator;
use crate::{QuantError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Supplies the DSL source text
pub trait SourceProvider {
    fn read_source(&self) -> Result<String>;

    /// Human-readable origin, for logs and diagnostics
    fn describe(&self) -> String;
}

/// Source read from a file on every build
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SourceProvider for FileSource {
    fn read_source(&self) -> Result<String> {
        fs::read_to_string(&self.path).map_err(|e| QuantError::io_error(&self.path, e))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Source held in memory
#[derive(Debug, Clone)]
pub struct InlineSource {
    text: String,
}

impl InlineSource {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl SourceProvider for InlineSource {
    fn read_source(&self) -> Result<String> {
        Ok(self.text.clone())
    }

    fn describe(&self) -> String {
        "<inline>".to_string()
    }
}

/// Supplies the complete, deduplicated used-class collection
pub trait UsageScanner {
    fn used_classes(&self) -> Result<Vec<String>>;
}

impl UsageScanner for ProjectScanner {
    fn used_classes(&self) -> Result<Vec<String>> {
        self.scan().map(|report| report.used)
    }
}

/// A fixed class list
#[derive(Debug, Clone, Default)]
pub struct StaticUsage {
    classes: Vec<String>,
}

impl StaticUsage {
    pub fn new<I, S>(classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            classes: classes.into_iter().map(Into::into).collect(),
        }
    }
}

impl UsageScanner for StaticUsage {
    fn used_classes(&self) -> Result<Vec<String>> {
        Ok(self.classes.clone())
    }
}

/// Compilation settings
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    pub mode: MatchMode,
    pub variants: VariantSet,
}

impl BuildOptions {
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

    /// Stored with the build record; cached rules are reused only under equal settings
    pub fn cache_key(&self) -> String {
        let variants: Vec<&str> = self.variants.iter().collect();
        format!("{};{}", self.mode, variants.join(","))
    }
}

/// Result of one build
#[derive(Debug, Clone)]
pub struct BuildOutput {
    /// Rendered rules, in source order
    pub rules: Vec<String>,
    /// The used-class collection the rules were matched against
    pub used: Vec<String>,
    /// True when the rules came from the build cache
    pub from_cache: bool,
    /// Recovered parse errors (always empty on a cache hit)
    pub parse_errors: Vec<ParseError>,
    pub duration: Duration,
}

/// Compiled output of a source string, without caching
#[derive(Debug, Clone)]
pub struct Compilation {
    pub rules: Vec<String>,
    pub flat_rules: Vec<FlatRule>,
    pub parse_errors: Vec<ParseError>,
}

/// Run lex → parse → expand → flatten → match/render over in-memory inputs
pub fn compile_source<S: AsRef<str>>(source: &str, used: &[S], options: &BuildOptions) -> Compilation {
    let ParseResult { stylesheet, errors } = parse(source);
    let expanded = expand_nesting(&stylesheet);
    let flat_rules = collect_flat_rules(&expanded);
    let rules = JitCompiler::new(options.mode)
        .with_variants(options.variants.clone())
        .compile(&flat_rules, used);

    debug!(
        "Compiled {} flat rules into {} CSS rules ({} parse errors)",
        flat_rules.len(),
        rules.len(),
        errors.len()
    );
    Compilation {
        rules,
        flat_rules,
        parse_errors: errors,
    }
}

/// Build pipeline over pluggable source, usage and cache collaborators
pub struct BuildPipeline {
    source: Box<dyn SourceProvider>,
    usage: Box<dyn UsageScanner>,
    cache: Box<dyn CacheStore>,
    options: BuildOptions,
}

impl BuildPipeline {
    pub fn new(
        source: Box<dyn SourceProvider>,
        usage: Box<dyn UsageScanner>,
        cache: Box<dyn CacheStore>,
    ) -> Self {
        Self {
            source,
            usage,
            cache,
            options: BuildOptions::new(MatchMode::default()),
        }
    }

    pub fn with_options(mut self, options: BuildOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    /// Run one build
    ///
    /// Fails only when the source or the usage scan cannot be read. A cache
    /// that cannot be saved is logged and the fresh rules are still returned.
    pub fn run(&self) -> Result<BuildOutput> {
        let start = Instant::now();

        let source = self.source.read_source()?;
        let used = self.usage.used_classes()?;

        let source_hash = hash_source(&source);
        let used_hash = hash_used(&used);
        let settings = self.options.cache_key();

        if let Some(record) = self.cache.load()
            && record.is_fresh(&source_hash, &used_hash)
            && record.settings == settings
        {
            info!(
                "Build cache hit for {}: {} rules",
                self.source.describe(),
                record.css.len()
            );
            return Ok(BuildOutput {
                rules: record.css,
                used,
                from_cache: true,
                parse_errors: Vec::new(),
                duration: start.elapsed(),
            });
        }

        let compilation = compile_source(&source, &used, &self.options);
        for error in &compilation.parse_errors {
            warn!("{}: {}", self.source.describe(), error);
        }

        let record =
            JitCache::new(source_hash, used_hash, compilation.rules.clone()).with_settings(settings);
        if let Err(e) = self.cache.save(&record) {
            warn!("Failed to save build cache: {}", e);
        }

        info!(
            "Built {} rules from {} ({} used classes)",
            compilation.rules.len(),
            self.source.describe(),
            used.len()
        );
        Ok(BuildOutput {
            rules: compilation.rules,
            used,
            from_cache: false,
            parse_errors: compilation.parse_errors,
            duration: start.elapsed(),
        })
    }
}

/// Findings of a check pass
#[derive(Debug, Clone, Default)]
pub struct CheckReport {
    pub parse_errors: Vec<ParseError>,
    pub validation: ValidationResult,
    /// Used classes that no rule in the source produces
    pub undeclared: Vec<String>,
}

impl CheckReport {
    pub fn has_errors(&self) -> bool {
        !self.parse_errors.is_empty() || self.validation.has_errors()
    }
}

/// Parse and validate `source`, then report used classes without a rule
pub fn check_source<S: AsRef<str>>(
    source: &str,
    used: &[S],
    catalog: &PropertyCatalog,
    options: &BuildOptions,
) -> CheckReport {
    let ParseResult { stylesheet, errors } = parse(source);
    let validation = Validator::new(catalog)
        .with_variants(options.variants.clone())
        .validate(&stylesheet);

    let flat_rules = collect_flat_rules(&expand_nesting(&stylesheet));
    let declared = RuleIndex::new(
        flat_rules.iter().map(|rule| rule.selector.as_str()),
        options.mode,
        options.variants.clone(),
    );
    let undeclared = used
        .iter()
        .map(|class| class.as_ref())
        .filter(|class| !declared.covers(class))
        .map(str::to_string)
        .collect();

    CheckReport {
        parse_errors: errors,
        validation,
        undeclared,
    }
}
