//! QuantCSS Core
//!
//! Compiler for `.qs` utility stylesheets. Sources are lexed, parsed into a
//! small rule tree with nesting, flattened, and only the rules whose classes
//! appear in the project are rendered to CSS. A two-hash build cache skips the
//! whole pipeline when neither the source nor the used-class set changed.

pub mod ast;
pub mod build;
pub mod catalog;
pub mod config;
pub mod console; // Terminal colour and width handling
pub mod diagnostics;
pub mod discovery;
pub mod error;
pub mod jit;
pub mod lexer;
pub mod parser;
pub mod result;
pub mod scanner;
pub mod selector;
pub mod validator;

// Re-export commonly used types
pub use ast::{
    AtContext, AtRule, Declaration, FlatRule, Loc, Node, Rule, StyleSheet, Visitor,
    collect_flat_rules, expand_nesting, resolve_child_selector, walk,
};
pub use build::{
    BuildOptions, BuildOutput, BuildPipeline, CheckReport, Compilation, FileSource, InlineSource,
    SourceProvider, StaticUsage, UsageScanner, check_source, compile_source,
};
pub use catalog::PropertyCatalog;
pub use config::{CacheConfiguration, ConfigLoader, LoadedConfig, QuantConfig};
pub use console::{Color, Console};
pub use diagnostics::{
    Diagnostic, DiagnosticRenderer, OutputFormat, Severity, SourceFile, ValidationResult,
};
pub use discovery::{
    DEFAULT_EXTENSIONS, DefaultFileDiscovery, FileChangeEvent, FileChangeKind, FileDiscovery,
    FileWatcher,
};
pub use error::{ErrorKind, QuantError};
pub use jit::{
    CacheStore, Emitter, FileCacheStore, FileEmitter, JitCache, JitCompiler, MatchMode,
    MemoryCacheStore, NoopCacheStore, RuleIndex, compile_jit, emit_css, hash_source, hash_used,
    match_selector,
};
pub use lexer::{Position, Token, TokenKind, lex};
pub use parser::{ParseError, ParseErrorKind, ParseResult, parse};
pub use result::{Result, ResultExt};
pub use scanner::{ProjectScanner, UsageCache, UsageReport, extract_classes};
pub use selector::VariantSet;
pub use validator::{Validator, validate};

/// Initialize the tracing subscriber for logging
pub fn init_tracing() {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("quant=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(true)
                .with_line_number(true),
        )
        .init();
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
