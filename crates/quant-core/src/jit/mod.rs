//! Just-in-time CSS generation
//!
//! - [`matcher`]: which flat rules are in use (flex / strict)
//! - [`compiler`]: rendering kept rules to CSS text
//! - [`emit`]: joining and writing the stylesheet
//! - [`cache`]: the two-hash whole-build cache

pub mod cache;
pub mod compiler;
pub mod emit;
pub mod matcher;

pub use cache::{
    CACHE_VERSION, CacheStore, DEFAULT_BUILD_CACHE_FILE, FileCacheStore, JitCache, MemoryCacheStore,
    NoopCacheStore, hash_source, hash_used,
};
pub use compiler::{JitCompiler, compile_jit, render_flat_rule};
pub use emit::{Emitter, FileEmitter, emit_css, render_stylesheet};
pub use matcher::{MatchMode, Matcher, RuleIndex, UsageIndex, match_selector};
