//! Configuration types for quant

use crate::discovery::DEFAULT_EXTENSIONS;
use crate::jit::{DEFAULT_BUILD_CACHE_FILE, MatchMode};
use crate::scanner::DEFAULT_USAGE_CACHE_FILE;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Project configuration
///
/// Every key is optional in the file; missing keys take their defaults.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct QuantConfig {
    /// JSON Schema reference (ignored)
    #[serde(rename = "$schema", skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Utility stylesheet source
    #[schemars(description = "Path of the utility stylesheet source (.qs)")]
    pub source: PathBuf,

    /// Content root scanned for used classes
    #[schemars(description = "Directory scanned for class usage")]
    pub content: PathBuf,

    /// Emitted stylesheet
    #[schemars(description = "Path the generated CSS is written to")]
    pub output: PathBuf,

    #[schemars(description = "File extensions scanned for class usage")]
    pub extensions: Vec<String>,

    #[schemars(description = "Rule matching policy: 'flex' or 'strict'")]
    pub match_mode: MatchMode,

    #[schemars(description = "Collapse whitespace in the emitted CSS")]
    pub minify: bool,

    /// Variant keywords in addition to the built-in ones
    #[schemars(description = "Extra variant prefixes (e.g. 'print')")]
    pub variants: Vec<String>,

    /// Property names in addition to the built-in catalog
    #[schemars(description = "Extra CSS property names accepted by the validator")]
    pub properties: Vec<String>,

    #[schemars(description = "Build and usage cache settings")]
    pub cache: CacheConfiguration,
}

impl Default for QuantConfig {
    fn default() -> Self {
        Self {
            schema: None,
            source: PathBuf::from("styles/utilities.qs"),
            content: PathBuf::from("src"),
            output: PathBuf::from("dist/quant.css"),
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            match_mode: MatchMode::default(),
            minify: false,
            variants: Vec::new(),
            properties: Vec::new(),
            cache: CacheConfiguration::default(),
        }
    }
}

/// Cache configuration
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct CacheConfiguration {
    #[schemars(description = "Use the build and usage caches")]
    pub enabled: bool,

    #[schemars(description = "Whole-build cache record")]
    pub build_cache_file: PathBuf,

    #[schemars(description = "Per-file class usage cache")]
    pub usage_cache_file: PathBuf,
}

impl Default for CacheConfiguration {
    fn default() -> Self {
        Self {
            enabled: true,
            build_cache_file: PathBuf::from(DEFAULT_BUILD_CACHE_FILE),
            usage_cache_file: PathBuf::from(DEFAULT_USAGE_CACHE_FILE),
        }
    }
}

impl QuantConfig {
    /// Make every relative path absolute against `base`
    pub fn resolve_paths(&mut self, base: &Path) {
        for path in [
            &mut self.source,
            &mut self.content,
            &mut self.output,
            &mut self.cache.build_cache_file,
            &mut self.cache.usage_cache_file,
        ] {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }

    /// Extensions without a leading dot, lowercased
    pub fn normalized_extensions(&self) -> Vec<String> {
        self.extensions
            .iter()
            .map(|ext| ext.trim_start_matches('.').to_ascii_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = QuantConfig::default();
        assert_eq!(config.source, PathBuf::from("styles/utilities.qs"));
        assert_eq!(config.match_mode, MatchMode::Flex);
        assert!(config.cache.enabled);
        assert_eq!(config.cache.build_cache_file, PathBuf::from(".quant-jitcache.json"));
        assert!(config.extensions.contains(&"svelte".to_string()));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: QuantConfig =
            serde_json::from_str(r#"{"matchMode": "strict", "cache": {"enabled": false}}"#).unwrap();
        assert_eq!(config.match_mode, MatchMode::Strict);
        assert!(!config.cache.enabled);
        assert_eq!(config.cache.usage_cache_file, PathBuf::from(".quantcache.json"));
        assert_eq!(config.output, PathBuf::from("dist/quant.css"));
    }

    #[test]
    fn test_resolve_paths_keeps_absolute() {
        let mut config = QuantConfig {
            output: PathBuf::from("/tmp/out.css"),
            ..Default::default()
        };
        config.resolve_paths(Path::new("/project"));
        assert_eq!(config.source, PathBuf::from("/project/styles/utilities.qs"));
        assert_eq!(config.output, PathBuf::from("/tmp/out.css"));
        assert_eq!(
            config.cache.build_cache_file,
            PathBuf::from("/project/.quant-jitcache.json")
        );
    }

    #[test]
    fn test_normalized_extensions() {
        let config = QuantConfig {
            extensions: vec![".HTML".into(), "vue".into(), ".".into()],
            ..Default::default()
        };
        assert_eq!(config.normalized_extensions(), vec!["html", "vue"]);
    }
}
