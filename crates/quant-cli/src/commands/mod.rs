//! CLI command implementations
//!
//! - build: one-shot compilation
//! - check: validation report
//! - dev: watch mode
//! - config: init, show, schema

pub mod build;
pub mod check;
pub mod config;
pub mod dev;

use quant_core::{
    BuildOptions, BuildPipeline, CacheStore, ConfigLoader, FileCacheStore, FileSource,
    LoadedConfig, MatchMode, NoopCacheStore, ProjectScanner, PropertyCatalog, QuantError,
    QuantConfig, Result, VariantSet,
};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Command-line overrides for a build
#[derive(Debug, Clone, Default)]
pub struct BuildFlags {
    pub minify: bool,
    /// Overrides the configured match mode when set
    pub mode: Option<MatchMode>,
    pub no_cache: bool,
    pub output: Option<PathBuf>,
}

/// Load the configuration from `--config` or by discovery from the working directory
pub fn load_config(config_path: Option<&Path>) -> Result<LoadedConfig> {
    let cwd = std::env::current_dir().map_err(|e| QuantError::io_error(".", e))?;
    let loaded = ConfigLoader::load(config_path, &cwd)?;
    match &loaded.path {
        Some(path) => debug!("Using config {}", path.display()),
        None => debug!("Using default configuration"),
    }
    Ok(loaded)
}

/// Everything a build needs, derived from config plus flags
pub struct Project {
    pub config: QuantConfig,
    pub base_dir: PathBuf,
    pub flags: BuildFlags,
}

impl Project {
    pub fn new(loaded: LoadedConfig, flags: BuildFlags) -> Self {
        Self {
            config: loaded.config,
            base_dir: loaded.base_dir,
            flags,
        }
    }

    pub fn catalog(&self) -> PropertyCatalog {
        PropertyCatalog::standard().with_extra(self.config.properties.iter())
    }

    pub fn variants(&self) -> VariantSet {
        VariantSet::standard().with_extra(self.config.variants.iter())
    }

    pub fn options(&self) -> BuildOptions {
        let mode = self.flags.mode.unwrap_or(self.config.match_mode);
        BuildOptions::new(mode).with_variants(self.variants())
    }

    pub fn minify(&self) -> bool {
        self.flags.minify || self.config.minify
    }

    pub fn output_path(&self) -> PathBuf {
        self.flags
            .output
            .clone()
            .unwrap_or_else(|| self.config.output.clone())
    }

    fn caching(&self) -> bool {
        self.config.cache.enabled && !self.flags.no_cache
    }

    /// Usage scanner over the content root, with the per-file cache when enabled
    pub fn scanner(&self) -> ProjectScanner {
        let scanner = ProjectScanner::new(&self.config.content, self.catalog())
            .with_extensions(self.config.normalized_extensions());

        if self.config.cache.enabled {
            scanner
                .with_cache_file(&self.config.cache.usage_cache_file, &self.base_dir)
                .no_cache(self.flags.no_cache)
        } else {
            scanner
        }
    }

    pub fn pipeline(&self) -> BuildPipeline {
        let cache: Box<dyn CacheStore> = if self.caching() {
            Box::new(FileCacheStore::new(&self.config.cache.build_cache_file))
        } else {
            Box::new(NoopCacheStore)
        };

        BuildPipeline::new(
            Box::new(FileSource::new(&self.config.source)),
            Box::new(self.scanner()),
            cache,
        )
        .with_options(self.options())
    }

    /// Paths shown relative to the project base when possible
    pub fn display_path<'a>(&self, path: &'a Path) -> std::borrow::Cow<'a, str> {
        path.strip_prefix(&self.base_dir)
            .unwrap_or(path)
            .to_string_lossy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(config: QuantConfig, flags: BuildFlags) -> Project {
        Project {
            config,
            base_dir: PathBuf::from("/project"),
            flags,
        }
    }

    #[test]
    fn test_flags_override_config() {
        let config = QuantConfig {
            match_mode: MatchMode::Flex,
            ..Default::default()
        };
        let flags = BuildFlags {
            mode: Some(MatchMode::Strict),
            minify: true,
            output: Some(PathBuf::from("out.css")),
            ..Default::default()
        };
        let project = project(config, flags);

        assert_eq!(project.options().mode, MatchMode::Strict);
        assert!(project.minify());
        assert_eq!(project.output_path(), PathBuf::from("out.css"));
    }

    #[test]
    fn test_config_extends_catalog_and_variants() {
        let config = QuantConfig {
            variants: vec!["print".to_string()],
            properties: vec!["scrollbar-gutter".to_string()],
            ..Default::default()
        };
        let project = project(config, BuildFlags::default());

        assert!(project.variants().contains("print"));
        assert!(project.catalog().contains("scrollbar-gutter"));
        assert_eq!(project.options().mode, MatchMode::Flex);
    }

    #[test]
    fn test_display_path_is_relative_to_base() {
        let project = project(QuantConfig::default(), BuildFlags::default());
        assert_eq!(
            project.display_path(Path::new("/project/dist/quant.css")),
            "dist/quant.css"
        );
        assert_eq!(project.display_path(Path::new("/elsewhere/a.css")), "/elsewhere/a.css");
    }
}
