//! Configuration file discovery and loading

use super::quant_config::QuantConfig;
use crate::{QuantError, Result};
use schemars::schema_for;
use std::fs;
use std::path::{Path, PathBuf};

/// Config file names in priority order
pub const CONFIG_FILE_NAMES: &[&str] = &[
    ".quantrc.json",
    ".quantrc.toml",
    "quant.yaml",
    "quant.yml",
    "quant.json",
];

/// A loaded configuration and where it came from
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: QuantConfig,
    /// The file it was read from, `None` when defaults were used
    pub path: Option<PathBuf>,
    /// Directory relative paths were resolved against
    pub base_dir: PathBuf,
}

/// Configuration loader for discovering and loading config files
pub struct ConfigLoader;

impl ConfigLoader {
    /// Auto-discover config file by traversing upward from start_path
    pub fn auto_discover(start_path: &Path) -> Result<Option<PathBuf>> {
        let mut current = start_path
            .canonicalize()
            .map_err(|e| QuantError::config_error(format!("Invalid path: {e}")))?;

        loop {
            for filename in CONFIG_FILE_NAMES {
                let config_path = current.join(filename);
                if config_path.is_file() {
                    tracing::debug!("Found config: {}", config_path.display());
                    return Ok(Some(config_path));
                }
            }

            match current.parent() {
                Some(parent) => current = parent.to_path_buf(),
                None => break,
            }
        }

        Ok(None)
    }

    /// Parse a config file by extension, paths left as written
    pub fn load_from_file(path: &Path) -> Result<QuantConfig> {
        let content = fs::read_to_string(path).map_err(|e| QuantError::io_error(path, e))?;
        let ext = path.extension().and_then(|e| e.to_str());

        let parsed = match ext {
            Some("json") => serde_json::from_str(&content).map_err(|e| e.to_string()),
            Some("toml") => toml::from_str(&content).map_err(|e| e.to_string()),
            Some("yaml") | Some("yml") => serde_yaml::from_str(&content).map_err(|e| e.to_string()),
            _ => Err("unsupported file extension (expected .json, .toml, .yaml or .yml)".to_string()),
        };

        parsed.map_err(|e| {
            QuantError::config_error(format!(
                "Failed to load config from '{}': {}",
                path.display(),
                e
            ))
        })
    }

    /// Load from `custom_path`, or discover upward from `start_dir`
    ///
    /// Without any config file the defaults apply, resolved against
    /// `start_dir`. Relative paths in a file resolve against its directory.
    pub fn load(custom_path: Option<&Path>, start_dir: &Path) -> Result<LoadedConfig> {
        let config_path = match custom_path {
            Some(path) if !path.exists() => {
                return Err(QuantError::config_error(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            Some(path) => Some(path.to_path_buf()),
            None => Self::auto_discover(start_dir)?,
        };

        let (mut config, base_dir) = match &config_path {
            Some(path) => {
                let base = path
                    .parent()
                    .filter(|p| !p.as_os_str().is_empty())
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| start_dir.to_path_buf());
                (Self::load_from_file(path)?, base)
            }
            None => {
                tracing::debug!("No config file found, using defaults");
                (QuantConfig::default(), start_dir.to_path_buf())
            }
        };

        config.resolve_paths(&base_dir);
        Ok(LoadedConfig {
            config,
            path: config_path,
            base_dir,
        })
    }

    /// JSON Schema of the config format
    pub fn schema_json() -> Result<String> {
        let schema = schema_for!(QuantConfig);
        serde_json::to_string_pretty(&schema)
            .map_err(|e| QuantError::internal_error(format!("Failed to serialize schema: {e}")))
    }

    /// Serialize a config for `path`, picking the format from its extension
    pub fn render(config: &QuantConfig, path: &Path) -> Result<String> {
        let ext = path.extension().and_then(|e| e.to_str());
        let rendered = match ext {
            Some("toml") => toml::to_string_pretty(config).map_err(|e| e.to_string()),
            Some("yaml") | Some("yml") => serde_yaml::to_string(config).map_err(|e| e.to_string()),
            _ => serde_json::to_string_pretty(config).map_err(|e| e.to_string()),
        };
        rendered.map_err(|e| QuantError::config_error(format!("Failed to serialize config: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jit::MatchMode;
    use tempfile::TempDir;

    fn create_temp_config(dir: &Path, filename: &str, content: &str) -> PathBuf {
        let path = dir.join(filename);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_from_file_json() {
        let temp_dir = TempDir::new().unwrap();
        let path = create_temp_config(
            temp_dir.path(),
            "quant.json",
            r#"{"matchMode": "strict", "minify": true, "variants": ["print"]}"#,
        );

        let config = ConfigLoader::load_from_file(&path).unwrap();
        assert_eq!(config.match_mode, MatchMode::Strict);
        assert!(config.minify);
        assert_eq!(config.variants, vec!["print"]);
    }

    #[test]
    fn test_load_from_file_toml() {
        let temp_dir = TempDir::new().unwrap();
        let path = create_temp_config(
            temp_dir.path(),
            ".quantrc.toml",
            r#"
source = "css/main.qs"

[cache]
enabled = false
"#,
        );

        let config = ConfigLoader::load_from_file(&path).unwrap();
        assert_eq!(config.source, PathBuf::from("css/main.qs"));
        assert!(!config.cache.enabled);
    }

    #[test]
    fn test_load_from_file_yaml() {
        let temp_dir = TempDir::new().unwrap();
        let path = create_temp_config(
            temp_dir.path(),
            "quant.yaml",
            "content: app\nproperties:\n  - scrollbar-color\n",
        );

        let config = ConfigLoader::load_from_file(&path).unwrap();
        assert_eq!(config.content, PathBuf::from("app"));
        assert_eq!(config.properties, vec!["scrollbar-color"]);
    }

    #[test]
    fn test_load_invalid_json() {
        let temp_dir = TempDir::new().unwrap();
        let path = create_temp_config(temp_dir.path(), "quant.json", "{ invalid json }");
        assert!(ConfigLoader::load_from_file(&path).is_err());
    }

    #[test]
    fn test_auto_discover_priority_and_upward() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("src/nested");
        fs::create_dir_all(&nested).unwrap();
        create_temp_config(temp_dir.path(), "quant.json", "{}");
        create_temp_config(temp_dir.path(), ".quantrc.json", "{}");

        let found = ConfigLoader::auto_discover(&nested).unwrap().unwrap();
        assert_eq!(found.file_name().unwrap(), ".quantrc.json");
    }

    #[test]
    fn test_load_resolves_against_config_dir() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("pkg");
        fs::create_dir_all(&nested).unwrap();
        create_temp_config(temp_dir.path(), ".quantrc.json", r#"{"output": "public/app.css"}"#);

        let loaded = ConfigLoader::load(None, &nested).unwrap();
        let root = temp_dir.path().canonicalize().unwrap();
        assert_eq!(loaded.config.output, root.join("public/app.css"));
        assert_eq!(loaded.base_dir, root);
        assert!(loaded.path.is_some());
    }

    #[test]
    fn test_load_missing_custom_path() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("nope.json");
        assert!(ConfigLoader::load(Some(&missing), temp_dir.path()).is_err());
    }

    #[test]
    fn test_schema_mentions_fields() {
        let schema = ConfigLoader::schema_json().unwrap();
        assert!(schema.contains("matchMode"));
        assert!(schema.contains("buildCacheFile"));
    }

    #[test]
    fn test_render_toml_round_trips() {
        let config = QuantConfig::default();
        let text = ConfigLoader::render(&config, Path::new(".quantrc.toml")).unwrap();
        let parsed: QuantConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }
}
