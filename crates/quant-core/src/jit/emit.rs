//! Writing compiled rules to disk

use crate::{QuantError, Result};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::debug;

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Join rule texts into a stylesheet
///
/// Rules are newline-separated; when minifying they are concatenated and
/// every whitespace run collapses to one space.
pub fn render_stylesheet<S: AsRef<str>>(rules: &[S], minify: bool) -> String {
    let parts: Vec<&str> = rules.iter().map(AsRef::as_ref).collect();
    if minify {
        WHITESPACE_RUN
            .replace_all(&parts.concat(), " ")
            .into_owned()
    } else {
        parts.join("\n")
    }
}

/// Destination for compiled rules
pub trait Emitter {
    fn emit(&self, rules: &[String], minify: bool) -> Result<()>;
}

/// Writes the stylesheet to a file, creating parent directories
#[derive(Debug, Clone)]
pub struct FileEmitter {
    path: PathBuf,
}

impl FileEmitter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Emitter for FileEmitter {
    fn emit(&self, rules: &[String], minify: bool) -> Result<()> {
        emit_css(rules, &self.path, minify)
    }
}

/// Render and write rules to `path`
pub fn emit_css(rules: &[String], path: &Path, minify: bool) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| QuantError::io_error(parent, e))?;
    }

    let css = render_stylesheet(rules, minify);
    fs::write(path, &css).map_err(|e| QuantError::io_error(path, e))?;

    debug!("Wrote {} rules ({} bytes) to {}", rules.len(), css.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_render_joins_with_newlines() {
        let css = render_stylesheet(&[".a{color:red;}", ".b{margin:0;}"], false);
        assert_eq!(css, ".a{color:red;}\n.b{margin:0;}");
    }

    #[test]
    fn test_render_minified_collapses_whitespace() {
        let rules = ["@media (min-width:  768px){.a{padding:1px\n 2px;}}", ".b{margin:0;}"];
        let css = render_stylesheet(&rules, true);
        assert_eq!(css, "@media (min-width: 768px){.a{padding:1px 2px;}}.b{margin:0;}");
    }

    #[test]
    fn test_emit_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dist/nested/quant.css");
        let emitter = FileEmitter::new(&path);

        emitter
            .emit(&[".a{color:red;}".to_string()], false)
            .unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), ".a{color:red;}");
    }

    #[test]
    fn test_emit_empty_rule_list_writes_empty_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.css");
        emit_css(&[], &path, true).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }
}
