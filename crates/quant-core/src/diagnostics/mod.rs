//! Diagnostics produced by parsing and validation

mod renderer;

pub use renderer::{DiagnosticRenderer, OutputFormat, SourceFile};

use crate::ast::Loc;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        };
        f.write_str(text)
    }
}

/// A single finding anchored to a source span
///
/// Codes: `Q000` parse errors, `Q0xx` selectors, `Q1xx` declarations,
/// `Q19x` unsafe values, `Q3xx` at-rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub code: String,
    pub message: String,
    pub severity: Severity,
    pub loc: Loc,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl Diagnostic {
    pub fn new(code: impl Into<String>, message: impl Into<String>, severity: Severity, loc: Loc) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            severity,
            loc,
            hint: None,
            selector: None,
            property: None,
            value: None,
        }
    }

    pub fn error(code: impl Into<String>, message: impl Into<String>, loc: Loc) -> Self {
        Self::new(code, message, Severity::Error, loc)
    }

    pub fn warning(code: impl Into<String>, message: impl Into<String>, loc: Loc) -> Self {
        Self::new(code, message, Severity::Warning, loc)
    }

    pub fn info(code: impl Into<String>, message: impl Into<String>, loc: Loc) -> Self {
        Self::new(code, message, Severity::Info, loc)
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn with_selector(mut self, selector: impl Into<String>) -> Self {
        self.selector = Some(selector.into());
        self
    }

    pub fn with_property(mut self, property: impl Into<String>) -> Self {
        self.property = Some(property.into());
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Diagnostics partitioned by severity
///
/// `all` keeps emission order; the per-severity lists are views over the
/// same diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
    pub infos: Vec<Diagnostic>,
    pub all: Vec<Diagnostic>,
}

impl ValidationResult {
    pub fn from_diagnostics(all: Vec<Diagnostic>) -> Self {
        let mut result = Self::default();
        for diagnostic in &all {
            match diagnostic.severity {
                Severity::Error => result.errors.push(diagnostic.clone()),
                Severity::Warning => result.warnings.push(diagnostic.clone()),
                Severity::Info => result.infos.push(diagnostic.clone()),
            }
        }
        result.all = all;
        result
    }

    /// Append diagnostics (e.g. converted parse errors) keeping partitions in sync
    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        let mut all = std::mem::take(&mut self.all);
        all.extend(diagnostics);
        *self = Self::from_diagnostics(all);
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn is_clean(&self) -> bool {
        self.all.is_empty()
    }

    pub fn len(&self) -> usize {
        self.all.len()
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }

    /// One-line summary, e.g. `1 error, 2 warnings, 0 infos`
    pub fn summary(&self) -> String {
        fn plural(count: usize, word: &str) -> String {
            if count == 1 {
                format!("{count} {word}")
            } else {
                format!("{count} {word}s")
            }
        }
        format!(
            "{}, {}, {}",
            plural(self.errors.len(), "error"),
            plural(self.warnings.len(), "warning"),
            plural(self.infos.len(), "info")
        )
    }
}
