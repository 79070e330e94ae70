//! Diagnostic renderer with rich terminal output

use super::{Diagnostic, Severity};
use crate::console::{Color, Console};
use crate::{QuantError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Output format for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text with colors and code frames
    Text,
    /// JSON format for programmatic consumption
    Json,
    /// JSON with pretty-printing
    JsonPretty,
}

/// Source text a set of diagnostics points into
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub text: String,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
        }
    }

    pub fn read(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| QuantError::io_error(path, e))?;
        Ok(Self::new(path, text))
    }
}

/// Diagnostic renderer with rich formatting
pub struct DiagnosticRenderer {
    console: Console,
    output_format: OutputFormat,
}

impl DiagnosticRenderer {
    /// Create a new diagnostic renderer with automatic terminal detection (text output)
    pub fn new() -> Self {
        Self {
            console: Console::new(),
            output_format: OutputFormat::Text,
        }
    }

    /// Create a renderer with colors disabled
    pub fn no_colors() -> Self {
        Self {
            console: Console::no_colors(),
            output_format: OutputFormat::Text,
        }
    }

    /// Create a renderer with specific output format
    pub fn with_format(format: OutputFormat) -> Self {
        let console = match format {
            OutputFormat::Json | OutputFormat::JsonPretty => Console::no_colors(),
            OutputFormat::Text => Console::new(),
        };

        Self {
            console,
            output_format: format,
        }
    }

    /// Override the detected terminal width used for code frames
    pub fn with_max_width(mut self, width: usize) -> Self {
        self.console = self.console.with_max_width(width);
        self
    }

    pub fn format(&self) -> OutputFormat {
        self.output_format
    }

    /// Render one diagnostic with the configured output format
    pub fn render(&self, diagnostic: &Diagnostic, source: Option<&SourceFile>) -> String {
        match self.output_format {
            OutputFormat::Text => self.render_text(diagnostic, source),
            OutputFormat::Json => self.render_json(std::slice::from_ref(diagnostic), false),
            OutputFormat::JsonPretty => self.render_json(std::slice::from_ref(diagnostic), true),
        }
    }

    /// Render multiple diagnostics
    pub fn render_diagnostics(&self, diagnostics: &[Diagnostic], source: Option<&SourceFile>) -> String {
        match self.output_format {
            OutputFormat::Text => {
                let mut output = String::new();
                for (i, diagnostic) in diagnostics.iter().enumerate() {
                    if i > 0 {
                        output.push('\n');
                    }
                    output.push_str(&self.render_text(diagnostic, source));
                }
                output
            }
            OutputFormat::Json => self.render_json(diagnostics, false),
            OutputFormat::JsonPretty => self.render_json(diagnostics, true),
        }
    }

    fn render_text(&self, diagnostic: &Diagnostic, source: Option<&SourceFile>) -> String {
        let mut output = String::new();

        output.push_str(&self.render_header(diagnostic));
        output.push('\n');

        match source.and_then(|s| self.render_code_frame(diagnostic, s)) {
            Some(frame) => output.push_str(&frame),
            None => {
                let location = format!(
                    "  --> {}:{}",
                    diagnostic.loc.start.line, diagnostic.loc.start.column
                );
                output.push_str(&self.console.colorize(&location, Color::Dim));
                output.push('\n');
            }
        }

        if let Some(hint) = &diagnostic.hint {
            output.push_str(&format!(
                "  {} {}\n",
                self.console.colorize("help:", Color::Cyan),
                hint
            ));
        }

        output
    }

    fn render_json(&self, diagnostics: &[Diagnostic], pretty: bool) -> String {
        let rendered = if pretty {
            serde_json::to_string_pretty(diagnostics)
        } else {
            serde_json::to_string(diagnostics)
        };
        rendered.unwrap_or_else(|e| format!("{{\"error\": \"Failed to serialize: {e}\"}}"))
    }

    /// `severity[code]: message`
    fn render_header(&self, diagnostic: &Diagnostic) -> String {
        let severity_text = self
            .console
            .colorize(&diagnostic.severity.to_string(), severity_color(diagnostic.severity));
        let code = self
            .console
            .colorize(&format!("[{}]", diagnostic.code), Color::Dim);

        format!(
            "{}{}: {}",
            severity_text,
            code,
            self.console.colorize(&diagnostic.message, Color::Bold)
        )
    }

    /// Code frame with one line of context on each side and carets under the span
    fn render_code_frame(&self, diagnostic: &Diagnostic, source: &SourceFile) -> Option<String> {
        let lines: Vec<&str> = source.text.lines().collect();
        let line = diagnostic.loc.start.line;
        if line == 0 || line > lines.len() {
            return None;
        }

        let column = diagnostic.loc.start.column;
        let length = if diagnostic.loc.end.line == line {
            diagnostic
                .loc
                .end
                .offset
                .saturating_sub(diagnostic.loc.start.offset)
        } else {
            lines[line - 1].len().saturating_sub(column.saturating_sub(1))
        };

        let first = line.saturating_sub(1).max(1);
        let last = (line + 1).min(lines.len());
        let gutter = last.to_string().len();
        let color = severity_color(diagnostic.severity);
        // Room left for source text after `> NN | `
        let text_width = self.console.max_width().saturating_sub(gutter + 5).max(10);
        let length = length
            .max(1)
            .min(text_width.saturating_sub(column.saturating_sub(1)).max(1));

        let mut frame = format!(
            "  {} {}:{}:{}\n",
            self.console.colorize("-->", Color::Blue),
            source.path.display(),
            line,
            column
        );

        for number in first..=last {
            let marker = if number == line {
                self.console.colorize(">", color)
            } else {
                " ".to_string()
            };
            frame.push_str(&format!(
                "{} {} {} {}\n",
                marker,
                self.console.colorize(&format!("{number:>gutter$}"), Color::Dim),
                self.console.colorize("|", Color::Dim),
                self.console.clip(lines[number - 1], text_width)
            ));

            if number == line {
                frame.push_str(&format!(
                    "  {} {} {}{}\n",
                    " ".repeat(gutter),
                    self.console.colorize("|", Color::Dim),
                    " ".repeat(column.saturating_sub(1)),
                    self.console.colorize(&"^".repeat(length), color)
                ));
            }
        }

        Some(frame)
    }
}

impl Default for DiagnosticRenderer {
    fn default() -> Self {
        Self::new()
    }
}

fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Error => Color::Red,
        Severity::Warning => Color::Yellow,
        Severity::Info => Color::Blue,
    }
}
