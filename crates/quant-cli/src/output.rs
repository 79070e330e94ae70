//! Output formatting and reporting

use colored::*;
use quant_core::{
    BuildOutput, CheckReport, Diagnostic, DiagnosticRenderer, OutputFormat, Result, SourceFile,
    UsageReport,
};
use serde::Serialize;
use std::time::Duration;

/// Print the one-line result of a build
pub fn print_build_summary(output: &BuildOutput, destination: &str, minified: bool) {
    let origin = if output.from_cache {
        " (cached)".dimmed().to_string()
    } else {
        String::new()
    };
    let minified = if minified { ", minified" } else { "" };

    println!(
        "{} Built {} rules from {} used classes -> {}{}{} in {}",
        "✓".green(),
        output.rules.len(),
        output.used.len(),
        destination.bold(),
        minified,
        origin,
        format_duration(output.duration)
    );
}

/// Print recovered parse errors with code frames
pub fn print_parse_errors(diagnostics: &[Diagnostic], source: Option<&SourceFile>) {
    if diagnostics.is_empty() {
        return;
    }
    let renderer = DiagnosticRenderer::new();
    eprintln!("{}", renderer.render_diagnostics(diagnostics, source));
}

pub fn format_duration(duration: Duration) -> String {
    let millis = duration.as_millis();
    if millis < 1000 {
        format!("{millis}ms")
    } else {
        format!("{:.2}s", duration.as_secs_f64())
    }
}

/// Everything `quant check` reports, in the shape emitted as JSON
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckOutput<'a> {
    pub source: String,
    pub diagnostics: Vec<Diagnostic>,
    pub unknown_classes: &'a [String],
    pub undeclared_classes: &'a [String],
    pub summary: CheckSummary,
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct CheckSummary {
    pub errors: usize,
    pub warnings: usize,
    pub infos: usize,
}

impl CheckSummary {
    pub fn from_diagnostics(diagnostics: &[Diagnostic]) -> Self {
        use quant_core::Severity;

        let mut summary = Self::default();
        for diagnostic in diagnostics {
            match diagnostic.severity {
                Severity::Error => summary.errors += 1,
                Severity::Warning => summary.warnings += 1,
                Severity::Info => summary.infos += 1,
            }
        }
        summary
    }
}

impl<'a> CheckOutput<'a> {
    pub fn new(source: &SourceFile, report: &CheckReport, usage: &'a UsageReport) -> Self {
        let diagnostics: Vec<Diagnostic> = report
            .parse_errors
            .iter()
            .map(|e| e.to_diagnostic())
            .chain(report.validation.all.iter().cloned())
            .collect();
        let summary = CheckSummary::from_diagnostics(&diagnostics);

        Self {
            source: source.path.display().to_string(),
            diagnostics,
            unknown_classes: &usage.unknown,
            undeclared_classes: &[],
            summary,
        }
    }

    pub fn with_undeclared(mut self, undeclared: &'a [String]) -> Self {
        self.undeclared_classes = undeclared;
        self
    }

    pub fn print_json(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(|e| {
            quant_core::QuantError::internal_error(format!("Failed to serialize report: {e}"))
        })?;
        println!("{json}");
        Ok(())
    }

    pub fn print_text(&self, source: &SourceFile) {
        if self.diagnostics.is_empty() {
            println!("{} No issues in {}", "✓".green(), self.source);
        } else {
            let renderer = DiagnosticRenderer::with_format(OutputFormat::Text);
            println!("{}\n", renderer.render_diagnostics(&self.diagnostics, Some(source)));
        }

        if !self.undeclared_classes.is_empty() {
            println!(
                "{} {} used classes have no rule:",
                "warning:".yellow().bold(),
                self.undeclared_classes.len()
            );
            for class in self.undeclared_classes {
                println!("  - {class}");
            }
        }

        if !self.unknown_classes.is_empty() {
            println!(
                "{} {} used classes do not end in a known property:",
                "note:".blue().bold(),
                self.unknown_classes.len()
            );
            for class in self.unknown_classes {
                println!("  - {class}");
            }
        }

        println!(
            "\n{} {} errors, {} warnings, {} infos",
            "Summary:".bold(),
            self.summary.errors.to_string().red(),
            self.summary.warnings.to_string().yellow(),
            self.summary.infos.to_string().blue()
        );
    }
}
