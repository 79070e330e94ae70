//! Check command implementation
//!
//! Parses and validates the stylesheet, scans the content root and reports
//! used classes that have no rule. Never writes anything.

use super::{BuildFlags, Project, load_config};
use crate::CheckFormat;
use crate::output::CheckOutput;
use quant_core::{Result, ResultExt, SourceFile, UsageReport, check_source};
use std::path::PathBuf;
use tracing::debug;

/// Returns `Ok(false)` when the report should fail the process
pub async fn check_command(
    config_path: Option<PathBuf>,
    format: CheckFormat,
    error_on_warnings: bool,
) -> Result<bool> {
    let project = Project::new(load_config(config_path.as_deref())?, BuildFlags::default());
    let source = SourceFile::read(&project.config.source)?;

    // A missing content root only means nothing is used yet
    let usage = project
        .scanner()
        .scan()
        .recoverable()?
        .unwrap_or_default();
    debug!("{} used classes, {} unknown", usage.used.len(), usage.unknown.len());

    let report = check_source(&source.text, &usage.used, &project.catalog(), &project.options());
    let output = CheckOutput::new(&source, &report, &usage).with_undeclared(&report.undeclared);

    match format {
        CheckFormat::Json => output.print_json()?,
        CheckFormat::Text => output.print_text(&source),
    }

    Ok(passes(&report, &usage, error_on_warnings))
}

fn passes(report: &quant_core::CheckReport, usage: &UsageReport, error_on_warnings: bool) -> bool {
    if report.has_errors() {
        return false;
    }
    if error_on_warnings {
        return report.validation.warnings.is_empty() && report.undeclared.is_empty() && usage.unknown.is_empty();
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use quant_core::{BuildOptions, PropertyCatalog};

    #[test]
    fn test_passes() {
        let catalog = PropertyCatalog::standard();
        let options = BuildOptions::default();
        let usage = UsageReport::default();

        let clean = check_source("btn { color: red }", &["btn"], &catalog, &options);
        assert!(passes(&clean, &usage, true));

        let warned = check_source("btn { colr: red }", &["btn"], &catalog, &options);
        assert!(passes(&warned, &usage, false));
        assert!(!passes(&warned, &usage, true));

        let broken = check_source("{ color: red }", &["btn"], &catalog, &options);
        assert!(!passes(&broken, &usage, false));
    }
}
