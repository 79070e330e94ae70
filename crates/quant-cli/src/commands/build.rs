//! Build command implementation

use super::{BuildFlags, Project, load_config};
use crate::output::{print_build_summary, print_parse_errors};
use quant_core::{BuildOutput, Emitter, FileEmitter, Result, SourceFile};
use std::path::PathBuf;
use tracing::info;

/// Compile the configured stylesheet and write the CSS
pub async fn build_command(config_path: Option<PathBuf>, flags: BuildFlags) -> Result<()> {
    let project = Project::new(load_config(config_path.as_deref())?, flags);
    run_build(&project).map(|_| ())
}

/// One build plus emission; shared with `quant dev`
pub fn run_build(project: &Project) -> Result<BuildOutput> {
    info!(
        "Building {} ({} mode)",
        project.display_path(&project.config.source),
        project.options().mode
    );

    let output = project.pipeline().run()?;

    if !output.parse_errors.is_empty() {
        let source = SourceFile::read(&project.config.source).ok();
        let diagnostics: Vec<_> = output.parse_errors.iter().map(|e| e.to_diagnostic()).collect();
        print_parse_errors(&diagnostics, source.as_ref());
    }

    let destination = project.output_path();
    let minify = project.minify();
    FileEmitter::new(&destination).emit(&output.rules, minify)?;

    print_build_summary(&output, &project.display_path(&destination), minify);
    Ok(output)
}
