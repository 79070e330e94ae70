//! Dev command: build once, then rebuild on changes
//!
//! Watches the directory holding the stylesheet and the content root. Events
//! are batched over the debounce window and filtered to `.qs` plus the
//! configured content extensions before triggering a rebuild.

use super::build::run_build;
use super::{BuildFlags, Project, load_config};
use colored::Colorize;
use quant_core::{FileChangeEvent, FileWatcher, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, error, info};

/// Extension of utility stylesheet sources
const SOURCE_EXTENSION: &str = "qs";

const MAX_BATCH: usize = 64;

pub async fn dev_command(config_path: Option<PathBuf>, flags: BuildFlags, debounce_ms: u64) -> Result<()> {
    let project = Project::new(load_config(config_path.as_deref())?, flags);

    if let Err(e) = run_build(&project) {
        error!("Initial build failed: {}", e);
        eprintln!("{} {}", "error:".red().bold(), e);
    }

    let roots = watch_roots(&project);
    let mut watcher = FileWatcher::new(&roots)?;
    watcher.set_debounce_duration(Duration::from_millis(debounce_ms));

    let extensions = watched_extensions(&project);
    println!(
        "{} Watching {} for changes (Ctrl+C to stop)",
        "●".cyan(),
        roots
            .iter()
            .map(|root| project.display_path(root).into_owned())
            .collect::<Vec<_>>()
            .join(", ")
    );

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Stopping watcher");
                break;
            }
            events = watcher.next_events_batch(MAX_BATCH) => {
                if events.is_empty() {
                    debug!("Watcher channel closed");
                    break;
                }
                let relevant = relevant_events(events, &extensions, &project);
                if relevant.is_empty() {
                    continue;
                }
                for event in &relevant {
                    debug!("{:?} {}", event.kind, event.path.display());
                }
                if let Err(e) = run_build(&project) {
                    error!("Rebuild failed: {}", e);
                    eprintln!("{} {}", "error:".red().bold(), e);
                }
            }
        }
    }

    Ok(())
}

/// Stylesheet directory and content root, deduplicated
fn watch_roots(project: &Project) -> Vec<PathBuf> {
    let source_dir = project
        .config
        .source
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| project.base_dir.clone());

    let mut roots = vec![source_dir];
    if !roots.iter().any(|root| project.config.content.starts_with(root)) {
        roots.push(project.config.content.clone());
    }
    roots
}

fn watched_extensions(project: &Project) -> Vec<String> {
    let mut extensions = project.config.normalized_extensions();
    extensions.push(SOURCE_EXTENSION.to_string());
    extensions
}

/// Matching extension, and never the files a build writes
fn relevant_events(events: Vec<FileChangeEvent>, extensions: &[String], project: &Project) -> Vec<FileChangeEvent> {
    let output = project.output_path();
    FileWatcher::filter_by_extension(events, extensions)
        .into_iter()
        .filter(|event| {
            event.path != output
                && event.path != project.config.cache.build_cache_file
                && event.path != project.config.cache.usage_cache_file
        })
        .collect()
}
