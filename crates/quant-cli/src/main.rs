//! QuantCSS CLI
//!
//! Command-line interface for the QuantCSS utility stylesheet compiler

mod commands;
mod output;

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use quant_core::{MatchMode, Result, init_tracing};
use std::path::PathBuf;
use tracing::error;

use commands::BuildFlags;

#[derive(Parser)]
#[command(name = "quant")]
#[command(about = "QuantCSS: just-in-time compiler for utility stylesheets")]
#[command(version = quant_core::VERSION)]
#[command(
    long_about = "QuantCSS compiles a .qs utility stylesheet into CSS, keeping only the rules\n\
whose classes are used somewhere in your project.\n\
\n\
Examples:\n  \
quant build                  # Build with the discovered configuration\n  \
quant build --minify --strict\n  \
quant check --format json    # Validate the stylesheet, machine-readable\n  \
quant dev                    # Rebuild on every change\n  \
quant config init            # Create .quantrc.json"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file path
    #[arg(
        short,
        long,
        global = true,
        help = "Path to configuration file (.quantrc.json/.quantrc.toml/quant.yaml)"
    )]
    config: Option<PathBuf>,

    /// Verbose output (can be used multiple times for increased verbosity)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Number of threads to use for scanning content files
    #[arg(
        short = 'j',
        long,
        global = true,
        help = "Number of threads (default: number of CPU cores)"
    )]
    threads: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile the stylesheet, keeping only used rules
    Build {
        /// Collapse whitespace in the output
        #[arg(long, help = "Minify the emitted CSS")]
        minify: bool,

        /// Require variant prefixes to match exactly
        #[arg(long, help = "Use strict matching instead of flex")]
        strict: bool,

        /// Ignore the build and usage caches
        #[arg(long, help = "Disable the build and usage caches")]
        no_cache: bool,

        /// Override the output path
        #[arg(short, long, help = "Output file (default: from config)")]
        output: Option<PathBuf>,
    },

    /// Validate the stylesheet and report unknown or undeclared classes
    Check {
        /// Output format
        #[arg(short, long, default_value = "text", help = "Output format for diagnostics")]
        format: CheckFormat,

        /// Treat warnings as errors
        #[arg(long, help = "Exit with non-zero code on warnings too")]
        error_on_warnings: bool,
    },

    /// Build, then rebuild whenever the stylesheet or content files change
    Dev {
        #[arg(long, help = "Minify the emitted CSS")]
        minify: bool,

        #[arg(long, help = "Use strict matching instead of flex")]
        strict: bool,

        /// Debounce window in milliseconds
        #[arg(long, default_value_t = 100, help = "Debounce window for file events (ms)")]
        debounce: u64,
    },

    /// Configuration file management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Show version information
    #[command(alias = "ver")]
    Version,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Initialize a new configuration file
    Init {
        /// Configuration file format
        #[arg(long, default_value = "json", help = "Configuration file format")]
        format: ConfigFormat,

        /// Overwrite existing configuration file
        #[arg(long, help = "Overwrite existing configuration file")]
        force: bool,
    },

    /// Show the resolved configuration
    Show,

    /// Print the configuration JSON Schema
    Schema {
        /// Write the schema to a file instead of stdout
        #[arg(short, long, help = "Output file for the schema")]
        output: Option<PathBuf>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum CheckFormat {
    /// Human-readable output with code frames
    Text,
    /// JSON for programmatic consumption
    Json,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum ConfigFormat {
    /// .quantrc.json
    Json,
    /// .quantrc.toml
    Toml,
    /// quant.yaml
    Yaml,
}

fn main() -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| quant_core::QuantError::internal_error(format!("Failed to create Tokio runtime: {e}")))?;

    runtime.block_on(async_main())
}

async fn async_main() -> Result<()> {
    let cli = Cli::parse();

    if !cli.no_color && std::env::var("NO_COLOR").is_err() {
        colored::control::set_override(true);
    } else {
        colored::control::set_override(false);
    }

    let log_level = match cli.verbose {
        0 => "quant=error",
        1 => "quant=warn",
        2 => "quant=info",
        3 => "quant=debug",
        _ => "quant=trace",
    };
    unsafe {
        std::env::set_var("RUST_LOG", log_level);
    }
    init_tracing();

    if let Some(threads) = cli.threads
        && let Err(e) = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
    {
        error!("Failed to set thread pool size: {}", e);
        std::process::exit(1);
    }

    match run_command(cli).await {
        Ok(true) => Ok(()),
        Ok(false) => std::process::exit(1),
        Err(e) => {
            error!("quant failed: {}", e);
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    }
}

/// Run the selected command; `Ok(false)` means "completed, but exit non-zero"
async fn run_command(cli: Cli) -> Result<bool> {
    let config_path = cli.config;

    match cli.command {
        Some(Commands::Build {
            minify,
            strict,
            no_cache,
            output,
        }) => {
            let flags = BuildFlags {
                minify,
                mode: strict.then_some(MatchMode::Strict),
                no_cache,
                output,
            };
            commands::build::build_command(config_path, flags).await?;
            Ok(true)
        }

        Some(Commands::Check {
            format,
            error_on_warnings,
        }) => commands::check::check_command(config_path, format, error_on_warnings).await,

        Some(Commands::Dev {
            minify,
            strict,
            debounce,
        }) => {
            let flags = BuildFlags {
                minify,
                mode: strict.then_some(MatchMode::Strict),
                no_cache: false,
                output: None,
            };
            commands::dev::dev_command(config_path, flags, debounce).await?;
            Ok(true)
        }

        Some(Commands::Config { action }) => {
            match action {
                ConfigAction::Init { format, force } => {
                    commands::config::config_init_command(format, force).await?
                }
                ConfigAction::Show => commands::config::config_show_command(config_path).await?,
                ConfigAction::Schema { output } => {
                    commands::config::config_schema_command(output).await?
                }
            }
            Ok(true)
        }

        Some(Commands::Version) => {
            println!("quant {}", quant_core::VERSION);
            Ok(true)
        }

        None => {
            let mut cmd = Cli::command();
            cmd.print_help()
                .map_err(|e| quant_core::QuantError::internal_error(format!("Failed to print help: {e}")))?;
            Ok(true)
        }
    }
}
