//! edx-lint CLI tool.
//!
//! Usage:
//! ```bash
//! edx-lint lint [OPTIONS] [PATH]
//! edx-lint write FILE
//! edx-lint check FILE
//! edx-lint list
//! edx-lint list-checkers
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod commands;
mod config_resolver;
mod metadata;

/// Open edX Python checkers and shared config file management
#[derive(Parser)]
#[command(name = "edx-lint")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "EDX_LINT_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the checkers over Python sources
    Lint {
        /// Path to analyze (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// Only run specific checkers (comma-separated names, symbols or codes)
        #[arg(long)]
        checkers: Option<String>,

        /// Preset to use instead of the configured one
        #[arg(long)]
        preset: Option<String>,

        /// Exclude patterns (can be specified multiple times)
        #[arg(short, long)]
        exclude: Vec<String>,
    },

    /// Check that a written file has not been edited
    Check {
        /// File to check
        file: PathBuf,
    },

    /// Write a local copy of a known file
    Write {
        /// File to write (see `edx-lint list`)
        file: String,
    },

    /// List the files edx-lint can write
    List,

    /// List available checkers and their messages
    ListCheckers,
}

/// Output format for lint results.
#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output.
    Json,
    /// One-line-per-diagnostic compact format.
    Compact,
    /// Source snippets rendered through miette.
    Pretty,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let status = match cli.command {
        Commands::Lint {
            path,
            format,
            checkers,
            preset,
            exclude,
        } => {
            let args = commands::lint::LintArgs {
                path,
                format,
                checkers,
                preset,
                exclude,
            };
            commands::lint::run(args, cli.config.as_deref())?
        }
        Commands::Check { file } => commands::check::run(&file),
        Commands::Write { file } => commands::write::run(&file)?,
        Commands::List => {
            commands::list::run();
            0
        }
        Commands::ListCheckers => {
            commands::list_checkers::run()?;
            0
        }
    };

    Ok(ExitCode::from(status))
}
