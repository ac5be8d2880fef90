//! wgsize CLI - Resolve reduction launch geometry from the command line.
//!
//! # Commands
//!
//! - `wgsize resolve --items <N>` - Resolve work-group size and count
//! - `wgsize arch <TAG>` - Show the capability code of an architecture tag
//! - `wgsize presets` - List the built-in device presets
//!
//! # Examples
//!
//! ```bash
//! # Plan a reduction over one million items on an Ampere GPU
//! wgsize resolve --items 1048576 --local-bytes 8 --preset nvidia-ampere
//!
//! # Plan against a device description and a config file, as JSON
//! wgsize resolve --items 4096 --device lab-gpu.toml --config wgsize.toml --format json
//!
//! # Look up an architecture
//! wgsize arch sm_89
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

mod commands;
mod error;

use commands::resolve::ResolveArgs;
use commands::{arch, presets, resolve, OutputFormat};

/// wgsize - launch geometry resolver for reductions
#[derive(Parser)]
#[command(name = "wgsize")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve work-group size and count for a reduction
    Resolve {
        /// Total number of work-items
        #[arg(short = 'n', long)]
        items: usize,

        /// Local memory per work-item, in bytes
        #[arg(short, long, default_value = "0")]
        local_bytes: usize,

        /// Kernel-specific work-group limit (0 when unknown)
        #[arg(short, long, default_value = "0")]
        kernel_max: usize,

        /// Built-in device preset (see `wgsize presets`)
        #[arg(short, long, conflicts_with = "device")]
        preset: Option<String>,

        /// Device description file (TOML)
        #[arg(short, long)]
        device: Option<PathBuf>,

        /// Reduction config file (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show the capability code of an architecture tag
    Arch {
        /// Architecture tag, e.g. sm_89 or gfx90a
        tag: String,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// List the built-in device presets
    Presets {
        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

fn setup_logging(verbose: bool, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let result = match cli.command {
        Commands::Resolve {
            items,
            local_bytes,
            kernel_max,
            preset,
            device,
            config,
            format,
        } => resolve::execute(&ResolveArgs {
            items,
            local_bytes,
            kernel_max,
            preset,
            device,
            config,
            format,
        }),

        Commands::Arch { tag, format } => arch::execute(&tag, format),

        Commands::Presets { format } => presets::execute(format),

        Commands::Completions { shell } => {
            use clap::CommandFactory;
            clap_complete::generate(shell, &mut Cli::command(), "wgsize", &mut std::io::stdout());
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}
