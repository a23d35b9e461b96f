//! meshmerge: Command-line interface for stitching unstructured meshes.
//!
//! This tool provides access to mesh-merge functionality from the command
//! line, suitable for scripting model setup pipelines.
//!
//! # Logging
//!
//! Set the `RUST_LOG` environment variable to control log output:
//! - `RUST_LOG=mesh_merge=info` - Basic operation logging
//! - `RUST_LOG=mesh_merge=debug` - Detailed progress logging
//! - `RUST_LOG=mesh_merge::timing=debug` - Performance timing
//! - `RUST_LOG=debug` - All debug output
//!
//! # Example
//!
//! ```bash
//! # Merge two meshes with info logging
//! RUST_LOG=mesh_merge=info meshmerge merge coarse.mesh fine.mesh -o merged.mesh
//!
//! # Debug output for troubleshooting
//! RUST_LOG=debug meshmerge validate coarse.mesh
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod commands;
mod output;

use commands::{grid, info, merge, validate};

/// meshmerge - A command-line tool for stitching unstructured meshes.
///
/// Merge 2D triangle/quad meshes along matching boundary segments, inspect
/// them, and convert structured grids to meshes.
#[derive(Parser)]
#[command(name = "meshmerge")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format for results
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    /// Suppress all non-error output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Increase output verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(long, short, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output for scripting
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Display mesh statistics and information
    Info {
        /// Input mesh file
        input: PathBuf,
    },

    /// Validate a mesh and check its boundary segments
    Validate {
        /// Input mesh file
        input: PathBuf,

        /// Treat warnings (unwalkable segments, repeated nodes) as failures
        #[arg(long)]
        strict: bool,
    },

    /// Merge two meshes by bridging their boundary segments
    Merge {
        /// First input mesh (its nodes come first in the output)
        first: PathBuf,

        /// Second input mesh
        second: PathBuf,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Load merge parameters from a TOML file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Node deduplication tolerance
        #[arg(long)]
        tolerance: Option<f64>,

        /// Vertex deduplication tolerance inside each bridge
        #[arg(long)]
        pslg_tolerance: Option<f64>,

        /// Number of guide curves per bridge
        #[arg(long)]
        guide_curves: Option<usize>,

        /// How the second boundary curve is oriented before bridging
        #[arg(long)]
        alignment: Option<Alignment>,

        /// Projection string written to the output header
        #[arg(long)]
        projection: Option<String>,
    },

    /// Convert an ESRI ASCII grid to a quad mesh
    Grid {
        /// Input grid file (.asc)
        input: PathBuf,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Cells at this value (after clamping) are land and produce no element
        #[arg(long, default_value = "10.0")]
        land_value: f64,

        /// Grid rotation in degrees about the first cell centre
        #[arg(long, default_value = "0.0", allow_hyphen_values = true)]
        orientation: f64,

        /// Projection string written to the output header
        #[arg(long)]
        projection: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum Alignment {
    /// Reverse the second boundary path
    Reverse,
    /// Sort both curves along their extent and orient ends to match
    Normalize,
}

/// Initialize the tracing subscriber based on verbosity level.
fn init_tracing(verbose: u8, quiet: bool) {
    // If quiet, don't initialize any tracing
    if quiet {
        return;
    }

    // Check RUST_LOG first, then fall back to -v flags
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let level = match verbose {
            0 => "warn",
            1 => "mesh_merge=info",
            2 => "mesh_merge=debug",
            _ => "trace",
        };
        EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .with(filter)
        .init();
}

fn main() -> Result<()> {
    // Install miette's panic hook for better error display
    #[cfg(debug_assertions)]
    miette::set_panic_hook();

    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.quiet);

    let result = match &cli.command {
        Commands::Info { input } => info::run(input, &cli),
        Commands::Validate { input, strict } => validate::run(input, *strict, &cli),
        Commands::Merge {
            first,
            second,
            output,
            config,
            tolerance,
            pslg_tolerance,
            guide_curves,
            alignment,
            projection,
        } => merge::run(
            first,
            second,
            output,
            &merge::Overrides {
                config: config.clone(),
                tolerance: *tolerance,
                pslg_tolerance: *pslg_tolerance,
                guide_curves: *guide_curves,
                alignment: *alignment,
                projection: projection.clone(),
            },
            &cli,
        ),
        Commands::Grid {
            input,
            output,
            land_value,
            orientation,
            projection,
        } => grid::run(
            input,
            output,
            *land_value,
            *orientation,
            projection.as_deref(),
            &cli,
        ),
    };

    if let Err(e) = &result {
        if !cli.quiet {
            if let Some(mesh_err) = e.downcast_ref::<mesh_merge::MeshError>() {
                // Display error with code and help text
                eprintln!("{}: {}", "Error".red().bold(), mesh_err);
                eprintln!("  {}: {}", "Code".cyan(), mesh_err.code());
                eprintln!(
                    "  {}: {}",
                    "Suggestion".green(),
                    mesh_err.recovery_suggestion()
                );
                if let Some(location) = mesh_err.location() {
                    eprintln!("  {}: {}", "Location".yellow(), location);
                }
            } else {
                eprintln!("{}: {}", "Error".red().bold(), e);
                for cause in e.chain().skip(1) {
                    eprintln!("  {}: {}", "Caused by".yellow(), cause);
                }
            }
        }
        std::process::exit(1);
    }

    Ok(())
}
