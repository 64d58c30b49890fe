//! reelsync: keep GIF previews in step with source videos.
//!
//! # Usage
//!
//! ```text
//! reelsync init [--root <dir>] [--force]
//! reelsync sync [--root <dir>] [--dry-run] [--json]
//! reelsync plan [--root <dir>] [--json]
//! reelsync diff [--root <dir>]
//! ```
//!
//! `-v` / `-vv` raise log verbosity; `RUST_LOG` overrides both.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{diff::DiffArgs, init::InitArgs, plan::PlanArgs, sync::SyncArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "reelsync",
    version,
    about = "Regenerate GIF previews for changed videos and keep the README gallery current",
    long_about = None,
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a default reelsync.yaml.
    Init(InitArgs),

    /// Convert new and changed videos, delete orphans, refresh the manifest and docs.
    Sync(SyncArgs),

    /// Show what sync would convert and delete.
    Plan(PlanArgs),

    /// Show a unified diff of what sync would write to the docs file.
    Diff(DiffArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.command {
        Commands::Init(args) => args.run(),
        Commands::Sync(args) => args.run(),
        Commands::Plan(args) => args.run(),
        Commands::Diff(args) => args.run(),
    }
}

/// Library crates log through the `log` facade; the subscriber picks those
/// records up and writes them to stderr so stdout stays machine-readable.
fn init_tracing(verbose: u8) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
