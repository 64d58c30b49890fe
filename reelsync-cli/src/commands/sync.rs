//! `reelsync sync`: reconcile previews, manifest and docs with the sources.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use reelsync_sync::{pipeline, DocUpdate, RunOptions, SyncReport};

use super::resolve_root;

/// Arguments for `reelsync sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Repository root (defaults to the current directory).
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Show what would change without converting, deleting or writing.
    #[arg(long)]
    pub dry_run: bool,

    /// Emit the run report as JSON.
    #[arg(long)]
    pub json: bool,
}

impl SyncArgs {
    pub fn run(self) -> Result<()> {
        let root = resolve_root(self.root)?;
        let report = pipeline::run(
            &root,
            RunOptions {
                dry_run: self.dry_run,
            },
        )
        .with_context(|| format!("sync failed for '{}'", root.display()))?;

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&report).context("failed to serialize sync report")?
            );
            return Ok(());
        }

        print_report(&report);
        Ok(())
    }
}

fn print_report(report: &SyncReport) {
    let prefix = if report.dry_run { "[dry-run] " } else { "" };

    if !report.changed {
        println!("{prefix}✓ nothing to do ({} unchanged)", report.unchanged.len());
        println!("changed: false");
        return;
    }

    println!(
        "{prefix}✓ synced ({} converted, {} deleted, {} unchanged)",
        report.converted.len(),
        report.deleted.len(),
        report.unchanged.len()
    );
    for c in &report.converted {
        println!("  +  {} -> {}", c.source.display(), c.output.display());
    }
    for d in &report.deleted {
        let note = if d.existed { "" } else { " (already gone)" };
        println!("  -  {}{note}", d.path.display());
    }
    match &report.docs {
        Some(DocUpdate::Written { path }) => println!("  ✎  {}", path.display()),
        Some(DocUpdate::Unchanged { path }) => println!("  ·  {}", path.display()),
        Some(DocUpdate::Disabled) | None => {}
    }

    if report.dry_run {
        println!("would change: true");
    } else {
        println!("changed: true");
    }
}
