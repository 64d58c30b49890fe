//! `reelsync diff`: unified diff of what sync would write to the docs file.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use reelsync_sync::diff_docs;

use super::resolve_root;

/// Arguments for `reelsync diff`.
#[derive(Args, Debug)]
pub struct DiffArgs {
    /// Repository root (defaults to the current directory).
    #[arg(long)]
    pub root: Option<PathBuf>,
}

impl DiffArgs {
    pub fn run(self) -> Result<()> {
        let root = resolve_root(self.root)?;
        let Some(diff) = diff_docs(&root)
            .with_context(|| format!("diff failed for '{}'", root.display()))?
        else {
            println!("Docs regeneration is disabled.");
            return Ok(());
        };

        match diff.unified_diff {
            None => println!("No differences for '{}'.", diff.path.display()),
            Some(text) => {
                print!("{text}");
                if !text.ends_with('\n') {
                    println!();
                }
            }
        }
        Ok(())
    }
}
