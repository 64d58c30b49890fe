//! `reelsync init [--root <dir>] [--force]`

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use reelsync_core::SyncConfig;

use super::resolve_root;

/// Write a default `reelsync.yaml` into the repository root.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Repository root (defaults to the current directory).
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Overwrite an existing config file.
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    pub fn run(self) -> Result<()> {
        let root = resolve_root(self.root)?;
        let config = SyncConfig::default();
        let path = config
            .save_at(&root, self.force)
            .with_context(|| format!("failed to init '{}'", root.display()))?;

        println!("✓ Wrote {}", path.display());
        println!(
            "  Sources: {}/  Previews: {}/  Docs: {}",
            config.source_dir.display(),
            config.derived_dir.display(),
            config.docs.path.display()
        );
        Ok(())
    }
}
