pub mod diff;
pub mod init;
pub mod plan;
pub mod sync;

use std::path::PathBuf;

use anyhow::{Context, Result};

/// `--root` if given, else the current directory.
pub(crate) fn resolve_root(root: Option<PathBuf>) -> Result<PathBuf> {
    match root {
        Some(root) => Ok(root),
        None => std::env::current_dir().context("could not determine current directory"),
    }
}
