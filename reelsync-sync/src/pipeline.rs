//! Shared sync entrypoint used by the CLI.
//!
//! Wires the configured collaborators (command converter, README documenter)
//! into a [`SyncExecutor`] for the repository at `root`.

use std::path::Path;

use reelsync_core::SyncConfig;

use crate::{
    convert::CommandConverter,
    docs::{documenter_for, NoDocs},
    executor::{PlannedRun, RunOptions, SyncExecutor, SyncReport},
    SyncError,
};

/// Run a full sync for the repository at `root`.
///
/// `SyncReport::changed` tells the caller whether anything needs to be
/// committed or published.
pub fn run(root: &Path, options: RunOptions) -> Result<SyncReport, SyncError> {
    let config = SyncConfig::load_at(root)?;
    let layout = config.layout(root);
    let converter = CommandConverter::from_config(&config.converter);
    let documenter = documenter_for(&config, &layout)?;

    tracing::debug!("syncing {} -> {}", layout.source_dir.display(), layout.derived_dir.display());
    SyncExecutor::new(&config, &layout, &converter, documenter.as_ref()).execute(options)
}

/// Compute the reconciliation plan for `root` without side effects.
pub fn plan(root: &Path) -> Result<PlannedRun, SyncError> {
    let config = SyncConfig::load_at(root)?;
    let layout = config.layout(root);
    let converter = CommandConverter::from_config(&config.converter);
    SyncExecutor::new(&config, &layout, &converter, &NoDocs).prepare()
}
