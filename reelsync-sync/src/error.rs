//! Error types for reelsync-sync.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use reelsync_core::{AssetId, ConfigError};
use reelsync_renderer::RenderError;

/// Pipeline stage an error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Config,
    Scan,
    Load,
    Convert,
    Delete,
    Save,
    Docs,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Config => "config",
            Stage::Scan => "scan",
            Stage::Load => "load",
            Stage::Convert => "convert",
            Stage::Delete => "delete",
            Stage::Save => "save",
            Stage::Docs => "docs",
        };
        f.write_str(name)
    }
}

/// All errors that can abort a sync run.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Loading or validating `reelsync.yaml` failed.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// The source directory or one of its files could not be read.
    #[error("scan failed at {path}: {source}")]
    Scan {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The manifest exists but could not be read.
    #[error("manifest unreadable at {path}: {source}")]
    LoadManifest {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The external converter failed for one asset.
    #[error("conversion of '{id}' failed: {source}")]
    Convert {
        id: AssetId,
        #[source]
        source: ConvertError,
    },

    /// A derived asset could not be removed.
    #[error("could not delete {path}: {source}")]
    Delete {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The manifest could not be written.
    #[error("manifest unwritable at {path}: {source}")]
    SaveManifest {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The documentation section could not be rendered.
    #[error("documentation render error: {0}")]
    Render(#[from] RenderError),

    /// The documentation file could not be read or written.
    #[error("documentation I/O error at {path}: {source}")]
    DocsIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SyncError {
    /// The stage that failed.
    pub fn stage(&self) -> Stage {
        match self {
            SyncError::Config(_) => Stage::Config,
            SyncError::Scan { .. } => Stage::Scan,
            SyncError::LoadManifest { .. } => Stage::Load,
            SyncError::Convert { .. } => Stage::Convert,
            SyncError::Delete { .. } => Stage::Delete,
            SyncError::SaveManifest { .. } => Stage::Save,
            SyncError::Render(_) | SyncError::DocsIo { .. } => Stage::Docs,
        }
    }
}

/// Failure of a single external conversion.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// The converter program could not be started.
    #[error("could not run `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The converter exited unsuccessfully.
    #[error("`{program}` exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: String,
        stderr: String,
    },

    /// The converter exited successfully but produced nothing.
    #[error("converter reported success but wrote no output at {path}")]
    MissingOutput { path: PathBuf },

    /// Moving the converted file into place failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience constructor for [`SyncError::Scan`].
pub(crate) fn scan_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Scan {
        path: path.into(),
        source,
    }
}

/// Convenience constructor for [`SyncError::DocsIo`].
pub(crate) fn docs_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::DocsIo {
        path: path.into(),
        source,
    }
}
