//! Error types for reelsync-renderer.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from gallery rendering and splicing.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Tera template engine error.
    #[error("template engine error: {0}")]
    Tera(#[from] tera::Error),

    /// JSON serialization error (building tera context).
    #[error("context serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Filesystem error while loading a user template.
    #[error("template io error at {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },

    /// The host document has a start marker but no end marker after it.
    #[error("found start marker `{start}` without a following end marker `{end}`")]
    UnterminatedSection { start: String, end: String },

    /// The host document has an end marker with no start marker before it.
    #[error("found end marker `{end}` without a preceding start marker")]
    UnmatchedEndMarker { end: String },
}
