//! Documentation boundary: regenerates the preview gallery section.
//!
//! ## `ReadmeDocumenter::regenerate`
//!
//! 1. Render the gallery for the ordered id list (tera).
//! 2. Read the current document (missing ⇒ empty).
//! 3. Splice the section between the markers.
//! 4. Compare with the current content → skip if identical.
//! 5. Write to `<path>.reelsync.tmp`.
//! 6. Rename to the final path (atomic on POSIX).

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;

use reelsync_core::{AssetId, Layout, SyncConfig};
use reelsync_renderer::{splice_section, GalleryContext, GalleryRenderer, Markers};

use crate::error::{docs_err, SyncError};

/// Outcome of a documentation regeneration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum DocUpdate {
    /// The document was (re)written.
    Written { path: PathBuf },
    /// The spliced document matched what was already on disk.
    Unchanged { path: PathBuf },
    /// Documentation regeneration is turned off in the config.
    Disabled,
}

/// Rebuilds the human-facing index from the surviving derived assets.
pub trait Documenter {
    /// `ids` is already filtered to assets whose source still exists and
    /// sorted by identifier.
    fn regenerate(&self, ids: &[AssetId]) -> Result<DocUpdate, SyncError>;
}

/// Used when `docs.enabled` is false.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoDocs;

impl Documenter for NoDocs {
    fn regenerate(&self, _ids: &[AssetId]) -> Result<DocUpdate, SyncError> {
        Ok(DocUpdate::Disabled)
    }
}

/// Splices the rendered gallery into a markdown file between markers.
pub struct ReadmeDocumenter {
    path: PathBuf,
    markers: Markers,
    renderer: GalleryRenderer,
    config: SyncConfig,
}

impl ReadmeDocumenter {
    pub fn new(config: &SyncConfig, layout: &Layout) -> Result<Self, SyncError> {
        let renderer = GalleryRenderer::new(layout.docs_template.as_deref())?;
        Ok(ReadmeDocumenter {
            path: layout.docs_path.clone(),
            markers: Markers::from(&config.docs),
            renderer,
            config: config.clone(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current document content and the content `regenerate(ids)` would write.
    pub fn preview(&self, ids: &[AssetId]) -> Result<(String, String), SyncError> {
        let existing = read_existing_or_empty(&self.path)?;
        let section = self
            .renderer
            .render(&GalleryContext::new(ids, &self.config))?;
        let updated = splice_section(&existing, &section, &self.markers)?;
        Ok((existing, updated))
    }
}

impl Documenter for ReadmeDocumenter {
    fn regenerate(&self, ids: &[AssetId]) -> Result<DocUpdate, SyncError> {
        let (existing, updated) = self.preview(ids)?;
        if existing == updated {
            tracing::debug!("unchanged: {}", self.path.display());
            return Ok(DocUpdate::Unchanged {
                path: self.path.clone(),
            });
        }
        atomic_write(&self.path, &updated)?;
        tracing::info!("wrote: {}", self.path.display());
        Ok(DocUpdate::Written {
            path: self.path.clone(),
        })
    }
}

/// Build the documenter `config` asks for.
pub fn documenter_for(
    config: &SyncConfig,
    layout: &Layout,
) -> Result<Box<dyn Documenter>, SyncError> {
    if config.docs.enabled {
        Ok(Box::new(ReadmeDocumenter::new(config, layout)?))
    } else {
        Ok(Box::new(NoDocs))
    }
}

pub(crate) fn read_existing_or_empty(path: &Path) -> Result<String, SyncError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(content),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(String::new()),
        Err(err) => Err(docs_err(path, err)),
    }
}

fn atomic_write(path: &Path, content: &str) -> Result<(), SyncError> {
    let tmp = PathBuf::from(format!("{}.reelsync.tmp", path.display()));
    atomic_write_with_tmp(path, content, &tmp)
}

fn atomic_write_with_tmp(path: &Path, content: &str, tmp: &Path) -> Result<(), SyncError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| docs_err(parent, e))?;
    }
    std::fs::write(tmp, content).map_err(|e| docs_err(tmp, e))?;
    if let Err(e) = std::fs::rename(tmp, path) {
        let _ = std::fs::remove_file(tmp);
        return Err(docs_err(path, e));
    }
    Ok(())
}
