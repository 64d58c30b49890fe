//! Gallery context: serializable rendering payload built from the surviving
//! asset identifiers.

use std::path::{Component, Path};

use serde::Serialize;

use reelsync_core::{AssetId, SyncConfig};

use crate::error::RenderError;

/// Rendering payload handed to the gallery template.
#[derive(Debug, Clone, Serialize)]
pub struct GalleryContext {
    /// One entry per derived asset, in the caller's order.
    pub assets: Vec<AssetCtx>,
    pub asset_count: usize,
}

/// One preview in the gallery.
#[derive(Debug, Clone, Serialize)]
pub struct AssetCtx {
    pub id: String,
    pub file_name: String,
    /// Link target relative to the documentation file.
    pub path: String,
}

impl GalleryContext {
    /// Build a [`GalleryContext`] for `ids`, linking each preview relative to
    /// the configured documentation file.
    pub fn new(ids: &[AssetId], config: &SyncConfig) -> Self {
        let prefix = link_prefix(&config.docs.path, &config.derived_dir);
        let assets: Vec<AssetCtx> = ids
            .iter()
            .map(|id| {
                let file_name = id.derived_file_name(&config.derived_extension);
                AssetCtx {
                    id: id.0.clone(),
                    path: format!("{prefix}{file_name}"),
                    file_name,
                }
            })
            .collect();
        let asset_count = assets.len();
        GalleryContext {
            assets,
            asset_count,
        }
    }

    /// Convert to a [`tera::Context`] for rendering.
    pub fn to_tera_context(&self) -> Result<tera::Context, RenderError> {
        let value = serde_json::to_value(self)?;
        Ok(tera::Context::from_value(value)?)
    }
}

/// Relative URL prefix (ending in `/`) from the document's directory to the
/// derived directory. Absolute derived directories are used verbatim.
fn link_prefix(docs_path: &Path, derived_dir: &Path) -> String {
    if derived_dir.is_absolute() {
        return format!("{}/", derived_dir.display());
    }
    let depth = docs_path
        .parent()
        .map(|p| {
            p.components()
                .filter(|c| matches!(c, Component::Normal(_)))
                .count()
        })
        .unwrap_or(0);
    let mut prefix = "../".repeat(depth);
    for component in derived_dir.components() {
        match component {
            Component::Normal(part) => {
                prefix.push_str(&part.to_string_lossy());
                prefix.push('/');
            }
            Component::ParentDir => prefix.push_str("../"),
            _ => {}
        }
    }
    prefix
}
