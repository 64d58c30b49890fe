//! Tera rendering engine: [`GalleryRenderer`].
//!
//! The embedded `gallery.md.tera` template is baked into the binary; a user
//! template file, when configured, replaces it under the same name.

use std::path::{Path, PathBuf};

use tera::Tera;

use crate::context::GalleryContext;
use crate::error::RenderError;

// ---------------------------------------------------------------------------
// Embedded templates, baked into the binary at compile time via include_str!
// ---------------------------------------------------------------------------

/// Template name the gallery is rendered from.
pub const GALLERY_TEMPLATE: &str = "gallery.md.tera";

const TPLS: &[(&str, &str)] = &[(GALLERY_TEMPLATE, include_str!("templates/gallery.md.tera"))];

// ---------------------------------------------------------------------------
// Template loading helpers
// ---------------------------------------------------------------------------

fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> RenderError {
    RenderError::Io {
        path: path.into(),
        source,
    }
}

fn build_tera(user_template: Option<&Path>) -> Result<Tera, RenderError> {
    let mut templates: Vec<(String, String)> = TPLS
        .iter()
        .map(|(name, content)| ((*name).to_string(), (*content).to_string()))
        .collect();

    if let Some(path) = user_template {
        let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
        templates.retain(|(name, _)| name != GALLERY_TEMPLATE);
        templates.push((GALLERY_TEMPLATE.to_string(), contents));
    }

    let mut tera = Tera::default();
    tera.add_raw_templates(templates)?;
    Ok(tera)
}

// ---------------------------------------------------------------------------
// GalleryRenderer
// ---------------------------------------------------------------------------

/// Renders the preview gallery section. Create once and reuse.
pub struct GalleryRenderer {
    tera: Tera,
}

impl GalleryRenderer {
    /// Construct a renderer with the embedded template, or with the template
    /// at `user_template` when given.
    pub fn new(user_template: Option<&Path>) -> Result<Self, RenderError> {
        Ok(GalleryRenderer {
            tera: build_tera(user_template)?,
        })
    }

    /// Render the gallery section body. Line endings are normalised to LF.
    pub fn render(&self, ctx: &GalleryContext) -> Result<String, RenderError> {
        let tera_ctx = ctx.to_tera_context()?;
        let rendered = self.tera.render(GALLERY_TEMPLATE, &tera_ctx)?;
        Ok(rendered.replace("\r\n", "\n"))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
