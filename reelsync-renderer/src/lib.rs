//! # reelsync-renderer
//!
//! Tera-based templating for the generated preview gallery, plus splicing of
//! the rendered section between markers in a host document.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use reelsync_core::{AssetId, SyncConfig};
//! use reelsync_renderer::{splice_section, GalleryContext, GalleryRenderer, Markers};
//!
//! fn refresh(readme: &str, ids: &[AssetId]) -> Option<String> {
//!     let config = SyncConfig::default();
//!     let renderer = GalleryRenderer::new(None).ok()?;
//!     let ctx = GalleryContext::new(ids, &config);
//!     let section = renderer.render(&ctx).ok()?;
//!     let markers = Markers::from(&config.docs);
//!     splice_section(readme, &section, &markers).ok()
//! }
//! ```

pub mod context;
pub mod engine;
pub mod error;
pub mod splice;

pub use context::GalleryContext;
pub use engine::GalleryRenderer;
pub use error::RenderError;
pub use splice::{splice_section, Markers};
