//! reelsync core library: domain types, configuration, errors.
//!
//! - [`types`]: asset identifiers, content hashes, the manifest mapping
//! - [`config`]: `reelsync.yaml` loading and path resolution
//! - [`error`]: [`ConfigError`]

pub mod config;
pub mod error;
pub mod types;

pub use config::{ConverterConfig, DocsConfig, Layout, SyncConfig, CONFIG_FILE};
pub use error::ConfigError;
pub use types::{AssetId, ContentHash, Manifest};
