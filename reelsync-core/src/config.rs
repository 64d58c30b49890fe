//! Repository configuration (`reelsync.yaml`).
//!
//! # Storage layout
//!
//! ```text
//! <root>/
//!   reelsync.yaml        (optional: every field has a default)
//!   videos/              (source_dir)
//!   gifs/                (derived_dir)
//!   .reelsync/manifest   (manifest)
//!   README.md            (docs.path)
//! ```
//!
//! Relative paths in the config are resolved against the repository root by
//! [`SyncConfig::layout`]; nothing here reads the process working directory.

use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{io_err, ConfigError};

/// File name of the config, relative to the repository root.
pub const CONFIG_FILE: &str = "reelsync.yaml";

const DEFAULT_SOURCE_EXTENSIONS: &[&str] = &["mp4", "mov", "webm", "mkv", "m4v"];

const DEFAULT_FFMPEG_ARGS: &[&str] = &[
    "-y",
    "-loglevel",
    "error",
    "-i",
    "{input}",
    "-vf",
    "fps=10,scale=480:-1:flags=lanczos,split[a][b];[a]palettegen[p];[b][p]paletteuse",
    "-loop",
    "0",
    "{output}",
];

// ---------------------------------------------------------------------------
// Config structs
// ---------------------------------------------------------------------------

/// Root of `reelsync.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SyncConfig {
    /// Directory holding the source videos.
    pub source_dir: PathBuf,
    /// Directory the generated previews are written to.
    pub derived_dir: PathBuf,
    /// Path of the line-oriented hash manifest.
    pub manifest: PathBuf,
    /// Source file extensions to pick up (case-insensitive, no leading dot).
    pub source_extensions: Vec<String>,
    /// Extension of the derived asset (no leading dot).
    pub derived_extension: String,
    pub converter: ConverterConfig,
    pub docs: DocsConfig,
}

/// External conversion command.
///
/// `{input}` and `{output}` in `args` are replaced with the source path and
/// the temporary output path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConverterConfig {
    pub program: String,
    pub args: Vec<String>,
}

/// Documentation section regeneration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DocsConfig {
    pub enabled: bool,
    pub path: PathBuf,
    pub start_marker: String,
    pub end_marker: String,
    /// Optional user `.tera` template overriding the embedded gallery template.
    pub template: Option<PathBuf>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            source_dir: PathBuf::from("videos"),
            derived_dir: PathBuf::from("gifs"),
            manifest: PathBuf::from(".reelsync").join("manifest"),
            source_extensions: DEFAULT_SOURCE_EXTENSIONS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            derived_extension: "gif".to_string(),
            converter: ConverterConfig::default(),
            docs: DocsConfig::default(),
        }
    }
}

impl Default for ConverterConfig {
    fn default() -> Self {
        ConverterConfig {
            program: "ffmpeg".to_string(),
            args: DEFAULT_FFMPEG_ARGS.iter().map(|s| (*s).to_string()).collect(),
        }
    }
}

impl Default for DocsConfig {
    fn default() -> Self {
        DocsConfig {
            enabled: true,
            path: PathBuf::from("README.md"),
            start_marker: "<!-- reelsync:start -->".to_string(),
            end_marker: "<!-- reelsync:end -->".to_string(),
            template: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Resolved layout
// ---------------------------------------------------------------------------

/// Config paths resolved against a repository root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub root: PathBuf,
    pub source_dir: PathBuf,
    pub derived_dir: PathBuf,
    pub manifest: PathBuf,
    pub docs_path: PathBuf,
    pub docs_template: Option<PathBuf>,
}

impl Layout {
    /// Final location of the derived asset for `file_name`.
    pub fn derived_path(&self, file_name: &str) -> PathBuf {
        self.derived_dir.join(file_name)
    }
}

// ---------------------------------------------------------------------------
// Load / save
// ---------------------------------------------------------------------------

/// `<root>/reelsync.yaml`. Pure, no I/O.
pub fn config_path_at(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

impl SyncConfig {
    /// Load `<root>/reelsync.yaml`, falling back to defaults when absent.
    ///
    /// Returns `ConfigError::Parse` (with path + line context) for malformed
    /// YAML or unknown keys, `ConfigError::Invalid` for values that parse but
    /// cannot work.
    pub fn load_at(root: &Path) -> Result<Self, ConfigError> {
        let path = config_path_at(root);
        if !path.exists() {
            return Ok(SyncConfig::default());
        }
        let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
        // An empty file deserializes to `()`, not a mapping.
        if contents.trim().is_empty() {
            return Ok(SyncConfig::default());
        }
        let config: SyncConfig =
            serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse { path, source: e })?;
        config.validate()?;
        Ok(config)
    }

    /// Write `<root>/reelsync.yaml` via a `.tmp` sibling and rename.
    ///
    /// Refuses to overwrite an existing file unless `force` is set.
    pub fn save_at(&self, root: &Path, force: bool) -> Result<PathBuf, ConfigError> {
        let path = config_path_at(root);
        if path.exists() && !force {
            return Err(ConfigError::AlreadyExists { path });
        }
        std::fs::create_dir_all(root).map_err(|e| io_err(root, e))?;
        let yaml = serde_yaml::to_string(self)?;
        let tmp = path.with_file_name(format!("{CONFIG_FILE}.tmp"));
        std::fs::write(&tmp, yaml).map_err(|e| io_err(&tmp, e))?;
        std::fs::rename(&tmp, &path).map_err(|e| io_err(&path, e))?;
        Ok(path)
    }

    /// Resolve every configured path against `root`.
    pub fn layout(&self, root: &Path) -> Layout {
        Layout {
            root: root.to_path_buf(),
            source_dir: root.join(&self.source_dir),
            derived_dir: root.join(&self.derived_dir),
            manifest: root.join(&self.manifest),
            docs_path: root.join(&self.docs.path),
            docs_template: self.docs.template.as_ref().map(|t| root.join(t)),
        }
    }

    /// Whether `path` carries one of the configured source extensions.
    pub fn is_source_file(&self, path: &Path) -> bool {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return false;
        };
        self.source_extensions
            .iter()
            .any(|candidate| candidate.eq_ignore_ascii_case(ext))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.source_extensions.is_empty() {
            return Err(ConfigError::Invalid {
                field: "source_extensions",
                reason: "at least one extension is required".to_string(),
            });
        }
        if let Some(bad) = self
            .source_extensions
            .iter()
            .find(|e| e.is_empty() || e.starts_with('.'))
        {
            return Err(ConfigError::Invalid {
                field: "source_extensions",
                reason: format!("'{bad}' must be a bare extension such as 'mp4'"),
            });
        }
        if self.derived_extension.is_empty() || self.derived_extension.starts_with('.') {
            return Err(ConfigError::Invalid {
                field: "derived_extension",
                reason: format!(
                    "'{}' must be a bare extension such as 'gif'",
                    self.derived_extension
                ),
            });
        }
        if self.source_extensions.iter().any(|e| e.eq_ignore_ascii_case(&self.derived_extension))
            && self.source_dir == self.derived_dir
        {
            return Err(ConfigError::Invalid {
                field: "derived_extension",
                reason: "derived assets would be scanned as sources".to_string(),
            });
        }
        if self.converter.program.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "converter.program",
                reason: "program must not be empty".to_string(),
            });
        }
        let docs_escapes_root = self.docs.path.as_os_str().is_empty()
            || self
                .docs
                .path
                .components()
                .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if docs_escapes_root {
            return Err(ConfigError::Invalid {
                field: "docs.path",
                reason: format!(
                    "'{}' must be a relative path inside the repository",
                    self.docs.path.display()
                ),
            });
        }
        if self.docs.start_marker.is_empty() || self.docs.start_marker == self.docs.end_marker {
            return Err(ConfigError::Invalid {
                field: "docs.start_marker",
                reason: "start and end markers must be distinct and non-empty".to_string(),
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
