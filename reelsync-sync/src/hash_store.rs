//! Hash store: the persisted manifest of asset identifier → content hash.
//!
//! Format: UTF-8 text, one `<identifier> <hash>` record per line, sorted by
//! identifier, no header. A missing file is an empty manifest. Writes use the
//! `.tmp` + rename pattern so a crash never leaves a half-written manifest.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use reelsync_core::{AssetId, ContentHash, Manifest};

use crate::error::SyncError;

/// Sibling temp file used while saving `path`.
pub fn tmp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "manifest".to_string());
    path.with_file_name(format!("{name}.tmp"))
}

/// Load the manifest at `path`.
///
/// Returns an empty manifest if the file does not yet exist. Malformed lines
/// are skipped with a warning rather than failing the whole load.
pub fn load(path: &Path) -> Result<Manifest, SyncError> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            tracing::debug!("no manifest at {}, starting empty", path.display());
            return Ok(Manifest::new());
        }
        Err(err) => {
            return Err(SyncError::LoadManifest {
                path: path.to_path_buf(),
                source: err,
            })
        }
    };
    Ok(parse(&String::from_utf8_lossy(&bytes)))
}

/// Parse manifest text leniently.
///
/// Blank lines are ignored; lines without exactly two whitespace-separated
/// fields, or whose identifier is not a plain file stem, are skipped. A repeated identifier keeps its last hash.
pub fn parse(contents: &str) -> Manifest {
    let mut manifest = Manifest::new();
    for (index, line) in contents.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let mut fields = line.split_whitespace();
        match (fields.next(), fields.next(), fields.next()) {
            (Some(raw), Some(hash), None) => match AssetId::parse(raw) {
                Some(id) => {
                    manifest.insert(id, ContentHash::from(hash));
                }
                None => {
                    tracing::warn!(
                        "skipping manifest line {}: invalid identifier {:?}",
                        index + 1,
                        raw
                    );
                }
            },
            _ => {
                tracing::warn!("skipping malformed manifest line {}: {:?}", index + 1, line);
            }
        }
    }
    manifest
}

/// Serialize `manifest` as one line per entry, sorted by identifier.
pub fn render(manifest: &Manifest) -> String {
    let mut out = String::new();
    for (id, hash) in manifest {
        out.push_str(id.as_str());
        out.push(' ');
        out.push_str(hash.as_str());
        out.push('\n');
    }
    out
}

/// Replace the manifest at `path` with `manifest`.
///
/// Writes to `<path>.tmp` then renames to `<path>`; the prior content is
/// fully overwritten.
pub fn save(path: &Path, manifest: &Manifest) -> Result<(), SyncError> {
    let save_err = |source| SyncError::SaveManifest {
        path: path.to_path_buf(),
        source,
    };

    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(save_err)?;
    }

    let tmp = tmp_path(path);
    std::fs::write(&tmp, render(manifest)).map_err(save_err)?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(save_err(e));
    }
    tracing::debug!("saved {} manifest entries to {}", manifest.len(), path.display());
    Ok(())
}
