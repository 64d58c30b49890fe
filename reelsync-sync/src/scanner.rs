//! Source scanner: enumerates source videos and hashes their bytes.

use std::collections::BTreeMap;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use reelsync_core::{AssetId, ContentHash, Manifest, SyncConfig};

use crate::error::{scan_err, SyncError};

/// One source file found by [`scan`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceAsset {
    pub path: PathBuf,
    pub hash: ContentHash,
}

/// Current state of the source directory, keyed by identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceSet {
    assets: BTreeMap<AssetId, SourceAsset>,
}

impl SourceSet {
    /// Identifier → hash view used for planning and for the new manifest.
    pub fn manifest(&self) -> Manifest {
        self.assets
            .iter()
            .map(|(id, asset)| (id.clone(), asset.hash.clone()))
            .collect()
    }

    pub fn get(&self, id: &AssetId) -> Option<&SourceAsset> {
        self.assets.get(id)
    }

    pub fn contains(&self, id: &AssetId) -> bool {
        self.assets.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AssetId, &SourceAsset)> {
        self.assets.iter()
    }
}

/// SHA-256 of the file at `path`, streamed in 64 KiB blocks.
pub fn hash_file(path: &Path) -> Result<ContentHash, SyncError> {
    let mut file = std::fs::File::open(path).map_err(|e| scan_err(path, e))?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; 64 * 1024];
    loop {
        let read = file.read(&mut buffer).map_err(|e| scan_err(path, e))?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }
    Ok(ContentHash(hex::encode(hasher.finalize())))
}

/// SHA-256 of an in-memory buffer; identical to [`hash_file`] for the same bytes.
pub fn hash_bytes(bytes: &[u8]) -> ContentHash {
    ContentHash(hex::encode(Sha256::digest(bytes)))
}

/// Enumerate every source file directly inside `source_dir` and hash it.
///
/// A missing directory yields an empty set. Hidden files and files without a
/// configured source extension are ignored. When two files share a stem, the
/// lexicographically first path wins.
pub fn scan(source_dir: &Path, config: &SyncConfig) -> Result<SourceSet, SyncError> {
    let entries = match std::fs::read_dir(source_dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            tracing::debug!("source dir {} missing, nothing to scan", source_dir.display());
            return Ok(SourceSet::default());
        }
        Err(err) => return Err(scan_err(source_dir, err)),
    };

    let mut candidates = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| scan_err(source_dir, e))?;
        let path = entry.path();
        if entry.file_name().to_string_lossy().starts_with('.') || !config.is_source_file(&path)
        {
            continue;
        }
        // Follow symlinks: a linked video is still a source.
        let meta = match std::fs::metadata(&path) {
            Ok(meta) => meta,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                tracing::warn!("skipping {}: dangling link", path.display());
                continue;
            }
            Err(err) => return Err(scan_err(&path, err)),
        };
        if meta.is_file() {
            candidates.push(path);
        }
    }
    candidates.sort();

    let mut assets: BTreeMap<AssetId, SourceAsset> = BTreeMap::new();
    for path in candidates {
        let Some(id) = AssetId::from_path(&path) else {
            tracing::warn!("skipping {}: name cannot be used as an identifier", path.display());
            continue;
        };
        if let Some(existing) = assets.get(&id) {
            tracing::warn!(
                "skipping {}: identifier '{}' already taken by {}",
                path.display(),
                id,
                existing.path.display()
            );
            continue;
        }
        let hash = hash_file(&path)?;
        tracing::debug!("scanned {} -> {}", path.display(), hash);
        assets.insert(id, SourceAsset { path, hash });
    }

    Ok(SourceSet { assets })
}
