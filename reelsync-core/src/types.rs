//! Domain types for reelsync.
//!
//! Identifiers and hashes are newtypes over `String` so they can never be
//! swapped by accident; the manifest is an ordered map so every serialized
//! form is sorted by identifier without an extra pass.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Stable key naming one source/derived asset pair: the source file's base
/// name with its extension stripped (`videos/intro.mp4` → `intro`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AssetId(pub String);

impl AssetId {
    /// Derive an identifier from a source path.
    ///
    /// Returns `None` when the stem is empty, not valid UTF-8, or contains
    /// whitespace (the manifest is whitespace-separated, so such names cannot
    /// round-trip).
    pub fn from_path(path: &Path) -> Option<Self> {
        Self::parse(path.file_stem()?.to_str()?)
    }

    /// Validate a raw identifier, e.g. one read back from the manifest.
    ///
    /// An identifier must name a single file inside the derived directory:
    /// empty, `.`, `..`, whitespace and path separators are rejected.
    pub fn parse(raw: &str) -> Option<Self> {
        let invalid = raw.is_empty()
            || raw == "."
            || raw == ".."
            || raw.contains(['/', '\\'])
            || raw.chars().any(char::is_whitespace)
            || Path::new(raw).is_absolute();
        if invalid {
            return None;
        }
        Some(Self(raw.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File name of the derived asset for this identifier, e.g. `intro.gif`.
    pub fn derived_file_name(&self, extension: &str) -> String {
        format!("{}.{}", self.0, extension)
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for AssetId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for AssetId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Deterministic digest of a file's bytes, stored as lowercase hex.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash(pub String);

impl ContentHash {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for ContentHash {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ContentHash {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Manifest
// ---------------------------------------------------------------------------

/// Mapping of asset identifier → content hash.
///
/// Used both for the persisted "last synchronized" state and for the result
/// of scanning the source directory.
pub type Manifest = BTreeMap<AssetId, ContentHash>;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn newtype_display() {
        assert_eq!(AssetId::from("intro").to_string(), "intro");
        assert_eq!(ContentHash::from("deadbeef").to_string(), "deadbeef");
    }

    #[test]
    fn asset_id_strips_extension() {
        let id = AssetId::from_path(&PathBuf::from("videos/intro.mp4")).unwrap();
        assert_eq!(id, AssetId::from("intro"));
    }

    #[test]
    fn asset_id_keeps_inner_dots() {
        let id = AssetId::from_path(&PathBuf::from("videos/demo.v2.mov")).unwrap();
        assert_eq!(id.as_str(), "demo.v2");
    }

    #[test]
    fn asset_id_rejects_whitespace() {
        assert!(AssetId::from_path(&PathBuf::from("videos/my clip.mp4")).is_none());
    }

    #[test]
    fn parse_rejects_ids_that_escape_the_derived_dir() {
        for raw in ["", ".", "..", "../victim", "a/b", "a\\b", "/tmp/other", "two words"] {
            assert!(AssetId::parse(raw).is_none(), "{raw:?} should be rejected");
        }
        assert_eq!(AssetId::parse("demo.v2"), Some(AssetId::from("demo.v2")));
    }

    #[test]
    fn derived_file_name_appends_extension() {
        assert_eq!(AssetId::from("intro").derived_file_name("gif"), "intro.gif");
    }

    #[test]
    fn manifest_iterates_in_identifier_order() {
        let mut manifest = Manifest::new();
        manifest.insert(AssetId::from("zeta"), ContentHash::from("1"));
        manifest.insert(AssetId::from("alpha"), ContentHash::from("2"));
        let keys: Vec<_> = manifest.keys().map(AssetId::as_str).collect();
        assert_eq!(keys, vec!["alpha", "zeta"]);
    }
}
