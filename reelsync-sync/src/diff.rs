//! Dry-run unified diff of the documentation file for `reelsync diff`.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use similar::TextDiff;

use reelsync_core::{AssetId, SyncConfig};

use crate::{
    convert::CommandConverter,
    docs::{NoDocs, ReadmeDocumenter},
    executor::SyncExecutor,
    SyncError,
};

/// What a successful sync would do to the documentation file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocsDiff {
    pub path: PathBuf,
    /// `None` when the document already matches.
    pub unified_diff: Option<String>,
}

/// Render the documentation as it would look after a successful sync and
/// compare it to the current file.
///
/// The preview lists every derived asset that survives the run: those
/// already on disk plus those the plan converts, restricted to live sources.
/// No files are written. Returns `Ok(None)` when docs are disabled.
pub fn diff_docs(root: &Path) -> Result<Option<DocsDiff>, SyncError> {
    let config = SyncConfig::load_at(root)?;
    if !config.docs.enabled {
        return Ok(None);
    }
    let layout = config.layout(root);
    let converter = CommandConverter::from_config(&config.converter);
    let executor = SyncExecutor::new(&config, &layout, &converter, &NoDocs);

    let planned = executor.prepare()?;
    if planned.plan.is_empty() {
        // Sync leaves the docs alone when nothing changed.
        return Ok(Some(DocsDiff {
            path: layout.docs_path,
            unified_diff: None,
        }));
    }
    let mut ids: BTreeSet<AssetId> = executor
        .surviving_ids(&planned.sources)?
        .into_iter()
        .collect();
    ids.extend(planned.plan.to_convert.iter().map(|c| c.id.clone()));
    let ids: Vec<AssetId> = ids.into_iter().collect();

    let documenter = ReadmeDocumenter::new(&config, &layout)?;
    let (existing, rendered) = documenter.preview(&ids)?;
    let existing = normalize_line_endings(&existing);
    let rendered = normalize_line_endings(&rendered);
    if existing == rendered {
        return Ok(Some(DocsDiff {
            path: layout.docs_path,
            unified_diff: None,
        }));
    }

    let relative = config.docs.path.display().to_string();
    let old_header = format!("a/{relative}");
    let new_header = format!("b/{relative}");
    let unified = TextDiff::from_lines(&existing, &rendered)
        .unified_diff()
        .header(&old_header, &new_header)
        .context_radius(3)
        .to_string();

    Ok(Some(DocsDiff {
        path: layout.docs_path,
        unified_diff: Some(unified),
    }))
}

fn normalize_line_endings(content: &str) -> String {
    content.replace("\r\n", "\n")
}
