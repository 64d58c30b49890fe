//! Sync executor: applies a reconciliation plan.
//!
//! Single linear pass with one decision point:
//!
//! 1. Scan sources, load the manifest.
//! 2. Plan.
//! 3. Convert every `to_convert` id; the first failure aborts the run before
//!    the manifest or documentation are touched.
//! 4. Delete every `to_delete` derived asset (already absent is fine).
//! 5. If anything changed: save the manifest from the scan, then regenerate
//!    documentation from the surviving derived assets.
//!
//! Conversions that succeeded before a failure stay on disk but are not
//! recorded; the next run converts them again.

use std::collections::BTreeSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use reelsync_core::{AssetId, Layout, Manifest, SyncConfig};

use crate::convert::Converter;
use crate::docs::{DocUpdate, Documenter};
use crate::error::{scan_err, SyncError};
use crate::hash_store;
use crate::plan::{self, ChangeReason, ReconciliationPlan};
use crate::scanner::{self, SourceSet};

/// Knobs for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Compute and report the plan without converting, deleting or writing.
    pub dry_run: bool,
}

/// One derived asset (re)generated, or scheduled in dry-run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Converted {
    pub id: AssetId,
    pub reason: ChangeReason,
    pub source: PathBuf,
    pub output: PathBuf,
}

/// One derived asset removed, or scheduled for removal in dry-run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Deleted {
    pub id: AssetId,
    pub path: PathBuf,
    /// `false` when the derived file was already gone.
    pub existed: bool,
}

/// Result of a completed run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Whether any conversion or deletion happened (would happen, in dry-run).
    pub changed: bool,
    pub dry_run: bool,
    pub converted: Vec<Converted>,
    pub deleted: Vec<Deleted>,
    pub unchanged: Vec<AssetId>,
    /// `None` when nothing changed or in dry-run.
    pub docs: Option<DocUpdate>,
    pub finished_at: DateTime<Utc>,
}

/// Everything needed to decide what a run will do.
#[derive(Debug, Clone)]
pub struct PlannedRun {
    pub sources: SourceSet,
    pub previous: Manifest,
    pub plan: ReconciliationPlan,
}

/// Orchestrates scan → plan → apply for one repository layout.
pub struct SyncExecutor<'a> {
    config: &'a SyncConfig,
    layout: &'a Layout,
    converter: &'a dyn Converter,
    documenter: &'a dyn Documenter,
}

impl<'a> SyncExecutor<'a> {
    pub fn new(
        config: &'a SyncConfig,
        layout: &'a Layout,
        converter: &'a dyn Converter,
        documenter: &'a dyn Documenter,
    ) -> Self {
        SyncExecutor {
            config,
            layout,
            converter,
            documenter,
        }
    }

    /// Steps 1–2: scan, load, plan. No side effects.
    pub fn prepare(&self) -> Result<PlannedRun, SyncError> {
        let sources = scanner::scan(&self.layout.source_dir, self.config)?;
        let previous = hash_store::load(&self.layout.manifest)?;
        let plan = plan::plan(&sources.manifest(), &previous);
        tracing::debug!(
            "plan: {} to convert, {} to delete, {} unchanged",
            plan.to_convert.len(),
            plan.to_delete.len(),
            plan.unchanged.len()
        );
        Ok(PlannedRun {
            sources,
            previous,
            plan,
        })
    }

    /// Run the whole pipeline.
    pub fn execute(&self, options: RunOptions) -> Result<SyncReport, SyncError> {
        let PlannedRun { sources, plan, .. } = self.prepare()?;

        let mut converted = Vec::with_capacity(plan.to_convert.len());
        for item in &plan.to_convert {
            // Planned ids always come from the scan.
            let Some(asset) = sources.get(&item.id) else {
                continue;
            };
            let output = self.derived_path(&item.id);
            if options.dry_run {
                tracing::info!("[dry-run] would convert: {}", item.id);
            } else {
                self.converter
                    .convert(&asset.path, &output)
                    .map_err(|source| SyncError::Convert {
                        id: item.id.clone(),
                        source,
                    })?;
                tracing::info!("converted: {} -> {}", asset.path.display(), output.display());
            }
            converted.push(Converted {
                id: item.id.clone(),
                reason: item.reason,
                source: asset.path.clone(),
                output,
            });
        }

        let mut deleted = Vec::with_capacity(plan.to_delete.len());
        for id in &plan.to_delete {
            let path = self.derived_path(id);
            let existed = if options.dry_run {
                tracing::info!("[dry-run] would delete: {}", path.display());
                path.exists()
            } else {
                remove_if_present(&path, &self.layout.derived_dir)?
            };
            deleted.push(Deleted {
                id: id.clone(),
                path,
                existed,
            });
        }

        let changed = !plan.is_empty();
        let mut docs = None;
        if changed && !options.dry_run {
            hash_store::save(&self.layout.manifest, &sources.manifest())?;
            let surviving = self.surviving_ids(&sources)?;
            docs = Some(self.documenter.regenerate(&surviving)?);
        } else if !changed {
            tracing::debug!("nothing to do");
        }

        Ok(SyncReport {
            changed,
            dry_run: options.dry_run,
            converted,
            deleted,
            unchanged: plan.unchanged,
            docs,
            finished_at: Utc::now(),
        })
    }

    /// Derived assets on disk whose source still exists, sorted by id.
    pub fn surviving_ids(&self, sources: &SourceSet) -> Result<Vec<AssetId>, SyncError> {
        let dir = &self.layout.derived_dir;
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(scan_err(dir, err)),
        };

        let suffix = format!(".{}", self.config.derived_extension);
        let mut ids = BTreeSet::new();
        for entry in entries {
            let entry = entry.map_err(|e| scan_err(dir, e))?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            let Some(stem) = name.strip_suffix(&suffix) else {
                continue;
            };
            let id = AssetId::from(stem);
            if sources.contains(&id) && entry.path().is_file() {
                ids.insert(id);
            }
        }
        Ok(ids.into_iter().collect())
    }

    fn derived_path(&self, id: &AssetId) -> PathBuf {
        self.layout
            .derived_path(&id.derived_file_name(&self.config.derived_extension))
    }
}

/// Remove `path`; returns whether it existed. Absent is not an error.
///
/// Only files directly inside `derived_dir` are ever removed.
fn remove_if_present(path: &Path, derived_dir: &Path) -> Result<bool, SyncError> {
    if path.parent() != Some(derived_dir) {
        return Err(SyncError::Delete {
            path: path.to_path_buf(),
            source: std::io::Error::new(
                ErrorKind::InvalidInput,
                format!("refusing to delete outside {}", derived_dir.display()),
            ),
        });
    }
    match std::fs::remove_file(path) {
        Ok(()) => {
            tracing::info!("deleted: {}", path.display());
            Ok(true)
        }
        Err(err) if err.kind() == ErrorKind::NotFound => {
            tracing::debug!("already absent: {}", path.display());
            Ok(false)
        }
        Err(err) => Err(SyncError::Delete {
            path: path.to_path_buf(),
            source: err,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::fs;

    use tempfile::TempDir;

    use crate::error::ConvertError;

    /// Copies the source bytes; fails for ids listed in `fail`.
    #[derive(Default)]
    struct CopyConverter {
        fail: Vec<&'static str>,
        calls: RefCell<Vec<String>>,
    }

    impl Converter for CopyConverter {
        fn convert(&self, source: &Path, output: &Path) -> Result<(), ConvertError> {
            let stem = source.file_stem().unwrap().to_string_lossy().into_owned();
            self.calls.borrow_mut().push(stem.clone());
            if self.fail.contains(&stem.as_str()) {
                return Err(ConvertError::Failed {
                    program: "copy".into(),
                    status: "exit status: 1".into(),
                    stderr: "bad input".into(),
                });
            }
            fs::create_dir_all(output.parent().unwrap()).unwrap();
            fs::copy(source, output).unwrap();
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingDocs {
        calls: RefCell<Vec<Vec<String>>>,
    }

    impl Documenter for RecordingDocs {
        fn regenerate(&self, ids: &[AssetId]) -> Result<DocUpdate, SyncError> {
            self.calls
                .borrow_mut()
                .push(ids.iter().map(|i| i.to_string()).collect());
            Ok(DocUpdate::Disabled)
        }
    }

    struct Repo {
        _root: TempDir,
        config: SyncConfig,
        layout: Layout,
    }

    impl Repo {
        fn new() -> Self {
            let root = TempDir::new().unwrap();
            let config = SyncConfig::default();
            let layout = config.layout(root.path());
            Repo {
                _root: root,
                config,
                layout,
            }
        }

        fn video(&self, name: &str, bytes: &[u8]) {
            fs::create_dir_all(&self.layout.source_dir).unwrap();
            fs::write(self.layout.source_dir.join(name), bytes).unwrap();
        }

        fn gif(&self, id: &str) -> PathBuf {
            self.layout.derived_dir.join(format!("{id}.gif"))
        }

        fn run(
            &self,
            converter: &CopyConverter,
            docs: &RecordingDocs,
            dry_run: bool,
        ) -> Result<SyncReport, SyncError> {
            SyncExecutor::new(&self.config, &self.layout, converter, docs)
                .execute(RunOptions { dry_run })
        }
    }

    #[test]
    fn first_run_converts_and_records() {
        let repo = Repo::new();
        repo.video("intro.mp4", b"v1");
        let (conv, docs) = (CopyConverter::default(), RecordingDocs::default());

        let report = repo.run(&conv, &docs, false).unwrap();

        assert!(report.changed);
        assert_eq!(report.converted.len(), 1);
        assert_eq!(report.converted[0].reason, ChangeReason::New);
        assert_eq!(fs::read(repo.gif("intro")).unwrap(), b"v1");
        let manifest = hash_store::load(&repo.layout.manifest).unwrap();
        assert_eq!(manifest.len(), 1);
        assert_eq!(*docs.calls.borrow(), vec![vec!["intro".to_string()]]);
    }

    #[test]
    fn no_changes_means_no_side_effects() {
        let repo = Repo::new();
        repo.video("intro.mp4", b"v1");
        repo.run(&CopyConverter::default(), &RecordingDocs::default(), false)
            .unwrap();
        let manifest_before = fs::read_to_string(&repo.layout.manifest).unwrap();

        let (conv, docs) = (CopyConverter::default(), RecordingDocs::default());
        let report = repo.run(&conv, &docs, false).unwrap();

        assert!(!report.changed);
        assert!(report.docs.is_none());
        assert!(conv.calls.borrow().is_empty());
        assert!(docs.calls.borrow().is_empty());
        assert_eq!(fs::read_to_string(&repo.layout.manifest).unwrap(), manifest_before);
    }

    #[test]
    fn empty_repo_is_noop_and_writes_nothing() {
        let repo = Repo::new();
        let report = repo
            .run(&CopyConverter::default(), &RecordingDocs::default(), false)
            .unwrap();
        assert!(!report.changed);
        assert!(!repo.layout.manifest.exists());
    }

    #[test]
    fn conversion_failure_aborts_before_manifest() {
        let repo = Repo::new();
        repo.video("a.mp4", b"a");
        repo.video("b.mp4", b"b");
        let conv = CopyConverter {
            fail: vec!["b"],
            ..Default::default()
        };
        let docs = RecordingDocs::default();

        let err = repo.run(&conv, &docs, false).unwrap_err();

        assert_eq!(err.stage(), crate::Stage::Convert);
        assert!(matches!(&err, SyncError::Convert { id, .. } if id.as_str() == "b"));
        assert!(!repo.layout.manifest.exists(), "manifest must not be written");
        assert!(docs.calls.borrow().is_empty());
        // Earlier success stays on disk unrecorded.
        assert!(repo.gif("a").exists());
    }

    #[test]
    fn failure_stops_remaining_conversions() {
        let repo = Repo::new();
        repo.video("a.mp4", b"a");
        repo.video("b.mp4", b"b");
        repo.video("c.mp4", b"c");
        let conv = CopyConverter {
            fail: vec!["b"],
            ..Default::default()
        };
        repo.run(&conv, &RecordingDocs::default(), false).unwrap_err();
        assert_eq!(*conv.calls.borrow(), vec!["a".to_string(), "b".to_string()]);
        assert!(!repo.gif("c").exists());
    }

    #[test]
    fn removed_source_deletes_gif_and_entry() {
        let repo = Repo::new();
        repo.video("a.mp4", b"a");
        repo.video("b.mp4", b"b");
        repo.run(&CopyConverter::default(), &RecordingDocs::default(), false)
            .unwrap();

        fs::remove_file(repo.layout.source_dir.join("b.mp4")).unwrap();
        let docs = RecordingDocs::default();
        let report = repo.run(&CopyConverter::default(), &docs, false).unwrap();

        assert!(report.changed);
        assert_eq!(report.deleted.len(), 1);
        assert!(report.deleted[0].existed);
        assert!(!repo.gif("b").exists());
        let manifest = hash_store::load(&repo.layout.manifest).unwrap();
        assert!(!manifest.contains_key(&AssetId::from("b")));
        assert_eq!(*docs.calls.borrow(), vec![vec!["a".to_string()]]);
    }

    #[test]
    fn missing_delete_target_is_not_an_error() {
        let repo = Repo::new();
        fs::create_dir_all(repo.layout.manifest.parent().unwrap()).unwrap();
        fs::write(&repo.layout.manifest, "ghost deadbeef\n").unwrap();

        let report = repo
            .run(&CopyConverter::default(), &RecordingDocs::default(), false)
            .unwrap();
        assert!(report.changed);
        assert!(!report.deleted[0].existed);
        assert_eq!(fs::read_to_string(&repo.layout.manifest).unwrap(), "");
    }

    #[test]
    fn manifest_ids_cannot_reach_outside_derived_dir() {
        let repo = Repo::new();
        let outside = TempDir::new().unwrap();
        let victim = repo.layout.root.join("victim.gif");
        let other = outside.path().join("other.gif");
        fs::write(&victim, b"keep").unwrap();
        fs::write(&other, b"keep").unwrap();
        fs::create_dir_all(&repo.layout.derived_dir).unwrap();
        fs::create_dir_all(repo.layout.manifest.parent().unwrap()).unwrap();
        fs::write(
            &repo.layout.manifest,
            format!("../victim deadbeef\n{} cafe\n", outside.path().join("other").display()),
        )
        .unwrap();

        let report = repo
            .run(&CopyConverter::default(), &RecordingDocs::default(), false)
            .unwrap();

        assert!(report.deleted.is_empty());
        assert!(victim.exists(), "file outside derived dir was deleted");
        assert!(other.exists(), "file outside derived dir was deleted");
    }

    #[test]
    fn remove_refuses_paths_outside_derived_dir() {
        let repo = Repo::new();
        fs::create_dir_all(&repo.layout.derived_dir).unwrap();
        let outside = repo.layout.root.join("victim.gif");
        fs::write(&outside, b"keep").unwrap();

        let err = remove_if_present(&outside, &repo.layout.derived_dir).unwrap_err();
        assert_eq!(err.stage(), crate::Stage::Delete);
        assert!(outside.exists());

        fs::write(repo.gif("inside"), b"x").unwrap();
        assert!(remove_if_present(&repo.gif("inside"), &repo.layout.derived_dir).unwrap());
    }

    #[test]
    fn docs_list_only_gifs_with_live_sources() {
        let repo = Repo::new();
        repo.video("a.mp4", b"a");
        repo.video("c.mp4", b"c");
        fs::create_dir_all(&repo.layout.derived_dir).unwrap();
        fs::write(repo.gif("orphan"), b"x").unwrap();
        fs::write(repo.layout.derived_dir.join("a.reelsync-tmp.gif"), b"x").unwrap();

        let docs = RecordingDocs::default();
        repo.run(&CopyConverter::default(), &docs, false).unwrap();
        assert_eq!(
            *docs.calls.borrow(),
            vec![vec!["a".to_string(), "c".to_string()]]
        );
    }

    #[test]
    fn dry_run_reports_without_touching_disk() {
        let repo = Repo::new();
        repo.video("a.mp4", b"a");
        let (conv, docs) = (CopyConverter::default(), RecordingDocs::default());

        let report = repo.run(&conv, &docs, true).unwrap();

        assert!(report.changed && report.dry_run);
        assert_eq!(report.converted[0].output, repo.gif("a"));
        assert!(conv.calls.borrow().is_empty());
        assert!(docs.calls.borrow().is_empty());
        assert!(!repo.layout.manifest.exists());
        assert!(!repo.gif("a").exists());
    }

    #[test]
    fn prepare_exposes_previous_manifest() {
        let repo = Repo::new();
        repo.video("a.mp4", b"a");
        repo.run(&CopyConverter::default(), &RecordingDocs::default(), false)
            .unwrap();
        repo.video("a.mp4", b"a2");

        let (conv, docs) = (CopyConverter::default(), RecordingDocs::default());
        let planned = SyncExecutor::new(&repo.config, &repo.layout, &conv, &docs)
            .prepare()
            .unwrap();
        assert_eq!(planned.previous.len(), 1);
        assert_eq!(planned.plan.to_convert[0].reason, ChangeReason::Changed);
    }
}
