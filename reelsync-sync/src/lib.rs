//! # reelsync-sync
//!
//! Content-hash gated synchronization of derived previews with source videos.
//!
//! Call [`pipeline::run`] to sync a repository, or build a
//! [`SyncExecutor`] directly to plug in other collaborators.

pub mod convert;
pub mod diff;
pub mod docs;
pub mod error;
pub mod executor;
pub mod hash_store;
pub mod pipeline;
pub mod plan;
pub mod scanner;

pub use convert::{CommandConverter, Converter};
pub use diff::{diff_docs, DocsDiff};
pub use docs::{DocUpdate, Documenter, NoDocs, ReadmeDocumenter};
pub use error::{ConvertError, Stage, SyncError};
pub use executor::{PlannedRun, RunOptions, SyncExecutor, SyncReport};
pub use plan::{ChangeReason, ReconciliationPlan};
