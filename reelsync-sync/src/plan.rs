//! Reconciliation planning: pure comparison of current and previous hashes.
//!
//! - `to_convert`: ids that are new, or whose hash differs from the manifest
//! - `to_delete`: ids in the manifest with no current source
//! - everything else is untouched
//!
//! No I/O happens here.

use serde::Serialize;

use reelsync_core::{AssetId, Manifest};

/// Why an asset is regenerated. Informational only; both paths convert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeReason {
    New,
    Changed,
}

/// One asset scheduled for (re)generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedConversion {
    pub id: AssetId,
    pub reason: ChangeReason,
}

/// Sets of ids to convert and to delete for one run, each sorted by id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconciliationPlan {
    pub to_convert: Vec<PlannedConversion>,
    pub to_delete: Vec<AssetId>,
    pub unchanged: Vec<AssetId>,
}

impl ReconciliationPlan {
    /// `true` when the run is a no-op.
    pub fn is_empty(&self) -> bool {
        self.to_convert.is_empty() && self.to_delete.is_empty()
    }

    pub fn converts(&self, id: &AssetId) -> bool {
        self.to_convert.iter().any(|c| &c.id == id)
    }

    pub fn deletes(&self, id: &AssetId) -> bool {
        self.to_delete.contains(id)
    }
}

/// Compare `current` against `previous`.
pub fn plan(current: &Manifest, previous: &Manifest) -> ReconciliationPlan {
    let mut result = ReconciliationPlan::default();

    for (id, hash) in current {
        match previous.get(id) {
            None => result.to_convert.push(PlannedConversion {
                id: id.clone(),
                reason: ChangeReason::New,
            }),
            Some(old) if old != hash => result.to_convert.push(PlannedConversion {
                id: id.clone(),
                reason: ChangeReason::Changed,
            }),
            Some(_) => result.unchanged.push(id.clone()),
        }
    }

    result.to_delete = previous
        .keys()
        .filter(|id| !current.contains_key(*id))
        .cloned()
        .collect();

    result
}
