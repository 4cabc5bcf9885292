//! JSON report form of a diff result
//!
//! The wire schema consumed by callers: a `summary` block of counts plus the
//! flat change list. Field order is fixed by the struct definitions, so
//! identical inputs serialise byte-identically.

use serde::{Deserialize, Serialize};

use crate::differ::DiffResult;
use crate::model::SemanticChange;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffSummary {
    pub file_count: usize,
    pub added: usize,
    pub modified: usize,
    pub deleted: usize,
    pub moved: usize,
    pub renamed: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiffReport {
    pub summary: DiffSummary,
    pub changes: Vec<SemanticChange>,
}

impl DiffReport {
    pub fn new(result: &DiffResult) -> Self {
        Self {
            summary: DiffSummary {
                file_count: result.file_count,
                added: result.added_count,
                modified: result.modified_count,
                deleted: result.deleted_count,
                moved: result.moved_count,
                renamed: result.renamed_count,
                total: result.total(),
            },
            changes: result.changes.clone(),
        }
    }

    /// Pretty-printed JSON form
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}
