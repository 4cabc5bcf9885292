//! Diff orchestration across a file-change list
//!
//! Per-file work (two extractions plus a match) is independent, so it fans
//! out on the rayon pool and joins in input order; the emitted change list is
//! therefore deterministic. Extraction runs behind a panic boundary: a
//! misbehaving plugin empties its own side of one file and never affects
//! sibling files.

use std::collections::HashSet;
use std::panic::{catch_unwind, AssertUnwindSafe};

use rayon::prelude::*;
use tracing::debug;

use crate::cancel::CancelFlag;
use crate::error::{Result, SemError};
use crate::git::FileChange;
use crate::matching::match_entities;
use crate::model::{ChangeType, SemanticChange, SemanticEntity};
use crate::registry::ParserRegistry;

/// Aggregated outcome of one semantic diff
#[derive(Debug, Clone, Default)]
pub struct DiffResult {
    pub changes: Vec<SemanticChange>,
    /// Distinct files that contributed at least one change
    pub file_count: usize,
    pub added_count: usize,
    pub modified_count: usize,
    pub deleted_count: usize,
    pub moved_count: usize,
    pub renamed_count: usize,
}

impl DiffResult {
    pub fn total(&self) -> usize {
        self.changes.len()
    }
}

/// Compute the semantic diff over a list of file changes
pub fn compute_semantic_diff(
    file_changes: &[FileChange],
    registry: &ParserRegistry,
    commit_sha: Option<&str>,
    author: Option<&str>,
) -> DiffResult {
    // Infallible without a cancellation token
    compute_semantic_diff_cancellable(file_changes, registry, commit_sha, author, &CancelFlag::new())
        .unwrap_or_default()
}

/// Cancellable variant; the flag is checked at file boundaries and a set flag
/// returns `Err(Cancelled)` with no partial result.
pub fn compute_semantic_diff_cancellable(
    file_changes: &[FileChange],
    registry: &ParserRegistry,
    commit_sha: Option<&str>,
    author: Option<&str>,
    cancel: &CancelFlag,
) -> Result<DiffResult> {
    let per_file: Vec<Vec<SemanticChange>> = file_changes
        .par_iter()
        .map(|file| {
            if cancel.is_cancelled() {
                return Vec::new();
            }
            diff_one_file(file, registry, commit_sha, author)
        })
        .collect();

    if cancel.is_cancelled() {
        return Err(SemError::Cancelled);
    }

    let mut all_changes: Vec<SemanticChange> = Vec::new();
    let mut files_with_changes: HashSet<&str> = HashSet::new();
    for (file, changes) in file_changes.iter().zip(per_file) {
        if !changes.is_empty() {
            files_with_changes.insert(file.file_path.as_str());
            all_changes.extend(changes);
        }
    }

    let mut result = DiffResult {
        file_count: files_with_changes.len(),
        ..Default::default()
    };
    for change in &all_changes {
        match change.change_type {
            ChangeType::Added => result.added_count += 1,
            ChangeType::Modified => result.modified_count += 1,
            ChangeType::Deleted => result.deleted_count += 1,
            ChangeType::Moved => result.moved_count += 1,
            ChangeType::Renamed => result.renamed_count += 1,
        }
    }
    result.changes = all_changes;

    debug!(
        files = result.file_count,
        changes = result.changes.len(),
        "semantic diff computed"
    );
    Ok(result)
}

fn diff_one_file(
    file: &FileChange,
    registry: &ParserRegistry,
    commit_sha: Option<&str>,
    author: Option<&str>,
) -> Vec<SemanticChange> {
    let plugin = match registry.get_plugin(&file.file_path) {
        Some(p) => p,
        None => return Vec::new(),
    };

    // Renamed files extract the before side under the old path so that the
    // matcher classifies surviving entities as moved
    let before_path = file.old_file_path.as_deref().unwrap_or(&file.file_path);
    let before_entities = file
        .before_content
        .as_deref()
        .map(|content| guarded_extract(plugin, content, before_path))
        .unwrap_or_default();

    let after_entities = file
        .after_content
        .as_deref()
        .map(|content| guarded_extract(plugin, content, &file.file_path))
        .unwrap_or_default();

    let sim = |a: &SemanticEntity, b: &SemanticEntity| plugin.similarity(a, b);
    match_entities(
        &before_entities,
        &after_entities,
        &file.file_path,
        Some(&sim),
        commit_sha,
        author,
    )
    .changes
}

/// Extraction behind a panic boundary: parse failures are local to one side
/// of one file
fn guarded_extract(
    plugin: &dyn crate::registry::ParserPlugin,
    content: &str,
    file_path: &str,
) -> Vec<SemanticEntity> {
    catch_unwind(AssertUnwindSafe(|| {
        plugin.extract_entities(content, file_path)
    }))
    .unwrap_or_else(|_| {
        debug!(file = file_path, "plugin panicked; treating side as empty");
        Vec::new()
    })
}
