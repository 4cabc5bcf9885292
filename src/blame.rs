//! Entity-level blame
//!
//! For the current version of a file, walks commits newest-first and pins
//! each entity to the first commit where its structural hash differs from the
//! next-older version (or where it first appears). Entities untouched through
//! the whole window attribute to the oldest commit that still contains them;
//! entities not yet committed attribute to nothing.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::{Result, SemError};
use crate::git::{commit_log, file_at_ref, CommitInfo};
use crate::registry::ParserRegistry;

/// Default number of commits examined
pub const DEFAULT_BLAME_DEPTH: usize = 50;

/// Attribution for one entity of the current file version
#[derive(Debug, Clone)]
pub struct EntityBlame {
    pub entity_id: String,
    pub name: String,
    pub entity_type: String,
    pub start_line: usize,
    pub end_line: usize,
    /// None when the entity only exists in the worktree
    pub commit: Option<CommitInfo>,
}

/// Blame every entity of `file_path` (relative to `root`)
pub fn blame_file(
    root: &Path,
    file_path: &str,
    registry: &ParserRegistry,
    depth: usize,
) -> Result<Vec<EntityBlame>> {
    let full_path = root.join(file_path);
    let content = fs::read(&full_path).map_err(|_| SemError::FileNotFound {
        path: file_path.to_string(),
    })?;
    let content = String::from_utf8_lossy(&content).into_owned();

    let plugin = registry
        .get_plugin(file_path)
        .ok_or_else(|| SemError::FileNotFound {
            path: file_path.to_string(),
        })?;
    let current = plugin.extract_entities(&content, file_path);
    if current.is_empty() {
        return Ok(Vec::new());
    }

    let commits = commit_log(Some(file_path), depth, Some(root))?;

    // id → content hash at a given commit; extraction is done at most once
    // per commit, and the walk stops as soon as everything is attributed
    let entities_at = |commit: &CommitInfo| -> HashMap<String, String> {
        file_at_ref(file_path, &commit.sha, Some(root))
            .map(|blob| {
                plugin
                    .extract_entities(&blob, file_path)
                    .into_iter()
                    .map(|e| (e.id, e.content_hash))
                    .collect()
            })
            .unwrap_or_default()
    };

    let mut attributed: HashMap<String, Option<CommitInfo>> = HashMap::new();
    let mut pending: Vec<String> = current.iter().map(|e| e.id.clone()).collect();

    if commits.is_empty() {
        for id in pending.drain(..) {
            attributed.insert(id, None);
        }
    } else {
        let mut newer = entities_at(&commits[0]);
        for (i, commit) in commits.iter().enumerate() {
            if pending.is_empty() {
                break;
            }
            let older = match commits.get(i + 1) {
                Some(older_commit) => entities_at(older_commit),
                None => HashMap::new(),
            };

            pending.retain(|id| match newer.get(id) {
                // Absent from the newest commit: worktree-only
                None => {
                    attributed.insert(id.clone(), None);
                    false
                }
                Some(hash) => match older.get(id) {
                    // Freshly present, or changed against the older version
                    None => {
                        attributed.insert(id.clone(), Some(commit.clone()));
                        false
                    }
                    Some(older_hash) if older_hash != hash => {
                        attributed.insert(id.clone(), Some(commit.clone()));
                        false
                    }
                    _ => true,
                },
            });

            newer = older;
        }
    }

    Ok(current
        .iter()
        .map(|entity| EntityBlame {
            entity_id: entity.id.clone(),
            name: entity.name.clone(),
            entity_type: entity.entity_type.clone(),
            start_line: entity.start_line,
            end_line: entity.end_line,
            commit: attributed.get(&entity.id).cloned().flatten(),
        })
        .collect())
}
