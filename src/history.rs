//! Entity history across commits
//!
//! Tracks one entity backward through a file's commit log, recording a
//! transition whenever its presence or structural hash flips: appeared →
//! `added`, hash changed → `modified`, vanished → `deleted`.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::{Result, SemError};
use crate::git::{commit_log, file_at_ref, git_command, CommitInfo};
use crate::model::ChangeType;
use crate::registry::ParserRegistry;

/// Default number of commits examined
pub const DEFAULT_HISTORY_DEPTH: usize = 50;

/// One presence/hash flip in an entity's past
#[derive(Debug, Clone)]
pub struct HistoryEvent {
    pub change_type: ChangeType,
    pub commit: CommitInfo,
}

/// Resolved query plus its transitions, newest first
#[derive(Debug, Clone)]
pub struct EntityHistory {
    pub query: String,
    pub file_path: String,
    pub entity_id: String,
    pub events: Vec<HistoryEvent>,
}

/// Track an entity backward through commits.
///
/// The query is either a full id (`<file>::<type>::<name>`) or a bare entity
/// name, which is resolved by scanning tracked files for the first entity
/// carrying that name.
pub fn entity_history(
    root: &Path,
    query: &str,
    registry: &ParserRegistry,
    depth: usize,
) -> Result<EntityHistory> {
    let (file_path, entity_id) = resolve_query(root, query, registry)?;

    let plugin = registry
        .get_plugin(&file_path)
        .ok_or_else(|| SemError::EntityNotFound {
            query: query.to_string(),
        })?;

    // id → hash at one commit
    let hash_at = |commit: &CommitInfo| -> HashMap<String, String> {
        file_at_ref(&file_path, &commit.sha, Some(root))
            .map(|blob| {
                plugin
                    .extract_entities(&blob, &file_path)
                    .into_iter()
                    .map(|e| (e.id, e.content_hash))
                    .collect()
            })
            .unwrap_or_default()
    };

    let commits = commit_log(Some(&file_path), depth, Some(root))?;
    let mut events = Vec::new();

    if !commits.is_empty() {
        let mut newer = hash_at(&commits[0]);
        for (i, commit) in commits.iter().enumerate() {
            let older = match commits.get(i + 1) {
                Some(older_commit) => hash_at(older_commit),
                None => HashMap::new(),
            };

            match (newer.get(&entity_id), older.get(&entity_id)) {
                (Some(_), None) => events.push(HistoryEvent {
                    change_type: ChangeType::Added,
                    commit: commit.clone(),
                }),
                (Some(new_hash), Some(old_hash)) if new_hash != old_hash => {
                    events.push(HistoryEvent {
                        change_type: ChangeType::Modified,
                        commit: commit.clone(),
                    })
                }
                (None, Some(_)) => events.push(HistoryEvent {
                    change_type: ChangeType::Deleted,
                    commit: commit.clone(),
                }),
                _ => {}
            }

            newer = older;
        }
    }

    Ok(EntityHistory {
        query: query.to_string(),
        file_path,
        entity_id,
        events,
    })
}

/// Resolve a query string to `(file_path, entity_id)`
fn resolve_query(
    root: &Path,
    query: &str,
    registry: &ParserRegistry,
) -> Result<(String, String)> {
    if let Some((file, _rest)) = query.split_once("::") {
        return Ok((file.to_string(), query.to_string()));
    }

    // Bare name: scan tracked files for the first entity with this name
    let listing = git_command(&["ls-files"], Some(root))?;
    for file in listing.lines() {
        if file.is_empty() || file.starts_with(".sem/") {
            continue;
        }
        let Ok(bytes) = fs::read(root.join(file)) else {
            continue;
        };
        let content = String::from_utf8_lossy(&bytes);
        let Some(plugin) = registry.get_plugin(file) else {
            continue;
        };
        if let Some(entity) = plugin
            .extract_entities(&content, file)
            .into_iter()
            .find(|e| e.name == query)
        {
            return Ok((file.to_string(), entity.id));
        }
    }

    Err(SemError::EntityNotFound {
        query: query.to_string(),
    })
}
