//! Three-phase entity matching
//!
//! Pairs a `before` and an `after` entity list into change records:
//!
//! 1. Exact id match — same id on both sides is the same entity; a hash
//!    difference means `modified`, hash equality means unchanged (silent).
//! 2. Content hash match — identical normalised content under a different id
//!    is a `renamed` entity (same file) or `moved` entity (different file).
//! 3. Fuzzy similarity — residual entities of the same type pair up when
//!    their similarity clears the 0.80 threshold.
//!
//! Whatever is left becomes `deleted` (before side) or `added` (after side).
//! Every step iterates the input slices in order, so identical inputs always
//! produce identical output, and no entity appears in more than one change.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::model::{ChangeType, SemanticChange, SemanticEntity};

/// Minimum similarity for a phase-3 pairing
const SIMILARITY_THRESHOLD: f64 = 0.8;

/// Result of matching two entity lists
#[derive(Debug, Clone)]
pub struct MatchResult {
    pub changes: Vec<SemanticChange>,
}

/// Similarity function signature shared with plugins
pub type SimilarityFn<'a> = &'a dyn Fn(&SemanticEntity, &SemanticEntity) -> f64;

/// Match `before` against `after` and emit the resulting changes.
///
/// `similarity` overrides the default Jaccard token overlap used in phase 3;
/// pass `None` for the default. `commit_sha` and `author` are stamped onto
/// every emitted change.
pub fn match_entities(
    before: &[SemanticEntity],
    after: &[SemanticEntity],
    _file_path: &str,
    similarity: Option<SimilarityFn<'_>>,
    commit_sha: Option<&str>,
    author: Option<&str>,
) -> MatchResult {
    let mut changes: Vec<SemanticChange> = Vec::new();
    let mut matched_before: HashSet<&str> = HashSet::new();
    let mut matched_after: HashSet<&str> = HashSet::new();

    let before_by_id: HashMap<&str, &SemanticEntity> =
        before.iter().map(|e| (e.id.as_str(), e)).collect();

    // Phase 1: exact id match, iterated in after-list order
    for after_entity in after {
        if let Some(before_entity) = before_by_id.get(after_entity.id.as_str()).copied() {
            matched_before.insert(after_entity.id.as_str());
            matched_after.insert(after_entity.id.as_str());

            if before_entity.content_hash != after_entity.content_hash {
                changes.push(make_change(
                    ChangeType::Modified,
                    after_entity,
                    Some(before_entity),
                    None,
                    commit_sha,
                    author,
                ));
            }
        }
    }

    // Phase 2: content hash match. The before side is indexed into per-hash
    // FIFO queues so ties resolve to the earliest unmatched before entity.
    let mut before_by_hash: HashMap<&str, VecDeque<&SemanticEntity>> = HashMap::new();
    for entity in before {
        if !matched_before.contains(entity.id.as_str()) {
            before_by_hash
                .entry(entity.content_hash.as_str())
                .or_default()
                .push_back(entity);
        }
    }

    for after_entity in after {
        if matched_after.contains(after_entity.id.as_str()) {
            continue;
        }
        let found = before_by_hash
            .get_mut(after_entity.content_hash.as_str())
            .and_then(|queue| queue.pop_front());

        if let Some(before_entity) = found {
            matched_before.insert(before_entity.id.as_str());
            matched_after.insert(after_entity.id.as_str());
            changes.push(relocation_change(
                before_entity,
                after_entity,
                commit_sha,
                author,
            ));
        }
    }

    // Phase 3: fuzzy similarity over the residual, same entity type only.
    // Greedy per after entity; an adopted before entity leaves the pool, and
    // ties break toward the earlier before entity (strictly-greater scores
    // replace the running best).
    let still_unmatched_before: Vec<&SemanticEntity> = before
        .iter()
        .filter(|e| !matched_before.contains(e.id.as_str()))
        .collect();

    if !still_unmatched_before.is_empty() {
        let sim_fn: SimilarityFn<'_> = similarity.unwrap_or(&default_similarity);

        for after_entity in after {
            if matched_after.contains(after_entity.id.as_str()) {
                continue;
            }

            let mut best: Option<&SemanticEntity> = None;
            let mut best_score = 0.0_f64;
            for &before_entity in &still_unmatched_before {
                if matched_before.contains(before_entity.id.as_str()) {
                    continue;
                }
                if before_entity.entity_type != after_entity.entity_type {
                    continue;
                }
                let score = sim_fn(before_entity, after_entity);
                if score >= SIMILARITY_THRESHOLD && score > best_score {
                    best_score = score;
                    best = Some(before_entity);
                }
            }

            if let Some(before_entity) = best {
                matched_before.insert(before_entity.id.as_str());
                matched_after.insert(after_entity.id.as_str());
                changes.push(relocation_change(
                    before_entity,
                    after_entity,
                    commit_sha,
                    author,
                ));
            }
        }
    }

    // Terminal phase: residual before entities were deleted
    for entity in before {
        if !matched_before.contains(entity.id.as_str()) {
            changes.push(make_change(
                ChangeType::Deleted,
                entity,
                Some(entity),
                None,
                commit_sha,
                author,
            ));
        }
    }

    // Residual after entities were added
    for entity in after {
        if !matched_after.contains(entity.id.as_str()) {
            changes.push(make_change(
                ChangeType::Added,
                entity,
                None,
                None,
                commit_sha,
                author,
            ));
        }
    }

    MatchResult { changes }
}

/// Emit `moved` when paths differ, `renamed` otherwise
fn relocation_change(
    before_entity: &SemanticEntity,
    after_entity: &SemanticEntity,
    commit_sha: Option<&str>,
    author: Option<&str>,
) -> SemanticChange {
    let (change_type, old_file_path) = if before_entity.file_path != after_entity.file_path {
        (ChangeType::Moved, Some(before_entity.file_path.clone()))
    } else {
        (ChangeType::Renamed, None)
    };
    make_change(
        change_type,
        after_entity,
        Some(before_entity),
        old_file_path,
        commit_sha,
        author,
    )
}

fn make_change(
    change_type: ChangeType,
    subject: &SemanticEntity,
    before: Option<&SemanticEntity>,
    old_file_path: Option<String>,
    commit_sha: Option<&str>,
    author: Option<&str>,
) -> SemanticChange {
    let id = match change_type {
        ChangeType::Added => format!("change::added::{}", subject.id),
        ChangeType::Deleted => format!("change::deleted::{}", subject.id),
        _ => format!("change::{}", subject.id),
    };
    let (before_content, after_content) = match change_type {
        ChangeType::Added => (None, Some(subject.content.clone())),
        ChangeType::Deleted => (Some(subject.content.clone()), None),
        _ => (
            before.map(|e| e.content.clone()),
            Some(subject.content.clone()),
        ),
    };
    SemanticChange {
        id,
        entity_id: subject.id.clone(),
        change_type,
        entity_type: subject.entity_type.clone(),
        entity_name: subject.name.clone(),
        file_path: subject.file_path.clone(),
        old_file_path,
        before_content,
        after_content,
        commit_sha: commit_sha.map(String::from),
        author: author.map(String::from),
        timestamp: None,
    }
}

/// Default content similarity: Jaccard index over whitespace-split tokens
pub fn default_similarity(a: &SemanticEntity, b: &SemanticEntity) -> f64 {
    // Early rejection: when token counts diverge too far, Jaccard cannot
    // reach the threshold anyway
    let a_count = a.content.split_whitespace().count();
    let b_count = b.content.split_whitespace().count();
    let (min_c, max_c) = if a_count < b_count {
        (a_count, b_count)
    } else {
        (b_count, a_count)
    };
    if max_c > 0 && (min_c as f64 / max_c as f64) < 0.6 {
        return 0.0;
    }

    let tokens_a: HashSet<&str> = a.content.split_whitespace().collect();
    let tokens_b: HashSet<&str> = b.content.split_whitespace().collect();

    let intersection = tokens_a.intersection(&tokens_b).count();
    let union = tokens_a.union(&tokens_b).count();

    if union == 0 {
        return 0.0;
    }

    intersection as f64 / union as f64
}
