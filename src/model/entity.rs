//! The canonical entity record
//!
//! An entity is a named, locatable unit of meaning inside a file: a function,
//! a class, a JSON property, a Markdown section, a CSV row. Entities are pure
//! values derived from file bytes; plugins create them, nothing mutates them.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A named structural unit extracted from one file at one revision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SemanticEntity {
    /// Stable identifier, unique within a `(file, revision)` pair
    pub id: String,
    /// Path relative to the repository root, forward-slash normalised
    pub file_path: String,
    /// Canonical tag: `function`, `class`, `property`, `section`, `row`, ...
    pub entity_type: String,
    /// Human identifier; full pointer/dotted path for config formats
    pub name: String,
    /// Id of the enclosing entity, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    /// Exact source slice of the entity
    pub content: String,
    /// SHA-256 hex of the normalised content
    pub content_hash: String,
    /// 1-based inclusive line range
    pub start_line: usize,
    pub end_line: usize,
    /// Extra per-entity data (e.g. CSV column values)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, String>>,
}

/// Build the stable entity id.
///
/// Top-level entities use `<filePath>::<entityType>::<name>`; entities nested
/// under a code parent use `<filePath>::<parentId>::<name>`. Names containing
/// `::` are preserved literally.
pub fn build_entity_id(
    file_path: &str,
    entity_type: &str,
    name: &str,
    parent_id: Option<&str>,
) -> String {
    match parent_id {
        Some(pid) => format!("{file_path}::{pid}::{name}"),
        None => format!("{file_path}::{entity_type}::{name}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_entity_id_top_level() {
        assert_eq!(
            build_entity_id("src/app.ts", "function", "render", None),
            "src/app.ts::function::render"
        );
    }

    #[test]
    fn test_build_entity_id_nested() {
        let parent = build_entity_id("src/app.ts", "class", "App", None);
        let id = build_entity_id("src/app.ts", "method", "render", Some(&parent));
        assert_eq!(id, "src/app.ts::src/app.ts::class::App::render");
    }

    #[test]
    fn test_name_with_separator_is_preserved() {
        let id = build_entity_id("lib.rs", "function", "Vec::new", None);
        assert_eq!(id, "lib.rs::function::Vec::new");
    }
}
