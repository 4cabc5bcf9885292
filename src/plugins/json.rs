//! JSON plugin
//!
//! Walks the parsed document (order-preserving) to a maximum nesting depth of
//! three levels below the root. Object keys become `property` entities for
//! primitive values and `object` entities for nested objects; array elements
//! that are objects become `element` entities. Names are RFC 6901 pointers.

use serde_json::Value;

use crate::hash::content_hash;
use crate::model::{build_entity_id, SemanticEntity};
use crate::registry::ParserPlugin;

/// Keys deeper than this below the root are not walked
const MAX_DEPTH: usize = 3;

pub struct JsonParserPlugin;

impl ParserPlugin for JsonParserPlugin {
    fn id(&self) -> &str {
        "json"
    }

    fn extensions(&self) -> &[&str] {
        &[".json"]
    }

    fn extract_entities(&self, content: &str, file_path: &str) -> Vec<SemanticEntity> {
        let parsed: Value = match serde_json::from_str(content) {
            Ok(v) => v,
            Err(_) => return Vec::new(),
        };

        let lines: Vec<&str> = content.lines().collect();
        let mut entities = Vec::new();
        walk_value(
            &parsed,
            "",
            0,
            None,
            0,
            &lines,
            file_path,
            &mut entities,
        );
        entities
    }
}

/// RFC 6901 token escaping: `~` becomes `~0`, `/` becomes `~1`
fn escape_pointer_token(key: &str) -> String {
    key.replace('~', "~0").replace('/', "~1")
}

#[allow(clippy::too_many_arguments)]
fn walk_value(
    value: &Value,
    pointer: &str,
    depth: usize,
    parent_id: Option<&str>,
    search_from: usize,
    lines: &[&str],
    file_path: &str,
    entities: &mut Vec<SemanticEntity>,
) {
    if depth >= MAX_DEPTH {
        return;
    }

    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let child_pointer = format!("{pointer}/{}", escape_pointer_token(key));
                let entity_type = if child.is_object() { "object" } else { "property" };
                let content = serde_json::to_string_pretty(child).unwrap_or_default();
                let start_line = find_key_line(lines, key, search_from).unwrap_or(search_from + 1);
                let end_line = start_line + content.lines().count().saturating_sub(1);

                let entity = SemanticEntity {
                    id: build_entity_id(file_path, entity_type, &child_pointer, None),
                    file_path: file_path.to_string(),
                    entity_type: entity_type.to_string(),
                    name: child_pointer.clone(),
                    parent_id: parent_id.map(String::from),
                    content_hash: content_hash(content.trim()),
                    content,
                    start_line,
                    end_line,
                    metadata: None,
                };
                let entity_id = entity.id.clone();
                entities.push(entity);

                walk_value(
                    child,
                    &child_pointer,
                    depth + 1,
                    Some(&entity_id),
                    start_line.saturating_sub(1),
                    lines,
                    file_path,
                    entities,
                );
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                if !child.is_object() {
                    continue;
                }
                let child_pointer = format!("{pointer}/{index}");
                let content = serde_json::to_string_pretty(child).unwrap_or_default();
                let start_line = search_from + 1;
                let end_line = start_line + content.lines().count().saturating_sub(1);

                let entity = SemanticEntity {
                    id: build_entity_id(file_path, "element", &child_pointer, None),
                    file_path: file_path.to_string(),
                    entity_type: "element".to_string(),
                    name: child_pointer.clone(),
                    parent_id: parent_id.map(String::from),
                    content_hash: content_hash(content.trim()),
                    content,
                    start_line,
                    end_line,
                    metadata: None,
                };
                let entity_id = entity.id.clone();
                entities.push(entity);

                walk_value(
                    child,
                    &child_pointer,
                    depth + 1,
                    Some(&entity_id),
                    search_from,
                    lines,
                    file_path,
                    entities,
                );
            }
        }
        _ => {}
    }
}

/// Best-effort line attribution: first line at or after `from` (0-based)
/// containing the quoted key, returned 1-based
fn find_key_line(lines: &[&str], key: &str, from: usize) -> Option<usize> {
    let needle = format!("\"{key}\"");
    lines
        .iter()
        .enumerate()
        .skip(from)
        .find(|(_, line)| line.contains(&needle))
        .map(|(i, _)| i + 1)
}
