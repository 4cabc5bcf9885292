//! YAML plugin
//!
//! Walks mappings to a maximum depth of four key levels. Scalar leaves become
//! `property` entities, mappings (and sequences) become `section` entities.
//! Key paths are dot-joined; line attribution is a best-effort scan for the
//! first line whose trimmed form starts with `<key>:`.

use serde_yaml::Value;

use crate::hash::content_hash;
use crate::model::{build_entity_id, SemanticEntity};
use crate::registry::ParserPlugin;

/// Keys deeper than this are not walked
const MAX_DEPTH: usize = 4;

pub struct YamlParserPlugin;

impl ParserPlugin for YamlParserPlugin {
    fn id(&self) -> &str {
        "yaml"
    }

    fn extensions(&self) -> &[&str] {
        &[".yml", ".yaml"]
    }

    fn extract_entities(&self, content: &str, file_path: &str) -> Vec<SemanticEntity> {
        let parsed: Value = match serde_yaml::from_str(content) {
            Ok(v) => v,
            Err(_) => return Vec::new(),
        };
        let mapping = match parsed.as_mapping() {
            Some(m) => m,
            None => return Vec::new(),
        };

        let lines: Vec<&str> = content.lines().collect();
        let mut entities = Vec::new();
        walk_mapping(mapping, "", 1, None, 0, &lines, file_path, &mut entities);
        entities
    }
}

#[allow(clippy::too_many_arguments)]
fn walk_mapping(
    mapping: &serde_yaml::Mapping,
    prefix: &str,
    depth: usize,
    parent_id: Option<&str>,
    search_from: usize,
    lines: &[&str],
    file_path: &str,
    entities: &mut Vec<SemanticEntity>,
) {
    if depth > MAX_DEPTH {
        return;
    }

    for (key, value) in mapping {
        let key_str = match key.as_str() {
            Some(s) => s.to_string(),
            None => continue,
        };
        let path = if prefix.is_empty() {
            key_str.clone()
        } else {
            format!("{prefix}.{key_str}")
        };

        let is_section = value.is_mapping() || value.is_sequence();
        let entity_type = if is_section { "section" } else { "property" };
        let content = if is_section {
            serde_yaml::to_string(value)
                .unwrap_or_default()
                .trim()
                .to_string()
        } else {
            scalar_to_string(value)
        };

        let start_line = find_key_line(lines, &key_str, search_from).unwrap_or(search_from + 1);
        let end_line = if is_section {
            start_line + content.lines().count()
        } else {
            start_line
        };

        let entity = SemanticEntity {
            id: build_entity_id(file_path, entity_type, &path, None),
            file_path: file_path.to_string(),
            entity_type: entity_type.to_string(),
            name: path.clone(),
            parent_id: parent_id.map(String::from),
            content_hash: content_hash(content.trim()),
            content,
            start_line,
            end_line,
            metadata: None,
        };
        let entity_id = entity.id.clone();
        entities.push(entity);

        if let Some(child_mapping) = value.as_mapping() {
            walk_mapping(
                child_mapping,
                &path,
                depth + 1,
                Some(&entity_id),
                start_line.saturating_sub(1),
                lines,
                file_path,
                entities,
            );
        }
    }
}

/// First line at or after `from` (0-based) whose trimmed form starts with
/// `<key>:`, returned 1-based
fn find_key_line(lines: &[&str], key: &str, from: usize) -> Option<usize> {
    let needle = format!("{key}:");
    lines
        .iter()
        .enumerate()
        .skip(from)
        .find(|(_, line)| line.trim_start().starts_with(&needle))
        .map(|(i, _)| i + 1)
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        other => format!("{other:?}"),
    }
}
