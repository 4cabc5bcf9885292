//! TOML plugin
//!
//! Identical shape to the YAML plugin: dot-joined key paths walked to depth
//! four, tables as `section` entities, everything else as `property`. The
//! line heuristic additionally recognises `[table]` headers and `key =`
//! assignments.

use toml::Value;

use crate::hash::content_hash;
use crate::model::{build_entity_id, SemanticEntity};
use crate::registry::ParserPlugin;

/// Keys deeper than this are not walked
const MAX_DEPTH: usize = 4;

pub struct TomlParserPlugin;

impl ParserPlugin for TomlParserPlugin {
    fn id(&self) -> &str {
        "toml"
    }

    fn extensions(&self) -> &[&str] {
        &[".toml"]
    }

    fn extract_entities(&self, content: &str, file_path: &str) -> Vec<SemanticEntity> {
        let parsed: Value = match content.parse() {
            Ok(v) => v,
            Err(_) => return Vec::new(),
        };
        let table = match parsed.as_table() {
            Some(t) => t,
            None => return Vec::new(),
        };

        let lines: Vec<&str> = content.lines().collect();
        let mut entities = Vec::new();
        walk_table(table, "", 1, None, 0, &lines, file_path, &mut entities);
        entities
    }
}

#[allow(clippy::too_many_arguments)]
fn walk_table(
    table: &toml::map::Map<String, Value>,
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

    for (key, value) in table {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };

        let is_section = value.is_table();
        let entity_type = if is_section { "section" } else { "property" };
        let content = if is_section {
            toml::to_string(value).unwrap_or_default().trim().to_string()
        } else {
            value_to_string(value)
        };

        let start_line = find_key_line(lines, key, &path, search_from).unwrap_or(search_from + 1);
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

        if let Some(child_table) = value.as_table() {
            walk_table(
                child_table,
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

/// Matches `key:`-less TOML forms: `[path]`, `[[path]]`, `key =`, `key=`
fn find_key_line(lines: &[&str], key: &str, path: &str, from: usize) -> Option<usize> {
    let header = format!("[{path}]");
    let array_header = format!("[[{path}]]");
    let assign = format!("{key} ");
    let assign_tight = format!("{key}=");
    lines
        .iter()
        .enumerate()
        .skip(from)
        .find(|(_, line)| {
            let trimmed = line.trim_start();
            trimmed.starts_with(&header)
                || trimmed.starts_with(&array_header)
                || (trimmed.starts_with(&assign) && trimmed[assign.len()..].trim_start().starts_with('='))
                || trimmed.starts_with(&assign_tight)
        })
        .map(|(i, _)| i + 1)
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Integer(n) => n.to_string(),
        Value::Float(f) => f.to_string(),
        Value::Boolean(b) => b.to_string(),
        Value::Datetime(d) => d.to_string(),
        Value::Array(arr) => serde_json::to_string(arr).unwrap_or_default(),
        Value::Table(_) => String::new(),
    }
}
