//! Fallback plugin
//!
//! Partitions any file into fixed 20-line chunks so that every file has some
//! diffable entities even when no real grammar applies. Registered last;
//! matches no extension of its own.

use crate::hash::content_hash;
use crate::model::{build_entity_id, SemanticEntity};
use crate::registry::ParserPlugin;

const CHUNK_SIZE: usize = 20;

pub struct FallbackParserPlugin;

impl ParserPlugin for FallbackParserPlugin {
    fn id(&self) -> &str {
        "fallback"
    }

    fn extensions(&self) -> &[&str] {
        &[]
    }

    fn extract_entities(&self, content: &str, file_path: &str) -> Vec<SemanticEntity> {
        let lines: Vec<&str> = content.lines().collect();
        lines
            .chunks(CHUNK_SIZE)
            .enumerate()
            .map(|(index, window)| {
                let start_line = index * CHUNK_SIZE + 1;
                let end_line = start_line + window.len() - 1;
                let name = format!("lines {start_line}-{end_line}");
                let body = window.join("\n");
                SemanticEntity {
                    id: build_entity_id(file_path, "chunk", &name, None),
                    file_path: file_path.to_string(),
                    entity_type: "chunk".to_string(),
                    name,
                    parent_id: None,
                    content_hash: content_hash(body.trim()),
                    content: body,
                    start_line,
                    end_line,
                    metadata: None,
                }
            })
            .collect()
    }
}
