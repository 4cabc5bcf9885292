//! Markdown plugin
//!
//! ATX headings (`#` through `######`) delimit sections. Extraction is two
//! passes: scan the document once for heading positions, then slice each
//! section out of the line buffer — a section runs from its heading to the
//! line before the next one, and its parent is the nearest preceding heading
//! of strictly lower level. Content ahead of the first heading becomes a
//! single `preamble` entity.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::hash::content_hash;
use crate::model::{build_entity_id, SemanticEntity};
use crate::registry::ParserPlugin;

static ATX_HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(#{1,6})\s+(\S.*)").unwrap());

pub struct MarkdownParserPlugin;

/// One heading occurrence found by the scan pass
struct HeadingLine {
    level: usize,
    title: String,
    /// 1-based source line of the heading itself
    line: usize,
}

impl ParserPlugin for MarkdownParserPlugin {
    fn id(&self) -> &str {
        "markdown"
    }

    fn extensions(&self) -> &[&str] {
        &[".md", ".mdx", ".markdown"]
    }

    fn extract_entities(&self, content: &str, file_path: &str) -> Vec<SemanticEntity> {
        let lines: Vec<&str> = content.lines().collect();
        let headings = scan_headings(&lines);

        let mut entities = Vec::new();
        if let Some(preamble) = preamble_entity(&lines, &headings, file_path) {
            entities.push(preamble);
        }

        for (idx, heading) in headings.iter().enumerate() {
            let last_line = headings
                .get(idx + 1)
                .map(|next| next.line - 1)
                .unwrap_or(lines.len());
            let body = lines[heading.line - 1..last_line]
                .join("\n")
                .trim()
                .to_string();

            let parent_id = enclosing_heading(&headings, idx)
                .map(|parent| build_entity_id(file_path, "heading", &parent.title, None));

            entities.push(SemanticEntity {
                id: build_entity_id(file_path, "heading", &heading.title, None),
                file_path: file_path.to_string(),
                entity_type: "heading".to_string(),
                name: heading.title.clone(),
                parent_id,
                content_hash: content_hash(&body),
                content: body,
                start_line: heading.line,
                end_line: last_line,
                metadata: None,
            });
        }

        entities
    }
}

/// Every ATX heading in the document, with level and position
fn scan_headings(lines: &[&str]) -> Vec<HeadingLine> {
    lines
        .iter()
        .enumerate()
        .filter_map(|(idx, line)| {
            ATX_HEADING.captures(line).map(|caps| HeadingLine {
                level: caps[1].len(),
                title: caps[2].trim().to_string(),
                line: idx + 1,
            })
        })
        .collect()
}

/// Nearest heading before `idx` whose level is strictly lower
fn enclosing_heading(headings: &[HeadingLine], idx: usize) -> Option<&HeadingLine> {
    let level = headings[idx].level;
    headings[..idx].iter().rev().find(|h| h.level < level)
}

/// Non-blank content ahead of the first heading, if there is any
fn preamble_entity(
    lines: &[&str],
    headings: &[HeadingLine],
    file_path: &str,
) -> Option<SemanticEntity> {
    let boundary = headings.first().map(|h| h.line - 1).unwrap_or(lines.len());
    let region = &lines[..boundary];
    let first = region.iter().position(|l| !l.trim().is_empty())?;
    let last = region.iter().rposition(|l| !l.trim().is_empty())?;
    let body = region[first..=last].join("\n");

    Some(SemanticEntity {
        id: build_entity_id(file_path, "preamble", "(preamble)", None),
        file_path: file_path.to_string(),
        entity_type: "preamble".to_string(),
        name: "(preamble)".to_string(),
        parent_id: None,
        content_hash: content_hash(&body),
        content: body,
        start_line: first + 1,
        end_line: last + 1,
        metadata: None,
    })
}
