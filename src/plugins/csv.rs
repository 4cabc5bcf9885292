//! CSV/TSV plugin
//!
//! The first non-blank line is the header; every following non-blank line is
//! a `row` entity carrying header→cell values in its metadata. Field quoting
//! follows RFC 4180: `"` encloses fields, `""` inside a quoted field is a
//! literal quote, and quoted cells keep their whitespace verbatim. Unquoted
//! cells are whitespace-trimmed.

use std::collections::HashMap;
use std::mem;

use crate::hash::content_hash;
use crate::model::{build_entity_id, SemanticEntity};
use crate::registry::ParserPlugin;

pub struct CsvParserPlugin;

impl ParserPlugin for CsvParserPlugin {
    fn id(&self) -> &str {
        "csv"
    }

    fn extensions(&self) -> &[&str] {
        &[".csv", ".tsv"]
    }

    fn extract_entities(&self, content: &str, file_path: &str) -> Vec<SemanticEntity> {
        let separator = if file_path.to_lowercase().ends_with(".tsv") {
            '\t'
        } else {
            ','
        };

        let mut entities = Vec::new();
        let mut headers: Option<Vec<String>> = None;
        let mut row_number = 0usize;

        for (line_idx, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let cells = split_record(line, separator);

            let header_cells = match headers {
                Some(ref h) => h,
                None => {
                    headers = Some(cells);
                    continue;
                }
            };

            row_number += 1;
            let row_key = match cells.first() {
                Some(first) if !first.is_empty() => first.clone(),
                _ => format!("row_{row_number}"),
            };
            let name = format!("row[{row_key}]");

            let mut metadata = HashMap::new();
            for (i, header) in header_cells.iter().enumerate() {
                metadata.insert(header.clone(), cells.get(i).cloned().unwrap_or_default());
            }

            entities.push(SemanticEntity {
                id: build_entity_id(file_path, "row", &name, None),
                file_path: file_path.to_string(),
                entity_type: "row".to_string(),
                name,
                parent_id: None,
                content_hash: content_hash(line.trim()),
                content: line.to_string(),
                start_line: line_idx + 1,
                end_line: line_idx + 1,
                metadata: Some(metadata),
            });
        }

        entities
    }
}

/// Per-field tokenizer state: the accumulating text plus whether any part of
/// the field sat inside quotes (which exempts it from trimming).
#[derive(Default)]
struct Field {
    text: String,
    quoted: bool,
}

impl Field {
    fn finish(&mut self) -> String {
        let quoted = mem::take(&mut self.quoted);
        let text = mem::take(&mut self.text);
        if quoted {
            text
        } else {
            text.trim().to_string()
        }
    }
}

/// Split one record on the separator with RFC 4180 quoting
fn split_record(line: &str, separator: char) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = Field::default();
    let mut in_quotes = false;
    let mut stream = line.chars().peekable();

    while let Some(ch) = stream.next() {
        if in_quotes {
            match ch {
                '"' if stream.peek() == Some(&'"') => {
                    field.text.push('"');
                    stream.next();
                }
                '"' => in_quotes = false,
                other => field.text.push(other),
            }
            continue;
        }
        match ch {
            '"' => {
                in_quotes = true;
                field.quoted = true;
            }
            c if c == separator => fields.push(field.finish()),
            other => field.text.push(other),
        }
    }
    fields.push(field.finish());
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(content: &str, path: &str) -> Vec<SemanticEntity> {
        CsvParserPlugin.extract_entities(content, path)
    }

    #[test]
    fn test_rows_named_by_first_column() {
        let content = "id,name,role\n42,Ada,admin\n43,Grace,user\n";
        let entities = extract(content, "users.csv");
        assert_eq!(entities.len(), 2);
        assert_eq!(entities[0].name, "row[42]");
        assert_eq!(entities[0].start_line, 2);
        assert_eq!(entities[1].name, "row[43]");
        let meta = entities[0].metadata.as_ref().unwrap();
        assert_eq!(meta.get("name").map(String::as_str), Some("Ada"));
        assert_eq!(meta.get("role").map(String::as_str), Some("admin"));
    }

    #[test]
    fn test_empty_first_cell_gets_ordinal_name() {
        let content = "id,name\n,anonymous\n";
        let entities = extract(content, "users.csv");
        assert_eq!(entities[0].name, "row[row_1]");
    }

    #[test]
    fn test_quoted_fields_and_escaped_quotes() {
        let content = "id,quote\n1,\"said \"\"hi\"\", left\"\n";
        let entities = extract(content, "quotes.csv");
        let meta = entities[0].metadata.as_ref().unwrap();
        assert_eq!(
            meta.get("quote").map(String::as_str),
            Some("said \"hi\", left")
        );
    }

    #[test]
    fn test_quoted_field_keeps_its_padding() {
        let content = "id,note\n1,\"  padded  \"\n2, loose \n";
        let entities = extract(content, "notes.csv");
        let quoted = entities[0].metadata.as_ref().unwrap();
        assert_eq!(quoted.get("note").map(String::as_str), Some("  padded  "));
        // Unquoted cells are still trimmed
        let bare = entities[1].metadata.as_ref().unwrap();
        assert_eq!(bare.get("note").map(String::as_str), Some("loose"));
    }

    #[test]
    fn test_tsv_uses_tabs() {
        let content = "id\tname\n1\tAda, of Lovelace\n";
        let entities = extract(content, "users.tsv");
        let meta = entities[0].metadata.as_ref().unwrap();
        assert_eq!(
            meta.get("name").map(String::as_str),
            Some("Ada, of Lovelace")
        );
    }

    #[test]
    fn test_blank_lines_are_skipped_but_numbering_tracks_source() {
        let content = "\nid,name\n\n1,Ada\n";
        let entities = extract(content, "users.csv");
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].start_line, 4);
    }

    #[test]
    fn test_header_only_file_has_no_rows() {
        assert!(extract("id,name\n", "users.csv").is_empty());
        assert!(extract("", "users.csv").is_empty());
    }

    #[test]
    fn test_trailing_separator_yields_empty_cell() {
        let cells = split_record("a,b,", ',');
        assert_eq!(cells, vec!["a", "b", ""]);
    }
}
