//! Tree-sitter backed code plugin
//!
//! One plugin covers every supported programming language; the per-language
//! differences live in `languages::LanguageConfig` tables. Anything that goes
//! wrong (unknown extension, grammar failure, unparseable bytes) yields an
//! empty entity list rather than an error: per-file robustness is the
//! orchestrator's contract.

mod languages;
mod walker;

pub use languages::{all_code_extensions, config_for_extension, LanguageConfig};

use std::path::Path;

use crate::model::SemanticEntity;
use crate::registry::ParserPlugin;

pub struct CodeParserPlugin;

impl ParserPlugin for CodeParserPlugin {
    fn id(&self) -> &str {
        "code"
    }

    fn extensions(&self) -> &[&str] {
        all_code_extensions()
    }

    fn extract_entities(&self, content: &str, file_path: &str) -> Vec<SemanticEntity> {
        let ext = Path::new(file_path)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e.to_lowercase()))
            .unwrap_or_default();

        let config = match config_for_extension(&ext) {
            Some(c) => c,
            None => return Vec::new(),
        };

        let language = match languages::grammar(config) {
            Some(lang) => lang,
            None => return Vec::new(),
        };

        let mut parser = tree_sitter::Parser::new();
        if parser.set_language(&language).is_err() {
            return Vec::new();
        }

        let tree = match parser.parse(content.as_bytes(), None) {
            Some(t) => t,
            None => return Vec::new(),
        };

        walker::extract_entities(&tree, file_path, config, content)
    }
}
