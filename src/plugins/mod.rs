//! Parser plugins, one per supported format

pub mod code;
pub mod csv;
pub mod fallback;
pub mod json;
pub mod markdown;
pub mod toml;
pub mod yaml;

use crate::registry::ParserRegistry;

/// Build the standard registry: code, json, yaml, toml, csv, markdown, with
/// the fallback chunker registered last.
pub fn create_default_registry() -> ParserRegistry {
    let mut registry = ParserRegistry::new();

    registry.register(Box::new(code::CodeParserPlugin));
    registry.register(Box::new(json::JsonParserPlugin));
    registry.register(Box::new(yaml::YamlParserPlugin));
    registry.register(Box::new(toml::TomlParserPlugin));
    registry.register(Box::new(csv::CsvParserPlugin));
    registry.register(Box::new(markdown::MarkdownParserPlugin));
    // Fallback must be last
    registry.register(Box::new(fallback::FallbackParserPlugin));

    registry
}
