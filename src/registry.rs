//! Parser plugin contract and extension registry
//!
//! One plugin per format. The registry maps file extensions to plugins;
//! lookup is case-insensitive on the final suffix and falls through to the
//! fallback plugin, so every path resolves to something that can extract
//! entities.

use std::collections::HashMap;
use std::path::Path;

use crate::matching::default_similarity;
use crate::model::SemanticEntity;

/// A format-specific entity extractor
pub trait ParserPlugin: Send + Sync {
    /// Stable plugin identifier (`code`, `json`, `fallback`, ...)
    fn id(&self) -> &str;

    /// Recognised extensions, dot-prefixed and lowercase (empty for fallback)
    fn extensions(&self) -> &[&str];

    /// Extract all entities from one file's content
    fn extract_entities(&self, content: &str, file_path: &str) -> Vec<SemanticEntity>;

    /// Similarity score in `[0, 1]` used by the fuzzy matching phase
    fn similarity(&self, a: &SemanticEntity, b: &SemanticEntity) -> f64 {
        default_similarity(a, b)
    }
}

/// Extension-keyed plugin registry
pub struct ParserRegistry {
    plugins: Vec<Box<dyn ParserPlugin>>,
    extension_map: HashMap<String, usize>,
}

impl ParserRegistry {
    pub fn new() -> Self {
        Self {
            plugins: Vec::new(),
            extension_map: HashMap::new(),
        }
    }

    /// Register a plugin for all of its extensions. Later registrations win
    /// on extension conflicts; the fallback plugin must be registered last.
    pub fn register(&mut self, plugin: Box<dyn ParserPlugin>) {
        let idx = self.plugins.len();
        for ext in plugin.extensions() {
            self.extension_map.insert(ext.to_lowercase(), idx);
        }
        self.plugins.push(plugin);
    }

    /// Resolve a plugin for the given path, falling through to `fallback`
    pub fn get_plugin(&self, file_path: &str) -> Option<&dyn ParserPlugin> {
        let ext = file_extension(file_path);
        if let Some(&idx) = self.extension_map.get(&ext) {
            return Some(self.plugins[idx].as_ref());
        }
        self.get_plugin_by_id("fallback")
    }

    pub fn get_plugin_by_id(&self, id: &str) -> Option<&dyn ParserPlugin> {
        self.plugins
            .iter()
            .find(|p| p.id() == id)
            .map(|p| p.as_ref())
    }

    /// Plugin ids in registration order
    pub fn list_plugins(&self) -> Vec<&str> {
        self.plugins.iter().map(|p| p.id()).collect()
    }
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Final dot-prefixed lowercase suffix of a path (empty when there is none)
fn file_extension(file_path: &str) -> String {
    Path::new(file_path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_lowercase()))
        .unwrap_or_default()
}
