//! Per-language tree-sitter configuration and the process-wide grammar cache

use std::collections::HashMap;

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use tree_sitter::Language;

/// Static description of one supported language
pub struct LanguageConfig {
    /// Canonical language id
    pub id: &'static str,
    /// Recognised extensions, dot-prefixed and lowercase
    pub extensions: &'static [&'static str],
    /// Node kinds that become entities when named
    pub entity_node_types: &'static [&'static str],
    /// Structural nodes (class bodies etc.) that are descended through but
    /// never become entities themselves
    pub container_node_types: &'static [&'static str],
    /// Grammar loader; `None` disables the language without failing the file
    pub load_grammar: fn() -> Option<Language>,
}

fn grammar_typescript() -> Option<Language> {
    Some(tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into())
}

fn grammar_tsx() -> Option<Language> {
    Some(tree_sitter_typescript::LANGUAGE_TSX.into())
}

fn grammar_javascript() -> Option<Language> {
    Some(tree_sitter_javascript::LANGUAGE.into())
}

fn grammar_python() -> Option<Language> {
    Some(tree_sitter_python::LANGUAGE.into())
}

fn grammar_go() -> Option<Language> {
    Some(tree_sitter_go::LANGUAGE.into())
}

fn grammar_rust() -> Option<Language> {
    Some(tree_sitter_rust::LANGUAGE.into())
}

fn grammar_java() -> Option<Language> {
    Some(tree_sitter_java::LANGUAGE.into())
}

fn grammar_c() -> Option<Language> {
    Some(tree_sitter_c::LANGUAGE.into())
}

fn grammar_cpp() -> Option<Language> {
    Some(tree_sitter_cpp::LANGUAGE.into())
}

fn grammar_csharp() -> Option<Language> {
    Some(tree_sitter_c_sharp::LANGUAGE.into())
}

fn grammar_ruby() -> Option<Language> {
    Some(tree_sitter_ruby::LANGUAGE.into())
}

fn grammar_php() -> Option<Language> {
    Some(tree_sitter_php::LANGUAGE_PHP.into())
}

fn grammar_fortran() -> Option<Language> {
    Some(tree_sitter_fortran::LANGUAGE.into())
}

static TYPESCRIPT: LanguageConfig = LanguageConfig {
    id: "typescript",
    extensions: &[".ts", ".mts", ".cts"],
    entity_node_types: &[
        "function_declaration",
        "class_declaration",
        "interface_declaration",
        "type_alias_declaration",
        "enum_declaration",
        "lexical_declaration",
        "variable_declaration",
        "method_definition",
        "public_field_definition",
        "pair",
    ],
    container_node_types: &["class_body", "interface_body", "enum_body"],
    load_grammar: grammar_typescript,
};

static TSX: LanguageConfig = LanguageConfig {
    id: "tsx",
    extensions: &[".tsx"],
    entity_node_types: &[
        "function_declaration",
        "class_declaration",
        "interface_declaration",
        "type_alias_declaration",
        "enum_declaration",
        "lexical_declaration",
        "variable_declaration",
        "method_definition",
        "public_field_definition",
        "pair",
    ],
    container_node_types: &["class_body", "interface_body", "enum_body"],
    load_grammar: grammar_tsx,
};

static JAVASCRIPT: LanguageConfig = LanguageConfig {
    id: "javascript",
    extensions: &[".js", ".jsx", ".mjs", ".cjs"],
    entity_node_types: &[
        "function_declaration",
        "class_declaration",
        "lexical_declaration",
        "variable_declaration",
        "method_definition",
        "field_definition",
        "pair",
    ],
    container_node_types: &["class_body"],
    load_grammar: grammar_javascript,
};

static PYTHON: LanguageConfig = LanguageConfig {
    id: "python",
    extensions: &[".py", ".pyi"],
    entity_node_types: &["function_definition", "class_definition"],
    container_node_types: &["block"],
    load_grammar: grammar_python,
};

static GO: LanguageConfig = LanguageConfig {
    id: "go",
    extensions: &[".go"],
    entity_node_types: &[
        "function_declaration",
        "method_declaration",
        "type_declaration",
        "var_declaration",
        "const_declaration",
    ],
    container_node_types: &[],
    load_grammar: grammar_go,
};

static RUST: LanguageConfig = LanguageConfig {
    id: "rust",
    extensions: &[".rs"],
    entity_node_types: &[
        "function_item",
        "struct_item",
        "enum_item",
        "impl_item",
        "trait_item",
        "mod_item",
        "const_item",
        "static_item",
        "type_item",
    ],
    container_node_types: &["declaration_list"],
    load_grammar: grammar_rust,
};

static JAVA: LanguageConfig = LanguageConfig {
    id: "java",
    extensions: &[".java"],
    entity_node_types: &[
        "class_declaration",
        "method_declaration",
        "interface_declaration",
        "enum_declaration",
        "field_declaration",
        "constructor_declaration",
        "annotation_type_declaration",
    ],
    container_node_types: &["class_body", "interface_body", "enum_body"],
    load_grammar: grammar_java,
};

static C: LanguageConfig = LanguageConfig {
    id: "c",
    extensions: &[".c", ".h"],
    entity_node_types: &[
        "function_definition",
        "struct_specifier",
        "enum_specifier",
        "union_specifier",
        "type_definition",
        "declaration",
    ],
    container_node_types: &[],
    load_grammar: grammar_c,
};

static CPP: LanguageConfig = LanguageConfig {
    id: "cpp",
    extensions: &[".cpp", ".cc", ".cxx", ".hpp", ".hh", ".hxx"],
    entity_node_types: &[
        "function_definition",
        "class_specifier",
        "struct_specifier",
        "enum_specifier",
        "namespace_definition",
        "template_declaration",
        "declaration",
        "type_definition",
    ],
    container_node_types: &["field_declaration_list", "declaration_list"],
    load_grammar: grammar_cpp,
};

static CSHARP: LanguageConfig = LanguageConfig {
    id: "csharp",
    extensions: &[".cs"],
    entity_node_types: &[
        "method_declaration",
        "class_declaration",
        "interface_declaration",
        "enum_declaration",
        "struct_declaration",
        "namespace_declaration",
        "property_declaration",
        "constructor_declaration",
        "field_declaration",
    ],
    container_node_types: &["declaration_list"],
    load_grammar: grammar_csharp,
};

static RUBY: LanguageConfig = LanguageConfig {
    id: "ruby",
    extensions: &[".rb"],
    entity_node_types: &["method", "singleton_method", "class", "module"],
    container_node_types: &["body_statement"],
    load_grammar: grammar_ruby,
};

static PHP: LanguageConfig = LanguageConfig {
    id: "php",
    extensions: &[".php"],
    entity_node_types: &[
        "function_definition",
        "class_declaration",
        "method_declaration",
        "interface_declaration",
        "trait_declaration",
        "enum_declaration",
        "namespace_definition",
    ],
    container_node_types: &["declaration_list", "enum_declaration_list"],
    load_grammar: grammar_php,
};

static FORTRAN: LanguageConfig = LanguageConfig {
    id: "fortran",
    extensions: &[".f90", ".f95", ".f03", ".f08", ".f", ".for"],
    entity_node_types: &[
        "function",
        "subroutine",
        "module",
        "program",
        "interface",
        "type_declaration",
    ],
    container_node_types: &[],
    load_grammar: grammar_fortran,
};

static ALL_CONFIGS: &[&LanguageConfig] = &[
    &TYPESCRIPT,
    &TSX,
    &JAVASCRIPT,
    &PYTHON,
    &GO,
    &RUST,
    &JAVA,
    &C,
    &CPP,
    &CSHARP,
    &RUBY,
    &PHP,
    &FORTRAN,
];

/// Look up the language config for a dot-prefixed lowercase extension
pub fn config_for_extension(extension: &str) -> Option<&'static LanguageConfig> {
    ALL_CONFIGS
        .iter()
        .find(|c| c.extensions.contains(&extension))
        .copied()
}

/// Every extension handled by the code plugin
pub fn all_code_extensions() -> &'static [&'static str] {
    static EXTENSIONS: &[&str] = &[
        ".ts", ".mts", ".cts", ".tsx", ".js", ".jsx", ".mjs", ".cjs", ".py", ".pyi", ".go", ".rs",
        ".java", ".c", ".h", ".cpp", ".cc", ".cxx", ".hpp", ".hh", ".hxx", ".cs", ".rb", ".php",
        ".f90", ".f95", ".f03", ".f08", ".f", ".for",
    ];
    EXTENSIONS
}

// Grammar objects are loaded on first use and shared for the life of the
// process; a language whose loader fails stays disabled (None) rather than
// being retried per file.
static GRAMMAR_CACHE: Lazy<RwLock<HashMap<&'static str, Option<Language>>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// Fetch the cached grammar for a language, loading it on first request
pub fn grammar(config: &'static LanguageConfig) -> Option<Language> {
    if let Some(cached) = GRAMMAR_CACHE.read().get(config.id) {
        return cached.clone();
    }
    let loaded = (config.load_grammar)();
    GRAMMAR_CACHE.write().insert(config.id, loaded.clone());
    loaded
}
