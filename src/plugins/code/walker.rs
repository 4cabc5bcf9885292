//! Syntax tree walker: turns tree-sitter nodes into entities
//!
//! The walk is depth-first over named nodes, threading a small immutable
//! context (current parent id, whether we are inside a function body) through
//! the recursion. Export statements and decorated definitions are transparent
//! wrappers: the walker descends into the wrapped declaration and emits from
//! it instead.

use tree_sitter::{Node, Tree};

use super::languages::LanguageConfig;
use crate::hash::content_hash;
use crate::model::{build_entity_id, SemanticEntity};

/// Immutable state threaded through the recursion
#[derive(Clone, Copy)]
struct WalkContext<'a> {
    parent_id: Option<&'a str>,
    inside_function: bool,
}

/// Extract all entities from a parsed source tree
pub fn extract_entities(
    tree: &Tree,
    file_path: &str,
    config: &LanguageConfig,
    source: &str,
) -> Vec<SemanticEntity> {
    let mut entities = Vec::new();
    let ctx = WalkContext {
        parent_id: None,
        inside_function: false,
    };
    walk(
        tree.root_node(),
        file_path,
        config,
        &mut entities,
        ctx,
        source.as_bytes(),
    );
    entities
}

fn walk(
    node: Node,
    file_path: &str,
    config: &LanguageConfig,
    entities: &mut Vec<SemanticEntity>,
    ctx: WalkContext,
    source: &[u8],
) {
    let kind = node.kind();

    // Export/decoration wrappers are transparent: emit from the wrapped
    // declaration, keeping the current parent
    if let Some(inner) = wrapped_declaration(node) {
        walk(inner, file_path, config, entities, ctx, source);
        return;
    }

    if config.entity_node_types.contains(&kind) && !is_suppressed(node, kind, ctx) {
        if let Some(name) = extract_name(node, source) {
            let entity_type = map_node_type(kind, node);
            let content = node_text(node, source);
            let entity = SemanticEntity {
                id: build_entity_id(file_path, &entity_type, &name, ctx.parent_id),
                file_path: file_path.to_string(),
                entity_type,
                name,
                parent_id: ctx.parent_id.map(String::from),
                content_hash: content_hash(&normalized_tokens(node, source)),
                content,
                start_line: node.start_position().row + 1,
                end_line: node.end_position().row + 1,
                metadata: None,
            };
            let entity_id = entity.id.clone();
            entities.push(entity);

            // Nested entities: recurse into every named child with the new
            // entity as parent. Container nodes (class bodies etc.) are
            // descended through transparently.
            let child_ctx = WalkContext {
                parent_id: Some(&entity_id),
                inside_function: ctx.inside_function || is_function_like(kind),
            };
            recurse_children(node, file_path, config, entities, child_ctx, source);
            return;
        }
    }

    let next_ctx = WalkContext {
        parent_id: ctx.parent_id,
        inside_function: ctx.inside_function || is_function_like(kind),
    };
    recurse_children(node, file_path, config, entities, next_ctx, source);
}

fn recurse_children(
    node: Node,
    file_path: &str,
    config: &LanguageConfig,
    entities: &mut Vec<SemanticEntity>,
    ctx: WalkContext,
    source: &[u8],
) {
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if config.container_node_types.contains(&child.kind()) {
            // Pure structure: descend without consuming an entity level
            recurse_children(child, file_path, config, entities, ctx, source);
        } else {
            walk(child, file_path, config, entities, ctx, source);
        }
    }
}

/// Inner declaration of a transparent wrapper node, if this is one
fn wrapped_declaration<'a>(node: Node<'a>) -> Option<Node<'a>> {
    match node.kind() {
        "export_statement" => node.child_by_field_name("declaration"),
        "decorated_definition" => node.child_by_field_name("definition"),
        _ => None,
    }
}

/// Emission filters: locals inside functions and non-function object pairs
fn is_suppressed(node: Node, kind: &str, ctx: WalkContext) -> bool {
    if kind == "pair" {
        return !pair_is_function(node);
    }
    if ctx.inside_function && map_node_type(kind, node) == "variable" {
        return true;
    }
    false
}

/// Whether an object-literal pair's value is a function-like expression
fn pair_is_function(node: Node) -> bool {
    node.child_by_field_name("value")
        .map(|value| {
            matches!(
                value.kind(),
                "function" | "function_expression" | "arrow_function" | "generator_function"
            )
        })
        .unwrap_or(false)
}

/// Node kinds that introduce a function scope
fn is_function_like(kind: &str) -> bool {
    matches!(
        kind,
        "function_declaration"
            | "function_definition"
            | "function_item"
            | "function_expression"
            | "arrow_function"
            | "generator_function"
            | "generator_function_declaration"
            | "method_definition"
            | "method_declaration"
            | "constructor_declaration"
            | "method"
            | "singleton_method"
            | "function"
            | "subroutine"
    )
}

/// Name extraction, in fixed priority order
fn extract_name(node: Node, source: &[u8]) -> Option<String> {
    // 1. The node's own name field (covers most declarations)
    if let Some(name_node) = node.child_by_field_name("name") {
        return Some(node_text(name_node, source));
    }

    let kind = node.kind();

    // 2. Declarator name for variable-like declarations
    if matches!(
        kind,
        "lexical_declaration" | "variable_declaration" | "var_declaration" | "declaration"
            | "field_declaration"
    ) {
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            if child.kind().ends_with("declarator") {
                if let Some(name) = declarator_name(child, source) {
                    return Some(name);
                }
            }
        }
    }

    // 3. Inner definition name for decorated definitions
    if kind == "decorated_definition" {
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            if matches!(child.kind(), "function_definition" | "class_definition") {
                if let Some(inner) = child.child_by_field_name("name") {
                    return Some(node_text(inner, source));
                }
            }
        }
    }

    // 4. Key of a key-value pair, string quoting stripped
    if kind == "pair" {
        if let Some(key) = node.child_by_field_name("key") {
            let text = node_text(key, source);
            return Some(text.trim_matches(['"', '\'', '`']).to_string());
        }
    }

    // 5. First identifier-shaped named child
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if child.kind().ends_with("identifier") {
            return Some(node_text(child, source));
        }
    }

    None
}

/// Resolve the identifier inside a (possibly nested) declarator
fn declarator_name(node: Node, source: &[u8]) -> Option<String> {
    if node.kind().ends_with("identifier") {
        return Some(node_text(node, source));
    }
    if let Some(name) = node.child_by_field_name("name") {
        return Some(node_text(name, source));
    }
    if let Some(inner) = node.child_by_field_name("declarator") {
        return declarator_name(inner, source);
    }
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if child.kind().ends_with("identifier") {
            return Some(node_text(child, source));
        }
    }
    None
}

/// Fixed node-kind to canonical entity-type table
fn map_node_type(kind: &str, node: Node) -> String {
    let mapped = match kind {
        "function_declaration" | "function_definition" | "function_item" | "function"
        | "subroutine" | "generator_function_declaration" => "function",
        "method_declaration" | "method_definition" | "method" | "singleton_method"
        | "constructor_declaration" => "method",
        "class_declaration" | "class_definition" | "class_specifier" | "class" => "class",
        "interface_declaration" | "interface" | "annotation_type_declaration" => "interface",
        "type_alias_declaration" | "type_declaration" | "type_item" | "type_definition"
        | "template_declaration" => "type",
        "enum_declaration" | "enum_item" | "enum_specifier" => "enum",
        "struct_item" | "struct_specifier" | "struct_declaration" | "union_specifier" => "struct",
        "impl_item" => "impl",
        "trait_item" | "trait_declaration" => "trait",
        "mod_item" | "module" | "namespace_definition" | "namespace_declaration" | "program" => {
            "module"
        }
        "const_declaration" | "const_item" => "constant",
        "static_item" => "static",
        "lexical_declaration" | "variable_declaration" | "var_declaration" | "declaration" => {
            "variable"
        }
        "field_declaration" | "field_definition" | "public_field_definition"
        | "property_declaration" => "property",
        "pair" => {
            return if pair_is_function(node) {
                "method".to_string()
            } else {
                "property".to_string()
            }
        }
        other => return other.to_string(),
    };
    mapped.to_string()
}

fn node_text(node: Node, source: &[u8]) -> String {
    node.utf8_text(source).unwrap_or("").to_string()
}

/// Normalised form of an entity for structural hashing: the subtree's token
/// stream with comments dropped and all whitespace collapsed to single
/// spaces. String and identifier tokens stay byte-exact.
fn normalized_tokens(node: Node, source: &[u8]) -> String {
    let mut tokens: Vec<&str> = Vec::new();
    collect_tokens(node, source, &mut tokens);
    tokens.join(" ")
}

fn collect_tokens<'a>(node: Node, source: &'a [u8], out: &mut Vec<&'a str>) {
    if node.kind().contains("comment") {
        return;
    }
    if node.child_count() == 0 {
        if let Ok(text) = node.utf8_text(source) {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                out.push(trimmed);
            }
        }
        return;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_tokens(child, source, out);
    }
}
