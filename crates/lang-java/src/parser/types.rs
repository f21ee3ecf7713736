use super::{JavaParser, text_of};
use srcsync_api::{Identifier, Modifiers, Parameter, TypeRef};
use tree_sitter::Node;

impl JavaParser {
    pub(crate) fn parse_type_node(&self, node: Node, source: &str) -> TypeRef {
        match node.kind() {
            "generic_type" => {
                let base = node
                    .child_by_field_name("type")
                    .or_else(|| node.named_child(0))
                    .map(|b| self.parse_type_node(b, source))
                    .unwrap_or(TypeRef::Unknown);

                let mut args = Vec::new();
                let mut cursor = node.walk();
                for child in node.children(&mut cursor) {
                    if child.kind() == "type_arguments" {
                        let mut args_cursor = child.walk();
                        for arg in child.named_children(&mut args_cursor) {
                            args.push(self.parse_type_node(arg, source));
                        }
                    }
                }

                TypeRef::Generic {
                    base: Box::new(base),
                    args,
                }
            }
            "array_type" => {
                let element = node
                    .child_by_field_name("element")
                    .or_else(|| node.named_child(0))
                    .map(|e| self.parse_type_node(e, source))
                    .unwrap_or(TypeRef::Unknown);
                let dimensions = node
                    .child_by_field_name("dimensions")
                    .map(|d| text_of(d, source).matches('[').count())
                    .unwrap_or(1);
                TypeRef::array_of(element, dimensions)
            }
            "wildcard" => {
                let mut bound = None;
                let mut is_upper_bound = true;
                let mut cursor = node.walk();
                for child in node.children(&mut cursor) {
                    match child.kind() {
                        "super" => is_upper_bound = false,
                        "extends" => is_upper_bound = true,
                        _ if child.is_named() => {
                            bound = Some(Box::new(self.parse_type_node(child, source)));
                        }
                        _ => {}
                    }
                }
                TypeRef::Wildcard {
                    bound,
                    is_upper_bound,
                }
            }
            _ => {
                // Primitives, plain and scoped identifiers, annotated types.
                let text = text_of(node, source);
                if text.is_empty() {
                    TypeRef::Unknown
                } else {
                    TypeRef::raw(text)
                }
            }
        }
    }

    /// Formal parameters of a method or constructor, in order. Receiver
    /// parameters are skipped.
    pub(crate) fn parse_parameters(&self, declaration: Node, source: &str) -> Vec<Parameter> {
        let Some(params_node) = declaration.child_by_field_name("parameters") else {
            return Vec::new();
        };

        let mut result = Vec::new();
        let mut cursor = params_node.walk();
        for child in params_node.named_children(&mut cursor) {
            let (modifiers, _) = parse_modifiers(child, source);
            let is_final = modifiers.contains(Modifiers::FINAL);
            match child.kind() {
                "formal_parameter" => {
                    let Some(type_node) = child.child_by_field_name("type") else {
                        continue;
                    };
                    let mut type_ref = self.parse_type_node(type_node, source);
                    if let Some(dims) = child.child_by_field_name("dimensions") {
                        type_ref = TypeRef::array_of(type_ref, text_of(dims, source).matches('[').count());
                    }
                    let name = child
                        .child_by_field_name("name")
                        .map(|n| text_of(n, source).to_string())
                        .unwrap_or_default();
                    result.push(Parameter {
                        name,
                        type_ref,
                        is_final,
                    });
                }
                "spread_parameter" => {
                    let mut type_ref = TypeRef::Unknown;
                    let mut name = String::new();
                    let mut inner = child.walk();
                    for part in child.named_children(&mut inner) {
                        match part.kind() {
                            "modifiers" => {}
                            "variable_declarator" => {
                                if let Some(n) = part.child_by_field_name("name") {
                                    name = text_of(n, source).to_string();
                                }
                            }
                            _ => {
                                // Kept in source form so regenerated headers stay varargs.
                                type_ref = TypeRef::raw(format!("{}...", text_of(part, source)));
                            }
                        }
                    }
                    result.push(Parameter {
                        name,
                        type_ref,
                        is_final,
                    });
                }
                _ => {}
            }
        }
        result
    }
}

/// Keyword modifiers and annotation texts of a declaration.
pub(crate) fn parse_modifiers(declaration: Node, source: &str) -> (Modifiers, Vec<String>) {
    let mut modifiers = Modifiers::empty();
    let mut annotations = Vec::new();
    let mut cursor = declaration.walk();
    let Some(list) = declaration
        .children(&mut cursor)
        .find(|c| c.kind() == "modifiers")
    else {
        return (modifiers, annotations);
    };

    let mut inner = list.walk();
    for child in list.children(&mut inner) {
        match child.kind() {
            "marker_annotation" | "annotation" => {
                annotations.push(text_of(child, source).to_string());
            }
            keyword => {
                if let Some(flag) = Modifiers::from_keyword(keyword) {
                    modifiers |= flag;
                }
            }
        }
    }
    (modifiers, annotations)
}

/// Types listed after `throws`.
pub(crate) fn parse_throws(declaration: Node, source: &str) -> Vec<Identifier> {
    let mut cursor = declaration.walk();
    let Some(throws) = declaration
        .children(&mut cursor)
        .find(|c| c.kind() == "throws")
    else {
        return Vec::new();
    };
    let mut inner = throws.walk();
    throws
        .named_children(&mut inner)
        .map(|t| Identifier::new(text_of(t, source)))
        .collect()
}

/// Entries of the `type_list` under `node` (`implements`/`extends` clauses).
pub(crate) fn parse_type_list(node: Node, source: &str) -> Vec<Identifier> {
    let mut cursor = node.walk();
    let Some(list) = node
        .named_children(&mut cursor)
        .find(|c| c.kind() == "type_list")
    else {
        return Vec::new();
    };
    let mut inner = list.walk();
    list.named_children(&mut inner)
        .map(|t| Identifier::new(text_of(t, source)))
        .collect()
}
