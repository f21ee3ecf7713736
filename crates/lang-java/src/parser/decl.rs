//! Declaration walking: classes, members and their source spans.

use super::types::{parse_modifiers, parse_throws, parse_type_list};
use super::{JavaParser, text_of};
use srcsync_api::{
    Identifier, ParseTree, RawClass, RawConstructor, RawField, RawImport, RawInitializer,
    RawMethod, SourceSpan, TextRange, TypeRef,
};
use tree_sitter::Node;

const CLASS_KINDS: [&str; 2] = ["class_declaration", "interface_declaration"];

/// End of `[begin, end)` with trailing whitespace dropped.
fn trimmed_end(source: &str, begin: usize, end: usize) -> usize {
    let slice = source.get(begin..end).unwrap_or_default();
    begin + slice.trim_end().len()
}

/// A `/** */` comment separated from `node` by whitespace only.
fn javadoc(node: Node, source: &str) -> Option<(TextRange, String)> {
    let prev = node.prev_sibling()?;
    if prev.kind() != "block_comment" {
        return None;
    }
    let text = text_of(prev, source);
    if !text.starts_with("/**") {
        return None;
    }
    let between = source.get(prev.end_byte()..node.start_byte())?;
    if !between.chars().all(char::is_whitespace) {
        return None;
    }
    Some((
        TextRange::new(prev.start_byte(), prev.end_byte()),
        text.to_string(),
    ))
}

fn span(node: Node, source: &str, header_end: usize, body: Option<Node>) -> (SourceSpan, Option<String>) {
    let doc = javadoc(node, source);
    let span = SourceSpan {
        begin: doc.as_ref().map_or(node.start_byte(), |(range, _)| range.begin),
        end: node.end_byte(),
        header_begin: node.start_byte(),
        header_end,
        javadoc: doc.as_ref().map(|(range, _)| *range),
        body: body.map(|b| TextRange::new(b.start_byte(), b.end_byte())),
    };
    (span, doc.map(|(_, text)| text))
}

fn parse_import(node: Node, source: &str) -> Option<RawImport> {
    let mut cursor = node.walk();
    let mut name = None;
    let mut is_static = false;
    let mut on_demand = false;
    for child in node.children(&mut cursor) {
        match child.kind() {
            "static" => is_static = true,
            "asterisk" => on_demand = true,
            "identifier" | "scoped_identifier" => name = Some(text_of(child, source)),
            _ => {}
        }
    }
    Some(RawImport {
        name: Identifier::new(name?),
        is_static,
        on_demand,
        range: TextRange::new(node.start_byte(), node.end_byte()),
    })
}

fn package_name(node: Node, source: &str) -> Option<Identifier> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .find(|c| matches!(c.kind(), "identifier" | "scoped_identifier"))
        .map(|n| Identifier::new(text_of(n, source)))
}

impl JavaParser {
    pub(super) fn build_tree(&self, root: Node, source: &str) -> ParseTree {
        let mut tree = ParseTree::default();
        let mut cursor = root.walk();
        for child in root.named_children(&mut cursor) {
            match child.kind() {
                "package_declaration" => tree.package = package_name(child, source),
                "import_declaration" => tree.imports.extend(parse_import(child, source)),
                kind if CLASS_KINDS.contains(&kind) => {
                    tree.classes.extend(self.parse_class(child, source));
                }
                // Recovery may wrap whole declarations in an error node.
                "ERROR" => {
                    let mut inner = child.walk();
                    for nested in child.named_children(&mut inner) {
                        if CLASS_KINDS.contains(&nested.kind()) {
                            tree.classes.extend(self.parse_class(nested, source));
                        }
                    }
                }
                _ => {}
            }
        }
        tree
    }

    fn parse_class(&self, node: Node, source: &str) -> Option<RawClass> {
        let is_interface = node.kind() == "interface_declaration";
        let name = text_of(node.child_by_field_name("name")?, source).to_string();
        let body = node.child_by_field_name("body")?;
        let (modifiers, annotations) = parse_modifiers(node, source);

        let superclass = node
            .child_by_field_name("superclass")
            .and_then(|s| s.named_child(0))
            .map(|t| Identifier::new(text_of(t, source)));
        let interfaces = if is_interface {
            let mut cursor = node.walk();
            node.named_children(&mut cursor)
                .find(|c| c.kind() == "extends_interfaces")
                .map(|n| parse_type_list(n, source))
                .unwrap_or_default()
        } else {
            node.child_by_field_name("interfaces")
                .map(|n| parse_type_list(n, source))
                .unwrap_or_default()
        };

        let header_end = trimmed_end(source, node.start_byte(), body.start_byte());
        let (span, javadoc) = span(node, source, header_end, Some(body));
        let mut class = RawClass {
            name,
            modifiers,
            annotations,
            javadoc,
            is_interface,
            type_parameters: node
                .child_by_field_name("type_parameters")
                .map(|t| text_of(t, source).to_string()),
            superclass,
            interfaces,
            span,
            ..Default::default()
        };
        self.parse_members(body, source, &mut class);
        Some(class)
    }

    fn parse_members(&self, body: Node, source: &str, class: &mut RawClass) {
        let mut next_group = 0u32;
        let mut cursor = body.walk();
        for child in body.named_children(&mut cursor) {
            match child.kind() {
                "field_declaration" | "constant_declaration" => {
                    class.fields.extend(self.parse_fields(child, source, &mut next_group));
                }
                "method_declaration" => class.methods.extend(self.parse_method(child, source)),
                "constructor_declaration" => {
                    class.constructors.extend(self.parse_constructor(child, source));
                }
                "static_initializer" | "block" => {
                    class.initializers.extend(parse_initializer(child, source));
                }
                kind if CLASS_KINDS.contains(&kind) => {
                    class.classes.extend(self.parse_class(child, source));
                }
                _ => {}
            }
        }
    }

    fn parse_fields(&self, node: Node, source: &str, next_group: &mut u32) -> Vec<RawField> {
        let Some(type_node) = node.child_by_field_name("type") else {
            return Vec::new();
        };
        let type_ref = self.parse_type_node(type_node, source);
        let (modifiers, annotations) = parse_modifiers(node, source);
        // The header of a field is the whole statement.
        let (span, javadoc) = span(node, source, node.end_byte(), None);

        let mut cursor = node.walk();
        let declarators: Vec<Node> = node
            .children_by_field_name("declarator", &mut cursor)
            .collect();
        let group = if declarators.len() > 1 {
            let id = *next_group;
            *next_group += 1;
            Some(id)
        } else {
            None
        };

        declarators
            .into_iter()
            .filter_map(|declarator| {
                let name = text_of(declarator.child_by_field_name("name")?, source).to_string();
                Some(RawField {
                    name,
                    modifiers,
                    annotations: annotations.clone(),
                    javadoc: javadoc.clone(),
                    type_ref: type_ref.clone(),
                    initializer: declarator
                        .child_by_field_name("value")
                        .map(|v| text_of(v, source).to_string()),
                    declarator: TextRange::new(declarator.start_byte(), declarator.end_byte()),
                    group,
                    span,
                })
            })
            .collect()
    }

    fn parse_method(&self, node: Node, source: &str) -> Option<RawMethod> {
        let name = text_of(node.child_by_field_name("name")?, source).to_string();
        let (modifiers, annotations) = parse_modifiers(node, source);
        let body = node.child_by_field_name("body");
        let header_end = match body {
            Some(b) => trimmed_end(source, node.start_byte(), b.start_byte()),
            None => {
                let end = node.end_byte();
                if text_of(node, source).ends_with(';') {
                    trimmed_end(source, node.start_byte(), end - 1)
                } else {
                    end
                }
            }
        };
        let (span, javadoc) = span(node, source, header_end, body);
        Some(RawMethod {
            name,
            modifiers,
            annotations,
            javadoc,
            type_parameters: node
                .child_by_field_name("type_parameters")
                .map(|t| text_of(t, source).to_string()),
            return_type: node
                .child_by_field_name("type")
                .map(|t| self.parse_type_node(t, source))
                .unwrap_or_else(TypeRef::void),
            parameters: self.parse_parameters(node, source),
            exceptions: parse_throws(node, source),
            body: body.map(|b| text_of(b, source).to_string()),
            span,
        })
    }

    fn parse_constructor(&self, node: Node, source: &str) -> Option<RawConstructor> {
        let name = text_of(node.child_by_field_name("name")?, source).to_string();
        let body = node.child_by_field_name("body")?;
        let (modifiers, annotations) = parse_modifiers(node, source);
        let header_end = trimmed_end(source, node.start_byte(), body.start_byte());
        let (span, javadoc) = span(node, source, header_end, Some(body));
        Some(RawConstructor {
            name,
            modifiers,
            annotations,
            javadoc,
            type_parameters: node
                .child_by_field_name("type_parameters")
                .map(|t| text_of(t, source).to_string()),
            parameters: self.parse_parameters(node, source),
            exceptions: parse_throws(node, source),
            body: text_of(body, source).to_string(),
            span,
        })
    }
}

/// `static { }` or a bare instance block. The header of a static initializer
/// is the keyword plus the whitespace before the block.
fn parse_initializer(node: Node, source: &str) -> Option<RawInitializer> {
    let is_static = node.kind() == "static_initializer";
    let block = if is_static {
        let mut cursor = node.walk();
        node.named_children(&mut cursor).find(|c| c.kind() == "block")?
    } else {
        node
    };
    let (mut span, _) = span(node, source, block.start_byte(), Some(block));
    span.javadoc = None;
    span.begin = node.start_byte();
    Some(RawInitializer {
        is_static,
        body: text_of(block, source).to_string(),
        span,
    })
}
